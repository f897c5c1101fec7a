#![no_std]
#![no_main]

use platform_specific::legacy_println;

extern crate alloc;

mod console;
mod kernel;
mod logging;
mod memory;
mod panic_handling;
mod semaphores;
mod syscalls;
mod threads;
mod trap;
mod user_main;
mod usercalls;

// The entry point from the underlying HAL
// Set up the ambient pieces, run the kernel, give the machine back
#[no_mangle]
extern "C" fn __kernel_start_main() -> ! {
    legacy_println!("kestrel starting");
    legacy_println!(
        "platform: {}",
        platform_specific::PLATFORM_STRING.to_str().unwrap()
    );

    logging::init();
    memory::init();

    kernel::run();

    platform_abstractions::machine_shutdown(false)
}
