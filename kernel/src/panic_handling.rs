use core::panic::PanicInfo;

use platform_specific::legacy_println;

#[panic_handler]
fn __kernel_panic(info: &PanicInfo) -> ! {
    // Straight to the raw UART; the scheduler or logger may be the casualty
    legacy_println!("[kestrel] kernel panicked: {}", info.message());

    match info.location() {
        Some(location) => legacy_println!(
            "[kestrel]     at {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ),
        None => legacy_println!("[kestrel]     no location information available"),
    }

    platform_abstractions::machine_shutdown(true)
}
