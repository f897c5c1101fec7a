//! Kernel bring-up and teardown: trap vector, system threads, console,
//! timer, then the dedicated user thread running `user_main`.

use log::{debug, info};
use tasks::ThreadId;

use crate::console;
use crate::threads;
use crate::usercalls;

pub fn run() {
    let old_stvec = platform_abstractions::init_trap();

    let (bootstrap, idle) = threads::init();
    let output_worker = console::init();

    // From here on the tick can preempt whoever runs
    platform_specific::enable_interrupt_sources();
    platform_abstractions::schedule_next_tick();
    platform_specific::interrupt_unlock();

    // Let the system threads reach their blocking points
    usercalls::thread_dispatch();
    info!("kernel up");

    run_user_thread();

    console::flush_blocking();
    dispose(bootstrap, idle, output_worker, old_stvec);
}

fn run_user_thread() {
    let user = threads::spawn_user_thread(user_main_trampoline, 0)
        .expect("no memory for the user thread");
    debug!("user thread {user} created");

    usercalls::thread_dispatch();

    // Block the bootstrap thread until user_main is done
    threads::join_blocking(user);
}

extern "C" fn user_main_trampoline(_arg: usize) {
    extern "C" {
        fn user_main();
    }
    unsafe { user_main() };
}

fn dispose(bootstrap: ThreadId, idle: ThreadId, output_worker: ThreadId, old_stvec: usize) {
    platform_specific::interrupt_lock();

    let _ = threads::delete_thread(output_worker);
    let _ = threads::delete_thread(idle);
    let _ = threads::delete_thread(bootstrap);

    platform_abstractions::restore_trap(old_stvec);

    info!("kernel down, returning to firmware");
}
