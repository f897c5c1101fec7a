//! The supervisor trap dispatcher. The assembly vector has already spilled
//! the caller-saved frame; everything after `scause` decode happens here.

use platform_abstractions::{TrapCause, TrapFrame};
use platform_specific::legacy_println;

use crate::console;
use crate::syscalls;
use crate::threads;

// `sepc` points at the trapping `ecall`; resume past it.
const ECALL_INSTRUCTION_SIZE: usize = 4;

#[no_mangle]
extern "C" fn __kernel_trap_handler(frame: &mut TrapFrame) {
    match platform_abstractions::translate_current_trap() {
        TrapCause::SoftwareTimer => {
            platform_specific::clear_ssip();
            threads::handle_timer_tick();
        }
        TrapCause::HardwareTimer => {
            // Re-arming clears the pending timer interrupt
            platform_abstractions::schedule_next_tick();
            threads::handle_timer_tick();
        }
        TrapCause::External => handle_external_interrupt(),
        TrapCause::SupervisorEnvCall => {
            // Kernel-side yield. A nested switch clobbers sepc/sstatus, so
            // they live in locals on this thread's stack across it.
            let sepc = platform_specific::read_sepc() + ECALL_INSTRUCTION_SIZE;
            let sstatus = platform_specific::read_sstatus();

            threads::dispatch(true);

            platform_specific::write_sstatus(sstatus);
            platform_specific::write_sepc(sepc);
        }
        TrapCause::UserEnvCall => {
            let sepc = platform_specific::read_sepc() + ECALL_INSTRUCTION_SIZE;
            let sstatus = platform_specific::read_sstatus();

            syscalls::dispatch_syscall(frame);

            platform_specific::write_sstatus(sstatus);
            platform_specific::write_sepc(sepc);
        }
        TrapCause::Unknown(scause) => handle_unknown_trap(scause),
    }
}

fn handle_external_interrupt() {
    platform_specific::clear_ssip();

    let irq = platform_specific::plic_claim();
    if irq == 0 {
        return;
    }

    if irq == platform_specific::CONSOLE_IRQ {
        console::handle_console_irq();
    }

    platform_specific::plic_complete(irq);
}

/// Fatal path for causes and system-call codes the kernel does not know.
/// Prints the diagnostic registers on the raw UART and parks the kernel in a
/// dispatch loop; other threads may still run, this one never returns.
pub fn handle_unknown_trap(scause: usize) -> ! {
    legacy_println!();
    legacy_println!("scause: {:#018x}", scause);
    legacy_println!("sepc: {:#018x}", platform_specific::read_sepc());
    legacy_println!("stval: {:#018x}", platform_specific::read_stval());

    loop {
        threads::dispatch(true);
    }
}
