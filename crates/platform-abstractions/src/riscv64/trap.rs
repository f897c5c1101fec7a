use core::arch::naked_asm;

use riscv::register::{scause, stvec};

use crate::TrapCause;

const SCAUSE_INTERRUPT_BIT: usize = 1 << 63;

const SCAUSE_SUPERVISOR_SOFT: usize = SCAUSE_INTERRUPT_BIT | 1;
const SCAUSE_SUPERVISOR_TIMER: usize = SCAUSE_INTERRUPT_BIT | 5;
const SCAUSE_SUPERVISOR_EXTERNAL: usize = SCAUSE_INTERRUPT_BIT | 9;
const SCAUSE_ECALL_FROM_USER: usize = 8;
const SCAUSE_ECALL_FROM_SUPERVISOR: usize = 9;

/// Caller-saved registers captured by the trap vector on the interrupted
/// thread's stack. Callee-saved registers survive through the compiled
/// handler (and across a context switch) on their own.
///
/// The layout is addressed by offset from the vector assembly.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TrapFrame {
    pub ra: usize,      // 0*8
    pub t: [usize; 7],  // 1*8 .. 7*8, t0-t6
    pub a: [usize; 8],  // 8*8 .. 15*8, a0-a7
}

impl TrapFrame {
    /// System call code, register a0 at trap time.
    pub fn syscall_code(&self) -> usize {
        self.a[0]
    }

    /// n-th system call argument; arguments start at a1.
    pub fn arg(&self, n: usize) -> usize {
        debug_assert!((1..=6).contains(&n));
        self.a[n]
    }

    /// Value user code sees in a0 after `sret`.
    pub fn set_return_value(&mut self, value: usize) {
        self.a[0] = value;
    }
}

/// The single supervisor trap vector. Spills the caller-saved frame onto the
/// current stack, hands a pointer to it to the kernel dispatcher, restores
/// the frame and returns with `sret`.
#[unsafe(naked)]
#[no_mangle]
#[link_section = ".text.trampoline"]
unsafe extern "C" fn __supervisor_trap() {
    naked_asm!(
        "addi sp, sp, -16*8",
        "sd ra, 0*8(sp)",
        "sd t0, 1*8(sp)",
        "sd t1, 2*8(sp)",
        "sd t2, 3*8(sp)",
        "sd t3, 4*8(sp)",
        "sd t4, 5*8(sp)",
        "sd t5, 6*8(sp)",
        "sd t6, 7*8(sp)",
        "sd a0, 8*8(sp)",
        "sd a1, 9*8(sp)",
        "sd a2, 10*8(sp)",
        "sd a3, 11*8(sp)",
        "sd a4, 12*8(sp)",
        "sd a5, 13*8(sp)",
        "sd a6, 14*8(sp)",
        "sd a7, 15*8(sp)",
        "mv a0, sp",
        "call __kernel_trap_handler",
        "ld ra, 0*8(sp)",
        "ld t0, 1*8(sp)",
        "ld t1, 2*8(sp)",
        "ld t2, 3*8(sp)",
        "ld t3, 4*8(sp)",
        "ld t4, 5*8(sp)",
        "ld t5, 6*8(sp)",
        "ld t6, 7*8(sp)",
        "ld a0, 8*8(sp)",
        "ld a1, 9*8(sp)",
        "ld a2, 10*8(sp)",
        "ld a3, 11*8(sp)",
        "ld a4, 12*8(sp)",
        "ld a5, 13*8(sp)",
        "ld a6, 14*8(sp)",
        "ld a7, 15*8(sp)",
        "addi sp, sp, 16*8",
        "sret",
    )
}

extern "C" {
    /// Provided by the kernel crate; receives every supervisor trap.
    fn __kernel_trap_handler(frame: &mut TrapFrame);
}

/// First-run exit from the kernel critical section: a freshly created thread
/// calls this from its entry wrapper to start executing its body with
/// interrupts enabled. `sret`s to the caller's return address; `supervisor`
/// (a0) decides whether the body keeps supervisor privilege or drops to user
/// mode.
#[unsafe(naked)]
pub unsafe extern "C" fn return_from_kernel_entry(supervisor: bool) {
    naked_asm!(
        // sret re-enables interrupts from SPIE
        "li t0, {spie}",
        "csrs sstatus, t0",
        "li t0, {spp}",
        "beqz a0, 1f",
        "csrs sstatus, t0",
        "j 2f",
        "1:",
        "csrc sstatus, t0",
        "2:",
        "csrw sepc, ra",
        "sret",
        spie = const platform_specific::SSTATUS_SPIE,
        spp = const platform_specific::SSTATUS_SPP,
    )
}

/// Install the trap vector. Returns the previous `stvec` so shutdown can put
/// it back.
pub fn init_trap() -> usize {
    let old = platform_specific::read_stvec();
    unsafe { stvec::write(__supervisor_trap as usize, stvec::TrapMode::Direct) };
    old
}

/// Restore a raw `stvec` value captured by `init_trap`.
pub fn restore_trap(old_stvec: usize) {
    platform_specific::write_stvec(old_stvec);
}

pub fn translate_current_trap() -> TrapCause {
    match scause::read().bits() {
        SCAUSE_SUPERVISOR_SOFT => TrapCause::SoftwareTimer,
        SCAUSE_SUPERVISOR_TIMER => TrapCause::HardwareTimer,
        SCAUSE_SUPERVISOR_EXTERNAL => TrapCause::External,
        SCAUSE_ECALL_FROM_USER => TrapCause::UserEnvCall,
        SCAUSE_ECALL_FROM_SUPERVISOR => TrapCause::SupervisorEnvCall,
        unknown => TrapCause::Unknown(unknown),
    }
}
