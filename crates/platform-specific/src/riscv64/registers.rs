//! Supervisor CSR access. The `riscv` crate covers the typed reads; the raw
//! save/restore pairs and the `sip` bit clear go through `csrr`/`csrs`/`csrc`
//! directly because the trap dispatcher shuttles whole register values.

use core::arch::asm;

pub const SSTATUS_SIE: usize = 1 << 1;
pub const SSTATUS_SPIE: usize = 1 << 5;
pub const SSTATUS_SPP: usize = 1 << 8;

pub const SIP_SSIP: usize = 1 << 1;

/// QEMU virt machine timebase, ticks of the `time` CSR per second.
pub const CLOCK_FREQ: u64 = 10_000_000;

#[inline(always)]
pub fn read_sstatus() -> usize {
    let sstatus: usize;
    unsafe { asm!("csrr {}, sstatus", out(reg) sstatus) };
    sstatus
}

#[inline(always)]
pub fn write_sstatus(sstatus: usize) {
    unsafe { asm!("csrw sstatus, {}", in(reg) sstatus) };
}

#[inline(always)]
pub fn read_sepc() -> usize {
    riscv::register::sepc::read()
}

#[inline(always)]
pub fn write_sepc(sepc: usize) {
    unsafe { riscv::register::sepc::write(sepc) };
}

#[inline(always)]
pub fn read_stval() -> usize {
    riscv::register::stval::read()
}

#[inline(always)]
pub fn read_scause() -> usize {
    riscv::register::scause::read().bits()
}

#[inline(always)]
pub fn read_stvec() -> usize {
    let stvec: usize;
    unsafe { asm!("csrr {}, stvec", out(reg) stvec) };
    stvec
}

#[inline(always)]
pub fn write_stvec(stvec: usize) {
    unsafe { asm!("csrw stvec, {}", in(reg) stvec) };
}

/// Acknowledge a supervisor software interrupt.
#[inline(always)]
pub fn clear_ssip() {
    unsafe { asm!("csrc sip, {}", in(reg) SIP_SSIP) };
}

/// Mask supervisor interrupts, entering the kernel critical section.
#[inline(always)]
pub fn interrupt_lock() {
    unsafe { asm!("csrc sstatus, {}", in(reg) SSTATUS_SIE) };
}

/// Unmask supervisor interrupts, leaving the kernel critical section.
#[inline(always)]
pub fn interrupt_unlock() {
    unsafe { asm!("csrs sstatus, {}", in(reg) SSTATUS_SIE) };
}

/// Allow software, timer and external interrupts to be delivered to
/// supervisor mode. The `sstatus.SIE` gate still decides when.
pub fn enable_interrupt_sources() {
    unsafe {
        riscv::register::sie::set_ssoft();
        riscv::register::sie::set_stimer();
        riscv::register::sie::set_sext();
    }
}

#[inline(always)]
pub fn board_tick() -> u64 {
    riscv::register::time::read64()
}

/// Stall until the next interrupt becomes pending; the idle thread's body.
#[inline(always)]
pub fn wait_for_interrupt() {
    unsafe { asm!("wfi") };
}
