#![no_std]

#[cfg(target_arch = "riscv64")]
mod riscv64;

#[cfg(target_arch = "riscv64")]
pub use riscv64::*;

mod trap_cause;

pub use trap_cause::TrapCause;
