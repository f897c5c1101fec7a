#![no_std]

#[allow(private_interfaces)]
#[cfg(not(target_arch = "riscv64"))]
pub type ThreadContext = context::DummyThreadContext;

#[cfg(target_arch = "riscv64")]
mod riscv64;

#[cfg(target_arch = "riscv64")]
pub use riscv64::*;

#[cfg(target_arch = "riscv64")]
pub type ThreadContext = riscv64::SavedThreadContext;

mod context;
mod serial;

pub use context::IThreadContext;
pub use serial::*;
