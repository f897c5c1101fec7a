#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

mod errno;
mod syscall_ids;

pub use errno::KernelError;
pub use syscall_ids::SyscallId;

pub const KERNEL_HEAP_SIZE: usize = 0x0080_0000;

/// Stack handed to every kernel-spawned thread. User threads bring their own.
pub const DEFAULT_STACK_SIZE: usize = 0x4000;
pub const STACK_ALIGNMENT: usize = 16;

/// Timer ticks a thread may run before the timer trap forces a dispatch.
pub const DEFAULT_TIME_SLICE: u64 = 2;

pub const INPUT_BUFFER_SIZE: usize = 100;
pub const OUTPUT_BUFFER_SIZE: usize = 100;
