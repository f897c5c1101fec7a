#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod semaphore;
mod sid;

pub use semaphore::{Semaphore, SignalOutcome, WaitOutcome};
pub use sid::{allocate_sid, SemaphoreId};
