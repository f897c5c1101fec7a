#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod control_block;
mod ready_queue;
mod status;
mod table;
mod tid;

pub use control_block::{ThreadControlBlock, ThreadEntry, ThreadStack};
pub use ready_queue::ReadyQueue;
pub use status::ThreadStatus;
pub use table::ThreadTable;
pub use tid::{allocate_tid, ThreadId};
