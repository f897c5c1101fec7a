#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

mod byte_queue;

pub use byte_queue::ByteQueue;
