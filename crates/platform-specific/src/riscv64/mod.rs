mod context;
mod plic;
mod registers;
mod serial;

use core::ffi::CStr;

pub use context::SavedThreadContext;

pub use plic::*;
pub use registers::*;
pub use serial::*;

pub const PLATFORM_STRING: &CStr = c"RISC-V64";
