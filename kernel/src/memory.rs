//! Kernel heap plus the allocation surface behind `mem_alloc`/`mem_free`.
//!
//! Everything comes out of one buddy heap over a .bss arena. User blocks
//! carry a size header right below the returned pointer so `mem_free` can
//! reconstruct the layout from the bare pointer.

use core::alloc::Layout;
use core::ptr::null_mut;

use alloc::boxed::Box;
use alloc::vec::Vec;
use buddy_system_allocator::LockedHeap;
use constants::{KernelError, KERNEL_HEAP_SIZE, STACK_ALIGNMENT};
use log::debug;

#[global_allocator]
static GLOBAL_ALLOCATOR: LockedHeap<32> = LockedHeap::empty();

#[link_section = ".bss.heap"]
static mut HEAP_SPACE: [u8; KERNEL_HEAP_SIZE] = [0; KERNEL_HEAP_SIZE];

pub fn init() {
    unsafe {
        let start = core::ptr::addr_of_mut!(HEAP_SPACE) as usize;
        GLOBAL_ALLOCATOR.lock().init(start, KERNEL_HEAP_SIZE);
    }

    debug!("kernel heap ready, {} bytes", KERNEL_HEAP_SIZE);
}

/// Fallible boxing. `Box::new` aborts through the alloc-error hook on
/// exhaustion; control-block allocation has to surface null to the caller
/// instead.
pub fn try_box<T>(value: T) -> Option<Box<T>> {
    let layout = Layout::new::<T>();
    debug_assert!(layout.size() != 0);

    let ptr = unsafe { alloc::alloc::alloc(layout) } as *mut T;
    if ptr.is_null() {
        return None;
    }

    unsafe {
        ptr.write(value);
        Some(Box::from_raw(ptr))
    }
}

/// Fallible zeroed stack allocation for kernel-spawned threads.
pub fn try_alloc_stack(size: usize) -> Option<Box<[u8]>> {
    let mut stack = Vec::new();
    stack.try_reserve_exact(size).ok()?;
    stack.resize(size, 0);
    Some(stack.into_boxed_slice())
}

// Size header keeps the user block 16-byte aligned.
const HEADER_SIZE: usize = 16;

/// Backing for the `mem_alloc` system call. Null on exhaustion or a zero
/// request.
pub fn user_alloc(size: usize) -> *mut u8 {
    if size == 0 {
        return null_mut();
    }

    let Some(total) = size.checked_add(HEADER_SIZE) else {
        return null_mut();
    };
    let Ok(layout) = Layout::from_size_align(total, HEADER_SIZE) else {
        return null_mut();
    };

    let base = unsafe { alloc::alloc::alloc(layout) };
    if base.is_null() {
        return null_mut();
    }

    unsafe {
        (base as *mut usize).write(total);
        base.add(HEADER_SIZE)
    }
}

/// Backing for the `mem_free` system call. Only pointers produced by
/// `user_alloc` are meaningful; anything else is rejected when detectably
/// wrong and otherwise unsupported.
pub fn user_free(ptr: *mut u8) -> isize {
    if ptr.is_null() || (ptr as usize) < HEADER_SIZE {
        return KernelError::InvalidArgument;
    }

    let base = unsafe { ptr.sub(HEADER_SIZE) };
    let total = unsafe { (base as *const usize).read() };
    if total <= HEADER_SIZE {
        return KernelError::InvalidArgument;
    }

    let Ok(layout) = Layout::from_size_align(total, HEADER_SIZE) else {
        return KernelError::InvalidArgument;
    };

    unsafe { alloc::alloc::dealloc(base, layout) };
    KernelError::Success
}

const _: () = assert!(HEADER_SIZE >= core::mem::size_of::<usize>());
const _: () = assert!(HEADER_SIZE % STACK_ALIGNMENT == 0);
