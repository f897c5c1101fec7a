use alloc::boxed::Box;
use alloc::vec::Vec;

use constants::DEFAULT_TIME_SLICE;
use platform_specific::{IThreadContext, ThreadContext};

use crate::{ThreadId, ThreadStatus};

/// Thread body. Runs outside the kernel critical section with the argument it
/// was created with.
pub type ThreadEntry = extern "C" fn(usize);

/// Backing storage of a thread stack.
pub enum ThreadStack {
    /// Allocated and owned by the kernel, freed when the control block drops.
    Owned(Box<[u8]>),
    /// Supplied by user code through `thread_create`; base address of a
    /// `DEFAULT_STACK_SIZE` block obtained from `mem_alloc`. Returned to the
    /// allocator when the thread is deleted.
    Borrowed(usize),
    /// The bootstrap thread runs on the boot stack it was born with.
    None,
}

impl ThreadStack {
    /// Initial stack pointer, one past the highest usable byte.
    pub fn top(&self) -> usize {
        match self {
            ThreadStack::Owned(block) => block.as_ptr() as usize + block.len(),
            ThreadStack::Borrowed(base) => base + constants::DEFAULT_STACK_SIZE,
            ThreadStack::None => 0,
        }
    }
}

pub struct ThreadControlBlock {
    pub id: ThreadId,
    pub entry: Option<ThreadEntry>,
    pub arg: usize,
    pub stack: ThreadStack,
    pub context: ThreadContext,
    pub status: ThreadStatus,
    /// Kernel-internal threads (idle, the console output worker) keep
    /// supervisor privilege when their body starts; user threads drop to
    /// user mode.
    pub supervisor: bool,
    /// Ticks this thread may run before the timer preempts it.
    pub time_slice: u64,
    /// Remaining sleep ticks; zero means not sleeping.
    pub sleep_ticks: u64,
    pub finished: bool,
    /// Return value `sem_wait` hands back when this thread resumes after
    /// blocking; a closing semaphore overwrites it with an error.
    pub pending_wait_result: isize,
    /// Threads blocked in `thread_join` on this one.
    pub join_waiters: Vec<ThreadId>,
}

impl ThreadControlBlock {
    /// Control block for a thread that starts its life in `wrapper_pc` on the
    /// given stack. The bootstrap thread passes `entry = None`; its context
    /// stays empty until the first switch away from it fills it in.
    pub fn new(
        id: ThreadId,
        entry: Option<ThreadEntry>,
        arg: usize,
        stack: ThreadStack,
        wrapper_pc: usize,
    ) -> Self {
        let context = match entry {
            Some(_) => ThreadContext::new(wrapper_pc, stack.top()),
            None => ThreadContext::default(),
        };

        ThreadControlBlock {
            id,
            entry,
            arg,
            stack,
            context,
            status: ThreadStatus::Ready,
            supervisor: false,
            time_slice: DEFAULT_TIME_SLICE,
            sleep_ticks: 0,
            finished: false,
            pending_wait_result: 0,
            join_waiters: Vec::new(),
        }
    }

    /// The bootstrap thread is the boot context itself: no body, no own stack.
    pub fn is_bootstrap(&self) -> bool {
        self.entry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate_tid;

    extern "C" fn nop_body(_arg: usize) {}

    #[test]
    fn test_bootstrap_block_has_no_stack() {
        let tcb = ThreadControlBlock::new(allocate_tid(), None, 0, ThreadStack::None, 0);

        assert!(tcb.is_bootstrap());
        assert_eq!(tcb.stack.top(), 0);
        assert_eq!(tcb.status, ThreadStatus::Ready);
        assert_eq!(tcb.time_slice, DEFAULT_TIME_SLICE);
    }

    #[test]
    fn test_owned_stack_top_is_end_of_block() {
        let block = alloc::vec![0u8; 256].into_boxed_slice();
        let base = block.as_ptr() as usize;

        let tcb = ThreadControlBlock::new(
            allocate_tid(),
            Some(nop_body),
            7,
            ThreadStack::Owned(block),
            0x1000,
        );

        assert!(!tcb.is_bootstrap());
        assert_eq!(tcb.stack.top(), base + 256);
        assert_eq!(tcb.arg, 7);
    }
}
