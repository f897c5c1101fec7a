#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ThreadStatus {
    /// Waiting in the ready queue.
    Ready = 0,
    /// On the CPU.
    Running = 1,
    /// Blocked until the sleep counter runs out.
    Sleeping = 2,
    /// Blocked in `thread_join` on a live target.
    Joining = 3,
    /// Blocked on a semaphore.
    Waiting = 4,
    /// Body returned or `thread_exit` was issued. Terminal.
    Finished = 5,
}
