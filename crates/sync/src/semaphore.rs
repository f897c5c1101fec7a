use alloc::collections::VecDeque;
use alloc::vec::Vec;

use tasks::ThreadId;

/// What `wait` asks its caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The decrement stayed non-negative; carry on.
    Acquired,
    /// The caller was appended to the wait queue and must give up the CPU.
    Block,
}

/// What `signal` asks its caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Nothing,
    /// Move this thread (the longest-waiting one) back to the ready queue.
    Wake(ThreadId),
}

/// Counting semaphore bookkeeping, detached from the machinery that actually
/// suspends threads. The kernel drives it from inside the interrupt-masked
/// critical section and acts on the returned outcomes.
///
/// Invariant: `value >= 0` implies no waiters; `value < 0` implies exactly
/// `-value` waiters, queued in the order their `wait` calls arrived.
pub struct Semaphore {
    value: isize,
    waiters: VecDeque<ThreadId>,
    edge_triggered: bool,
}

impl Semaphore {
    pub fn new(initial: usize) -> Self {
        Semaphore {
            value: initial as isize,
            waiters: VecDeque::new(),
            edge_triggered: false,
        }
    }

    /// Interrupt-fed variant used for the UART transmit-ready line: signals
    /// arriving while nobody waits collapse into a single buffered release,
    /// so a burst of ready interrupts cannot grow the value without bound.
    pub fn new_edge_triggered() -> Self {
        Semaphore {
            value: 0,
            waiters: VecDeque::new(),
            edge_triggered: true,
        }
    }

    pub fn value(&self) -> isize {
        self.value
    }

    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }

    /// Decrement; on a negative result the caller joins the wait queue and
    /// must block.
    pub fn wait(&mut self, caller: ThreadId) -> WaitOutcome {
        self.value -= 1;
        if self.value < 0 {
            self.waiters.push_back(caller);
            WaitOutcome::Block
        } else {
            WaitOutcome::Acquired
        }
    }

    /// Non-suspending form for interrupt context: acquire only if no blocking
    /// would be needed.
    pub fn try_wait(&mut self) -> bool {
        if self.value > 0 {
            self.value -= 1;
            true
        } else {
            false
        }
    }

    /// Increment; if someone was blocked, hand back the head of the queue.
    pub fn signal(&mut self) -> SignalOutcome {
        if self.edge_triggered && self.value >= 0 {
            debug_assert!(self.waiters.is_empty());
            self.value = 1;
            return SignalOutcome::Nothing;
        }

        self.value += 1;
        match self.waiters.pop_front() {
            Some(woken) => SignalOutcome::Wake(woken),
            None => SignalOutcome::Nothing,
        }
    }

    /// Tear down: every blocked thread is drained, in FIFO order, to be
    /// resumed with an error by the caller.
    pub fn close(&mut self) -> Vec<ThreadId> {
        self.value = 0;
        self.waiters.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Semaphore, SignalOutcome, WaitOutcome};
    use tasks::{allocate_tid, ThreadId};
    use alloc::vec::Vec;

    fn check_invariant(sem: &Semaphore) {
        if sem.value() >= 0 {
            assert_eq!(sem.waiter_count(), 0);
        } else {
            assert_eq!(sem.waiter_count(), (-sem.value()) as usize);
        }
    }

    fn tids(count: usize) -> Vec<ThreadId> {
        (0..count).map(|_| allocate_tid()).collect()
    }

    #[test]
    fn test_wait_blocks_below_zero() {
        let mut sem = Semaphore::new(1);
        let ids = tids(2);

        assert_eq!(sem.wait(ids[0]), WaitOutcome::Acquired);
        check_invariant(&sem);
        assert_eq!(sem.wait(ids[1]), WaitOutcome::Block);
        check_invariant(&sem);
        assert_eq!(sem.value(), -1);
    }

    #[test]
    fn test_signal_wakes_in_fifo_order() {
        let mut sem = Semaphore::new(0);
        let ids = tids(3);

        for id in &ids {
            assert_eq!(sem.wait(*id), WaitOutcome::Block);
        }
        check_invariant(&sem);

        assert_eq!(sem.signal(), SignalOutcome::Wake(ids[0]));
        assert_eq!(sem.signal(), SignalOutcome::Wake(ids[1]));
        assert_eq!(sem.signal(), SignalOutcome::Wake(ids[2]));
        assert_eq!(sem.signal(), SignalOutcome::Nothing);
        check_invariant(&sem);
    }

    #[test]
    fn test_releases_are_min_of_waits_and_capacity() {
        // With initial value n, N waiters and M signals, exactly
        // min(N, M + n) threads get through.
        let (n, big_n, m) = (2usize, 7usize, 3usize);

        let mut sem = Semaphore::new(n);
        let ids = tids(big_n);

        let mut proceeded = 0;
        for id in &ids {
            if sem.wait(*id) == WaitOutcome::Acquired {
                proceeded += 1;
            }
        }
        for _ in 0..m {
            if let SignalOutcome::Wake(_) = sem.signal() {
                proceeded += 1;
            }
        }

        assert_eq!(proceeded, big_n.min(m + n));
        check_invariant(&sem);
    }

    #[test]
    fn test_mutex_style_usage_serializes() {
        let mut sem = Semaphore::new(1);
        let ids = tids(3);

        assert_eq!(sem.wait(ids[0]), WaitOutcome::Acquired);
        assert_eq!(sem.wait(ids[1]), WaitOutcome::Block);
        assert_eq!(sem.wait(ids[2]), WaitOutcome::Block);

        // Each holder hands the section to exactly one successor
        assert_eq!(sem.signal(), SignalOutcome::Wake(ids[1]));
        assert_eq!(sem.signal(), SignalOutcome::Wake(ids[2]));
        assert_eq!(sem.signal(), SignalOutcome::Nothing);
        assert_eq!(sem.value(), 1);
    }

    #[test]
    fn test_close_drains_every_waiter() {
        let mut sem = Semaphore::new(0);
        let ids = tids(4);

        for id in &ids {
            sem.wait(*id);
        }

        assert_eq!(sem.close(), ids);
        assert_eq!(sem.waiter_count(), 0);
    }

    #[test]
    fn test_edge_triggered_absorbs_spurious_signals() {
        let mut sem = Semaphore::new_edge_triggered();

        // A burst of ready interrupts with nobody listening
        for _ in 0..10 {
            assert_eq!(sem.signal(), SignalOutcome::Nothing);
        }
        assert_eq!(sem.value(), 1);

        // One buffered release, then blocking resumes
        let ids = tids(2);
        assert_eq!(sem.wait(ids[0]), WaitOutcome::Acquired);
        assert_eq!(sem.wait(ids[1]), WaitOutcome::Block);
        assert_eq!(sem.signal(), SignalOutcome::Wake(ids[1]));
    }

    #[test]
    fn test_try_wait_never_goes_negative() {
        let mut sem = Semaphore::new(1);

        assert!(sem.try_wait());
        assert!(!sem.try_wait());
        assert_eq!(sem.value(), 0);
        check_invariant(&sem);
    }

    // The console pairs each byte queue with an empty/full semaphore pair.
    // Replay a producer/consumer interleaving against a small queue and check
    // that backpressure blocks the producer instead of dropping bytes.
    #[test]
    fn test_bounded_queue_coupling() {
        use collections::ByteQueue;

        const CAP: usize = 4;
        let mut queue = ByteQueue::<CAP>::new();
        let mut empty = Semaphore::new(CAP);
        let mut full = Semaphore::new(0);

        let producer = allocate_tid();
        let mut sent = Vec::new();
        let mut received = Vec::new();
        let mut producer_blocked = false;

        let mut next: u8 = 0;
        while received.len() < 10 {
            // Producer runs until the empty-slot semaphore blocks it
            while !producer_blocked && next < 10 {
                match empty.wait(producer) {
                    WaitOutcome::Acquired => {
                        assert!(queue.push_back(next));
                        sent.push(next);
                        next += 1;
                        full.signal();
                    }
                    WaitOutcome::Block => producer_blocked = true,
                }
            }

            // Consumer drains one byte and frees a slot
            assert!(full.try_wait());
            received.push(queue.pop_front().unwrap());
            if let SignalOutcome::Wake(id) = empty.signal() {
                // A woken producer resumes owning the slot it waited for
                assert_eq!(id, producer);
                assert!(queue.push_back(next));
                sent.push(next);
                next += 1;
                full.signal();
                producer_blocked = false;
            }
        }

        assert_eq!(sent, received);
        assert_eq!(received, (0..10).collect::<Vec<u8>>());
    }
}
