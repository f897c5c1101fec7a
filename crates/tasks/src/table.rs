use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use log::trace;

use crate::{ThreadControlBlock, ThreadId, ThreadStatus};

/// Every live thread, keyed by id. Because ids are allocated monotonically,
/// iteration order is creation order; sleepers therefore wake in creation
/// order when several counters expire on the same tick.
///
/// Also tracks the suspended set: threads blocked in `thread_join`. The
/// scheduler skips anything in it that leaks into the ready queue.
pub struct ThreadTable {
    threads: BTreeMap<ThreadId, Box<ThreadControlBlock>>,
    suspended: Vec<ThreadId>,
}

impl ThreadTable {
    pub const fn new() -> Self {
        ThreadTable {
            threads: BTreeMap::new(),
            suspended: Vec::new(),
        }
    }

    pub fn insert(&mut self, tcb: Box<ThreadControlBlock>) {
        let id = tcb.id;
        let previous = self.threads.insert(id, tcb);
        debug_assert!(previous.is_none(), "thread {} registered twice", id);
    }

    pub fn remove(&mut self, id: ThreadId) -> Option<Box<ThreadControlBlock>> {
        self.threads.remove(&id)
    }

    pub fn get(&self, id: ThreadId) -> Option<&ThreadControlBlock> {
        self.threads.get(&id).map(Box::as_ref)
    }

    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut ThreadControlBlock> {
        self.threads.get_mut(&id).map(Box::as_mut)
    }

    pub fn contains(&self, id: ThreadId) -> bool {
        self.threads.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn suspend(&mut self, id: ThreadId) {
        debug_assert!(!self.is_suspended(id));
        self.suspended.push(id);
    }

    pub fn resume(&mut self, id: ThreadId) {
        self.suspended.retain(|s| *s != id);
    }

    pub fn is_suspended(&self, id: ThreadId) -> bool {
        self.suspended.contains(&id)
    }

    /// One timer tick: count down every pending sleep and return the threads
    /// whose counter just ran out, ready to be scheduled again.
    pub fn tick_sleepers(&mut self) -> Vec<ThreadId> {
        let mut woken = Vec::new();

        for (id, tcb) in self.threads.iter_mut() {
            if tcb.sleep_ticks == 0 {
                continue;
            }

            tcb.sleep_ticks -= 1;
            if tcb.sleep_ticks == 0 {
                tcb.status = ThreadStatus::Ready;
                trace!("thread {} finished sleeping", id);
                woken.push(*id);
            }
        }

        woken
    }
}

impl Default for ThreadTable {
    fn default() -> Self {
        ThreadTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::ThreadTable;
    use crate::{allocate_tid, ThreadControlBlock, ThreadId, ThreadStack, ThreadStatus};
    use alloc::boxed::Box;
    use alloc::vec::Vec;

    fn spawn(table: &mut ThreadTable, sleep_ticks: u64) -> ThreadId {
        let mut tcb = ThreadControlBlock::new(allocate_tid(), None, 0, ThreadStack::None, 0);
        tcb.sleep_ticks = sleep_ticks;
        if sleep_ticks != 0 {
            tcb.status = ThreadStatus::Sleeping;
        }
        let id = tcb.id;
        table.insert(Box::new(tcb));
        id
    }

    #[test]
    fn test_sleepers_wake_in_deadline_order() {
        let mut table = ThreadTable::new();

        // Three sleepers with deadlines out of creation order
        let long = spawn(&mut table, 30);
        let short = spawn(&mut table, 10);
        let mid = spawn(&mut table, 20);

        let mut wakes: Vec<(u64, ThreadId)> = Vec::new();
        for tick in 1..=35 {
            for id in table.tick_sleepers() {
                wakes.push((tick, id));
            }
        }

        assert_eq!(wakes, alloc::vec![(10, short), (20, mid), (30, long)]);
    }

    #[test]
    fn test_same_tick_wakes_follow_creation_order() {
        let mut table = ThreadTable::new();

        let first = spawn(&mut table, 3);
        let second = spawn(&mut table, 3);
        let third = spawn(&mut table, 3);

        assert!(table.tick_sleepers().is_empty());
        assert!(table.tick_sleepers().is_empty());
        assert_eq!(table.tick_sleepers(), alloc::vec![first, second, third]);
    }

    #[test]
    fn test_woken_thread_is_marked_ready() {
        let mut table = ThreadTable::new();
        let id = spawn(&mut table, 1);

        assert_eq!(table.tick_sleepers(), alloc::vec![id]);
        let tcb = table.get(id).unwrap();
        assert_eq!(tcb.sleep_ticks, 0);
        assert_eq!(tcb.status, ThreadStatus::Ready);
    }

    #[test]
    fn test_suspension_membership() {
        let mut table = ThreadTable::new();
        let id = spawn(&mut table, 0);

        assert!(!table.is_suspended(id));
        table.suspend(id);
        assert!(table.is_suspended(id));
        table.resume(id);
        assert!(!table.is_suspended(id));
    }
}
