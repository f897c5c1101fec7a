use core::sync::atomic::{AtomicUsize, Ordering};

/// Opaque semaphore handle handed out by `sem_open`. Never recycled, so a
/// handle closed long ago keeps failing validation instead of aliasing a
/// newer semaphore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemaphoreId(usize);

impl SemaphoreId {
    pub const fn from_raw(raw: usize) -> SemaphoreId {
        SemaphoreId(raw)
    }

    pub const fn raw(&self) -> usize {
        self.0
    }
}

static NEXT_SEMAPHORE_ID: AtomicUsize = AtomicUsize::new(1);

pub fn allocate_sid() -> SemaphoreId {
    SemaphoreId(NEXT_SEMAPHORE_ID.fetch_add(1, Ordering::Relaxed))
}
