//! Blocking face of the counting semaphores: couples the bookkeeping in the
//! `sync` crate to the thread layer. Handles are opaque ids validated on
//! every call; a closed handle simply stops resolving.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use constants::KernelError;
use hermit_sync::SpinMutex;
use sync::{allocate_sid, Semaphore, SemaphoreId, SignalOutcome, WaitOutcome};

use crate::memory;
use crate::threads;

static SEMAPHORES: SpinMutex<BTreeMap<SemaphoreId, Box<Semaphore>>> =
    SpinMutex::new(BTreeMap::new());

fn register(sem: Option<Box<Semaphore>>) -> Option<SemaphoreId> {
    let sem = sem?;
    let id = allocate_sid();
    SEMAPHORES.lock().insert(id, sem);
    Some(id)
}

/// The `sem_open` path. None when the allocator is exhausted.
pub fn open(initial: usize) -> Option<SemaphoreId> {
    register(memory::try_box(Semaphore::new(initial)))
}

/// The transmit-ready semaphore of the console driver.
pub fn open_edge_triggered() -> Option<SemaphoreId> {
    register(memory::try_box(Semaphore::new_edge_triggered()))
}

/// The `sem_close` path: drop the semaphore and resume every blocked thread
/// with an error return from its pending `sem_wait`.
pub fn close(id: SemaphoreId) -> isize {
    let drained = {
        let mut semaphores = SEMAPHORES.lock();
        match semaphores.remove(&id) {
            None => return KernelError::InvalidArgument,
            Some(mut sem) => sem.close(),
        }
    };

    for waiter in drained {
        threads::wake_thread(waiter, Some(KernelError::SemaphoreClosed));
    }

    KernelError::Success
}

/// The `sem_wait` path. Returns zero when the caller got through, negative
/// when the handle is bad or the semaphore was closed while the caller was
/// blocked on it.
pub fn wait(id: SemaphoreId) -> isize {
    let Some(me) = threads::running() else {
        return KernelError::InvalidArgument;
    };

    let outcome = {
        let mut semaphores = SEMAPHORES.lock();
        match semaphores.get_mut(&id) {
            None => return KernelError::InvalidArgument,
            Some(sem) => sem.wait(me),
        }
    };

    match outcome {
        WaitOutcome::Acquired => KernelError::Success,
        WaitOutcome::Block => {
            threads::block_current_on_semaphore();
            // Back on the CPU: either a signal or a close resumed us
            threads::take_wait_result(me)
        }
    }
}

/// Current counter value, for diagnostics and the console flush.
pub fn value(id: SemaphoreId) -> Option<isize> {
    SEMAPHORES.lock().get(&id).map(|sem| sem.value())
}

/// Interrupt-context form: acquire only if it cannot block.
pub fn try_wait(id: SemaphoreId) -> bool {
    SEMAPHORES
        .lock()
        .get_mut(&id)
        .map(|sem| sem.try_wait())
        .unwrap_or(false)
}

/// The `sem_signal` path.
pub fn signal(id: SemaphoreId) -> isize {
    let outcome = {
        let mut semaphores = SEMAPHORES.lock();
        match semaphores.get_mut(&id) {
            None => return KernelError::InvalidArgument,
            Some(sem) => sem.signal(),
        }
    };

    if let SignalOutcome::Wake(waiter) = outcome {
        threads::wake_thread(waiter, None);
    }

    KernelError::Success
}

/// `wait` for kernel threads running outside a trap.
pub fn wait_blocking(id: SemaphoreId) -> isize {
    platform_specific::interrupt_lock();
    let result = wait(id);
    platform_specific::interrupt_unlock();
    result
}

/// `signal` for kernel threads running outside a trap.
pub fn signal_blocking(id: SemaphoreId) -> isize {
    platform_specific::interrupt_lock();
    let result = signal(id);
    platform_specific::interrupt_unlock();
    result
}
