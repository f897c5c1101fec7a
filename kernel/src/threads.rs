//! Thread layer: lifecycle, dispatch, sleep and join.
//!
//! Every function here runs inside the kernel critical section, either
//! because it was entered through a trap (the hardware masks supervisor
//! interrupts) or because a kernel thread wrapped the call in
//! `interrupt_lock`/`interrupt_unlock`. Locks are never held across a
//! context switch.

use core::ptr::{addr_of_mut, null_mut};

use alloc::boxed::Box;
use constants::{KernelError, DEFAULT_STACK_SIZE, DEFAULT_TIME_SLICE};
use hermit_sync::SpinMutex;
use log::debug;
use platform_specific::ThreadContext;
use tasks::{
    allocate_tid, ReadyQueue, ThreadControlBlock, ThreadEntry, ThreadId, ThreadStack,
    ThreadStatus, ThreadTable,
};

use crate::memory;

static THREADS: SpinMutex<ThreadTable> = SpinMutex::new(ThreadTable::new());
static READY: SpinMutex<ReadyQueue> = SpinMutex::new(ReadyQueue::new());

// Single hart; mutated only inside the kernel critical section. The running
// thread cannot live behind a lock because the context switch installs its
// successor mid-operation.
static mut RUNNING: Option<ThreadId> = None;
static mut IDLE_THREAD: Option<ThreadId> = None;

// Global like the slice counter in the timer: a voluntary dispatch does not
// reset it, only an expiry does.
static mut TIME_SLICE_COUNTER: u64 = 0;

// Handed to the switch primitive, which stores false through it right before
// returning into the incoming thread.
static mut KERNEL_LOCK: bool = false;

pub fn running() -> Option<ThreadId> {
    unsafe { RUNNING }
}

/// Bootstrap the thread layer: adopt the boot context as the running
/// (bootstrap) thread and park an idle thread next to the scheduler. Returns
/// (bootstrap, idle) for teardown.
pub fn init() -> (ThreadId, ThreadId) {
    let bootstrap =
        create_thread(None, 0, ThreadStack::None, true).expect("bootstrap thread allocation");

    let idle_stack = memory::try_alloc_stack(DEFAULT_STACK_SIZE).expect("idle thread stack");
    let idle = new_thread(
        Some(idle_thread_body),
        0,
        ThreadStack::Owned(idle_stack),
        true,
    )
    .expect("idle thread control block");
    let idle_id = idle.id;

    // The idle thread is never enqueued; dispatch falls back to it when the
    // ready queue dries up
    THREADS.lock().insert(idle);
    unsafe { IDLE_THREAD = Some(idle_id) };

    debug!("thread layer up, bootstrap {bootstrap}, idle {idle_id}");
    (bootstrap, idle_id)
}

fn new_thread(
    entry: Option<ThreadEntry>,
    arg: usize,
    stack: ThreadStack,
    supervisor: bool,
) -> Option<Box<ThreadControlBlock>> {
    let id = allocate_tid();
    let mut tcb =
        ThreadControlBlock::new(id, entry, arg, stack, thread_entry_wrapper as usize);
    tcb.supervisor = supervisor;
    memory::try_box(tcb)
}

/// Register a new thread. A null body adopts the caller's context as the
/// bootstrap thread and installs it as running; everything else lands at the
/// tail of the ready queue. None when the allocator is exhausted.
pub fn create_thread(
    entry: Option<ThreadEntry>,
    arg: usize,
    stack: ThreadStack,
    supervisor: bool,
) -> Option<ThreadId> {
    let mut tcb = new_thread(entry, arg, stack, supervisor)?;
    let id = tcb.id;

    if tcb.is_bootstrap() {
        tcb.status = ThreadStatus::Running;
        THREADS.lock().insert(tcb);
        unsafe { RUNNING = Some(id) };
    } else {
        THREADS.lock().insert(tcb);
        READY.lock().put(id, false);
    }

    Some(id)
}

/// Spawn a supervisor-mode kernel worker on a kernel-owned stack.
pub fn spawn_kernel_thread(entry: ThreadEntry, arg: usize) -> Option<ThreadId> {
    platform_specific::interrupt_lock();
    let stack = memory::try_alloc_stack(DEFAULT_STACK_SIZE);
    let id = stack.and_then(|s| create_thread(Some(entry), arg, ThreadStack::Owned(s), true));
    platform_specific::interrupt_unlock();
    id
}

/// Spawn a user-mode thread on a kernel-owned stack (the user-main thread).
pub fn spawn_user_thread(entry: ThreadEntry, arg: usize) -> Option<ThreadId> {
    platform_specific::interrupt_lock();
    let stack = memory::try_alloc_stack(DEFAULT_STACK_SIZE);
    let id = stack.and_then(|s| create_thread(Some(entry), arg, ThreadStack::Owned(s), false));
    platform_specific::interrupt_unlock();
    id
}

/// First code a fresh thread executes, by way of its context's saved `ra`.
extern "C" fn thread_entry_wrapper() -> ! {
    // Interrupts are still masked; read what the body needs before leaving
    // the critical section
    let (entry, arg, supervisor) = {
        let threads = THREADS.lock();
        let tcb = threads
            .get(running().expect("entry wrapper without a running thread"))
            .expect("running thread not in table");
        (
            tcb.entry.expect("entry wrapper on the bootstrap thread"),
            tcb.arg,
            tcb.supervisor,
        )
    };

    // Leave the kernel: interrupts on, privilege per thread kind
    unsafe { platform_abstractions::return_from_kernel_entry(supervisor) };

    entry(arg);

    // The body returned; retire the thread
    if supervisor {
        platform_specific::interrupt_lock();
        exit_current();
    } else {
        crate::usercalls::thread_exit();
    }
    unreachable!()
}

extern "C" fn idle_thread_body(_arg: usize) {
    loop {
        platform_specific::wait_for_interrupt();
    }
}

fn select_next(threads: &ThreadTable, ready: &mut ReadyQueue) -> Option<ThreadId> {
    while let Some(id) = ready.get() {
        // Deleted while queued, or suspended by a join after being readied
        if !threads.contains(id) || threads.is_suspended(id) {
            continue;
        }
        return Some(id);
    }
    None
}

/// Yield the CPU. With `put_old_in_ready` the caller goes back to the tail of
/// the ready queue (unless it is mid-`sleep` or finished); without it the
/// caller must already be parked somewhere that will eventually re-ready it.
pub fn dispatch(put_old_in_ready: bool) {
    let Some(old_id) = running() else {
        return;
    };

    let idle = unsafe { IDLE_THREAD };

    let old_ctx: *mut ThreadContext;
    let new_ctx: *const ThreadContext;
    {
        let mut threads = THREADS.lock();
        let mut ready = READY.lock();

        // The idle thread is installed as a fallback, never enqueued
        if put_old_in_ready && Some(old_id) != idle {
            let old = threads.get_mut(old_id).expect("running thread not in table");
            if !old.finished && ready.put_unless_sleeping(old) {
                old.status = ThreadStatus::Ready;
            }
        }

        let next_id = select_next(&threads, &mut ready)
            .or(idle)
            .unwrap_or(old_id);
        if next_id == old_id {
            // select_next already pulled it off the queue, keep it on the CPU
            threads.get_mut(old_id).expect("running thread not in table").status =
                ThreadStatus::Running;
            return;
        }

        old_ctx = &mut threads.get_mut(old_id).expect("old thread vanished").context
            as *mut ThreadContext;
        let next = threads.get_mut(next_id).expect("chosen thread vanished");
        next.status = ThreadStatus::Running;
        new_ctx = &next.context as *const ThreadContext;
        unsafe { RUNNING = Some(next_id) };
    }

    unsafe {
        KERNEL_LOCK = true;
        platform_abstractions::switch_context(old_ctx, new_ctx, addr_of_mut!(KERNEL_LOCK));
    }
}

/// Tear a thread down: wake its joiners, release its storage and, when the
/// victim is on the CPU, jump to a successor without saving anything.
pub fn delete_thread(handle: ThreadId) -> isize {
    let mut threads = THREADS.lock();

    let is_bootstrap = match threads.get(handle) {
        None => return KernelError::InvalidArgument,
        Some(tcb) => tcb.is_bootstrap(),
    };

    if is_bootstrap {
        // The boot context owns no stack; this is pure bookkeeping
        threads.remove(handle);
        if running() == Some(handle) {
            unsafe { RUNNING = None };
        }
        return KernelError::Success;
    }

    let waiters = core::mem::take(
        &mut threads
            .get_mut(handle)
            .expect("victim vanished")
            .join_waiters,
    );
    {
        let mut ready = READY.lock();
        for waiter in waiters {
            threads.resume(waiter);
            if let Some(tcb) = threads.get_mut(waiter) {
                tcb.status = ThreadStatus::Ready;
                ready.put(waiter, false);
            }
        }
    }

    let was_running = running() == Some(handle);
    threads.resume(handle);
    let victim = threads.remove(handle).expect("victim vanished");

    if !was_running {
        drop(threads);
        free_thread(victim);
        return KernelError::Success;
    }

    let new_ctx: *const ThreadContext;
    {
        let mut ready = READY.lock();
        let next_id = select_next(&threads, &mut ready)
            .or(unsafe { IDLE_THREAD })
            .expect("no runnable thread left");
        let next = threads.get_mut(next_id).expect("chosen thread vanished");
        next.status = ThreadStatus::Running;
        new_ctx = &next.context as *const ThreadContext;
        unsafe { RUNNING = Some(next_id) };
    }
    drop(threads);

    // Still executing on the victim's stack: release it, allocate nothing,
    // and leave. Nothing reuses the freed block before the switch.
    free_thread(victim);

    unsafe {
        KERNEL_LOCK = true;
        platform_abstractions::switch_context(null_mut(), new_ctx, addr_of_mut!(KERNEL_LOCK));
    }
    unreachable!()
}

fn free_thread(mut victim: Box<ThreadControlBlock>) {
    if let ThreadStack::Borrowed(base) = victim.stack {
        victim.stack = ThreadStack::None;
        memory::user_free(base as *mut u8);
    }
    // Control block and any owned stack drop here
}

/// The `thread_exit` path: mark the caller finished and delete it. Only
/// returns on failure.
pub fn exit_current() -> isize {
    match running() {
        Some(id) => {
            if let Some(tcb) = THREADS.lock().get_mut(id) {
                tcb.finished = true;
                tcb.status = ThreadStatus::Finished;
            }
            delete_thread(id)
        }
        None => KernelError::InvalidArgument,
    }
}

/// The `thread_join` path. Joining yourself or a dead handle returns
/// immediately; otherwise the caller parks until the target is deleted.
pub fn join(target: ThreadId) {
    let Some(me) = running() else {
        return;
    };

    {
        let mut threads = THREADS.lock();
        if target == me || !threads.contains(target) {
            return;
        }

        threads.suspend(me);
        threads
            .get_mut(target)
            .expect("join target vanished")
            .join_waiters
            .push(me);
        threads.get_mut(me).expect("caller vanished").status = ThreadStatus::Joining;
    }

    dispatch(false);
}

/// Join from a kernel thread running outside a trap.
pub fn join_blocking(target: ThreadId) {
    platform_specific::interrupt_lock();
    join(target);
    platform_specific::interrupt_unlock();
}

/// The `time_sleep` path. Rejects a nested sleep, ignores a zero request,
/// otherwise parks the caller until the timer counts the ticks down.
pub fn sleep(ticks: u64) -> isize {
    let Some(me) = running() else {
        return KernelError::InvalidArgument;
    };

    {
        let mut threads = THREADS.lock();
        let tcb = threads.get_mut(me).expect("running thread not in table");

        if tcb.sleep_ticks > 0 {
            return KernelError::AlreadySleeping;
        }
        if ticks == 0 {
            return KernelError::Success;
        }

        tcb.sleep_ticks = ticks;
        tcb.status = ThreadStatus::Sleeping;
    }

    dispatch(false);
    KernelError::Success
}

/// Park the caller on a semaphore wait queue it was just appended to.
pub fn block_current_on_semaphore() {
    if let Some(me) = running() {
        if let Some(tcb) = THREADS.lock().get_mut(me) {
            tcb.status = ThreadStatus::Waiting;
            tcb.pending_wait_result = KernelError::Success;
        }
    }
    dispatch(false);
}

/// Resume value for a thread that just came back from a semaphore block.
pub fn take_wait_result(id: ThreadId) -> isize {
    THREADS
        .lock()
        .get(id)
        .map(|tcb| tcb.pending_wait_result)
        .unwrap_or(KernelError::InvalidArgument)
}

/// Move a blocked thread back to the ready queue, optionally overriding the
/// value its `sem_wait` returns (semaphore teardown).
pub fn wake_thread(id: ThreadId, wait_result: Option<isize>) {
    let mut threads = THREADS.lock();
    if let Some(tcb) = threads.get_mut(id) {
        if let Some(result) = wait_result {
            tcb.pending_wait_result = result;
        }
        tcb.status = ThreadStatus::Ready;
        READY.lock().put(id, false);
    }
}

/// One timer tick: age the sleepers, then preempt the running thread if its
/// slice is up. The caller is the trap dispatcher; `sepc`/`sstatus` must
/// survive the nested dispatch, so they are parked in locals around it.
pub fn handle_timer_tick() {
    if running().is_none() {
        return;
    }

    let woken = THREADS.lock().tick_sleepers();
    if !woken.is_empty() {
        let mut ready = READY.lock();
        for id in woken {
            ready.put(id, false);
        }
    }

    unsafe { TIME_SLICE_COUNTER += 1 };
    let expired = unsafe { TIME_SLICE_COUNTER } >= current_time_slice();

    if expired {
        let sepc = platform_specific::read_sepc();
        let sstatus = platform_specific::read_sstatus();

        unsafe { TIME_SLICE_COUNTER = 0 };
        dispatch(true);

        platform_specific::write_sstatus(sstatus);
        platform_specific::write_sepc(sepc);
    }
}

fn current_time_slice() -> u64 {
    running()
        .and_then(|id| THREADS.lock().get(id).map(|tcb| tcb.time_slice))
        .unwrap_or(DEFAULT_TIME_SLICE)
}
