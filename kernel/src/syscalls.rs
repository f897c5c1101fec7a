//! System-call decode and argument marshalling. Codes arrive in the `a0`
//! slot of the trap frame, arguments in `a1..`, and the return value goes
//! back through `a0`.

use constants::{KernelError, SyscallId};
use platform_abstractions::TrapFrame;
use sync::SemaphoreId;
use tasks::{ThreadEntry, ThreadId, ThreadStack};

use crate::console;
use crate::memory;
use crate::semaphores;
use crate::threads;
use crate::trap;

pub fn dispatch_syscall(frame: &mut TrapFrame) {
    let id = match SyscallId::try_from(frame.syscall_code()) {
        Ok(id) => id,
        // Out of range or unmapped: same fate as an unknown trap cause
        Err(_) => trap::handle_unknown_trap(platform_specific::read_scause()),
    };

    match id {
        SyscallId::MemAlloc => {
            let size = frame.arg(1);
            frame.set_return_value(memory::user_alloc(size) as usize);
        }
        SyscallId::MemFree => {
            let ptr = frame.arg(1) as *mut u8;
            frame.set_return_value(memory::user_free(ptr) as usize);
        }
        SyscallId::ThreadCreate => handle_thread_create(frame),
        SyscallId::ThreadExit => {
            let result = threads::exit_current();
            frame.set_return_value(result as usize);
        }
        SyscallId::ThreadDispatch => threads::dispatch(true),
        SyscallId::ThreadJoin => {
            threads::join(ThreadId::from_raw(frame.arg(1)));
        }
        SyscallId::SemOpen => handle_sem_open(frame),
        SyscallId::SemClose => {
            let handle = SemaphoreId::from_raw(frame.arg(1));
            frame.set_return_value(semaphores::close(handle) as usize);
        }
        SyscallId::SemWait => {
            let handle = SemaphoreId::from_raw(frame.arg(1));
            frame.set_return_value(semaphores::wait(handle) as usize);
        }
        SyscallId::SemSignal => {
            let handle = SemaphoreId::from_raw(frame.arg(1));
            frame.set_return_value(semaphores::signal(handle) as usize);
        }
        SyscallId::TimeSleep => {
            let ticks = frame.arg(1) as u64;
            frame.set_return_value(threads::sleep(ticks) as usize);
        }
        SyscallId::GetChar => {
            frame.set_return_value(console::get_char() as usize);
        }
        SyscallId::PutChar => {
            console::put_char(frame.arg(1) as u8);
        }
    }
}

fn handle_thread_create(frame: &mut TrapFrame) {
    let handle_out = frame.arg(1) as *mut usize;
    let body_raw = frame.arg(2);
    let arg = frame.arg(3);
    let stack_base = frame.arg(4);

    // A null body is the kernel-internal bootstrap case, never a valid
    // request from user code
    if handle_out.is_null() || body_raw == 0 || stack_base == 0 {
        frame.set_return_value(KernelError::InvalidArgument as usize);
        return;
    }

    let entry = unsafe { core::mem::transmute::<usize, ThreadEntry>(body_raw) };

    match threads::create_thread(Some(entry), arg, ThreadStack::Borrowed(stack_base), false) {
        Some(id) => {
            unsafe { handle_out.write(id.raw()) };
            frame.set_return_value(KernelError::Success as usize);
        }
        None => {
            unsafe { handle_out.write(0) };
            frame.set_return_value(KernelError::OutOfMemory as usize);
        }
    }
}

fn handle_sem_open(frame: &mut TrapFrame) {
    let handle_out = frame.arg(1) as *mut usize;
    let initial = frame.arg(2);

    if handle_out.is_null() {
        frame.set_return_value(KernelError::InvalidArgument as usize);
        return;
    }

    match semaphores::open(initial) {
        Some(id) => {
            unsafe { handle_out.write(id.raw()) };
            frame.set_return_value(KernelError::Success as usize);
        }
        None => {
            unsafe { handle_out.write(0) };
            frame.set_return_value(KernelError::OutOfMemory as usize);
        }
    }
}
