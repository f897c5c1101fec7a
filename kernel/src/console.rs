//! Interrupt-driven console: two bounded byte queues guarded by counting
//! semaphores, a dedicated output worker thread, and the UART interrupt
//! routine feeding both directions.
//!
//! `put_char` and `get_char` run in the calling thread's kernel entry and
//! block on the paired semaphores; the hardware side never blocks.

use collections::ByteQueue;
use constants::{INPUT_BUFFER_SIZE, OUTPUT_BUFFER_SIZE};
use hermit_sync::SpinMutex;
use log::warn;
use platform_specific::LineStatus;
use sync::SemaphoreId;
use tasks::ThreadId;

use crate::semaphores;
use crate::threads;

static INPUT_QUEUE: SpinMutex<ByteQueue<{ INPUT_BUFFER_SIZE }>> =
    SpinMutex::new(ByteQueue::new());
static OUTPUT_QUEUE: SpinMutex<ByteQueue<{ OUTPUT_BUFFER_SIZE }>> =
    SpinMutex::new(ByteQueue::new());

#[derive(Clone, Copy)]
struct ConsoleSemaphores {
    in_empty: SemaphoreId,
    in_full: SemaphoreId,
    out_empty: SemaphoreId,
    out_full: SemaphoreId,
    /// Edge-triggered: the UART reports transmit readiness, the worker
    /// consumes it.
    tx_ready: SemaphoreId,
}

static SEMS: SpinMutex<Option<ConsoleSemaphores>> = SpinMutex::new(None);

fn sems() -> ConsoleSemaphores {
    SEMS.lock().expect("console used before init")
}

/// Bring up the UART, the PLIC route, the semaphore pairs and the output
/// worker. Returns the worker's id for teardown.
pub fn init() -> ThreadId {
    platform_specific::init_console();
    platform_specific::init_plic();

    let sems = ConsoleSemaphores {
        in_empty: semaphores::open(INPUT_BUFFER_SIZE).expect("console semaphore"),
        in_full: semaphores::open(0).expect("console semaphore"),
        out_empty: semaphores::open(OUTPUT_BUFFER_SIZE).expect("console semaphore"),
        out_full: semaphores::open(0).expect("console semaphore"),
        tx_ready: semaphores::open_edge_triggered().expect("console semaphore"),
    };
    *SEMS.lock() = Some(sems);

    threads::spawn_kernel_thread(output_worker_body, 0).expect("console output worker")
}

/// The `put_char` path: block for a free slot, enqueue, hand the byte to the
/// worker.
pub fn put_char(byte: u8) {
    let sems = sems();
    let _ = semaphores::wait(sems.out_empty);
    OUTPUT_QUEUE.lock().push_back(byte);
    let _ = semaphores::signal(sems.out_full);
}

/// The `get_char` path: block until the interrupt routine delivered a byte.
pub fn get_char() -> u8 {
    let sems = sems();
    let _ = semaphores::wait(sems.in_full);
    let byte = INPUT_QUEUE.lock().pop_front().unwrap_or(0);
    let _ = semaphores::signal(sems.in_empty);
    byte
}

/// Console IRQ, called from the external-interrupt trap with the id already
/// claimed. Transmit readiness feeds the worker's semaphore; received bytes
/// land in the input queue with carriage returns normalized to newlines.
pub fn handle_console_irq() {
    let Some(sems) = *SEMS.lock() else {
        return;
    };

    platform_specific::console_ack_interrupt();
    let status = platform_specific::console_status();

    if status.contains(LineStatus::TX_IDLE) {
        let _ = semaphores::signal(sems.tx_ready);
    }

    if status.contains(LineStatus::DATA_READY) {
        let mut byte = platform_specific::console_read_data();
        if byte == b'\r' {
            byte = b'\n';
        }

        // Interrupt context must not block; a full queue means input faster
        // than anyone consumes it, and the byte is lost
        if semaphores::try_wait(sems.in_empty) {
            INPUT_QUEUE.lock().push_back(byte);
            let _ = semaphores::signal(sems.in_full);
        } else {
            warn!("console input overrun, dropping {:#04x}", byte);
        }
    }
}

/// Spin the bootstrap thread until the worker has drained every queued byte
/// and the UART is idle, so teardown does not truncate pending output.
pub fn flush_blocking() {
    let sems = {
        platform_specific::interrupt_lock();
        let sems = sems();
        platform_specific::interrupt_unlock();
        sems
    };

    loop {
        platform_specific::interrupt_lock();
        let drained = crate::semaphores::value(sems.out_empty)
            == Some(OUTPUT_BUFFER_SIZE as isize);
        platform_specific::interrupt_unlock();

        if drained {
            break;
        }
        crate::usercalls::thread_dispatch();
    }

    while !platform_specific::console_status().contains(LineStatus::TX_IDLE) {
        core::hint::spin_loop();
    }
}

/// Body of the dedicated output worker: drain the output queue one byte at a
/// time, gated on the UART's transmit readiness.
extern "C" fn output_worker_body(_arg: usize) {
    platform_specific::interrupt_lock();
    let sems = sems();
    platform_specific::interrupt_unlock();

    loop {
        let _ = semaphores::wait_blocking(sems.out_full);

        platform_specific::interrupt_lock();
        let byte = OUTPUT_QUEUE.lock().pop_front();
        platform_specific::interrupt_unlock();

        let Some(byte) = byte else { continue };

        let _ = semaphores::wait_blocking(sems.tx_ready);
        platform_specific::console_write_data(byte);

        let _ = semaphores::signal_blocking(sems.out_empty);
    }
}
