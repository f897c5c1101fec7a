//! Demo workload the kernel runs in its dedicated user thread. Exercises the
//! whole system-call surface: threads, join, semaphores, sleep and console
//! output. Worker bodies share handles through statics because arguments
//! travel as a single machine word.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::usercalls;

static PING_SEM: AtomicUsize = AtomicUsize::new(0);
static PONG_SEM: AtomicUsize = AtomicUsize::new(0);
static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn print_str(s: &str) {
    for byte in s.bytes() {
        usercalls::put_char(byte);
    }
}

#[no_mangle]
pub extern "C" fn user_main() {
    print_str("ping-pong: ");
    ping_pong();

    print_str("\nsleep order: ");
    sleep_order();

    print_str("\ncounter child: ");
    counter_child();

    print_str("\nuser_main done\n");
}

// Two threads alternating through a semaphore pair; the output is strictly
// serialized no matter how the slices fall.
fn ping_pong() {
    let mut ping = 0usize;
    let mut pong = 0usize;
    usercalls::sem_open(&mut ping, 1);
    usercalls::sem_open(&mut pong, 0);
    PING_SEM.store(ping, Ordering::Relaxed);
    PONG_SEM.store(pong, Ordering::Relaxed);

    let mut first = 0usize;
    let mut second = 0usize;
    usercalls::thread_create(&mut first, ping_body, 3);
    usercalls::thread_create(&mut second, pong_body, 3);

    usercalls::thread_join(first);
    usercalls::thread_join(second);

    usercalls::sem_close(ping);
    usercalls::sem_close(pong);
}

extern "C" fn ping_body(rounds: usize) {
    for _ in 0..rounds {
        usercalls::sem_wait(PING_SEM.load(Ordering::Relaxed));
        usercalls::put_char(b'A');
        usercalls::sem_signal(PONG_SEM.load(Ordering::Relaxed));
    }
}

extern "C" fn pong_body(rounds: usize) {
    for _ in 0..rounds {
        usercalls::sem_wait(PONG_SEM.load(Ordering::Relaxed));
        usercalls::put_char(b'A');
        usercalls::sem_signal(PING_SEM.load(Ordering::Relaxed));
    }
}

// Three sleepers with deadlines out of creation order; they print their tag
// when they wake, so the output reads "231".
fn sleep_order() {
    let mut sleepers = [0usize; 3];
    usercalls::thread_create(&mut sleepers[0], sleeper_body, encode_sleeper(b'1', 30));
    usercalls::thread_create(&mut sleepers[1], sleeper_body, encode_sleeper(b'2', 10));
    usercalls::thread_create(&mut sleepers[2], sleeper_body, encode_sleeper(b'3', 20));

    for handle in sleepers {
        usercalls::thread_join(handle);
    }
}

const fn encode_sleeper(tag: u8, ticks: usize) -> usize {
    ticks << 8 | tag as usize
}

extern "C" fn sleeper_body(encoded: usize) {
    usercalls::time_sleep(encoded >> 8);
    usercalls::put_char(encoded as u8);
}

// A child bumps the counter to five and exits; join returns only after the
// child is gone, so the printed value is always 5.
fn counter_child() {
    let mut child = 0usize;
    usercalls::thread_create(&mut child, counter_body, 5);
    usercalls::thread_join(child);

    let value = COUNTER.load(Ordering::Relaxed);
    usercalls::put_char(b'0' + value as u8);
}

extern "C" fn counter_body(target: usize) {
    for _ in 0..target {
        COUNTER.fetch_add(1, Ordering::Relaxed);
        usercalls::thread_dispatch();
    }
}
