use sbi_rt::{system_reset, NoReason, Shutdown, SystemFailure};

use platform_specific::CLOCK_FREQ;

/// Timer interrupts per second.
const TICKS_PER_SECOND: u64 = 100;

const TICK_INTERVAL: u64 = CLOCK_FREQ / TICKS_PER_SECOND;

pub fn machine_shutdown(failure: bool) -> ! {
    match failure {
        true => system_reset(Shutdown, SystemFailure),
        false => system_reset(Shutdown, NoReason),
    };

    loop {}
}

/// Arm the SBI timer one tick from now. Also clears the pending supervisor
/// timer interrupt as a side effect of programming the comparand.
pub fn schedule_next_tick() {
    sbi_rt::set_timer(platform_specific::board_tick() + TICK_INTERVAL);
}
