use log::{self, Level, LevelFilter, Log, Metadata, Record};

use platform_specific::{legacy_println, CLOCK_FREQ};

struct GlobalLogger;

impl Log for GlobalLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31, // Red
            Level::Warn => 93,  // BrightYellow
            Level::Info => 34,  // Blue
            Level::Debug => 32, // Green
            Level::Trace => 90, // BrightBlack
        };

        let uptime = platform_specific::board_tick();
        let seconds = uptime / CLOCK_FREQ;
        let milliseconds = uptime % CLOCK_FREQ * 1000 / CLOCK_FREQ;

        legacy_println!(
            "\u{1B}[95m[{:4}.{:03}]\u{1B}[0m \u{1B}[{}m{}\u{1B}[37m | {}\u{1B}[0m",
            seconds,
            milliseconds,
            color,
            normalized_loglevel(record.level()),
            record.args(),
        );
    }

    fn flush(&self) {
        // nop
    }
}

#[inline]
fn normalized_loglevel(level: Level) -> &'static str {
    match level {
        Level::Error => "ERRO",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBG",
        Level::Trace => "TRAC",
    }
}

static LOGGER_INSTANCE: GlobalLogger = GlobalLogger;

pub fn init() {
    log::set_logger(&LOGGER_INSTANCE).unwrap();

    let level = match option_env!("LOG") {
        Some("OFF") => LevelFilter::Off,
        Some("ERROR") => LevelFilter::Error,
        Some("WARN") => LevelFilter::Warn,
        Some("INFO") => LevelFilter::Info,
        Some("DEBUG") => LevelFilter::Debug,
        Some("TRACE") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    log::set_max_level(level);
}
