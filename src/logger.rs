use std::io::Write;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

struct NpwLogger {
    file: Option<Mutex<std::fs::File>>,
    filter: LevelFilter,
    start: Instant,
}

impl Log for NpwLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        let line = format_line(elapsed, record.level(), record.target(), record.args());
        let _ = writeln!(std::io::stderr().lock(), "{line}");

        if let Some(ref file) = self.file {
            let _ = writeln!(file.lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

fn format_line(elapsed: f64, level: Level, target: &str, args: &std::fmt::Arguments) -> String {
    format!("[{elapsed:.3}s] [{level}] {target} — {args}")
}

/// Pick the level filter: `RUST_LOG` wins, otherwise warnings (errors only when quiet).
fn level_filter(rust_log: Option<&str>, quiet: bool) -> LevelFilter {
    rust_log
        .and_then(|s| s.parse().ok())
        .unwrap_or(if quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Warn
        })
}

/// Initialize the global logger. Must be called once before any logging.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init(quiet: bool, log_file: Option<std::fs::File>) {
    let filter = level_filter(std::env::var("RUST_LOG").ok().as_deref(), quiet);

    let logger = NpwLogger {
        file: log_file.map(Mutex::new),
        filter,
        start: Instant::now(),
    };

    log::set_boxed_logger(Box::new(logger)).expect("logger already initialized");
    log::set_max_level(filter);
}
