//! Stderr logging for the `log` facade.
//!
//! Records print as `[   0.012s INFO  harvest_gauge_card] message`, time
//! counted from the first [`init_with_level`] call. With the `tracing`
//! feature, [`init_tracing`] installs a `tracing-subscriber` registry instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

struct StderrLogger {
    epoch: Instant,
}

impl StderrLogger {
    fn format(&self, record: &Record) -> String {
        let crate_name = record.target().split("::").next().unwrap_or_default();
        format!(
            "[{:>8.3}s {:<5} {crate_name}] {}",
            self.epoch.elapsed().as_secs_f64(),
            record.level(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = self.format(record);
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Route `log` records at or above `level` to stderr.
///
/// The first call installs the logger; later calls only change the level.
pub fn init_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    let mut installed_now = false;
    let logger = LOGGER.get_or_init(|| {
        installed_now = true;
        StderrLogger {
            epoch: Instant::now(),
        }
    });
    if installed_now {
        log::set_logger(logger)?;
    }
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing` registry with an `EnvFilter` (`RUST_LOG`, default
/// `info`) and a stderr fmt layer, as JSON lines when `json` is set.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    use tracing_subscriber::fmt::{self, format::FmtSpan};
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(layer.json().flatten_event(true)).try_init()
    } else {
        registry
            .with(layer.with_timer(fmt::time::Uptime::default()))
            .try_init()
    };
}
