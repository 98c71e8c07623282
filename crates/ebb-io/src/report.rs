//! Logging setup for framework and model code.
//!
//! Everything in the framework logs through the `log` facade; this
//! module wires that facade to `env_logger`. Call
//! [`init_logging`] once, early in the driver.

use log::LevelFilter;
use std::io::Write;

/// Initialize the global logger.
///
/// The level is taken from `level` when given, otherwise from the
/// `RUST_LOG` environment variable, otherwise `info`. Repeated calls are
/// harmless; only the first installation wins.
pub fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or(LevelFilter::Info);

    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .try_init();
}
