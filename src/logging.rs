//! Tracing setup for the command-line tool.
//!
//! The library only emits `debug`/`trace` events; nothing is printed unless
//! a subscriber is installed. Configure with `RUST_LOG`:
//! - `RUST_LOG=debug` - history imports, profile loads, rule compilation
//! - `RUST_LOG=patchpad::highlight=trace` - per-pass highlight statistics

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install a stderr subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
