use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root logger: JSON lines on stderr, written from a
/// background thread, tagged with the build metadata and `component`.
pub fn initialize_logger(component: &'static str) -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!(
            "component" => component,
            "version" => info::VERSION,
            "revision" => info::REVISION,
            "build_timestamp" => info::BUILD_TIMESTAMP,
        ),
    )
}

/// Installs a global `RUST_LOG`-filtered logger and returns the guard
/// that keeps it alive.
#[cfg(feature = "env_logging")]
pub fn initialize_env_logger() -> slog_scope::GlobalLoggerGuard {
    slog_envlogger::init().expect("initialize slog-envlogger")
}

/// A logger that drops everything. Meant for tests.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
