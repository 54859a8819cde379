//! # daylog
//!
//! A small logging facade that writes each category of messages to its own
//! file under a per-day directory, and echoes everything to the console.
//!
//! ## Key Types
//!
//! - [`LogFacade`] - The logger: directory setup, sink registration, log calls
//! - [`Category`] - Named log stream (`default`, `error`, or custom)
//! - [`LogValue`] - One loggable item (string, number, bool, or key-value map)
//! - [`FacadeConfig`] - Settings, optionally loaded from `daylog.toml`
//! - [`TextFormatter`] - Template rendering shared by all sinks
//! - [`FacadeLayer`] - Forwards host `tracing` events into a category
//!
//! ## Layout
//!
//! ```text
//! logs/
//! └── 2024-03-09/
//!     ├── default.log
//!     ├── error.log
//!     └── <custom>.log
//! ```
//!
//! Each line follows the template
//! `[{{datetime}}] [{{level}}] [{{scope}}] {{message}} {{data}} {{extra}}`.

mod bridge;
mod category;
mod config;
mod engine;
mod error;
mod facade;
mod format;
mod sink;
mod value;

pub use bridge::FacadeLayer;
pub use category::Category;
pub use config::{FacadeConfig, CONFIG_FILE_NAME};
pub use error::FacadeError;
pub use facade::LogFacade;
pub use format::{Record, TextFormatter, DEFAULT_TEMPLATE};
pub use sink::CaptureBuffer;
pub use value::LogValue;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build a `Vec<LogValue>` from mixed values.
///
/// ```rust,ignore
/// logger.log("jobs", "Worker", daylog::values!["processed", 12, "items", true]);
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::LogValue::from($value)),*]
    };
}

/// Install a global subscriber for the facade's own diagnostics.
///
/// This is host API: the facade never calls it. Category output never goes
/// through this subscriber; it only shows what the facade reports about
/// itself (sink registration, directory errors). `RUST_LOG` overrides
/// `level`. Panics if a global subscriber is already installed.
///
/// ```no_run
/// daylog::init_diagnostics("info");
/// let logger = daylog::LogFacade::new().expect("log directory is writable");
/// logger.log("default", "Startup", ["ready"]);
/// ```
pub fn init_diagnostics(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
