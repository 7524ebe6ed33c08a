//! Process-wide tracing/logging setup.

pub mod tracing;

pub use self::tracing::{LogFormat, LogSettings};

/// Initialize tracing/logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(settings: &LogSettings) {
    tracing::init(settings);
}
