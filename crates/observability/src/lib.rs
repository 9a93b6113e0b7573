//! Tracing and logging (shared setup).

/// Initialize process-wide tracing with the default settings (JSON, `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&LogSettings::default());
}

/// Initialize process-wide tracing from explicit settings.
pub fn init_with(settings: &LogSettings) {
    tracing::init(settings);
}

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use self::tracing::{LogFormat, LogSettings, UnknownLogFormat};
