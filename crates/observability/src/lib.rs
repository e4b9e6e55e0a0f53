//! Tracing/logging setup shared by every loantrack entry point.

/// Initialize process-wide logging from `RUST_LOG` (default `info`, JSON).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&LogSettings::default());
}

/// Initialize process-wide logging from explicit settings.
///
/// `RUST_LOG`, when set, still wins over `settings.filter`.
pub fn init_with(settings: &LogSettings) {
    tracing::init(settings);
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `loantrack_infra=debug`.
    pub filter: String,
    /// JSON lines when true, human-readable otherwise.
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: true,
        }
    }
}

/// Tracing configuration (filters, layers).
pub mod tracing;
