//! Structured logging with `tracing`.
//!
//! - [`LogLevel`] maps the legacy numeric SDK verbosity scale onto tracing levels
//! - [`LogFormat`] selects compact or JSON output
//! - [`init_subscriber`] installs the global subscriber (stderr)

use serde::{Deserialize, Serialize};

/// Log level accepted on the command line and in settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Logging disabled.
    Off,
    /// Errors.
    Error,
    /// Non-fatal issues.
    Warn,
    /// Outcomes, summaries.
    Info,
    /// Intermediate values, decisions.
    Debug,
    /// Detailed entry/exit points.
    Trace,
}

impl LogLevel {
    /// Convert from the numeric verbosity scale (higher is more verbose).
    ///
    /// `0` is off, `1..=2` error, `3` warn, `4` info, `5` debug, `6+` trace.
    #[must_use]
    pub fn from_numeric(n: u8) -> Self {
        match n {
            0 => Self::Off,
            1 | 2 => Self::Error,
            3 => Self::Warn,
            4 => Self::Info,
            5 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Convert from a level name or a number (case-insensitive).
    ///
    /// Unrecognised input falls back to [`LogLevel::Info`].
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        if let Ok(n) = s.trim().parse::<u8>() {
            return Self::from_numeric(n);
        }
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Self::Off,
            "error" | "fatal" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }

    /// Directive string understood by `EnvFilter`.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Output format for the stderr subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_subscriber(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // set_global_default is a no-op if already set
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_scale() {
        assert_eq!(LogLevel::from_numeric(0), LogLevel::Off);
        assert_eq!(LogLevel::from_numeric(2), LogLevel::Error);
        assert_eq!(LogLevel::from_numeric(3), LogLevel::Warn);
        assert_eq!(LogLevel::from_numeric(4), LogLevel::Info);
        assert_eq!(LogLevel::from_numeric(5), LogLevel::Debug);
        assert_eq!(LogLevel::from_numeric(6), LogLevel::Trace);
        assert_eq!(LogLevel::from_numeric(200), LogLevel::Trace);
    }

    #[test]
    fn lossy_names_and_numbers() {
        assert_eq!(LogLevel::from_str_lossy("WARNING"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_lossy("5"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_lossy(" trace "), LogLevel::Trace);
        assert_eq!(LogLevel::from_str_lossy("bogus"), LogLevel::Info);
    }

    #[test]
    fn ordering_follows_verbosity() {
        assert!(LogLevel::Off < LogLevel::Error);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn display_is_directive() {
        assert_eq!(LogLevel::Debug.to_string(), "debug");
    }

    #[test]
    fn format_serde() {
        let f: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(f, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }

    #[test]
    fn init_twice_is_noop() {
        init_subscriber(LogLevel::Warn, LogFormat::Compact);
        init_subscriber(LogLevel::Debug, LogFormat::Json);
    }
}
