use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single log line forwarded to a log stream listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The formatted message
    pub line: String,
    /// Upper-case severity name: `ERROR`, `WARN`, `INFO`, `DEBUG` or `TRACE`
    pub level: String,
}

/// Minimum severity a log stream receives.
///
/// Variants are ordered by verbosity, so `Trace` is the most permissive
/// filter and `Off` lets nothing through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LevelFilter {
    /// Nothing is forwarded
    Off,
    /// Errors only
    Error,
    /// Warnings and above
    Warn,
    /// Informational messages and above
    Info,
    /// Debug messages and above
    #[default]
    Debug,
    /// Everything
    Trace,
}

impl LevelFilter {
    /// Numeric verbosity of a severity name, `None` for unknown names.
    fn verbosity(level: &str) -> Option<LevelFilter> {
        match level.to_ascii_uppercase().as_str() {
            "ERROR" => Some(LevelFilter::Error),
            "WARN" => Some(LevelFilter::Warn),
            "INFO" => Some(LevelFilter::Info),
            "DEBUG" => Some(LevelFilter::Debug),
            "TRACE" => Some(LevelFilter::Trace),
            _ => None,
        }
    }

    /// Whether an entry at `level` passes this filter.
    ///
    /// Unknown severity names never pass.
    pub fn allows(&self, level: &str) -> bool {
        match Self::verbosity(level) {
            Some(v) => *self != LevelFilter::Off && v <= *self,
            None => false,
        }
    }

    /// Get the string representation of the filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        }
    }
}

impl FromStr for LevelFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(LevelFilter::Off),
            other => Self::verbosity(other).ok_or_else(|| format!("Unknown log level: {}", s)),
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows() {
        assert!(LevelFilter::Trace.allows("TRACE"));
        assert!(LevelFilter::Trace.allows("ERROR"));
        assert!(LevelFilter::Info.allows("WARN"));
        assert!(!LevelFilter::Info.allows("DEBUG"));
        assert!(!LevelFilter::Off.allows("ERROR"));
        assert!(!LevelFilter::Trace.allows("VERBOSE"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("warn".parse::<LevelFilter>(), Ok(LevelFilter::Warn));
        assert_eq!("OFF".parse::<LevelFilter>(), Ok(LevelFilter::Off));
        assert!("loud".parse::<LevelFilter>().is_err());
    }
}
