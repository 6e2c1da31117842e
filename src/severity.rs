//! Severity levels attached to every chain node.
//!
//! Severity is a closed set of qualitative levels. The values are plain
//! `Copy` data known at compile time, so there is no registry, no
//! initialization step, and nothing to synchronize between threads.
//!
//! # Ordering
//!
//! Levels are ordered `Warn < Error < Panic`. The numeric level follows a
//! `3 << n` progression so that sinks which bucket by integer keep room for
//! levels of their own in between.
//!
//! # Example
//!
//! ```rust
//! use opstack_errors::Severity;
//!
//! let sev: Severity = "warn".parse().unwrap();
//! assert_eq!(sev, Severity::Warn);
//! assert!(Severity::Panic > Severity::Error);
//! assert_eq!(Severity::default(), Severity::Error);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Severity
// ============================================================================

/// Qualitative level of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Degraded but recoverable; the caller may carry on.
    Warn,
    /// The operation failed. Default for every new chain node.
    #[default]
    Error,
    /// An invariant was broken and the process state is suspect.
    Panic,
}

impl Severity {
    /// All levels in ascending order.
    pub const ALL: [Severity; 3] = [Severity::Warn, Severity::Error, Severity::Panic];

    /// Stable lowercase name.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Panic => "panic",
        }
    }

    /// Numeric level (`3`, `6`, `12`).
    #[inline]
    pub const fn level(self) -> u8 {
        match self {
            Self::Warn => 3,
            Self::Error => 3 << 1,
            Self::Panic => 3 << 2,
        }
    }

    /// Map onto the `tracing` level used when a chain is emitted.
    ///
    /// `tracing` has no level above ERROR, so `Panic` shares it.
    #[inline]
    pub const fn tracing_level(self) -> tracing::Level {
        match self {
            Self::Warn => tracing::Level::WARN,
            Self::Error | Self::Panic => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Error returned when a string names no known severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityParseError {
    input: String,
}

impl SeverityParseError {
    /// The rejected input.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for SeverityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity '{}' (expected warn, error or panic)", self.input)
    }
}

impl std::error::Error for SeverityParseError {}

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SeverityParseError { input: s.to_owned() })
    }
}
