//! Structured log view of an error chain.
//!
//! # Design
//!
//! - Borrows from the [`Error`] with an explicit lifetime and cannot outlive it
//! - Accessors are allocation-free; only `ops()` collects
//! - `write_to` formats into any `fmt::Write` with bounded field lengths
//! - `emit` forwards one event to `tracing` at the level of the node's severity
//!
//! The crate never installs a subscriber or writes anywhere on its own.
//! Whoever owns the process decides where events go.
//!
//! ```rust
//! use opstack_errors::{Error, Kind};
//!
//! let err = Error::from_message("jobs::run", "worker crashed").with_kind(Kind::INTERNAL);
//! let mut line = String::new();
//! err.log_view().write_to(&mut line).unwrap();
//! assert_eq!(
//!     line,
//!     "[error] op='jobs::run' kind=13 ops='jobs::run' cause='worker crashed'"
//! );
//! ```

use crate::chain::{Error, OpStack};
use crate::kind::Kind;
use crate::op::Op;
use crate::severity::Severity;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Maximum length for any individual field in formatted output (DoS prevention)
pub const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Structured log entry borrowed from a chain node.
#[derive(Debug, Clone, Copy)]
pub struct ChainLog<'a> {
    node: &'a Error,
}

impl<'a> ChainLog<'a> {
    /// Operation of the outermost node.
    #[inline]
    pub fn operation(&self) -> &'a Op {
        self.node.op()
    }

    /// Message of the outermost node.
    #[inline]
    pub fn message(&self) -> Option<&'a str> {
        self.node.message()
    }

    /// Resolved kind of the whole chain.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.node.resolved_kind()
    }

    /// Severity of the outermost node.
    #[inline]
    pub fn severity(&self) -> Severity {
        self.node.severity()
    }

    /// Operation stack, root-first.
    #[inline]
    pub fn ops(&self) -> OpStack {
        self.node.ops()
    }

    /// The terminal error.
    #[inline]
    pub fn terminal(&self) -> &'a (dyn StdError + 'static) {
        self.node.terminal()
    }

    /// Write the entry as `key='value'` pairs without intermediate strings
    /// for the chain itself. Each field is cut at [`MAX_FIELD_OUTPUT_LEN`].
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] op='{}'",
            self.severity(),
            clip_field(self.operation().as_str())
        )?;

        if let Some(message) = self.message() {
            write!(f, " msg='{}'", clip_field(message))?;
        }

        let kind = self.kind();
        if !kind.is_unset() {
            write!(f, " kind={}", kind.value())?;
        }

        f.write_str(" ops='")?;
        let mut written = 0;
        for (i, node) in self.node.nodes().enumerate() {
            let sep = if i == 0 { "" } else { " > " };
            let op = node.op().as_str();
            if written + sep.len() + op.len() > MAX_FIELD_OUTPUT_LEN {
                f.write_str(TRUNCATION_INDICATOR)?;
                break;
            }
            f.write_str(sep)?;
            f.write_str(op)?;
            written += sep.len() + op.len();
        }
        f.write_str("'")?;

        let terminal = self.terminal().to_string();
        write!(f, " cause='{}'", clip_field(&terminal))
    }

    /// Emit the entry as a `tracing` event.
    ///
    /// `Warn` nodes produce WARN events; `Error` and `Panic` produce ERROR.
    pub fn emit(&self) {
        let op = self.operation().as_str();
        let kind = self.kind().value();
        let severity = self.severity().as_str();
        match self.severity().tracing_level() {
            tracing::Level::WARN => {
                tracing::warn!(op, kind, severity, error = %self.node, "operation failed")
            }
            _ => tracing::error!(op, kind, severity, error = %self.node, "operation failed"),
        }
    }

    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Nothing is truncated. Only available with BOTH the `trusted_debug`
    /// feature AND debug assertions enabled.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = format!("[{}] {}", self.severity(), self.node);
        for (depth, node) in self.node.nodes().enumerate() {
            output.push_str(&format!(
                "\n  #{} op='{}' severity={} kind={}",
                depth,
                node.op(),
                node.severity(),
                node.kind().value()
            ));
            if let Some(message) = node.message() {
                output.push_str(&format!(" msg='{}'", message));
            }
        }
        output
    }
}

impl Error {
    /// Borrow a structured log view of this chain.
    #[inline]
    pub fn log_view(&self) -> ChainLog<'_> {
        ChainLog { node: self }
    }

    /// Callback-style access to the log view.
    ///
    /// ```rust
    /// # use opstack_errors::Error;
    /// # let err = Error::from_message("op", "details");
    /// let op_len = err.with_log_view(|log| log.operation().as_str().len());
    /// assert_eq!(op_len, 2);
    /// ```
    #[inline]
    pub fn with_log_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ChainLog<'_>) -> R,
    {
        f(&self.log_view())
    }
}

/// Cut one log field to [`MAX_FIELD_OUTPUT_LEN`] bytes on a char boundary,
/// ending it with [`TRUNCATION_INDICATOR`]. Short fields are borrowed.
fn clip_field(field: &str) -> Cow<'_, str> {
    if field.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(field);
    }

    let mut end = MAX_FIELD_OUTPUT_LEN - TRUNCATION_INDICATOR.len();
    while !field.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}{}", &field[..end], TRUNCATION_INDICATOR))
}
