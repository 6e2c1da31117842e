//! Chain nodes and the operations that walk them.
//!
//! # Model
//!
//! An [`Error`] is one link of a singly-linked chain. Each link records where
//! the failure passed through ([`Op`]), an optional message, an optional
//! [`Kind`] and a [`Severity`], and owns exactly one [`Cause`]:
//!
//! ```text
//! Error(svc::create) ──► Error(persist::create) ──► io::Error("db down")
//!        kind 13                kind unset                terminal
//! ```
//!
//! `Cause` has two variants, another chain node or an opaque terminal error,
//! and every operation in this module is a match over them. Ownership is
//! exclusive, so a chain is always linear and acyclic.
//!
//! # Resolution Rules
//!
//! - Rendering lists every op root-first and ends with the terminal message.
//! - Kind resolution returns the nearest non-zero kind, outermost first, and
//!   falls back to the terminal error's embedded RPC status or `UNKNOWN`.
//! - Only the layer that first understands a failure needs to set a kind.

use crate::kind::{Kind, TransportCode};
use crate::op::Op;
use crate::severity::Severity;
use http::StatusCode;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::mem;

/// Operations of a chain, root-first. Inline for typical depths.
pub type OpStack = SmallVec<[Op; 4]>;

/// Boxed terminal error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// ============================================================================
// Terminal Message Error
// ============================================================================

/// Terminal error carrying only a message.
///
/// Created by [`Error::from_message`] and `fail!` when a failure originates
/// in this crate's caller rather than in a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageError(Cow<'static, str>);

impl MessageError {
    /// Create a terminal message error.
    #[inline]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self(message.into())
    }

    /// The message.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StdError for MessageError {}

/// Placeholder left behind when a node's cause is detached.
#[derive(Debug)]
struct Detached;

impl fmt::Display for Detached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("detached")
    }
}

impl StdError for Detached {}

// ============================================================================
// Cause
// ============================================================================

/// The error a chain node wraps.
pub enum Cause {
    /// Another chain node.
    Chain(Box<Error>),
    /// A terminal error that did not come from this crate.
    Opaque(BoxError),
}

impl Cause {
    /// Terminal cause made of a bare message.
    #[inline]
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Opaque(Box::new(MessageError::new(message)))
    }

    /// Classify an already boxed error.
    ///
    /// A box that holds a chain node becomes [`Cause::Chain`], so chains
    /// stay visible after passing through `Box<dyn Error>` APIs.
    pub fn boxed(err: BoxError) -> Self {
        match err.downcast::<Error>() {
            Ok(chain) => Self::Chain(chain),
            Err(opaque) => Self::Opaque(opaque),
        }
    }

    /// The cause as a chain node, if it is one.
    #[inline]
    pub fn as_chain(&self) -> Option<&Error> {
        match self {
            Self::Chain(e) => Some(e),
            Self::Opaque(_) => None,
        }
    }

    /// The cause as a plain error trait object.
    #[inline]
    pub fn as_error(&self) -> &(dyn StdError + 'static) {
        match self {
            Self::Chain(e) => e.as_ref(),
            Self::Opaque(e) => e.as_ref(),
        }
    }
}

impl<E> From<E> for Cause
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::boxed(Box::new(err))
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain(e) => f.debug_tuple("Chain").field(e).finish(),
            Self::Opaque(e) => f.debug_tuple("Opaque").field(e).finish(),
        }
    }
}

// ============================================================================
// Augmentations
// ============================================================================

/// One typed piece of context applied while building a node.
///
/// Every accepted type converts into `Augment` via `From`; anything else is
/// a compile error at the call site.
#[derive(Debug)]
pub enum Augment {
    /// Operation label.
    Op(Op),
    /// Replacement cause.
    Cause(Cause),
    /// Category.
    Kind(Kind),
    /// Severity.
    Severity(Severity),
    /// Human message.
    Message(Cow<'static, str>),
}

impl From<Op> for Augment {
    #[inline]
    fn from(op: Op) -> Self {
        Self::Op(op)
    }
}

impl From<Cause> for Augment {
    #[inline]
    fn from(cause: Cause) -> Self {
        Self::Cause(cause)
    }
}

impl From<Kind> for Augment {
    #[inline]
    fn from(kind: Kind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Severity> for Augment {
    #[inline]
    fn from(severity: Severity) -> Self {
        Self::Severity(severity)
    }
}

impl From<&'static str> for Augment {
    #[inline]
    fn from(message: &'static str) -> Self {
        Self::Message(Cow::Borrowed(message))
    }
}

impl From<String> for Augment {
    #[inline]
    fn from(message: String) -> Self {
        Self::Message(Cow::Owned(message))
    }
}

// ============================================================================
// Chain Node
// ============================================================================

/// One link of an error chain.
///
/// # Construction
///
/// - `wrap!(cause, ...)` / `fail!("text", ...)`: op defaults to the calling
///   function
/// - [`Error::new`] / [`Error::from_message`]: op supplied explicitly
/// - `with_*` methods: consuming builders for further context
///
/// ```rust
/// use opstack_errors::{Error, Kind};
/// use std::io;
///
/// let err = Error::new("persist::create", io::Error::other("db down"))
///     .with_message("cannot write");
/// let err = Error::new("svc::create", err).with_kind(Kind::INTERNAL);
///
/// assert_eq!(
///     err.to_string(),
///     "svc::create: persist::create cannot write, db down, code 13"
/// );
/// ```
#[must_use = "errors should be handled or logged"]
pub struct Error {
    op: Op,
    message: Option<Cow<'static, str>>,
    kind: Kind,
    severity: Severity,
    cause: Cause,
}

impl Error {
    /// Wrap `cause` under operation `op`.
    #[inline]
    pub fn new(op: impl Into<Op>, cause: impl Into<Cause>) -> Self {
        Self {
            op: op.into(),
            message: None,
            kind: Kind::UNSET,
            severity: Severity::default(),
            cause: cause.into(),
        }
    }

    /// Node whose terminal cause is a bare message.
    #[inline]
    pub fn from_message(op: impl Into<Op>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(op, Cause::message(message))
    }

    /// Build a node from a cause and a set of augmentations.
    ///
    /// `default_op` is used unless an [`Augment::Op`] is present. Later
    /// augmentations of the same type overwrite earlier ones. This is the
    /// target of the `wrap!` and `fail!` macros.
    pub fn build<const N: usize>(
        default_op: Op,
        cause: impl Into<Cause>,
        augments: [Augment; N],
    ) -> Self {
        augments
            .into_iter()
            .fold(Self::new(default_op, cause), |node, augment| node.augment(augment))
    }

    /// Apply one augmentation.
    pub fn augment(mut self, augment: impl Into<Augment>) -> Self {
        match augment.into() {
            Augment::Op(op) => self.op = op,
            Augment::Cause(cause) => self.cause = cause,
            Augment::Kind(kind) => self.kind = kind,
            Augment::Severity(severity) => self.severity = severity,
            Augment::Message(message) => self.message = Some(message),
        }
        self
    }

    /// Replace the operation label.
    #[inline]
    pub fn with_op(mut self, op: impl Into<Op>) -> Self {
        self.op = op.into();
        self
    }

    /// Attach a human message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the category of this node.
    #[inline]
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the severity of this node.
    #[inline]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Replace the wrapped cause.
    #[inline]
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = cause.into();
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Operation label of this node.
    #[inline]
    pub fn op(&self) -> &Op {
        &self.op
    }

    /// Message of this node, if any.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Kind recorded on this node only. See [`Error::resolved_kind`].
    #[inline]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Severity of this node.
    #[inline]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// The wrapped cause.
    #[inline]
    pub const fn cause(&self) -> &Cause {
        &self.cause
    }

    // ------------------------------------------------------------------------
    // Chain operations
    // ------------------------------------------------------------------------

    /// Iterate over this node and every chain node beneath it.
    pub fn nodes(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |node| node.cause.as_chain())
    }

    /// Operations of the chain, root-first.
    pub fn ops(&self) -> OpStack {
        self.nodes().map(|node| node.op.clone()).collect()
    }

    /// Nearest non-zero kind, falling back to the terminal error.
    pub fn resolved_kind(&self) -> Kind {
        self.nodes()
            .map(|node| node.kind)
            .find(|kind| !kind.is_unset())
            .unwrap_or_else(|| Kind::from_opaque_error(self.terminal()))
    }

    /// The innermost non-chain error.
    pub fn terminal(&self) -> &(dyn StdError + 'static) {
        let mut node = self;
        loop {
            match &node.cause {
                Cause::Chain(next) => node = &**next,
                Cause::Opaque(e) => return e.as_ref(),
            }
        }
    }

    /// Consume the chain, returning its terminal error.
    pub fn into_terminal(mut self) -> BoxError {
        let mut cause = self.detach_cause();
        loop {
            match cause {
                Cause::Chain(mut node) => cause = node.detach_cause(),
                Cause::Opaque(e) => return e,
            }
        }
    }

    fn detach_cause(&mut self) -> Cause {
        mem::replace(&mut self.cause, Cause::Opaque(Box::new(Detached)))
    }

    /// Number of chain nodes, including this one.
    #[inline]
    pub fn depth(&self) -> usize {
        self.nodes().count()
    }
}

impl Drop for Error {
    /// Unlinks the chain one node at a time so long chains drop without recursion.
    fn drop(&mut self) {
        let mut next = self.detach_cause();
        while let Cause::Chain(mut node) = next {
            next = node.detach_cause();
        }
    }
}

impl fmt::Display for Error {
    /// Render the whole chain on one line.
    ///
    /// Format: `op msg: op msg: ..., terminal, code N`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kind = Kind::UNSET;
        for (depth, node) in self.nodes().enumerate() {
            if depth > 0 {
                f.write_str(": ")?;
            }
            f.write_str(node.op.as_str())?;
            if let Some(message) = node.message() {
                if !node.op.is_empty() {
                    f.write_str(" ")?;
                }
                f.write_str(message)?;
            }
            if kind.is_unset() {
                kind = node.kind;
            }
        }

        write!(f, ", {}", self.terminal())?;
        if !kind.is_unset() {
            write!(f, ", code {}", kind.value())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("op", &self.op)
            .field("message", &self.message)
            .field("kind", &self.kind)
            .field("severity", &self.severity)
            .field("cause", &self.cause)
            .finish()
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_error())
    }
}

impl TransportCode for Error {
    #[inline]
    fn http_status(&self) -> StatusCode {
        self.resolved_kind().to_http_status()
    }

    #[inline]
    fn rpc_code(&self) -> tonic::Code {
        self.resolved_kind().to_rpc_code()
    }
}

// ============================================================================
// Free-standing Inspection
// ============================================================================

/// Operation stack of any error. Empty for errors that are not chain nodes.
pub fn ops(err: &(dyn StdError + 'static)) -> OpStack {
    err.downcast_ref::<Error>()
        .map(Error::ops)
        .unwrap_or_default()
}

/// Resolved kind of any error.
///
/// Chain nodes resolve to their nearest non-zero kind; other errors go
/// through [`Kind::from_opaque_error`].
pub fn kinds(err: &(dyn StdError + 'static)) -> Kind {
    match err.downcast_ref::<Error>() {
        Some(chain) => chain.resolved_kind(),
        None => Kind::from_opaque_error(err),
    }
}

/// Innermost non-chain error. Errors that are not chain nodes are returned as is.
pub fn unwrap_terminal<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    match err.downcast_ref::<Error>() {
        Some(chain) => chain.terminal(),
        None => err,
    }
}
