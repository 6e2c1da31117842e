//! Serializable snapshots of an error chain.
//!
//! A [`Stack`] mirrors a chain level by level so it can be shipped to a log
//! pipeline or an API response as structured data:
//!
//! ```json
//! {"op":"svc.Create","kind":13,"err":{"msg":"cannot write","op":"persist.Create","err":{"msg":"db down"}}}
//! ```
//!
//! Empty messages, empty ops, unset kinds and absent children are left out.
//! The projection is a copy: it owns its strings and does not borrow from
//! the chain it was taken from.

use crate::chain::{Cause, Error};
use crate::kind::Kind;
use crate::op::Op;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// Deepest projection [`Stack::capture`] produces.
pub const MAX_STACK_DEPTH: usize = 64;

/// Nested, serializable snapshot of an error chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stack {
    /// Message of this level.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
    /// Operation of this level. Empty at the terminal.
    #[serde(default, skip_serializing_if = "Op::is_empty")]
    pub op: Op,
    /// Kind recorded on this level only.
    #[serde(default, skip_serializing_if = "kind_is_unset")]
    pub kind: Kind,
    /// Projection of the cause. `None` at the terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<Box<Stack>>,
}

impl Stack {
    /// Project any error, bounded by [`MAX_STACK_DEPTH`].
    #[inline]
    pub fn capture(err: &(dyn StdError + 'static)) -> Self {
        Self::capture_bounded(err, MAX_STACK_DEPTH)
    }

    /// Project any error, keeping at most `max_depth` chain nodes.
    ///
    /// The terminal level is not counted. When the chain is deeper, the last
    /// kept node carries its own message followed by the rendered remainder
    /// of its cause, so nothing is silently lost. A `max_depth` of zero is treated as one.
    pub fn capture_bounded(err: &(dyn StdError + 'static), max_depth: usize) -> Self {
        match err.downcast_ref::<Error>() {
            Some(chain) => Self::from_chain(chain, max_depth.max(1)),
            None => Self::terminal(err),
        }
    }

    fn terminal(err: &(dyn StdError + 'static)) -> Self {
        Self {
            msg: err.to_string(),
            ..Self::default()
        }
    }

    fn from_chain(chain: &Error, remaining: usize) -> Self {
        if remaining == 1 {
            if let Cause::Chain(next) = chain.cause() {
                let msg = match chain.message() {
                    Some(message) => format!("{}: {}", message, next),
                    None => next.to_string(),
                };
                return Self {
                    msg,
                    op: chain.op().clone(),
                    kind: chain.kind(),
                    err: None,
                };
            }
        }

        let err = match chain.cause() {
            Cause::Chain(next) => Self::from_chain(next, remaining - 1),
            Cause::Opaque(e) => Self::terminal(e.as_ref()),
        };
        Self {
            msg: chain.message().unwrap_or_default().to_owned(),
            op: chain.op().clone(),
            kind: chain.kind(),
            err: Some(Box::new(err)),
        }
    }

    /// Number of nested levels, including this one.
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self), |level| level.err.as_deref()).count()
    }
}

#[inline]
fn kind_is_unset(kind: &Kind) -> bool {
    kind.is_unset()
}

impl From<&Error> for Stack {
    #[inline]
    fn from(err: &Error) -> Self {
        Self::capture(err)
    }
}
