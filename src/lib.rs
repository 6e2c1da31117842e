//! # Opstack Errors
//!
//! Operation-chained errors: every layer that touches a failure wraps it with
//! where it happened, and callers recover that context no matter how deep the
//! wrapping goes.
//!
//! ## Design Philosophy
//!
//! 1. **Every wrap site labels itself** - `wrap!` and `fail!` record the calling function
//! 2. **Kinds propagate** - the nearest non-zero kind wins, so only one layer sets it
//! 3. **Causes are never lost** - the terminal error survives any depth of wrapping
//! 4. **Transport codes are a lookup** - kinds equal gRPC codes and map onto HTTP
//! 5. **Inspection is pure** - rendering, projection and encoding never mutate a chain
//!
//! ## Chain Model
//!
//! ```text
//! Error { op, message?, kind, severity, cause }
//!                                         │
//!                       ┌─────────────────┴─────────────────┐
//!                 Cause::Chain(Error)                Cause::Opaque(dyn Error)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use opstack_errors::{wrap, Kind, Op, Result, TransportCode};
//! use std::io;
//!
//! fn persist() -> Result<()> {
//!     let db = Err(io::Error::other("db down"));
//!     db.map_err(|e| wrap!(e, Op::from("persist.Create"), "cannot write"))
//! }
//!
//! fn create() -> Result<()> {
//!     persist().map_err(|e| wrap!(e, Op::from("svc.Create"), Kind::INTERNAL))
//! }
//!
//! let err = create().unwrap_err();
//! assert_eq!(err.to_string(), "svc.Create: persist.Create cannot write, db down, code 13");
//! assert_eq!(err.http_status().as_u16(), 500);
//! assert_eq!(err.rpc_code(), tonic::Code::Internal);
//! ```
//!
//! ## Inspecting Foreign Errors
//!
//! The free functions accept any `&dyn Error`, so callers need not know
//! whether an error ever passed through this crate:
//!
//! ```rust
//! use opstack_errors::{kinds, ops, unwrap_terminal, Kind};
//!
//! let foreign = std::io::Error::other("plain");
//! assert!(ops(&foreign).is_empty());
//! assert_eq!(kinds(&foreign), Kind::UNKNOWN);
//! assert_eq!(unwrap_terminal(&foreign).to_string(), "plain");
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: Enable untruncated multi-line log formatting (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::result;

pub mod chain;
pub mod encoding;
pub mod kind;
pub mod logging;
pub mod macros;
pub mod op;
pub mod severity;
pub mod stack;

pub use chain::*;
pub use encoding::*;
pub use kind::*;
pub use logging::*;
pub use op::Op;
pub use severity::*;
pub use stack::*;

/// Type alias for Results using our error type.
pub type Result<T> = result::Result<T, Error>;
