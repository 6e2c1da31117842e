//! Egress encoding: turning any error into a wire status.
//!
//! Service handlers call these at the boundary. The kind is resolved with
//! the usual chain rules, so only the layer that understood the failure has
//! to set it; the message is the fully rendered chain.

use crate::chain::{Error, kinds};
use http::StatusCode;
use std::error::Error as StdError;

/// Encode any error as a gRPC status.
///
/// ```rust
/// use opstack_errors::{Error, Kind, encode_rpc_error};
///
/// let err = Error::from_message("users::get", "no such user").with_kind(Kind::NOT_FOUND);
/// let status = encode_rpc_error(&err);
///
/// assert_eq!(status.code(), tonic::Code::NotFound);
/// assert_eq!(status.message(), err.to_string());
/// ```
pub fn encode_rpc_error(err: &(dyn StdError + 'static)) -> tonic::Status {
    tonic::Status::new(kinds(err).to_rpc_code(), err.to_string())
}

/// Encode any error as an HTTP status and body message.
pub fn encode_http_error(err: &(dyn StdError + 'static)) -> (StatusCode, String) {
    (kinds(err).to_http_status(), err.to_string())
}

impl From<Error> for tonic::Status {
    #[inline]
    fn from(err: Error) -> Self {
        encode_rpc_error(&err)
    }
}
