//! Error kinds - coarse categories that survive any depth of wrapping.
//!
//! A [`Kind`] is an unsigned code. Zero means "unset": a node that carries no
//! kind lets resolution fall through to its cause. Every defined kind has the
//! same numeric value as the matching gRPC status code, which makes the RPC
//! conversion an identity cast and keeps encoded values stable on the wire.
//!
//! # Transport Mapping
//!
//! | Kind             | gRPC | HTTP |
//! |------------------|------|------|
//! | `BAD_REQUEST`    | 3    | 400  |
//! | `ALREADY_EXISTS` | 6    | 400  |
//! | `UNKNOWN`        | 2    | 400  |
//! | `NOT_FOUND`      | 5    | 404  |
//! | `UNAUTHORIZED`   | 16   | 401  |
//! | `NOT_ALLOWED`    | 7    | 403  |
//! | anything else    | n    | 500  |
//!
//! The reverse HTTP mapping is lossy: several kinds share 400, so
//! [`Kind::from_http_status`] recovers a representative kind only.
//!
//! # Extending the Space
//!
//! Applications may define their own kinds above the gRPC range:
//!
//! ```rust
//! use opstack_errors::Kind;
//!
//! // Compile-time construction (panics if reserved)
//! const QUOTA_EXCEEDED: Kind = Kind::custom(100);
//!
//! // Runtime construction (returns Result)
//! # let code_from_config = 101u32;
//! let kind = Kind::checked_custom(code_from_config).unwrap();
//!
//! assert_eq!(QUOTA_EXCEEDED.to_rpc_status(), 100);
//! assert_eq!(kind.to_http_status().as_u16(), 500);
//! ```

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

// ============================================================================
// Kind
// ============================================================================

/// Category code of a failure, aligned with gRPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(u32);

impl Kind {
    /// Sentinel: no category recorded on this node.
    pub const UNSET: Kind = Kind(0);
    /// Success. Shares the value of [`Kind::UNSET`] because gRPC `OK` is zero.
    pub const OK: Kind = Kind(0);
    /// Category could not be determined.
    pub const UNKNOWN: Kind = Kind(2);
    /// Caller supplied an invalid argument.
    pub const BAD_REQUEST: Kind = Kind(3);
    /// Requested entity does not exist.
    pub const NOT_FOUND: Kind = Kind(5);
    /// Entity the caller tried to create already exists.
    pub const ALREADY_EXISTS: Kind = Kind(6);
    /// Caller is known but lacks permission.
    pub const NOT_ALLOWED: Kind = Kind(7);
    /// Server-side failure.
    pub const INTERNAL: Kind = Kind(13);
    /// Caller could not be authenticated.
    pub const UNAUTHORIZED: Kind = Kind(16);

    /// Create an application-defined kind in const context.
    ///
    /// # Panics
    ///
    /// Panics if `code` is zero (reserved for [`Kind::UNSET`]). In const
    /// contexts the panic is a compile error.
    #[inline]
    pub const fn custom(code: u32) -> Self {
        assert!(code != 0, "Kind 0 is reserved for unset");
        Self(code)
    }

    /// Create an application-defined kind from a runtime value.
    #[inline]
    pub fn checked_custom(code: u32) -> Result<Self, KindError> {
        if code == 0 {
            return Err(KindError::Reserved);
        }
        Ok(Self(code))
    }

    /// Raw numeric value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Whether this is the unset sentinel.
    #[inline]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Human name of a predefined kind, `None` for application kinds.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("unset"),
            2 => Some("unknown"),
            3 => Some("bad request"),
            5 => Some("not found"),
            6 => Some("already exists"),
            7 => Some("not allowed"),
            13 => Some("internal"),
            16 => Some("unauthorized"),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // RPC
    // ------------------------------------------------------------------------

    /// gRPC status code as an integer. Identity cast.
    #[inline]
    pub const fn to_rpc_status(self) -> i32 {
        self.0 as i32
    }

    /// gRPC status code as a `tonic::Code`.
    ///
    /// Application kinds outside the gRPC range map to `Code::Unknown`.
    #[inline]
    pub fn to_rpc_code(self) -> tonic::Code {
        tonic::Code::from_i32(self.to_rpc_status())
    }

    /// Kind from an integer gRPC status. Negative values map to `UNKNOWN`.
    #[inline]
    pub const fn from_rpc_status(code: i32) -> Self {
        if code < 0 { Self::UNKNOWN } else { Self(code as u32) }
    }

    /// Kind from a `tonic::Code`.
    #[inline]
    pub fn from_rpc_code(code: tonic::Code) -> Self {
        Self::from_rpc_status(code as i32)
    }

    // ------------------------------------------------------------------------
    // HTTP
    // ------------------------------------------------------------------------

    /// HTTP status for this kind.
    pub const fn to_http_status(self) -> StatusCode {
        match self {
            Self::BAD_REQUEST | Self::ALREADY_EXISTS | Self::UNKNOWN => StatusCode::BAD_REQUEST,
            Self::NOT_FOUND => StatusCode::NOT_FOUND,
            Self::UNAUTHORIZED => StatusCode::UNAUTHORIZED,
            Self::NOT_ALLOWED => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Representative kind for an HTTP status.
    ///
    /// Lossy: `ALREADY_EXISTS` and `UNKNOWN` both encode as 400 and come back
    /// as `BAD_REQUEST`. Unmapped statuses come back as `INTERNAL`.
    pub fn from_http_status(status: impl Into<u16>) -> Self {
        match status.into() {
            400 => Self::BAD_REQUEST,
            401 => Self::UNAUTHORIZED,
            403 => Self::NOT_ALLOWED,
            404 => Self::NOT_FOUND,
            _ => Self::INTERNAL,
        }
    }

    // ------------------------------------------------------------------------
    // Opaque errors
    // ------------------------------------------------------------------------

    /// Kind of an error that never passed through this crate.
    ///
    /// If the error (or anything in its `source()` chain) is a
    /// `tonic::Status` from an earlier encoding step, its code is reused.
    /// Otherwise the result is `UNKNOWN`.
    pub fn from_opaque_error(err: &(dyn StdError + 'static)) -> Self {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(status) = e.downcast_ref::<tonic::Status>() {
                return Self::from_rpc_code(status.code());
            }
            current = e.source();
        }
        Self::UNKNOWN
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "kind {}", self.0),
        }
    }
}

impl From<tonic::Code> for Kind {
    #[inline]
    fn from(code: tonic::Code) -> Self {
        Self::from_rpc_code(code)
    }
}

// ============================================================================
// Transport Codes
// ============================================================================

/// Anything that can be expressed as an HTTP status and a gRPC code.
///
/// Implemented for [`Kind`] directly and for chain nodes through their
/// resolved kind, so service boundaries can stay generic over either.
pub trait TransportCode {
    /// HTTP status code.
    fn http_status(&self) -> StatusCode;

    /// gRPC status code.
    fn rpc_code(&self) -> tonic::Code;
}

impl TransportCode for Kind {
    #[inline]
    fn http_status(&self) -> StatusCode {
        self.to_http_status()
    }

    #[inline]
    fn rpc_code(&self) -> tonic::Code {
        self.to_rpc_code()
    }
}

// ============================================================================
// Violations
// ============================================================================

/// Rejected runtime construction of a [`Kind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindError {
    /// Zero is reserved for the unset sentinel.
    Reserved,
}

impl fmt::Display for KindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => f.write_str("kind 0 is reserved for unset"),
        }
    }
}

impl StdError for KindError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    const DEFINED: [Kind; 8] = [
        Kind::UNKNOWN,
        Kind::BAD_REQUEST,
        Kind::NOT_FOUND,
        Kind::ALREADY_EXISTS,
        Kind::NOT_ALLOWED,
        Kind::INTERNAL,
        Kind::UNAUTHORIZED,
        Kind::UNSET,
    ];

    #[test]
    fn defined_kinds_match_grpc_codes() {
        assert_eq!(Kind::UNKNOWN.to_rpc_code(), tonic::Code::Unknown);
        assert_eq!(Kind::BAD_REQUEST.to_rpc_code(), tonic::Code::InvalidArgument);
        assert_eq!(Kind::NOT_FOUND.to_rpc_code(), tonic::Code::NotFound);
        assert_eq!(Kind::ALREADY_EXISTS.to_rpc_code(), tonic::Code::AlreadyExists);
        assert_eq!(Kind::NOT_ALLOWED.to_rpc_code(), tonic::Code::PermissionDenied);
        assert_eq!(Kind::INTERNAL.to_rpc_code(), tonic::Code::Internal);
        assert_eq!(Kind::UNAUTHORIZED.to_rpc_code(), tonic::Code::Unauthenticated);
        assert_eq!(Kind::OK.to_rpc_code(), tonic::Code::Ok);
    }

    #[test]
    fn rpc_status_is_identity() {
        for kind in DEFINED {
            assert_eq!(kind.to_rpc_status(), kind.value() as i32);
            assert_eq!(Kind::from_rpc_status(kind.to_rpc_status()), kind);
        }
        assert_eq!(Kind::from_rpc_status(-1), Kind::UNKNOWN);
    }

    #[test]
    fn http_mapping_table() {
        assert_eq!(Kind::BAD_REQUEST.to_http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Kind::ALREADY_EXISTS.to_http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Kind::UNKNOWN.to_http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Kind::NOT_FOUND.to_http_status(), StatusCode::NOT_FOUND);
        assert_eq!(Kind::UNAUTHORIZED.to_http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Kind::NOT_ALLOWED.to_http_status(), StatusCode::FORBIDDEN);
        assert_eq!(Kind::INTERNAL.to_http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Kind::UNSET.to_http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn http_reverse_mapping_is_lossy_but_defined() {
        assert_eq!(Kind::from_http_status(Kind::ALREADY_EXISTS.to_http_status()), Kind::BAD_REQUEST);
        assert_eq!(Kind::from_http_status(StatusCode::FORBIDDEN), Kind::NOT_ALLOWED);
        assert_eq!(Kind::from_http_status(404u16), Kind::NOT_FOUND);
        assert_eq!(Kind::from_http_status(418u16), Kind::INTERNAL);
        for kind in DEFINED {
            assert!(Kind::from_http_status(kind.to_http_status()).name().is_some());
        }
    }

    #[test]
    fn custom_kinds() {
        const QUOTA: Kind = Kind::custom(100);
        assert_eq!(QUOTA.value(), 100);
        assert_eq!(QUOTA.name(), None);
        assert_eq!(QUOTA.to_rpc_code(), tonic::Code::Unknown);
        assert_eq!(QUOTA.to_string(), "kind 100");
        assert_eq!(Kind::checked_custom(0), Err(KindError::Reserved));
        assert_eq!(Kind::checked_custom(7), Ok(Kind::NOT_ALLOWED));
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn custom_zero_panics_at_runtime() {
        let code = std::hint::black_box(0);
        let _ = Kind::custom(code);
    }

    #[test]
    fn opaque_error_without_status_is_unknown() {
        let err = io::Error::other("disk on fire");
        assert_eq!(Kind::from_opaque_error(&err), Kind::UNKNOWN);
    }

    #[test]
    fn opaque_error_reuses_embedded_status() {
        let status = tonic::Status::not_found("no such row");
        assert_eq!(Kind::from_opaque_error(&status), Kind::NOT_FOUND);

        let wrapped = Upstream(tonic::Status::permission_denied("nope"));
        assert_eq!(Kind::from_opaque_error(&wrapped), Kind::NOT_ALLOWED);
    }

    #[derive(Debug)]
    struct Upstream(tonic::Status);

    impl fmt::Display for Upstream {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("upstream call failed")
        }
    }

    impl StdError for Upstream {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn display_names_predefined_kinds() {
        assert_eq!(Kind::NOT_FOUND.to_string(), "not found (5)");
        assert!(Kind::UNSET.is_unset());
    }
}
