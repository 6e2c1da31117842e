//! Construction macros that label chain nodes with their call site.
//!
//! # Caller Identity
//!
//! `op!()` plants a local item at the expansion site and reads its
//! `type_name`. Because macros expand inline, the label is always the
//! function that *wrote* the macro call, never a helper inside this crate.
//! `fail!` builds on `wrap!`, and both still label the caller.
//!
//! # Usage
//!
//! ```rust
//! use opstack_errors::{fail, wrap, Kind, Op, Severity};
//!
//! fn load() -> opstack_errors::Result<()> {
//!     Err(fail!("config missing", Kind::NOT_FOUND))
//! }
//!
//! fn start() -> opstack_errors::Result<()> {
//!     load().map_err(|e| wrap!(e, "startup aborted", Severity::Panic))
//! }
//!
//! let err = start().unwrap_err();
//! assert!(err.op().as_str().ends_with("start"));
//! assert_eq!(err.ops().len(), 2);
//! assert_eq!(err.resolved_kind(), Kind::NOT_FOUND);
//! ```
//!
//! Augmentations may appear in any order; each must be one of `Op`,
//! `Cause`, `Kind`, `Severity`, `&'static str` or `String`. Anything else
//! fails to compile:
//!
//! ```rust,compile_fail
//! # use opstack_errors::wrap;
//! let err = wrap!(std::io::Error::other("x"), 42u8);
//! ```

/// Operation label for the enclosing function, or an explicit label.
///
/// ```rust
/// fn handler() -> opstack_errors::Op {
///     opstack_errors::op!()
/// }
/// assert!(handler().as_str().ends_with("handler"));
/// assert_eq!(opstack_errors::op!("svc.Create"), "svc.Create");
/// ```
#[macro_export]
macro_rules! op {
    () => {{
        fn __opstack_here() {}
        $crate::Op::from_fn_path(::core::any::type_name_of_val(&__opstack_here))
    }};
    ($name:expr) => {
        $crate::Op::new($name)
    };
}

/// Wrap a cause in a new chain node labeled with the calling function.
///
/// Trailing arguments are augmentations; a later one of the same type
/// overwrites an earlier one, and an explicit `Op` replaces the derived
/// label.
#[macro_export]
macro_rules! wrap {
    ($cause:expr $(, $augment:expr)* $(,)?) => {
        $crate::Error::build(
            $crate::op!(),
            $cause,
            [$($crate::Augment::from($augment)),*],
        )
    };
}

/// Create a chain node whose terminal cause is a bare message.
///
/// Labeled with the calling function, like `wrap!`.
#[macro_export]
macro_rules! fail {
    ($message:expr $(, $augment:expr)* $(,)?) => {
        $crate::wrap!($crate::Cause::message($message) $(, $augment)*)
    };
}
