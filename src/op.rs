//! Operation labels.
//!
//! An [`Op`] names the function or method where a chain node was created.
//! Reading the ops of a chain root-first gives a compact, stable "stack"
//! without capturing a backtrace.
//!
//! Labels are stored as `Cow<'static, str>`: literals and derived caller
//! paths borrow from the binary and never allocate.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

/// Name of the local item `op!()` plants at the expansion site.
#[doc(hidden)]
pub const HERE_MARKER: &str = "__opstack_here";

/// Identifier of the operation where a failure was observed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Op(Cow<'static, str>);

impl Op {
    /// Create an operation label.
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Create an operation label from a literal in const context.
    #[inline]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Derive a label from the `type_name` of an item declared inside a function.
    ///
    /// `my_crate::store::persist::create::__opstack_here` becomes
    /// `persist::create`: the marker and any `{{closure}}` segments are
    /// dropped and the last two path segments are kept. Separators nested in
    /// `<...>` are ignored, and an `<impl Trait for Type>` segment is reduced
    /// to `Type`, so trait methods read `Repo::put`.
    pub fn from_fn_path(path: &'static str) -> Self {
        let kept: SmallVec<[Range<usize>; 8]> = top_level_segments(path)
            .into_iter()
            .filter(|range| !matches!(&path[range.clone()], HERE_MARKER | "{{closure}}"))
            .collect();

        let tail = &kept[kept.len().saturating_sub(2)..];
        let labels: SmallVec<[&'static str; 2]> = tail
            .iter()
            .map(|range| segment_label(&path[range.clone()]))
            .collect();

        let verbatim = tail
            .iter()
            .zip(&labels)
            .all(|(range, label)| &path[range.clone()] == *label);

        match (tail, labels.as_slice()) {
            ([], _) => Self::default(),
            (_, [label]) => Self(Cow::Borrowed(*label)),
            ([first, second], [owner, name]) => {
                if verbatim && first.end + 2 == second.start {
                    Self(Cow::Borrowed(&path[first.start..second.end]))
                } else {
                    Self(Cow::Owned(format!("{}::{}", owner, name)))
                }
            }
            _ => Self::default(),
        }
    }

    /// Label as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    /// Whether the label is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Byte ranges of the `::` separated segments of a type path, skipping
/// separators nested inside `<...>`.
fn top_level_segments(path: &str) -> SmallVec<[Range<usize>; 8]> {
    let bytes = path.as_bytes();
    let mut segments = SmallVec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            // `->` inside a fn signature is not a closing bracket
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(start..i);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(start..bytes.len());
    segments
}

/// Display form of one path segment: generic arguments are dropped and an
/// impl block is named after its self type.
fn segment_label(segment: &'static str) -> &'static str {
    let segment = match segment.strip_prefix("<impl ").and_then(|s| s.strip_suffix('>')) {
        Some(header) => impl_self_type(header),
        None => segment,
    };
    match segment.find('<') {
        Some(idx) => &segment[..idx],
        None => segment,
    }
}

/// Last path segment of the self type in `Trait for Type` or `Type`.
fn impl_self_type(header: &'static str) -> &'static str {
    let ty = match find_top_level(header, " for ") {
        Some(idx) => &header[idx + " for ".len()..],
        None => header,
    };
    let ty = ty.trim_start_matches('&').trim_start_matches("mut ").trim_start_matches("dyn ");
    match top_level_segments(ty).last() {
        Some(range) => &ty[range.clone()],
        None => ty,
    }
}

fn find_top_level(haystack: &str, needle: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut depth = 0usize;
    for (idx, byte) in bytes.iter().enumerate() {
        match byte {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            _ if depth == 0 && bytes[idx..].starts_with(needle.as_bytes()) => return Some(idx),
            _ => {}
        }
    }
    None
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Op {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for Op {
    #[inline]
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Op {
    #[inline]
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<Cow<'static, str>> for Op {
    #[inline]
    fn from(name: Cow<'static, str>) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Op {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Op {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_two_segments() {
        let op = Op::from_fn_path("app::store::persist::create::__opstack_here");
        assert_eq!(op, "persist::create");
    }

    #[test]
    fn strips_closure_segments() {
        let op = Op::from_fn_path("app::svc::handle::{{closure}}::{{closure}}::__opstack_here");
        assert_eq!(op, "svc::handle");
    }

    #[test]
    fn short_paths_are_kept_whole() {
        assert_eq!(Op::from_fn_path("main::__opstack_here"), "main");
        assert_eq!(Op::from_fn_path("app::run::__opstack_here"), "app::run");
    }

    #[test]
    fn borrowed_labels_do_not_allocate() {
        let op = Op::from_fn_path("a::b::c::__opstack_here");
        assert!(matches!(op.0, Cow::Borrowed(_)));
        assert!(matches!(Op::from("svc.Create").0, Cow::Borrowed(_)));
    }

    #[test]
    fn trait_impl_segments_name_the_self_type() {
        let op = Op::from_fn_path(
            "app::store::<impl app::store::Store for app::store::Repo>::put::__opstack_here",
        );
        assert_eq!(op, "Repo::put");
        assert!(matches!(op.0, Cow::Owned(_)));
    }

    #[test]
    fn generic_impl_targets_lose_their_arguments() {
        let op = Op::from_fn_path(
            "app::<impl app::Store for app::Cache<alloc::string::String, app::Entry<u8>>>::get::{{closure}}::__opstack_here",
        );
        assert_eq!(op, "Cache::get");

        let op = Op::from_fn_path("app::<impl app::Cache<T>>::len::__opstack_here");
        assert_eq!(op, "Cache::len");
    }

    #[test]
    fn separators_inside_brackets_are_not_split() {
        let op = Op::from_fn_path(
            "app::<impl core::ops::Fn<(u8,)> for app::Handler>::call::__opstack_here",
        );
        assert_eq!(op, "Handler::call");
    }

    #[test]
    fn empty_path_gives_empty_label() {
        assert!(Op::from_fn_path("").is_empty());
        assert!(Op::from_fn_path("__opstack_here").is_empty());
    }

    struct Repo;

    trait Store {
        fn put(&self) -> Op;
    }

    impl Repo {
        fn save(&self) -> Op {
            crate::op!()
        }

        fn generic<T>(&self, _value: T) -> Op {
            crate::op!()
        }
    }

    impl Store for Repo {
        fn put(&self) -> Op {
            crate::op!()
        }
    }

    #[test]
    fn macro_labels_inherent_methods() {
        assert_eq!(Repo.save(), "Repo::save");
    }

    #[test]
    fn macro_labels_trait_impl_methods() {
        assert_eq!(Repo.put(), "Repo::put");
    }

    #[test]
    fn macro_labels_generic_methods() {
        assert_eq!(Repo.generic(7u8), "Repo::generic");
    }

    #[test]
    fn macro_labels_this_function() {
        let op = crate::op!();
        assert_eq!(op, "tests::macro_labels_this_function");
    }
}
