use std::{fmt::Display, str::FromStr};

use crate::PatternError;

/// The tag of a placeholder, without any carried value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    /// The segment must be a non-negative integer, like a model version
    /// directory.
    Integer,
    /// Any single file or directory, including its whole subtree.
    Any,
    /// Any name, but there must be exactly one occurrence at its level.
    Single,
    /// Either this alternative or anything else at the same level, never both.
    Exclusive,
    /// Like `Any`, but there can be no competing entries at its level.
    Unique,
    /// A literal segment (or part of a segment, inside a group).
    Generic,
}

impl PlaceholderKind {
    pub const ALL: [PlaceholderKind; 6] = [
        PlaceholderKind::Integer,
        PlaceholderKind::Any,
        PlaceholderKind::Single,
        PlaceholderKind::Exclusive,
        PlaceholderKind::Unique,
        PlaceholderKind::Generic,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PlaceholderKind::Integer => "integer",
            PlaceholderKind::Any => "any",
            PlaceholderKind::Single => "single",
            PlaceholderKind::Exclusive => "exclusive",
            PlaceholderKind::Unique => "unique",
            PlaceholderKind::Generic => "generic",
        }
    }
}

impl Display for PlaceholderKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceholderKind {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the bracketed display form as well, i.e. `<integer>`.
        let tag = s
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(s);
        if tag.is_empty() {
            return Err(PatternError::malformed("empty placeholder kind"));
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| PatternError::malformed(format_args!("unknown placeholder kind `{s}`")))
    }
}

/// A single match atom of a layout pattern.
///
/// Structural placeholders are compared by kind. Generic placeholders are
/// compared by kind and literal value, so two different filenames are two
/// different keys at the same level.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    Integer,
    Any,
    Single,
    Exclusive,
    Unique,
    Generic(Box<str>),
}

impl Placeholder {
    /// Construct a structural placeholder from its kind tag.
    ///
    /// `generic` is rejected, because a generic placeholder needs a value. Use
    /// [`Placeholder::generic()`] instead.
    pub fn from_kind(kind: &str) -> Result<Self, PatternError> {
        match kind.parse::<PlaceholderKind>()? {
            PlaceholderKind::Integer => Ok(Placeholder::Integer),
            PlaceholderKind::Any => Ok(Placeholder::Any),
            PlaceholderKind::Single => Ok(Placeholder::Single),
            PlaceholderKind::Exclusive => Ok(Placeholder::Exclusive),
            PlaceholderKind::Unique => Ok(Placeholder::Unique),
            PlaceholderKind::Generic => Err(PatternError::malformed(
                "generic placeholders must be constructed with a value",
            )),
        }
    }

    /// Construct a literal placeholder.
    pub fn generic(value: impl Into<String>) -> Result<Self, PatternError> {
        let value = value.into();
        if value.is_empty() {
            return Err(PatternError::malformed("empty generic placeholder value"));
        }
        if value.contains('/') {
            return Err(PatternError::malformed(format_args!(
                "generic placeholder value `{value}` contains a path separator"
            )));
        }
        Ok(Placeholder::Generic(value.into_boxed_str()))
    }

    #[must_use]
    pub fn kind(&self) -> PlaceholderKind {
        match self {
            Placeholder::Integer => PlaceholderKind::Integer,
            Placeholder::Any => PlaceholderKind::Any,
            Placeholder::Single => PlaceholderKind::Single,
            Placeholder::Exclusive => PlaceholderKind::Exclusive,
            Placeholder::Unique => PlaceholderKind::Unique,
            Placeholder::Generic(_) => PlaceholderKind::Generic,
        }
    }

    /// The literal value of a generic placeholder.
    #[inline]
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match self {
            Placeholder::Generic(value) => Some(value),
            _ => None,
        }
    }

    /// True if this placeholder stands in for a class of names rather than a
    /// literal one.
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !matches!(self, Placeholder::Generic(_))
    }

    /// Match a whole path segment against this placeholder on its own.
    #[must_use]
    pub fn matches_segment(&self, segment: &str) -> bool {
        match self {
            Placeholder::Generic(value) => **value == *segment,
            Placeholder::Integer => is_integer(segment),
            Placeholder::Any | Placeholder::Single | Placeholder::Exclusive | Placeholder::Unique => {
                !segment.is_empty()
            }
        }
    }
}

/// Version directories are plain non-negative integers.
#[inline]
#[must_use]
pub fn is_integer(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placeholder::Generic(value) => f.write_str(value),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

impl std::fmt::Debug for Placeholder {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
