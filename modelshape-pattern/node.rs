use std::fmt::Display;

use indexmap::IndexMap;

use crate::{Placeholder, PlaceholderGroup, PlaceholderKind};

/// The key of one entry at a level of a [`PatternNode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternKey {
    Placeholder(Placeholder),
    Group(PlaceholderGroup),
}

/// How many discovered entries a key must consume at its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Zero or more; never reported missing.
    Optional,
    /// At least one.
    OneOrMore,
    /// Exactly one.
    ExactlyOne,
    /// Exactly one if chosen, in which case nothing else may be present at the
    /// same level. Not required otherwise.
    Exclusive,
}

impl PatternKey {
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        match self {
            PatternKey::Placeholder(placeholder) => match placeholder {
                Placeholder::Any => Cardinality::Optional,
                Placeholder::Integer | Placeholder::Generic(_) => Cardinality::OneOrMore,
                Placeholder::Single | Placeholder::Unique => Cardinality::ExactlyOne,
                Placeholder::Exclusive => Cardinality::Exclusive,
            },
            PatternKey::Group(group) => {
                if group.contains(PlaceholderKind::Exclusive) {
                    Cardinality::Exclusive
                } else if group.contains(PlaceholderKind::Single)
                    || group.contains(PlaceholderKind::Unique)
                {
                    Cardinality::ExactlyOne
                } else {
                    Cardinality::OneOrMore
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.cardinality() == Cardinality::Exclusive
    }

    /// Trial rank when several keys at one level could accept the same
    /// segment. Lower ranks are tried first: literals, then groups (which
    /// carry literal parts), then structural placeholders from most to least
    /// specific.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        match self {
            PatternKey::Placeholder(Placeholder::Generic(_)) => 0,
            PatternKey::Group(_) => 1,
            PatternKey::Placeholder(Placeholder::Integer) => 2,
            PatternKey::Placeholder(Placeholder::Single) => 3,
            PatternKey::Placeholder(Placeholder::Exclusive) => 4,
            PatternKey::Placeholder(Placeholder::Unique) => 5,
            PatternKey::Placeholder(Placeholder::Any) => 6,
        }
    }

    #[must_use]
    pub fn matches_segment(&self, segment: &str) -> bool {
        match self {
            PatternKey::Placeholder(placeholder) => placeholder.matches_segment(segment),
            PatternKey::Group(group) => group.is_match(segment),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            PatternKey::Placeholder(placeholder) => Some(placeholder),
            PatternKey::Group(_) => None,
        }
    }
}

impl From<Placeholder> for PatternKey {
    #[inline]
    fn from(value: Placeholder) -> Self {
        PatternKey::Placeholder(value)
    }
}

impl From<PlaceholderGroup> for PatternKey {
    #[inline]
    fn from(value: PlaceholderGroup) -> Self {
        PatternKey::Group(value)
    }
}

impl Display for PatternKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternKey::Placeholder(placeholder) => Display::fmt(placeholder, f),
            PatternKey::Group(group) => Display::fmt(group, f),
        }
    }
}

pub type PatternMap = IndexMap<PatternKey, PatternNode, ahash::RandomState>;

/// Expected layout of a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode {
    /// Every key that is not optional must be matched by a discovered entry,
    /// and matched entries are validated against the key's value.
    RequiredMap(PatternMap),
    /// Acceptable leaf entries at this level. At least one entry must be
    /// present.
    AlternativeSet(Vec<PatternKey>),
    /// The entry must exist. Nothing below it is validated.
    Leaf,
    /// A single key, e.g. the `<any>` in `{<integer>: <any>}`. Behaves like a
    /// one-element [`PatternNode::AlternativeSet`].
    Key(PatternKey),
}

impl PatternNode {
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, PatternNode)>,
        K: Into<PatternKey>,
    {
        PatternNode::RequiredMap(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn set<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<PatternKey>,
    {
        PatternNode::AlternativeSet(keys.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn key(key: impl Into<PatternKey>) -> Self {
        PatternNode::Key(key.into())
    }

    /// Wrap this pattern under a `<unique>` key, for validating a directory
    /// that holds exactly one model directory.
    #[must_use]
    pub fn wrap_unique(self) -> Self {
        PatternNode::map([(Placeholder::Unique, self)])
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, PatternNode::Leaf)
    }

    /// True if this level has no keys. Leaves are not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            PatternNode::RequiredMap(map) => map.is_empty(),
            PatternNode::AlternativeSet(keys) => keys.is_empty(),
            PatternNode::Leaf | PatternNode::Key(_) => false,
        }
    }

    /// The keys at this level, each with the pattern that applies below a
    /// matched entry. `None` means the entry is a leaf.
    pub fn entries(&self) -> Vec<(&PatternKey, Option<&PatternNode>)> {
        match self {
            PatternNode::RequiredMap(map) => map
                .iter()
                .map(|(key, value)| (key, (!value.is_leaf()).then_some(value)))
                .collect(),
            PatternNode::AlternativeSet(keys) => keys.iter().map(|key| (key, None)).collect(),
            PatternNode::Key(key) => vec![(key, None)],
            PatternNode::Leaf => Vec::new(),
        }
    }

    /// Same as [`PatternNode::entries()`], ordered by trial rank. The sort is
    /// stable, so declaration order breaks ties.
    pub fn entries_by_specificity(&self) -> Vec<(&PatternKey, Option<&PatternNode>)> {
        let mut entries = self.entries();
        entries.sort_by_key(|(key, _)| key.specificity());
        entries
    }

    /// Get the value of a key in a required map.
    #[must_use]
    pub fn get(&self, key: &PatternKey) -> Option<&PatternNode> {
        match self {
            PatternNode::RequiredMap(map) => map.get(key),
            _ => None,
        }
    }
}

impl Display for PatternNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternNode::Leaf => f.write_str("leaf"),
            PatternNode::Key(key) => Display::fmt(key, f),
            PatternNode::AlternativeSet(keys) => {
                f.write_str("{")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}")?;
                }
                f.write_str("}")
            }
            PatternNode::RequiredMap(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specificity_order() {
        let shard = PlaceholderGroup::new([
            Placeholder::generic("variables.data-00000-of-").unwrap(),
            Placeholder::Any,
        ])
        .unwrap();
        let set = PatternNode::set([
            PatternKey::from(Placeholder::Any),
            PatternKey::from(shard.clone()),
            PatternKey::from(Placeholder::generic("variables.index").unwrap()),
        ]);
        let ordered: Vec<_> = set
            .entries_by_specificity()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(
            ordered,
            ["variables.index", "variables.data-00000-of-<any>", "<any>"]
        );
    }

    #[test]
    fn cardinality() {
        let onnx = PlaceholderGroup::new([
            Placeholder::Single,
            Placeholder::generic(".onnx").unwrap(),
        ])
        .unwrap();
        let exclusive = PlaceholderGroup::new([
            Placeholder::Exclusive,
            Placeholder::Single,
            Placeholder::generic(".onnx").unwrap(),
        ])
        .unwrap();
        assert_eq!(
            PatternKey::from(Placeholder::Any).cardinality(),
            Cardinality::Optional
        );
        assert_eq!(
            PatternKey::from(Placeholder::Integer).cardinality(),
            Cardinality::OneOrMore
        );
        assert_eq!(
            PatternKey::from(onnx).cardinality(),
            Cardinality::ExactlyOne
        );
        assert!(PatternKey::from(exclusive).is_exclusive());
    }

    #[test]
    fn leaf_values_are_elided() {
        let node = PatternNode::map([
            (Placeholder::Any, PatternNode::Leaf),
            (Placeholder::Integer, PatternNode::key(Placeholder::Any)),
        ]);
        let entries = node.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].1.is_none());
        assert_eq!(entries[1].1, Some(&PatternNode::key(Placeholder::Any)));
        assert_eq!(node.to_string(), "{<any>: leaf, <integer>: <any>}");
    }

    #[test]
    fn wrap_unique() {
        let node = PatternNode::map([(Placeholder::Integer, PatternNode::key(Placeholder::Any))]);
        let wrapped = node.clone().wrap_unique();
        assert_eq!(
            wrapped.get(&PatternKey::Placeholder(Placeholder::Unique)),
            Some(&node)
        );
    }
}
