use std::fmt::Write as _;

use crate::{Placeholder, PlaceholderKind, PatternError};

/// One part of a [`PlaceholderGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupPart {
    Placeholder(Placeholder),
    Group(PlaceholderGroup),
}

impl From<Placeholder> for GroupPart {
    #[inline]
    fn from(value: Placeholder) -> Self {
        GroupPart::Placeholder(value)
    }
}

impl From<PlaceholderGroup> for GroupPart {
    #[inline]
    fn from(value: PlaceholderGroup) -> Self {
        GroupPart::Group(value)
    }
}

impl std::fmt::Display for GroupPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupPart::Placeholder(placeholder) => std::fmt::Display::fmt(placeholder, f),
            GroupPart::Group(group) => std::fmt::Display::fmt(group, f),
        }
    }
}

/// Ordered sequence of placeholders that together match a single path
/// segment, e.g. `variables.data-00000-of-<any>` or `<single>.onnx`.
///
/// The parts are compiled to an anchored regular expression, so a segment
/// matches only if it can be partitioned left to right with every part
/// consuming its share.
#[derive(Clone)]
pub struct PlaceholderGroup {
    parts: Box<[GroupPart]>,
    regex: Box<regex::Regex>,
}

impl PartialEq for PlaceholderGroup {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for PlaceholderGroup {}

impl std::hash::Hash for PlaceholderGroup {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

/// The free portions of a segment matched by a group, one entry for each
/// structural placeholder that consumes characters (in order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupMatch {
    pub captures: Box<[String]>,
}

impl GroupMatch {
    #[inline]
    #[must_use]
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(|s| &**s)
    }
}

impl PlaceholderGroup {
    pub fn new<I, P>(parts: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = P>,
        P: Into<GroupPart>,
    {
        let parts: Box<[GroupPart]> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(PatternError::malformed("empty placeholder group"));
        }

        let mut regex_pattern = String::from("^");
        let mut consuming = 0;
        build_regex(&parts, &mut regex_pattern, &mut consuming);
        regex_pattern.push('$');

        if consuming == 0 {
            return Err(PatternError::malformed(format_args!(
                "placeholder group `{}` cannot match any segment",
                DisplayParts(&parts)
            )));
        }

        let regex = regex::RegexBuilder::new(&regex_pattern)
            .unicode(true)
            .build()
            .map_err(|source| PatternError::GroupRegex {
                group: DisplayParts(&parts).to_string(),
                source,
            })?;

        Ok(PlaceholderGroup {
            parts,
            regex: Box::new(regex),
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Groups are never empty.
        false
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GroupPart> {
        self.parts.get(index)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, GroupPart> {
        self.parts.iter()
    }

    /// True if a placeholder of `kind` appears anywhere in the group, including
    /// nested groups.
    #[must_use]
    pub fn contains(&self, kind: PlaceholderKind) -> bool {
        self.parts.iter().any(|part| match part {
            GroupPart::Placeholder(placeholder) => placeholder.kind() == kind,
            GroupPart::Group(group) => group.contains(kind),
        })
    }

    /// True if the group starts with (or otherwise contains) a literal part.
    #[must_use]
    pub fn has_literal(&self) -> bool {
        self.contains(PlaceholderKind::Generic)
    }

    pub fn match_segment(&self, segment: &str) -> Option<GroupMatch> {
        tracing::trace!("Matching segment '{segment}' against {:?}", self.regex);
        let m = self.regex.captures(segment)?;
        let mut groups = m.iter();
        // Skip the implicit whole-string match group.
        groups.next();
        let captures = groups
            .map(|group| group.map_or_else(String::new, |g| g.as_str().to_owned()))
            .collect();
        Some(GroupMatch { captures })
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, segment: &str) -> bool {
        self.regex.is_match(segment)
    }
}

fn build_regex(parts: &[GroupPart], regex_pattern: &mut String, consuming: &mut usize) {
    for part in parts {
        match part {
            GroupPart::Group(group) => build_regex(&group.parts, regex_pattern, consuming),
            GroupPart::Placeholder(placeholder) => match placeholder {
                Placeholder::Generic(lit) => {
                    regex_pattern.push_str(&regex::escape(lit));
                    *consuming += 1;
                }
                Placeholder::Integer => {
                    regex_pattern.push_str("([0-9]+)");
                    *consuming += 1;
                }
                Placeholder::Any | Placeholder::Single | Placeholder::Unique => {
                    regex_pattern.push_str("(.+?)");
                    *consuming += 1;
                }
                // Marks the whole group as an exclusive alternative, consumes
                // nothing.
                Placeholder::Exclusive => {}
            },
        }
    }
}

impl std::ops::Index<usize> for PlaceholderGroup {
    type Output = GroupPart;

    #[inline]
    fn index(&self, index: usize) -> &GroupPart {
        &self.parts[index]
    }
}

impl<'a> IntoIterator for &'a PlaceholderGroup {
    type Item = &'a GroupPart;
    type IntoIter = std::slice::Iter<'a, GroupPart>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct DisplayParts<'a>(&'a [GroupPart]);

impl std::fmt::Display for DisplayParts<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for part in self.0 {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for PlaceholderGroup {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        DisplayParts(&self.parts).fmt(f)
    }
}

impl std::fmt::Debug for PlaceholderGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('(')?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_char(')')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic(s: &str) -> Placeholder {
        Placeholder::generic(s).unwrap()
    }

    #[test]
    fn prefix_and_wildcard() {
        let shard =
            PlaceholderGroup::new([generic("variables.data-00000-of-"), Placeholder::Any]).unwrap();
        assert_eq!(shard.len(), 2);
        assert_eq!(shard[0], GroupPart::Placeholder(generic("variables.data-00000-of-")));
        assert_eq!(
            shard.match_segment("variables.data-00000-of-00001"),
            Some(GroupMatch {
                captures: vec![String::from("00001")].into()
            })
        );
        assert!(!shard.is_match("variables.data-00000-of-"));
        assert!(!shard.is_match("variables.index"));
        assert!(!shard.is_match("xvariables.data-00000-of-00001"));
    }

    #[test]
    fn single_and_suffix() {
        let onnx = PlaceholderGroup::new([Placeholder::Single, generic(".onnx")]).unwrap();
        assert_eq!(
            onnx.match_segment("model.onnx")
                .as_ref()
                .and_then(|m| m.capture(0)),
            Some("model")
        );
        assert!(onnx.is_match("a.b.onnx"));
        assert!(!onnx.is_match(".onnx"));
        assert!(!onnx.is_match("model.onnx.bak"));
        assert!(onnx.contains(PlaceholderKind::Single));
        assert!(!onnx.contains(PlaceholderKind::Exclusive));
    }

    #[test]
    fn exclusive_consumes_nothing() {
        let onnx =
            PlaceholderGroup::new([Placeholder::Exclusive, Placeholder::Single, generic(".onnx")])
                .unwrap();
        assert!(onnx.is_match("model.onnx"));
        assert!(onnx.contains(PlaceholderKind::Exclusive));
        assert_eq!(onnx.to_string(), "<exclusive><single>.onnx");
    }

    #[test]
    fn nested_groups() {
        let inner = PlaceholderGroup::new([generic("part-"), Placeholder::Integer]).unwrap();
        let outer = PlaceholderGroup::new([
            GroupPart::Group(inner),
            GroupPart::Placeholder(generic(".bin")),
        ])
        .unwrap();
        assert!(outer.is_match("part-7.bin"));
        assert!(!outer.is_match("part-x.bin"));
        assert!(outer.contains(PlaceholderKind::Integer));
        assert_eq!(outer.to_string(), "part-<integer>.bin");
    }

    #[test]
    fn literal_metacharacters() {
        let group = PlaceholderGroup::new([generic("a+b("), Placeholder::Any]).unwrap();
        assert!(group.is_match("a+b(c"));
        assert!(!group.is_match("aab(c"));
    }

    #[test]
    fn reject_malformed() {
        assert!(matches!(
            PlaceholderGroup::new(Vec::<Placeholder>::new()),
            Err(PatternError::MalformedPlaceholder(_))
        ));
        assert!(matches!(
            PlaceholderGroup::new([Placeholder::Exclusive]),
            Err(PatternError::MalformedPlaceholder(_))
        ));
    }
}
