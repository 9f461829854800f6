use std::fmt::{Display, Write as _};

use modelshape_fs::{DELIMITER, join_segments};
use modelshape_pattern::{Cardinality, PatternKey, PatternNode};

use crate::{Diagnostic, DiagnosticKind, PathTree};

/// Matches a discovered [`PathTree`] against a [`PatternNode`].
///
/// Matching does not stop at the first divergence. Sibling keys and subtrees
/// keep being checked, so one pass reports every structural problem.
#[derive(Clone, Copy, Debug)]
pub struct Matcher<'p> {
    pattern: &'p PatternNode,
}

impl<'p> Matcher<'p> {
    #[inline]
    #[must_use]
    pub fn new(pattern: &'p PatternNode) -> Self {
        Self { pattern }
    }

    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &'p PatternNode {
        self.pattern
    }

    /// Match `tree` (the validation root) against the pattern. An empty result
    /// means the tree matches.
    #[must_use]
    pub fn check(&self, tree: &PathTree) -> Vec<Diagnostic> {
        let mut walk = Walk {
            path: Vec::new(),
            diagnostics: Vec::new(),
        };
        walk.node(self.pattern, tree);
        walk.diagnostics
    }

    /// True if `tree` matches the pattern.
    #[must_use]
    pub fn is_match(&self, tree: &PathTree) -> bool {
        self.check(tree).is_empty()
    }
}

type Entries<'p> = [(&'p PatternKey, Option<&'p PatternNode>)];

struct Walk<'t> {
    path: Vec<&'t str>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Walk<'t> {
    fn level_path(&self) -> String {
        join_segments(&self.path, DELIMITER)
    }

    fn child_path(&self, name: &str) -> String {
        let mut path = self.level_path();
        if !path.is_empty() {
            path.push(DELIMITER);
        }
        path.push_str(name);
        path
    }

    fn report(&mut self, kind: DiagnosticKind, path: String, message: impl Display) {
        tracing::trace!("{kind} at `{path}`: {message}");
        self.diagnostics.push(Diagnostic::new(kind, path, message));
    }

    fn node(&mut self, pattern: &PatternNode, tree: &'t PathTree) {
        let children = match (pattern, tree) {
            (PatternNode::Leaf, _) => return,
            (_, PathTree::Dir(children)) => children,
            (_, PathTree::File) => {
                let path = self.level_path();
                self.report(
                    DiagnosticKind::UnexpectedEntry,
                    path.clone(),
                    format_args!("`{}` is a file, expected a directory matching {pattern}", DisplayLevel(&path)),
                );
                return;
            }
        };

        let entries = pattern.entries_by_specificity();
        let mut matched: Vec<Vec<&'t str>> = vec![Vec::new(); entries.len()];
        let mut assigned: Vec<(&'t str, &'t PathTree, usize)> = Vec::with_capacity(children.len());

        for (name, child) in children {
            let Some(index) = entries.iter().position(|(key, _)| key.matches_segment(name)) else {
                let path = self.child_path(name);
                self.report(
                    DiagnosticKind::UnexpectedEntry,
                    path.clone(),
                    format_args!("`{path}` does not match any of {}", DisplayKeys(&entries)),
                );
                continue;
            };
            tracing::trace!("`{}` matched `{}`", self.child_path(name), entries[index].0);
            matched[index].push(name.as_str());
            assigned.push((name.as_str(), child, index));
        }

        let exclusive_chosen = self.check_exclusive(&entries, &matched, &assigned);
        self.check_cardinality(pattern, &entries, &matched, exclusive_chosen, assigned.len());

        for (name, child, index) in assigned {
            if let Some(child_pattern) = entries[index].1 {
                self.path.push(name);
                self.node(child_pattern, child);
                self.path.pop();
            }
        }
    }

    /// Returns true if an exclusive alternative was chosen at this level.
    fn check_exclusive(
        &mut self,
        entries: &Entries<'_>,
        matched: &[Vec<&'t str>],
        assigned: &[(&'t str, &'t PathTree, usize)],
    ) -> bool {
        let mut chosen = entries
            .iter()
            .zip(matched)
            .filter(|((key, _), _)| key.is_exclusive())
            .flat_map(|((key, _), names)| names.iter().map(move |name| (*key, *name)));

        let Some((exclusive_key, exclusive_name)) = chosen.next() else {
            return false;
        };

        let others: Vec<&str> = chosen.map(|(_, name)| name).collect();
        if !others.is_empty() {
            let level = self.level_path();
            self.report(
                DiagnosticKind::ConflictingAlternatives,
                level.clone(),
                format_args!(
                    "only one exclusive alternative may be present in `{}`, found {}",
                    DisplayLevel(&level),
                    DisplayNames(std::iter::once(exclusive_name).chain(others.iter().copied()))
                ),
            );
        }

        let exclusive_path = self.child_path(exclusive_name);
        for &(name, _, index) in assigned {
            if entries[index].0.is_exclusive() {
                continue;
            }
            let path = self.child_path(name);
            self.report(
                DiagnosticKind::ConflictingAlternatives,
                path.clone(),
                format_args!(
                    "`{path}` conflicts with the exclusive alternative `{exclusive_path}` (matching `{exclusive_key}`)"
                ),
            );
        }

        true
    }

    fn check_cardinality(
        &mut self,
        pattern: &PatternNode,
        entries: &Entries<'_>,
        matched: &[Vec<&'t str>],
        exclusive_chosen: bool,
        num_matched: usize,
    ) {
        let is_map = matches!(pattern, PatternNode::RequiredMap(_));
        let required = is_map && !exclusive_chosen;

        for ((key, _), names) in entries.iter().zip(matched) {
            match key.cardinality() {
                Cardinality::ExactlyOne if names.len() > 1 => {
                    let level = self.level_path();
                    self.report(
                        DiagnosticKind::ConflictingAlternatives,
                        level.clone(),
                        format_args!(
                            "expected exactly one entry matching `{key}` in `{}`, found {}: {}",
                            DisplayLevel(&level),
                            names.len(),
                            DisplayNames(names.iter().copied())
                        ),
                    );
                }
                Cardinality::ExactlyOne | Cardinality::OneOrMore if names.is_empty() && required => {
                    self.missing(key);
                }
                _ => {}
            }
        }

        if !is_map && !exclusive_chosen && num_matched == 0 {
            let level = self.level_path();
            self.report(
                DiagnosticKind::MissingRequiredEntry,
                level.clone(),
                format_args!(
                    "`{}` must contain at least one entry matching one of {}",
                    DisplayLevel(&level),
                    DisplayKeys(entries)
                ),
            );
        }
    }

    fn missing(&mut self, key: &PatternKey) {
        if let Some(literal) = key.as_placeholder().and_then(|p| p.literal()) {
            let path = self.child_path(literal);
            self.report(
                DiagnosticKind::MissingRequiredEntry,
                path.clone(),
                format_args!("`{path}` is missing"),
            );
        } else {
            let level = self.level_path();
            self.report(
                DiagnosticKind::MissingRequiredEntry,
                level.clone(),
                format_args!("`{}` has no entry matching `{key}`", DisplayLevel(&level)),
            );
        }
    }
}

/// The root level is displayed as `.`.
struct DisplayLevel<'a>(&'a str);

impl Display for DisplayLevel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_char('.')
        } else {
            f.write_str(self.0)
        }
    }
}

struct DisplayKeys<'a, 'p>(&'a Entries<'p>);

impl Display for DisplayKeys<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (key, _)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "`{key}`")?;
        }
        Ok(())
    }
}

struct DisplayNames<I>(I);

impl<'a, I> Display for DisplayNames<I>
where
    I: Iterator<Item = &'a str> + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, name) in self.0.clone().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "`{name}`")?;
        }
        Ok(())
    }
}
