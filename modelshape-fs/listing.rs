use crate::{DELIMITER, ListingError, join_segments, strip_root};

/// Source of a flat file listing.
///
/// Implementations must return the complete listing below `root` (no
/// truncated pages), as keys relative to `root` and separated by
/// [`DELIMITER`]. Pagination and retries against the backing store are the
/// implementation's responsibility.
pub trait ListingSource {
    fn list(&self, root: &str) -> Result<Vec<String>, ListingError>;
}

/// A listing that was obtained elsewhere, e.g. the keys returned by an
/// object-storage prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticListing {
    keys: Vec<String>,
}

impl StaticListing {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse newline-separated keys, ignoring blank lines.
    #[must_use]
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl ListingSource for StaticListing {
    fn list(&self, root: &str) -> Result<Vec<String>, ListingError> {
        let mut listing = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let Some(relative) = strip_root(key, root, DELIMITER) else {
                tracing::debug!("Skipping key outside of `{root}`: {key}");
                continue;
            };
            if relative.is_empty() {
                // The root itself, or its directory marker.
                continue;
            }
            listing.push(relative.to_owned());
        }
        Ok(listing)
    }
}

#[derive(Clone, Debug)]
pub struct ListingSettings {
    /// Include hidden files and directories. Enabled by default.
    pub include_hidden: bool,
    /// Honor `.gitignore` files in the listed directory. Disabled by default,
    /// because model directories are rarely git repositories.
    pub git_ignore: bool,
    /// Follow symbolic links. Enabled by default.
    pub follow_links: bool,
    /// Explicit file name patterns to leave out of the listing, matched
    /// against the path relative to the listing root.
    pub ignore_explicitly: globset::GlobSet,
}

impl Default for ListingSettings {
    #[inline]
    fn default() -> Self {
        Self {
            include_hidden: true,
            git_ignore: false,
            follow_links: true,
            ignore_explicitly: globset::GlobSet::empty(),
        }
    }
}

impl ListingSettings {
    /// Build the explicit ignore set from glob strings.
    pub fn ignore_globs<I, S>(&mut self, globs: I) -> Result<&mut Self, ListingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = globset::GlobSetBuilder::new();
        for glob in globs {
            builder.add(globset::Glob::new(glob.as_ref())?);
        }
        self.ignore_explicitly = builder.build()?;
        Ok(self)
    }
}

/// Lists files in a local directory.
#[derive(Clone, Debug, Default)]
pub struct LocalListing {
    pub settings: ListingSettings,
}

impl LocalListing {
    #[must_use]
    pub fn new(settings: ListingSettings) -> Self {
        Self { settings }
    }
}

impl ListingSource for LocalListing {
    fn list(&self, root: &str) -> Result<Vec<String>, ListingError> {
        let root_path = std::path::Path::new(root);
        let metadata = std::fs::metadata(root_path)?;
        if !metadata.is_dir() {
            return Err(ListingError::NotADirectory(root_path.to_owned()));
        }

        let settings = &self.settings;
        let mut walker = ignore::WalkBuilder::new(root_path);
        walker
            .standard_filters(false)
            .hidden(!settings.include_hidden)
            .git_ignore(settings.git_ignore)
            .git_global(settings.git_ignore)
            .git_exclude(settings.git_ignore)
            .require_git(false)
            .follow_links(settings.follow_links)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut listing = Vec::new();
        for entry in walker.build() {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root_path) else {
                // This should not be possible.
                continue;
            };
            if settings.ignore_explicitly.is_match(relative) {
                tracing::trace!("Ignoring file: {}", relative.display());
                continue;
            }

            let segments = relative
                .components()
                .map(|component| {
                    component
                        .as_os_str()
                        .to_str()
                        .ok_or_else(|| ListingError::InvalidUtf8(entry.path().to_owned()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let key = join_segments(segments, DELIMITER);
            tracing::trace!("Listed file: {key}");
            listing.push(key);
        }

        tracing::debug!("Listed {} files in {}", listing.len(), root_path.display());
        Ok(listing)
    }
}
