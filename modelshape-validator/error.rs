use modelshape_fs::ListingError;
use modelshape_pattern::PatternError;

/// Fatal validation errors. Structural problems with the listed files are not
/// errors, but diagnostics in a [`ValidationReport`](crate::ValidationReport).
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("could not list `{root}`: {source}")]
    Listing {
        root: String,
        #[source]
        source: ListingError,
    },
}

impl Error {
    #[inline]
    pub fn listing(root: impl Into<String>, source: ListingError) -> Self {
        Self::Listing {
            root: root.into(),
            source,
        }
    }
}
