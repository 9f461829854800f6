use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ListingError {
    #[error(transparent)]
    Io(Arc<std::io::Error>),
    #[error(transparent)]
    Walk(Arc<ignore::Error>),
    #[error(transparent)]
    Glob(Arc<globset::Error>),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(std::path::PathBuf),
    #[error("path is not valid UTF-8: {}", .0.display())]
    InvalidUtf8(std::path::PathBuf),
}

impl From<std::io::Error> for ListingError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<ignore::Error> for ListingError {
    #[inline]
    fn from(err: ignore::Error) -> Self {
        Self::Walk(Arc::new(err))
    }
}

impl From<globset::Error> for ListingError {
    #[inline]
    fn from(err: globset::Error) -> Self {
        Self::Glob(Arc::new(err))
    }
}
