use modelshape_fs::{ListingError, ListingSource, StaticListing};
use parking_lot::Mutex;

/// Listing source backed by a fixed set of keys, recording every root it is
/// asked to list.
#[derive(Default)]
pub struct MockListing {
    keys: StaticListing,
    error: Option<ListingError>,
    requests: Mutex<Vec<String>>,
}

impl MockListing {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: StaticListing::new(keys),
            ..Default::default()
        }
    }

    /// A source whose every listing fails with `error`.
    #[must_use]
    pub fn failing(error: ListingError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    /// The roots listed so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl ListingSource for MockListing {
    fn list(&self, root: &str) -> Result<Vec<String>, ListingError> {
        self.requests.lock().push(root.to_owned());
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        self.keys.list(root)
    }
}
