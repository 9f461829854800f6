mod error;
mod key;
mod listing;

pub use error::*;
pub use key::*;
pub use listing::*;
