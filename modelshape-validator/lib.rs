mod error;
mod matcher;
mod models;
mod report;
mod tree;
mod validator;

pub use error::*;
pub use matcher::*;
pub use models::*;
pub use report::*;
pub use tree::*;
pub use validator::*;

#[doc(no_inline)]
pub use modelshape_pattern::{PatternNode, PatternRegistry, PredictorType};
