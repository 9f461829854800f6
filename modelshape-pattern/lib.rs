mod error;
mod group;
mod node;
mod placeholder;
mod registry;

pub use error::*;
pub use group::*;
pub use node::*;
pub use placeholder::*;
pub use registry::*;
