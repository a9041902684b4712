pub mod error;
pub mod project;

pub use error::*;
pub use project::*;
