pub mod entities;
pub mod errors;
pub mod ports;
pub mod preprocess;

pub use entities::*;
pub use errors::{DomainError, Result};
pub use preprocess::Preprocessor;
