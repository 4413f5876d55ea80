// Utility functions
pub mod error;
pub mod jwt;
pub mod loading;
pub mod serde_ext;
pub mod token_store;

pub use error::*;
pub use loading::*;
pub use token_store::*;
