pub mod auth_service;
pub mod evaluation_service;
pub mod scoring;

pub use auth_service::*;
pub use evaluation_service::*;
pub use scoring::*;
