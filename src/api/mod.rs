pub mod auth;
pub mod client;
pub mod evaluations;
pub mod sessions;

pub use client::ApiClient;
