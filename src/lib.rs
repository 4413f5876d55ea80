//! Camada de estado do cliente de avaliação de discussões em grupo.
//!
//! Dois providers ficam entre a UI e o backend REST:
//! [`AuthService`] (usuário corrente e token) e [`EvaluationService`]
//! (sessões, avaliações e cálculo de notas).

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod mock_backend;

pub use config::Config;
pub use services::{AuthEvent, AuthService, DataEvent, EvaluationService};
pub use utils::error::{AppError, AppResult};
