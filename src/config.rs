use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TOKEN_FILE: &str = ".gd-eval/storage.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL do backend, sem barra final
    pub api_base_url: String,
    /// Arquivo onde o token é persistido
    pub token_file: PathBuf,
}

impl Config {
    /// Lê `GD_EVAL_API_URL` e `GD_EVAL_TOKEN_FILE` (chame `dotenv()` antes)
    pub fn from_env() -> Self {
        let api_base_url = env::var("GD_EVAL_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token_file = env::var("GD_EVAL_TOKEN_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());

        Self::new(&api_base_url, token_file)
    }

    pub fn new(api_base_url: &str, token_file: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
            token_file: token_file.into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_TOKEN_FILE)
    }
}
