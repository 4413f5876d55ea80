use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

/// Erro único exposto pelos providers.
///
/// As variantes existem para logging; a UI só precisa de `message()`.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Falha de transporte (DNS, conexão recusada, TLS...)
    Network(String),
    /// Resposta não-2xx do backend, com a mensagem enviada por ele
    Api { status: u16, message: String },
    /// Operação exige usuário autenticado
    NotAuthenticated,
    /// Usuário autenticado sem o papel necessário
    PermissionDenied(String),
    /// Entrada rejeitada antes de chegar na rede
    InvalidInput(String),
    /// Falha lendo/escrevendo o token persistido
    Storage(String),
    /// Corpo de resposta que não pôde ser interpretado
    Decode(String),
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError::Network(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::NotAuthenticated => "Not authenticated".to_string(),
            AppError::PermissionDenied(msg) => msg.clone(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::Decode(msg) => msg.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            AppError::NotAuthenticated => write!(f, "Not authenticated"),
            AppError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
