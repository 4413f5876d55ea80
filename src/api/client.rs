use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// Cliente HTTP do backend de avaliações.
///
/// Não há timeout nem retry: uma requisição pendurada segura o `isLoading`
/// do provider até resolver.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Resposta de registro único, nua ou dentro de um envelope (`{"user": {...}}`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    User { user: T },
    Session { session: T },
    Evaluation { evaluation: T },
    Data { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::User { user } => user,
            Envelope::Session { session } => session,
            Envelope::Evaluation { evaluation } => evaluation,
            Envelope::Data { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// Listagem como array nu ou dentro de um envelope (`{"sessions": [...]}`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Items(Vec<T>),
    Sessions { sessions: Vec<T> },
    Evaluations { evaluations: Vec<T> },
    Data { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Items(items) => items,
            ListEnvelope::Sessions { sessions } => sessions,
            ListEnvelope::Evaluations { evaluations } => evaluations,
            ListEnvelope::Data { data } => data,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    msg: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header("Accept", "application/json");

        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get<T>(&self, path: &str, token: Option<&str>) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path, token)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("GET {} failed: {}", path, e)))?;

        Self::parse(path, response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, path, token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("POST {} failed: {}", path, e)))?;

        Self::parse(path, response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PUT, path, token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("PUT {} failed: {}", path, e)))?;

        Self::parse(path, response).await
    }

    async fn parse<T>(path: &str, response: Response) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read {} response: {}", path, e)))?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                format!(
                    "Request failed: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string()
            });
            log::debug!("❌ {} -> {}: {}", path, status, message);
            return Err(AppError::Api { status: status.as_u16(), message });
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::Decode(format!("Failed to parse {} response: {}", path, e)))
    }
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .or(parsed.msg)
        .filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("/login"), "http://localhost:5000/api/login");
        assert_eq!(client.url("sessions"), "http://localhost:5000/api/sessions");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "Invalid credentials"}"#).as_deref(), Some("Invalid credentials"));
        assert_eq!(error_message(r#"{"error": "Forbidden"}"#).as_deref(), Some("Forbidden"));
        assert_eq!(error_message(r#"{"msg": ""}"#), None);
        assert_eq!(error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_envelope_accepts_wrapped_and_bare() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Item {
            id: u32,
        }

        let wrapped: Envelope<Item> = serde_json::from_str(r#"{"user": {"id": 1}}"#).unwrap();
        assert_eq!(wrapped.into_inner(), Item { id: 1 });

        let bare: Envelope<Item> = serde_json::from_str(r#"{"id": 2}"#).unwrap();
        assert_eq!(bare.into_inner(), Item { id: 2 });
    }
}
