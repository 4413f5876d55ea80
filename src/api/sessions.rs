use serde::Serialize;

use crate::api::client::{ApiClient, Envelope, ListEnvelope};
use crate::models::{CreateSessionRequest, RawSession};
use crate::utils::error::AppResult;

#[derive(Serialize)]
struct CreateSessionPayload<'a> {
    #[serde(flatten)]
    data: &'a CreateSessionRequest,
    created_by: &'a str,
}

/// GET /sessions
pub async fn fetch_sessions(api: &ApiClient, token: &str) -> AppResult<Vec<RawSession>> {
    let list: ListEnvelope<RawSession> = api.get("/sessions", Some(token)).await?;
    Ok(list.into_vec())
}

/// POST /create-session
pub async fn create_session(
    api: &ApiClient,
    token: &str,
    created_by: &str,
    request: &CreateSessionRequest,
) -> AppResult<RawSession> {
    let payload = CreateSessionPayload { data: request, created_by };
    let envelope: Envelope<RawSession> = api.post("/create-session", &payload, Some(token)).await?;
    Ok(envelope.into_inner())
}
