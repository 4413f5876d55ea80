use crate::api::client::{ApiClient, Envelope};
use crate::models::{AuthResponse, LoginRequest, ProfileUpdate, RawUser, RegisterRequest};
use crate::utils::error::AppResult;

/// GET /check-session
pub async fn check_session(api: &ApiClient, token: &str) -> AppResult<RawUser> {
    let envelope: Envelope<RawUser> = api.get("/check-session", Some(token)).await?;
    Ok(envelope.into_inner())
}

/// POST /login
pub async fn login(api: &ApiClient, request: &LoginRequest) -> AppResult<AuthResponse> {
    api.post("/login", request, None).await
}

/// POST /register
pub async fn register(api: &ApiClient, request: &RegisterRequest) -> AppResult<AuthResponse> {
    api.post("/register", request, None).await
}

/// PUT /update-profile
pub async fn update_profile(api: &ApiClient, token: &str, update: &ProfileUpdate) -> AppResult<RawUser> {
    let envelope: Envelope<RawUser> = api.put("/update-profile", update, Some(token)).await?;
    Ok(envelope.into_inner())
}
