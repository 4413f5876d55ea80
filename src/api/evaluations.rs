use crate::api::client::{ApiClient, Envelope, ListEnvelope};
use crate::models::{RawEvaluation, SubmitEvaluationRequest};
use crate::utils::error::AppResult;

/// GET /evaluations
pub async fn fetch_evaluations(api: &ApiClient, token: &str) -> AppResult<Vec<RawEvaluation>> {
    let list: ListEnvelope<RawEvaluation> = api.get("/evaluations", Some(token)).await?;
    Ok(list.into_vec())
}

/// POST /submit-evaluation
pub async fn submit_evaluation(
    api: &ApiClient,
    token: &str,
    request: &SubmitEvaluationRequest,
) -> AppResult<RawEvaluation> {
    let envelope: Envelope<RawEvaluation> = api.post("/submit-evaluation", request, Some(token)).await?;
    Ok(envelope.into_inner())
}
