use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Lê o `exp` de um JWT sem verificar a assinatura.
///
/// Retorna `None` para tokens opacos ou sem `exp`; nesses casos só o backend
/// pode dizer se o token ainda vale.
pub fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

pub fn is_token_expired(token: &str) -> bool {
    match token_expiry(token) {
        Some(exp) => exp <= chrono::Utc::now().timestamp(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    fn token_with_exp(exp: i64) -> String {
        encode(
            &Header::default(),
            &Claims { sub: "u1".to_string(), exp },
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_expired_token_detected() {
        let past = chrono::Utc::now().timestamp() - 60;
        assert!(is_token_expired(&token_with_exp(past)));
    }

    #[test]
    fn test_valid_token_not_expired() {
        let future = chrono::Utc::now().timestamp() + 3600;
        let token = token_with_exp(future);
        assert!(!is_token_expired(&token));
        assert_eq!(token_expiry(&token), Some(future));
    }

    #[test]
    fn test_opaque_token_is_left_to_backend() {
        assert_eq!(token_expiry("not-a-jwt"), None);
        assert!(!is_token_expired("not-a-jwt"));
    }
}
