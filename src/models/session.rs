use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::serde_ext::{
    opt_string_from_any, opt_timestamp_from_any, string_from_any, string_set_from_any,
};

/// Sessão de discussão em grupo (imutável depois de criada)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub topic: String,
    pub details: String,
    pub group_name: String,
    pub group_number: Option<String>,
    pub date: Option<String>,
    /// Matrículas dos participantes
    pub participants: Vec<String>,
    /// Matrículas dos avaliadores
    pub evaluators: Vec<String>,
    /// Id do instrutor que criou a sessão
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn has_participant(&self, roll_number: &str) -> bool {
        self.participants.iter().any(|p| p == roll_number)
    }

    pub fn has_evaluator(&self, roll_number: &str) -> bool {
        self.evaluators.iter().any(|e| e == roll_number)
    }

    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSession {
    #[serde(default, deserialize_with = "string_from_any")]
    pub id: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub topic: String,
    #[serde(default, alias = "description", deserialize_with = "string_from_any")]
    pub details: String,
    #[serde(default, alias = "groupName", deserialize_with = "string_from_any")]
    pub group_name: String,
    #[serde(default, alias = "groupNumber", deserialize_with = "opt_string_from_any")]
    pub group_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "string_set_from_any")]
    pub participants: Vec<String>,
    #[serde(default, deserialize_with = "string_set_from_any")]
    pub evaluators: Vec<String>,
    #[serde(default, alias = "createdBy", deserialize_with = "string_from_any")]
    pub created_by: String,
    #[serde(default, alias = "createdAt", deserialize_with = "opt_timestamp_from_any")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<RawSession> for Session {
    fn from(raw: RawSession) -> Self {
        Session {
            id: raw.id,
            topic: raw.topic,
            details: raw.details,
            group_name: raw.group_name,
            group_number: raw.group_number,
            date: raw.date,
            participants: raw.participants,
            evaluators: raw.evaluators,
            created_by: raw.created_by,
            created_at: raw.created_at,
        }
    }
}

/// Dados informados pelo instrutor ao criar uma sessão
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateSessionRequest {
    pub topic: String,
    pub details: String,
    pub group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub participants: Vec<String>,
    pub evaluators: Vec<String>,
}

/// Visão das sessões do usuário corrente
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserSessions {
    pub participating: Vec<Session>,
    pub evaluating: Vec<Session>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_session_normalization() {
        let raw: RawSession = serde_json::from_str(
            r#"{"id": 3, "topic": "AI in education", "details": "Round 1",
                "group_name": "Alpha", "group_number": 2, "date": "2024-04-10",
                "participants": ["2101", 2102], "evaluators": "2103,2104",
                "created_by": 11, "created_at": "2024-04-01T08:00:00Z"}"#,
        )
        .unwrap();

        let session = Session::from(raw);
        assert_eq!(session.id, "3");
        assert_eq!(session.group_number.as_deref(), Some("2"));
        assert_eq!(session.participants, vec!["2101", "2102"]);
        assert_eq!(session.evaluators, vec!["2103", "2104"]);
        assert!(session.is_created_by("11"));
        assert!(session.has_participant("2102"));
        assert!(session.has_evaluator("2104"));
        assert!(!session.has_evaluator("2101"));
    }

    #[test]
    fn test_camel_case_keys_accepted() {
        let raw: RawSession = serde_json::from_str(
            r#"{"id": "s1", "topic": "t", "groupName": "Beta", "createdBy": "i1", "participants": null}"#,
        )
        .unwrap();

        let session = Session::from(raw);
        assert_eq!(session.group_name, "Beta");
        assert_eq!(session.created_by, "i1");
        assert!(session.participants.is_empty());
    }
}
