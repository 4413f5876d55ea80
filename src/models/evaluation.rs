use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{Role, Session};
use crate::utils::error::{AppError, AppResult};
use crate::utils::serde_ext::{f64_from_any, opt_f64_from_any, opt_timestamp_from_any, string_from_any};

/// Rubrica fixa de cinco critérios
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationCriteria {
    #[serde(default, deserialize_with = "f64_from_any")]
    pub articulation: f64,
    #[serde(default, deserialize_with = "f64_from_any")]
    pub relevance: f64,
    #[serde(default, deserialize_with = "f64_from_any")]
    pub leadership: f64,
    #[serde(default, alias = "nonVerbalCommunication", deserialize_with = "f64_from_any")]
    pub non_verbal_communication: f64,
    #[serde(default, deserialize_with = "f64_from_any")]
    pub impression: f64,
}

impl EvaluationCriteria {
    pub const MIN_SCORE: f64 = 0.0;
    pub const MAX_SCORE: f64 = 10.0;

    pub const ZERO: EvaluationCriteria = EvaluationCriteria {
        articulation: 0.0,
        relevance: 0.0,
        leadership: 0.0,
        non_verbal_communication: 0.0,
        impression: 0.0,
    };

    pub fn new(
        articulation: f64,
        relevance: f64,
        leadership: f64,
        non_verbal_communication: f64,
        impression: f64,
    ) -> Self {
        Self { articulation, relevance, leadership, non_verbal_communication, impression }
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("articulation", self.articulation),
            ("relevance", self.relevance),
            ("leadership", self.leadership),
            ("nonVerbalCommunication", self.non_verbal_communication),
            ("impression", self.impression),
        ]
    }

    pub fn validate(&self) -> AppResult<()> {
        for (name, score) in self.fields() {
            if !score.is_finite() || score < Self::MIN_SCORE || score > Self::MAX_SCORE {
                return Err(AppError::InvalidInput(format!(
                    "{} must be between {} and {}, got {}",
                    name,
                    Self::MIN_SCORE,
                    Self::MAX_SCORE,
                    score
                )));
            }
        }
        Ok(())
    }

    /// Média simples dos cinco critérios
    pub fn overall(&self) -> f64 {
        self.fields().iter().map(|(_, score)| score).sum::<f64>() / 5.0
    }

    /// Média por critério; conjunto vazio dá `ZERO`
    pub fn mean<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a EvaluationCriteria>,
    {
        let mut sum = Self::ZERO;
        let mut count = 0usize;
        for c in items {
            sum.articulation += c.articulation;
            sum.relevance += c.relevance;
            sum.leadership += c.leadership;
            sum.non_verbal_communication += c.non_verbal_communication;
            sum.impression += c.impression;
            count += 1;
        }

        if count == 0 {
            return Self::ZERO;
        }

        let n = count as f64;
        Self {
            articulation: sum.articulation / n,
            relevance: sum.relevance / n,
            leadership: sum.leadership / n,
            non_verbal_communication: sum.non_verbal_communication / n,
            impression: sum.impression / n,
        }
    }
}

/// Avaliação de um aluno numa sessão, feita por um avaliador
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub evaluator_id: String,
    /// Sempre derivado do dono da sessão, nunca lido do backend
    pub evaluator_role: Role,
    pub criteria: EvaluationCriteria,
    pub created_at: Option<DateTime<Utc>>,
}

/// Instrutor sse o avaliador é quem criou a sessão; sessão desconhecida = par.
pub fn derive_evaluator_role(evaluator_id: &str, session: Option<&Session>) -> Role {
    match session {
        Some(session) if session.is_created_by(evaluator_id) => Role::Instructor,
        _ => Role::Student,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvaluation {
    #[serde(default, deserialize_with = "string_from_any")]
    pub id: String,
    #[serde(default, alias = "sessionId", deserialize_with = "string_from_any")]
    pub session_id: String,
    #[serde(default, alias = "studentId", deserialize_with = "string_from_any")]
    pub student_id: String,
    #[serde(default, alias = "evaluatorId", deserialize_with = "string_from_any")]
    pub evaluator_id: String,
    #[serde(default, deserialize_with = "opt_criteria")]
    pub criteria: Option<EvaluationCriteria>,
    // Colunas "achatadas", quando o backend não aninha os critérios
    #[serde(default, deserialize_with = "opt_f64_from_any")]
    pub articulation: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_from_any")]
    pub relevance: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_from_any")]
    pub leadership: Option<f64>,
    #[serde(default, alias = "nonVerbalCommunication", deserialize_with = "opt_f64_from_any")]
    pub non_verbal_communication: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_from_any")]
    pub impression: Option<f64>,
    #[serde(default, alias = "createdAt", deserialize_with = "opt_timestamp_from_any")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Critérios aninhados como objeto ou como JSON serializado numa string
fn opt_criteria<'de, D>(deserializer: D) -> Result<Option<EvaluationCriteria>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let value = match value {
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(None),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(&raw).map_err(<D::Error as serde::de::Error>::custom)?,
        Some(Value::Null) | None => return Ok(None),
        Some(other) => other,
    };
    EvaluationCriteria::deserialize(value)
        .map(Some)
        .map_err(<D::Error as serde::de::Error>::custom)
}

impl RawEvaluation {
    fn criteria(&self) -> EvaluationCriteria {
        if let Some(criteria) = self.criteria {
            return criteria;
        }
        EvaluationCriteria {
            articulation: self.articulation.unwrap_or(0.0),
            relevance: self.relevance.unwrap_or(0.0),
            leadership: self.leadership.unwrap_or(0.0),
            non_verbal_communication: self.non_verbal_communication.unwrap_or(0.0),
            impression: self.impression.unwrap_or(0.0),
        }
    }

    /// Normaliza e deriva o papel do avaliador a partir das sessões conhecidas.
    pub fn normalize(self, sessions: &[Session]) -> Evaluation {
        let criteria = self.criteria();
        let session = sessions.iter().find(|s| s.id == self.session_id);
        let evaluator_role = derive_evaluator_role(&self.evaluator_id, session);

        Evaluation {
            id: self.id,
            session_id: self.session_id,
            student_id: self.student_id,
            evaluator_id: self.evaluator_id,
            evaluator_role,
            criteria,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitEvaluationRequest {
    pub session_id: String,
    pub student_id: String,
    pub evaluator_id: String,
    pub criteria: EvaluationCriteria,
}

/// Resultado de `calculate_scores`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub peer_average: EvaluationCriteria,
    pub instructor_score: EvaluationCriteria,
    pub final_score: EvaluationCriteria,
    pub peer_count: usize,
    pub instructor_count: usize,
}
