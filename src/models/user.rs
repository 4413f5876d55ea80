use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::serde_ext::{opt_string_from_any, opt_timestamp_from_any, string_from_any};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    /// Qualquer valor diferente de "instructor" é tratado como aluno.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("instructor") {
            Role::Instructor
        } else {
            Role::Student
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Usuário autenticado, já normalizado
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub section: Option<String>,
    pub year: Option<String>,
    pub roll_number: Option<String>,
    pub designation: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }

    /// Aplica uma resposta parcial do backend: campos presentes sobrescrevem,
    /// ausentes mantêm o valor atual.
    pub fn merge(&mut self, raw: RawUser) {
        if !raw.id.is_empty() {
            self.id = raw.id;
        }
        if let Some(name) = raw.name {
            self.name = name;
        }
        if let Some(email) = raw.email {
            self.email = email;
        }
        if let Some(role) = raw.role {
            self.role = Role::parse(&role);
        }
        if raw.department.is_some() {
            self.department = raw.department;
        }
        if raw.section.is_some() {
            self.section = raw.section;
        }
        if raw.year.is_some() {
            self.year = raw.year;
        }
        if raw.roll_number.is_some() {
            self.roll_number = raw.roll_number;
        }
        if raw.designation.is_some() {
            self.designation = raw.designation;
        }
        if raw.created_at.is_some() {
            self.created_at = raw.created_at;
        }
    }
}

/// Registro de usuário como chega do backend (snake_case, camelCase aceito)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "string_from_any")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub year: Option<String>,
    #[serde(default, alias = "rollNumber", deserialize_with = "opt_string_from_any")]
    pub roll_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub designation: Option<String>,
    #[serde(default, alias = "createdAt", deserialize_with = "opt_timestamp_from_any")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            role: raw.role.as_deref().map(Role::parse).unwrap_or(Role::Student),
            department: raw.department,
            section: raw.section,
            year: raw.year,
            roll_number: raw.roll_number,
            designation: raw.designation,
            created_at: raw.created_at,
        }
    }
}

// Request/Response structures
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
}

/// Atualização parcial de perfil; só os campos `Some` são enviados
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.department.is_none()
            && self.section.is_none()
            && self.year.is_none()
            && self.roll_number.is_none()
            && self.designation.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "access_token", alias = "accessToken")]
    pub token: String,
    pub user: RawUser,
}
