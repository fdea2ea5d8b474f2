use std::fmt::{Display, Formatter};

use carescope_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Role identifier such as `Manager`, `Nurse` or `Admin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct RoleCode(NonEmptyString);

impl RoleCode {
    /// Creates a validated role code.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validated_identifier("role code", value.into()).map(Self)
    }

    /// Returns the role code as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RoleCode {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(value)
    }
}

impl Display for RoleCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Protected resource category such as `residents`, `users` or `units`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct ResourceType(NonEmptyString);

impl ResourceType {
    /// Creates a validated resource type.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validated_identifier("resource type", value.into()).map(Self)
    }

    /// Returns the resource type as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ResourceType {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(value)
    }
}

impl Display for ResourceType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn validated_identifier(label: &str, value: String) -> AppResult<NonEmptyString> {
    let trimmed = value.trim();
    if trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(format!(
            "{label} '{trimmed}' must not contain whitespace"
        )));
    }

    NonEmptyString::new(trimmed)
        .map_err(|_| AppError::Validation(format!("{label} must not be empty")))
}

/// Role reference record. Reporting only; never consulted for access decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    role_code: RoleCode,
    description: String,
    is_active: bool,
}

impl Role {
    /// Creates a role record.
    #[must_use]
    pub fn new(role_code: RoleCode, description: impl Into<String>, is_active: bool) -> Self {
        Self {
            role_code,
            description: description.into(),
            is_active,
        }
    }

    /// Returns the role code.
    #[must_use]
    pub fn role_code(&self) -> &RoleCode {
        &self.role_code
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns whether the role can currently be assigned.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
