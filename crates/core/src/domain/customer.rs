use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Pending,
    Completed,
    Cancelled,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// A customer row as stored by the remote service. `id`, `created_at` and
/// `updated_at` are assigned remotely and never fabricated on this side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub customer_name: String,
    pub unique_id: String,
    pub tracking_number: String,
    pub status: CustomerStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: UserId,
}

impl Customer {
    /// True when `term` occurs, case-insensitively, in at least one of the
    /// three searchable fields.
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.customer_name.to_lowercase().contains(&needle)
            || self.unique_id.to_lowercase().contains(&needle)
            || self.tracking_number.to_lowercase().contains(&needle)
    }
}

/// Insert payload. The caller-facing form marks the three string fields as
/// required; `validate` enforces the same constraint here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub customer_name: String,
    pub unique_id: String,
    pub tracking_number: String,
    #[serde(default)]
    pub status: CustomerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::MissingField("customer_name"));
        }
        if self.unique_id.trim().is_empty() {
            return Err(DomainError::MissingField("unique_id"));
        }
        if self.tracking_number.trim().is_empty() {
            return Err(DomainError::MissingField("tracking_number"));
        }
        Ok(())
    }
}

/// Partial update payload. Unset fields are omitted from the wire body, so an
/// update touches exactly the fields the caller supplied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.unique_id.is_none()
            && self.tracking_number.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}
