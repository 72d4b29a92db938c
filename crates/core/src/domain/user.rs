use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "member" => Ok(Self::Member),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// Row from the `user_profiles` table. Read-only on this side; the remote
/// service maintains it alongside its auth accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated principal. The store only ever reads `id` to stamp
/// `created_by` on inserts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub user: AuthUser,
    pub access_token: SecretString,
}

#[cfg(test)]
mod tests {
    use super::UserRole;

    #[test]
    fn role_parses_and_round_trips() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Member] {
            assert_eq!(role.as_str().parse::<UserRole>().expect("parse"), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn profile_role_defaults_to_member_when_absent() {
        let profile: super::UserProfile = serde_json::from_value(serde_json::json!({
            "id": "7a4b84bc-94c4-4dd7-a166-4a3bd3c0e765",
            "full_name": null,
            "avatar_url": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        }))
        .expect("deserialize profile");
        assert_eq!(profile.role, UserRole::Member);
    }
}
