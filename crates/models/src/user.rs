use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

/// Administrative role carried by a user account and embedded in tokens.
///
/// Stored as text with a CHECK constraint; exactly these two values are
/// accepted everywhere (requests, tokens, rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// What the API exposes about an account; never the hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Open registration; the account always starts with the `member` role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

/// Admin-created account with an explicit role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    pub role: Role,
}

/// Admin edit of an account; every field is independently optional and a
/// blank password means "leave the password alone".
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: Option<String>,

    pub role: Option<Role>,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn normalize(&mut self) {
        if let Some(username) = self.username.take() {
            let username = username.trim().to_string();
            if !username.is_empty() {
                self.username = Some(username);
            }
        }
        if let Some(password) = self.password.take() {
            if !password.trim().is_empty() {
                self.password = Some(password);
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePassword {
    pub current_password: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(serde_json::to_string(&Role::Member).unwrap(), r#""member""#);

        let role: Role = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn unknown_role_values_are_rejected() {
        // "user" was a historical alias in one code path; the allowed set
        // is exactly admin/member.
        assert!(serde_json::from_str::<Role>(r#""user""#).is_err());
        assert!(serde_json::from_str::<Role>(r#""ADMIN""#).is_err());
    }

    #[test]
    fn blank_update_password_means_unchanged() {
        let mut update: UpdateUser = serde_json::from_str(r#"{"password": "  "}"#).unwrap();
        update.normalize();
        assert!(update.password.is_none());
    }

    #[test]
    fn short_passwords_fail_validation() {
        let user = RegisterUser {
            username: "joao".to_string(),
            password: "12345".to_string(),
        };
        assert!(user.validate().is_err());
    }
}
