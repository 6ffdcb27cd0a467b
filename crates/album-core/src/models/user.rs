use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User row as stored by the hosted backend.
///
/// Logins use either a username or a phone number as the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "password", skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// The credential shown to the user: username first, phone otherwise.
    pub fn login(&self) -> Option<&str> {
        self.username.as_deref().or(self.phone.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user: UserRecord = serde_json::from_value(serde_json::json!({
            "id": "9d4cee0f",
            "phone": "13800138000",
            "password": "$2b$12$hash"
        }))
        .unwrap();

        assert_eq!(user.password_hash.as_deref(), Some("$2b$12$hash"));
        assert_eq!(user.login(), Some("13800138000"));

        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password").is_none());
        assert!(out.get("password_hash").is_none());
    }
}
