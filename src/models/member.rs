use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `members` table
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "memberId")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMember {
    pub name: String,
    pub email: String,
}

impl CreateMember {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Member name cannot be empty".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("Invalid email address: {}", self.email));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_name() {
        let request = CreateMember {
            name: "  ".to_string(),
            email: "a@b.com".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let request = CreateMember {
            name: "jongbum".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_valid_member() {
        let request = CreateMember {
            name: "jongbum".to_string(),
            email: "jongbum@example.com".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
