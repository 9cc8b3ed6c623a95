use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account with its cash balance
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub balance: Decimal,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Validate a username: 3-30 characters, lowercase letters, digits and
    /// underscores only.
    pub fn validate_username(username: &str) -> Result<(), String> {
        if username.len() < 3 || username.len() > 30 {
            return Err("Username must be 3-30 characters".to_string());
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(
                "Username can only contain lowercase letters, numbers, and underscores"
                    .to_string(),
            );
        }
        Ok(())
    }
}
