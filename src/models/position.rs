use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's current holding in one artist.
///
/// Exists only while `shares > 0`; a full sell deletes the row instead of
/// leaving it at zero. `avg_popularity` is the shares-weighted average
/// purchase popularity and is recomputed on buys only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub user_id: Uuid,
    pub spotify_id: String,
    pub shares: i64,
    pub avg_popularity: Decimal,
    pub updated_at: NaiveDateTime,
}

impl Position {
    /// Total cost basis of the holding (shares * average popularity paid)
    pub fn cost_basis(&self) -> Decimal {
        Decimal::from(self.shares) * self.avg_popularity
    }
}
