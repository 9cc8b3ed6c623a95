use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Artist identity, keyed by the external catalog id.
/// Identity is immutable once created; only popularity history grows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Artist {
    pub spotify_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}
