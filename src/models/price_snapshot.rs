use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One point of the append-only popularity time series for an artist.
/// The most recent row per artist is the current per-share valuation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceSnapshot {
    pub id: i64,
    pub spotify_id: String,
    pub popularity: i32,
    pub recorded_at: NaiveDateTime,
}
