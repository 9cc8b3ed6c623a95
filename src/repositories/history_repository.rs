//! Repository for the append-only popularity time series (History Store)

use crate::models::PriceSnapshot;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Result as SqlxResult};

pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a popularity snapshot for an artist
    pub async fn append_snapshot(
        &self,
        spotify_id: &str,
        popularity: i32,
    ) -> SqlxResult<PriceSnapshot> {
        sqlx::query_as::<_, PriceSnapshot>(
            r#"
            INSERT INTO artist_history (spotify_id, popularity)
            VALUES ($1, $2)
            RETURNING id, spotify_id, popularity, recorded_at
            "#,
        )
        .bind(spotify_id)
        .bind(popularity)
        .fetch_one(&self.pool)
        .await
    }

    /// Latest recorded popularity for an artist, `None` when the artist has
    /// no snapshot yet
    pub async fn latest(&self, spotify_id: &str) -> SqlxResult<Option<i32>> {
        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT popularity
            FROM artist_history
            WHERE spotify_id = $1
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(spotify_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Latest popularity per artist across the whole catalog
    pub async fn latest_all(&self) -> SqlxResult<Vec<(String, i32)>> {
        sqlx::query_as::<_, (String, i32)>(
            r#"
            SELECT DISTINCT ON (spotify_id) spotify_id, popularity
            FROM artist_history
            ORDER BY spotify_id, recorded_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Popularity history for an artist since a point in time, oldest first
    pub async fn history_since(
        &self,
        spotify_id: &str,
        since: NaiveDateTime,
    ) -> SqlxResult<Vec<PriceSnapshot>> {
        sqlx::query_as::<_, PriceSnapshot>(
            r#"
            SELECT id, spotify_id, popularity, recorded_at
            FROM artist_history
            WHERE spotify_id = $1 AND recorded_at >= $2
            ORDER BY recorded_at
            "#,
        )
        .bind(spotify_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }
}
