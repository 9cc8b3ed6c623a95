use crate::models::Artist;
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for artist data access
pub struct ArtistRepository {
    pool: PgPool,
}

impl ArtistRepository {
    /// Create a new ArtistRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new artist
    pub async fn create(
        &self,
        spotify_id: &str,
        name: &str,
        image_url: Option<&str>,
    ) -> SqlxResult<Artist> {
        sqlx::query_as::<_, Artist>(
            r#"
            INSERT INTO artists (spotify_id, name, image_url)
            VALUES ($1, $2, $3)
            RETURNING spotify_id, name, image_url, created_at
            "#,
        )
        .bind(spotify_id)
        .bind(name)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await
    }

    /// Find an artist by catalog id
    pub async fn find_by_id(&self, spotify_id: &str) -> SqlxResult<Option<Artist>> {
        sqlx::query_as::<_, Artist>(
            r#"
            SELECT spotify_id, name, image_url, created_at
            FROM artists
            WHERE spotify_id = $1
            "#,
        )
        .bind(spotify_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find or create an artist. Identity is immutable once created, so an
    /// existing row is returned untouched.
    pub async fn find_or_create(
        &self,
        spotify_id: &str,
        name: &str,
        image_url: Option<&str>,
    ) -> SqlxResult<Artist> {
        if let Some(artist) = self.find_by_id(spotify_id).await? {
            return Ok(artist);
        }

        self.create(spotify_id, name, image_url).await
    }

    /// List all tracked artists, ordered by name
    pub async fn list_all(&self) -> SqlxResult<Vec<Artist>> {
        sqlx::query_as::<_, Artist>(
            r#"
            SELECT spotify_id, name, image_url, created_at
            FROM artists
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
