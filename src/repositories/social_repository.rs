//! Repository for the follow graph and the trade feed.
//!
//! Plain data access: the social graph carries no invariants beyond
//! referential integrity and the no-self-follow constraint.

use crate::error::RepositoryError;
use crate::models::{Transaction, User};
use sqlx::PgPool;
use uuid::Uuid;

pub struct SocialRepository {
    pool: PgPool,
}

impl SocialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Follow another user. Idempotent; following yourself is rejected.
    pub async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), RepositoryError> {
        if follower_id == followed_id {
            return Err(RepositoryError::InvalidInput(
                "Users cannot follow themselves".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a follow edge; returns whether one existed
    pub async fn unfollow(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let rows_affected =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
                .bind(follower_id)
                .bind(followed_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected > 0)
    }

    pub async fn is_following(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM follows
                WHERE follower_id = $1 AND followed_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Users following the given user
    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.balance, u.is_admin, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followed_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Users the given user follows
    pub async fn following(&self, user_id: Uuid) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.balance, u.is_admin, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.followed_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Recent trades by followed users, newest first. Private trades are
    /// excluded; "followers" trades are visible because the viewer follows
    /// the trader by construction.
    pub async fn feed(&self, user_id: Uuid, limit: i64) -> Result<Vec<Transaction>, RepositoryError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT t.id, t.user_id, t.spotify_id, t.trade_type, t.shares,
                   t.popularity_per_share, t.total_amount, t.balance_before,
                   t.balance_after, t.privacy, t.created_at
            FROM transactions t
            JOIN follows f ON f.followed_id = t.user_id
            WHERE f.follower_id = $1
              AND t.privacy IN ('public', 'followers')
            ORDER BY t.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}
