use crate::models::User;
use rust_decimal::Decimal;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user with the configured starting balance
    pub async fn create(&self, username: &str, starting_balance: Decimal) -> SqlxResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, balance)
            VALUES ($1, $2)
            RETURNING id, username, balance, is_admin, created_at
            "#,
        )
        .bind(username)
        .bind(starting_balance)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, balance, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, balance, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// List all user ids, for batch jobs that walk every portfolio
    pub async fn list_ids(&self) -> SqlxResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
    }

    /// Delete a user (admin cleanup; cascades to positions and history)
    pub async fn delete(&self, id: Uuid) -> SqlxResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
