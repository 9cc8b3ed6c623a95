use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::UserRepository;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for account registration and admin cleanup
pub struct AccountService {
    user_repo: Arc<UserRepository>,
    starting_balance: Decimal,
}

impl AccountService {
    pub fn new(user_repo: Arc<UserRepository>, starting_balance: Decimal) -> Self {
        Self {
            user_repo,
            starting_balance,
        }
    }

    /// Register a new user with the configured starting balance
    pub async fn register(&self, username: &str) -> AppResult<User> {
        User::validate_username(username).map_err(AppError::Validation)?;

        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::BusinessLogic(format!(
                "Username already taken: {}",
                username
            )));
        }

        let user = self
            .user_repo
            .create(username, self.starting_balance)
            .await?;

        info!(
            "Registered user {} ({}) with balance {}",
            user.username, user.id, user.balance
        );
        Ok(user)
    }

    /// Delete a user account. Admin-only; the caller must be an admin.
    pub async fn delete_account(&self, acting_user_id: Uuid, target_id: Uuid) -> AppResult<bool> {
        let actor = self
            .user_repo
            .find_by_id(acting_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Acting user not found".into()))?;

        if !actor.is_admin {
            return Err(AppError::BusinessLogic(
                "Only admins can delete accounts".into(),
            ));
        }

        let deleted = self.user_repo.delete(target_id).await?;
        if deleted {
            info!("Deleted user {}", target_id);
        }
        Ok(deleted)
    }
}
