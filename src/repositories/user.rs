// src/repositories/user.rs - Accounts and auth tokens
use async_trait::async_trait;
use log::{debug, error};
use sqlx::{PgPool, Postgres, Transaction};

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{NewUser, User, UserCredentials, UserRow};

type Result<T> = std::result::Result<T, RepositoryError>;

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.first_name, u.last_name, u.avatar, u.is_admin, u.created_at";

/// Selects users together with whether `$1` (nullable viewer id) follows them
fn select_user_rows(tail: &str) -> String {
    format!(
        r#"
        SELECT {USER_COLUMNS},
               EXISTS (
                   SELECT 1 FROM follows f WHERE f.user_id = $1 AND f.following_id = u.id
               ) AS is_subscribed
        FROM users u
        {tail}
        "#
    )
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait {
    /// Inserts a new account
    ///
    /// ### Errors
    /// * `RepositoryError::Duplicate` - If the email or username is taken
    /// * `RepositoryError::Database` - If a database error occurs
    async fn create(&self, user: &NewUser) -> Result<User>;

    /// Finds a user as seen by `viewer`
    ///
    /// ### Arguments
    /// * `id` - The user to find
    /// * `viewer` - The requesting user, `None` for anonymous requests
    ///
    /// ### Returns
    /// * `Result<Option<UserRow>>` - The user with the subscription flag, or `None`
    async fn find_by_id(&self, id: i64, viewer: Option<i64>) -> Result<Option<UserRow>>;

    /// Lists users ordered by id
    async fn find_all(&self, viewer: Option<i64>, limit: i64, offset: i64) -> Result<Vec<UserRow>>;

    async fn count(&self) -> Result<i64>;

    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>>;

    async fn find_credentials_by_id(&self, id: i64) -> Result<Option<UserCredentials>>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;

    /// Replaces the avatar path and returns the previous one
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If the user does not exist
    async fn update_avatar(&self, id: i64, avatar: Option<String>) -> Result<Option<String>>;

    /// Resolves an auth token to its owner
    async fn find_by_token(&self, key: &str) -> Result<Option<User>>;

    /// Stores `key` for the user unless a token already exists; returns the stored token
    async fn get_or_create_token(&self, user_id: i64, key: &str) -> Result<String>;

    /// Deletes a token, returning whether it existed
    async fn delete_token(&self, key: &str) -> Result<bool>;
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }

    async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            error!("Failed to start database transaction: {}", e);
            RepositoryError::Database(e)
        })
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let record = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users AS u (email, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING u.id, u.email, u.username, u.first_name, u.last_name, u.avatar, u.is_admin, u.created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            debug!("Failed to insert user '{}': {}", user.username, e);
            RepositoryError::from(e)
        })?;

        Ok(record)
    }

    async fn find_by_id(&self, id: i64, viewer: Option<i64>) -> Result<Option<UserRow>> {
        let sql = select_user_rows("WHERE u.id = $2");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(viewer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)
    }

    async fn find_all(&self, viewer: Option<i64>, limit: i64, offset: i64) -> Result<Vec<UserRow>> {
        let sql = select_user_rows("ORDER BY u.id LIMIT $2 OFFSET $3");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(viewer)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn find_credentials_by_id(&self, id: i64) -> Result<Option<UserCredentials>> {
        sqlx::query_as::<_, UserCredentials>("SELECT id, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn update_avatar(&self, id: i64, avatar: Option<String>) -> Result<Option<String>> {
        let mut tx = self.begin_transaction().await?;

        let previous = sqlx::query_scalar::<_, Option<String>>(
            "SELECT avatar FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {} not found", id)))?;

        sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            RepositoryError::Database(e)
        })?;

        Ok(previous)
    }

    async fn find_by_token(&self, key: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM auth_tokens t JOIN users u ON u.id = t.user_id WHERE t.key = $1"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)
    }

    async fn get_or_create_token(&self, user_id: i64, key: &str) -> Result<String> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING key
            "#,
        )
        .bind(key)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn delete_token(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
