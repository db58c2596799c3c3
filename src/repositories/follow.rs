// src/repositories/follow.rs - Subscriptions between users
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{RecipeShort, User};

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepositoryTrait {
    /// Subscribes `user_id` to `following_id`, returns false if already subscribed
    async fn create(&self, user_id: i64, following_id: i64) -> Result<bool>;

    /// Removes a subscription, returns false if there was none
    async fn delete(&self, user_id: i64, following_id: i64) -> Result<bool>;

    async fn find_user(&self, id: i64) -> Result<Option<User>>;

    /// Authors `user_id` follows, ordered by username
    async fn find_following(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<User>>;

    async fn count_following(&self, user_id: i64) -> Result<i64>;

    /// Newest recipes of an author; `limit` of `None` returns all of them
    async fn recipes_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<RecipeShort>>;

    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64>;
}

pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl FollowRepositoryTrait for FollowRepository {
    async fn create(&self, user_id: i64, following_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (user_id, following_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, following_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(following_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: i64, following_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND following_id = $2")
            .bind(user_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, last_name, avatar, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn find_following(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.avatar, u.is_admin, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.user_id = $1
            ORDER BY u.username
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_following(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn recipes_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<RecipeShort>> {
        // LIMIT NULL means no limit in Postgres
        let recipes = sqlx::query_as::<_, RecipeShort>(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }

    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
