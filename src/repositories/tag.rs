// src/repositories/tag.rs - Read-only tag catalogue
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::Tag;

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepositoryTrait {
    async fn find_all(&self) -> Result<Vec<Tag>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>>;
}

pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl TagRepositoryTrait for TagRepository {
    async fn find_all(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)
    }
}
