// src/services/tag.rs
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::Tag;
use crate::repositories::TagRepositoryTrait;

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait TagServiceTrait {
    async fn list(&self) -> Result<Vec<Tag>>;
    async fn get(&self, id: i64) -> Result<Tag>;
}

pub struct TagService<T: TagRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: TagRepositoryTrait> TagService<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<T: TagRepositoryTrait + Send + Sync> TagServiceTrait for TagService<T> {
    async fn list(&self) -> Result<Vec<Tag>> {
        Ok(self.repository.find_all().await?)
    }

    async fn get(&self, id: i64) -> Result<Tag> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Tag {} not found", id)))
    }
}
