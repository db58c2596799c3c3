// src/services/follow.rs - Subscriptions to other authors
use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::errors::ServiceError;
use crate::models::{PageRequest, Subscription, User};
use crate::repositories::FollowRepositoryTrait;

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait FollowServiceTrait {
    /// Follows `author_id`; self-follows and repeats are rejected before any insert
    async fn subscribe(
        &self,
        user_id: i64,
        author_id: i64,
        recipes_limit: Option<i64>,
    ) -> Result<Subscription>;
    async fn unsubscribe(&self, user_id: i64, author_id: i64) -> Result<()>;
    async fn subscriptions(
        &self,
        user_id: i64,
        page: PageRequest,
        recipes_limit: Option<i64>,
    ) -> Result<(Vec<Subscription>, i64)>;
}

pub struct FollowService<T: FollowRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: FollowRepositoryTrait> FollowService<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }
}

impl<T: FollowRepositoryTrait + Send + Sync> FollowService<T> {
    async fn author(&self, author_id: i64) -> Result<User> {
        self.repository
            .find_user(author_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", author_id)))
    }

    async fn with_recipes(&self, author: User, recipes_limit: Option<i64>) -> Result<Subscription> {
        let recipes = self
            .repository
            .recipes_by_author(author.id, recipes_limit)
            .await?;
        let recipes_count = self.repository.count_recipes_by_author(author.id).await?;
        Ok(Subscription {
            author,
            recipes,
            recipes_count,
        })
    }
}

fn check_recipes_limit(recipes_limit: Option<i64>) -> Result<()> {
    match recipes_limit {
        Some(limit) if limit < 0 => Err(ServiceError::ValidationError(
            "recipes_limit must not be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl<T: FollowRepositoryTrait + Send + Sync> FollowServiceTrait for FollowService<T> {
    async fn subscribe(
        &self,
        user_id: i64,
        author_id: i64,
        recipes_limit: Option<i64>,
    ) -> Result<Subscription> {
        check_recipes_limit(recipes_limit)?;
        let author = self.author(author_id).await?;

        if user_id == author_id {
            return Err(ServiceError::ValidationError(
                "You cannot subscribe to yourself".to_string(),
            ));
        }

        if !self.repository.create(user_id, author_id).await? {
            return Err(ServiceError::ValidationError(
                "You are already subscribed to this user".to_string(),
            ));
        }

        info!("User {} subscribed to {}", user_id, author_id);
        self.with_recipes(author, recipes_limit).await
    }

    async fn unsubscribe(&self, user_id: i64, author_id: i64) -> Result<()> {
        self.author(author_id).await?;

        if !self.repository.delete(user_id, author_id).await? {
            return Err(ServiceError::ValidationError(
                "You are not subscribed to this user".to_string(),
            ));
        }

        info!("User {} unsubscribed from {}", user_id, author_id);
        Ok(())
    }

    async fn subscriptions(
        &self,
        user_id: i64,
        page: PageRequest,
        recipes_limit: Option<i64>,
    ) -> Result<(Vec<Subscription>, i64)> {
        check_recipes_limit(recipes_limit)?;

        let count = self.repository.count_following(user_id).await?;
        let authors = self
            .repository
            .find_following(user_id, page.limit, page.offset())
            .await?;

        let mut subscriptions = Vec::with_capacity(authors.len());
        for author in authors {
            subscriptions.push(self.with_recipes(author, recipes_limit).await?);
        }
        Ok((subscriptions, count))
    }
}
