// src/services/short_link.rs - Lazy short link creation and resolution
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::errors::ServiceError;
use crate::models::ShortLink;
use crate::repositories::ShortLinkRepositoryTrait;
use crate::utils::id_generator::{is_well_formed, ShortCodeGenerator};

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait ShortLinkServiceTrait {
    /// Returns the recipe's link, creating it on first use
    async fn get_or_create(&self, recipe_id: i64) -> Result<ShortLink>;
    /// Maps a code back to its recipe id
    async fn resolve(&self, code: &str) -> Result<i64>;
}

pub struct ShortLinkService<T: ShortLinkRepositoryTrait> {
    repository: Arc<T>,
    generator: ShortCodeGenerator,
}

impl<T: ShortLinkRepositoryTrait> ShortLinkService<T> {
    pub fn new(repository: Arc<T>, generator: ShortCodeGenerator) -> Self {
        Self {
            repository,
            generator,
        }
    }
}

#[async_trait]
impl<T: ShortLinkRepositoryTrait + Send + Sync> ShortLinkServiceTrait for ShortLinkService<T> {
    async fn get_or_create(&self, recipe_id: i64) -> Result<ShortLink> {
        if let Some(link) = self.repository.find_by_recipe(recipe_id).await? {
            return Ok(link);
        }

        if !self.repository.recipe_exists(recipe_id).await? {
            return Err(ServiceError::NotFound(format!("Recipe {} not found", recipe_id)));
        }

        // A concurrent request may win the race; the insert then hands back its row
        let link = self
            .repository
            .create_for_recipe(recipe_id, &self.generator)
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::ValidationError(_) => {
                    ServiceError::NotFound(format!("Recipe {} not found", recipe_id))
                }
                other => other,
            })?;

        info!("Created short link '{}' for recipe {}", link.code, recipe_id);
        Ok(link)
    }

    async fn resolve(&self, code: &str) -> Result<i64> {
        let not_found = || ServiceError::NotFound(format!("Short link '{}' not found", code));

        if !is_well_formed(code) {
            debug!("Rejecting malformed short code '{}'", code);
            return Err(not_found());
        }

        self.repository
            .find_by_code(code)
            .await?
            .map(|link| link.recipe_id)
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::Sequence;

    use super::*;
    use crate::errors::RepositoryError;
    use crate::repositories::short_link::MockShortLinkRepositoryTrait;

    fn link(recipe_id: i64, code: &str) -> ShortLink {
        ShortLink {
            id: recipe_id,
            recipe_id,
            code: code.to_string(),
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn test_existing_link_is_returned_unchanged() {
        let mut mock = MockShortLinkRepositoryTrait::new();
        mock.expect_find_by_recipe()
            .times(2)
            .returning(|id| Ok(Some(link(id, "aB3x"))));
        mock.expect_create_for_recipe().never();

        let service = ShortLinkService::new(Arc::new(mock), ShortCodeGenerator::new(4));
        let first = service.get_or_create(1).await.unwrap();
        let second = service.get_or_create(1).await.unwrap();
        assert_eq!(first.code, "aB3x");
        assert_eq!(first.code, second.code);
    }

    #[actix_web::test]
    async fn test_link_created_lazily_once() {
        let mut seq = Sequence::new();
        let mut mock = MockShortLinkRepositoryTrait::new();
        mock.expect_find_by_recipe()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        mock.expect_recipe_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock.expect_create_for_recipe()
            .withf(|id, generator| *id == 3 && generator.length() == 4)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, _| Ok(link(id, "Zz09")));
        mock.expect_find_by_recipe()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(link(id, "Zz09"))));

        let service = ShortLinkService::new(Arc::new(mock), ShortCodeGenerator::new(4));
        let created = service.get_or_create(3).await.unwrap();
        let again = service.get_or_create(3).await.unwrap();
        assert_eq!(created.code, "Zz09");
        assert_eq!(again.code, created.code);
    }

    #[actix_web::test]
    async fn test_link_for_missing_recipe() {
        let mut mock = MockShortLinkRepositoryTrait::new();
        mock.expect_find_by_recipe().returning(|_| Ok(None));
        mock.expect_recipe_exists().returning(|_| Ok(false));
        mock.expect_create_for_recipe().never();

        let service = ShortLinkService::new(Arc::new(mock), ShortCodeGenerator::new(4));
        let err = service.get_or_create(404).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_recipe_deleted_during_creation() {
        let mut mock = MockShortLinkRepositoryTrait::new();
        mock.expect_find_by_recipe().returning(|_| Ok(None));
        mock.expect_recipe_exists().returning(|_| Ok(true));
        mock.expect_create_for_recipe().returning(|_, _| {
            Err(RepositoryError::InvalidData(
                "Referenced resource does not exist".to_string(),
            ))
        });

        let service = ShortLinkService::new(Arc::new(mock), ShortCodeGenerator::new(4));
        let err = service.get_or_create(8).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_resolve_round_trip() {
        let mut mock = MockShortLinkRepositoryTrait::new();
        mock.expect_find_by_code()
            .withf(|code| code == "aB3x")
            .returning(|code| Ok(Some(link(12, code))));

        let service = ShortLinkService::new(Arc::new(mock), ShortCodeGenerator::new(4));
        assert_eq!(service.resolve("aB3x").await.unwrap(), 12);
    }

    #[actix_web::test]
    async fn test_resolve_unknown_and_malformed_codes() {
        let mut mock = MockShortLinkRepositoryTrait::new();
        mock.expect_find_by_code().times(1).returning(|_| Ok(None));

        let service = ShortLinkService::new(Arc::new(mock), ShortCodeGenerator::new(4));
        assert!(matches!(
            service.resolve("zzzz").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            service.resolve("../etc").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
