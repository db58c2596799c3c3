// src/services/recipe_mark.rs - Favorites and shopping cart toggles
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::errors::ServiceError;
use crate::models::RecipeShort;
use crate::repositories::{MarkKind, RecipeMarkRepositoryTrait};

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait RecipeMarkServiceTrait {
    /// Adds a recipe to one of the user's lists; adding it twice is a validation error
    async fn add(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<RecipeShort>;
    async fn remove(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<()>;
}

pub struct RecipeMarkService<T: RecipeMarkRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: RecipeMarkRepositoryTrait> RecipeMarkService<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }
}

impl<T: RecipeMarkRepositoryTrait + Send + Sync> RecipeMarkService<T> {
    async fn recipe(&self, recipe_id: i64) -> Result<RecipeShort> {
        self.repository
            .find_recipe(recipe_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", recipe_id)))
    }
}

#[async_trait]
impl<T: RecipeMarkRepositoryTrait + Send + Sync> RecipeMarkServiceTrait for RecipeMarkService<T> {
    async fn add(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<RecipeShort> {
        let recipe = self.recipe(recipe_id).await?;

        if !self.repository.add(kind, user_id, recipe_id).await? {
            return Err(ServiceError::ValidationError(format!(
                "Recipe is already in {}",
                kind.label()
            )));
        }

        debug!("User {} added recipe {} to {}", user_id, recipe_id, kind.label());
        Ok(recipe)
    }

    async fn remove(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<()> {
        self.recipe(recipe_id).await?;

        if !self.repository.remove(kind, user_id, recipe_id).await? {
            return Err(ServiceError::ValidationError(format!(
                "Recipe is not in {}",
                kind.label()
            )));
        }

        debug!("User {} removed recipe {} from {}", user_id, recipe_id, kind.label());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::repositories::recipe_mark::MockRecipeMarkRepositoryTrait;

    fn pancakes(id: i64) -> RecipeShort {
        RecipeShort {
            id,
            name: "Pancakes".to_string(),
            image: "recipes/images/pancakes.png".to_string(),
            cooking_time: 15,
        }
    }

    #[tokio::test]
    async fn test_second_favorite_is_rejected() {
        let mut seq = Sequence::new();
        let mut mock = MockRecipeMarkRepositoryTrait::new();
        mock.expect_find_recipe().returning(|id| Ok(Some(pancakes(id))));
        mock.expect_add()
            .withf(|kind, user, recipe| *kind == MarkKind::Favorite && *user == 1 && *recipe == 4)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(true));
        mock.expect_add()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(false));

        let service = RecipeMarkService::new(Arc::new(mock));
        let recipe = service.add(MarkKind::Favorite, 1, 4).await.unwrap();
        assert_eq!(recipe.name, "Pancakes");

        let err = service.add(MarkKind::Favorite, 1, 4).await.unwrap_err();
        match err {
            ServiceError::ValidationError(msg) => assert_eq!(msg, "Recipe is already in favorites"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cart_unknown_recipe() {
        let mut mock = MockRecipeMarkRepositoryTrait::new();
        mock.expect_find_recipe().returning(|_| Ok(None));
        mock.expect_add().never();

        let service = RecipeMarkService::new(Arc::new(mock));
        let err = service.add(MarkKind::ShoppingCart, 1, 4).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_absent_entry() {
        let mut mock = MockRecipeMarkRepositoryTrait::new();
        mock.expect_find_recipe().returning(|id| Ok(Some(pancakes(id))));
        mock.expect_remove().returning(|_, _, _| Ok(false));

        let service = RecipeMarkService::new(Arc::new(mock));
        let err = service.remove(MarkKind::ShoppingCart, 1, 4).await.unwrap_err();
        match err {
            ServiceError::ValidationError(msg) => assert!(msg.contains("shopping cart")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
