// src/services/ingredient.rs
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{Ingredient, IngredientQueryParams};
use crate::repositories::IngredientRepositoryTrait;

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait IngredientServiceTrait {
    async fn search(&self, params: IngredientQueryParams) -> Result<Vec<Ingredient>>;
    async fn get(&self, id: i64) -> Result<Ingredient>;
}

pub struct IngredientService<T: IngredientRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: IngredientRepositoryTrait> IngredientService<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<T: IngredientRepositoryTrait + Send + Sync> IngredientServiceTrait for IngredientService<T> {
    async fn search(&self, params: IngredientQueryParams) -> Result<Vec<Ingredient>> {
        let name = params
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Ok(self.repository.search(name).await?)
    }

    async fn get(&self, id: i64) -> Result<Ingredient> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Ingredient {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::ingredient::MockIngredientRepositoryTrait;

    #[tokio::test]
    async fn test_blank_search_lists_everything() {
        let mut mock = MockIngredientRepositoryTrait::new();
        mock.expect_search()
            .withf(|name| name.is_none())
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = IngredientService::new(Arc::new(mock));
        let params = IngredientQueryParams {
            name: Some("   ".to_string()),
        };
        assert!(service.search(params).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_trims_term() {
        let mut mock = MockIngredientRepositoryTrait::new();
        mock.expect_search()
            .withf(|name| name.as_deref() == Some("flo"))
            .returning(|_| {
                Ok(vec![Ingredient {
                    id: 1,
                    name: "flour".to_string(),
                    measurement_unit: "g".to_string(),
                }])
            });

        let service = IngredientService::new(Arc::new(mock));
        let params = IngredientQueryParams {
            name: Some(" flo ".to_string()),
        };
        assert_eq!(service.search(params).await.unwrap()[0].name, "flour");
    }
}
