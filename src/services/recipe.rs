// src/services/recipe.rs - Recipe lifecycle and full representations
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::{
    CreateRecipeDto, NewRecipe, PageRequest, RecipeChanges, RecipeDetails, RecipeFilter,
    RecipeRow, UpdateRecipeDto, User,
};
use crate::repositories::RecipeRepositoryTrait;
use crate::utils::id_generator::ShortCodeGenerator;
use crate::utils::images::ImageStore;

type Result<T> = std::result::Result<T, ServiceError>;

const IMAGE_DIR: &str = "recipes/images";

#[async_trait]
pub trait RecipeServiceTrait {
    /// Stores the image, then the recipe with its associations and short link
    async fn create(&self, author: &User, dto: CreateRecipeDto) -> Result<RecipeDetails>;
    async fn update(&self, user: &User, id: i64, dto: UpdateRecipeDto) -> Result<RecipeDetails>;
    async fn delete(&self, user: &User, id: i64) -> Result<()>;
    async fn get(&self, id: i64, viewer: Option<i64>) -> Result<RecipeDetails>;
    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i64>,
        page: PageRequest,
    ) -> Result<(Vec<RecipeDetails>, i64)>;
}

pub struct RecipeService<T: RecipeRepositoryTrait> {
    repository: Arc<T>,
    images: ImageStore,
    generator: ShortCodeGenerator,
}

impl<T: RecipeRepositoryTrait> RecipeService<T> {
    pub fn new(repository: Arc<T>, images: ImageStore, generator: ShortCodeGenerator) -> Self {
        Self {
            repository,
            images,
            generator,
        }
    }
}

/// Only the author or an admin may change a recipe
fn ensure_can_edit(user: &User, recipe: &RecipeRow) -> Result<()> {
    if recipe.author_id == user.id || user.is_admin {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        ))
    }
}

impl<T: RecipeRepositoryTrait + Send + Sync> RecipeService<T> {
    async fn find_row(&self, id: i64, viewer: Option<i64>) -> Result<RecipeRow> {
        self.repository
            .find_by_id(id, viewer)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", id)))
    }

    /// Attaches tags, ingredients and authors to the rows, keeping their order
    async fn assemble(&self, rows: Vec<RecipeRow>, viewer: Option<i64>) -> Result<Vec<RecipeDetails>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let author_ids: Vec<i64> = rows
            .iter()
            .map(|row| row.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let mut tags = HashMap::<i64, Vec<_>>::new();
        for row in self.repository.tags_for(&ids).await? {
            tags.entry(row.recipe_id).or_default().push(row.tag);
        }

        let mut ingredients = HashMap::<i64, Vec<_>>::new();
        for row in self.repository.ingredients_for(&ids).await? {
            ingredients.entry(row.recipe_id).or_default().push(row);
        }

        let authors: HashMap<i64, _> = self
            .repository
            .authors(&author_ids, viewer)
            .await?
            .into_iter()
            .map(|author| (author.user.id, author))
            .collect();

        rows.into_iter()
            .map(|recipe| {
                let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                    ServiceError::InternalError(format!("Author of recipe {} is missing", recipe.id))
                })?;
                Ok(RecipeDetails {
                    tags: tags.remove(&recipe.id).unwrap_or_default(),
                    ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                    author,
                    recipe,
                })
            })
            .collect()
    }
}

#[async_trait]
impl<T: RecipeRepositoryTrait + Send + Sync> RecipeServiceTrait for RecipeService<T> {
    async fn create(&self, author: &User, dto: CreateRecipeDto) -> Result<RecipeDetails> {
        dto.validate()?;

        let image = self.images.save_data_uri(IMAGE_DIR, &dto.image).await?;
        let recipe = NewRecipe {
            name: dto.name,
            text: dto.text,
            cooking_time: dto.cooking_time,
            image: image.clone(),
            tags: dto.tags,
            ingredients: dto.ingredients,
        };

        let id = match self
            .repository
            .create(author.id, &recipe, &self.generator)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.images.delete(&image).await;
                return Err(e.into());
            }
        };

        info!("User {} created recipe {} '{}'", author.id, id, recipe.name);
        self.get(id, Some(author.id)).await
    }

    async fn update(&self, user: &User, id: i64, dto: UpdateRecipeDto) -> Result<RecipeDetails> {
        dto.validate()?;

        let existing = self.find_row(id, Some(user.id)).await?;
        ensure_can_edit(user, &existing)?;

        let image = match &dto.image {
            Some(data) => Some(self.images.save_data_uri(IMAGE_DIR, data).await?),
            None => None,
        };

        let changes = RecipeChanges {
            name: dto.name,
            text: dto.text,
            cooking_time: dto.cooking_time,
            image: image.clone(),
            tags: dto.tags,
            ingredients: dto.ingredients,
        };

        if let Err(e) = self.repository.update(id, &changes).await {
            if let Some(image) = &image {
                self.images.delete(image).await;
            }
            return Err(e.into());
        }

        if image.is_some() {
            self.images.delete(&existing.image).await;
        }

        info!("User {} updated recipe {}", user.id, id);
        self.get(id, Some(user.id)).await
    }

    async fn delete(&self, user: &User, id: i64) -> Result<()> {
        let existing = self.find_row(id, Some(user.id)).await?;
        ensure_can_edit(user, &existing)?;

        if !self.repository.delete(id).await? {
            warn!("Recipe {} disappeared before it could be deleted", id);
            return Err(ServiceError::NotFound(format!("Recipe {} not found", id)));
        }
        self.images.delete(&existing.image).await;

        info!("User {} deleted recipe {}", user.id, id);
        Ok(())
    }

    async fn get(&self, id: i64, viewer: Option<i64>) -> Result<RecipeDetails> {
        let row = self.find_row(id, viewer).await?;
        self.assemble(vec![row], viewer)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", id)))
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i64>,
        page: PageRequest,
    ) -> Result<(Vec<RecipeDetails>, i64)> {
        let count = self.repository.count(filter, viewer).await?;
        let rows = self
            .repository
            .find(filter, viewer, page.limit, page.offset())
            .await?;
        Ok((self.assemble(rows, viewer).await?, count))
    }
}
