// src/services/shopping_cart.rs - Shopping list aggregation
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::errors::ServiceError;
use crate::models::{CartIngredientRow, ShoppingListItem};
use crate::repositories::ShoppingCartRepositoryTrait;

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait ShoppingCartServiceTrait {
    /// Totals per (ingredient name, unit) over every recipe in the user's cart
    async fn aggregate(&self, user_id: i64) -> Result<Vec<ShoppingListItem>>;
}

pub struct ShoppingCartService<T: ShoppingCartRepositoryTrait> {
    repository: Arc<T>,
}

impl<T: ShoppingCartRepositoryTrait> ShoppingCartService<T> {
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }
}

/// Sums amounts per (name, unit); output is sorted by name, then unit
pub fn fold_ingredients(rows: Vec<CartIngredientRow>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for row in rows {
        *totals.entry((row.name, row.measurement_unit)).or_insert(0) += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

#[async_trait]
impl<T: ShoppingCartRepositoryTrait + Send + Sync> ShoppingCartServiceTrait
    for ShoppingCartService<T>
{
    async fn aggregate(&self, user_id: i64) -> Result<Vec<ShoppingListItem>> {
        let rows = self.repository.cart_ingredients(user_id).await?;
        let items = fold_ingredients(rows);
        debug!("Shopping list for user {} has {} lines", user_id, items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RepositoryError;
    use crate::repositories::shopping_cart::MockShoppingCartRepositoryTrait;

    fn line(name: &str, unit: &str, amount: i32) -> CartIngredientRow {
        CartIngredientRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_fold_sums_same_ingredient() {
        let items = fold_ingredients(vec![
            line("flour", "g", 200),
            line("eggs", "pcs", 2),
            line("flour", "g", 300),
        ]);
        assert_eq!(
            items,
            vec![
                ShoppingListItem {
                    name: "eggs".to_string(),
                    measurement_unit: "pcs".to_string(),
                    total_amount: 2,
                },
                ShoppingListItem {
                    name: "flour".to_string(),
                    measurement_unit: "g".to_string(),
                    total_amount: 500,
                },
            ]
        );
    }

    #[test]
    fn test_fold_keeps_units_apart() {
        let items = fold_ingredients(vec![line("milk", "ml", 250), line("milk", "cup", 1)]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].measurement_unit, "cup");
        assert_eq!(items[1].measurement_unit, "ml");
    }

    #[test]
    fn test_fold_does_not_overflow_i32() {
        let items = fold_ingredients(vec![line("salt", "g", i32::MAX), line("salt", "g", i32::MAX)]);
        assert_eq!(items[0].total_amount, 2 * i64::from(i32::MAX));
    }

    #[tokio::test]
    async fn test_empty_cart_is_empty_list() {
        let mut mock = MockShoppingCartRepositoryTrait::new();
        mock.expect_cart_ingredients().returning(|_| Ok(vec![]));

        let service = ShoppingCartService::new(Arc::new(mock));
        assert!(service.aggregate(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut mock = MockShoppingCartRepositoryTrait::new();
        mock.expect_cart_ingredients()
            .returning(|_| Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)));

        let service = ShoppingCartService::new(Arc::new(mock));
        let err = service.aggregate(1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));
    }
}
