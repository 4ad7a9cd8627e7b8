//! Product catalog repository.

use std::sync::Arc;

use nonna_rues_core::types::product::DEFAULT_CATEGORY;
use nonna_rues_core::{Product, ProductUpdate};
use uuid::Uuid;

use crate::{DbError, JsonCollection};

/// CRUD over the product collection.
#[derive(Clone, Debug)]
pub struct ProductRepository {
    collection: Arc<JsonCollection<Product>>,
}

impl ProductRepository {
    pub(crate) fn new(collection: Arc<JsonCollection<Product>>) -> Self {
        Self { collection }
    }

    /// Active products for the public catalog, with a category always set.
    pub async fn list_active(&self) -> Vec<Product> {
        self.collection
            .read(|docs| {
                docs.iter()
                    .filter(|p| p.is_active)
                    .cloned()
                    .map(with_category)
                    .collect()
            })
            .await
    }

    /// Every product, including inactive ones (back office view).
    pub async fn list_all(&self) -> Vec<Product> {
        self.collection
            .read(|docs| docs.iter().cloned().map(with_category).collect())
            .await
    }

    /// Look up one product by id.
    pub async fn get(&self, id: Uuid) -> Option<Product> {
        self.collection
            .read(|docs| docs.iter().find(|p| p.id == id).cloned().map(with_category))
            .await
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the collection cannot be persisted.
    pub async fn create(&self, product: Product) -> Result<Product, DbError> {
        self.collection
            .mutate(|docs| {
                docs.push(product.clone());
                product
            })
            .await
    }

    /// Apply a partial update. Returns `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the collection cannot be persisted.
    pub async fn update(
        &self,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<Option<Product>, DbError> {
        self.collection
            .mutate(|docs| {
                let product = docs.iter_mut().find(|p| p.id == id)?;
                update.apply(product);
                Some(product.clone())
            })
            .await
    }

    /// Delete a product. Returns `false` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the collection cannot be persisted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        self.collection
            .mutate(|docs| {
                let before = docs.len();
                docs.retain(|p| p.id != id);
                docs.len() != before
            })
            .await
    }
}

/// Products saved before categories existed get the default.
fn with_category(mut product: Product) -> Product {
    if product.category.trim().is_empty() {
        product.category = DEFAULT_CATEGORY.to_owned();
    }
    product
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use nonna_rues_core::ProductImage;
    use rust_decimal::Decimal;

    use crate::Database;
    use crate::test_support::temp_data_dir;

    use super::*;

    fn lamp() -> Product {
        Product::new(
            "Vintage Lamp".into(),
            "A charming brass lamp.".into(),
            Decimal::from_str("89.99").unwrap(),
            vec![ProductImage {
                url: "/images/lamp.jpg".into(),
                alt: "Brass lamp".into(),
            }],
            Some("Lighting".into()),
        )
    }

    #[tokio::test]
    async fn create_then_reopen_round_trips() {
        let dir = temp_data_dir();
        let db = Database::open(&dir).await.unwrap();
        let created = db.products.create(lamp()).await.unwrap();

        let reopened = Database::open(&dir).await.unwrap();
        let found = reopened.products.get(created.id).await.unwrap();
        assert_eq!(found.title, "Vintage Lamp");
        assert_eq!(found.price, Decimal::from_str("89.99").unwrap());
    }

    #[tokio::test]
    async fn list_active_hides_inactive_products() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        let active = db.products.create(lamp()).await.unwrap();
        let mut hidden = lamp();
        hidden.is_active = false;
        db.products.create(hidden).await.unwrap();

        let listed = db.products.list_active().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
        assert_eq!(db.products.list_all().await.len(), 2);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        let result = db
            .products
            .update(Uuid::new_v4(), ProductUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_went() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        let created = db.products.create(lamp()).await.unwrap();

        assert!(db.products.delete(created.id).await.unwrap());
        assert!(!db.products.delete(created.id).await.unwrap());
        assert!(db.products.list_all().await.is_empty());
    }
}
