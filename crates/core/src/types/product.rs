//! Catalog product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::ProductDescriptor;
use crate::price;

/// Category applied when a product was saved without one.
pub const DEFAULT_CATEGORY: &str = "Seasonal";

/// A product image with alt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub alt: String,
}

/// A catalog product.
///
/// Serialized field names are camelCase to match the shapes the admin UI
/// and any existing consumers already speak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Create a product with a fresh id and timestamps.
    #[must_use]
    pub fn new(
        title: String,
        description: String,
        price: Decimal,
        images: Vec<ProductImage>,
        category: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            price,
            images,
            category: category.unwrap_or_else(default_category),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display price string for pages and cart lines.
    #[must_use]
    pub fn display_price(&self) -> String {
        price::format_display(self.price)
    }

    /// First image, if the product has any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// The shape the cart accepts when this product is added.
    #[must_use]
    pub fn descriptor(&self) -> ProductDescriptor {
        ProductDescriptor {
            id: self.id.into(),
            name: self.title.clone(),
            price: self.display_price(),
            image_src: self
                .primary_image()
                .map(|img| img.url.clone())
                .unwrap_or_default(),
        }
    }
}

/// Partial update applied to an existing product. Absent fields keep their
/// current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub images: Option<Vec<ProductImage>>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    /// Apply the update in place, refreshing `updated_at`.
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Utc::now();
    }
}
