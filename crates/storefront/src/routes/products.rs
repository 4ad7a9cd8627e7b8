//! Product listing and detail pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use nonna_rues_core::Product;

use crate::error::{AppError, Result};
use crate::filters;
use crate::services::settings::SiteChrome;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
    pub image_alt: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let image = product.primary_image();
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.display_price(),
            category: product.category.clone(),
            image_url: image.map(|img| img.url.clone()).unwrap_or_default(),
            image_alt: image.map_or_else(|| product.title.clone(), |img| img.alt.clone()),
        }
    }
}

/// Listing query string (`?category=Lighting`).
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductIndexTemplate {
    pub chrome: SiteChrome,
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: SiteChrome,
    pub product: ProductView,
}

/// Display the active product catalog, optionally narrowed to a category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> ProductIndexTemplate {
    let mut products = state.db().products.list_active().await;
    if let Some(category) = query.category.as_deref() {
        products.retain(|p| p.category.eq_ignore_ascii_case(category));
    }
    ProductIndexTemplate {
        chrome: state.settings().chrome().await,
        products: products.iter().map(ProductView::from).collect(),
    }
}

/// Display one product. Inactive products are hidden from shoppers.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ProductShowTemplate> {
    let product = state
        .db()
        .products
        .get(id)
        .await
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        chrome: state.settings().chrome().await,
        product: ProductView::from(&product),
    })
}
