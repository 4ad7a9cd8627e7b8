//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the shopper's session as a serialized line-item
//! list; every handler hydrates a [`CartStore`] from it, mutates, and
//! flushes the result back before responding.

use std::num::NonZeroU32;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use nonna_rues_core::{CartItemId, CartStore, LineItem, price};

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::cart::{flush_cart, open_cart};
use crate::services::settings::SiteChrome;
use crate::state::AppState;

/// HTMX trigger fired whenever the cart contents change, so the header
/// badge refreshes itself.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image_src: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image_src: item.image_src.clone(),
            quantity: item.quantity,
            price: price::format_display(item.unit_price()),
            line_price: price::format_display(item.line_total()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            item_count: totals.item_count,
            subtotal: price::format_display(totals.subtotal),
            shipping: price::format_display(totals.shipping),
            total: price::format_display(totals.total),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: Uuid,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// Cart page query string (`?success=true` after a placed order).
#[derive(Debug, Default, Deserialize)]
pub struct CartPageQuery {
    #[serde(default)]
    pub success: bool,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: SiteChrome,
    pub cart: CartView,
    pub order_placed: bool,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CartPageQuery>,
) -> CartShowTemplate {
    let (cart, _) = open_cart(&session).await;
    CartShowTemplate {
        chrome: state.settings().chrome().await,
        cart: CartView::from(&cart),
        order_placed: query.success,
    }
}

/// Add a product to the cart (HTMX).
///
/// Looks the product up so price and image come from the catalog, never
/// from the client. Returns no body, just the badge-refresh trigger.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .db()
        .products
        .get(form.product_id)
        .await
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let quantity = NonZeroU32::new(form.quantity.unwrap_or(1))
        .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".to_owned()))?;

    let (mut cart, storage) = open_cart(&session).await;
    cart.add_item(product.descriptor(), quantity);
    flush_cart(&session, &storage).await;

    Ok((StatusCode::NO_CONTENT, AppendHeaders([CART_UPDATED_TRIGGER])).into_response())
}

/// Set a line's quantity (HTMX). Zero removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let (mut cart, storage) = open_cart(&session).await;
    cart.update_quantity(&CartItemId::from(form.item_id.as_str()), form.quantity);
    flush_cart(&session, &storage).await;

    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let (mut cart, storage) = open_cart(&session).await;
    cart.remove_item(&CartItemId::from(form.item_id.as_str()));
    flush_cart(&session, &storage).await;

    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Render the header badge fragment (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> CartCountTemplate {
    let (cart, _) = open_cart(&session).await;
    CartCountTemplate {
        count: cart.item_count(),
    }
}
