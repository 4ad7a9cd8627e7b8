//! Cart flows through the storefront's session-backed storage.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use nonna_rues_integration_tests::{
    body_text, cookie_from, get, post_form, seed_product, send, storefront,
};

#[tokio::test]
async fn health_endpoints_respond() {
    let shop = storefront().await;

    let response = send(&shop.app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = send(&shop.app, get("/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_cart_page_renders() {
    let shop = storefront().await;

    let response = send(&shop.app, get("/cart", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Your cart is empty"));
}

#[tokio::test]
async fn adding_a_product_persists_in_the_session() {
    let shop = storefront().await;
    let lamp = seed_product(&shop.db, "Vintage Lamp", "89.99").await;

    let response = send(
        &shop.app,
        post_form("/cart/add", &format!("product_id={}", lamp.id), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers().get("HX-Trigger").unwrap(),
        "cart-updated"
    );
    let cookie = cookie_from(&response).expect("session cookie must be set");

    // The cart page sees the line on a follow-up request.
    let response = send(&shop.app, get("/cart", Some(&cookie))).await;
    let page = body_text(response).await;
    assert!(page.contains("Vintage Lamp"));
    assert!(page.contains("$89.99"));
    assert!(page.contains("$5.99")); // flat shipping
    assert!(page.contains("$95.98")); // grand total

    // The badge fragment reports the count.
    let response = send(&shop.app, get("/cart/count", Some(&cookie))).await;
    assert!(body_text(response).await.contains("1"));
}

#[tokio::test]
async fn adding_twice_merges_the_line() {
    let shop = storefront().await;
    let lamp = seed_product(&shop.db, "Vintage Lamp", "89.99").await;
    let form = format!("product_id={}&quantity=2", lamp.id);

    let response = send(&shop.app, post_form("/cart/add", &form, None)).await;
    let cookie = cookie_from(&response).unwrap();
    send(&shop.app, post_form("/cart/add", &form, Some(&cookie))).await;

    let response = send(&shop.app, get("/cart/count", Some(&cookie))).await;
    assert!(body_text(response).await.contains("4"));
}

#[tokio::test]
async fn updating_quantity_to_zero_removes_the_line() {
    let shop = storefront().await;
    let lamp = seed_product(&shop.db, "Vintage Lamp", "89.99").await;

    let response = send(
        &shop.app,
        post_form("/cart/add", &format!("product_id={}", lamp.id), None),
    )
    .await;
    let cookie = cookie_from(&response).unwrap();

    let response = send(
        &shop.app,
        post_form(
            "/cart/update",
            &format!("item_id={}&quantity=0", lamp.id),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Your cart is empty"));
}

#[tokio::test]
async fn removing_a_line_returns_the_items_fragment() {
    let shop = storefront().await;
    let lamp = seed_product(&shop.db, "Vintage Lamp", "89.99").await;
    let quilt = seed_product(&shop.db, "Handmade Quilt", "189.00").await;

    let response = send(
        &shop.app,
        post_form("/cart/add", &format!("product_id={}", lamp.id), None),
    )
    .await;
    let cookie = cookie_from(&response).unwrap();
    send(
        &shop.app,
        post_form(
            "/cart/add",
            &format!("product_id={}", quilt.id),
            Some(&cookie),
        ),
    )
    .await;

    let response = send(
        &shop.app,
        post_form(
            "/cart/remove",
            &format!("item_id={}", lamp.id),
            Some(&cookie),
        ),
    )
    .await;
    let fragment = body_text(response).await;
    assert!(!fragment.contains("Vintage Lamp"));
    assert!(fragment.contains("Handmade Quilt"));
}

#[tokio::test]
async fn adding_an_unknown_product_is_rejected() {
    let shop = storefront().await;

    let response = send(
        &shop.app,
        post_form(
            "/cart/add",
            "product_id=3fa85f64-5717-4562-b3fc-2c963f66afa6",
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inactive_products_cannot_be_added_or_viewed() {
    let shop = storefront().await;
    let lamp = seed_product(&shop.db, "Vintage Lamp", "89.99").await;
    shop.db
        .products
        .update(
            lamp.id,
            nonna_rues_core::ProductUpdate {
                is_active: Some(false),
                ..nonna_rues_core::ProductUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let response = send(&shop.app, get(&format!("/products/{}", lamp.id), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &shop.app,
        post_form("/cart/add", &format!("product_id={}", lamp.id), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
