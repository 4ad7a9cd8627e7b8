//! Settings-driven pages and the product catalog.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use axum::http::StatusCode;
use rust_decimal::Decimal;

use nonna_rues_core::Product;
use nonna_rues_integration_tests::{body_text, get, seed_product, send, storefront};

#[tokio::test]
async fn home_page_shows_the_seeded_hero_copy() {
    let shop = storefront().await;
    seed_product(&shop.db, "Vintage Lamp", "89.99").await;

    let response = send(&shop.app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("Discover Unique Treasures"));
    assert!(page.contains("Nonna &amp; Rue"));
    assert!(page.contains("Vintage Lamp"));

    // Exactly one copyright line, with the year computed not seeded.
    assert_eq!(page.matches("&copy;").count(), 1);
    assert!(!page.contains("\u{a9} 2024"));
}

#[tokio::test]
async fn about_and_contact_pull_from_settings() {
    let shop = storefront().await;

    let response = send(&shop.app, get("/about", None)).await;
    let page = body_text(response).await;
    assert!(page.contains("Our Story"));
    assert!(page.contains("Shreveport"));

    let response = send(&shop.app, get("/contact", None)).await;
    let page = body_text(response).await;
    assert!(page.contains("contact@nonnaandrues.com"));
    assert!(page.contains("(318) 555-1234"));
}

#[tokio::test]
async fn listing_shows_active_products_and_filters_by_category() {
    let shop = storefront().await;
    seed_product(&shop.db, "Vintage Lamp", "89.99").await;
    shop.db
        .products
        .create(Product::new(
            "Porch Swing".into(),
            "Cypress, two-seater.".into(),
            Decimal::from_str("349.00").unwrap(),
            Vec::new(),
            Some("Outdoor".into()),
        ))
        .await
        .unwrap();

    let response = send(&shop.app, get("/products", None)).await;
    let page = body_text(response).await;
    assert!(page.contains("Vintage Lamp"));
    assert!(page.contains("Porch Swing"));

    let response = send(&shop.app, get("/products?category=outdoor", None)).await;
    let page = body_text(response).await;
    assert!(!page.contains("Vintage Lamp"));
    assert!(page.contains("Porch Swing"));

    let response = send(&shop.app, get("/products?category=Garden", None)).await;
    let page = body_text(response).await;
    assert!(page.contains("Nothing on the shelves"));
}

#[tokio::test]
async fn detail_page_renders_price_and_add_form() {
    let shop = storefront().await;
    let lamp = seed_product(&shop.db, "Vintage Lamp", "89.99").await;

    let response = send(&shop.app, get(&format!("/products/{}", lamp.id), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("Vintage Lamp"));
    assert!(page.contains("$89.99"));
    assert!(page.contains("Seasonal")); // defaulted category
    assert!(page.contains("hx-post=\"/cart/add\""));
}
