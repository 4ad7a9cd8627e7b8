//! Nonna & Rue's Core - Domain library.
//!
//! This crate provides the domain logic shared by the storefront and admin
//! binaries:
//!
//! - [`price`] - Display price string parsing and formatting
//! - [`cart`] - The shopper's cart store: line items, totals, persistence
//! - [`checkout`] - The two-step checkout wizard state machine
//! - [`types`] - Shared model types (products, orders, site settings)
//!
//! # Architecture
//!
//! The crate contains no HTTP handling and no direct filesystem access. The
//! cart's durable persistence goes through the [`cart::CartStorage`] trait so
//! the storefront can back it with whatever client-scoped storage it has
//! (a browser session record in practice, an in-memory stub in tests).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod price;
pub mod types;

pub use cart::{CartItemId, CartState, CartStore, CartTotals, LineItem, ProductDescriptor};
pub use checkout::{
    CheckoutError, CheckoutSession, CheckoutStatus, CheckoutStep, CustomerInfo, PaymentInfo,
};
pub use types::*;
