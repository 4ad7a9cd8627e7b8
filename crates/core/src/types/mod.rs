//! Shared model types for the store's document collections.
//!
//! These are the shapes the storefront pages read and the admin API writes:
//! products, orders, and site settings.

pub mod order;
pub mod product;
pub mod setting;

pub use order::{Customer, Order, OrderItem, OrderStatus, ShippingAddress};
pub use product::{Product, ProductImage, ProductUpdate};
pub use setting::{Setting, SettingValue, default_settings};
