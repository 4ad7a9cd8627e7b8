//! Storefront services.

pub mod payment;
pub mod settings;
pub mod submission;
