//! Storefront models and session plumbing.

pub mod cart;
pub mod session;

pub use session::session_keys;
