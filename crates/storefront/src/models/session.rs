//! Session key constants.
//!
//! All session reads and writes go through these keys so that a rename is
//! a one-line change.

/// Keys under which values are stored in the session record.
pub mod session_keys {
    /// Serialized cart line items (a JSON array string).
    pub const CART: &str = nonna_rues_core::cart::CART_STORAGE_KEY;
}
