//! The shopper's cart: line items, derived totals, durable persistence.
//!
//! The cart is the single source of truth for an in-progress order. It is an
//! explicit store object - callers hold a [`CartStore`] handle, mutate it
//! through its methods, and read derived totals from it. Every mutation
//! synchronously writes the full line-item list to the backing
//! [`CartStorage`] and notifies item-count observers (the badge in the page
//! header).
//!
//! # Persistence
//!
//! The persisted representation is a JSON array of line items under the
//! fixed key [`CART_STORAGE_KEY`], scoped to one client/browser profile.
//! Hydration is forgiving: a missing, corrupt, or unparseable payload is an
//! empty cart, never an error. Storage write failures are logged and
//! swallowed - losing a write is preferable to breaking the shopper's page.
//!
//! # Concurrency
//!
//! The store is single-writer by design. Callers that could race (two
//! browser tabs) serialize through the storage value itself: last write
//! wins, and each request re-hydrates rather than trusting a long-lived
//! in-memory copy.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::price;

/// Fixed storage key for the persisted cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Flat shipping fee applied to any non-empty cart.
#[must_use]
pub fn flat_shipping_fee() -> Decimal {
    Decimal::new(599, 2)
}

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque product identifier keying a cart line item.
///
/// Stable across sessions and unique within the cart. Persisted carts from
/// the previous site may carry numeric ids, so deserialization accepts both
/// JSON strings and numbers; serialization always emits a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CartItemId(String);

impl CartItemId {
    /// View the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CartItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CartItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<uuid::Uuid> for CartItemId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CartItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = CartItemId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or number product id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CartItemId, E> {
                Ok(CartItemId(v.to_owned()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CartItemId, E> {
                Ok(CartItemId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CartItemId, E> {
                Ok(CartItemId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

// =============================================================================
// Line items and state
// =============================================================================

/// Product descriptor accepted by [`CartState::add_item`].
///
/// This is the shape product and listing pages hand over when the shopper
/// clicks "add to cart". The price is the display string; the cart keeps it
/// verbatim and normalizes only for arithmetic.
#[derive(Debug, Clone)]
pub struct ProductDescriptor {
    pub id: CartItemId,
    pub name: String,
    pub price: String,
    pub image_src: String,
}

/// One product entry in the cart, keyed by product id.
///
/// The serialized field names match the persisted representation carried
/// over from the previous site (`imageSrc`, not `image_src`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: CartItemId,
    pub name: String,
    pub price: String,
    #[serde(rename = "imageSrc")]
    pub image_src: String,
    /// Always >= 1. A line that would drop below 1 is removed instead.
    pub quantity: u32,
}

impl LineItem {
    /// Numeric price for this line (display string normalized).
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        price::parse_display(&self.price)
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// Derived cart totals. Recomputed on read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of all line quantities.
    pub item_count: u32,
    pub subtotal: Decimal,
    /// Flat fee when the subtotal is positive, zero otherwise.
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    fn empty() -> Self {
        Self {
            item_count: 0,
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// The ordered collection of line items.
///
/// Insertion order is display order: new ids append, existing ids merge in
/// place. This is the pure state; [`CartStore`] adds persistence and
/// observer notification on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from a persisted JSON payload.
    ///
    /// A missing or unparseable payload yields an empty cart; corruption is
    /// logged, never surfaced.
    #[must_use]
    pub fn from_json(payload: Option<&str>) -> Self {
        let Some(payload) = payload else {
            return Self::new();
        };
        match serde_json::from_str(payload) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(%err, "discarding unparseable cart payload");
                Self::new()
            }
        }
    }

    /// Serialize the full line-item list for persistence.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|err| {
            tracing::warn!(%err, "cart serialization failed");
            "[]".to_owned()
        })
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add a product to the cart.
    ///
    /// An existing line with the same id has its quantity incremented (no
    /// cap); otherwise a new line appends, preserving insertion order.
    pub fn add_item(&mut self, product: ProductDescriptor, quantity: NonZeroU32) {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity.get());
            return;
        }
        self.items.push(LineItem {
            id: product.id,
            name: product.name,
            price: product.price,
            image_src: product.image_src,
            quantity: quantity.get(),
        });
    }

    /// Remove the line with the given id. No-op when absent.
    pub fn remove_item(&mut self, id: &CartItemId) {
        self.items.retain(|item| &item.id != id);
    }

    /// Set a line's quantity to an absolute value.
    ///
    /// A quantity of zero or below removes the line entirely, exactly like
    /// [`CartState::remove_item`]. No-op when the id is absent.
    pub fn update_quantity(&mut self, id: &CartItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
            item.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Compute derived totals. Pure and side-effect free.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        if self.items.is_empty() {
            return CartTotals::empty();
        }
        let subtotal: Decimal = self.items.iter().map(LineItem::line_total).sum();
        let shipping = if subtotal > Decimal::ZERO {
            flat_shipping_fee()
        } else {
            Decimal::ZERO
        };
        CartTotals {
            item_count: self.item_count(),
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Failure in the durable storage backend.
#[derive(Debug, Error)]
#[error("cart storage error: {0}")]
pub struct StorageError(pub String);

/// Durable, client-scoped storage for the serialized cart.
///
/// One value under one key. Implementations: the storefront's session
/// record, [`MemoryStorage`] in tests.
pub trait CartStorage: Send + Sync {
    /// Read the persisted payload, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read. The store
    /// treats this the same as a missing payload.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the persisted payload.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write fails. The store logs and
    /// continues.
    fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// In-memory [`CartStorage`] for tests and ephemeral carts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with a payload, as if a previous session wrote it.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(payload.into())),
        }
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StorageError("poisoned storage lock".to_owned()))?;
        Ok(slot.clone())
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError("poisoned storage lock".to_owned()))?;
        *slot = Some(payload.to_owned());
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

type CountObserver = Box<dyn Fn(u32) + Send + Sync>;

/// The durable cart store: [`CartState`] plus persistence and observers.
///
/// Hydrates from storage on open; every mutating operation persists the
/// full item list and notifies subscribers with the new item count.
pub struct CartStore {
    state: CartState,
    storage: Arc<dyn CartStorage>,
    observers: Vec<CountObserver>,
}

impl CartStore {
    /// Open a cart backed by the given storage, hydrating any persisted
    /// state. Storage failures and corrupt payloads hydrate as empty.
    #[must_use]
    pub fn open(storage: Arc<dyn CartStorage>) -> Self {
        let state = match storage.load() {
            Ok(payload) => CartState::from_json(payload.as_deref()),
            Err(err) => {
                tracing::warn!(%err, "cart storage unreadable, starting empty");
                CartState::new()
            }
        };
        Self {
            state,
            storage,
            observers: Vec::new(),
        }
    }

    /// Subscribe to item-count changes. The callback fires after every
    /// mutation with the new total quantity.
    pub fn subscribe(&mut self, observer: impl Fn(u32) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn state(&self) -> &CartState {
        &self.state
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.state.items()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.state.item_count()
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.state.totals()
    }

    /// See [`CartState::add_item`].
    pub fn add_item(&mut self, product: ProductDescriptor, quantity: NonZeroU32) {
        self.state.add_item(product, quantity);
        self.after_mutation();
    }

    /// See [`CartState::remove_item`].
    pub fn remove_item(&mut self, id: &CartItemId) {
        self.state.remove_item(id);
        self.after_mutation();
    }

    /// See [`CartState::update_quantity`].
    pub fn update_quantity(&mut self, id: &CartItemId, quantity: i64) {
        self.state.update_quantity(id, quantity);
        self.after_mutation();
    }

    /// Empty the cart and persist the empty list.
    pub fn clear(&mut self) {
        self.state.clear();
        self.after_mutation();
    }

    /// Persist the full item list and notify observers.
    fn after_mutation(&self) {
        if let Err(err) = self.storage.save(&self.state.to_json()) {
            tracing::warn!(%err, "cart persistence failed, keeping in-memory state");
        }
        let count = self.state.item_count();
        for observer in &self.observers {
            observer(count);
        }
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn descriptor(id: &str, price: &str) -> ProductDescriptor {
        ProductDescriptor {
            id: CartItemId::from(id),
            name: format!("Product {id}"),
            price: price.to_owned(),
            image_src: format!("/images/{id}.jpg"),
        }
    }

    fn store() -> CartStore {
        CartStore::open(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn add_merges_on_existing_id() {
        let mut cart = store();
        cart.add_item(descriptor("1", "$10.00"), qty(2));
        cart.add_item(descriptor("1", "$10.00"), qty(3));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut cart = store();
        cart.add_item(descriptor("a", "$1.00"), qty(1));
        cart.add_item(descriptor("b", "$2.00"), qty(1));
        cart.add_item(descriptor("a", "$1.00"), qty(1));

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn update_to_zero_or_negative_removes_line() {
        let mut cart = store();
        cart.add_item(descriptor("1", "$10.00"), qty(2));
        cart.update_quantity(&CartItemId::from("1"), 0);
        assert!(cart.items().is_empty());

        cart.add_item(descriptor("1", "$10.00"), qty(2));
        cart.update_quantity(&CartItemId::from("1"), -5);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn update_sets_absolute_quantity() {
        let mut cart = store();
        cart.add_item(descriptor("1", "$10.00"), qty(2));
        cart.update_quantity(&CartItemId::from("1"), 7);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn unknown_id_is_a_silent_noop() {
        let mut cart = store();
        cart.add_item(descriptor("1", "$10.00"), qty(2));

        cart.remove_item(&CartItemId::from("nonexistent"));
        cart.update_quantity(&CartItemId::from("nonexistent"), 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn totals_match_line_arithmetic() {
        let mut cart = store();
        cart.add_item(descriptor("1", "$10.00"), qty(2));
        cart.add_item(descriptor("2", "$5.50"), qty(1));

        let totals = cart.totals();
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.subtotal, Decimal::from_str("25.50").unwrap());
        assert_eq!(totals.shipping, Decimal::from_str("5.99").unwrap());
        assert_eq!(totals.total, Decimal::from_str("31.49").unwrap());
    }

    #[test]
    fn empty_cart_has_zero_totals_and_no_shipping() {
        let totals = store().totals();
        assert_eq!(totals.item_count, 0);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn persists_and_rehydrates_through_storage() {
        let storage = Arc::new(MemoryStorage::new());

        let mut cart = CartStore::open(Arc::clone(&storage) as Arc<dyn CartStorage>);
        cart.clear();
        cart.add_item(descriptor("a", "$3.00"), qty(1));
        drop(cart);

        let rehydrated = CartStore::open(storage);
        assert_eq!(rehydrated.items().len(), 1);
        assert_eq!(rehydrated.items()[0].id.as_str(), "a");
        assert_eq!(rehydrated.items()[0].quantity, 1);
    }

    #[test]
    fn corrupt_payload_hydrates_as_empty() {
        let storage = Arc::new(MemoryStorage::with_payload("{not json"));
        let cart = CartStore::open(storage);
        assert!(cart.items().is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn numeric_ids_from_legacy_payloads_deserialize() {
        let payload = r#"[{"id":42,"name":"Lamp","price":"$89.99","imageSrc":"/l.jpg","quantity":1}]"#;
        let state = CartState::from_json(Some(payload));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].id.as_str(), "42");
    }

    #[test]
    fn failing_storage_never_breaks_mutations() {
        struct BrokenStorage;
        impl CartStorage for BrokenStorage {
            fn load(&self) -> Result<Option<String>, StorageError> {
                Err(StorageError("quota exceeded".to_owned()))
            }
            fn save(&self, _: &str) -> Result<(), StorageError> {
                Err(StorageError("quota exceeded".to_owned()))
            }
        }

        let mut cart = CartStore::open(Arc::new(BrokenStorage));
        cart.add_item(descriptor("1", "$10.00"), qty(1));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn observers_see_every_count_change() {
        let seen = Arc::new(AtomicU32::new(0));
        let mut cart = store();
        let sink = Arc::clone(&seen);
        cart.subscribe(move |count| sink.store(count, Ordering::SeqCst));

        cart.add_item(descriptor("1", "$10.00"), qty(2));
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        cart.add_item(descriptor("2", "$1.00"), qty(1));
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        cart.clear();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn range_priced_line_uses_low_end_in_totals() {
        let mut cart = store();
        cart.add_item(descriptor("1", "$24.99 - $49.99"), qty(2));
        assert_eq!(cart.totals().subtotal, Decimal::from_str("49.98").unwrap());
    }
}
