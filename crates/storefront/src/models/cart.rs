//! Session-backed cart storage.
//!
//! [`CartStorage`] is a synchronous trait while the tower-sessions record
//! is async, so the adapter works on a snapshot: the handler loads the
//! persisted payload from the session up front, the store writes land in a
//! pending slot, and the handler flushes that slot back to the session
//! before responding. Within one request the store is the single writer,
//! so the snapshot cannot go stale.

use std::sync::{Arc, Mutex};

use nonna_rues_core::{CartStore, cart::CartStorage, cart::StorageError};
use tower_sessions::Session;

use crate::models::session_keys;

/// [`CartStorage`] adapter over a session snapshot.
pub struct SessionCartStorage {
    loaded: Option<String>,
    pending: Mutex<Option<String>>,
}

impl SessionCartStorage {
    /// Wrap the payload read from the session at the start of the request.
    #[must_use]
    pub fn new(loaded: Option<String>) -> Self {
        Self {
            loaded,
            pending: Mutex::new(None),
        }
    }

    /// Take the latest unsaved payload, if any mutation happened.
    #[must_use]
    pub fn take_pending(&self) -> Option<String> {
        self.pending.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl CartStorage for SessionCartStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.loaded.clone())
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        let mut slot = self
            .pending
            .lock()
            .map_err(|_| StorageError("poisoned pending-write lock".to_owned()))?;
        *slot = Some(payload.to_owned());
        Ok(())
    }
}

/// Hydrate the shopper's cart from their session.
///
/// Returns the store plus the storage handle the caller needs for
/// [`flush_cart`].
pub async fn open_cart(session: &Session) -> (CartStore, Arc<SessionCartStorage>) {
    let payload = session
        .get::<String>(session_keys::CART)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(%err, "cart session read failed, starting empty");
            None
        });
    let storage = Arc::new(SessionCartStorage::new(payload));
    let cart = CartStore::open(Arc::clone(&storage) as Arc<dyn CartStorage>);
    (cart, storage)
}

/// Write any pending cart payload back to the session.
///
/// Persistence failures are logged and swallowed, matching the cart's
/// storage contract: a lost write must never break the shopper's page.
pub async fn flush_cart(session: &Session, storage: &SessionCartStorage) {
    if let Some(payload) = storage.take_pending() {
        if let Err(err) = session.insert(session_keys::CART, payload).await {
            tracing::warn!(%err, "failed to persist cart to session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use nonna_rues_core::{CartItemId, ProductDescriptor};

    use super::*;

    fn lamp() -> ProductDescriptor {
        ProductDescriptor {
            id: CartItemId::from("1"),
            name: "Vintage Lamp".into(),
            price: "$89.99".into(),
            image_src: "/images/lamp.jpg".into(),
        }
    }

    #[test]
    fn mutations_land_in_the_pending_slot() {
        let storage = Arc::new(SessionCartStorage::new(None));
        let mut cart = CartStore::open(Arc::clone(&storage) as Arc<dyn CartStorage>);

        assert!(storage.take_pending().is_none());
        cart.add_item(lamp(), NonZeroU32::new(2).unwrap());

        let payload = storage.take_pending().unwrap();
        assert!(payload.contains("Vintage Lamp"));
        // Taking drains the slot.
        assert!(storage.take_pending().is_none());
    }

    #[test]
    fn hydrates_from_the_loaded_snapshot() {
        let payload = r#"[{"id":"1","name":"Lamp","price":"$89.99","imageSrc":"/l.jpg","quantity":3}]"#;
        let storage = Arc::new(SessionCartStorage::new(Some(payload.to_owned())));
        let cart = CartStore::open(storage);
        assert_eq!(cart.item_count(), 3);
    }
}
