//! Flat-file JSON document store for Nonna & Rue's.
//!
//! The store keeps one JSON file per collection under a data directory:
//!
//! - `products.json` - the catalog
//! - `orders.json` - placed orders
//! - `settings.json` - editable site settings
//!
//! Writes overwrite the whole collection file - the same contract the cart
//! uses for its storage key. There is no transactionality beyond that, and
//! none is needed at this store's scale. Both binaries open the same data
//! directory; collections are guarded by an async `RwLock`.
//!
//! Unlike the cart's storage (where corruption silently becomes an empty
//! cart), a corrupt collection file is a loud [`DbError::Corrupt`]: losing
//! the catalog quietly would be much worse than failing to boot.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod orders;
pub mod products;
pub mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use settings::SettingsRepository;

/// Document store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Filesystem read/write failure.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file exists but does not parse.
    #[error("corrupt collection file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A collection could not be serialized for writing.
    #[error("failed to serialize collection {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One JSON-file-backed collection of documents.
///
/// Loaded fully into memory on open; every mutation rewrites the file.
#[derive(Debug)]
pub(crate) struct JsonCollection<T> {
    path: PathBuf,
    docs: RwLock<Vec<T>>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open a collection, loading the backing file if it exists.
    ///
    /// A missing file is an empty collection; a corrupt file is an error.
    pub(crate) async fn open(path: PathBuf) -> Result<Self, DbError> {
        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| DbError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(DbError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };
        tracing::debug!(path = %path.display(), "collection opened");
        Ok(Self {
            path,
            docs: RwLock::new(docs),
        })
    }

    /// Run a closure over the documents under a read lock.
    pub(crate) async fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let docs = self.docs.read().await;
        f(&docs)
    }

    /// Mutate the documents and persist the whole collection.
    ///
    /// The closure's result is returned after a successful write.
    pub(crate) async fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, DbError> {
        let mut docs = self.docs.write().await;
        let result = f(&mut docs);
        let bytes =
            serde_json::to_vec_pretty(&*docs).map_err(|source| DbError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| DbError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(result)
    }
}

/// Handles to every collection in one data directory.
///
/// Cheap to clone; clones share the same underlying collections.
#[derive(Clone, Debug)]
pub struct Database {
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub settings: SettingsRepository,
}

impl Database {
    /// Open (creating if needed) the data directory and every collection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the directory cannot be created or a
    /// collection file is unreadable or corrupt.
    pub async fn open(data_dir: &Path) -> Result<Self, DbError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|source| DbError::Io {
                path: data_dir.to_path_buf(),
                source,
            })?;

        let products = JsonCollection::open(data_dir.join("products.json")).await?;
        let orders = JsonCollection::open(data_dir.join("orders.json")).await?;
        let settings = JsonCollection::open(data_dir.join("settings.json")).await?;

        Ok(Self {
            products: ProductRepository::new(Arc::new(products)),
            orders: OrderRepository::new(Arc::new(orders)),
            settings: SettingsRepository::new(Arc::new(settings)),
        })
    }
}

/// Helpers for tests in this crate and in dependents.
pub mod test_support {
    use std::path::PathBuf;

    /// A unique throwaway data directory under the system temp dir.
    #[must_use]
    pub fn temp_data_dir() -> PathBuf {
        std::env::temp_dir()
            .join("nonna-rues-db-tests")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_support::temp_data_dir;

    #[tokio::test]
    async fn open_creates_missing_data_dir() {
        let dir = temp_data_dir();
        let db = Database::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert!(db.products.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_collection_file_is_a_loud_error() {
        let dir = temp_data_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("products.json"), b"{definitely not json")
            .await
            .unwrap();

        let err = Database::open(&dir).await.unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
    }
}
