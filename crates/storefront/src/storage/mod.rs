//! Key/value JSON persistence adapter.
//!
//! The durable state of the whole storefront is five JSON records (session,
//! users, cart, wishlist, orders) written wholesale through the [`Storage`]
//! trait. There is no partial merge and no transactionality across keys: a
//! crash between two `set` calls can leave related records inconsistent.
//! That limitation is accepted here, not papered over.
//!
//! [`JsonFileStorage`] is the durable implementation (one file per key
//! under a data directory); [`MemoryStorage`] backs tests and ephemeral
//! runs.

mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Keys for the persisted records.
///
/// These are the only durable records; none carries a schema version, so
/// format changes are not migration-safe.
pub mod keys {
    /// The currently authenticated session.
    pub const CURRENT_SESSION: &str = "current_session";

    /// The full local user collection.
    pub const USERS: &str = "users";

    /// The cart line items.
    pub const CART: &str = "cart";

    /// The wishlist product snapshots.
    pub const WISHLIST: &str = "wishlist";

    /// The global order collection.
    pub const ORDERS: &str = "orders";
}

/// Errors that can occur in the persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("storage I/O error for key {key:?}: {source}")]
    Io {
        /// The record key being accessed.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A stored record or a value being stored is not valid JSON.
    #[error("storage encoding error for key {key:?}: {source}")]
    Encoding {
        /// The record key being accessed.
        key: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value read-write of JSON records.
///
/// `set` overwrites the whole value for a key; `get` of an absent key is
/// `Ok(None)`, never an error.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or the stored
    /// bytes are not valid JSON.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed helpers over [`Storage`].
///
/// Reads that find no value return the type's `Default` (the defined empty
/// collection) rather than failing.
pub trait StorageExt {
    /// Load and decode the record under `key`, or `T::default()` when the
    /// key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be decoded into `T`.
    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StorageError>;

    /// Encode and store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the underlying write fails.
    fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> StorageExt for S {
    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StorageError> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value).map_err(|source| StorageError::Encoding {
                key: key.to_owned(),
                source,
            }),
            None => Ok(T::default()),
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|source| StorageError::Encoding {
            key: key.to_owned(),
            source,
        })?;
        self.set(key, &value)
    }
}
