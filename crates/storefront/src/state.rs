//! Application state shared across the UI layer.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::catalog::CatalogProvider;
use crate::config::StorefrontConfig;
use crate::services::{AuthService, CartService, CheckoutService, ProfileService};
use crate::storage::{JsonFileStorage, Storage, StorageError};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage init failed: {0}")]
    Storage(#[from] StorageError),
    #[error("remote API client init failed: {0}")]
    Api(#[from] ApiError),
}

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and is the single
/// construction point for storage, catalog, remote client, and the
/// services built on them. Nothing else in the crate reaches for global
/// state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Arc<dyn Storage>,
    catalog: Arc<CatalogProvider>,
    api: Option<ApiClient>,
}

impl AppState {
    /// Create application state backed by JSON-file storage under the
    /// configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be prepared or the
    /// configured API base URL is invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let storage: Arc<dyn Storage> = Arc::new(JsonFileStorage::open(&config.data_dir)?);
        Self::with_storage(config, storage)
    }

    /// Create application state over an existing storage adapter.
    ///
    /// Tests use this with [`crate::storage::MemoryStorage`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API base URL is invalid.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, StateError> {
        let api = config
            .api_base_url
            .as_deref()
            .map(|base_url| ApiClient::new(base_url, config.request_timeout))
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                catalog: Arc::new(CatalogProvider::with_sample_catalog()),
                api,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a handle to the persistence adapter.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.inner.storage)
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogProvider {
        &self.inner.catalog
    }

    /// Get a reference to the remote API client, when one is configured.
    #[must_use]
    pub fn api(&self) -> Option<&ApiClient> {
        self.inner.api.as_ref()
    }

    /// Authentication service.
    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.storage(), self.inner.api.clone())
    }

    /// Cart and wishlist service.
    #[must_use]
    pub fn cart(&self) -> CartService {
        CartService::new(self.storage(), Arc::clone(&self.inner.catalog))
    }

    /// Checkout service.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.storage(), self.inner.config.processing_delay)
    }

    /// Profile service.
    #[must_use]
    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.storage())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_state_without_remote_api() {
        let config = StorefrontConfig::local("/tmp/greencart-unused");
        let state = AppState::with_storage(config, Arc::new(MemoryStorage::default())).unwrap();
        assert!(state.api().is_none());
        assert_eq!(state.catalog().categories().len(), 4);
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let mut config = StorefrontConfig::local("/tmp/greencart-unused");
        config.api_base_url = Some("not a url".to_owned());
        assert!(matches!(
            AppState::with_storage(config, Arc::new(MemoryStorage::default())),
            Err(StateError::Api(_))
        ));
    }

    #[test]
    fn test_clones_share_storage() {
        let config = StorefrontConfig::local("/tmp/greencart-unused");
        let state = AppState::with_storage(config, Arc::new(MemoryStorage::default())).unwrap();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.inner, &clone.inner));
    }
}
