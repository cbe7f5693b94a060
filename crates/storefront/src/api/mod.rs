//! HTTP client for the remote store backend.
//!
//! The store works fully offline against local persistence; when a
//! backend URL is configured, authentication and catalog reads go remote
//! first and fall back to local data on any failure. Product reads are
//! cached in memory via `moka` (5-minute TTL); searches and cart
//! operations always hit the network.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub use types::{
    AddToCartRequest, AuthResponse, CartCountResponse, ErrorResponse, ListResponse, LoginRequest,
    RemoteCartItem, RemoteProduct, SignupRequest,
};

/// Errors from the remote store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL does not parse.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not parse.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the backend rejected a signup because the email is taken.
    ///
    /// This is the one remote error that must not fall back to local
    /// account creation.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::Status { message, .. } => {
                let message = message.to_lowercase();
                message.contains("already in use") || message.contains("already exists")
            }
            _ => false,
        }
    }
}

/// Client for the remote store backend.
///
/// Cheap to clone; all clones share the HTTP connection pool and the
/// response cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: Url,
    cache: Cache<String, serde_json::Value>,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] when the URL does not parse,
    /// or [`ApiError::Http`] when the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Trailing slash matters for Url::join.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base,
                cache,
            }),
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth/login`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post_json(
            "auth/login",
            &LoginRequest {
                email: email.to_owned(),
                password: password.to_owned(),
            },
            None,
        )
        .await
    }

    /// `POST /auth/signup`.
    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.post_json("auth/signup", request, None).await
    }

    /// `POST /auth/logout`. Best effort; callers log and ignore failures.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint("auth/logout")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    // =========================================================================
    // Products (list and detail reads are cached)
    // =========================================================================

    /// `GET /products?page&size&sort`.
    pub async fn products(
        &self,
        page: u32,
        size: u32,
        sort: Option<&str>,
    ) -> Result<Vec<RemoteProduct>, ApiError> {
        let mut path = format!("products?page={page}&size={size}");
        if let Some(sort) = sort {
            path.push_str("&sort=");
            path.push_str(sort);
        }
        let list: ListResponse<RemoteProduct> = self.get_cached(&path).await?;
        Ok(list.into_items())
    }

    /// `GET /products/{id}`.
    pub async fn product(&self, id: i64) -> Result<RemoteProduct, ApiError> {
        self.get_cached(&format!("products/{id}")).await
    }

    /// `GET /products/search?q&page&size`. Never cached.
    pub async fn search_products(
        &self,
        query: &str,
        page: u32,
        size: u32,
    ) -> Result<Vec<RemoteProduct>, ApiError> {
        let mut url = self.endpoint("products/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        let list: ListResponse<RemoteProduct> = self.get_json_at(url, None).await?;
        Ok(list.into_items())
    }

    /// `GET /products/category/{category}?page&size`.
    pub async fn products_by_category(
        &self,
        category: &str,
        page: u32,
        size: u32,
    ) -> Result<Vec<RemoteProduct>, ApiError> {
        let path = format!("products/category/{category}?page={page}&size={size}");
        let list: ListResponse<RemoteProduct> = self.get_cached(&path).await?;
        Ok(list.into_items())
    }

    /// `GET /products/featured?limit`.
    pub async fn featured_products(&self, limit: u32) -> Result<Vec<RemoteProduct>, ApiError> {
        let list: ListResponse<RemoteProduct> = self
            .get_cached(&format!("products/featured?limit={limit}"))
            .await?;
        Ok(list.into_items())
    }

    /// `GET /products/categories`.
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let list: ListResponse<String> = self.get_cached("products/categories").await?;
        Ok(list.into_items())
    }

    // =========================================================================
    // Cart (always live; authenticated)
    // =========================================================================

    /// `GET /cart/{userId}`.
    pub async fn cart(&self, user_id: &str, token: &str) -> Result<Vec<RemoteCartItem>, ApiError> {
        let url = self.endpoint(&format!("cart/{user_id}"))?;
        let list: ListResponse<RemoteCartItem> = self.get_json_at(url, Some(token)).await?;
        Ok(list.into_items())
    }

    /// `POST /cart/add`.
    pub async fn add_to_cart(
        &self,
        request: &AddToCartRequest,
        token: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint("cart/add")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// `PUT /cart/update/{cartItemId}?quantity`.
    pub async fn update_cart_item(
        &self,
        cart_item_id: i64,
        quantity: u32,
        token: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("cart/update/{cart_item_id}?quantity={quantity}"))?;
        let response = self.inner.client.put(url).bearer_auth(token).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// `DELETE /cart/remove/{cartItemId}`.
    pub async fn remove_cart_item(&self, cart_item_id: i64, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("cart/remove/{cart_item_id}"))?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(token)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// `DELETE /cart/clear/{userId}`.
    pub async fn clear_cart(&self, user_id: &str, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("cart/clear/{user_id}"))?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(token)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// `GET /cart/count/{userId}`.
    pub async fn cart_count(&self, user_id: &str, token: &str) -> Result<u32, ApiError> {
        let url = self.endpoint(&format!("cart/count/{user_id}"))?;
        let count: CartCountResponse = self.get_json_at(url, Some(token)).await?;
        Ok(count.count)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base.join(path)?)
    }

    /// GET a JSON body, going through the response cache.
    async fn get_cached<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        if let Some(cached) = self.inner.cache.get(path).await {
            debug!(path, "cache hit");
            return Ok(serde_json::from_value(cached)?);
        }

        let url = self.endpoint(path)?;
        let value: serde_json::Value = self.get_json_at(url, None).await?;
        self.inner
            .cache
            .insert(path.to_owned(), value.clone())
            .await;
        Ok(serde_json::from_value(value)?)
    }

    async fn get_json_at<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let mut request = self.inner.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Map non-success statuses to [`ApiError::Status`], pulling the
    /// message out of an `{"message": ...}` body when the backend sends
    /// one, else using the raw body text.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error.message,
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => format!("request failed with status {status}"),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080/api", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let url = client().endpoint("auth/login").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/auth/login");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(5)),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_already_exists_detection() {
        let taken = ApiError::Status {
            status: 409,
            message: "Email already in use".to_owned(),
        };
        assert!(taken.is_already_exists());

        let other = ApiError::Status {
            status: 500,
            message: "internal error".to_owned(),
        };
        assert!(!other.is_already_exists());

        let parse = ApiError::Parse(serde_json::from_str::<u32>("x").unwrap_err());
        assert!(!parse.is_already_exists());
    }
}
