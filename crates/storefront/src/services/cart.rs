//! Cart and wishlist operations.
//!
//! Both collections live wholesale under their own storage keys and are
//! rewritten on every mutation. Cart line identity is the (product id,
//! size) pair; adding an existing pair merges quantities instead of
//! creating a second line. All cart mutations require an active session.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use greencart_core::ProductId;

use crate::catalog::CatalogProvider;
use crate::error::{Result, StoreError};
use crate::models::{CartItem, Product, Session};
use crate::storage::{Storage, StorageExt, keys};

/// Cart and wishlist service.
#[derive(Clone)]
pub struct CartService {
    storage: Arc<dyn Storage>,
    catalog: Arc<CatalogProvider>,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, catalog: Arc<CatalogProvider>) -> Self {
        Self { storage, catalog }
    }

    fn require_session(&self) -> Result<Session> {
        let session: Option<Session> = self.storage.load(keys::CURRENT_SESSION)?;
        session.ok_or(StoreError::NotAuthenticated)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// The current cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn cart(&self) -> Result<Vec<CartItem>> {
        Ok(self.storage.load(keys::CART)?)
    }

    /// Add `quantity` of a product (in the given size, if any) to the cart.
    ///
    /// Merges into an existing line with the same (product, size) pair.
    /// Returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, `NotFound` for an
    /// unknown product, and a validation error for a zero quantity or an
    /// out-of-stock product.
    #[instrument(skip(self))]
    pub fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
        size: Option<&str>,
    ) -> Result<Vec<CartItem>> {
        self.require_session()?;

        if quantity == 0 {
            return Err(StoreError::Validation(
                "quantity must be at least 1".to_owned(),
            ));
        }
        let product = self
            .catalog
            .by_id(product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;
        if !product.in_stock {
            return Err(StoreError::Validation(format!(
                "{} is out of stock",
                product.name
            )));
        }

        let mut cart: Vec<CartItem> = self.storage.load(keys::CART)?;
        if let Some(line) = cart.iter_mut().find(|line| line.matches(product_id, size)) {
            line.quantity += quantity;
        } else {
            cart.push(CartItem::snapshot(&product, quantity, size));
        }
        self.storage.store(keys::CART, &cart)?;
        debug!(product = %product_id, quantity, "added to cart");
        Ok(cart)
    }

    /// Set the quantity of an existing line. A quantity of 0 removes the
    /// line. Updating an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or an error if the
    /// persistence adapter fails.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &self,
        product_id: ProductId,
        size: Option<&str>,
        quantity: u32,
    ) -> Result<Vec<CartItem>> {
        self.require_session()?;

        let mut cart: Vec<CartItem> = self.storage.load(keys::CART)?;
        if quantity == 0 {
            cart.retain(|line| !line.matches(product_id, size));
        } else if let Some(line) = cart.iter_mut().find(|line| line.matches(product_id, size)) {
            line.quantity = quantity;
        }
        self.storage.store(keys::CART, &cart)?;
        Ok(cart)
    }

    /// Remove a line from the cart. Removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or an error if the
    /// persistence adapter fails.
    pub fn remove_from_cart(&self, product_id: ProductId, size: Option<&str>) -> Result<Vec<CartItem>> {
        self.update_quantity(product_id, size, 0)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn clear_cart(&self) -> Result<()> {
        self.storage.remove(keys::CART)?;
        Ok(())
    }

    /// Sum of line totals over the whole cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn cart_total(&self) -> Result<Decimal> {
        let cart: Vec<CartItem> = self.storage.load(keys::CART)?;
        Ok(cart.iter().map(CartItem::line_total).sum())
    }

    /// Total number of units across all lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn item_count(&self) -> Result<u32> {
        let cart: Vec<CartItem> = self.storage.load(keys::CART)?;
        Ok(cart.iter().map(|line| line.quantity).sum())
    }

    // =========================================================================
    // Wishlist
    //
    // Only additions are session-gated. Removal and clear stay ungated,
    // like clear_cart: they also serve cleanup paths that run once the
    // session record is already gone.
    // =========================================================================

    /// The wishlist, as product snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn wishlist(&self) -> Result<Vec<Product>> {
        Ok(self.storage.load(keys::WISHLIST)?)
    }

    /// Add a product to the wishlist. Returns `false` (without change)
    /// when it is already there.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or `NotFound` for an
    /// unknown product.
    #[instrument(skip(self))]
    pub fn add_to_wishlist(&self, product_id: ProductId) -> Result<bool> {
        self.require_session()?;

        let product = self
            .catalog
            .by_id(product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;

        let mut wishlist: Vec<Product> = self.storage.load(keys::WISHLIST)?;
        if wishlist.iter().any(|saved| saved.id == product_id) {
            return Ok(false);
        }
        wishlist.push(product);
        self.storage.store(keys::WISHLIST, &wishlist)?;
        Ok(true)
    }

    /// Remove a product from the wishlist. Removing an absent product is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn remove_from_wishlist(&self, product_id: ProductId) -> Result<Vec<Product>> {
        let mut wishlist: Vec<Product> = self.storage.load(keys::WISHLIST)?;
        wishlist.retain(|saved| saved.id != product_id);
        self.storage.store(keys::WISHLIST, &wishlist)?;
        Ok(wishlist)
    }

    /// Empty the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn clear_wishlist(&self) -> Result<()> {
        self.storage.remove(keys::WISHLIST)?;
        Ok(())
    }

    /// Whether a product is on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn is_in_wishlist(&self, product_id: ProductId) -> Result<bool> {
        let wishlist: Vec<Product> = self.storage.load(keys::WISHLIST)?;
        Ok(wishlist.iter().any(|saved| saved.id == product_id))
    }

    /// Move a wishlist product into the cart (quantity 1, no size).
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or `NotFound` for an
    /// unknown product.
    pub fn move_to_cart(&self, product_id: ProductId) -> Result<Vec<CartItem>> {
        let cart = self.add_to_cart(product_id, 1, None)?;
        self.remove_from_wishlist(product_id)?;
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{Session, SessionUser};
    use crate::storage::MemoryStorage;
    use greencart_core::{Email, UserId};

    fn session() -> Session {
        Session::start(
            SessionUser {
                id: UserId::new("user_1_abc"),
                first_name: "John".to_owned(),
                last_name: "Doe".to_owned(),
                email: Email::parse("john@example.com").unwrap(),
                phone: "+1234567890".to_owned(),
            },
            None,
        )
    }

    fn service_with_session() -> CartService {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        storage.store(keys::CURRENT_SESSION, &session()).unwrap();
        CartService::new(storage, Arc::new(CatalogProvider::with_sample_catalog()))
    }

    #[test]
    fn test_add_requires_session() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let cart = CartService::new(storage, Arc::new(CatalogProvider::with_sample_catalog()));

        assert!(matches!(
            cart.add_to_cart(ProductId::new(1), 1, None),
            Err(StoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_add_merges_on_product_and_size() {
        let cart = service_with_session();
        cart.add_to_cart(ProductId::new(2), 1, Some("M")).unwrap();
        cart.add_to_cart(ProductId::new(2), 2, Some("M")).unwrap();
        let lines = cart.add_to_cart(ProductId::new(2), 1, Some("L")).unwrap();

        assert_eq!(lines.len(), 2);
        let medium = lines
            .iter()
            .find(|line| line.size.as_deref() == Some("M"))
            .unwrap();
        assert_eq!(medium.quantity, 3);
    }

    #[test]
    fn test_add_unknown_product_is_not_found() {
        let cart = service_with_session();
        assert!(matches!(
            cart.add_to_cart(ProductId::new(999), 1, None),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_zero_quantity_add_rejected() {
        let cart = service_with_session();
        assert!(matches!(
            cart.add_to_cart(ProductId::new(1), 0, None),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let cart = service_with_session();
        cart.add_to_cart(ProductId::new(1), 2, None).unwrap();
        let lines = cart.update_quantity(ProductId::new(1), None, 0).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_update_absent_line_is_noop() {
        let cart = service_with_session();
        cart.add_to_cart(ProductId::new(1), 2, None).unwrap();
        let lines = cart.update_quantity(ProductId::new(5), None, 4).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_cart_total_invariant_under_add_order() {
        // Same final multiset of (product, size, quantity) through two
        // different call sequences.
        let forward = service_with_session();
        forward.add_to_cart(ProductId::new(1), 2, None).unwrap();
        forward.add_to_cart(ProductId::new(2), 1, Some("M")).unwrap();
        forward.add_to_cart(ProductId::new(2), 2, Some("M")).unwrap();

        let reordered = service_with_session();
        reordered.add_to_cart(ProductId::new(2), 3, Some("M")).unwrap();
        reordered.add_to_cart(ProductId::new(1), 1, None).unwrap();
        reordered.add_to_cart(ProductId::new(1), 1, None).unwrap();

        assert_eq!(
            forward.cart_total().unwrap(),
            reordered.cart_total().unwrap()
        );
        assert_eq!(forward.item_count().unwrap(), reordered.item_count().unwrap());
    }

    #[test]
    fn test_remove_then_add_recreates_single_line() {
        let cart = service_with_session();
        cart.add_to_cart(ProductId::new(1), 2, None).unwrap();
        cart.remove_from_cart(ProductId::new(1), None).unwrap();
        let lines = cart.add_to_cart(ProductId::new(1), 5, None).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
    }

    #[test]
    fn test_cart_total_and_count() {
        let cart = service_with_session();
        // 2 x 79.99 + 1 x 24.99 = 184.97
        cart.add_to_cart(ProductId::new(1), 2, None).unwrap();
        cart.add_to_cart(ProductId::new(2), 1, Some("M")).unwrap();

        assert_eq!(cart.cart_total().unwrap(), "184.97".parse().unwrap());
        assert_eq!(cart.item_count().unwrap(), 3);
    }

    #[test]
    fn test_wishlist_add_is_idempotent() {
        let cart = service_with_session();
        assert!(cart.add_to_wishlist(ProductId::new(3)).unwrap());
        assert!(!cart.add_to_wishlist(ProductId::new(3)).unwrap());
        assert_eq!(cart.wishlist().unwrap().len(), 1);
        assert!(cart.is_in_wishlist(ProductId::new(3)).unwrap());

        cart.clear_wishlist().unwrap();
        assert!(cart.wishlist().unwrap().is_empty());
    }

    #[test]
    fn test_move_to_cart() {
        let cart = service_with_session();
        cart.add_to_wishlist(ProductId::new(3)).unwrap();
        let lines = cart.move_to_cart(ProductId::new(3)).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
        assert!(cart.wishlist().unwrap().is_empty());
    }
}
