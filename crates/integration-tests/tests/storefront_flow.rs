//! End-to-end shopper flow over real JSON-file storage.

use greencart_core::{OrderStatus, PaymentMethod, ProductId};
use greencart_integration_tests::{file_state, signup_form};
use greencart_storefront::catalog::{PriceBucket, ProductFilter, SortKey};
use greencart_storefront::models::{Category, PaymentInfo, ShippingInfo};

fn shipping() -> ShippingInfo {
    ShippingInfo {
        first_name: "Alice".to_owned(),
        last_name: "Jones".to_owned(),
        street: "42 Elm St".to_owned(),
        city: "Boston".to_owned(),
        state: "MA".to_owned(),
        zip_code: "02101".to_owned(),
        phone: "+1112223333".to_owned(),
    }
}

#[tokio::test]
async fn test_signup_browse_cart_checkout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = file_state(dir.path());

    // Signup establishes a session.
    let session = state
        .auth()
        .signup(&signup_form("alice@example.com"))
        .await
        .expect("signup");
    assert_eq!(session.user.full_name(), "Alice Jones");

    // Browse: filtered, sorted catalog view.
    let electronics = state.catalog().list(&ProductFilter {
        category: Some(Category::Electronics),
        price: Some(PriceBucket::From50To100),
        search: None,
        sort: SortKey::PriceAscending,
    });
    assert_eq!(electronics.len(), 1);
    let headphones = &electronics[0];

    // Cart: add twice merges, wishlist tracks separately.
    let cart = state.cart();
    cart.add_to_cart(headphones.id, 1, None).expect("add");
    cart.add_to_cart(headphones.id, 1, None).expect("merge");
    assert_eq!(cart.item_count().expect("count"), 2);
    assert!(cart.add_to_wishlist(ProductId::new(3)).expect("wishlist"));

    // Checkout: 2 x 79.99 = 159.98 subtotal, free shipping, 8% tax.
    let order = state
        .checkout()
        .place_order(
            shipping(),
            PaymentInfo {
                method: PaymentMethod::Card,
                card_number: Some("4111-1111-1111-1111".to_owned()),
            },
        )
        .await
        .expect("place order");

    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.summary.subtotal, "159.98".parse().unwrap());
    assert_eq!(order.summary.shipping, "0.00".parse().unwrap());
    assert_eq!(order.summary.tax, "12.80".parse().unwrap());
    assert_eq!(order.summary.total, "172.78".parse().unwrap());
    assert_eq!(order.payment.card_last4.as_deref(), Some("1111"));

    // Cart cleared, order visible from the profile.
    assert_eq!(cart.item_count().expect("count"), 0);
    let orders = state.profile().orders().expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
}

#[tokio::test]
async fn test_state_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");

    let order_id = {
        let state = file_state(dir.path());
        state
            .auth()
            .signup(&signup_form("alice@example.com"))
            .await
            .expect("signup");
        state
            .cart()
            .add_to_cart(ProductId::new(2), 1, Some("M"))
            .expect("add");
        state
            .checkout()
            .place_order(
                shipping(),
                PaymentInfo {
                    method: PaymentMethod::CashOnDelivery,
                    card_number: None,
                },
            )
            .await
            .expect("place order")
            .id
    };

    // A fresh state over the same directory sees everything.
    let state = file_state(dir.path());
    let session = state.auth().current_session().expect("load session");
    assert_eq!(
        session.expect("session persisted").user.email.as_ref(),
        "alice@example.com"
    );
    let reloaded = state
        .checkout()
        .order_by_id(&order_id)
        .expect("load order")
        .expect("order persisted");
    assert!(reloaded.payment.card_last4.is_none());

    // Login works again from disk after the session is cleared.
    state.auth().logout().await.expect("logout");
    let state = file_state(dir.path());
    state
        .auth()
        .login("alice@example.com", "secret99")
        .await
        .expect("login from persisted users");
}

#[tokio::test]
async fn test_cart_roundtrips_through_file_storage() {
    let dir = tempfile::tempdir().expect("tempdir");

    let saved = {
        let state = file_state(dir.path());
        state
            .auth()
            .signup(&signup_form("alice@example.com"))
            .await
            .expect("signup");
        let cart = state.cart();
        cart.add_to_cart(ProductId::new(2), 1, Some("M")).expect("add");
        cart.add_to_cart(ProductId::new(1), 2, None).expect("add");
        cart.add_to_cart(ProductId::new(2), 1, Some("L")).expect("add");
        cart.cart().expect("read cart")
    };

    // A fresh state over the same directory yields the identical ordered
    // line sequence, field for field.
    let reloaded = file_state(dir.path()).cart().cart().expect("reload cart");
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded, saved);
}

#[tokio::test]
async fn test_wishlist_and_cart_cleared_on_logout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = file_state(dir.path());

    state
        .auth()
        .signup(&signup_form("alice@example.com"))
        .await
        .expect("signup");
    state
        .cart()
        .add_to_cart(ProductId::new(1), 1, None)
        .expect("add");
    state.cart().add_to_wishlist(ProductId::new(3)).expect("wishlist");

    state.auth().logout().await.expect("logout");

    assert!(state.auth().current_session().expect("session").is_none());
    assert!(state.cart().cart().expect("cart").is_empty());
    assert!(state.cart().wishlist().expect("wishlist").is_empty());
}
