//! Business logic services for the storefront state layer.
//!
//! # Services
//!
//! - `auth` - Login, signup, logout, session handling
//! - `cart` - Cart and wishlist operations
//! - `checkout` - Order placement and order history
//! - `profile` - Account, address book, and account lifecycle
//!
//! Services are stateless handles over the shared storage adapter; the
//! [`crate::state::AppState`] constructs them on demand.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod ids;
pub mod profile;

pub use auth::{AuthService, SignupForm};
pub use cart::CartService;
pub use checkout::CheckoutService;
pub use profile::{AddressForm, PersonalInfoUpdate, ProfileService};
