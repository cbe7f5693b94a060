//! Persisted record types.
//!
//! Everything here serializes with camelCase field names, matching both
//! the durable JSON records and the remote API's wire format.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::CartItem;
pub use order::{Order, PaymentInfo, PaymentRecord, ShippingInfo};
pub use product::{Category, Product};
pub use session::{Session, SessionUser};
pub use user::{Address, AddressKind, User};
