//! User account and address records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use greencart_core::{AddressId, Email, OrderId, UserId};

use super::session::SessionUser;

/// Address type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Home,
    Work,
    Other,
}

/// A saved shipping address.
///
/// At most one address per user carries `is_default = true`; every path
/// that sets a default unsets the others first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(rename = "type")]
    pub kind: AddressKind,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    #[serde(default)]
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub is_default: bool,
}

/// A local user account.
///
/// The password is stored only as an Argon2id hash; the plaintext never
/// touches the persistence adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Order IDs placed by this user, oldest first.
    #[serde(default)]
    pub orders: Vec<OrderId>,
    /// Soft-removal flag; a deactivated account is reactivated by a
    /// successful login.
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivated_at: Option<DateTime<Utc>>,
}

const fn default_true() -> bool {
    true
}

impl User {
    /// The public projection stored in the session.
    #[must_use]
    pub fn public_profile(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    /// The default address, if one is set.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|address| address.is_default)
            .or_else(|| self.addresses.first())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(id: &str, is_default: bool) -> Address {
        Address {
            id: AddressId::new(id),
            kind: AddressKind::Home,
            first_name: "John".to_owned(),
            last_name: "Doe".to_owned(),
            street: "123 Main St".to_owned(),
            street2: String::new(),
            city: "New York".to_owned(),
            state: "NY".to_owned(),
            zip_code: "10001".to_owned(),
            phone: "+1234567890".to_owned(),
            is_default,
        }
    }

    fn user(addresses: Vec<Address>) -> User {
        User {
            id: UserId::new("user_1_abc"),
            first_name: "John".to_owned(),
            last_name: "Doe".to_owned(),
            email: Email::parse("john@example.com").unwrap(),
            phone: "+1234567890".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: Utc::now(),
            date_of_birth: None,
            addresses,
            orders: Vec::new(),
            is_active: true,
            deactivated_at: None,
        }
    }

    #[test]
    fn test_default_address_prefers_flagged() {
        let user = user(vec![address("a1", false), address("a2", true)]);
        assert_eq!(user.default_address().unwrap().id, AddressId::new("a2"));
    }

    #[test]
    fn test_default_address_falls_back_to_first() {
        let user = user(vec![address("a1", false), address("a2", false)]);
        assert_eq!(user.default_address().unwrap().id, AddressId::new("a1"));
    }

    #[test]
    fn test_is_active_defaults_true_on_old_records() {
        // Records written before the deactivation feature lack the flag.
        let json = serde_json::json!({
            "id": "user_1_abc",
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@example.com",
            "phone": "+1234567890",
            "passwordHash": "$argon2id$stub",
            "createdAt": "2024-01-01T00:00:00Z",
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.is_active);
        assert!(user.addresses.is_empty());
    }

    #[test]
    fn test_address_type_tag_serialization() {
        let json = serde_json::to_value(address("a1", true)).unwrap();
        assert_eq!(json.get("type").unwrap(), "home");
        assert_eq!(json.get("isDefault").unwrap(), true);
    }
}
