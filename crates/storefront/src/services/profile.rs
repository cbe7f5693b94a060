//! Account, address book, and account lifecycle.
//!
//! All operations act on the local user record behind the current
//! session; remote-only sessions have no local record and get `NotFound`.
//! Personal-info edits flow into the session record too, so the displayed
//! identity never lags the stored one.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use greencart_core::{AddressId, Email, OrderId, UserId};

use crate::error::{Result, StoreError};
use crate::models::{Address, AddressKind, Order, Session, User};
use crate::services::auth::{hash_password, verify_password, AuthError};
use crate::services::ids;
use crate::storage::{Storage, StorageExt, keys};

/// Editable personal-info fields.
#[derive(Debug, Clone)]
pub struct PersonalInfoUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<String>,
}

/// Fields collected by the address form.
#[derive(Debug, Clone)]
pub struct AddressForm {
    pub kind: AddressKind,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub is_default: bool,
}

/// Profile management service.
#[derive(Clone)]
pub struct ProfileService {
    storage: Arc<dyn Storage>,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn require_session(&self) -> Result<Session> {
        let session: Option<Session> = self.storage.load(keys::CURRENT_SESSION)?;
        session.ok_or(StoreError::NotAuthenticated)
    }

    /// Run `mutate` against the current user's record and persist the
    /// whole collection.
    fn with_current_user<T>(
        &self,
        session: &Session,
        mutate: impl FnOnce(&mut User) -> Result<T>,
    ) -> Result<T> {
        let mut users: Vec<User> = self.storage.load(keys::USERS)?;
        let user = users
            .iter_mut()
            .find(|user| user.id == session.user.id)
            .ok_or_else(|| StoreError::NotFound("account".to_owned()))?;
        let outcome = mutate(user)?;
        self.storage.store(keys::USERS, &users)?;
        Ok(outcome)
    }

    /// The current user's full record.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or `NotFound` when
    /// the session has no local record.
    pub fn current_user(&self) -> Result<User> {
        let session = self.require_session()?;
        let users: Vec<User> = self.storage.load(keys::USERS)?;
        users
            .into_iter()
            .find(|user| user.id == session.user.id)
            .ok_or_else(|| StoreError::NotFound("account".to_owned()))
    }

    // =========================================================================
    // Personal info
    // =========================================================================

    /// Update name, email, phone, and date of birth, and refresh the
    /// session to match.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank name fields or a malformed
    /// email, and `AlreadyExists` when another account holds the email.
    #[instrument(skip(self, update))]
    pub fn update_personal_info(&self, update: &PersonalInfoUpdate) -> Result<Session> {
        let mut session = self.require_session()?;

        if update.first_name.trim().is_empty() || update.last_name.trim().is_empty() {
            return Err(StoreError::Validation(
                "first and last name are required".to_owned(),
            ));
        }
        let email = Email::parse(&update.email).map_err(AuthError::from)?;

        let mut users: Vec<User> = self.storage.load(keys::USERS)?;
        if users
            .iter()
            .any(|user| user.id != session.user.id && user.email.matches(email.as_ref()))
        {
            return Err(StoreError::AlreadyExists);
        }

        let user = users
            .iter_mut()
            .find(|user| user.id == session.user.id)
            .ok_or_else(|| StoreError::NotFound("account".to_owned()))?;
        user.first_name = update.first_name.clone();
        user.last_name = update.last_name.clone();
        user.email = email;
        user.phone = update.phone.clone();
        user.date_of_birth = update.date_of_birth.clone();

        session.user = user.public_profile();
        self.storage.store(keys::USERS, &users)?;
        self.storage.store(keys::CURRENT_SESSION, &session)?;
        Ok(session)
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when the current password is wrong,
    /// or `WeakPassword` for a too-short replacement.
    #[instrument(skip_all)]
    pub fn change_password(&self, current: &str, new: &str) -> Result<()> {
        let session = self.require_session()?;

        if new.len() < 6 {
            return Err(AuthError::WeakPassword(
                "password must be at least 6 characters".to_owned(),
            )
            .into());
        }

        self.with_current_user(&session, |user| {
            verify_password(current, &user.password_hash)?;
            user.password_hash = hash_password(new)?;
            Ok(())
        })
    }

    // =========================================================================
    // Address book
    // =========================================================================

    /// The current user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or `NotFound` when
    /// the session has no local record.
    pub fn addresses(&self) -> Result<Vec<Address>> {
        Ok(self.current_user()?.addresses)
    }

    /// Add an address. The first address always becomes the default;
    /// adding with `is_default` unsets every other default first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank required fields.
    #[instrument(skip(self, form))]
    pub fn add_address(&self, form: &AddressForm) -> Result<Address> {
        let session = self.require_session()?;
        validate_address(form)?;

        self.with_current_user(&session, |user| {
            let id = ids::unique(ids::address_id, |candidate| {
                user.addresses.iter().any(|address| &address.id == candidate)
            });
            let is_default = form.is_default || user.addresses.is_empty();
            if is_default {
                for address in &mut user.addresses {
                    address.is_default = false;
                }
            }

            let address = Address {
                id,
                kind: form.kind,
                first_name: form.first_name.clone(),
                last_name: form.last_name.clone(),
                street: form.street.clone(),
                street2: form.street2.clone(),
                city: form.city.clone(),
                state: form.state.clone(),
                zip_code: form.zip_code.clone(),
                phone: form.phone.clone(),
                is_default,
            };
            user.addresses.push(address.clone());
            Ok(address)
        })
    }

    /// Replace the fields of an existing address.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown address ID, or a validation
    /// error for blank required fields.
    #[instrument(skip(self, form))]
    pub fn update_address(&self, id: &AddressId, form: &AddressForm) -> Result<()> {
        let session = self.require_session()?;
        validate_address(form)?;

        self.with_current_user(&session, |user| {
            if !user.addresses.iter().any(|address| &address.id == id) {
                return Err(StoreError::NotFound(format!("address {id}")));
            }
            if form.is_default {
                for address in &mut user.addresses {
                    address.is_default = false;
                }
            }
            // Separate passes keep the borrow checker happy while still
            // clearing other defaults before flagging this one.
            if let Some(address) = user.addresses.iter_mut().find(|address| &address.id == id) {
                address.kind = form.kind;
                address.first_name = form.first_name.clone();
                address.last_name = form.last_name.clone();
                address.street = form.street.clone();
                address.street2 = form.street2.clone();
                address.city = form.city.clone();
                address.state = form.state.clone();
                address.zip_code = form.zip_code.clone();
                address.phone = form.phone.clone();
                address.is_default = form.is_default;
            }
            Ok(())
        })
    }

    /// Delete an address. Deleting an absent ID is a no-op; deleting the
    /// default leaves none flagged (lookups fall back to the first).
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or `NotFound` when
    /// the session has no local record.
    pub fn delete_address(&self, id: &AddressId) -> Result<()> {
        let session = self.require_session()?;
        self.with_current_user(&session, |user| {
            user.addresses.retain(|address| &address.id != id);
            Ok(())
        })
    }

    /// Mark one address as the default, unsetting all others.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown address ID.
    pub fn set_default_address(&self, id: &AddressId) -> Result<()> {
        let session = self.require_session()?;
        self.with_current_user(&session, |user| {
            if !user.addresses.iter().any(|address| &address.id == id) {
                return Err(StoreError::NotFound(format!("address {id}")));
            }
            for address in &mut user.addresses {
                address.is_default = &address.id == id;
            }
            Ok(())
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The current user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session.
    pub fn orders(&self) -> Result<Vec<Order>> {
        let session = self.require_session()?;
        let mut orders: Vec<Order> = self.storage.load(keys::ORDERS)?;
        orders.retain(|order| order.user_id.as_ref() == Some(&session.user.id));
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }

    /// IDs of the current user's orders as linked on the record.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or `NotFound` when
    /// the session has no local record.
    pub fn order_ids(&self) -> Result<Vec<OrderId>> {
        Ok(self.current_user()?.orders)
    }

    // =========================================================================
    // Account lifecycle
    // =========================================================================

    /// Soft-deactivate the account and end the session. The record stays;
    /// the next successful login reactivates it.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or `NotFound` when
    /// the session has no local record.
    #[instrument(skip(self))]
    pub fn deactivate_account(&self) -> Result<()> {
        let session = self.require_session()?;
        self.with_current_user(&session, |user| {
            user.is_active = false;
            user.deactivated_at = Some(Utc::now());
            debug!(user = %user.id, "account deactivated");
            Ok(())
        })?;
        self.end_session()
    }

    /// Permanently delete the account record and end the session. Orders
    /// already placed stay in the global collection.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub fn delete_account(&self) -> Result<()> {
        let session = self.require_session()?;

        let mut users: Vec<User> = self.storage.load(keys::USERS)?;
        users.retain(|user| user.id != session.user.id);
        self.storage.store(keys::USERS, &users)?;
        debug!(user = %session.user.id, "account deleted");
        self.end_session()
    }

    fn end_session(&self) -> Result<()> {
        self.storage.remove(keys::CURRENT_SESSION)?;
        self.storage.remove(keys::CART)?;
        self.storage.remove(keys::WISHLIST)?;
        Ok(())
    }

    /// Whether a user record exists for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn user_exists(&self, id: &UserId) -> Result<bool> {
        let users: Vec<User> = self.storage.load(keys::USERS)?;
        Ok(users.iter().any(|user| &user.id == id))
    }
}

fn validate_address(form: &AddressForm) -> Result<()> {
    let required = [
        &form.first_name,
        &form.last_name,
        &form.street,
        &form.city,
        &form.state,
        &form.zip_code,
        &form.phone,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(StoreError::Validation(
            "please fill in all address fields".to_owned(),
        ));
    }
    Ok(())
}
