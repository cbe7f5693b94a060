//! Authentication service.
//!
//! Login and signup try the remote backend first when one is configured
//! and fall back to the local user collection on any remote failure, with
//! one exception: a remote "email already in use" rejection on signup is
//! terminal, because creating the account locally anyway would fork the
//! identity. Local passwords are stored as Argon2id hashes only.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use tracing::{debug, instrument, warn};

use greencart_core::{Email, UserId};

use crate::api::{ApiClient, AuthResponse, SignupRequest};
use crate::error::Result;
use crate::models::{Address, AddressKind, Session, SessionUser, User};
use crate::services::ids;
use crate::storage::{Storage, StorageExt, keys};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Fields collected by the signup form.
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

/// Authentication service.
///
/// Handles login, signup, logout, and the current-session record.
#[derive(Clone)]
pub struct AuthService {
    storage: Arc<dyn Storage>,
    remote: Option<ApiClient>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, remote: Option<ApiClient>) -> Self {
        Self { storage, remote }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login with email and password, remote first, local fallback.
    ///
    /// A successful login starts (and persists) a new session. Logging
    /// into a deactivated local account reactivates it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid,
    /// or `AuthError::InvalidCredentials` if neither the remote backend
    /// nor the local collection accepts the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = Email::parse(email).map_err(AuthError::from)?;

        if let Some(remote) = &self.remote {
            match remote.login(email.as_ref(), password).await {
                Ok(auth) => {
                    let session = self.start_remote_session(&auth, &email)?;
                    return Ok(session);
                }
                Err(err) => {
                    warn!(error = %err, "remote login failed, falling back to local accounts");
                }
            }
        }

        self.login_local(&email, password)
    }

    fn login_local(&self, email: &Email, password: &str) -> Result<Session> {
        let mut users: Vec<User> = self.storage.load(keys::USERS)?;

        let user = users
            .iter_mut()
            .find(|user| user.email.matches(email.as_ref()))
            .filter(|user| verify_password(password, &user.password_hash).is_ok())
            .ok_or(AuthError::InvalidCredentials)?;

        let reactivated = !user.is_active;
        if reactivated {
            user.is_active = true;
            user.deactivated_at = None;
            debug!(user = %user.id, "reactivated account on login");
        }

        let session = Session::start(user.public_profile(), None);
        if reactivated {
            self.storage.store(keys::USERS, &users)?;
        }
        self.storage.store(keys::CURRENT_SESSION, &session)?;
        Ok(session)
    }

    fn start_remote_session(&self, auth: &AuthResponse, email: &Email) -> Result<Session> {
        let user = SessionUser {
            id: auth.id.clone().map_or_else(ids::user_id, UserId::new),
            first_name: auth.first_name.clone().unwrap_or_default(),
            last_name: auth.last_name.clone().unwrap_or_default(),
            email: auth
                .email
                .as_deref()
                .and_then(|echoed| Email::parse(echoed).ok())
                .unwrap_or_else(|| email.clone()),
            phone: auth.phone.clone().unwrap_or_default(),
        };
        let session = Session::start(user, Some(auth.token.clone()));
        self.storage.store(keys::CURRENT_SESSION, &session)?;
        Ok(session)
    }

    // =========================================================================
    // Signup
    // =========================================================================

    /// Register a new account, remote first, local fallback.
    ///
    /// Validation runs before any network call or mutation. A remote
    /// success does not create a local user record; a remote
    /// "already in use" rejection is terminal.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] for blank fields, a malformed email, a
    /// short or mismatched password, or an email that is already taken.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn signup(&self, form: &SignupForm) -> Result<Session> {
        let email = validate_signup(form)?;

        if let Some(remote) = &self.remote {
            let request = SignupRequest {
                first_name: form.first_name.clone(),
                last_name: form.last_name.clone(),
                email: email.as_ref().to_owned(),
                phone: form.phone.clone(),
                password: form.password.clone(),
            };
            match remote.signup(&request).await {
                Ok(auth) => {
                    let session = self.start_remote_session(&auth, &email)?;
                    return Ok(session);
                }
                Err(err) if err.is_already_exists() => {
                    return Err(AuthError::UserAlreadyExists.into());
                }
                Err(err) => {
                    warn!(error = %err, "remote signup failed, falling back to local account");
                }
            }
        }

        self.signup_local(form, &email)
    }

    fn signup_local(&self, form: &SignupForm, email: &Email) -> Result<Session> {
        let mut users: Vec<User> = self.storage.load(keys::USERS)?;

        if users.iter().any(|user| user.email.matches(email.as_ref())) {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let id = ids::unique(ids::user_id, |candidate| {
            users.iter().any(|user| &user.id == candidate)
        });
        let user = User {
            id,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: email.clone(),
            phone: form.phone.clone(),
            password_hash: hash_password(&form.password)?,
            created_at: Utc::now(),
            date_of_birth: None,
            addresses: Vec::new(),
            orders: Vec::new(),
            is_active: true,
            deactivated_at: None,
        };

        let session = Session::start(user.public_profile(), None);
        users.push(user);
        self.storage.store(keys::USERS, &users)?;
        self.storage.store(keys::CURRENT_SESSION, &session)?;
        Ok(session)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// End the current session, clearing session, cart, and wishlist.
    ///
    /// The remote logout is best effort: a failure is logged and does not
    /// block the local teardown. Logging out with no session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if the persistence adapter fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let session: Option<Session> = self.storage.load(keys::CURRENT_SESSION)?;

        let token = session.as_ref().and_then(|session| session.token.as_deref());
        if let (Some(remote), Some(token)) = (&self.remote, token) {
            if let Err(err) = remote.logout(token).await {
                warn!(error = %err, "remote logout failed, clearing local session anyway");
            }
        }

        self.storage.remove(keys::CURRENT_SESSION)?;
        self.storage.remove(keys::CART)?;
        self.storage.remove(keys::WISHLIST)?;
        Ok(())
    }

    /// The current session, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence adapter fails.
    pub fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.storage.load(keys::CURRENT_SESSION)?)
    }

    /// The current session, or `NotAuthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotAuthenticated` when no session exists.
    pub fn require_session(&self) -> Result<Session> {
        self.current_session()?
            .ok_or(crate::error::StoreError::NotAuthenticated)
    }

    // =========================================================================
    // Demo data
    // =========================================================================

    /// Seed two demo accounts (password `password123`) when the local
    /// user collection is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or the persistence adapter fails.
    pub fn seed_demo_users(&self) -> Result<()> {
        let users: Vec<User> = self.storage.load(keys::USERS)?;
        if !users.is_empty() {
            return Ok(());
        }

        let password_hash = hash_password("password123")?;
        let john = User {
            id: UserId::new("user_demo_1"),
            first_name: "John".to_owned(),
            last_name: "Doe".to_owned(),
            email: Email::parse("john@example.com").map_err(AuthError::from)?,
            phone: "+1234567890".to_owned(),
            password_hash: password_hash.clone(),
            created_at: Utc::now(),
            date_of_birth: None,
            addresses: vec![Address {
                id: greencart_core::AddressId::new("addr_1"),
                kind: AddressKind::Home,
                first_name: "John".to_owned(),
                last_name: "Doe".to_owned(),
                street: "123 Main St".to_owned(),
                street2: String::new(),
                city: "New York".to_owned(),
                state: "NY".to_owned(),
                zip_code: "10001".to_owned(),
                phone: "+1234567890".to_owned(),
                is_default: true,
            }],
            orders: Vec::new(),
            is_active: true,
            deactivated_at: None,
        };
        let jane = User {
            id: UserId::new("user_demo_2"),
            first_name: "Jane".to_owned(),
            last_name: "Smith".to_owned(),
            email: Email::parse("jane@example.com").map_err(AuthError::from)?,
            phone: "+0987654321".to_owned(),
            password_hash,
            created_at: Utc::now(),
            date_of_birth: None,
            addresses: Vec::new(),
            orders: Vec::new(),
            is_active: true,
            deactivated_at: None,
        };

        self.storage.store(keys::USERS, &vec![john, jane])?;
        debug!("seeded demo users");
        Ok(())
    }
}

fn validate_signup(form: &SignupForm) -> std::result::Result<Email, AuthError> {
    for (value, name) in [
        (&form.first_name, "firstName"),
        (&form.last_name, "lastName"),
        (&form.email, "email"),
        (&form.phone, "phone"),
        (&form.password, "password"),
    ] {
        if value.trim().is_empty() {
            return Err(AuthError::MissingField(name));
        }
    }

    let email = Email::parse(&form.email)?;
    validate_password(&form.password)?;
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(email)
}

fn validate_password(password: &str) -> std::result::Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> std::result::Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> std::result::Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::CartItem;
    use crate::storage::MemoryStorage;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStorage::default()), None)
    }

    fn form(email: &str) -> SignupForm {
        SignupForm {
            first_name: "Alice".to_owned(),
            last_name: "Jones".to_owned(),
            email: email.to_owned(),
            phone: "+1112223333".to_owned(),
            password: "secret99".to_owned(),
            confirm_password: "secret99".to_owned(),
        }
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(verify_password("hunter23", &hash).is_err());
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let auth = service();
        let session = auth.signup(&form("alice@example.com")).await.unwrap();
        assert_eq!(session.user.email.as_ref(), "alice@example.com");
        assert!(session.token.is_none());

        let session = auth.login("ALICE@example.com", "secret99").await.unwrap();
        assert_eq!(session.user.first_name, "Alice");
        assert!(auth.current_session().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let auth = service();
        auth.signup(&form("alice@example.com")).await.unwrap();

        let result = auth.signup(&form("Alice@Example.com")).await;
        assert!(matches!(
            result,
            Err(StoreError::Auth(AuthError::UserAlreadyExists))
        ));
    }

    #[tokio::test]
    async fn test_signup_validation_blocks_before_mutation() {
        let auth = service();

        let mut blank = form("alice@example.com");
        blank.first_name = "  ".to_owned();
        assert!(matches!(
            auth.signup(&blank).await,
            Err(StoreError::Auth(AuthError::MissingField("firstName")))
        ));

        let mut short = form("alice@example.com");
        short.password = "abc".to_owned();
        short.confirm_password = "abc".to_owned();
        assert!(matches!(
            auth.signup(&short).await,
            Err(StoreError::Auth(AuthError::WeakPassword(_)))
        ));

        let mut mismatch = form("alice@example.com");
        mismatch.confirm_password = "different".to_owned();
        assert!(matches!(
            auth.signup(&mismatch).await,
            Err(StoreError::Auth(AuthError::PasswordMismatch))
        ));

        // None of the failures should have created a user.
        let users: Vec<User> = auth.storage.load(keys::USERS).unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = service();
        auth.signup(&form("alice@example.com")).await.unwrap();

        let result = auth.login("alice@example.com", "wrong999").await;
        assert!(matches!(
            result,
            Err(StoreError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_login_reactivates_deactivated_account() {
        let auth = service();
        auth.signup(&form("alice@example.com")).await.unwrap();

        let mut users: Vec<User> = auth.storage.load(keys::USERS).unwrap();
        users[0].is_active = false;
        users[0].deactivated_at = Some(Utc::now());
        auth.storage.store(keys::USERS, &users).unwrap();

        auth.login("alice@example.com", "secret99").await.unwrap();

        let users: Vec<User> = auth.storage.load(keys::USERS).unwrap();
        assert!(users[0].is_active);
        assert!(users[0].deactivated_at.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session_cart_and_wishlist() {
        let auth = service();
        auth.signup(&form("alice@example.com")).await.unwrap();
        auth.storage
            .store(keys::CART, &vec![serde_json::json!({"productId": 1})])
            .unwrap();

        auth.logout().await.unwrap();

        assert!(auth.current_session().unwrap().is_none());
        let cart: Vec<CartItem> = auth.storage.load(keys::CART).unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_demo_users_seed_once() {
        let auth = service();
        auth.seed_demo_users().unwrap();
        auth.seed_demo_users().unwrap();

        let users: Vec<User> = auth.storage.load(keys::USERS).unwrap();
        assert_eq!(users.len(), 2);

        let session = auth.login("john@example.com", "password123").await.unwrap();
        assert_eq!(session.user.full_name(), "John Doe");
    }
}
