//! Authentication gateway: identity provider seam, auth-state subscriptions,
//! password hashing and ID token minting/validation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::errors::DashboardError;
use crate::models::account::{Account, AuthUser};

/// Current user as seen by an auth-state event; `None` means signed out.
pub type AuthState = Option<AuthUser>;

/// Claims carried by an ID token. `admin` is the custom capability claim and
/// is only present on tokens minted for admin accounts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IdTokenClaims {
    pub sub: String,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    pub exp: i64,
    pub iat: i64,
}

/// Result of a token fetch: the encoded token and its decoded claims.
#[derive(Debug, Clone)]
pub struct IdTokenResult {
    pub token: String,
    pub claims: IdTokenClaims,
}

/// The external identity provider boundary.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register for auth-state changes. The current state is delivered first.
    fn on_auth_state_changed(&self) -> Result<AuthSubscription, DashboardError>;

    /// Return the user's ID token, minting a fresh one when `force_refresh`.
    async fn get_id_token_result(
        &self,
        user: &AuthUser,
        force_refresh: bool,
    ) -> Result<IdTokenResult, DashboardError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DashboardError>;

    async fn sign_out(&self) -> Result<(), DashboardError>;
}

/// Thin wrapper over the identity provider used by the dashboard.
///
/// Holds no cached capability: every admin check goes back to the provider
/// with a forced refresh.
#[derive(Clone)]
pub struct AuthGateway {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub fn subscribe(&self) -> Result<AuthSubscription, DashboardError> {
        self.provider.on_auth_state_changed()
    }

    /// Whether a freshly refreshed token for `user` carries `admin = true`.
    ///
    /// A missing claim is `Ok(false)`; a failed refresh is `ProviderError`.
    pub async fn check_admin_capability(&self, user: &AuthUser) -> Result<bool, DashboardError> {
        let token = self
            .provider
            .get_id_token_result(user, true)
            .await
            .map_err(|e| match e {
                DashboardError::ProviderError(_) => e,
                other => DashboardError::ProviderError(other.to_string()),
            })?;
        Ok(token.claims.admin.unwrap_or(false))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DashboardError> {
        self.provider.sign_in(email, password).await
    }

    pub async fn sign_out(&self) -> Result<(), DashboardError> {
        self.provider.sign_out().await
    }
}

/// Fan-out of auth-state changes to subscribers, shared by provider
/// implementations. Each subscriber gets events in publish order.
#[derive(Debug, Default)]
pub struct AuthStateRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    current: AuthState,
    subscribers: Vec<(u64, mpsc::UnboundedSender<AuthState>)>,
}

impl AuthStateRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(self: &Arc<Self>) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        // Queued under the lock so no later publish can overtake it.
        let _ = tx.send(inner.current.clone());
        inner.subscribers.push((id, tx));
        AuthSubscription {
            id,
            events: rx,
            registry: Arc::downgrade(self),
        }
    }

    /// Record the new state and deliver it to every live subscriber.
    pub fn publish(&self, state: AuthState) {
        let mut inner = self.lock();
        inner.current = state.clone();
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(state.clone()).is_ok());
    }

    pub fn current(&self) -> AuthState {
        self.lock().current.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn remove(&self, id: u64) {
        self.lock().subscribers.retain(|(sub_id, _)| *sub_id != id);
    }
}

/// Ordered stream of auth-state events. Dropping it unsubscribes.
#[derive(Debug)]
pub struct AuthSubscription {
    id: u64,
    events: mpsc::UnboundedReceiver<AuthState>,
    registry: Weak<AuthStateRegistry>,
}

impl AuthSubscription {
    /// Next event, or `None` once the provider is gone.
    pub async fn next(&mut self) -> Option<AuthState> {
        self.events.recv().await
    }

    /// True when a newer event is already queued behind the one in hand.
    pub fn is_superseded(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, DashboardError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DashboardError::ProviderError(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, DashboardError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| DashboardError::ProviderError(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Mint an ID token for an account, embedding the admin claim from the
/// account's current state.
pub fn mint_id_token(
    account: &Account,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<String, DashboardError> {
    let now = Utc::now();
    let claims = IdTokenClaims {
        sub: account.id.to_string(),
        email: Some(account.email.clone()),
        admin: account.is_admin.then_some(true),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| DashboardError::ProviderError(format!("Token generation failed: {e}")))
}

/// Validate an ID token and return its claims.
pub fn validate_id_token(token: &str, jwt_secret: &str) -> Result<IdTokenClaims, DashboardError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<IdTokenClaims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| DashboardError::ProviderError(format!("Token rejected: {e}")))
}
