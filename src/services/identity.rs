//! Postgres-backed identity provider: `admin_accounts` rows, argon2id
//! passwords and HS256 ID tokens.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::DashboardError;
use crate::models::account::{Account, AuthUser};
use crate::services::auth::{
    mint_id_token, validate_id_token, verify_password, AuthStateRegistry, AuthSubscription,
    IdTokenResult, IdentityProvider,
};

/// The signed-in account and its most recent ID token.
#[derive(Debug, Clone)]
struct Session {
    user: AuthUser,
    id_token: String,
}

pub struct PgIdentityProvider {
    pool: PgPool,
    jwt_secret: String,
    token_expiry_secs: i64,
    registry: Arc<AuthStateRegistry>,
    session: Mutex<Option<Session>>,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool, jwt_secret: String, token_expiry_secs: i64) -> Self {
        Self {
            pool,
            jwt_secret,
            token_expiry_secs,
            registry: AuthStateRegistry::new(),
            session: Mutex::new(None),
        }
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, DashboardError> {
        sqlx::query_as::<_, Account>("SELECT * FROM admin_accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DashboardError::ProviderError(format!("Account lookup failed: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    fn on_auth_state_changed(&self) -> Result<AuthSubscription, DashboardError> {
        if self.pool.is_closed() {
            return Err(DashboardError::AuthUnavailable);
        }
        Ok(self.registry.subscribe())
    }

    async fn get_id_token_result(
        &self,
        user: &AuthUser,
        force_refresh: bool,
    ) -> Result<IdTokenResult, DashboardError> {
        let mut session = self.session.lock().await;
        let current = session
            .as_ref()
            .filter(|s| s.user.uid == user.uid)
            .ok_or_else(|| DashboardError::ProviderError("No active session".to_string()))?;

        if !force_refresh {
            if let Ok(claims) = validate_id_token(&current.id_token, &self.jwt_secret) {
                return Ok(IdTokenResult {
                    token: current.id_token.clone(),
                    claims,
                });
            }
        }

        // Re-read the account so revoked or disabled accounts lose the claim.
        let account = self
            .find_account(user.uid)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| {
                DashboardError::ProviderError("Account disabled or removed".to_string())
            })?;

        let token = mint_id_token(&account, &self.jwt_secret, self.token_expiry_secs)?;
        let claims = validate_id_token(&token, &self.jwt_secret)?;
        tracing::debug!(uid = %account.id, admin = ?claims.admin, "ID token refreshed");

        *session = Some(Session {
            user: user.clone(),
            id_token: token.clone(),
        });

        Ok(IdTokenResult { token, claims })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, DashboardError> {
        let account =
            sqlx::query_as::<_, Account>("SELECT * FROM admin_accounts WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DashboardError::ProviderError(format!("Account lookup failed: {e}")))?
                .ok_or(DashboardError::InvalidCredentials)?;

        if !account.is_active || !verify_password(password, &account.password_hash)? {
            tracing::warn!(email = %email, "Rejected sign-in");
            return Err(DashboardError::InvalidCredentials);
        }

        let id_token = mint_id_token(&account, &self.jwt_secret, self.token_expiry_secs)?;
        let user = AuthUser::from(&account);

        *self.session.lock().await = Some(Session {
            user: user.clone(),
            id_token,
        });
        tracing::info!(uid = %user.uid, "User signed in");
        self.registry.publish(Some(user.clone()));

        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), DashboardError> {
        let previous = self.session.lock().await.take();
        if let Some(session) = previous {
            tracing::info!(uid = %session.user.uid, "User signed out");
        }
        self.registry.publish(None);
        Ok(())
    }
}
