use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::{LoginRequest, RegisterRequest};
use super::jwt::JwtKeys;
use super::password;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{NewUser, User, UserStore};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration, login and token-to-identity resolution over an injected
/// store and key set. Request-scoped and stateless between calls.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone(), JwtKeys::from_ref(state))
    }
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<(User, String), ApiError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_lowercase();
        let first_name = req.first_name.trim().to_string();
        let last_name = req.last_name.trim().to_string();

        if username.is_empty()
            || email.is_empty()
            || req.password.is_empty()
            || first_name.is_empty()
            || last_name.is_empty()
        {
            return Err(ApiError::Validation("All fields are required".into()));
        }
        if !is_valid_email(&email) {
            warn!(%email, "invalid email");
            return Err(ApiError::Validation("Invalid email".into()));
        }
        if username.len() < MIN_USERNAME_LEN {
            return Err(ApiError::Validation(
                "Username must be at least 3 characters".into(),
            ));
        }
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }

        // Advisory pre-checks for early feedback; the store's unique index
        // is the authority and the insert below may still race past these.
        if self.store.find_by_email(&email).await?.is_some() {
            warn!(%email, "email already registered");
            return Err(ApiError::DuplicateCredential);
        }
        if self.store.find_by_username(&username).await?.is_some() {
            warn!(%username, "username already taken");
            return Err(ApiError::DuplicateCredential);
        }

        let plain = req.password;
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .map_err(|e| ApiError::Internal(e.into()))??;

        let user = self
            .store
            .insert(NewUser {
                username,
                email,
                password_hash,
                first_name,
                last_name,
            })
            .await?;

        let token = self.keys.issue(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok((user, token))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<(User, String), ApiError> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || req.password.is_empty() {
            return Err(ApiError::Validation("Email and password are required".into()));
        }

        let Some(user) = self.store.find_by_email(&email).await? else {
            warn!(%email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        let plain = req.password;
        let hash = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.keys.issue(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok((user, token))
    }

    /// Verify a presented token and resolve its claim to a live user. A user
    /// deleted after issuance is reported exactly like a bad signature.
    pub async fn resolve_token(&self, token: &str) -> Result<User, ApiError> {
        let claims = self.keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::InvalidToken
        })?;
        match self.store.find_by_id(claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                Err(ApiError::InvalidToken)
            }
        }
    }
}
