//! Username/password accounts and the login session.
//!
//! Anonymous → authenticated on login (session id cycled, user stored in the
//! session) → anonymous again on logout (session flushed).

pub mod handlers;
pub mod password;
pub mod store;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use thiserror::Error;
use tower_sessions::{cookie::Key, Session};
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::store::UserStore;
use crate::models::user::User;

pub const SESSION_USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Registration is unavailable")]
    RegistrationClosed,

    #[error("{0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

impl AuthError {
    /// Whether the message is meant for the person filling in the form.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, AuthError::Hash(_) | AuthError::Store(_))
    }
}

/// What the session remembers about a logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Signing key for session cookies, derived from `SECRET_KEY`.
///
/// Without a secret the key is random, so sessions do not survive a restart.
pub fn session_key(secret: Option<&str>) -> Key {
    let material = match secret {
        Some(secret) => secret.to_string(),
        None => {
            tracing::warn!("SECRET_KEY not set; sessions will not survive a restart");
            format!("{}{}", Uuid::new_v4(), Uuid::new_v4())
        }
    };
    let digest = Sha512::digest(material.as_bytes());
    Key::from(digest.as_slice())
}

/// Validates the form and creates the account.
pub async fn register_user(
    store: &dyn UserStore,
    allow_registration: bool,
    form: &RegistrationForm,
) -> Result<User, AuthError> {
    if !allow_registration {
        return Err(AuthError::RegistrationClosed);
    }
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    if store.find_by_username(username).await?.is_some() {
        return Err(AuthError::UsernameTaken);
    }

    let password_hash = hash_password_blocking(&form.password).await?;
    store.create(username, &password_hash).await
}

/// Checks credentials. Unknown users and wrong passwords look the same.
pub async fn authenticate(store: &dyn UserStore, form: &LoginForm) -> Result<User, AuthError> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let user = store
        .find_by_username(username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if verify_password_blocking(&form.password, &user.password_hash).await? {
        Ok(user)
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Extractor for routes that need a logged-in user; redirects to `/login` otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/login"))?;

        match session.get::<SessionUser>(SESSION_USER_KEY).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(Redirect::to("/login")),
            Err(e) => {
                tracing::warn!("Unreadable session, treating as anonymous: {e}");
                Err(Redirect::to("/login"))
            }
        }
    }
}
