//! User persistence. Postgres in normal operation; an in-memory store seeded
//! with one demo account when the database cannot be reached at startup.

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::password::hash_password;
use super::AuthError;
use crate::models::user::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend label for health output and logs.
    fn backend(&self) -> &'static str;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Inserts a user; `AuthError::UsernameTaken` if the name already exists.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AuthError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgUserStore
// ────────────────────────────────────────────────────────────────────────────

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AuthError> {
        // The UNIQUE constraint settles races between concurrent registrations.
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::UsernameTaken)
            }
            Err(e) => Err(AuthError::Store(e)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryUserStore
// ────────────────────────────────────────────────────────────────────────────

/// Process-local user list. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    /// Store holding a single account, used when Postgres is unavailable.
    pub fn with_account(username: &str, password: &str) -> Result<Self, AuthError> {
        let user = User {
            id: 1,
            username: username.to_string(),
            password_hash: hash_password(password)?,
        };
        Ok(Self {
            users: RwLock::new(vec![user]),
        })
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(AuthError::UsernameTaken);
        }
        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id: next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[tokio::test]
    async fn test_demo_account_is_seeded_and_hashed() {
        let store = MemoryUserStore::with_account("demo", "demo123").unwrap();
        let user = store.find_by_username("demo").await.unwrap().unwrap();

        assert_eq!(user.id, 1);
        assert_ne!(user.password_hash, "demo123");
        assert!(verify_password("demo123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryUserStore::default();
        let first = store.create("ana", "h1").await.unwrap();
        let second = store.create("ben", "h2").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn test_create_duplicate_is_rejected() {
        let store = MemoryUserStore::default();
        store.create("ana", "h1").await.unwrap();

        assert!(matches!(
            store.create("ana", "h2").await,
            Err(AuthError::UsernameTaken)
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let store = MemoryUserStore::default();
        store.create("Ana", "h").await.unwrap();
        assert!(store.find_by_username("ana").await.unwrap().is_none());
    }
}
