use sqlx::FromRow;

/// Row of the `users` table. Created at registration, read at login.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
