use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::User;

/// Lookups only ever see active accounts; a deactivated or absent user is a
/// plain `None`, not an error.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1 AND is_active")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND is_active")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    full_name: &str,
    role: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, full_name, role, password_hash)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(username)
    .bind(email)
    .bind(full_name)
    .bind(role)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

#[derive(Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
    }
}

/// Apply only the supplied fields. An empty patch is a plain re-read and does
/// not touch `updated_at`.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: &UserPatch,
) -> Result<Option<User>, sqlx::Error> {
    if patch.is_empty() {
        return find_by_id(pool, id).await;
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut set = qb.separated(", ");
    if let Some(username) = &patch.username {
        set.push("username = ").push_bind_unseparated(username.clone());
    }
    if let Some(email) = &patch.email {
        set.push("email = ").push_bind_unseparated(email.clone());
    }
    if let Some(full_name) = &patch.full_name {
        set.push("full_name = ").push_bind_unseparated(full_name.clone());
    }
    if let Some(role) = &patch.role {
        set.push("role = ").push_bind_unseparated(role.clone());
    }
    set.push("updated_at = now()");

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND is_active RETURNING *");

    qb.build_query_as::<User>().fetch_optional(pool).await
}

/// Flip the active flag. Returns false when the account was already inactive
/// or never existed; deactivation is idempotent, not an error.
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET is_active = FALSE, updated_at = now()
         WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
