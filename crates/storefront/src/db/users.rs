//! `PostgreSQL` account store.

use async_trait::async_trait;
use sqlx::PgPool;

use atelier_core::{Email, Role, UserId};

use super::{RepositoryError, UserRecord, UserStore};

/// Raw `catalog.user` row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    role: Role,
    password_hash: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            role: row.role,
            password_hash: row.password_hash,
        })
    }
}

/// Account store backed by `catalog.user`.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email, role, password_hash
            FROM catalog.user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email, role, password_hash
            FROM catalog.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserRecord, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO catalog.user (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, role, password_hash
            ",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email already exists"))?;

        UserRecord::try_from(row)
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<UserRecord, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            UPDATE catalog.user
            SET role = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING id, name, email, role, password_hash
            ",
        )
        .bind(email.as_str())
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), UserRecord::try_from)
    }
}
