//! Account role management commands.
//!
//! Signup always creates `user` accounts; the admin role is granted here.
//! A role change applies to tokens issued at the account's next login.
//!
//! # Usage
//!
//! ```bash
//! atelier-cli user promote -e admin@example.com
//! atelier-cli user demote -e admin@example.com
//! ```

use atelier_core::{Email, Role};
use atelier_storefront::db::{self, PgUserStore, RepositoryError, UserRecord, UserStore};
use thiserror::Error;

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur during role changes.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No account with that email.
    #[error("No user found with email: {0}")]
    NotFound(String),
}

/// Set the role of the account with `email`.
pub async fn change_role(
    store: &dyn UserStore,
    email: &str,
    role: Role,
) -> Result<UserRecord, UserError> {
    let parsed = Email::parse(email).map_err(|_| UserError::InvalidEmail(email.to_owned()))?;

    store.set_role(&parsed, role).await.map_err(|e| match e {
        RepositoryError::NotFound => UserError::NotFound(email.to_owned()),
        other => UserError::Repository(other),
    })
}

/// Set an account's role in the catalog database.
pub async fn set_role(email: &str, role: Role) -> Result<(), UserError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&database_url).await?;

    let user = change_role(&PgUserStore::new(pool), email, role).await?;

    tracing::info!(
        "Role updated! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    tracing::info!("The new role applies from the user's next login.");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_storefront::db::MemoryUserStore;

    use super::*;

    #[tokio::test]
    async fn test_change_role() {
        let store = MemoryUserStore::new();
        let email = Email::parse("ada@example.com").unwrap();
        store.create("Ada", &email, "hash").await.unwrap();

        let user = change_role(&store, "ada@example.com", Role::Admin).await.unwrap();
        assert_eq!(user.role, Role::Admin);

        let user = change_role(&store, "ada@example.com", Role::User).await.unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_change_role_errors() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            change_role(&store, "nobody@example.com", Role::Admin).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            change_role(&store, "not-an-email", Role::Admin).await,
            Err(UserError::InvalidEmail(_))
        ));
    }
}
