use std::time::Duration;

use sqlx::PgPool;
use tokio::time::timeout;

use crate::models::admin_user::AdminUser;
use crate::services::session::CredentialStore;
use crate::services::StoreError;

/// Credential lookups are bound to this deadline so a wedged database
/// cannot hold a login or refresh open; the caller sees a store failure
/// and no session state is produced.
const STORE_DEADLINE: Duration = Duration::from_secs(3);

const ADMIN_USER_COLS: &str =
    "id, first_name, last_name, email, password_hash, activated, created_at, version";

/// Postgres-backed credential store for admin users.
#[derive(Clone)]
pub struct PgAdminUsers {
    pool: PgPool,
}

impl PgAdminUsers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new admin user. A duplicate email surfaces as its own
    /// error so handlers can report it as a field-level message.
    pub async fn insert(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminUser, StoreError> {
        let query = format!(
            "INSERT INTO admin_users (first_name, last_name, email, password_hash, activated)
             VALUES ($1, $2, $3, $4, FALSE)
             RETURNING {ADMIN_USER_COLS}"
        );

        sqlx::query_as::<_, AdminUser>(&query)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.constraint() == Some("admin_users_email_key") => {
                    StoreError::DuplicateEmail
                }
                _ => StoreError::Database(e),
            })
    }
}

impl CredentialStore for PgAdminUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        let query = format!("SELECT {ADMIN_USER_COLS} FROM admin_users WHERE email = $1");
        let lookup = sqlx::query_as::<_, AdminUser>(&query)
            .bind(email)
            .fetch_optional(&self.pool);

        match timeout(STORE_DEADLINE, lookup).await {
            Ok(result) => result.map_err(StoreError::Database),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminUser>, StoreError> {
        let query = format!("SELECT {ADMIN_USER_COLS} FROM admin_users WHERE id = $1");
        let lookup = sqlx::query_as::<_, AdminUser>(&query)
            .bind(id)
            .fetch_optional(&self.pool);

        match timeout(STORE_DEADLINE, lookup).await {
            Ok(result) => result.map_err(StoreError::Database),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}
