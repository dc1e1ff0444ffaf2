// Library exports for the api binary and tests
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod validation;

use std::sync::Arc;

use sqlx::PgPool;

use config::Config;
use services::admin_users::PgAdminUsers;
use services::session::SessionService;
use services::storage::FileStorage;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub storage: FileStorage,
    pub admin_users: PgAdminUsers,
    pub sessions: SessionService<PgAdminUsers>,
}
