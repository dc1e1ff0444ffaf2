use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use galeria_api::config::Config;
use galeria_api::db;
use galeria_api::routes;
use galeria_api::services::admin_users::PgAdminUsers;
use galeria_api::services::cookies::RefreshCookie;
use galeria_api::services::session::SessionService;
use galeria_api::services::storage::FileStorage;
use galeria_api::services::tokens::TokenService;
use galeria_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connection pool established and migrations applied");

    let storage = FileStorage::new(&config.storage_dir, &config.app_base_url);

    let tokens = TokenService::new(config.clone());
    let admin_users = PgAdminUsers::new(pool.clone());
    let sessions = SessionService::new(
        admin_users.clone(),
        tokens.clone(),
        RefreshCookie::new(config.clone()),
    );

    let state = AppState {
        db: pool,
        config: config.clone(),
        storage,
        admin_users,
        sessions,
    };

    let origins: Vec<HeaderValue> = config
        .cors_trusted_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        // the refresh cookie must survive cross-origin requests
        .allow_credentials(true)
        .allow_origin(AllowOrigin::list(origins));

    let app = Router::new()
        .route("/v1/healthcheck", get(routes::health::healthcheck))
        // Session
        .route("/v1/tokens/authentication", post(routes::auth::authenticate))
        .route("/v1/tokens/refresh", get(routes::auth::refresh_token))
        .route("/v1/tokens/logout", get(routes::auth::logout))
        // Categories
        .route(
            "/v1/categories",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route(
            "/v1/categories/{id}",
            get(routes::categories::show_category)
                .patch(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        )
        // Items
        .route(
            "/v1/items",
            get(routes::items::list_items).post(routes::items::create_item),
        )
        .route("/v1/items_multipart", post(routes::items::multipart_create_item))
        .route(
            "/v1/items/{id}",
            get(routes::items::show_item)
                .patch(routes::items::update_item)
                .delete(routes::items::delete_item),
        )
        // Admin users
        .route("/v1/admin_users", post(routes::admin_users::create_admin_user))
        // Attachment files
        .route("/v1/files/{key}", get(routes::files::serve_file))
        .layer(axum::Extension(tokens))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Attachment uploads are capped at 10 MB
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("galeria API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
