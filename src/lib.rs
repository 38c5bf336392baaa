//! Multi-site CMS - library for app logic and testing

pub mod blocks;
pub mod composer;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod notice;
pub mod pages;
pub mod routes;
pub mod session;
pub mod store;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use config::AppConfig;
use routes::AppState;
use store::{MemoryStore, PgStore, Store};

/// CORS for the configured admin frontends.
pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);
    tracing::info!(origins = state.config.allowed_origins.len(), "CORS configured");

    let page = "/api/sites/{site_id}/pages/{page_id}";

    Router::new()
        // auth
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::session))
        // users and profile
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/api/users/{user_id}",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/api/users/{user_id}/password",
            put(routes::users::update_password),
        )
        .route(
            "/api/profile",
            get(routes::users::get_profile).patch(routes::users::update_profile),
        )
        // sites
        .route(
            "/api/sites",
            get(routes::sites::list_sites).post(routes::sites::create_site),
        )
        .route(
            "/api/sites/{site_id}",
            get(routes::sites::get_site)
                .patch(routes::sites::update_site)
                .delete(routes::sites::delete_site),
        )
        // site members
        .route(
            "/api/sites/{site_id}/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/api/sites/{site_id}/members/{user_id}",
            patch(routes::members::update_member).delete(routes::members::remove_member),
        )
        // pages
        .route(
            "/api/sites/{site_id}/pages",
            get(routes::pages::list_pages).post(routes::pages::create_page),
        )
        .route(
            page,
            get(routes::pages::get_page)
                .patch(routes::pages::update_page)
                .delete(routes::pages::delete_page),
        )
        .route(&format!("{page}/blocks"), put(routes::pages::save_blocks))
        .route(&format!("{page}/preview"), get(routes::pages::preview_page))
        // editor sessions
        .route(
            &format!("{page}/editor"),
            get(routes::editor::get_editor)
                .post(routes::editor::open_editor)
                .delete(routes::editor::close_editor),
        )
        .route(
            &format!("{page}/editor/actions"),
            post(routes::editor::dispatch_action),
        )
        .route(&format!("{page}/editor/save"), post(routes::editor::save_editor))
        // catalog
        .route("/api/templates", get(routes::catalog::list_page_templates))
        .route("/api/blocks/catalog", get(routes::catalog::block_catalog))
        .route("/api/blocks/render", post(routes::catalog::render_block))
        .route("/api/blocks/form", post(routes::catalog::block_form))
        .route("/api/blocks/edit", post(routes::catalog::edit_block))
        // leads
        .route(
            "/api/sites/{site_id}/lead-settings",
            get(routes::leads::get_lead_settings).put(routes::leads::update_lead_settings),
        )
        .route(
            "/api/sites/{site_id}/leads",
            get(routes::leads::list_leads).post(routes::leads::submit_lead),
        )
        .route(
            "/api/leads/{lead_id}/status",
            patch(routes::leads::update_lead_status),
        )
        // public pages
        .route("/sites/{site_id}/p/{slug}", get(routes::public::show_page))
        // health
        .route("/health", get(routes::health::health_ping))
        .route("/health/ready", get(routes::health::health_ready))
        .route("/health/detailed", get(routes::health::health_detailed))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Pick the content store: Postgres when configured and reachable, the
/// in-memory store otherwise.
async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, config::ConfigError> {
    let admin_hash = config.admin_password_hash()?;

    let Some(db) = config.database.as_ref() else {
        tracing::info!("DATABASE_URL not set. Running on the in-memory store.");
        return Ok(Arc::new(
            MemoryStore::with_admin(&config.admin_email, &admin_hash).await,
        ));
    };

    match db::init_pool(db).await {
        Ok(pool) => {
            if let Err(e) = db::run_migrations(&pool).await {
                tracing::error!(error = %e, "failed to run database migrations");
            }
            let store = PgStore::new(pool);
            if let Err(e) = store.ensure_admin(&config.admin_email, &admin_hash).await {
                tracing::error!(error = %e, "failed to seed admin account");
            }
            Ok(Arc::new(store))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                url = %db.redacted_url(),
                "failed to initialize database pool, continuing on the in-memory store"
            );
            Ok(Arc::new(
                MemoryStore::with_admin(&config.admin_email, &admin_hash).await,
            ))
        }
    }
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Guards must outlive the server or buffered log lines are lost.
    let _log_guards = logging::init(&config.environment);

    routes::health::init_start_time();

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "refusing to start");
        return;
    }
    let addr: SocketAddr = match config.bind_address() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "refusing to start");
            return;
        }
    };

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "failed to prepare the content store");
            return;
        }
    };
    tracing::info!(backend = store.backend(), "content store ready");

    let app = create_app(AppState::new(store, config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };
    tracing::info!("Starting server on {}", addr);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %e, "server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (app, _, _) = app().await;
        let (status, _) = send(&app, "GET", "/api/nothing-here", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let (app, _, _) = app().await;
        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let (app, _, _) = app().await;
        let res = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/sites")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "PUT")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            res.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_in_memory_store_without_database() {
        let config = AppConfig {
            admin_password: config::AdminPassword::Hashed(bcrypt::hash("x", 4).unwrap()),
            ..AppConfig::default()
        };
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert!(store
            .find_user_by_email(&config.admin_email)
            .await
            .unwrap()
            .is_some());
    }
}
