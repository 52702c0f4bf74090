//! # caredesk: Patient records API
//!
//! `caredesk` is a multi-tenant HTTP API for a small clinic back office. Registered users keep
//! their own patient records, share a common doctor directory, and assign doctors to their
//! patients.
//!
//! ## Overview
//!
//! Every user only ever sees the patients they created. Doctors are global: any authenticated
//! user may read and edit the directory. A mapping links one patient to one doctor and belongs,
//! through its patient, to the patient's owner. Asking for someone else's patient or mapping
//! answers 404, exactly as if it did not exist.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL (through `sqlx`) for all persistence.
//!
//! ### Request Flow
//!
//! A request to `/api/*` reaches its handler in [`api::handlers`]. Protected handlers take a
//! [`CurrentUser`](api::models::users::CurrentUser) argument, which is resolved from the
//! `Authorization: Bearer <access token>` header by [`auth::current_user`]; a missing or
//! invalid token answers 401 before the handler runs. Handlers validate their input, then talk
//! to the database through the repositories in [`db::handlers`]. Owner-scoped repositories take
//! the requesting user explicitly ([`types::Owned`]), so the ownership rule is enforced in the
//! query itself.
//!
//! ### Core Components
//!
//! - [`api`]: routes, request/response models and the JSON body extractor
//! - [`auth`]: password hashing, token issuance and the current-user extractor
//! - [`db`]: repositories, database models and error mapping
//! - [`validation`]: field-level validation producing `{"field": ["message"]}` maps
//! - [`seed`]: fixture data for development databases
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use caredesk::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = caredesk::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     caredesk::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations run automatically on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! caredesk::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod seed;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use crate::{
    api::handlers::{auth as auth_handlers, doctors, mappings, patients, root},
    auth::password::{self, Argon2Params},
    config::{CorsOrigin, PasswordConfig, PoolSettings},
    db::{handlers::Users, models::users::UserCreateDBRequest},
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{
    ConnectOptions, PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::{str::FromStr, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{DoctorId, MappingId, PatientId, UserId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the caredesk database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Make sure the configured admin account exists with the given password.
///
/// Creates a staff user when no account has this email, otherwise replaces the existing
/// account's password and marks it as staff. Safe to call on every startup.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(
    email: &str,
    password: &str,
    db: &PgPool,
    password_config: &PasswordConfig,
) -> anyhow::Result<UserId> {
    let email = validation::normalize_email(email);
    let password_hash = password::hash_password(password.to_string(), Argon2Params::from(password_config)).await?;

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    let user = match user_repo.get_user_by_email(&email).await? {
        Some(existing) => user_repo.update_credentials(existing.id, &password_hash, true).await?,
        None => {
            user_repo
                .create(&UserCreateDBRequest {
                    email: email.clone(),
                    name: "Admin User".to_string(),
                    password_hash,
                    is_staff: true,
                })
                .await?
        }
    };

    tx.commit().await?;
    info!("Admin account {} is ready", email);
    Ok(user.id)
}

/// Open a connection pool with the configured limits. Statements slower than
/// `slow_statement_threshold_ms` are logged at WARN.
pub async fn connect_pool(url: &str, settings: &PoolSettings, slow_statement_threshold_ms: u64) -> anyhow::Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(url)?
        .log_slow_statements(log::LevelFilter::Warn, Duration::from_millis(slow_statement_threshold_ms));

    // Zero means "never" for both timeouts
    let non_zero = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(non_zero(settings.idle_timeout_secs))
        .max_lifetime(non_zero(settings.max_lifetime_secs))
        .connect_with(connect_options)
        .await?;

    Ok(pool)
}

/// Connect to the configured database and run migrations
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let url = config
        .database_url()
        .ok_or_else(|| anyhow::anyhow!("No database configured. Set DATABASE_URL or database.url."))?;

    let pool = connect_pool(url, &config.database.pool, config.slow_statement_threshold_ms).await?;
    migrator().run(&pool).await?;

    if let Some(admin_password) = config.admin_password.as_deref() {
        create_initial_admin_user(&config.admin_email, admin_password, &pool, &config.auth.password)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {}", e))?;
    }

    Ok(pool)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // A wildcard anywhere in the list allows every origin
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// - `/api/*`: the JSON API
/// - `/api/openapi.json` and `/docs`: API documentation
/// - `/healthz`: liveness check
///
/// # Errors
///
/// Returns an error if the CORS configuration cannot be turned into headers.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;

    let auth_routes = Router::new()
        .route("/auth/register/", post(auth_handlers::register))
        .route("/auth/login/", post(auth_handlers::login))
        .route("/auth/token/refresh/", post(auth_handlers::refresh));

    let api_routes = Router::new()
        .route("/", get(root::api_root))
        .merge(auth_routes)
        // Doctors
        .route("/doctors/", get(doctors::list_doctors).post(doctors::create_doctor))
        .route(
            "/doctors/{id}/",
            get(doctors::get_doctor).put(doctors::update_doctor).delete(doctors::delete_doctor),
        )
        // Patients
        .route("/patients/", get(patients::list_patients).post(patients::create_patient))
        .route(
            "/patients/{id}/",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        // Mappings
        .route("/mappings/", get(mappings::list_mappings).post(mappings::create_mapping))
        .route("/mappings/{patient_id}/", get(mappings::list_patient_mappings))
        .route(
            "/mappings/detail/{id}/",
            get(mappings::get_mapping).delete(mappings::delete_mapping),
        )
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state);

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        // A nested "/" only matches "/api", so the trailing-slash form is routed here
        .route("/api/", get(root::api_root))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// A configured server: database pool plus router, ready to be bound.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Connect to the database, run migrations, ensure the admin account and build the router
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool)
    }

    /// Build the application on an existing pool. Migrations are not run.
    pub fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        debug!("Building application for {}", config.bind_address());

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "caredesk listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
