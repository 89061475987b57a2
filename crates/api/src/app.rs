use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use domain::models::RegistrationType;
use domain::services::{Clock, ContentPermissionAccess, HostAccess, SystemClock};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{Config, ConfigValidationError};
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{blocks, health, manage, register, registrations, settings};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub clock: Arc<dyn Clock>,
    pub host_access: Arc<dyn HostAccess>,
    /// Registration types keyed by id
    pub registration_types: Arc<HashMap<String, RegistrationType>>,
}

impl AppState {
    /// Builds the state with the system clock and content permission host access.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, ConfigValidationError> {
        Self::with_clock(config, pool, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: Config,
        pool: PgPool,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigValidationError> {
        let jwt = config
            .jwt
            .jwt_config()
            .map_err(|e| ConfigValidationError::InvalidValue(format!("jwt: {}", e)))?;
        let registration_types = config
            .registration
            .registration_types()?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            clock,
            host_access: Arc::new(ContentPermissionAccess),
            registration_types: Arc::new(registration_types),
        })
    }

    pub fn registration_type(&self, id: &str) -> Option<&RegistrationType> {
        self.registration_types.get(id)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Registration routes. The acting account is resolved per handler.
    let registration_routes = Router::new()
        .route(
            "/api/v1/hosts/:entity_type/:entity_id/eligibility",
            get(register::get_eligibility),
        )
        .route(
            "/api/v1/hosts/:entity_type/:entity_id/register",
            get(register::get_register_form),
        )
        .route(
            "/api/v1/hosts/:entity_type/:entity_id/registrations",
            get(manage::list_registrations).post(registrations::create_registration),
        )
        .route(
            "/api/v1/registrations/:registration_id",
            put(registrations::update_registration),
        )
        .route(
            "/api/v1/hosts/:entity_type/:entity_id/registration-settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/api/v1/registration-settings",
            get(settings::list_settings),
        )
        .route(
            "/api/v1/hosts/:entity_type/:entity_id/blocks/hub-actions",
            get(blocks::get_hub_actions_block),
        );

    // Public routes
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(registration_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
