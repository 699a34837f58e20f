//! Application startup and lifecycle management.
//!
//! Wires configuration, MongoDB, the image cache and the mail relay into a
//! single axum router served under `/api`, with health and metrics probes
//! at the root.

use crate::config::{CorsConfig, StudioConfig};
use crate::handlers;
use crate::services::{
    ContactMailer, EmailProvider, GeminiConfig, GeminiImageProvider, ImageCache, ImageProvider,
    SiteStore, SmtpProvider, StudioDb,
};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{http_request_span, request_id_middleware, REQUEST_ID_HEADER},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: StudioConfig,
    pub store: Arc<dyn SiteStore>,
    pub images: ImageCache,
    pub mailer: ContactMailer,
}

impl AppState {
    pub fn new(
        config: StudioConfig,
        store: Arc<dyn SiteStore>,
        image_provider: Arc<dyn ImageProvider>,
        email_provider: Arc<dyn EmailProvider>,
    ) -> Self {
        let images = ImageCache::new(image_provider, &config.image_cache);
        let mailer = ContactMailer::new(email_provider, config.smtp.recipient.clone());

        Self {
            config,
            store,
            images,
            mailer,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(handlers::root))
        .route(
            "/status",
            get(handlers::list_status_checks).post(handlers::create_status_check),
        )
        .route("/generate-image", post(handlers::generate_image))
        .route(
            "/generated-image/:section_id",
            get(handlers::get_generated_image),
        )
        .route("/send-contact", post(handlers::send_contact));

    let cors = cors_layer(&state.config.cors);

    Router::new()
        // Nesting only matches "/api"; clients also call the trailing-slash form.
        .route("/api/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .nest("/api", api)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allows_any() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    db: StudioDb,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: StudioConfig) -> Result<Self, AppError> {
        let db = StudioDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let image_provider = GeminiImageProvider::new(GeminiConfig {
            api_key: config.genai.api_key.clone(),
            model: config.genai.image_model.clone(),
            api_base: config.genai.api_base.clone(),
            timeout: config.genai.request_timeout,
        })?;
        if image_provider.is_configured() {
            tracing::info!(model = %config.genai.image_model, "Initialized Gemini image provider");
        } else {
            tracing::warn!("GOOGLE_API_KEY not set; image generation requests will fail");
        }

        let email_provider = SmtpProvider::new(config.smtp.clone())?;
        if email_provider.is_configured() {
            tracing::info!(host = %config.smtp.host, "SMTP email provider initialized");
        } else {
            tracing::warn!("SMTP credentials not set; contact form requests will fail");
        }

        let state = AppState::new(
            config.clone(),
            Arc::new(db.clone()),
            Arc::new(image_provider),
            Arc::new(email_provider),
        );

        // Port 0 = random port for testing
        let addr = SocketAddr::new(config.common.host, config.common.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Studio service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
            db,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &StudioDb {
        &self.db
    }

    /// Serve until SIGINT/SIGTERM, then close the database client.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        let result = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        self.db.close().await;

        result.map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
