use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::{AccountDirectory, Reaper, StaticAccountDirectory};
use crate::config::Config;
use crate::controllers::{game, tokens, AppState};
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;

/// The gamelink application: config + store handles + router + reaper.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    pub directory: Arc<dyn AccountDirectory>,
}

impl App {
    /// Create a new application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create a new application with a given config and the static
    /// directory seeded from it.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let directory = Arc::new(StaticAccountDirectory::from_spec(&config.accounts));
        Self::with_directory(config, directory).await
    }

    /// Create a new application with a caller-provided account directory
    /// (the seam to the real forum member store).
    pub async fn with_directory(
        config: Config,
        directory: Arc<dyn AccountDirectory>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        Ok(App {
            config,
            db,
            directory,
        })
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let config = Arc::new(self.config.clone());
        let is_dev = self.config.is_dev();

        let state = AppState {
            db: self.db.clone(),
            config: config.clone(),
            directory: self.directory.clone(),
        };

        let openapi_spec = ApiDoc::openapi();
        let openapi_json = openapi_spec.clone();

        let mut router = Router::new()
            .route("/health", get(health))
            .nest("/api/tokens", tokens::routes())
            .nest("/api/game", game::routes())
            .with_state(state)
            .merge(Scalar::with_url("/api-docs", openapi_spec))
            .route(
                "/api-docs/openapi.json",
                get(move || {
                    let spec = openapi_json.clone();
                    async move { axum::Json(spec) }
                }),
            )
            .layer(axum::Extension(config))
            .layer(CorsLayer::permissive());

        // Expensive tracing/request-id middleware only in development.
        if is_dev {
            use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
            use tower_http::trace::{
                DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
            };
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Spawn the background reaper on its own task.
    pub fn spawn_reaper(&self) -> tokio::task::JoinHandle<()> {
        Reaper::new(self.db.clone(), &self.config.tokens).spawn()
    }

    /// Run the application server with graceful shutdown.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();
        let _reaper = self.spawn_reaper();

        tracing::info!("gamelink server running on http://{}", addr);
        tracing::info!("API docs at http://{}/api-docs", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down gamelink server...");
}

/// Liveness probe.
async fn health() -> &'static str {
    "OK"
}
