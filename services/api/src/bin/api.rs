//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{InMemoryStore, OpenAiTutorAdapter, PgStore, UnconfiguredGenerator},
    config::{Config, GenerationCredential},
    error::ApiError,
    web::{build_router, rest::ApiDoc, state::AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use brainbytes_core::ports::GenerationService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Generation Adapter ---
    let generator: Arc<dyn GenerationService> = match &config.credential {
        GenerationCredential::Configured(key) => {
            info!(model = %config.tutor_model, "Tutor model configured.");
            Arc::new(OpenAiTutorAdapter::from_credentials(
                key,
                &config.tutor_api_base,
                config.tutor_model.clone(),
            ))
        }
        GenerationCredential::Missing => {
            warn!("GEMINI_API_KEY is not set; every answer will be the fallback message.");
            Arc::new(UnconfiguredGenerator)
        }
    };

    // --- 3. Connect to the Store & Build the Shared AppState ---
    let app_state = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let store = Arc::new(PgStore::new(db_pool));
            info!("Running database migrations...");
            store.run_migrations().await?;
            info!("Database migrations complete.");
            AppState::new(store, generator, config.generation_deadline)
        }
        None => {
            warn!("DATABASE_URL is not set; messages are kept in memory only.");
            AppState::new(
                Arc::new(InMemoryStore::new()),
                generator,
                config.generation_deadline,
            )
        }
    };

    // --- 4. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let app = Router::new()
        .merge(build_router(Arc::new(app_state)).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
