// Agro Market API v0.1
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::chat::ChatClient;
use services::news::NewsClient;
use services::openweather::WeatherClient;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// Agro Market API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agro Market API",
        version = "0.1.0",
        description = "Agricultural market intelligence API. Serves crop prices and \
            history from Postgres, scores weather impact on crops with a per-crop \
            sensitivity model, annotates market factors with crop-specific \
            adjustments, projects short-term prices from recent history, and \
            aggregates agricultural news and a farming chatbot.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Crops", description = "Crop listing, prices and projections"),
        (name = "Factors", description = "Market factors and crop adjustments"),
        (name = "Weather", description = "Regional weather and crop impact"),
        (name = "News", description = "Agricultural market news"),
        (name = "Chat", description = "Farming assistant"),
    ),
    paths(
        routes::health::health_check,
        routes::crops::list_crops,
        routes::crops::get_crop,
        routes::crops::get_price_history,
        routes::crops::refresh_prices,
        routes::crops::get_prediction,
        routes::factors::get_crop_factors,
        routes::factors::get_global_factors,
        routes::weather::get_current_weather,
        routes::weather::get_weather_forecast,
        routes::weather::get_recommendations,
        routes::weather::get_crop_impact,
        routes::news::get_news,
        routes::chat::post_chat,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::crops::CropResponse,
            routes::crops::CropListResponse,
            routes::crops::CropDetailResponse,
            routes::crops::PricePointResponse,
            routes::crops::PriceHistoryResponse,
            routes::crops::PriceRefreshResponse,
            routes::crops::PredictionResponse,
            routes::factors::FactorResponse,
            routes::factors::CropFactorResponse,
            routes::factors::CropFactorsResponse,
            routes::factors::GlobalFactorsResponse,
            routes::weather::CurrentWeatherResponse,
            routes::weather::WeatherForecastResponse,
            routes::weather::RecommendationsResponse,
            routes::weather::CropImpactResponse,
            routes::news::NewsResponse,
            routes::chat::ChatRequest,
            routes::chat::ChatResponse,
            services::sensitivity::ImpactAssessment,
            services::sensitivity::Sentiment,
            services::sensitivity::FactorAdjustment,
            services::sensitivity::CropRanking,
            services::openweather::WeatherReading,
            services::openweather::ForecastDay,
            services::forecast::PriceForecast,
            services::news::Article,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agro_market_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations (includes crop and factor seed data)
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Upstream clients
    let weather_client = WeatherClient::new(&config.weather_base_url, &config.weather_api_key);
    let news_client = NewsClient::new(&config.news_base_url, &config.news_api_key);
    let chat_client = ChatClient::new(
        &config.chat_base_url,
        &config.chat_api_key,
        &config.chat_model,
    );

    // Build shared application state
    let app_state = AppState {
        pool: pool.clone(),
        weather: weather_client,
        news: news_client,
        chat: chat_client,
    };

    // CORS — dashboard calls GET endpoints plus POST for chat and refresh
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    // Build router
    // API routes share AppState; the health check uses the bare pool.
    let api_routes = Router::new()
        .route("/api/v1/crops", get(routes::crops::list_crops))
        .route("/api/v1/crops/:id", get(routes::crops::get_crop))
        .route(
            "/api/v1/crops/:id/prices",
            get(routes::crops::get_price_history),
        )
        .route(
            "/api/v1/crops/:id/prices/refresh",
            post(routes::crops::refresh_prices),
        )
        .route(
            "/api/v1/crops/:id/prediction",
            get(routes::crops::get_prediction),
        )
        .route(
            "/api/v1/crops/:id/factors",
            get(routes::factors::get_crop_factors),
        )
        .route(
            "/api/v1/factors/global",
            get(routes::factors::get_global_factors),
        )
        .route("/api/v1/weather", get(routes::weather::get_current_weather))
        .route(
            "/api/v1/weather/forecast",
            get(routes::weather::get_weather_forecast),
        )
        .route(
            "/api/v1/weather/recommendations",
            get(routes::weather::get_recommendations),
        )
        .route(
            "/api/v1/weather/impact/:crop",
            get(routes::weather::get_crop_impact),
        )
        .route("/api/v1/news", get(routes::news::get_news))
        .route("/api/v1/chat", post(routes::chat::post_chat))
        .with_state(app_state);

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
