//! Crop HTTP endpoints.
//!
//! - GET  /api/v1/crops?search=&category=
//! - GET  /api/v1/crops/:id?include=weather,news
//! - GET  /api/v1/crops/:id/prices?days=N
//! - POST /api/v1/crops/:id/prices/refresh
//! - GET  /api/v1/crops/:id/prediction

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::{models, queries};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::{dec_to_f64, f64_to_decimal_2dp};
use crate::routes::AppState;
use crate::services::forecast::{next_synthetic_price, project_prices, PriceForecast};
use crate::services::news::Article;
use crate::services::openweather::find_region;
use crate::services::sensitivity::{assess_weather_impact, ImpactAssessment};

/// Maximum day window accepted for price-history queries (one year).
const MAX_HISTORY_DAYS: i64 = 365;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
pub struct CropListQuery {
    /// Case-insensitive substring match on crop name
    pub search: Option<String>,
    /// Exact category filter (e.g. "cereal")
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CropDetailQuery {
    /// Comma-separated extras: "weather", "news"
    pub include: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PriceHistoryQuery {
    /// Day window to return (default 30, max 365)
    pub days: Option<i64>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A crop with its latest price.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropResponse {
    /// Unique crop identifier
    pub id: Uuid,
    /// Crop name (e.g. "Wheat")
    pub name: String,
    /// Category for filtering
    pub category: String,
    /// Primary growing region key
    pub region: String,
    /// Latest price in ₹ per unit
    pub current_price: f64,
    /// Trading unit
    pub unit: String,
    /// When the price was last updated (ISO 8601)
    pub updated_at: String,
}

impl From<models::Crop> for CropResponse {
    fn from(c: models::Crop) -> Self {
        Self {
            id: c.id,
            name: c.name,
            category: c.category,
            region: c.region,
            current_price: dec_to_f64(c.current_price),
            unit: c.unit,
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Crop list response; `degraded` is true when the database was unreachable
/// and the list is canned sample data.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropListResponse {
    pub crops: Vec<CropResponse>,
    pub degraded: bool,
}

/// Crop detail with optional weather-impact and news sections.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropDetailResponse {
    pub crop: CropResponse,
    /// Present when `include=weather` and the weather upstream answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_impact: Option<ImpactAssessment>,
    /// Present when `include=news` and the news upstream answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<Vec<Article>>,
}

/// One price observation.
#[derive(Debug, Serialize, ToSchema)]
pub struct PricePointResponse {
    pub price: f64,
    /// Observation date (ISO 8601 date)
    pub recorded_on: String,
    pub source: String,
}

impl From<models::PricePoint> for PricePointResponse {
    fn from(p: models::PricePoint) -> Self {
        Self {
            price: dec_to_f64(p.price),
            recorded_on: p.recorded_on.to_string(),
            source: p.source,
        }
    }
}

/// Price history response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PriceHistoryResponse {
    pub crop_id: Uuid,
    pub crop_name: String,
    /// Observations, newest first
    pub prices: Vec<PricePointResponse>,
}

/// Result of a price refresh: the new observation and the updated price.
#[derive(Debug, Serialize, ToSchema)]
pub struct PriceRefreshResponse {
    pub crop_id: Uuid,
    pub point: PricePointResponse,
    pub current_price: f64,
}

/// Price prediction response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionResponse {
    pub crop_id: Uuid,
    pub crop_name: String,
    pub current_price: f64,
    pub forecast: PriceForecast,
}

/// Canned crops served when the database is unreachable.
fn sample_crops() -> Vec<CropResponse> {
    let now = Utc::now().to_rfc3339();
    let mk = |id: u128, name: &str, category: &str, region: &str, price: f64| CropResponse {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        category: category.to_string(),
        region: region.to_string(),
        current_price: price,
        unit: "quintal".to_string(),
        updated_at: now.clone(),
    };
    vec![
        mk(1, "Wheat", "cereal", "punjab", 2275.0),
        mk(2, "Rice", "cereal", "west-bengal", 2300.0),
        mk(3, "Soyabean", "oilseed", "madhya-pradesh", 4600.0),
        mk(4, "Maize", "cereal", "karnataka", 2090.0),
        mk(5, "Tomato", "vegetable", "maharashtra", 1800.0),
        mk(6, "Onion", "vegetable", "maharashtra", 2400.0),
    ]
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// List crops, with optional search and category filters.
///
/// Degrades to a canned sample list (with `degraded: true`) when the
/// database is unreachable, so the dashboard still renders.
#[utoipa::path(
    get,
    path = "/api/v1/crops",
    tag = "Crops",
    params(CropListQuery),
    responses(
        (status = 200, description = "Crop list, possibly degraded sample data", body = CropListResponse),
    )
)]
pub async fn list_crops(
    State(state): State<AppState>,
    Query(params): Query<CropListQuery>,
) -> Json<CropListResponse> {
    match queries::list_crops(
        &state.pool,
        params.search.as_deref(),
        params.category.as_deref(),
    )
    .await
    {
        Ok(crops) => Json(CropListResponse {
            crops: crops.into_iter().map(CropResponse::from).collect(),
            degraded: false,
        }),
        Err(e) => {
            tracing::warn!("Database unavailable for crop list, serving samples: {}", e);
            Json(CropListResponse {
                crops: sample_crops(),
                degraded: true,
            })
        }
    }
}

/// Get one crop, optionally with weather impact and news merged in.
///
/// The weather and news sections are fetched concurrently and degrade
/// independently: a failed upstream drops its section rather than failing
/// the request.
#[utoipa::path(
    get,
    path = "/api/v1/crops/{id}",
    tag = "Crops",
    params(
        ("id" = Uuid, Path, description = "Crop UUID"),
        CropDetailQuery,
    ),
    responses(
        (status = 200, description = "Crop detail", body = CropDetailResponse),
        (status = 400, description = "Invalid crop ID", body = ErrorResponse),
        (status = 404, description = "Crop not found", body = ErrorResponse),
    )
)]
pub async fn get_crop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<CropDetailQuery>,
) -> Result<Json<CropDetailResponse>, AppError> {
    let crop = queries::get_crop(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Crop {} not found", id)))?;

    let include = params.include.unwrap_or_default();
    let include_weather = include.split(',').any(|s| s.trim() == "weather");
    let include_news = include.split(',').any(|s| s.trim() == "news");

    let (weather_impact, news) = futures::join!(
        async {
            if !include_weather {
                return None;
            }
            let region = find_region(&crop.region)?;
            match state.weather.current(region).await {
                Ok(reading) => Some(assess_weather_impact(&crop.name, &reading)),
                Err(e) => {
                    tracing::warn!("Weather unavailable for crop detail: {}", e);
                    None
                }
            }
        },
        async {
            if !include_news {
                return None;
            }
            match state.news.search(&crop.name).await {
                Ok(articles) => Some(articles),
                Err(e) => {
                    tracing::warn!("News unavailable for crop detail: {}", e);
                    None
                }
            }
        }
    );

    Ok(Json(CropDetailResponse {
        crop: CropResponse::from(crop),
        weather_impact,
        news,
    }))
}

/// Get a crop's price history, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/crops/{id}/prices",
    tag = "Crops",
    params(
        ("id" = Uuid, Path, description = "Crop UUID"),
        PriceHistoryQuery,
    ),
    responses(
        (status = 200, description = "Price history", body = PriceHistoryResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Crop not found", body = ErrorResponse),
    )
)]
pub async fn get_price_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PriceHistoryQuery>,
) -> Result<Json<PriceHistoryResponse>, AppError> {
    let days = params.days.unwrap_or(30);
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {}",
            MAX_HISTORY_DAYS
        )));
    }

    let crop = queries::get_crop(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Crop {} not found", id)))?;

    let prices = queries::get_price_history(&state.pool, id, days).await?;

    Ok(Json(PriceHistoryResponse {
        crop_id: crop.id,
        crop_name: crop.name,
        prices: prices.into_iter().map(PricePointResponse::from).collect(),
    }))
}

/// Append a synthetic price observation for today and update the crop.
///
/// The new point drifts from the latest price by a seeded amount, so
/// repeated refreshes on the same day are idempotent.
#[utoipa::path(
    post,
    path = "/api/v1/crops/{id}/prices/refresh",
    tag = "Crops",
    params(
        ("id" = Uuid, Path, description = "Crop UUID"),
    ),
    responses(
        (status = 200, description = "New price point", body = PriceRefreshResponse),
        (status = 400, description = "Invalid crop ID", body = ErrorResponse),
        (status = 404, description = "Crop not found", body = ErrorResponse),
    )
)]
pub async fn refresh_prices(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PriceRefreshResponse>, AppError> {
    let crop = queries::get_crop(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Crop {} not found", id)))?;

    let today = Utc::now().date_naive();
    let next = next_synthetic_price(
        crop.id,
        dec_to_f64(crop.current_price),
        today.num_days_from_ce() as i64,
    );
    let next_dec = f64_to_decimal_2dp(next);

    let point =
        queries::insert_price_point(&state.pool, crop.id, next_dec, today, "synthetic").await?;
    queries::update_crop_price(&state.pool, crop.id, next_dec).await?;

    Ok(Json(PriceRefreshResponse {
        crop_id: crop.id,
        point: PricePointResponse::from(point),
        current_price: next,
    }))
}

/// Get a short-term price projection for a crop.
///
/// Runs the trend model over up to 30 recent observations. With no history
/// the projections are null and confidence is zero.
#[utoipa::path(
    get,
    path = "/api/v1/crops/{id}/prediction",
    tag = "Crops",
    params(
        ("id" = Uuid, Path, description = "Crop UUID"),
    ),
    responses(
        (status = 200, description = "Price projection", body = PredictionResponse),
        (status = 400, description = "Invalid crop ID", body = ErrorResponse),
        (status = 404, description = "Crop not found", body = ErrorResponse),
    )
)]
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PredictionResponse>, AppError> {
    let crop = queries::get_crop(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Crop {} not found", id)))?;

    let history = queries::get_price_history(&state.pool, id, 90).await?;
    let prices: Vec<f64> = history.iter().map(|p| dec_to_f64(p.price)).collect();

    Ok(Json(PredictionResponse {
        crop_id: crop.id,
        crop_name: crop.name,
        current_price: dec_to_f64(crop.current_price),
        forecast: project_prices(&prices),
    }))
}
