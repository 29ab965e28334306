//! Weather HTTP endpoints.
//!
//! - GET /api/v1/weather?region=
//! - GET /api/v1/weather/forecast?region=
//! - GET /api/v1/weather/recommendations?region=
//! - GET /api/v1/weather/impact/:crop?region=

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::{AppError, ErrorResponse};
use crate::routes::AppState;
use crate::services::openweather::{find_region, ForecastDay, Region, WeatherReading};
use crate::services::sensitivity::{assess_weather_impact, rank_crops, CropRanking, ImpactAssessment};

/// Region used when the caller doesn't specify one.
const DEFAULT_REGION: &str = "punjab";

#[derive(Debug, Deserialize, IntoParams)]
pub struct RegionQuery {
    /// Region key or name (e.g. "punjab"). Defaults to punjab.
    pub region: Option<String>,
}

/// Current conditions for a region.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentWeatherResponse {
    pub region: String,
    pub weather: WeatherReading,
}

/// 5-day outlook for a region.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherForecastResponse {
    pub region: String,
    pub days: Vec<ForecastDay>,
}

/// Crop recommendations under current weather.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationsResponse {
    pub region: String,
    pub weather: WeatherReading,
    /// Crops ranked best-suited first
    pub recommendations: Vec<CropRanking>,
}

/// Weather impact on one crop.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropImpactResponse {
    pub region: String,
    pub weather: WeatherReading,
    pub impact: ImpactAssessment,
}

fn resolve_region(params: &RegionQuery) -> Result<&'static Region, AppError> {
    let name = params.region.as_deref().unwrap_or(DEFAULT_REGION);
    find_region(name).ok_or_else(|| AppError::BadRequest(format!("Unknown region '{}'", name)))
}

/// Get current weather for a region.
#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "Weather",
    params(RegionQuery),
    responses(
        (status = 200, description = "Current conditions", body = CurrentWeatherResponse),
        (status = 400, description = "Unknown region", body = ErrorResponse),
        (status = 502, description = "Weather service unavailable", body = ErrorResponse),
    )
)]
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> Result<Json<CurrentWeatherResponse>, AppError> {
    let region = resolve_region(&params)?;
    let weather = state.weather.current(region).await.map_err(|e| {
        AppError::ExternalServiceError(format!("weather unavailable for {}: {}", region.name, e))
    })?;

    Ok(Json(CurrentWeatherResponse {
        region: region.key.to_string(),
        weather,
    }))
}

/// Get the 5-day outlook for a region.
#[utoipa::path(
    get,
    path = "/api/v1/weather/forecast",
    tag = "Weather",
    params(RegionQuery),
    responses(
        (status = 200, description = "5-day outlook", body = WeatherForecastResponse),
        (status = 400, description = "Unknown region", body = ErrorResponse),
        (status = 502, description = "Weather service unavailable", body = ErrorResponse),
    )
)]
pub async fn get_weather_forecast(
    State(state): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> Result<Json<WeatherForecastResponse>, AppError> {
    let region = resolve_region(&params)?;
    let days = state.weather.forecast(region).await.map_err(|e| {
        AppError::ExternalServiceError(format!("weather unavailable for {}: {}", region.name, e))
    })?;

    Ok(Json(WeatherForecastResponse {
        region: region.key.to_string(),
        days,
    }))
}

/// Rank crops by how well current weather suits them.
#[utoipa::path(
    get,
    path = "/api/v1/weather/recommendations",
    tag = "Weather",
    params(RegionQuery),
    responses(
        (status = 200, description = "Crops ranked for the current weather", body = RecommendationsResponse),
        (status = 400, description = "Unknown region", body = ErrorResponse),
        (status = 502, description = "Weather service unavailable", body = ErrorResponse),
    )
)]
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let region = resolve_region(&params)?;
    let weather = state.weather.current(region).await.map_err(|e| {
        AppError::ExternalServiceError(format!("weather unavailable for {}: {}", region.name, e))
    })?;

    let recommendations = rank_crops(&weather, None);

    Ok(Json(RecommendationsResponse {
        region: region.key.to_string(),
        weather,
        recommendations,
    }))
}

/// Score the current weather's impact on one crop.
///
/// The crop is free text — aliases like "basmati" resolve to the rice
/// profile, and unknown names fall back to a generic profile.
#[utoipa::path(
    get,
    path = "/api/v1/weather/impact/{crop}",
    tag = "Weather",
    params(
        ("crop" = String, Path, description = "Crop name (free text)"),
        RegionQuery,
    ),
    responses(
        (status = 200, description = "Impact assessment", body = CropImpactResponse),
        (status = 400, description = "Unknown region", body = ErrorResponse),
        (status = 502, description = "Weather service unavailable", body = ErrorResponse),
    )
)]
pub async fn get_crop_impact(
    State(state): State<AppState>,
    Path(crop): Path<String>,
    Query(params): Query<RegionQuery>,
) -> Result<Json<CropImpactResponse>, AppError> {
    let region = resolve_region(&params)?;
    let weather = state.weather.current(region).await.map_err(|e| {
        AppError::ExternalServiceError(format!("weather unavailable for {}: {}", region.name, e))
    })?;

    let impact = assess_weather_impact(&crop, &weather);

    Ok(Json(CropImpactResponse {
        region: region.key.to_string(),
        weather,
        impact,
    }))
}
