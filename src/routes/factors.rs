//! Market factor endpoints.
//!
//! - GET /api/v1/crops/:id/factors — factors adjusted for one crop
//! - GET /api/v1/factors/global — raw factors, no crop adjustment

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{models, queries};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::dec_to_f64;
use crate::routes::AppState;
use crate::services::openweather::{find_region, WeatherReading};
use crate::services::sensitivity::{adjust_factor, FactorAdjustment, FactorKind};

/// A factor row as stored, without crop adjustment.
#[derive(Debug, Serialize, ToSchema)]
pub struct FactorResponse {
    pub id: Uuid,
    /// "weather", "demand", "supply", "policy" or "global"
    pub factor_type: String,
    pub title: String,
    pub description: String,
    /// Unadjusted impact score
    pub base_impact: f64,
    /// Region the factor applies to; null means nationwide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// When the factor was recorded (ISO 8601)
    pub recorded_at: String,
}

impl From<models::Factor> for FactorResponse {
    fn from(f: models::Factor) -> Self {
        Self {
            id: f.id,
            factor_type: f.factor_type,
            title: f.title,
            description: f.description,
            base_impact: dec_to_f64(f.base_impact),
            region: f.region,
            recorded_at: f.recorded_at.to_rfc3339(),
        }
    }
}

/// A factor annotated with one crop's adjustment.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropFactorResponse {
    #[serde(flatten)]
    pub factor: FactorResponse,
    /// The factor's impact scaled by the crop's sensitivities
    pub adjustment: FactorAdjustment,
}

/// Factors adjusted for one crop.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropFactorsResponse {
    pub crop_id: Uuid,
    pub crop_name: String,
    pub factors: Vec<CropFactorResponse>,
    /// False when live weather could not be fetched and weather factors
    /// fell back to coefficient-only adjustment
    pub live_weather: bool,
}

/// Raw factor list.
#[derive(Debug, Serialize, ToSchema)]
pub struct GlobalFactorsResponse {
    pub factors: Vec<FactorResponse>,
}

/// Get market factors annotated with a crop's adjustments.
///
/// Weather factors use a live reading for the crop's region when one can be
/// fetched; otherwise they fall back to the crop's rainfall coefficients.
#[utoipa::path(
    get,
    path = "/api/v1/crops/{id}/factors",
    tag = "Factors",
    params(
        ("id" = Uuid, Path, description = "Crop UUID"),
    ),
    responses(
        (status = 200, description = "Factors adjusted for the crop", body = CropFactorsResponse),
        (status = 400, description = "Invalid crop ID", body = ErrorResponse),
        (status = 404, description = "Crop not found", body = ErrorResponse),
    )
)]
pub async fn get_crop_factors(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CropFactorsResponse>, AppError> {
    let crop = queries::get_crop(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Crop {} not found", id)))?;

    let factors = queries::get_factors(&state.pool, Some(&crop.region)).await?;

    // One weather fetch covers every weather factor in the list.
    let needs_weather = factors
        .iter()
        .any(|f| FactorKind::parse(&f.factor_type) == FactorKind::Weather);
    let reading: Option<WeatherReading> = if needs_weather {
        match find_region(&crop.region) {
            Some(region) => match state.weather.current(region).await {
                Ok(reading) => Some(reading),
                Err(e) => {
                    tracing::warn!("Weather unavailable for factor adjustment: {}", e);
                    None
                }
            },
            None => None,
        }
    } else {
        None
    };
    let live_weather = reading.is_some();

    let annotated = factors
        .into_iter()
        .map(|f| {
            let kind = FactorKind::parse(&f.factor_type);
            let adjustment =
                adjust_factor(&crop.name, kind, dec_to_f64(f.base_impact), reading.as_ref());
            CropFactorResponse {
                factor: FactorResponse::from(f),
                adjustment,
            }
        })
        .collect();

    Ok(Json(CropFactorsResponse {
        crop_id: crop.id,
        crop_name: crop.name,
        factors: annotated,
        live_weather,
    }))
}

/// Get recent market factors without crop adjustment.
#[utoipa::path(
    get,
    path = "/api/v1/factors/global",
    tag = "Factors",
    responses(
        (status = 200, description = "Recent factors", body = GlobalFactorsResponse),
    )
)]
pub async fn get_global_factors(
    State(state): State<AppState>,
) -> Result<Json<GlobalFactorsResponse>, AppError> {
    let factors = queries::get_factors(&state.pool, None).await?;
    Ok(Json(GlobalFactorsResponse {
        factors: factors.into_iter().map(FactorResponse::from).collect(),
    }))
}
