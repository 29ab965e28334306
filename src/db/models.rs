use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// A tracked crop with its latest known market price.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // All fields populated by FromRow; some accessed only via route serialization
pub struct Crop {
    pub id: Uuid,
    pub name: String,
    /// Grouping for filters (e.g. "cereal", "vegetable", "oilseed")
    pub category: String,
    /// Primary growing region key (matches the weather region table)
    pub region: String,
    /// Latest price in ₹ per unit
    pub current_price: Decimal,
    /// Trading unit (e.g. "quintal")
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One historical price observation for a crop.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // All fields populated by FromRow; some accessed only via route serialization
pub struct PricePoint {
    pub id: Uuid,
    pub crop_id: Uuid,
    pub price: Decimal,
    pub recorded_on: NaiveDate,
    /// Where the observation came from ("mandi", "synthetic", ...)
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// A market factor row: a narrative event with a base impact score.
#[derive(Debug, Clone, FromRow)]
pub struct Factor {
    pub id: Uuid,
    /// One of "weather", "demand", "supply", "policy", "global"
    pub factor_type: String,
    pub title: String,
    pub description: String,
    /// Unadjusted impact score; crops scale this by their sensitivities
    pub base_impact: Decimal,
    /// Region the factor applies to, or NULL for nationwide
    pub region: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// A stored news article, used as first fallback when the news upstream is
/// unavailable.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // All fields populated by FromRow; some accessed only via route serialization
pub struct NewsRow {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: Option<String>,
    pub published_at: DateTime<Utc>,
}
