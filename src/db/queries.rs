use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Crop, Factor, NewsRow, PricePoint};

/// List crops, optionally filtered by a name search and/or category.
///
/// The search matches case-insensitively anywhere in the name.
pub async fn list_crops(
    pool: &PgPool,
    search: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<Crop>, sqlx::Error> {
    sqlx::query_as::<_, Crop>(
        "SELECT id, name, category, region, current_price, unit, created_at, updated_at
         FROM crops
         WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
           AND ($2::text IS NULL OR category = $2)
         ORDER BY name",
    )
    .bind(search)
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Get a single crop by ID.
pub async fn get_crop(pool: &PgPool, id: Uuid) -> Result<Option<Crop>, sqlx::Error> {
    sqlx::query_as::<_, Crop>(
        "SELECT id, name, category, region, current_price, unit, created_at, updated_at
         FROM crops WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Get a crop's price history, newest first, bounded by a day window.
pub async fn get_price_history(
    pool: &PgPool,
    crop_id: Uuid,
    days: i64,
) -> Result<Vec<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        "SELECT id, crop_id, price, recorded_on, source, created_at
         FROM price_history
         WHERE crop_id = $1
           AND recorded_on >= CURRENT_DATE - $2::int
         ORDER BY recorded_on DESC
         LIMIT 30",
    )
    .bind(crop_id)
    .bind(days as i32)
    .fetch_all(pool)
    .await
}

/// Insert a new price observation and return the stored row.
pub async fn insert_price_point(
    pool: &PgPool,
    crop_id: Uuid,
    price: Decimal,
    recorded_on: NaiveDate,
    source: &str,
) -> Result<PricePoint, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        "INSERT INTO price_history (crop_id, price, recorded_on, source)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (crop_id, recorded_on)
         DO UPDATE SET price = EXCLUDED.price, source = EXCLUDED.source
         RETURNING id, crop_id, price, recorded_on, source, created_at",
    )
    .bind(crop_id)
    .bind(price)
    .bind(recorded_on)
    .bind(source)
    .fetch_one(pool)
    .await
}

/// Update a crop's current price.
pub async fn update_crop_price(
    pool: &PgPool,
    crop_id: Uuid,
    price: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE crops SET current_price = $2, updated_at = NOW() WHERE id = $1")
        .bind(crop_id)
        .bind(price)
        .execute(pool)
        .await?;
    Ok(())
}

/// Get market factors, optionally restricted to one region (nationwide rows
/// always included), newest first.
pub async fn get_factors(pool: &PgPool, region: Option<&str>) -> Result<Vec<Factor>, sqlx::Error> {
    sqlx::query_as::<_, Factor>(
        "SELECT id, factor_type, title, description, base_impact, region, recorded_at
         FROM factors
         WHERE ($1::text IS NULL OR region IS NULL OR region = $1)
         ORDER BY recorded_at DESC
         LIMIT 50",
    )
    .bind(region)
    .fetch_all(pool)
    .await
}

/// Most recent stored news rows, used when the news upstream is down.
pub async fn get_recent_news(pool: &PgPool, limit: i64) -> Result<Vec<NewsRow>, sqlx::Error> {
    sqlx::query_as::<_, NewsRow>(
        "SELECT id, title, summary, source, url, published_at
         FROM news
         ORDER BY published_at DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
