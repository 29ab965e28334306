//! Short-term price projection.
//!
//! A naive trend model over recent price history: compare the average of the
//! seven most recent prices with the average of the seven before them, then
//! extrapolate the weekly trend out to 3 and 30 days from the latest price.
//!
//! A small noise term widens the projections so they don't read as exact.
//! The noise is drawn from an RNG seeded on the history itself, so repeated
//! calls over the same rows return the same numbers and tests stay green.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::helpers::{round1, round2};

/// Window length for the trend comparison (days).
const TREND_WINDOW: usize = 7;

/// History rows considered, newest first.
const MAX_HISTORY: usize = 30;

/// Noise amplitude as a fraction of the latest price.
const JITTER_FRACTION: f64 = 0.05;

/// Projected prices derived from recent history.
///
/// Projections are `None` when there is no history to project from.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceForecast {
    /// Projected price 3 days out
    pub next_3_days: Option<f64>,
    /// Projected price 30 days out
    pub next_month: Option<f64>,
    /// Week-over-week trend as a percentage
    pub weekly_trend_pct: f64,
    /// Confidence in the projection, 0–95
    pub confidence: u8,
    /// Number of history rows the projection is based on
    pub based_on: usize,
}

/// Project prices from history rows ordered newest first.
///
/// Zero history yields null projections and zero confidence rather than an
/// error. Beyond [`MAX_HISTORY`] rows, the excess is ignored.
pub fn project_prices(prices: &[f64]) -> PriceForecast {
    let prices = &prices[..prices.len().min(MAX_HISTORY)];

    if prices.is_empty() {
        return PriceForecast {
            next_3_days: None,
            next_month: None,
            weekly_trend_pct: 0.0,
            confidence: 0,
            based_on: 0,
        };
    }

    let latest = prices[0];
    let trend = weekly_trend(prices);

    let mut rng = StdRng::seed_from_u64(history_seed(prices));
    let jitter_short: f64 = rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
    let jitter_long: f64 = rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION);

    // Weekly trend scaled to the projection horizon: 3/7 of a week out, and
    // roughly two weekly steps for the monthly view.
    let next_3_days = latest * (1.0 + trend * (3.0 / 7.0) + jitter_short);
    let next_month = latest * (1.0 + trend * 2.0 + jitter_long);

    PriceForecast {
        next_3_days: Some(round2(next_3_days.max(0.0))),
        next_month: Some(round2(next_month.max(0.0))),
        weekly_trend_pct: round1(trend * 100.0),
        confidence: confidence_for(prices.len()),
        based_on: prices.len(),
    }
}

/// Week-over-week price change as a fraction.
///
/// Compares the mean of the newest [`TREND_WINDOW`] prices against the mean
/// of the window before it. Returns 0 when the older window is empty or its
/// mean is zero.
fn weekly_trend(prices: &[f64]) -> f64 {
    let recent: &[f64] = &prices[..prices.len().min(TREND_WINDOW)];
    let older: &[f64] = if prices.len() > TREND_WINDOW {
        &prices[TREND_WINDOW..prices.len().min(2 * TREND_WINDOW)]
    } else {
        &[]
    };

    if older.is_empty() {
        return 0.0;
    }

    let recent_avg = mean(recent);
    let older_avg = mean(older);
    if older_avg == 0.0 {
        return 0.0;
    }

    (recent_avg - older_avg) / older_avg
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Confidence grows linearly with history depth, capped at 95.
fn confidence_for(history_len: usize) -> u8 {
    let raw = 60.0 + (history_len as f64 / MAX_HISTORY as f64) * 35.0;
    raw.min(95.0).round() as u8
}

/// Deterministic seed derived from the price history.
fn history_seed(prices: &[f64]) -> u64 {
    prices.iter().fold(0x9e37_79b9_7f4a_7c15u64, |acc, p| {
        acc.rotate_left(7) ^ p.to_bits()
    })
}

/// Synthesize the next price for a crop from its latest price.
///
/// Used by the price-refresh endpoint to append a plausible new observation.
/// Drift is seeded on the crop id and the day, so refreshing twice on the
/// same day produces the same point instead of a random walk.
pub fn next_synthetic_price(crop_id: Uuid, latest: f64, day_ordinal: i64) -> f64 {
    let (hi, _) = crop_id.as_u64_pair();
    let mut rng = StdRng::seed_from_u64(hi ^ day_ordinal as u64);
    let drift: f64 = rng.gen_range(-0.03..=0.03);
    round2((latest * (1.0 + drift)).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_history(price: f64, len: usize) -> Vec<f64> {
        vec![price; len]
    }

    #[test]
    fn test_empty_history_yields_nulls() {
        let forecast = project_prices(&[]);
        assert!(forecast.next_3_days.is_none());
        assert!(forecast.next_month.is_none());
        assert_eq!(forecast.confidence, 0);
        assert_eq!(forecast.based_on, 0);
    }

    #[test]
    fn test_full_history_confidence_is_95() {
        let forecast = project_prices(&flat_history(2000.0, 30));
        assert_eq!(forecast.confidence, 95);
        assert_eq!(forecast.based_on, 30);
    }

    #[test]
    fn test_confidence_scales_with_history() {
        // 15 rows: 60 + 15/30*35 = 77.5 → 78
        assert_eq!(confidence_for(15), 78);
        assert_eq!(confidence_for(30), 95);
        assert_eq!(confidence_for(60), 95);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let history: Vec<f64> = (0..30).map(|i| 1800.0 + i as f64 * 3.5).collect();
        let a = project_prices(&history);
        let b = project_prices(&history);
        assert_eq!(a.next_3_days, b.next_3_days);
        assert_eq!(a.next_month, b.next_month);
    }

    #[test]
    fn test_recent_week_above_older_week_is_an_uptrend() {
        // Newest first: 2130, 2120, ... — the last 7 days averaged higher
        // than the 7 days before them.
        let history: Vec<f64> = (0..14).map(|i| 2130.0 - i as f64 * 10.0).collect();
        let forecast = project_prices(&history);
        assert!(
            forecast.weekly_trend_pct > 0.0,
            "expected uptrend, got {}",
            forecast.weekly_trend_pct
        );
    }

    #[test]
    fn test_flat_history_has_zero_trend() {
        let forecast = project_prices(&flat_history(1500.0, 14));
        assert_eq!(forecast.weekly_trend_pct, 0.0);
    }

    #[test]
    fn test_short_history_has_zero_trend() {
        // Fewer rows than one full comparison window — no older window.
        let forecast = project_prices(&flat_history(1500.0, 5));
        assert_eq!(forecast.weekly_trend_pct, 0.0);
        assert!(forecast.next_3_days.is_some());
    }

    #[test]
    fn test_projections_stay_near_latest_price() {
        // Flat history: projections are latest ± jitter (≤5%).
        let forecast = project_prices(&flat_history(1000.0, 14));
        let next3 = forecast.next_3_days.unwrap();
        assert!((950.0..=1050.0).contains(&next3), "got {}", next3);
    }

    #[test]
    fn test_projections_never_go_negative() {
        let forecast = project_prices(&flat_history(0.01, 14));
        assert!(forecast.next_3_days.unwrap() >= 0.0);
        assert!(forecast.next_month.unwrap() >= 0.0);
    }

    #[test]
    fn test_history_beyond_30_rows_is_ignored() {
        let long: Vec<f64> = (0..60).map(|i| 2000.0 + i as f64).collect();
        let forecast = project_prices(&long);
        assert_eq!(forecast.based_on, 30);
        assert_eq!(forecast.confidence, 95);
    }

    #[test]
    fn test_synthetic_price_is_stable_within_a_day() {
        let id = Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        let a = next_synthetic_price(id, 2200.0, 20_300);
        let b = next_synthetic_price(id, 2200.0, 20_300);
        assert_eq!(a, b);
        // Within the ±3% drift band
        assert!((2134.0..=2266.0).contains(&a), "got {}", a);
    }

    #[test]
    fn test_synthetic_price_varies_across_days() {
        let id = Uuid::from_u128(42);
        let prices: Vec<f64> = (0..5)
            .map(|d| next_synthetic_price(id, 2200.0, 20_300 + d))
            .collect();
        let first = prices[0];
        assert!(
            prices.iter().any(|&p| p != first),
            "five consecutive days should not all drift identically: {:?}",
            prices
        );
    }
}
