//! Crop sensitivity model and weather-impact scoring.
//!
//! A static table maps crop keys to coefficient sets describing how strongly
//! each crop reacts to rainfall, temperature, humidity and market factors.
//! The scoring functions combine a coefficient set with a current weather
//! reading (or a base factor impact) into a bounded score, a sentiment label
//! and human-readable guidance.
//!
//! Everything in this module is pure: same inputs, same outputs. Lookups
//! never fail — unmatched crop names fall back to the `default` profile.

use serde::Serialize;
use utoipa::ToSchema;

use crate::helpers::round1;
use crate::services::openweather::WeatherReading;

/// Score above which an assessment reads as favourable.
const POSITIVE_THRESHOLD: f64 = 2.0;
/// Score below which an assessment reads as unfavourable.
const NEGATIVE_THRESHOLD: f64 = -2.0;

/// Impact scores are clamped to [-MAX_SCORE, MAX_SCORE].
const MAX_SCORE: f64 = 10.0;

/// Temperature response coefficients, each in [-1, 1].
#[derive(Debug, Clone, Copy)]
pub struct TemperatureSensitivity {
    /// Applied when the reading exceeds 35°C.
    pub hot: f64,
    /// Applied in the 15–35°C band.
    pub optimal: f64,
    /// Applied when the reading drops below 15°C.
    pub cold: f64,
}

/// Static per-crop sensitivity coefficients plus descriptive metadata.
///
/// Coefficients are signed weights in [-1, 1]: positive means the factor
/// helps the crop, negative means it hurts.
#[derive(Debug, Clone, Copy)]
pub struct SensitivityProfile {
    pub name: &'static str,
    pub rain: f64,
    pub excess_rain: f64,
    pub drought: f64,
    pub temperature: TemperatureSensitivity,
    pub humidity: f64,
    pub demand: f64,
    pub supply: f64,
    pub policy: f64,
    pub global_trade: f64,
    pub seasonal_peaks: &'static [&'static str],
    pub optimal_conditions: &'static str,
    pub vulnerabilities: &'static [&'static str],
}

/// Fallback profile for unknown crops.
static DEFAULT_PROFILE: SensitivityProfile = SensitivityProfile {
    name: "General crop",
    rain: 0.3,
    excess_rain: -0.5,
    drought: -0.5,
    temperature: TemperatureSensitivity {
        hot: -0.4,
        optimal: 0.5,
        cold: -0.3,
    },
    humidity: -0.2,
    demand: 0.5,
    supply: -0.5,
    policy: 0.5,
    global_trade: 0.5,
    seasonal_peaks: &[],
    optimal_conditions: "Moderate temperatures with steady rainfall",
    vulnerabilities: &["extreme weather", "market volatility"],
};

/// Known crop profiles, keyed by normalized name.
///
/// Linear scan is fine at this size and keeps the table a plain static.
static PROFILES: &[(&str, SensitivityProfile)] = &[
    (
        "rice",
        SensitivityProfile {
            name: "Rice",
            rain: 0.8,
            excess_rain: -0.4,
            drought: -0.9,
            temperature: TemperatureSensitivity {
                hot: -0.6,
                optimal: 0.7,
                cold: -0.5,
            },
            humidity: 0.3,
            demand: 0.7,
            supply: -0.5,
            policy: 0.8,
            global_trade: 0.6,
            seasonal_peaks: &["kharif"],
            optimal_conditions: "Warm and humid with standing water during transplanting",
            vulnerabilities: &["drought", "cold snaps at flowering"],
        },
    ),
    (
        "wheat",
        SensitivityProfile {
            name: "Wheat",
            rain: 0.3,
            excess_rain: -0.7,
            drought: -0.6,
            temperature: TemperatureSensitivity {
                hot: -0.8,
                optimal: 0.6,
                cold: 0.4,
            },
            humidity: -0.4,
            demand: 0.6,
            supply: -0.4,
            policy: 0.9,
            global_trade: 0.7,
            seasonal_peaks: &["rabi"],
            optimal_conditions: "Cool growing season with dry weather at harvest",
            vulnerabilities: &["terminal heat", "unseasonal rain at harvest"],
        },
    ),
    (
        "soyabean",
        SensitivityProfile {
            name: "Soyabean",
            rain: 0.6,
            excess_rain: -0.5,
            drought: -0.8,
            temperature: TemperatureSensitivity {
                hot: -0.4,
                optimal: 0.6,
                cold: -0.3,
            },
            humidity: 0.1,
            demand: 0.8,
            supply: -0.6,
            policy: 0.6,
            global_trade: 0.9,
            seasonal_peaks: &["kharif"],
            optimal_conditions: "Warm days with well-distributed monsoon rain",
            vulnerabilities: &["dry spells at pod fill", "global oilseed prices"],
        },
    ),
    (
        "maize",
        SensitivityProfile {
            name: "Maize",
            rain: 0.5,
            excess_rain: -0.6,
            drought: -0.7,
            temperature: TemperatureSensitivity {
                hot: -0.5,
                optimal: 0.6,
                cold: -0.4,
            },
            humidity: -0.2,
            demand: 0.6,
            supply: -0.5,
            policy: 0.5,
            global_trade: 0.8,
            seasonal_peaks: &["kharif", "rabi"],
            optimal_conditions: "Warm weather with moist, well-drained soil",
            vulnerabilities: &["waterlogging", "heat at silking"],
        },
    ),
    (
        "cotton",
        SensitivityProfile {
            name: "Cotton",
            rain: 0.4,
            excess_rain: -0.8,
            drought: -0.5,
            temperature: TemperatureSensitivity {
                hot: 0.2,
                optimal: 0.5,
                cold: -0.7,
            },
            humidity: -0.5,
            demand: 0.7,
            supply: -0.4,
            policy: 0.7,
            global_trade: 0.8,
            seasonal_peaks: &["kharif"],
            optimal_conditions: "Long hot season with dry weather at picking",
            vulnerabilities: &["rain at boll opening", "pest pressure in humid spells"],
        },
    ),
    (
        "tomato",
        SensitivityProfile {
            name: "Tomato",
            rain: -0.3,
            excess_rain: -0.9,
            drought: -0.7,
            temperature: TemperatureSensitivity {
                hot: -0.7,
                optimal: 0.8,
                cold: -0.6,
            },
            humidity: -0.7,
            demand: 0.5,
            supply: -0.8,
            policy: 0.3,
            global_trade: 0.3,
            seasonal_peaks: &["rabi", "summer"],
            optimal_conditions: "Mild temperatures with controlled irrigation",
            vulnerabilities: &["heavy rain", "fungal disease", "glut at harvest"],
        },
    ),
    (
        "onion",
        SensitivityProfile {
            name: "Onion",
            rain: -0.2,
            excess_rain: -0.9,
            drought: -0.4,
            temperature: TemperatureSensitivity {
                hot: -0.3,
                optimal: 0.6,
                cold: -0.2,
            },
            humidity: -0.6,
            demand: 0.9,
            supply: -0.9,
            policy: 0.8,
            global_trade: 0.4,
            seasonal_peaks: &["rabi"],
            optimal_conditions: "Dry weather during bulb development and curing",
            vulnerabilities: &["unseasonal rain", "storage rot", "export policy swings"],
        },
    ),
    (
        "potato",
        SensitivityProfile {
            name: "Potato",
            rain: 0.3,
            excess_rain: -0.6,
            drought: -0.5,
            temperature: TemperatureSensitivity {
                hot: -0.8,
                optimal: 0.7,
                cold: 0.3,
            },
            humidity: -0.3,
            demand: 0.5,
            supply: -0.6,
            policy: 0.4,
            global_trade: 0.3,
            seasonal_peaks: &["rabi"],
            optimal_conditions: "Cool nights during tuber formation",
            vulnerabilities: &["late blight in humid weather", "heat during tuberisation"],
        },
    ),
    (
        "sugarcane",
        SensitivityProfile {
            name: "Sugarcane",
            rain: 0.7,
            excess_rain: -0.3,
            drought: -0.8,
            temperature: TemperatureSensitivity {
                hot: 0.1,
                optimal: 0.6,
                cold: -0.6,
            },
            humidity: 0.2,
            demand: 0.4,
            supply: -0.3,
            policy: 0.9,
            global_trade: 0.5,
            seasonal_peaks: &["annual"],
            optimal_conditions: "Hot and humid with abundant water through the year",
            vulnerabilities: &["drought", "frost in north-plain winters"],
        },
    ),
];

impl SensitivityProfile {
    /// Resolve a free-text crop name to a profile.
    ///
    /// Normalizes (trim + lowercase), applies substring aliases (basmati and
    /// paddy are rice; soya is soyabean; corn is maize), then falls back to
    /// an exact key match and finally the default profile. Never fails.
    pub fn lookup(crop_name: &str) -> &'static SensitivityProfile {
        Self::lookup_entry(crop_name).1
    }

    /// Like [`lookup`](Self::lookup), but also returns the matched table key
    /// ("default" for the fallback profile).
    pub fn lookup_entry(crop_name: &str) -> (&'static str, &'static SensitivityProfile) {
        let normalized = crop_name.trim().to_lowercase();
        if normalized.is_empty() {
            return ("default", &DEFAULT_PROFILE);
        }

        let aliased = if normalized.contains("rice")
            || normalized.contains("basmati")
            || normalized.contains("paddy")
        {
            Some("rice")
        } else if normalized.contains("soy") || normalized.contains("soya") {
            Some("soyabean")
        } else if normalized.contains("corn") || normalized.contains("maize") {
            Some("maize")
        } else {
            None
        };

        let key = aliased.unwrap_or(normalized.as_str());
        for (k, profile) in PROFILES {
            if *k == key {
                return (*k, profile);
            }
        }
        ("default", &DEFAULT_PROFILE)
    }

    /// All known crop keys, excluding the default sentinel.
    pub fn known_keys() -> impl Iterator<Item = &'static str> {
        PROFILES.iter().map(|(k, _)| *k)
    }
}

/// Market sentiment derived from an impact score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Positive above 2, negative below -2, neutral in between (strict).
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Weather impact assessment for one crop under current conditions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImpactAssessment {
    /// Crop display name
    pub crop: String,
    /// Impact score in [-10, 10], one decimal place
    pub score: f64,
    /// Sentiment label derived from the score
    pub sentiment: Sentiment,
    /// Human-readable observations, in scoring order
    pub details: Vec<String>,
    /// Actionable advice triggered by stress conditions
    pub recommendations: Vec<String>,
    /// Static description of the crop's preferred conditions
    pub optimal_conditions: String,
    /// Static list of known weak points
    pub vulnerabilities: Vec<String>,
}

/// Score the impact of a weather reading on a crop.
///
/// Contributions are applied independently and summed: temperature band,
/// precipitation (from the condition text), drought risk and humidity. The
/// sum is clamped to [-10, 10] and rounded to one decimal place.
pub fn assess_weather_impact(crop_name: &str, weather: &WeatherReading) -> ImpactAssessment {
    let profile = SensitivityProfile::lookup(crop_name);
    let name = profile.name;

    let mut score = 0.0;
    let mut details = Vec::new();
    let mut recommendations = Vec::new();

    // Temperature band
    if weather.temperature_c > 35.0 {
        score += profile.temperature.hot * 10.0;
        if profile.temperature.hot < 0.0 {
            details.push(format!(
                "Heat above 35°C ({:.1}°C) is stressing {}",
                weather.temperature_c, name
            ));
            recommendations.push(format!(
                "Irrigate {} in the early morning to limit heat stress",
                name
            ));
        } else {
            details.push(format!(
                "{} tolerates the current heat ({:.1}°C) well",
                name, weather.temperature_c
            ));
        }
    } else if weather.temperature_c < 15.0 {
        score += profile.temperature.cold * 8.0;
        if profile.temperature.cold < 0.0 {
            details.push(format!(
                "Cold conditions ({:.1}°C) are slowing {} growth",
                weather.temperature_c, name
            ));
            recommendations.push(format!("Watch for frost damage on {}", name));
        } else {
            details.push(format!(
                "Cool weather ({:.1}°C) suits {} at this stage",
                weather.temperature_c, name
            ));
        }
    } else {
        score += profile.temperature.optimal * 5.0;
        details.push(format!(
            "Temperatures around {:.1}°C are in a comfortable band for {}",
            weather.temperature_c, name
        ));
    }

    // Precipitation, inferred from the free-text condition
    let condition = weather.condition_text();
    let is_rainy = condition.contains("rain")
        || condition.contains("shower")
        || condition.contains("drizzle");
    if is_rainy {
        if condition.contains("heavy") || condition.contains("storm") {
            score += profile.excess_rain * 12.0;
            details.push(format!("Heavy rain risks waterlogging {} fields", name));
            if profile.excess_rain < -0.5 {
                recommendations
                    .push("Clear field drainage channels before the next spell".to_string());
            }
        } else {
            score += profile.rain * 8.0;
            if profile.rain >= 0.0 {
                details.push(format!("Light to moderate rain is supporting {}", name));
            } else {
                details.push(format!("Rain at this stage is unhelpful for {}", name));
            }
        }
    } else if (condition.contains("sunny") || condition.contains("clear"))
        && weather.humidity_pct < 30.0
    {
        score += profile.drought * 6.0;
        details.push(format!(
            "Dry, clear weather is raising drought risk for {}",
            name
        ));
        if profile.drought < -0.6 {
            recommendations.push("Mulch and conserve soil moisture where possible".to_string());
        }
    }

    // Humidity
    if weather.humidity_pct > 80.0 {
        score += profile.humidity * 5.0;
        details.push(format!(
            "High humidity ({:.0}%) around {} growing areas",
            weather.humidity_pct, name
        ));
        if profile.humidity < 0.0 {
            recommendations.push(format!(
                "Scout {} for fungal disease and plan preventive spraying",
                name
            ));
        }
    }

    let score = round1(score.clamp(-MAX_SCORE, MAX_SCORE));

    ImpactAssessment {
        crop: name.to_string(),
        score,
        sentiment: Sentiment::from_score(score),
        details,
        recommendations,
        optimal_conditions: profile.optimal_conditions.to_string(),
        vulnerabilities: profile
            .vulnerabilities
            .iter()
            .map(|v| v.to_string())
            .collect(),
    }
}

/// Market factor categories a crop's impact can be adjusted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FactorKind {
    Weather,
    Demand,
    Supply,
    Policy,
    Global,
    Other,
}

impl FactorKind {
    /// Parse a stored factor-type string. Unknown strings map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weather" => FactorKind::Weather,
            "demand" => FactorKind::Demand,
            "supply" => FactorKind::Supply,
            "policy" => FactorKind::Policy,
            "global" | "global-trade" | "global_trade" => FactorKind::Global,
            _ => FactorKind::Other,
        }
    }
}

/// A market factor's impact adjusted for one crop's sensitivities.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FactorAdjustment {
    /// Base impact scaled by the crop's sensitivity, one decimal place
    pub adjusted_score: f64,
    /// The multiplier that was applied
    pub multiplier: f64,
    /// Sentiment label for the adjusted score
    pub sentiment: Sentiment,
    /// Crop-specific reading of the factor, when one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Advice carried over from the weather assessment, when delegated
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// Multiplier phrasing threshold: coefficients above this read as "highly
/// sensitive" / "internationally tied".
const STRONG_COEFFICIENT: f64 = 0.7;

/// Fallback multiplier for factor kinds the model has no coefficient for.
const UNKNOWN_FACTOR_MULTIPLIER: f64 = 0.5;

/// Adjust a base factor impact for one crop.
///
/// Weather factors delegate to [`assess_weather_impact`] when a reading is
/// available; the remaining kinds scale the base impact by the matching
/// profile coefficient.
pub fn adjust_factor(
    crop_name: &str,
    kind: FactorKind,
    base_impact: f64,
    weather: Option<&WeatherReading>,
) -> FactorAdjustment {
    let profile = SensitivityProfile::lookup(crop_name);

    if kind == FactorKind::Weather {
        if let Some(reading) = weather {
            let assessment = assess_weather_impact(crop_name, reading);
            let base = if base_impact == 0.0 { 1.0 } else { base_impact };
            return FactorAdjustment {
                adjusted_score: assessment.score,
                multiplier: round1(assessment.score / base),
                sentiment: assessment.sentiment,
                description: assessment.details.first().cloned(),
                recommendations: assessment.recommendations,
            };
        }
        // No reading available — approximate with rainfall sensitivity.
        let multiplier = if base_impact > 0.0 {
            profile.rain
        } else {
            profile.excess_rain
        };
        return scaled(base_impact, multiplier, None);
    }

    match kind {
        FactorKind::Demand => scaled(base_impact, profile.demand, None),
        FactorKind::Supply => scaled(base_impact, profile.supply, None),
        FactorKind::Policy => {
            let description = if profile.policy > STRONG_COEFFICIENT {
                format!(
                    "{} is highly sensitive to policy and support-price announcements",
                    profile.name
                )
            } else {
                format!("Policy changes have a moderate effect on {}", profile.name)
            };
            scaled(base_impact, profile.policy, Some(description))
        }
        FactorKind::Global => {
            let description = if profile.global_trade > STRONG_COEFFICIENT {
                format!(
                    "{} prices are closely tied to international markets",
                    profile.name
                )
            } else {
                format!("{} trades mostly in domestic markets", profile.name)
            };
            scaled(base_impact, profile.global_trade, Some(description))
        }
        FactorKind::Weather | FactorKind::Other => {
            scaled(base_impact, UNKNOWN_FACTOR_MULTIPLIER, None)
        }
    }
}

fn scaled(base_impact: f64, multiplier: f64, description: Option<String>) -> FactorAdjustment {
    let adjusted_score = round1(base_impact * multiplier);
    FactorAdjustment {
        adjusted_score,
        multiplier,
        sentiment: Sentiment::from_score(adjusted_score),
        description,
        recommendations: Vec::new(),
    }
}

/// One crop's position in a weather-driven ranking.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CropRanking {
    /// Crop display name
    pub crop: String,
    /// Profile table key
    pub crop_key: String,
    /// Weather impact score
    pub score: f64,
    /// Sentiment label for the score
    pub sentiment: Sentiment,
    /// Leading observation from the assessment
    pub reason: String,
    /// Static description of preferred conditions
    pub optimal_conditions: String,
}

/// Rank crops by how well the current weather suits them, best first.
///
/// Defaults to every known profile when no crop list is supplied. Ties keep
/// input order (stable sort), so rankings are reproducible.
pub fn rank_crops(weather: &WeatherReading, crops: Option<&[String]>) -> Vec<CropRanking> {
    let names: Vec<String> = match crops {
        Some(list) => list.to_vec(),
        None => SensitivityProfile::known_keys()
            .map(|k| k.to_string())
            .collect(),
    };

    let mut rankings: Vec<CropRanking> = names
        .iter()
        .map(|name| {
            let (key, _) = SensitivityProfile::lookup_entry(name);
            let assessment = assess_weather_impact(name, weather);
            let reason = assessment
                .details
                .first()
                .cloned()
                .unwrap_or_else(|| format!("Conditions are moderate for {}", assessment.crop));
            CropRanking {
                crop: assessment.crop,
                crop_key: key.to_string(),
                score: assessment.score,
                sentiment: assessment.sentiment,
                reason,
                optimal_conditions: assessment.optimal_conditions,
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rankings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(temperature_c: f64, condition: &str, humidity_pct: f64) -> WeatherReading {
        WeatherReading {
            temperature_c,
            feels_like_c: temperature_c,
            humidity_pct,
            condition: condition.to_string(),
            description: condition.to_string(),
            wind_speed_ms: 2.0,
            pressure_hpa: 1012.0,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_lookup_exact_key() {
        let profile = SensitivityProfile::lookup("wheat");
        assert_eq!(profile.name, "Wheat");
    }

    #[test]
    fn test_lookup_case_and_whitespace() {
        let canonical = SensitivityProfile::lookup("rice");
        let variants = ["Rice", " rice ", "RICE", "  Rice\t"];
        for v in variants {
            let profile = SensitivityProfile::lookup(v);
            assert_eq!(profile.name, canonical.name, "variant {:?}", v);
            assert_eq!(profile.rain, canonical.rain);
        }
    }

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(SensitivityProfile::lookup("BASMATI rice").name, "Rice");
        assert_eq!(SensitivityProfile::lookup("paddy").name, "Rice");
        assert_eq!(SensitivityProfile::lookup("soya chunks").name, "Soyabean");
        assert_eq!(SensitivityProfile::lookup("sweet corn").name, "Maize");
    }

    #[test]
    fn test_lookup_unknown_falls_back_to_default() {
        let profile = SensitivityProfile::lookup("dragonfruit");
        assert_eq!(profile.name, "General crop");
    }

    #[test]
    fn test_lookup_blank_falls_back_to_default() {
        assert_eq!(SensitivityProfile::lookup("").name, "General crop");
        assert_eq!(SensitivityProfile::lookup("   ").name, "General crop");
    }

    #[test]
    fn test_sentiment_thresholds_are_strict() {
        assert_eq!(Sentiment::from_score(3.0), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(-3.0), Sentiment::Negative);
        assert_eq!(Sentiment::from_score(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(2.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-2.0), Sentiment::Neutral);
    }

    #[test]
    fn test_impact_score_is_bounded() {
        // Sweep a grid of temperature and humidity against every profile;
        // the clamped score must stay inside [-10, 10].
        let conditions = ["clear sky", "light rain", "heavy rain storm", "sunny"];
        for key in SensitivityProfile::known_keys() {
            for temp in [-20.0, 0.0, 14.9, 25.0, 35.1, 48.0] {
                for humidity in [5.0, 29.0, 50.0, 81.0, 100.0] {
                    for condition in conditions {
                        let assessment =
                            assess_weather_impact(key, &reading(temp, condition, humidity));
                        assert!(
                            (-10.0..=10.0).contains(&assessment.score),
                            "{} at {}°C/{}%/{}: {}",
                            key,
                            temp,
                            humidity,
                            condition,
                            assessment.score
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_impact_is_deterministic() {
        let w = reading(28.0, "light rain", 75.0);
        let a = assess_weather_impact("rice", &w);
        let b = assess_weather_impact("rice", &w);
        assert_eq!(a.score, b.score);
        assert_eq!(a.details, b.details);
        assert_eq!(a.recommendations, b.recommendations);
    }

    #[test]
    fn test_rice_loves_light_rain() {
        // 28°C optimal (0.7 * 5) + light rain (0.8 * 8) = 9.9
        let assessment = assess_weather_impact("rice", &reading(28.0, "light rain", 75.0));
        assert_eq!(assessment.score, 9.9);
        assert_eq!(assessment.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_heat_triggers_irrigation_advice() {
        let assessment = assess_weather_impact("wheat", &reading(38.0, "sunny", 40.0));
        assert!(assessment.score < 0.0);
        assert!(assessment
            .recommendations
            .iter()
            .any(|r| r.contains("Irrigate")));
    }

    #[test]
    fn test_cold_triggers_frost_watch_for_sensitive_crops() {
        let assessment = assess_weather_impact("tomato", &reading(8.0, "clear sky", 50.0));
        assert!(assessment
            .recommendations
            .iter()
            .any(|r| r.contains("frost")));
    }

    #[test]
    fn test_cold_tolerant_crop_gets_no_frost_warning() {
        // Wheat's cold coefficient is positive — cool weather helps it.
        let assessment = assess_weather_impact("wheat", &reading(10.0, "clear sky", 50.0));
        assert!(assessment.recommendations.is_empty());
        assert!(assessment.score > 0.0);
    }

    #[test]
    fn test_heavy_rain_triggers_drainage_advice() {
        let assessment = assess_weather_impact("tomato", &reading(25.0, "heavy rain", 70.0));
        assert!(assessment
            .recommendations
            .iter()
            .any(|r| r.contains("drainage")));
    }

    #[test]
    fn test_light_rain_has_no_recommendation() {
        let assessment = assess_weather_impact("rice", &reading(28.0, "light rain", 60.0));
        assert!(assessment.recommendations.is_empty());
    }

    #[test]
    fn test_drought_branch_requires_low_humidity() {
        let dry = assess_weather_impact("soyabean", &reading(30.0, "clear sky", 20.0));
        let humid = assess_weather_impact("soyabean", &reading(30.0, "clear sky", 60.0));
        assert!(dry.score < humid.score);
        assert!(dry
            .recommendations
            .iter()
            .any(|r| r.contains("soil moisture")));
    }

    #[test]
    fn test_high_humidity_fungal_advice() {
        let assessment = assess_weather_impact("potato", &reading(22.0, "mist", 90.0));
        assert!(assessment
            .recommendations
            .iter()
            .any(|r| r.contains("fungal")));
    }

    #[test]
    fn test_assessment_carries_static_metadata() {
        let assessment = assess_weather_impact("onion", &reading(25.0, "clear sky", 50.0));
        assert!(!assessment.optimal_conditions.is_empty());
        assert!(!assessment.vulnerabilities.is_empty());
    }

    #[test]
    fn test_factor_kind_parse() {
        assert_eq!(FactorKind::parse("weather"), FactorKind::Weather);
        assert_eq!(FactorKind::parse("Policy"), FactorKind::Policy);
        assert_eq!(FactorKind::parse("global"), FactorKind::Global);
        assert_eq!(FactorKind::parse("sunspots"), FactorKind::Other);
    }

    #[test]
    fn test_adjust_factor_wheat_policy() {
        // Wheat's policy coefficient is 0.9: 15.0 * 0.9 = 13.5, strongly worded.
        let adj = adjust_factor("wheat", FactorKind::Policy, 15.0, None);
        assert_eq!(adj.adjusted_score, 13.5);
        assert_eq!(adj.multiplier, 0.9);
        assert_eq!(adj.sentiment, Sentiment::Positive);
        assert!(adj.description.unwrap().contains("highly sensitive"));
    }

    #[test]
    fn test_adjust_factor_tomato_global() {
        // Tomato's global coefficient is 0.3: 10.0 * 0.3 = 3.0, domestic phrasing.
        let adj = adjust_factor("tomato", FactorKind::Global, 10.0, None);
        assert_eq!(adj.adjusted_score, 3.0);
        assert!(adj.description.unwrap().contains("domestic markets"));
    }

    #[test]
    fn test_adjust_factor_demand_supply_have_no_description() {
        let demand = adjust_factor("onion", FactorKind::Demand, 5.0, None);
        assert_eq!(demand.adjusted_score, 4.5);
        assert!(demand.description.is_none());

        let supply = adjust_factor("onion", FactorKind::Supply, 5.0, None);
        assert_eq!(supply.adjusted_score, -4.5);
        assert_eq!(supply.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_adjust_factor_unknown_kind() {
        let adj = adjust_factor("rice", FactorKind::Other, 8.0, None);
        assert_eq!(adj.multiplier, 0.5);
        assert_eq!(adj.adjusted_score, 4.0);
        assert!(adj.description.is_none());
    }

    #[test]
    fn test_adjust_factor_weather_delegates_to_assessment() {
        let w = reading(28.0, "light rain", 75.0);
        let adj = adjust_factor("rice", FactorKind::Weather, 5.0, Some(&w));
        let assessment = assess_weather_impact("rice", &w);
        assert_eq!(adj.adjusted_score, assessment.score);
        assert_eq!(adj.multiplier, round1(assessment.score / 5.0));
        assert!(adj.description.is_some());
    }

    #[test]
    fn test_adjust_factor_weather_zero_base_avoids_division() {
        let w = reading(28.0, "light rain", 75.0);
        let adj = adjust_factor("rice", FactorKind::Weather, 0.0, Some(&w));
        assert!(adj.multiplier.is_finite());
        assert_eq!(adj.multiplier, adj.adjusted_score);
    }

    #[test]
    fn test_adjust_factor_weather_without_reading() {
        let positive = adjust_factor("rice", FactorKind::Weather, 5.0, None);
        assert_eq!(positive.multiplier, 0.8); // rice rain coefficient

        let negative = adjust_factor("rice", FactorKind::Weather, -5.0, None);
        assert_eq!(negative.multiplier, -0.4); // rice excess-rain coefficient
    }

    #[test]
    fn test_rank_crops_descending_and_complete() {
        let w = reading(28.0, "light rain", 75.0);
        let rankings = rank_crops(&w, None);
        assert_eq!(rankings.len(), SensitivityProfile::known_keys().count());
        for pair in rankings.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_rank_crops_rice_beats_wheat_in_monsoon() {
        let w = reading(28.0, "light rain", 75.0);
        let rankings = rank_crops(&w, None);
        let rice_pos = rankings.iter().position(|r| r.crop_key == "rice").unwrap();
        let wheat_pos = rankings.iter().position(|r| r.crop_key == "wheat").unwrap();
        assert!(rice_pos < wheat_pos);
    }

    #[test]
    fn test_rank_crops_with_explicit_list() {
        let w = reading(25.0, "clear sky", 50.0);
        let list = vec!["wheat".to_string(), "unknown-berry".to_string()];
        let rankings = rank_crops(&w, Some(&list));
        assert_eq!(rankings.len(), 2);
        assert!(rankings.iter().any(|r| r.crop_key == "default"));
    }

    #[test]
    fn test_rank_crops_reason_is_populated() {
        let w = reading(25.0, "clear sky", 50.0);
        for ranking in rank_crops(&w, None) {
            assert!(!ranking.reason.is_empty());
        }
    }
}
