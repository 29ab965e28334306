//! News search client.
//!
//! Queries a NewsAPI-compatible upstream for agricultural market headlines.
//! When the upstream is unreachable or misconfigured the routes fall back to
//! recent rows from the `news` table, and past that to a small set of canned
//! sample articles, so the dashboard never renders an empty panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// Maximum articles requested from the upstream per call.
const PAGE_SIZE: u8 = 20;

/// A news article, from the upstream API, the database, or the samples.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Article {
    /// Headline
    pub title: String,
    /// One-paragraph summary
    pub summary: String,
    /// Publisher name
    pub source: String,
    /// Link to the full story, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Publication timestamp, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

// --- NewsAPI JSON response types ---

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<DateTime<Utc>>,
    source: NewsApiSource,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Client for a NewsAPI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Search for articles matching a query.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, AppError> {
        let url = format!(
            "{}/v2/everything?q={}&sortBy=publishedAt&pageSize={}&apiKey={}",
            self.base_url,
            urlencode(query),
            PAGE_SIZE,
            self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("news request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "news service returned HTTP {}",
                response.status()
            )));
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("news JSON parse error: {}", e)))?;

        Ok(body
            .articles
            .into_iter()
            .filter_map(article_from_api)
            .collect())
    }
}

/// Convert an upstream article, dropping entries without a usable headline.
fn article_from_api(a: NewsApiArticle) -> Option<Article> {
    let title = a.title.filter(|t| !t.trim().is_empty())?;
    Some(Article {
        title,
        summary: a.description.unwrap_or_default(),
        source: a.source.name.unwrap_or_else(|| "Unknown".to_string()),
        url: a.url,
        published_at: a.published_at,
    })
}

/// Minimal percent-encoding for query strings.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Canned articles served when both the news upstream and the database are
/// unavailable.
pub fn sample_articles() -> Vec<Article> {
    vec![
        Article {
            title: "Monsoon revival lifts kharif sowing across central India".to_string(),
            summary: "Improved rainfall over the past fortnight has accelerated paddy and \
                      soyabean sowing, easing concerns about acreage shortfalls."
                .to_string(),
            source: "Sample Wire".to_string(),
            url: None,
            published_at: None,
        },
        Article {
            title: "Wheat procurement closes above target in northern states".to_string(),
            summary: "Government agencies report procurement marginally above target, with \
                      support prices keeping mandi arrivals steady."
                .to_string(),
            source: "Sample Wire".to_string(),
            url: None,
            published_at: None,
        },
        Article {
            title: "Onion prices firm as storage stocks run down".to_string(),
            summary: "Wholesale onion prices edged higher this week as cold-storage stocks \
                      depleted ahead of the next harvest."
                .to_string(),
            source: "Sample Wire".to_string(),
            url: None,
            published_at: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sample_articles_are_well_formed() {
        let articles = sample_articles();
        assert!(!articles.is_empty());
        for a in articles {
            assert!(!a.title.is_empty());
            assert!(!a.summary.is_empty());
        }
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("wheat prices"), "wheat+prices");
        assert_eq!(urlencode("rice&paddy"), "rice%26paddy");
        assert_eq!(urlencode("plain"), "plain");
    }

    #[test]
    fn test_article_from_api_drops_blank_titles() {
        let a = NewsApiArticle {
            title: Some("  ".to_string()),
            description: None,
            url: None,
            published_at: None,
            source: NewsApiSource { name: None },
        };
        assert!(article_from_api(a).is_none());
    }

    #[tokio::test]
    async fn test_search_parses_articles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "wheat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "totalResults": 1,
                "articles": [{
                    "source": {"id": null, "name": "AgWire"},
                    "title": "Wheat futures rally",
                    "description": "Futures rose on export demand.",
                    "url": "https://example.com/wheat",
                    "publishedAt": "2026-08-01T06:30:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let client = NewsClient::new(&server.uri(), "test-key");
        let articles = client.search("wheat").await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "AgWire");
        assert!(articles[0].published_at.is_some());
    }

    #[tokio::test]
    async fn test_search_maps_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = NewsClient::new(&server.uri(), "bad-key");
        assert!(matches!(
            client.search("wheat").await,
            Err(AppError::ExternalServiceError(_))
        ));
    }
}
