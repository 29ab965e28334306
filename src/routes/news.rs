//! News endpoint with layered fallback.
//!
//! Resolution order: news upstream → stored `news` rows → canned samples.
//! The response carries `degraded: true` whenever the upstream didn't answer.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::queries;
use crate::routes::AppState;
use crate::services::news::{sample_articles, Article};

/// Query used when the caller doesn't supply one.
const DEFAULT_QUERY: &str = "india agriculture market";

#[derive(Debug, Deserialize, IntoParams)]
pub struct NewsQuery {
    /// Search terms (defaults to a general agricultural-market query)
    pub q: Option<String>,
}

/// News response; `degraded` is true when the upstream search failed and
/// articles came from the database or the samples.
#[derive(Debug, Serialize, ToSchema)]
pub struct NewsResponse {
    pub articles: Vec<Article>,
    pub degraded: bool,
}

/// Search agricultural market news.
#[utoipa::path(
    get,
    path = "/api/v1/news",
    tag = "News",
    params(NewsQuery),
    responses(
        (status = 200, description = "News articles, possibly from fallback sources", body = NewsResponse),
    )
)]
pub async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> Json<NewsResponse> {
    let query = params
        .q
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .unwrap_or(DEFAULT_QUERY);

    match state.news.search(query).await {
        Ok(articles) if !articles.is_empty() => {
            return Json(NewsResponse {
                articles,
                degraded: false,
            })
        }
        Ok(_) => {
            tracing::debug!("News upstream returned no articles for '{}'", query);
        }
        Err(e) => {
            tracing::warn!("News upstream unavailable: {}", e);
        }
    }

    // Upstream failed or was empty — try stored rows, then samples.
    match queries::get_recent_news(&state.pool, 20).await {
        Ok(rows) if !rows.is_empty() => Json(NewsResponse {
            articles: rows
                .into_iter()
                .map(|r| Article {
                    title: r.title,
                    summary: r.summary,
                    source: r.source,
                    url: r.url,
                    published_at: Some(r.published_at),
                })
                .collect(),
            degraded: true,
        }),
        Ok(_) => Json(NewsResponse {
            articles: sample_articles(),
            degraded: true,
        }),
        Err(e) => {
            tracing::warn!("Database unavailable for news fallback: {}", e);
            Json(NewsResponse {
                articles: sample_articles(),
                degraded: true,
            })
        }
    }
}
