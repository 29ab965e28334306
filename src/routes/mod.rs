use sqlx::PgPool;

use crate::services::chat::ChatClient;
use crate::services::news::NewsClient;
use crate::services::openweather::WeatherClient;

pub mod chat;
pub mod crops;
pub mod factors;
pub mod health;
pub mod news;
pub mod weather;

/// Shared application state for routes that reach external services.
/// Health uses a bare `PgPool` state instead.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) weather: WeatherClient,
    pub(crate) news: NewsClient,
    pub(crate) chat: ChatClient,
}
