use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::models::*;

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Rate limited – retry after {retry_after:.1}s")]
    RateLimited { retry_after: f64 },
    #[error("Unauthorized – check your API token")]
    Unauthorized,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Everything the timetable screen needs, fetched together.
#[derive(Debug, Clone)]
pub struct ScheduleBundle {
    pub config: TimetableConfig,
    pub options: ScheduleOptions,
    pub slots: Vec<LessonSlot>,
}

// ─── Client ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SkoolwayClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl SkoolwayClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Skoolway URL: {base_url}"))?;

        let client = Client::builder()
            .user_agent(concat!("skoolway-tui/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        let full = format!("/api{}", path);
        self.base_url
            .join(&full)
            .with_context(|| format!("Bad API path: {path}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.api_url(path).map_err(ApiError::Other)?;
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.api_url(path).map_err(ApiError::Other)?;
        debug!(%method, %url, "sending");
        let resp = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    async fn check_status(resp: Response) -> Result<Response, ApiError> {
        let err = match resp.status() {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Api {
                status: 403,
                message: "Forbidden – insufficient permissions".into(),
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let retry = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(1.0);
                ApiError::RateLimited { retry_after: retry }
            }
            s if s.is_client_error() || s.is_server_error() => {
                let status = s.as_u16();
                let message = resp.text().await.unwrap_or_default();
                ApiError::Api { status, message }
            }
            _ => return Ok(resp),
        };
        warn!(error = %err, "request failed");
        Err(err)
    }

    // ── Session ─────────────────────────────────────────────────────────

    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.get_json("/auth/me").await
    }

    // ── Timetable config ────────────────────────────────────────────────

    pub async fn get_schedule_config(&self) -> Result<TimetableConfig, ApiError> {
        self.get_json("/schedule/config").await
    }

    pub async fn update_schedule_config(
        &self,
        config: &TimetableConfig,
    ) -> Result<TimetableConfig, ApiError> {
        self.send_json(reqwest::Method::PUT, "/schedule/config", config)
            .await
    }

    // ── Options ─────────────────────────────────────────────────────────

    pub async fn get_schedule_options(&self) -> Result<ScheduleOptions, ApiError> {
        self.get_json("/schedule/options").await
    }

    // ── Slots ───────────────────────────────────────────────────────────

    pub async fn list_slots(&self) -> Result<Vec<LessonSlot>, ApiError> {
        self.get_json("/schedule/slots").await
    }

    pub async fn create_slot(&self, slot: &NewLessonSlot) -> Result<LessonSlot, ApiError> {
        self.send_json(reqwest::Method::POST, "/schedule/slots", slot)
            .await
    }

    /// Config, options and slots requested concurrently; the first failure
    /// aborts the lot.
    pub async fn fetch_schedule_bundle(&self) -> Result<ScheduleBundle, ApiError> {
        let (config, options, slots) = tokio::try_join!(
            self.get_schedule_config(),
            self.get_schedule_options(),
            self.list_slots(),
        )?;
        debug!(
            periods = config.period_count,
            classes = options.classes.len(),
            slots = slots.len(),
            "schedule bundle fetched"
        );
        Ok(ScheduleBundle {
            config,
            options,
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_paths_are_rooted_under_api() {
        let client = SkoolwayClient::new("https://demo.skoolway.app", "token").unwrap();
        assert_eq!(
            client.api_url("/schedule/slots").unwrap().as_str(),
            "https://demo.skoolway.app/api/schedule/slots"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(SkoolwayClient::new("not a url", "token").is_err());
    }

    #[test]
    fn error_messages_are_user_facing() {
        let err = ApiError::Api {
            status: 422,
            message: "periodCount too large".into(),
        };
        assert_eq!(err.to_string(), "HTTP 422: periodCount too large");
        assert_eq!(
            ApiError::Unauthorized.to_string(),
            "Unauthorized – check your API token"
        );
    }
}
