use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Proxy, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    dota2::{MatchDetail, MatchSummary, LOBBY_RANKED},
    rate::RateControl,
    source::Provider,
};

// we use separate error types for construction and request

#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("ProxyError: {0} from scheme: {1}.")]
    ProxyError(reqwest::Error, String),
    #[error("BuildError: {0}.")]
    BuildError(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to retrive result from web API: {0}")]
    ConnectionError(#[from] reqwest::Error),
    #[error("Failed to decode web API response: {0}")]
    DecodeError(serde_json::Error, String),
    #[error("Too Many Requests")]
    TooManyRequests,
    #[error("Other Response: {0}")]
    OtherResponse(reqwest::StatusCode),
}

impl RequestError {
    /// Errors worth another attempt; a bad payload or a 404 will not fix itself.
    pub fn is_transient(&self) -> bool {
        match self {
            RequestError::ConnectionError(_) | RequestError::TooManyRequests => true,
            RequestError::OtherResponse(status) => status.is_server_error(),
            RequestError::DecodeError(..) => false,
        }
    }
}

/// OpenDota REST client.
pub struct Client {
    client: reqwest::Client,
    base_url: String,
    rate: RateControl,
    retries: usize,
}

impl Client {
    pub const DEFAULT_URL: &str = "https://api.opendota.com/api";

    pub fn new(
        base_url: &str,
        proxy: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConstructionError> {
        let builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(std::cmp::min(timeout, Duration::from_secs(10)));
        let builder = match proxy {
            Some(proxy) => {
                let proxy = Proxy::all(proxy)
                    .map_err(|err| ConstructionError::ProxyError(err, proxy.to_string()))?;
                builder.proxy(proxy)
            }
            None => builder,
        };
        let client = builder.build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            rate: RateControl::new(0, 0),
            retries: 0,
        })
    }

    pub fn with_rate(mut self, rate: RateControl) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Ranked matches of the last `days` days, newest first.
    pub async fn get_player_matches(
        &self,
        account_id: u64,
        days: u32,
    ) -> Result<Vec<MatchSummary>, RequestError> {
        let url = format!("{}/players/{}/matches", self.base_url, account_id);
        let query = [
            ("date", days.to_string()),
            ("lobby_type", LOBBY_RANKED.to_string()),
        ];
        self.get_with_retry(&url, &query).await
    }

    pub async fn get_match(&self, match_id: u64) -> Result<MatchDetail, RequestError> {
        let url = format!("{}/matches/{}", self.base_url, match_id);
        self.get_with_retry(&url, &[]).await
    }

    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RequestError> {
        let attempt = || async move { self.get::<T>(url, query).await };
        attempt
            .retry(ExponentialBuilder::default().with_max_times(self.retries))
            .when(RequestError::is_transient)
            .notify(|err, after| {
                log::warn!("{} failed: {}, retrying in {}ms", url, err, after.as_millis())
            })
            .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RequestError> {
        self.rate.wait().await;
        log::debug!("GET {}", url);
        let resp = self.client.get(url).query(query).send().await?;
        match resp.status() {
            StatusCode::OK => {
                self.rate.speed_up().await;
                let content = resp.text().await?;
                serde_json::from_str(&content)
                    .map_err(|err| RequestError::DecodeError(err, content))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                // we're requesting API too frequently, so slowing it down a little.
                self.rate.slow_down().await;
                Err(RequestError::TooManyRequests)
            }
            other => Err(RequestError::OtherResponse(other)),
        }
    }
}

#[async_trait]
impl Provider for Client {
    async fn player_matches(
        &self,
        account_id: u64,
        since: i64,
    ) -> Result<Vec<MatchSummary>, RequestError> {
        let now = chrono::Utc::now().timestamp();
        self.get_player_matches(account_id, days_covering(now, since))
            .await
    }

    async fn match_detail(&self, match_id: u64) -> Result<MatchDetail, RequestError> {
        self.get_match(match_id).await
    }
}

/// Smallest `date` parameter whose lookback still reaches `since`.
fn days_covering(now: i64, since: i64) -> u32 {
    const DAY: i64 = 24 * 60 * 60;
    let days = (now - since).max(0) / DAY + 1;
    u32::try_from(days).unwrap_or(u32::MAX)
}
