use crate::config::Settings;
use crate::domain::history::{Period, PriceBar, PriceHistory};
use crate::domain::summary::CompanyProfile;
use crate::market::MarketDataProvider;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const HISTORY_PATH: &str = "/v1/price_history";
const PROFILE_PATH: &str = "/v1/company_profile";

#[derive(Debug, Clone)]
pub struct HttpMarketData {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retries: u32,
}

impl HttpMarketData {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_market_data_base_url()?.to_string();
        let api_key = settings.market_data_api_key.clone();

        let timeout_secs = std::env::var("MARKET_DATA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("MARKET_DATA_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            retries,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn get_with_retries(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let res = self.fetch_once(path, query).await;
            match res {
                Ok(body) => return Ok(body),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, error = %err, "market data fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// None on 404: the ticker is unknown to the service.
    async fn fetch_once(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>> {
        let res = self
            .http
            .get(self.url(path))
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        anyhow::ensure!(status.is_success(), "market data HTTP {status}: {text}");
        Ok(Some(text))
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    bars: Vec<WireBar>,
}

#[derive(Debug, Deserialize)]
struct WireBar {
    date: chrono::NaiveDate,
    close: f64,
    #[serde(default)]
    volume: f64,
}

#[async_trait::async_trait]
impl MarketDataProvider for HttpMarketData {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
    ) -> Result<Option<PriceHistory>> {
        let query = [
            ("ticker", ticker.to_string()),
            ("period", period.as_str().to_string()),
        ];

        let Some(body) = self.get_with_retries(HISTORY_PATH, &query).await? else {
            return Ok(None);
        };

        let parsed = serde_json::from_str::<HistoryResponse>(&body)
            .with_context(|| format!("price history response is not valid JSON: {body}"))?;

        if parsed.bars.is_empty() {
            return Ok(None);
        }

        let bars: Vec<PriceBar> = parsed
            .bars
            .into_iter()
            .map(|b| PriceBar {
                date: b.date,
                close: b.close,
                volume: b.volume,
            })
            .collect();

        PriceHistory::try_new(ticker, period, bars).map(Some)
    }

    async fn fetch_info(&self, ticker: &str) -> Result<CompanyProfile> {
        let query = [("ticker", ticker.to_string())];

        let Some(body) = self.get_with_retries(PROFILE_PATH, &query).await? else {
            // Unknown profile is not fatal; the summary degrades to Unknown.
            return Ok(CompanyProfile::default());
        };

        serde_json::from_str::<CompanyProfile>(&body)
            .with_context(|| format!("company profile response is not valid JSON: {body}"))
    }
}
