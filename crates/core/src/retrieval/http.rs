use crate::config::Settings;
use crate::retrieval::{ScoredPassage, SemanticIndex};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const SEARCH_PATH: &str = "/v1/search";

/// Client for the external semantic index server. The server owns the
/// embedding model and the persisted collection; this side only sends the
/// query text and a result cap.
#[derive(Debug, Clone)]
pub struct HttpSemanticIndex {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSemanticIndex {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .rule_index_base_url
            .as_deref()
            .context("RULE_INDEX_BASE_URL is required")?
            .to_string();

        let timeout_secs = std::env::var("RULE_INDEX_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build rule index http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    text: String,
    #[serde(default = "unknown_source")]
    source: String,
}

fn unknown_source() -> String {
    "Unknown".to_string()
}

#[async_trait::async_trait]
impl SemanticIndex for HttpSemanticIndex {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<ScoredPassage>> {
        let res = self
            .http
            .post(self.url())
            .json(&SearchRequest { query, k })
            .send()
            .await
            .context("semantic index request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read semantic index response")?;
        anyhow::ensure!(status.is_success(), "semantic index HTTP {status}: {text}");

        let parsed = serde_json::from_str::<SearchResponse>(&text)
            .with_context(|| format!("semantic index response is not valid JSON: {text}"))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|hit| ScoredPassage {
                text: hit.text,
                source: hit.source,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_search_response_shape() {
        let v = json!({
            "results": [
                {"text": "No single position above 10%.", "source": "rules.pdf"},
                {"text": "Avoid leverage."}
            ]
        });

        let parsed: SearchResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].source, "rules.pdf");
        assert_eq!(parsed.results[1].source, "Unknown");
    }
}
