use crate::config::Settings;
use crate::llm::{GenerationBackend, SamplingParams};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TAGS_PATH: &str = "/api/tags";
const GENERATE_PATH: &str = "/api/generate";

// Liveness probes must answer fast; generation gets a much longer leash.
const LIVENESS_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 120;

const DEFAULT_COMPACT_MODEL: &str = "tinyllama";

/// Client for an Ollama-compatible inference server. Used twice in the tier
/// order: once against the primary server and once against a compact-model
/// endpoint with a lower acceptance bar.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    http: reqwest::Client,
    base_url: String,
    preferred_model: String,
    label: &'static str,
}

impl OllamaBackend {
    pub fn primary(settings: &Settings) -> anyhow::Result<Self> {
        Self::build(
            settings.ollama_base_url.clone(),
            settings.ollama_model.clone(),
            "ollama",
        )
    }

    pub fn compact(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .compact_model_base_url
            .clone()
            .unwrap_or_else(|| settings.ollama_base_url.clone());
        let model = settings
            .compact_model
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPACT_MODEL.to_string());
        Self::build(base_url, model, "ollama_compact")
    }

    fn build(base_url: String, preferred_model: String, label: &'static str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build ollama http client")?;
        Ok(Self {
            http,
            base_url,
            preferred_model,
            label,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn generate_timeout() -> Duration {
        let secs = std::env::var("OLLAMA_GENERATE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_GENERATE_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Preferred model if any registered name contains it, else the first
    /// registered model.
    fn select_model(&self, available: &[String]) -> Option<String> {
        available
            .iter()
            .find(|name| name.contains(&self.preferred_model))
            .or_else(|| available.first())
            .cloned()
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Debug, Deserialize)]
struct TaggedModel {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait::async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn list_models(&self) -> anyhow::Result<Vec<String>> {
        let res = self
            .http
            .get(self.url(TAGS_PATH))
            .timeout(LIVENESS_TIMEOUT)
            .send()
            .await
            .context("ollama liveness request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read ollama tags")?;
        anyhow::ensure!(status.is_success(), "ollama HTTP {status}: {text}");

        let parsed = serde_json::from_str::<TagsResponse>(&text)
            .with_context(|| format!("ollama tags response is not valid JSON: {text}"))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, prompt: &str, params: SamplingParams) -> anyhow::Result<String> {
        let models = self.list_models().await?;
        let model = self
            .select_model(&models)
            .context("no models registered on ollama server")?;

        tracing::info!(backend = self.label, %model, "generating analysis");

        let req = GenerateRequest {
            model: &model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: params.temperature,
                top_p: params.top_p,
            },
        };

        let res = self
            .http
            .post(self.url(GENERATE_PATH))
            .timeout(Self::generate_timeout())
            .json(&req)
            .send()
            .await
            .context("ollama generate request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read ollama generate response")?;
        anyhow::ensure!(status.is_success(), "ollama HTTP {status}: {text}");

        let parsed = serde_json::from_str::<GenerateResponse>(&text)
            .with_context(|| format!("ollama generate response is not valid JSON: {text}"))?;
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend(preferred: &str) -> OllamaBackend {
        OllamaBackend::build(
            "http://localhost:11434".to_string(),
            preferred.to_string(),
            "ollama",
        )
        .unwrap()
    }

    #[test]
    fn prefers_matching_model_name() {
        let b = backend("llama3.2");
        let available = vec![
            "mistral:latest".to_string(),
            "llama3.2:3b".to_string(),
        ];
        assert_eq!(b.select_model(&available).unwrap(), "llama3.2:3b");
    }

    #[test]
    fn falls_back_to_first_available_model() {
        let b = backend("llama3.2");
        let available = vec!["mistral:latest".to_string()];
        assert_eq!(b.select_model(&available).unwrap(), "mistral:latest");
    }

    #[test]
    fn no_models_selects_nothing() {
        let b = backend("llama3.2");
        assert_eq!(b.select_model(&[]), None);
    }

    #[test]
    fn parses_tags_response() {
        let v = json!({"models": [{"name": "llama3.2:3b"}, {"name": "tinyllama:latest"}]});
        let parsed: TagsResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.models.len(), 2);
        assert_eq!(parsed.models[0].name, "llama3.2:3b");
    }

    #[test]
    fn generate_request_serializes_options() {
        let req = GenerateRequest {
            model: "llama3.2:3b",
            prompt: "p",
            stream: false,
            options: GenerateOptions {
                temperature: 0.4,
                top_p: 0.9,
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["stream"], json!(false));
        assert_eq!(v["options"]["temperature"], json!(0.4));
        assert_eq!(v["options"]["top_p"], json!(0.9));
    }
}
