pub mod domain;
pub mod llm;
pub mod market;
pub mod metrics;
pub mod narrative;
pub mod pipeline;
pub mod prefs;
pub mod prompt;
pub mod retrieval;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
    pub const DEFAULT_PRIMARY_MODEL: &str = "llama3.2";
    pub const DEFAULT_BENCHMARK_TICKER: &str = "SPY";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub market_data_base_url: Option<String>,
        pub market_data_api_key: Option<String>,
        pub rule_index_base_url: Option<String>,
        pub ollama_base_url: String,
        pub ollama_model: String,
        pub compact_model_base_url: Option<String>,
        pub compact_model: Option<String>,
        pub benchmark_ticker: String,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                market_data_api_key: std::env::var("MARKET_DATA_API_KEY").ok(),
                rule_index_base_url: std::env::var("RULE_INDEX_BASE_URL").ok(),
                ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string()),
                ollama_model: std::env::var("OLLAMA_MODEL")
                    .unwrap_or_else(|_| DEFAULT_PRIMARY_MODEL.to_string()),
                compact_model_base_url: std::env::var("COMPACT_MODEL_BASE_URL").ok(),
                compact_model: std::env::var("COMPACT_MODEL").ok(),
                benchmark_ticker: std::env::var("BENCHMARK_TICKER")
                    .unwrap_or_else(|_| DEFAULT_BENCHMARK_TICKER.to_string()),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_market_data_base_url(&self) -> anyhow::Result<&str> {
            self.market_data_base_url
                .as_deref()
                .context("MARKET_DATA_BASE_URL is required")
        }
    }
}
