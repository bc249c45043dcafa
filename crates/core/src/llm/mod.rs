pub mod extractive;
pub mod ollama;
pub mod tiered;

pub use tiered::{Tier, TieredGenerator};

/// Sampling knobs passed through to whichever backend answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
}

impl SamplingParams {
    /// Above backend defaults so analyses come out nuanced rather than terse.
    pub const ANALYSIS: SamplingParams = SamplingParams {
        temperature: 0.4,
        top_p: 0.9,
    };

    pub const DOCUMENT_QA: SamplingParams = SamplingParams {
        temperature: 0.3,
        top_p: 0.9,
    };
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    pub backend: &'static str,
    /// True when a generative tier passed its length gate; false when the
    /// deterministic fallback produced the text.
    pub accepted: bool,
}

/// Single capability interface every response-generation backend implements.
/// The tiered generator depends only on this trait.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn list_models(&self) -> anyhow::Result<Vec<String>>;

    /// Model selection is the backend's concern; an unreachable service or an
    /// empty model registry surfaces as an error the caller may absorb.
    async fn generate(&self, prompt: &str, params: SamplingParams) -> anyhow::Result<String>;
}
