use crate::config::Settings;
use crate::llm::ollama::OllamaBackend;
use crate::llm::{extractive, GenerationBackend, GenerationResult, SamplingParams};

/// Minimum trimmed response lengths per tier. The compact model's outputs
/// run terser, so its bar sits lower.
pub const PRIMARY_MIN_CHARS: usize = 100;
pub const COMPACT_MIN_CHARS: usize = 50;

pub struct Tier {
    pub backend: Box<dyn GenerationBackend>,
    pub min_chars: usize,
}

/// Ordered backends with quality-gated fallthrough. The terminal tier is the
/// deterministic extractive summary, so generation as a whole cannot fail.
pub struct TieredGenerator {
    tiers: Vec<Tier>,
}

impl TieredGenerator {
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(vec![
            Tier {
                backend: Box::new(OllamaBackend::primary(settings)?),
                min_chars: PRIMARY_MIN_CHARS,
            },
            Tier {
                backend: Box::new(OllamaBackend::compact(settings)?),
                min_chars: COMPACT_MIN_CHARS,
            },
        ]))
    }

    pub async fn generate(&self, prompt: &str, params: SamplingParams) -> GenerationResult {
        match self.try_generative_tiers(prompt, params).await {
            Some(result) => result,
            None => GenerationResult {
                text: extractive::fallback(prompt),
                backend: extractive::BACKEND_NAME,
                accepted: false,
            },
        }
    }

    /// Document-only variant: when every generative tier falls through, the
    /// degraded answer excerpts the retrieved passages instead of mining the
    /// prompt for metric lines.
    pub async fn generate_or_excerpt(
        &self,
        prompt: &str,
        params: SamplingParams,
        passages: &[crate::retrieval::ScoredPassage],
    ) -> GenerationResult {
        match self.try_generative_tiers(prompt, params).await {
            Some(result) => result,
            None => GenerationResult {
                text: extractive::passage_excerpt(passages),
                backend: extractive::BACKEND_NAME,
                accepted: false,
            },
        }
    }

    /// None only when every tier was unavailable or rejected; all failures
    /// are absorbed here.
    async fn try_generative_tiers(
        &self,
        prompt: &str,
        params: SamplingParams,
    ) -> Option<GenerationResult> {
        for tier in &self.tiers {
            let backend = tier.backend.name();
            match tier.backend.generate(prompt, params).await {
                Ok(text) => {
                    let text = text.trim();
                    if text.len() > tier.min_chars {
                        return Some(GenerationResult {
                            text: text.to_string(),
                            backend,
                            accepted: true,
                        });
                    }
                    tracing::warn!(
                        backend,
                        len = text.len(),
                        min = tier.min_chars,
                        "response below quality threshold; trying next tier"
                    );
                }
                Err(err) => {
                    tracing::warn!(backend, error = %err, "backend unavailable; trying next tier");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticBackend {
        label: &'static str,
        reply: Result<String, &'static str>,
    }

    #[async_trait::async_trait]
    impl GenerationBackend for StaticBackend {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn list_models(&self) -> anyhow::Result<Vec<String>> {
            Ok(vec!["stub".to_string()])
        }

        async fn generate(&self, _prompt: &str, _params: SamplingParams) -> anyhow::Result<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(msg) => anyhow::bail!("{msg}"),
            }
        }
    }

    fn tier(label: &'static str, reply: Result<String, &'static str>, min_chars: usize) -> Tier {
        Tier {
            backend: Box::new(StaticBackend { label, reply }),
            min_chars,
        }
    }

    fn long_reply() -> String {
        "An exploratory reading of the data suggests several trade-offs worth weighing carefully before any decision."
            .repeat(2)
    }

    const VOLATILE_PROMPT: &str =
        "FINANCIAL DATA:\n  Annualized Volatility: 22.0% (Moderate risk)\nUSER QUESTION:\nq";

    #[tokio::test]
    async fn first_acceptable_tier_wins() {
        let generator = TieredGenerator::new(vec![
            tier("ollama", Ok(long_reply()), PRIMARY_MIN_CHARS),
            tier("ollama_compact", Ok(long_reply()), COMPACT_MIN_CHARS),
        ]);

        let result = generator.generate(VOLATILE_PROMPT, SamplingParams::ANALYSIS).await;
        assert_eq!(result.backend, "ollama");
        assert!(result.accepted);
    }

    #[tokio::test]
    async fn unavailable_primary_falls_to_secondary() {
        let generator = TieredGenerator::new(vec![
            tier("ollama", Err("connection refused"), PRIMARY_MIN_CHARS),
            tier("ollama_compact", Ok(long_reply()), COMPACT_MIN_CHARS),
        ]);

        let result = generator.generate(VOLATILE_PROMPT, SamplingParams::ANALYSIS).await;
        assert_eq!(result.backend, "ollama_compact");
        assert!(result.accepted);
    }

    #[tokio::test]
    async fn short_outputs_fall_through_to_extractive() {
        let generator = TieredGenerator::new(vec![
            tier("ollama", Ok("too short".to_string()), PRIMARY_MIN_CHARS),
            tier("ollama_compact", Ok("also short".to_string()), COMPACT_MIN_CHARS),
        ]);

        let result = generator.generate(VOLATILE_PROMPT, SamplingParams::ANALYSIS).await;
        assert_eq!(result.backend, extractive::BACKEND_NAME);
        assert!(!result.accepted);
        assert!(!result.text.trim().is_empty());
        assert!(result.text.contains("Annualized Volatility: 22.0%"));
    }

    #[tokio::test]
    async fn no_tiers_still_produces_a_response() {
        let generator = TieredGenerator::new(Vec::new());
        let result = generator.generate(VOLATILE_PROMPT, SamplingParams::ANALYSIS).await;
        assert_eq!(result.backend, extractive::BACKEND_NAME);
        assert!(!result.text.trim().is_empty());
    }
}
