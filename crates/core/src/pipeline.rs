//! Request orchestration. A `Pipeline` is the per-request context object:
//! the caller constructs it with its collaborators and passes it through, so
//! no process-wide provider cache exists.

use crate::config::Settings;
use crate::domain::history::Period;
use crate::domain::preference::PreferenceVector;
use crate::domain::summary::StockSummary;
use crate::llm::{SamplingParams, TieredGenerator};
use crate::market::{HttpMarketData, MarketDataProvider};
use crate::metrics;
use crate::narrative;
use crate::prefs;
use crate::prompt;
use crate::retrieval::{self, HttpSemanticIndex, NullIndex, SemanticIndex};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub response: String,
    pub sources: Vec<String>,
    /// None exactly when the ticker had no usable history.
    pub summary: Option<StockSummary>,
    pub backend: &'static str,
}

#[derive(Debug, Clone)]
pub struct DocumentAnswer {
    pub response: String,
    pub sources: Vec<String>,
}

#[derive(Clone)]
pub struct Pipeline {
    market: Arc<dyn MarketDataProvider>,
    index: Arc<dyn SemanticIndex>,
    generator: Arc<TieredGenerator>,
    benchmark_ticker: String,
}

impl Pipeline {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        index: Arc<dyn SemanticIndex>,
        generator: Arc<TieredGenerator>,
        benchmark_ticker: String,
    ) -> Self {
        Self {
            market,
            index,
            generator,
            benchmark_ticker,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let market = Arc::new(HttpMarketData::from_settings(settings)?);
        let index: Arc<dyn SemanticIndex> = if settings.rule_index_base_url.is_some() {
            Arc::new(HttpSemanticIndex::from_settings(settings)?)
        } else {
            Arc::new(NullIndex)
        };
        let generator = Arc::new(TieredGenerator::from_settings(settings)?);

        Ok(Self::new(
            market,
            index,
            generator,
            settings.benchmark_ticker.clone(),
        ))
    }

    /// Full preference-conditioned analysis for one ticker. Worst case is the
    /// deterministic fallback text; the only terminal condition is a ticker
    /// with no usable history, which comes back as an explanatory outcome
    /// rather than an error.
    pub async fn analyze(
        &self,
        query: &str,
        ticker: &str,
        preferences: PreferenceVector,
        use_rules: bool,
        period: Period,
    ) -> anyhow::Result<AnalysisOutcome> {
        let history = match self.market.fetch_history(ticker, period).await {
            Ok(Some(history)) => history,
            Ok(None) => return Ok(Self::data_unavailable(ticker)),
            Err(err) => {
                tracing::warn!(ticker, error = %err, "history fetch failed");
                return Ok(Self::data_unavailable(ticker));
            }
        };

        // Benchmark/profile context and rule retrieval are independent of each
        // other; run them together. The benchmark stays a 1-year window no
        // matter which period the analysis uses.
        let benchmark_fut = async {
            match self
                .market
                .fetch_history(&self.benchmark_ticker, Period::OneYear)
                .await
            {
                Ok(h) => h,
                Err(err) => {
                    tracing::warn!(
                        benchmark = %self.benchmark_ticker,
                        error = %err,
                        "benchmark fetch failed; beta and relative return unavailable"
                    );
                    None
                }
            }
        };
        let profile_fut = async {
            match self.market.fetch_info(ticker).await {
                Ok(profile) => Some(profile),
                Err(err) => {
                    tracing::warn!(ticker, error = %err, "company profile fetch failed");
                    None
                }
            }
        };
        let rules_fut = async {
            if use_rules {
                retrieval::retrieve_rules(self.index.as_ref(), query, ticker).await
            } else {
                (String::new(), Vec::new())
            }
        };

        let (benchmark, profile, (rules_text, sources)) =
            tokio::join!(benchmark_fut, profile_fut, rules_fut);

        let summary = metrics::compute_summary(
            &history,
            benchmark.as_ref(),
            profile.as_ref(),
            chrono::Utc::now().date_naive(),
        );

        let financial_narrative = narrative::format_summary(&summary, preferences);
        let guidance = prefs::guidance(preferences);
        let prompt_text = prompt::assemble(query, &financial_narrative, &rules_text, &guidance);

        tracing::info!(ticker, use_rules, rule_sources = sources.len(), "generating analysis");
        let generated = self
            .generator
            .generate(&prompt_text, SamplingParams::ANALYSIS)
            .await;

        Ok(AnalysisOutcome {
            response: generated.text,
            sources,
            summary: Some(summary),
            backend: generated.backend,
        })
    }

    /// Retrieval + generation over the general document index, bypassing
    /// financial metrics entirely.
    pub async fn answer_from_documents(&self, query: &str) -> anyhow::Result<DocumentAnswer> {
        let passages = retrieval::search_documents(self.index.as_ref(), query).await;
        if passages.is_empty() {
            return Ok(DocumentAnswer {
                response: "No relevant documents found for your query.".to_string(),
                sources: Vec::new(),
            });
        }

        let context: Vec<&str> = passages.iter().map(|p| p.text.trim()).collect();
        let prompt_text = prompt::assemble_document_answer(query, &context.join("\n\n"));

        let generated = self
            .generator
            .generate_or_excerpt(&prompt_text, SamplingParams::DOCUMENT_QA, &passages)
            .await;

        let mut sources: Vec<String> = Vec::new();
        for passage in &passages {
            if !sources.contains(&passage.source) {
                sources.push(passage.source.clone());
            }
        }

        Ok(DocumentAnswer {
            response: generated.text,
            sources,
        })
    }

    fn data_unavailable(ticker: &str) -> AnalysisOutcome {
        AnalysisOutcome {
            response: format!(
                "Unable to fetch data for ticker {ticker}. Please verify the ticker symbol."
            ),
            sources: Vec::new(),
            summary: None,
            backend: "none",
        }
    }
}
