pub mod http;

pub use http::HttpSemanticIndex;

/// Passages fetched per query; never cached across queries because the index
/// may be rebuilt between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredPassage {
    pub text: String,
    pub source: String,
}

/// Boundary to the externally-maintained semantic index. Embedding and
/// similarity search live behind this trait.
#[async_trait::async_trait]
pub trait SemanticIndex: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<ScoredPassage>>;
}

/// Stands in when no index is configured: every search is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndex;

#[async_trait::async_trait]
impl SemanticIndex for NullIndex {
    async fn search(&self, _query: &str, _k: usize) -> anyhow::Result<Vec<ScoredPassage>> {
        Ok(Vec::new())
    }
}

pub const RULE_TOP_K: usize = 5;

// Appended to the user question to bias retrieval toward constraint-like
// passages rather than general commentary.
const RULE_INTENT_SUFFIX: &str = "investment rules constraints";

/// Retrieve the rule passages most relevant to the question and ticker.
/// Returns numbered passages joined for prompt embedding plus deduplicated
/// sources. A missing index, a failed query, and an empty result all yield
/// ("", []): absence of rules never fails the pipeline.
pub async fn retrieve_rules(
    index: &dyn SemanticIndex,
    query: &str,
    ticker: &str,
) -> (String, Vec<String>) {
    let search_query = format!("{query} {ticker} {RULE_INTENT_SUFFIX}");

    let passages = match index.search(&search_query, RULE_TOP_K).await {
        Ok(passages) => passages,
        Err(err) => {
            tracing::warn!(error = %err, ticker, "rule retrieval failed; continuing without rules");
            return (String::new(), Vec::new());
        }
    };

    if passages.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut parts = Vec::with_capacity(passages.len());
    let mut sources: Vec<String> = Vec::new();
    for (i, passage) in passages.iter().take(RULE_TOP_K).enumerate() {
        parts.push(format!("[Rule {}] {}", i + 1, passage.text.trim()));
        if !sources.contains(&passage.source) {
            sources.push(passage.source.clone());
        }
    }

    (parts.join("\n\n"), sources)
}

/// Top-k passages for the document-only path, uncombined. Failures are
/// absorbed to an empty list like `retrieve_rules`.
pub async fn search_documents(index: &dyn SemanticIndex, query: &str) -> Vec<ScoredPassage> {
    match index.search(query, RULE_TOP_K).await {
        Ok(passages) => passages.into_iter().take(RULE_TOP_K).collect(),
        Err(err) => {
            tracing::warn!(error = %err, "document search failed; returning no passages");
            Vec::new()
        }
    }
}
