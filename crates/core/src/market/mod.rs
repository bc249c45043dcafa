pub mod http;

pub use http::HttpMarketData;

use crate::domain::history::{Period, PriceHistory};
use crate::domain::summary::CompanyProfile;

/// Boundary to the market data service. `fetch_history` returns None for an
/// unknown ticker or a ticker with no data in the window; that is the
/// pipeline's DataUnavailable signal, not an error.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
    ) -> anyhow::Result<Option<PriceHistory>>;

    async fn fetch_info(&self, ticker: &str) -> anyhow::Result<CompanyProfile>;
}
