use crate::domain::history::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskClass {
    Low,
    Moderate,
    High,
}

impl RiskClass {
    pub fn label(&self) -> &'static str {
        match self {
            RiskClass::Low => "Low",
            RiskClass::Moderate => "Moderate",
            RiskClass::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Rising,
    Declining,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmaPosition {
    Above,
    Below,
    Near,
    InsufficientData,
}

impl std::fmt::Display for PriceTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PriceTrend::Rising => "rising",
            PriceTrend::Declining => "declining",
            PriceTrend::Stable => "stable",
            PriceTrend::InsufficientData => "insufficient_data",
        })
    }
}

impl std::fmt::Display for VolumeTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            VolumeTrend::Increasing => "increasing",
            VolumeTrend::Decreasing => "decreasing",
            VolumeTrend::Stable => "stable",
            VolumeTrend::InsufficientData => "insufficient_data",
        })
    }
}

impl std::fmt::Display for SmaPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SmaPosition::Above => "above",
            SmaPosition::Below => "below",
            SmaPosition::Near => "near",
            SmaPosition::InsufficientData => "insufficient_data",
        })
    }
}

/// Raw company facts as the market data service reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Fraction (0.0055 = 0.55%); converted to a percentage for display.
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Sector/price context fetched alongside the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    pub sector: String,
    pub industry: String,
    pub current_price: f64,
    /// Percentage (already x100); None when the company pays no dividend.
    pub dividend_yield_pct: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Percentage fields are None when the underlying history is too short for
/// the window. That is policy, not a defect: short windows are never
/// extrapolated or zero-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub volatility_annual_pct: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
    pub beta: Option<f64>,
    pub avg_recovery_days: Option<i64>,
    pub risk_classification: Option<RiskClass>,
    pub sharp_move_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub return_1m_pct: Option<f64>,
    pub return_3m_pct: Option<f64>,
    pub return_6m_pct: Option<f64>,
    pub return_1y_pct: Option<f64>,
    pub vs_benchmark_1y_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendMetrics {
    pub price_trend_3m: PriceTrend,
    pub volume_trend: VolumeTrend,
    pub sma50_position: SmaPosition,
}

/// One query's computed view of a stock. Owned by the pipeline, created and
/// discarded within a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSummary {
    pub ticker: String,
    pub period: Period,
    pub fetch_date: NaiveDate,
    pub basic_info: BasicInfo,
    pub risk: RiskMetrics,
    pub performance: PerformanceMetrics,
    pub trends: TrendMetrics,
}
