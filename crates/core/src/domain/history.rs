use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lookback window requested from the market data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[serde(rename = "1mo")]
    #[value(name = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    #[value(name = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    #[value(name = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    #[value(name = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    #[value(name = "2y")]
    TwoYears,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

/// Daily close/volume series for one ticker. Chronologically sorted with
/// unique dates; validated once at construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    ticker: String,
    period: Period,
    bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn try_new(ticker: &str, period: Period, bars: Vec<PriceBar>) -> anyhow::Result<Self> {
        let ticker = ticker.trim().to_uppercase();
        ensure!(!ticker.is_empty(), "ticker must be non-empty");
        ensure!(!bars.is_empty(), "price history must contain at least one bar");

        for pair in bars.windows(2) {
            ensure!(
                pair[0].date < pair[1].date,
                "price history must be chronologically sorted with unique dates ({} then {})",
                pair[0].date,
                pair[1].date
            );
        }

        for bar in &bars {
            ensure!(
                bar.close.is_finite() && bar.close > 0.0,
                "close must be a positive finite number on {}",
                bar.date
            );
            ensure!(
                bar.volume.is_finite() && bar.volume >= 0.0,
                "volume must be a non-negative finite number on {}",
                bar.date
            );
        }

        Ok(Self {
            ticker,
            period,
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Daily close-to-close percentage changes, keyed by the later date.
    pub fn daily_returns(&self) -> Vec<(NaiveDate, f64)> {
        self.bars
            .windows(2)
            .map(|pair| (pair[1].date, pair[1].close / pair[0].close - 1.0))
            .collect()
    }
}
