use crate::domain::history::PriceHistory;
use crate::domain::summary::{
    BasicInfo, CompanyProfile, PerformanceMetrics, PriceTrend, RiskClass, RiskMetrics,
    SmaPosition, StockSummary, TrendMetrics, VolumeTrend,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

// Trailing-return windows in trading days.
const WINDOW_1M: usize = 21;
const WINDOW_3M: usize = 63;
const WINDOW_6M: usize = 126;
const WINDOW_1Y: usize = 252;

// Fixed policy constants for risk classification; not user-configurable.
const RISK_LOW_BELOW: f64 = 15.0;
const RISK_MODERATE_BELOW: f64 = 25.0;

// A drawdown episode opens below -5% and closes once back within -1% of peak.
const DRAWDOWN_OPEN: f64 = -0.05;
const DRAWDOWN_CLOSE: f64 = -0.01;

const SHARP_MOVE: f64 = 0.05;

/// Compute the full per-query summary. Individual metrics degrade to
/// None/insufficient_data on short history; only the fetch layer can fail.
pub fn compute_summary(
    history: &PriceHistory,
    benchmark: Option<&PriceHistory>,
    profile: Option<&CompanyProfile>,
    fetch_date: NaiveDate,
) -> StockSummary {
    let closes = history.closes();
    let volumes = history.volumes();
    let dated_returns = history.daily_returns();
    let returns: Vec<f64> = dated_returns.iter().map(|(_, r)| *r).collect();

    let volatility = annualized_volatility_pct(&returns);
    let drawdowns = drawdown_series(&returns);

    let risk = RiskMetrics {
        volatility_annual_pct: volatility,
        max_drawdown_pct: max_drawdown_pct(&drawdowns),
        beta: benchmark.and_then(|b| beta(&dated_returns, &b.daily_returns())),
        avg_recovery_days: avg_recovery_days(&drawdowns),
        risk_classification: volatility.map(risk_class),
        sharp_move_days: returns.iter().filter(|r| r.abs() > SHARP_MOVE).count(),
    };

    let return_1y = trailing_return_pct(&closes, WINDOW_1Y);
    let vs_benchmark_1y_pct = benchmark.and_then(|b| {
        let bench_1y = trailing_return_pct(&b.closes(), WINDOW_1Y)?;
        Some(return_1y? - bench_1y)
    });

    let performance = PerformanceMetrics {
        return_1m_pct: trailing_return_pct(&closes, WINDOW_1M),
        return_3m_pct: trailing_return_pct(&closes, WINDOW_3M),
        return_6m_pct: trailing_return_pct(&closes, WINDOW_6M),
        return_1y_pct: return_1y,
        vs_benchmark_1y_pct,
    };

    let trends = TrendMetrics {
        price_trend_3m: price_trend(&closes),
        volume_trend: volume_trend(&volumes),
        sma50_position: sma50_position(&closes),
    };

    // Construction guarantees at least one bar.
    let current_price = closes[closes.len() - 1];
    let basic_info = match profile {
        Some(p) => BasicInfo {
            sector: p.sector.clone().unwrap_or_else(|| "Unknown".to_string()),
            industry: p.industry.clone().unwrap_or_else(|| "Unknown".to_string()),
            current_price,
            dividend_yield_pct: p.dividend_yield.map(|y| y * 100.0).filter(|y| *y > 0.0),
            market_cap: p.market_cap,
        },
        None => BasicInfo {
            sector: "Unknown".to_string(),
            industry: "Unknown".to_string(),
            current_price,
            dividend_yield_pct: None,
            market_cap: None,
        },
    };

    StockSummary {
        ticker: history.ticker().to_string(),
        period: history.period(),
        fetch_date,
        basic_info,
        risk,
        performance,
        trends,
    }
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

/// Sample standard deviation of daily returns, annualized over 252 trading
/// days, as a percentage. Needs at least two returns.
pub fn annualized_volatility_pct(returns: &[f64]) -> Option<f64> {
    sample_std(returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

/// Drawdown at each step: (cumulative - running peak) / running peak.
fn drawdown_series(returns: &[f64]) -> Vec<f64> {
    let mut cumulative = 1.0;
    let mut peak = f64::MIN;
    returns
        .iter()
        .map(|r| {
            cumulative *= 1.0 + r;
            peak = peak.max(cumulative);
            (cumulative - peak) / peak
        })
        .collect()
}

pub fn max_drawdown_pct(drawdowns: &[f64]) -> Option<f64> {
    drawdowns
        .iter()
        .copied()
        .reduce(f64::min)
        .map(|d| d * 100.0)
}

/// Covariance/variance slope over the date-aligned intersection of the two
/// return series. None when fewer than two aligned points or the benchmark
/// shows no variance.
pub fn beta(stock: &[(NaiveDate, f64)], benchmark: &[(NaiveDate, f64)]) -> Option<f64> {
    let bench_by_date: BTreeMap<NaiveDate, f64> = benchmark.iter().copied().collect();

    let mut s = Vec::new();
    let mut b = Vec::new();
    for (date, r) in stock {
        if let Some(m) = bench_by_date.get(date) {
            s.push(*r);
            b.push(*m);
        }
    }

    if s.len() < 2 {
        return None;
    }

    let sm = mean(&s);
    let bm = mean(&b);
    let n = (s.len() - 1) as f64;
    let covariance = s
        .iter()
        .zip(&b)
        .map(|(x, y)| (x - sm) * (y - bm))
        .sum::<f64>()
        / n;
    let variance = b.iter().map(|y| (y - bm).powi(2)).sum::<f64>() / n;

    if variance <= 0.0 {
        return None;
    }
    Some(covariance / variance)
}

/// Average length, in samples, of closed drawdown episodes. Episodes that
/// never recover are not counted.
pub fn avg_recovery_days(drawdowns: &[f64]) -> Option<i64> {
    let mut episode_lengths: Vec<i64> = Vec::new();
    let mut open_at: Option<usize> = None;

    for (i, d) in drawdowns.iter().enumerate() {
        match open_at {
            None if *d < DRAWDOWN_OPEN => open_at = Some(i),
            Some(start) if *d >= DRAWDOWN_CLOSE => {
                episode_lengths.push((i - start) as i64);
                open_at = None;
            }
            _ => {}
        }
    }

    if episode_lengths.is_empty() {
        return None;
    }
    let total: i64 = episode_lengths.iter().sum();
    Some(total / episode_lengths.len() as i64)
}

pub fn risk_class(volatility_pct: f64) -> RiskClass {
    if volatility_pct < RISK_LOW_BELOW {
        RiskClass::Low
    } else if volatility_pct < RISK_MODERATE_BELOW {
        RiskClass::Moderate
    } else {
        RiskClass::High
    }
}

/// (last / close N trading days ago - 1) x 100. None when the history is
/// shorter than the window; partial windows are never extrapolated.
fn trailing_return_pct(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < window {
        return None;
    }
    let past = closes[closes.len() - window];
    let last = *closes.last()?;
    Some((last / past - 1.0) * 100.0)
}

fn price_trend(closes: &[f64]) -> PriceTrend {
    let n = closes.len();
    if n < 2 * WINDOW_3M {
        return PriceTrend::InsufficientData;
    }
    let recent = mean(&closes[n - WINDOW_3M..]);
    let prior = mean(&closes[n - 2 * WINDOW_3M..n - WINDOW_3M]);

    if recent > prior * 1.05 {
        PriceTrend::Rising
    } else if recent < prior * 0.95 {
        PriceTrend::Declining
    } else {
        PriceTrend::Stable
    }
}

fn volume_trend(volumes: &[f64]) -> VolumeTrend {
    let n = volumes.len();
    if n < WINDOW_3M {
        return VolumeTrend::InsufficientData;
    }
    let recent = mean(&volumes[n - WINDOW_1M..]);
    let prior = mean(&volumes[n - WINDOW_3M..n - WINDOW_1M]);

    if recent > prior * 1.2 {
        VolumeTrend::Increasing
    } else if recent < prior * 0.8 {
        VolumeTrend::Decreasing
    } else {
        VolumeTrend::Stable
    }
}

fn sma50_position(closes: &[f64]) -> SmaPosition {
    let n = closes.len();
    if n < 50 {
        return SmaPosition::InsufficientData;
    }
    let sma = mean(&closes[n - 50..]);
    let current = closes[n - 1];

    if current > sma * 1.02 {
        SmaPosition::Above
    } else if current < sma * 0.98 {
        SmaPosition::Below
    } else {
        SmaPosition::Near
    }
}
