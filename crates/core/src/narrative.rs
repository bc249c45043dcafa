//! Renders a computed summary as the narrative block handed to generation.
//! This is the only channel through which financial facts reach the prompt,
//! so every non-null metric must appear here.

use crate::domain::preference::PreferenceVector;
use crate::domain::summary::StockSummary;
use crate::prefs;

pub fn format_summary(summary: &StockSummary, preferences: PreferenceVector) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(format!("=== STOCK PROFILE: {} ===", summary.ticker));
    sections.push(format!(
        "Analysis Period: {} ending {}\n",
        summary.period, summary.fetch_date
    ));

    let basic = &summary.basic_info;
    sections.push("BASIC INFORMATION:".to_string());
    sections.push(format!("  Sector: {}", basic.sector));
    sections.push(format!("  Industry: {}", basic.industry));
    sections.push(format!("  Current Price: ${:.2}", basic.current_price));
    if let Some(dividend_yield) = basic.dividend_yield_pct {
        sections.push(format!("  Dividend Yield: {dividend_yield:.2}%"));
    }
    sections.push(String::new());

    let risk = &summary.risk;
    sections.push("RISK CHARACTERISTICS:".to_string());
    if let Some(vol) = risk.volatility_annual_pct {
        match risk.risk_classification {
            Some(class) => sections.push(format!(
                "  Annualized Volatility: {vol:.1}% ({} risk)",
                class.label()
            )),
            None => sections.push(format!("  Annualized Volatility: {vol:.1}%")),
        }
        sections.push(format!(
            "  Context: {}",
            prefs::volatility_context(vol, preferences.risk_tolerance)
        ));
    }
    if let Some(dd) = risk.max_drawdown_pct {
        sections.push(format!("  Maximum Drawdown (period): {dd:.1}%"));
    }
    if let Some(beta) = risk.beta {
        sections.push(format!("  Beta (market sensitivity): {beta:.2}"));
    }
    if let Some(days) = risk.avg_recovery_days {
        sections.push(format!("  Average Recovery Time: {days} days"));
    }
    sections.push(format!("  Sharp Moves (>5%): {} days", risk.sharp_move_days));
    sections.push(String::new());

    let perf = &summary.performance;
    sections.push("HISTORICAL PERFORMANCE:".to_string());
    if let Some(r) = perf.return_1m_pct {
        sections.push(format!("  1-Month Return: {r:+.2}%"));
    }
    if let Some(r) = perf.return_3m_pct {
        sections.push(format!("  3-Month Return: {r:+.2}%"));
    }
    if let Some(r) = perf.return_6m_pct {
        sections.push(format!("  6-Month Return: {r:+.2}%"));
    }
    if let Some(r) = perf.return_1y_pct {
        sections.push(format!("  1-Year Return: {r:+.2}%"));
    }
    if let Some(vs) = perf.vs_benchmark_1y_pct {
        let direction = if vs > 0.0 { "outperformed" } else { "underperformed" };
        sections.push(format!(
            "  vs. Benchmark (1y): {direction} by {:.2}%",
            vs.abs()
        ));
    }
    sections.push(String::new());

    let trends = &summary.trends;
    sections.push("RECENT TRENDS:".to_string());
    sections.push(format!("  3-Month Price Trend: {}", trends.price_trend_3m));
    sections.push(format!("  Volume Trend: {}", trends.volume_trend));
    sections.push(format!(
        "  Position vs 50-Day Average: {}",
        trends.sma50_position
    ));

    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::Period;
    use crate::domain::preference::{RiskBehavior, RiskTolerance, TimeHorizon};
    use crate::domain::summary::{
        BasicInfo, PerformanceMetrics, PriceTrend, RiskClass, RiskMetrics, SmaPosition,
        TrendMetrics, VolumeTrend,
    };
    use chrono::NaiveDate;

    fn summary_with_volatility(vol: Option<f64>) -> StockSummary {
        StockSummary {
            ticker: "AAPL".to_string(),
            period: Period::OneYear,
            fetch_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            basic_info: BasicInfo {
                sector: "Technology".to_string(),
                industry: "Consumer Electronics".to_string(),
                current_price: 187.32,
                dividend_yield_pct: None,
                market_cap: None,
            },
            risk: RiskMetrics {
                volatility_annual_pct: vol,
                max_drawdown_pct: Some(-18.4),
                beta: Some(1.21),
                avg_recovery_days: Some(14),
                risk_classification: vol.map(crate::metrics::risk_class),
                sharp_move_days: 3,
            },
            performance: PerformanceMetrics {
                return_1m_pct: Some(2.1),
                return_3m_pct: Some(-4.7),
                return_6m_pct: Some(9.3),
                return_1y_pct: Some(15.8),
                vs_benchmark_1y_pct: Some(-2.4),
            },
            trends: TrendMetrics {
                price_trend_3m: PriceTrend::Rising,
                volume_trend: VolumeTrend::Stable,
                sma50_position: SmaPosition::Above,
            },
        }
    }

    fn prefs(tolerance: RiskTolerance) -> PreferenceVector {
        PreferenceVector {
            risk_tolerance: tolerance,
            time_horizon: TimeHorizon::Long,
            risk_behavior: RiskBehavior::Averse,
        }
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let text = format_summary(&summary_with_volatility(Some(22.0)), prefs(RiskTolerance::Low));
        let header = text.find("=== STOCK PROFILE: AAPL ===").unwrap();
        let basic = text.find("BASIC INFORMATION:").unwrap();
        let risk = text.find("RISK CHARACTERISTICS:").unwrap();
        let perf = text.find("HISTORICAL PERFORMANCE:").unwrap();
        let trends = text.find("RECENT TRENDS:").unwrap();
        assert!(header < basic && basic < risk && risk < perf && perf < trends);
    }

    #[test]
    fn same_volatility_is_framed_per_risk_tolerance() {
        let summary = summary_with_volatility(Some(22.0));

        let low = format_summary(&summary, prefs(RiskTolerance::Low));
        assert!(low.contains("may exceed conservative risk thresholds"));

        let high = format_summary(&summary, prefs(RiskTolerance::High));
        assert!(high.contains("balanced opportunity for returns"));
    }

    #[test]
    fn exactly_one_context_sentence_in_risk_section() {
        let text = format_summary(&summary_with_volatility(Some(22.0)), prefs(RiskTolerance::Low));
        assert_eq!(text.matches("  Context: ").count(), 1);
    }

    #[test]
    fn null_fields_are_omitted() {
        let mut summary = summary_with_volatility(None);
        summary.risk.beta = None;
        summary.risk.avg_recovery_days = None;
        summary.performance.return_1y_pct = None;
        summary.performance.vs_benchmark_1y_pct = None;

        let text = format_summary(&summary, prefs(RiskTolerance::Medium));
        assert!(!text.contains("Annualized Volatility"));
        assert!(!text.contains("Context:"));
        assert!(!text.contains("Beta"));
        assert!(!text.contains("Recovery"));
        assert!(!text.contains("1-Year Return"));
        assert!(!text.contains("Dividend Yield"));
    }

    #[test]
    fn every_non_null_metric_is_present() {
        let text = format_summary(&summary_with_volatility(Some(22.0)), prefs(RiskTolerance::Low));
        for needle in [
            "Annualized Volatility: 22.0% (Moderate risk)",
            "Maximum Drawdown (period): -18.4%",
            "Beta (market sensitivity): 1.21",
            "Average Recovery Time: 14 days",
            "Sharp Moves (>5%): 3 days",
            "1-Month Return: +2.10%",
            "3-Month Return: -4.70%",
            "6-Month Return: +9.30%",
            "1-Year Return: +15.80%",
            "vs. Benchmark (1y): underperformed by 2.40%",
            "3-Month Price Trend: rising",
            "Volume Trend: stable",
            "Position vs 50-Day Average: above",
        ] {
            assert!(text.contains(needle), "missing line: {needle}\n{text}");
        }
    }
}
