//! Preference interpretation: maps the discrete preference space into framing
//! directives that change how the same numbers are narrated. The numeric
//! thresholds here mirror the metric engine's classification bands on purpose;
//! only the prose varies with the user profile.

use crate::domain::preference::{PreferenceVector, RiskBehavior, RiskTolerance, TimeHorizon};
use serde::Serialize;

/// Framing fragments derived from one preference vector. Each axis
/// contributes an orthogonal set: risk tolerance drives the first three,
/// time horizon the next three, risk behavior the last three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterpretiveContext {
    pub volatility_emphasis: &'static str,
    pub concern_language: &'static str,
    pub positive_language: &'static str,
    pub data_focus: &'static str,
    pub volatility_interpretation: &'static str,
    pub recovery_perspective: &'static str,
    pub analysis_perspective: &'static str,
    pub decision_framing: &'static str,
    pub trade_off_priority: &'static str,
}

pub fn interpret(prefs: PreferenceVector) -> InterpretiveContext {
    let (volatility_emphasis, concern_language, positive_language) = match prefs.risk_tolerance {
        RiskTolerance::Low => (
            "downside protection and capital preservation",
            "risk exposure, potential losses, drawdown severity",
            "stability, predictability, preservation",
        ),
        RiskTolerance::Medium => (
            "balanced growth with managed volatility",
            "portfolio fluctuations, risk-adjusted returns",
            "growth opportunities, reasonable stability",
        ),
        RiskTolerance::High => (
            "return potential and growth opportunities",
            "opportunity cost, market dynamics",
            "upside capture, aggressive growth, market opportunities",
        ),
    };

    let (data_focus, volatility_interpretation, recovery_perspective) = match prefs.time_horizon {
        TimeHorizon::Short => (
            "recent 3-6 month trends and near-term momentum",
            "near-term price fluctuations and liquidity",
            "short recovery windows are critical",
        ),
        TimeHorizon::Long => (
            "multi-year patterns and fundamental stability",
            "long-term trajectory smooths short-term noise",
            "extended recovery periods are acceptable",
        ),
    };

    let (analysis_perspective, decision_framing, trade_off_priority) = match prefs.risk_behavior {
        RiskBehavior::Averse => (
            "conservative with emphasis on protection",
            "what could go wrong and how to avoid losses",
            "safety over growth",
        ),
        RiskBehavior::Seeking => (
            "opportunistic with emphasis on potential",
            "what upside exists and how to capture gains",
            "growth over safety",
        ),
    };

    InterpretiveContext {
        volatility_emphasis,
        concern_language,
        positive_language,
        data_focus,
        volatility_interpretation,
        recovery_perspective,
        analysis_perspective,
        decision_framing,
        trade_off_priority,
    }
}

/// Render the guidance block injected into the generation prompt. The block
/// instructs the model to let preferences shape interpretation, not merely
/// restate them.
pub fn guidance(prefs: PreferenceVector) -> String {
    let ctx = interpret(prefs);

    format!(
        "PREFERENCE-DRIVEN ANALYSIS GUIDANCE:\n\
         \n\
         Risk Profile Context:\n\
         - The user has {tolerance} risk tolerance with {behavior} behavior\n\
         - Frame volatility and uncertainty in terms of: {emphasis}\n\
         - When discussing risks, emphasize: {concern}\n\
         - When discussing opportunities, emphasize: {positive}\n\
         - Trade-off priority: {priority}\n\
         \n\
         Time Horizon Context:\n\
         - Investment horizon: {horizon}\n\
         - Focus analysis on: {focus}\n\
         - Interpret volatility as: {vol_view}\n\
         - Recovery time perspective: {recovery}\n\
         \n\
         Analysis Perspective:\n\
         - Adopt a {perspective} viewpoint\n\
         - Frame decision considerations around: {framing}\n\
         \n\
         CRITICAL: These preferences should shape HOW you interpret and present\n\
         data, not just be restated. The same 25% volatility should read as\n\
         significant downside risk for risk-averse users but as opportunity for\n\
         outsized returns for risk-seeking users. The data is the same; the\n\
         interpretation changes with user context.",
        tolerance = prefs.risk_tolerance.label().to_lowercase(),
        behavior = prefs.risk_behavior.label().to_lowercase(),
        emphasis = ctx.volatility_emphasis,
        concern = ctx.concern_language,
        positive = ctx.positive_language,
        priority = ctx.trade_off_priority,
        horizon = prefs.time_horizon.label().to_lowercase(),
        focus = ctx.data_focus,
        vol_view = ctx.volatility_interpretation,
        recovery = ctx.recovery_perspective,
        perspective = ctx.analysis_perspective,
        framing = ctx.decision_framing,
    )
}

/// Preference-specific reading of a single risk metric. Band boundaries match
/// the metric engine's classification constants; phrasing differs per profile.
pub fn explain(metric: &str, value: f64, prefs: PreferenceVector) -> String {
    match metric {
        "volatility" => explain_volatility(value, prefs.risk_tolerance),
        "drawdown" => explain_drawdown(value, prefs.risk_behavior),
        "beta" => explain_beta(value, prefs.risk_behavior),
        other => format!("{other}: {value}"),
    }
}

fn explain_volatility(vol: f64, tolerance: RiskTolerance) -> String {
    match tolerance {
        RiskTolerance::Low => {
            if vol < 15.0 {
                format!("{vol:.1}% volatility indicates stable, predictable behavior aligned with conservative objectives")
            } else if vol < 25.0 {
                format!("{vol:.1}% volatility suggests price swings that may exceed comfort thresholds for capital preservation")
            } else {
                format!("{vol:.1}% volatility represents substantial fluctuation risk unsuitable for conservative portfolios")
            }
        }
        RiskTolerance::High => {
            if vol < 15.0 {
                format!("{vol:.1}% volatility suggests limited price movement, constraining potential for aggressive returns")
            } else if vol < 25.0 {
                format!("{vol:.1}% volatility provides meaningful opportunity for returns while remaining investable")
            } else {
                format!("{vol:.1}% volatility creates significant return potential during favorable market phases")
            }
        }
        RiskTolerance::Medium => {
            if vol < 15.0 {
                format!("{vol:.1}% volatility indicates low-risk behavior suitable for core holdings")
            } else if vol < 25.0 {
                format!("{vol:.1}% volatility is typical for balanced growth strategies")
            } else {
                format!("{vol:.1}% volatility exceeds typical balanced portfolio guidelines")
            }
        }
    }
}

fn explain_drawdown(dd: f64, behavior: RiskBehavior) -> String {
    let dd_abs = dd.abs();

    match behavior {
        RiskBehavior::Averse => {
            if dd_abs < 10.0 {
                format!("{dd:.1}% maximum drawdown indicates limited downside exposure")
            } else if dd_abs < 20.0 {
                format!("{dd:.1}% maximum drawdown represents notable capital risk requiring consideration")
            } else {
                format!("{dd:.1}% maximum drawdown signals severe downside exposure posing preservation challenges")
            }
        }
        RiskBehavior::Seeking => {
            if dd_abs < 10.0 {
                format!("{dd:.1}% maximum drawdown suggests constrained volatility limiting return potential")
            } else if dd_abs < 20.0 {
                format!("{dd:.1}% maximum drawdown is typical for growth-oriented investments")
            } else {
                format!("{dd:.1}% maximum drawdown indicates high volatility characteristic of aggressive positions")
            }
        }
    }
}

fn explain_beta(beta: f64, behavior: RiskBehavior) -> String {
    let sensitivity = if beta < 0.8 {
        "below-market volatility"
    } else if beta < 1.2 {
        "market-like volatility"
    } else {
        "above-market volatility"
    };

    let reading = match behavior {
        RiskBehavior::Averse => {
            if beta < 0.8 {
                "providing defensive characteristics"
            } else if beta < 1.2 {
                "tracking market movements closely"
            } else {
                "amplifying market downturns"
            }
        }
        RiskBehavior::Seeking => {
            if beta < 0.8 {
                "limiting upside capture potential"
            } else if beta < 1.2 {
                "participating in market gains proportionally"
            } else {
                "amplifying market upside"
            }
        }
    };

    format!("Beta of {beta:.2} indicates {sensitivity}, {reading}")
}

/// The single contextual sentence the narrative embeds next to the volatility
/// figure. Same bands as the risk classification; tone tracks risk tolerance.
pub fn volatility_context(vol: f64, tolerance: RiskTolerance) -> &'static str {
    match tolerance {
        RiskTolerance::Low => {
            if vol < 15.0 {
                "This low volatility suggests stable price behavior suitable for conservative portfolios"
            } else if vol < 25.0 {
                "This moderate volatility indicates notable price fluctuations that may exceed conservative risk thresholds"
            } else {
                "This high volatility represents substantial price swings and significant downside risk"
            }
        }
        RiskTolerance::High => {
            if vol < 15.0 {
                "This low volatility limits potential for outsized returns but provides stability"
            } else if vol < 25.0 {
                "This moderate volatility offers balanced opportunity for returns with manageable swings"
            } else {
                "This high volatility creates opportunities for significant returns during favorable market conditions"
            }
        }
        RiskTolerance::Medium => {
            if vol < 15.0 {
                "This low volatility provides predictable behavior with limited downside"
            } else if vol < 25.0 {
                "This moderate volatility is typical for diversified portfolios seeking balanced growth"
            } else {
                "This high volatility exceeds typical balanced portfolio thresholds"
            }
        }
    }
}

pub fn profile_summary(prefs: PreferenceVector) -> String {
    format!(
        "User Preference Profile:\n\
         - Risk Tolerance: {}\n\
         - Time Horizon: {}\n\
         - Risk Behavior: {}",
        prefs.risk_tolerance.label(),
        prefs.time_horizon.label(),
        prefs.risk_behavior.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn vector(
        risk_tolerance: RiskTolerance,
        time_horizon: TimeHorizon,
        risk_behavior: RiskBehavior,
    ) -> PreferenceVector {
        PreferenceVector {
            risk_tolerance,
            time_horizon,
            risk_behavior,
        }
    }

    #[test]
    fn interpret_is_pure() {
        for prefs in PreferenceVector::all() {
            assert_eq!(interpret(prefs), interpret(prefs));
            assert_eq!(guidance(prefs), guidance(prefs));
        }
    }

    #[test]
    fn twelve_combinations_yield_twelve_distinct_guidance_texts() {
        let texts: HashSet<String> = PreferenceVector::all().map(guidance).collect();
        assert_eq!(texts.len(), 12);
    }

    #[test]
    fn same_value_reads_differently_across_risk_tolerance() {
        let low = vector(RiskTolerance::Low, TimeHorizon::Long, RiskBehavior::Averse);
        let high = vector(RiskTolerance::High, TimeHorizon::Long, RiskBehavior::Averse);

        let low_text = explain("volatility", 22.0, low);
        let high_text = explain("volatility", 22.0, high);
        assert_ne!(low_text, high_text);
        assert!(low_text.contains("exceed comfort thresholds"));
        assert!(high_text.contains("meaningful opportunity"));
    }

    #[test]
    fn drawdown_reading_tracks_risk_behavior() {
        let averse = vector(RiskTolerance::Medium, TimeHorizon::Long, RiskBehavior::Averse);
        let seeking = vector(RiskTolerance::Medium, TimeHorizon::Long, RiskBehavior::Seeking);

        assert!(explain("drawdown", -25.0, averse).contains("severe downside exposure"));
        assert!(explain("drawdown", -25.0, seeking).contains("aggressive positions"));
    }

    #[test]
    fn beta_bands_at_point_eight_and_one_point_two() {
        let averse = vector(RiskTolerance::Medium, TimeHorizon::Long, RiskBehavior::Averse);
        assert!(explain("beta", 0.79, averse).contains("below-market volatility"));
        assert!(explain("beta", 0.8, averse).contains("market-like volatility"));
        assert!(explain("beta", 1.2, averse).contains("above-market volatility"));
    }

    #[test]
    fn unknown_metric_falls_back_to_name_value() {
        let prefs = PreferenceVector::default();
        assert_eq!(explain("sortino", 1.5, prefs), "sortino: 1.5");
    }

    #[test]
    fn volatility_context_band_edges_match_classification() {
        assert!(volatility_context(14.99, RiskTolerance::Low).contains("low volatility"));
        assert!(volatility_context(15.0, RiskTolerance::Low).contains("moderate volatility"));
        assert!(volatility_context(25.0, RiskTolerance::Low).contains("high volatility"));
    }

    #[test]
    fn guidance_carries_axis_fragments() {
        let prefs = vector(RiskTolerance::Low, TimeHorizon::Short, RiskBehavior::Seeking);
        let text = guidance(prefs);
        assert!(text.contains("downside protection and capital preservation"));
        assert!(text.contains("recent 3-6 month trends"));
        assert!(text.contains("growth over safety"));
    }
}
