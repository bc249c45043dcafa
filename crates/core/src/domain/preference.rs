use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum TimeHorizon {
    /// Under one year.
    Short,
    /// One year or longer.
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum RiskBehavior {
    Averse,
    Seeking,
}

/// The 3-axis discrete user profile. 3 x 2 x 2 = 12 combinations, each mapped
/// to a distinct interpretive frame by the preference interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreferenceVector {
    pub risk_tolerance: RiskTolerance,
    pub time_horizon: TimeHorizon,
    pub risk_behavior: RiskBehavior,
}

impl Default for PreferenceVector {
    fn default() -> Self {
        Self {
            risk_tolerance: RiskTolerance::Medium,
            time_horizon: TimeHorizon::Long,
            risk_behavior: RiskBehavior::Averse,
        }
    }
}

impl RiskTolerance {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "Low",
            RiskTolerance::Medium => "Medium",
            RiskTolerance::High => "High",
        }
    }
}

impl TimeHorizon {
    pub fn label(&self) -> &'static str {
        match self {
            TimeHorizon::Short => "Short-term (<1yr)",
            TimeHorizon::Long => "Long-term (>1yr)",
        }
    }
}

impl RiskBehavior {
    pub fn label(&self) -> &'static str {
        match self {
            RiskBehavior::Averse => "Risk-averse",
            RiskBehavior::Seeking => "Risk-seeking",
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        })
    }
}

impl std::fmt::Display for TimeHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TimeHorizon::Short => "short",
            TimeHorizon::Long => "long",
        })
    }
}

impl std::fmt::Display for RiskBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RiskBehavior::Averse => "averse",
            RiskBehavior::Seeking => "seeking",
        })
    }
}

impl PreferenceVector {
    pub fn all() -> impl Iterator<Item = PreferenceVector> {
        const TOLERANCES: [RiskTolerance; 3] = [
            RiskTolerance::Low,
            RiskTolerance::Medium,
            RiskTolerance::High,
        ];
        const HORIZONS: [TimeHorizon; 2] = [TimeHorizon::Short, TimeHorizon::Long];
        const BEHAVIORS: [RiskBehavior; 2] = [RiskBehavior::Averse, RiskBehavior::Seeking];

        TOLERANCES.into_iter().flat_map(|risk_tolerance| {
            HORIZONS.into_iter().flat_map(move |time_horizon| {
                BEHAVIORS.into_iter().map(move |risk_behavior| PreferenceVector {
                    risk_tolerance,
                    time_horizon,
                    risk_behavior,
                })
            })
        })
    }
}
