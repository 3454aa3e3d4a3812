use std::sync::Arc;

use serde::Serialize;

use crate::derived::{self, DerivedStats};
use crate::features::{self, FeatureVector};
use crate::match_state::MatchState;
use crate::model::{ModelInferenceError, WinProbabilityModel};

const DOMINANT_PCT: u8 = 70;
const HIGH_REQUIRED_RATE: f64 = 10.0;
const FEW_WICKETS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub win_probability_batting: f64,
    pub win_probability_bowling: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    BattingDominant,
    BowlingDominant,
    EvenlyPoised,
}

impl Momentum {
    pub fn label(self) -> &'static str {
        match self {
            Momentum::BattingDominant => "batting dominant",
            Momentum::BowlingDominant => "bowling dominant",
            Momentum::EvenlyPoised => "evenly poised",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Momentum::BattingDominant => "Momentum with Batting Team!",
            Momentum::BowlingDominant => "Bowling Team Dominating!",
            Momentum::EvenlyPoised => "Match is evenly poised!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTip {
    TargetWeakBowling,
    CautionWicketsPrecious,
    PaceCalmly,
}

impl StrategyTip {
    pub fn label(self) -> &'static str {
        match self {
            StrategyTip::TargetWeakBowling => "target weak bowling",
            StrategyTip::CautionWicketsPrecious => "caution, wickets precious",
            StrategyTip::PaceCalmly => "pace calmly",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            StrategyTip::TargetWeakBowling => "Try to target weaker bowlers!",
            StrategyTip::CautionWicketsPrecious => {
                "Be cautious, wickets in hand are crucial now!"
            }
            StrategyTip::PaceCalmly => "You can pace the innings calmly with this RRR.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub momentum: Momentum,
    pub strategy_tip: StrategyTip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub result: PredictionResult,
    pub win_pct: u8,
    pub loss_pct: u8,
    pub stats: DerivedStats,
    pub classification: Classification,
}

/// Evaluated in order: a dominant batting side wins ties with a dominant
/// bowling side, which cannot happen for complementary inputs anyway.
pub fn classify_momentum(win_pct: u8, loss_pct: u8) -> Momentum {
    if win_pct > DOMINANT_PCT {
        Momentum::BattingDominant
    } else if loss_pct > DOMINANT_PCT {
        Momentum::BowlingDominant
    } else {
        Momentum::EvenlyPoised
    }
}

pub fn classify_strategy(required_run_rate: f64, wickets_remaining: i64) -> StrategyTip {
    if required_run_rate > HIGH_REQUIRED_RATE {
        StrategyTip::TargetWeakBowling
    } else if wickets_remaining <= FEW_WICKETS {
        StrategyTip::CautionWicketsPrecious
    } else {
        StrategyTip::PaceCalmly
    }
}

/// Probability to whole percent, rounding halves to even. Win and loss are
/// rounded independently, so the pair may sum to 99 or 101.
pub fn to_percent(p: f64) -> u8 {
    (p * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Runs calculator, encoder and model in sequence for one submission.
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn WinProbabilityModel>,
}

impl Predictor {
    pub fn new(model: Arc<dyn WinProbabilityModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn model_version(&self) -> &str {
        self.model.version()
    }

    pub fn features_for(&self, state: &MatchState) -> (DerivedStats, FeatureVector) {
        let stats = derived::compute(state);
        let features = features::encode(state, &stats);
        (stats, features)
    }

    /// Model failures are returned as-is; there is no fallback estimate.
    pub fn predict(&self, state: &MatchState) -> Result<Prediction, ModelInferenceError> {
        let (stats, features) = self.features_for(state);
        let [p_loss, p_win] = self.model.predict_probability(&features)?;

        let win_pct = to_percent(p_win);
        let loss_pct = to_percent(p_loss);
        let classification = Classification {
            momentum: classify_momentum(win_pct, loss_pct),
            strategy_tip: classify_strategy(stats.required_run_rate, stats.wickets_remaining),
        };

        tracing::debug!(
            batting = %state.batting_team,
            bowling = %state.bowling_team,
            win_pct,
            loss_pct,
            momentum = classification.momentum.label(),
            "prediction"
        );

        Ok(Prediction {
            result: PredictionResult {
                win_probability_batting: p_win,
                win_probability_bowling: p_loss,
            },
            win_pct,
            loss_pct,
            stats,
            classification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_to_even() {
        assert_eq!(to_percent(0.125), 12);
        assert_eq!(to_percent(0.135), 14);
        assert_eq!(to_percent(0.5), 50);
        assert_eq!(to_percent(1.0), 100);
        assert_eq!(to_percent(0.0), 0);
    }

    #[test]
    fn momentum_thresholds_are_strict() {
        assert_eq!(classify_momentum(71, 29), Momentum::BattingDominant);
        assert_eq!(classify_momentum(70, 30), Momentum::EvenlyPoised);
        assert_eq!(classify_momentum(29, 71), Momentum::BowlingDominant);
        assert_eq!(classify_momentum(30, 70), Momentum::EvenlyPoised);
    }

    #[test]
    fn strategy_checks_rate_before_wickets() {
        assert_eq!(classify_strategy(12.5, 2), StrategyTip::TargetWeakBowling);
        assert_eq!(classify_strategy(10.0, 3), StrategyTip::CautionWicketsPrecious);
        assert_eq!(classify_strategy(10.0, 4), StrategyTip::PaceCalmly);
        assert_eq!(classify_strategy(-3.0, 10), StrategyTip::PaceCalmly);
    }
}
