//! Win-probability model boundary.
//!
//! The orchestrator only sees [`WinProbabilityModel`]. The one concrete model
//! shipped here, [`LogisticPipeline`], is a one-hot + logistic-regression
//! artifact deserialized from JSON; its parameters are produced offline and
//! treated as opaque data.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FEATURE_NAMES, FeatureVector};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelInferenceError {
    #[error("feature `{0}` missing from input row")]
    MissingFeature(String),
    #[error("feature `{feature}` expected {expected}, got {got}")]
    TypeMismatch {
        feature: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("found unknown category `{value}` in column `{feature}` during transform")]
    UnknownCategory { feature: String, value: String },
    #[error("feature `{0}` is not a finite number")]
    NonFiniteInput(String),
    #[error("model produced a non-finite score")]
    NonFiniteOutput,
}

/// Inference contract: returns `[p_loss, p_win]` for the batting side.
/// Implementations must be pure reads so one instance can be shared by every
/// prediction without locking.
pub trait WinProbabilityModel: Send + Sync {
    fn predict_probability(&self, features: &FeatureVector) -> Result<[f64; 2], ModelInferenceError>;

    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "unversioned"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategoryPolicy {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticPipeline {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub features: Vec<String>,
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
    pub intercept: f64,
    #[serde(default)]
    pub handle_unknown: UnknownCategoryPolicy,
}

impl LogisticPipeline {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        let model = Self::from_json(&raw)
            .with_context(|| format!("invalid model artifact {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            name = %model.name,
            version = model.version(),
            "loaded win-probability model"
        );
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(raw.trim()).context("malformed model json")?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.features != FEATURE_NAMES {
            bail!(
                "feature contract mismatch: artifact expects {:?}, encoder produces {:?}",
                self.features,
                FEATURE_NAMES
            );
        }
        for feature in &self.features {
            let cat = self.categorical.contains_key(feature);
            let num = self.numeric.contains_key(feature);
            if cat == num {
                bail!("feature `{feature}` must be exactly one of categorical or numeric");
            }
        }
        if let Some(extra) = self
            .categorical
            .keys()
            .chain(self.numeric.keys())
            .find(|k| !self.features.iter().any(|f| f == *k))
        {
            bail!("coefficient for undeclared feature `{extra}`");
        }
        let all_finite = self.intercept.is_finite()
            && self.numeric.values().all(|c| c.is_finite())
            && self
                .categorical
                .values()
                .flat_map(|m| m.values())
                .all(|c| c.is_finite());
        if !all_finite {
            bail!("model coefficients must be finite");
        }
        Ok(())
    }

    fn logit(&self, features: &FeatureVector) -> Result<f64, ModelInferenceError> {
        let mut z = self.intercept;
        for name in &self.features {
            let value = features
                .get(name)
                .ok_or_else(|| ModelInferenceError::MissingFeature(name.clone()))?;

            if let Some(table) = self.categorical.get(name) {
                let category =
                    value
                        .as_category()
                        .ok_or_else(|| ModelInferenceError::TypeMismatch {
                            feature: name.clone(),
                            expected: "category",
                            got: value.kind(),
                        })?;
                match (table.get(category), self.handle_unknown) {
                    (Some(coef), _) => z += coef,
                    (None, UnknownCategoryPolicy::Ignore) => {}
                    (None, UnknownCategoryPolicy::Error) => {
                        return Err(ModelInferenceError::UnknownCategory {
                            feature: name.clone(),
                            value: category.to_string(),
                        });
                    }
                }
            } else if let Some(coef) = self.numeric.get(name) {
                let x = value
                    .as_f64()
                    .ok_or_else(|| ModelInferenceError::TypeMismatch {
                        feature: name.clone(),
                        expected: "number",
                        got: value.kind(),
                    })?;
                if !x.is_finite() {
                    return Err(ModelInferenceError::NonFiniteInput(name.clone()));
                }
                z += coef * x;
            }
        }
        Ok(z)
    }
}

impl WinProbabilityModel for LogisticPipeline {
    fn predict_probability(&self, features: &FeatureVector) -> Result<[f64; 2], ModelInferenceError> {
        let z = self.logit(features)?;
        let p_win = sigmoid(z);
        if !p_win.is_finite() {
            return Err(ModelInferenceError::NonFiniteOutput);
        }
        Ok([1.0 - p_win, p_win])
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("unversioned")
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::compute;
    use crate::features::encode;
    use crate::match_state::MatchState;

    const ARTIFACT: &str = r#"{
        "name": "test-pipe",
        "version": "t1",
        "features": ["batting_team","bowling_team","city","runs_left","balls_left",
                     "wickets","total_runs_x","crr","rrr"],
        "categorical": {
            "batting_team": {"India": 0.0, "Australia": 0.2},
            "bowling_team": {"India": 0.0, "Australia": -0.1},
            "city": {"Bridgetown": 0.0, "Dallas": 0.05}
        },
        "numeric": {
            "runs_left": -0.025, "balls_left": 0.02, "wickets": 0.35,
            "total_runs_x": -0.002, "crr": 0.05, "rrr": -0.35
        },
        "intercept": 2.0
    }"#;

    fn state(batting: &str) -> MatchState {
        MatchState {
            batting_team: batting.to_string(),
            bowling_team: "Australia".to_string(),
            venue: "Bridgetown".to_string(),
            target: 180,
            current_score: 90,
            wickets_lost: 3,
            overs_completed: 10,
        }
    }

    fn features(batting: &str) -> FeatureVector {
        let s = state(batting);
        encode(&s, &compute(&s))
    }

    #[test]
    fn probabilities_are_complementary() {
        let model = LogisticPipeline::from_json(ARTIFACT).unwrap();
        let [loss, win] = model.predict_probability(&features("India")).unwrap();
        assert!((loss + win - 1.0).abs() < 1e-12);
        assert!(win > 0.0 && win < 1.0);
        assert_eq!(model.version(), "t1");
    }

    #[test]
    fn unknown_category_is_rejected_by_default() {
        let model = LogisticPipeline::from_json(ARTIFACT).unwrap();
        let err = model.predict_probability(&features("Nepal")).unwrap_err();
        assert_eq!(
            err,
            ModelInferenceError::UnknownCategory {
                feature: "batting_team".to_string(),
                value: "Nepal".to_string(),
            }
        );
    }

    #[test]
    fn ignore_policy_treats_unknown_as_reference() {
        let mut model = LogisticPipeline::from_json(ARTIFACT).unwrap();
        model.handle_unknown = UnknownCategoryPolicy::Ignore;
        let known = model.predict_probability(&features("India")).unwrap();
        let unknown = model.predict_probability(&features("Nepal")).unwrap();
        // India carries a zero coefficient, so both rows score the same.
        assert!((known[1] - unknown[1]).abs() < 1e-12);
    }

    #[test]
    fn rejects_reordered_contract() {
        let swapped = ARTIFACT.replace("\"crr\",\"rrr\"", "\"rrr\",\"crr\"");
        let err = LogisticPipeline::from_json(&swapped).unwrap_err();
        assert!(format!("{err:#}").contains("feature contract mismatch"));
    }

    #[test]
    fn rejects_feature_without_coefficients() {
        let missing = ARTIFACT.replace("\"crr\": 0.05, ", "");
        assert!(LogisticPipeline::from_json(&missing).is_err());
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
    }
}
