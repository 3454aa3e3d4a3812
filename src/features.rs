use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::derived::DerivedStats;
use crate::match_state::MatchState;

/// Column names and order the model artifact was trained on. Renaming or
/// reordering these requires a regenerated artifact.
pub const FEATURE_NAMES: [&str; 9] = [
    "batting_team",
    "bowling_team",
    "city",
    "runs_left",
    "balls_left",
    "wickets",
    "total_runs_x",
    "crr",
    "rrr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Category(String),
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FeatureValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view used by the model; categories have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Category(_) => "category",
            FeatureValue::Int(_) => "int",
            FeatureValue::Float(_) => "float",
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Category(s) => write!(f, "{s}"),
            FeatureValue::Int(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Category(s) => serializer.serialize_str(s),
            FeatureValue::Int(v) => serializer.serialize_i64(*v),
            FeatureValue::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

/// One input row for the model, fields kept in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    fields: Vec<(&'static str, FeatureValue)>,
}

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Team and city strings are passed through untouched; whether an unseen
/// category is acceptable is for the model to decide.
pub fn encode(state: &MatchState, stats: &DerivedStats) -> FeatureVector {
    let values = [
        FeatureValue::Category(state.batting_team.clone()),
        FeatureValue::Category(state.bowling_team.clone()),
        FeatureValue::Category(state.venue.clone()),
        FeatureValue::Int(stats.runs_left),
        FeatureValue::Int(stats.balls_left),
        FeatureValue::Int(stats.wickets_remaining),
        FeatureValue::Int(state.target as i64),
        FeatureValue::Float(stats.current_run_rate),
        FeatureValue::Float(stats.required_run_rate),
    ];

    FeatureVector {
        fields: FEATURE_NAMES.into_iter().zip(values).collect(),
    }
}
