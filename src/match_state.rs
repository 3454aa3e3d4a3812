use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub const BALLS_PER_OVER: i64 = 6;
pub const MAX_OVERS: u8 = 20;
pub const MAX_WICKETS_LOST: u8 = 9;
pub const TOTAL_WICKETS: i64 = 10;
pub const INNINGS_BALLS: i64 = MAX_OVERS as i64 * BALLS_PER_OVER;

// Upper bounds for typed input only; the library itself accepts any value.
pub const MAX_TARGET_INPUT: u32 = 999;
pub const MAX_SCORE_INPUT: u32 = 999;

const TEAMS: [&str; 17] = [
    "West Indies",
    "Netherlands",
    "United States of America",
    "Bangladesh",
    "Pakistan",
    "Australia",
    "Ireland",
    "Scotland",
    "Afghanistan",
    "New Zealand",
    "England",
    "Uganda",
    "South Africa",
    "Namibia",
    "India",
    "Nepal",
    "Oman",
];

const CITIES: [&str; 9] = [
    "Bridgetown",
    "Dallas",
    "North Sound",
    "New York",
    "Providence",
    "Gros Islet",
    "Kingstown",
    "Tarouba",
    "Lauderhill",
];

/// Known teams in display (alphabetical) order.
pub fn known_teams() -> Vec<&'static str> {
    let mut teams = TEAMS.to_vec();
    teams.sort_unstable();
    teams
}

/// Known venues in display (alphabetical) order.
pub fn known_cities() -> Vec<&'static str> {
    let mut cities = CITIES.to_vec();
    cities.sort_unstable();
    cities
}

pub fn is_known_team(name: &str) -> bool {
    TEAMS.contains(&name)
}

pub fn is_known_city(name: &str) -> bool {
    CITIES.contains(&name)
}

/// Snapshot of a chase as entered by the user. Nothing here is validated:
/// range limits live at the input form, and out-of-range values simply flow
/// through the derived stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub batting_team: String,
    pub bowling_team: String,
    pub venue: String,
    pub target: u32,
    pub current_score: u32,
    pub wickets_lost: u8,
    /// Completed overs only. Cricket notation such as `19.5` (19 overs and
    /// 5 balls) is read as 19.
    #[serde(deserialize_with = "completed_overs")]
    pub overs_completed: u8,
}

fn completed_overs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    let whole = raw.floor();
    if !whole.is_finite() || whole < 0.0 || whole > f64::from(u8::MAX) {
        return Err(D::Error::custom(format!(
            "overs_completed {raw} is not a count of overs"
        )));
    }
    Ok(whole as u8)
}

impl MatchState {
    pub fn same_team_on_both_sides(&self) -> bool {
        self.batting_team.trim() == self.bowling_team.trim()
    }
}
