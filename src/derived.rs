use serde::Serialize;

use crate::match_state::{BALLS_PER_OVER, INNINGS_BALLS, MatchState, TOTAL_WICKETS};

/// Chase numbers computed from a [`MatchState`]. Recomputed for every
/// prediction and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedStats {
    pub runs_left: i64,
    pub balls_left: i64,
    pub wickets_remaining: i64,
    pub current_run_rate: f64,
    pub required_run_rate: f64,
}

/// Pure projection of the match state. Division by zero degrades to a rate
/// of 0 instead of failing: no overs bowled means no current rate, and no
/// balls left means no further rate is required. Counts are widened to
/// `i64`, so any `u32` score or target is representable.
pub fn compute(state: &MatchState) -> DerivedStats {
    let target = i64::from(state.target);
    let score = i64::from(state.current_score);
    let overs = i64::from(state.overs_completed);

    let runs_left = target - score;
    let balls_left = INNINGS_BALLS - overs * BALLS_PER_OVER;
    let wickets_remaining = TOTAL_WICKETS - i64::from(state.wickets_lost);

    let current_run_rate = if overs > 0 {
        score as f64 / overs as f64
    } else {
        0.0
    };
    let required_run_rate = if balls_left > 0 {
        runs_left as f64 * BALLS_PER_OVER as f64 / balls_left as f64
    } else {
        0.0
    };

    DerivedStats {
        runs_left,
        balls_left,
        wickets_remaining,
        current_run_rate,
        required_run_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(target: u32, score: u32, wickets: u8, overs: u8) -> MatchState {
        MatchState {
            batting_team: "India".to_string(),
            bowling_team: "Australia".to_string(),
            venue: "Bridgetown".to_string(),
            target,
            current_score: score,
            wickets_lost: wickets,
            overs_completed: overs,
        }
    }

    #[test]
    fn score_past_target_gives_negative_runs_left() {
        let stats = compute(&state(120, 131, 2, 15));
        assert_eq!(stats.runs_left, -11);
        assert_eq!(stats.balls_left, 30);
        assert!(stats.required_run_rate < 0.0);
    }

    #[test]
    fn overs_beyond_innings_do_not_panic() {
        // Not reachable from the form, but nothing here guards it.
        let stats = compute(&state(100, 50, 0, 25));
        assert_eq!(stats.balls_left, -30);
        assert_eq!(stats.required_run_rate, 0.0);
    }

    #[test]
    fn huge_targets_do_not_overflow() {
        let stats = compute(&state(400_000_000, 0, 0, 0));
        assert_eq!(stats.runs_left, 400_000_000);
        assert_eq!(stats.required_run_rate, 20_000_000.0);

        let stats = compute(&state(u32::MAX, 0, 0, 10));
        assert_eq!(stats.runs_left, i64::from(u32::MAX));
        assert!(stats.required_run_rate > 0.0);
    }

    #[test]
    fn fractional_run_rate() {
        let stats = compute(&state(160, 47, 1, 6));
        assert!((stats.current_run_rate - 47.0 / 6.0).abs() < 1e-12);
        assert!((stats.required_run_rate - 113.0 * 6.0 / 84.0).abs() < 1e-12);
    }
}
