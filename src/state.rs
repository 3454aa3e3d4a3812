use std::collections::VecDeque;

use crate::leaderboard::Leaderboard;
use crate::live_feed::{LiveFeed, LiveFeedError};
use crate::match_state::{
    MAX_OVERS, MAX_SCORE_INPUT, MAX_TARGET_INPUT, MAX_WICKETS_LOST, MatchState, known_cities,
    known_teams,
};
use crate::model::ModelInferenceError;
use crate::predictor::Prediction;

const MAX_LOGS: usize = 200;
const MIN_TARGET: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Predictor,
    FinalResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    BattingTeam,
    BowlingTeam,
    Venue,
    Target,
    Score,
    Wickets,
    Overs,
}

impl FormField {
    const ORDER: [FormField; 7] = [
        FormField::BattingTeam,
        FormField::BowlingTeam,
        FormField::Venue,
        FormField::Target,
        FormField::Score,
        FormField::Wickets,
        FormField::Overs,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.index() + len - 1) % len]
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::BattingTeam => "Batting Team",
            FormField::BowlingTeam => "Bowling Team",
            FormField::Venue => "Match Venue",
            FormField::Target => "Target Score",
            FormField::Score => "Current Score",
            FormField::Wickets => "Wickets Lost",
            FormField::Overs => "Overs Completed",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FormField::Target | FormField::Score | FormField::Wickets | FormField::Overs
        )
    }
}

/// Match-wise predictor inputs. The limits applied here are the only range
/// checks anywhere in the crate.
#[derive(Debug, Clone)]
pub struct MatchForm {
    pub teams: Vec<&'static str>,
    pub cities: Vec<&'static str>,
    pub batting: usize,
    pub bowling: usize,
    pub venue: usize,
    pub target: u32,
    pub score: u32,
    pub wickets: u8,
    pub overs: u8,
    pub focus: FormField,
}

impl Default for MatchForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchForm {
    pub fn new() -> Self {
        Self {
            teams: known_teams(),
            cities: known_cities(),
            batting: 0,
            bowling: 0,
            venue: 0,
            target: MIN_TARGET,
            score: 0,
            wickets: 0,
            overs: 0,
            focus: FormField::BattingTeam,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Cycles selectors and nudges numbers by `delta`, saturating at limits.
    pub fn adjust(&mut self, delta: i32) {
        match self.focus {
            FormField::BattingTeam => self.batting = cycle(self.batting, self.teams.len(), delta),
            FormField::BowlingTeam => self.bowling = cycle(self.bowling, self.teams.len(), delta),
            FormField::Venue => self.venue = cycle(self.venue, self.cities.len(), delta),
            _ => {
                if let Some((value, min, max)) = self.focused_number() {
                    self.set_focused_number((value + delta as i64).clamp(min, max));
                }
            }
        }
    }

    /// Appends a typed digit to the focused number, capped at its maximum.
    pub fn push_digit(&mut self, digit: u32) {
        if digit > 9 {
            return;
        }
        let Some((value, min, max)) = self.focused_number() else {
            return;
        };
        let typed = value.saturating_mul(10).saturating_add(digit as i64);
        self.set_focused_number(typed.clamp(min, max));
    }

    pub fn backspace(&mut self) {
        let Some((value, min, max)) = self.focused_number() else {
            return;
        };
        self.set_focused_number((value / 10).clamp(min, max));
    }

    fn focused_number(&self) -> Option<(i64, i64, i64)> {
        match self.focus {
            FormField::Target => Some((
                self.target as i64,
                MIN_TARGET as i64,
                MAX_TARGET_INPUT as i64,
            )),
            FormField::Score => Some((self.score as i64, 0, MAX_SCORE_INPUT as i64)),
            FormField::Wickets => Some((self.wickets as i64, 0, MAX_WICKETS_LOST as i64)),
            FormField::Overs => Some((self.overs as i64, 0, MAX_OVERS as i64)),
            _ => None,
        }
    }

    fn set_focused_number(&mut self, value: i64) {
        match self.focus {
            FormField::Target => self.target = value as u32,
            FormField::Score => self.score = value as u32,
            FormField::Wickets => self.wickets = value as u8,
            FormField::Overs => self.overs = value as u8,
            _ => {}
        }
    }

    pub fn batting_team(&self) -> &'static str {
        self.teams.get(self.batting).copied().unwrap_or_default()
    }

    pub fn bowling_team(&self) -> &'static str {
        self.teams.get(self.bowling).copied().unwrap_or_default()
    }

    pub fn city(&self) -> &'static str {
        self.cities.get(self.venue).copied().unwrap_or_default()
    }

    pub fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::BattingTeam => self.batting_team().to_string(),
            FormField::BowlingTeam => self.bowling_team().to_string(),
            FormField::Venue => self.city().to_string(),
            FormField::Target => self.target.to_string(),
            FormField::Score => self.score.to_string(),
            FormField::Wickets => self.wickets.to_string(),
            FormField::Overs => format!("{} / {}", self.overs, MAX_OVERS),
        }
    }

    pub fn to_match_state(&self) -> MatchState {
        MatchState {
            batting_team: self.batting_team().to_string(),
            bowling_team: self.bowling_team().to_string(),
            venue: self.city().to_string(),
            target: self.target,
            current_score: self.score,
            wickets_lost: self.wickets,
            overs_completed: self.overs,
        }
    }
}

fn cycle(idx: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    (idx as i64 + delta as i64).rem_euclid(len) as usize
}

#[derive(Debug, Clone)]
pub enum PredictionView {
    Idle,
    Ready {
        input: MatchState,
        prediction: Prediction,
    },
    Failed(String),
    ModelUnavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveView {
    Loading,
    Loaded(LiveFeed),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardView {
    NotLoaded,
    Loaded(Leaderboard),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub form: MatchForm,
    pub prediction: PredictionView,
    pub live: LiveView,
    pub live_scroll: u16,
    pub leaderboard: LeaderboardView,
    pub leaderboard_selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Predictor,
            form: MatchForm::new(),
            prediction: PredictionView::Idle,
            live: LiveView::Loading,
            live_scroll: 0,
            leaderboard: LeaderboardView::NotLoaded,
            leaderboard_selected: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Records the outcome of one prediction. A failure only affects this
    /// submission; the previous result is replaced either way.
    pub fn record_prediction(
        &mut self,
        input: MatchState,
        outcome: Result<Prediction, ModelInferenceError>,
    ) {
        if input.same_team_on_both_sides() {
            self.push_log(format!(
                "[WARN] {} selected as both batting and bowling team",
                input.batting_team
            ));
        }
        match outcome {
            Ok(prediction) => {
                self.push_log(format!(
                    "[INFO] {} {}% vs {} {}%",
                    input.batting_team, prediction.win_pct, input.bowling_team, prediction.loss_pct
                ));
                self.prediction = PredictionView::Ready { input, prediction };
            }
            Err(err) => {
                self.push_log(format!("[ERROR] Prediction failed: {err}"));
                self.prediction = PredictionView::Failed(err.to_string());
            }
        }
    }

    pub fn set_leaderboard(&mut self, board: Leaderboard) {
        self.leaderboard = LeaderboardView::Loaded(board);
        self.leaderboard_selected = 0;
    }

    pub fn leaderboard_len(&self) -> usize {
        match &self.leaderboard {
            LeaderboardView::Loaded(board) => board.entries.len(),
            _ => 0,
        }
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Predictor => self.form.focus_next(),
            Screen::FinalResult => {
                let len = self.leaderboard_len();
                if len > 0 && self.leaderboard_selected + 1 < len {
                    self.leaderboard_selected += 1;
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Predictor => self.form.focus_prev(),
            Screen::FinalResult => {
                self.leaderboard_selected = self.leaderboard_selected.saturating_sub(1);
            }
        }
    }

    pub fn scroll_live_down(&mut self) {
        let len = match &self.live {
            LiveView::Loaded(feed) => feed.matches.len() + feed.record_errors.len(),
            _ => 0,
        };
        if (self.live_scroll as usize) + 1 < len {
            self.live_scroll += 1;
        }
    }

    pub fn scroll_live_up(&mut self) {
        self.live_scroll = self.live_scroll.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    RefreshLive,
}

#[derive(Debug, Clone)]
pub enum Delta {
    LiveLoading,
    SetLive(LiveFeed),
    LiveFailed(LiveFeedError),
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::LiveLoading => {
            state.live = LiveView::Loading;
        }
        Delta::SetLive(feed) => {
            for bad in &feed.record_errors {
                state.push_log(format!(
                    "[WARN] Could not display match {} due to: {}",
                    bad.index + 1,
                    bad.reason
                ));
            }
            state.push_log(format!("[INFO] {} live matches", feed.matches.len()));
            state.live = LiveView::Loaded(feed);
            state.live_scroll = 0;
        }
        Delta::LiveFailed(err) => {
            state.push_log(format!("[WARN] Live fetch error: {err} ({})", err.detail()));
            state.live = LiveView::Failed(err.to_string());
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

/// Text rows of the match summary panel.
pub fn match_summary_lines(input: &MatchState, prediction: &Prediction) -> Vec<String> {
    let stats = &prediction.stats;
    vec![
        format!("Current Score: {}/{}", input.current_score, input.wickets_lost),
        format!("Target: {}", input.target),
        format!(
            "Runs Required: {} in {} balls",
            stats.runs_left, stats.balls_left
        ),
        format!("Current Run Rate (CRR): {:.2}", stats.current_run_rate),
        format!("Required Run Rate (RRR): {:.2}", stats.required_run_rate),
    ]
}

pub fn win_chance_lines(input: &MatchState, prediction: &Prediction) -> [String; 2] {
    [
        format!("{} Win Chance: {}%", input.batting_team, prediction.win_pct),
        format!("{} Win Chance: {}%", input.bowling_team, prediction.loss_pct),
    ]
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Predictor => "MATCH-WISE PREDICTOR",
        Screen::FinalResult => "FINAL PREDICTION RESULT",
    }
}
