use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

const TEAM_COLUMNS: [&str; 2] = ["Team", "index"];
const WIN_COLUMNS: [&str; 2] = ["Win %", "win_percent"];

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: `{value}` is not a percentage")]
    InvalidValue { row: usize, value: String },
    #[error("no teams in results table")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub team: String,
    pub win_percent: f64,
}

/// Tournament-winner forecast, rows kept in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(entries: Vec<LeaderboardEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, LeaderboardError> {
        let file = File::open(path).map_err(|source| LeaderboardError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let board = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            teams = board.entries.len(),
            "loaded final results"
        );
        Ok(board)
    }

    /// Accepts either the display headers (`Team`, `Win %`) or the unrenamed
    /// headers (`index`, `win_percent`). Other columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LeaderboardError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let team_col = find_column(&headers, &TEAM_COLUMNS)
            .ok_or(LeaderboardError::MissingColumn("Team"))?;
        let win_col = find_column(&headers, &WIN_COLUMNS)
            .ok_or(LeaderboardError::MissingColumn("Win %"))?;

        let mut entries = Vec::new();
        for (idx, record) in rdr.records().enumerate() {
            let record = record?;
            let team = record.get(team_col).unwrap_or_default().to_string();
            let raw = record.get(win_col).unwrap_or_default();
            let win_percent =
                parse_percent(raw).ok_or_else(|| LeaderboardError::InvalidValue {
                    row: idx + 1,
                    value: raw.to_string(),
                })?;
            entries.push(LeaderboardEntry { team, win_percent });
        }

        if entries.is_empty() {
            return Err(LeaderboardError::Empty);
        }
        Ok(Self { entries })
    }

    /// Highest win percentage; the first row wins a tie. Blank (NaN) cells
    /// never win.
    pub fn predicted_winner(&self) -> Option<&LeaderboardEntry> {
        let mut best: Option<&LeaderboardEntry> = None;
        for entry in &self.entries {
            if entry.win_percent.is_nan() {
                continue;
            }
            match best {
                Some(b) if entry.win_percent <= b.win_percent => {}
                _ => best = Some(entry),
            }
        }
        best
    }

    /// `(position, entry)` with 1-based positions in source order.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &LeaderboardEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

pub fn winner_banner(entry: &LeaderboardEntry) -> String {
    format!(
        "Predicted Winner: {} with {:.2}% win chance!",
        entry.team.trim(),
        entry.win_percent
    )
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|want| headers.iter().position(|h| h.trim() == *want))
}

fn parse_percent(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.trim_end_matches('%').trim().replace(',', "").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_percent_handles_suffix_and_blank() {
        assert_eq!(parse_percent("55.2"), Some(55.2));
        assert_eq!(parse_percent(" 60.1% "), Some(60.1));
        assert!(parse_percent("").unwrap().is_nan());
        assert_eq!(parse_percent("n/a"), None);
    }

    #[test]
    fn blank_cells_never_win() {
        let board = Leaderboard::new(vec![
            LeaderboardEntry {
                team: "A".to_string(),
                win_percent: f64::NAN,
            },
            LeaderboardEntry {
                team: "B".to_string(),
                win_percent: 1.0,
            },
        ]);
        assert_eq!(board.predicted_winner().map(|e| e.team.as_str()), Some("B"));
    }

    #[test]
    fn banner_trims_team_and_uses_two_decimals() {
        let entry = LeaderboardEntry {
            team: "  India ".to_string(),
            win_percent: 31.456,
        };
        assert_eq!(
            winner_banner(&entry),
            "Predicted Winner: India with 31.46% win chance!"
        );
    }
}
