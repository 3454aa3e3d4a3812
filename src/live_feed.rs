use chrono::{NaiveDate, NaiveDateTime};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::LiveFeedConfig;
use crate::http_client::http_client;

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_NAME: &str = "Match Name N/A";
const DEFAULT_TEAMS: [&str; 2] = ["Team A", "Team B"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveFeedError {
    #[error("API key not configured (set CRICAPI_KEY)")]
    MissingApiKey,
    #[error("Could not reach API")]
    Network(String),
    #[error("Error: {0}")]
    HttpStatus(u16),
    #[error("API Error")]
    ApiStatus(String),
    #[error("Could not reach API")]
    Decode(String),
}

impl LiveFeedError {
    /// Underlying cause for the log file; the Display text is what users see.
    pub fn detail(&self) -> String {
        match self {
            LiveFeedError::MissingApiKey => "no api key".to_string(),
            LiveFeedError::Network(msg) | LiveFeedError::Decode(msg) => msg.clone(),
            LiveFeedError::HttpStatus(code) => format!("http status {code}"),
            LiveFeedError::ApiStatus(status) => format!("api status `{status}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMatch {
    pub name: String,
    pub venue: String,
    pub date: String,
    pub status: String,
    pub team_a: String,
    pub team_b: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub index: usize,
    pub reason: String,
}

/// Successful feed. Records that could not be read are listed separately so
/// one bad entry never hides the rest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveFeed {
    pub matches: Vec<LiveMatch>,
    pub record_errors: Vec<RecordError>,
}

pub fn fetch_current_matches(cfg: &LiveFeedConfig) -> Result<LiveFeed, LiveFeedError> {
    let Some(api_key) = cfg.api_key.as_deref() else {
        return Err(LiveFeedError::MissingApiKey);
    };
    let client = http_client().map_err(|err| LiveFeedError::Network(format!("{err:#}")))?;

    let url = format!("{}/currentMatches", cfg.base_url);
    tracing::info!(%url, "fetching live matches");
    let resp = client
        .get(&url)
        .query(&[("apikey", api_key), ("offset", "0")])
        .send()
        .map_err(|err| LiveFeedError::Network(err.without_url().to_string()))?;

    let status = resp.status();
    if status != StatusCode::OK {
        return Err(LiveFeedError::HttpStatus(status.as_u16()));
    }
    let body = resp
        .text()
        .map_err(|err| LiveFeedError::Network(err.without_url().to_string()))?;
    parse_current_matches_json(&body)
}

pub fn parse_current_matches_json(raw: &str) -> Result<LiveFeed, LiveFeedError> {
    let root: Value = serde_json::from_str(raw.trim())
        .map_err(|err| LiveFeedError::Decode(format!("invalid json: {err}")))?;

    // An envelope without `status` is unreadable, not an API-reported failure.
    let Some(status) = root.get("status") else {
        return Err(LiveFeedError::Decode("response has no `status`".to_string()));
    };
    if status.as_str() != Some("success") {
        return Err(LiveFeedError::ApiStatus(scalar_text(status)));
    }

    let records = match root.get("data") {
        None | Some(Value::Null) => return Ok(LiveFeed::default()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(LiveFeedError::Decode("`data` is not a list".to_string())),
    };

    let mut feed = LiveFeed::default();
    for (index, record) in records.iter().enumerate() {
        match parse_record(record) {
            Ok(m) => feed.matches.push(m),
            Err(reason) => feed.record_errors.push(RecordError { index, reason }),
        }
    }
    Ok(feed)
}

fn parse_record(record: &Value) -> Result<LiveMatch, String> {
    let Some(obj) = record.as_object() else {
        return Err(format!("expected an object, found {}", json_kind(record)));
    };

    let (team_a, team_b) = match obj.get("teams") {
        None | Some(Value::Null) => (DEFAULT_TEAMS[0].to_string(), DEFAULT_TEAMS[1].to_string()),
        Some(Value::Array(teams)) => {
            if teams.len() < 2 {
                return Err(format!("expected two teams, found {}", teams.len()));
            }
            (scalar_text(&teams[0]), scalar_text(&teams[1]))
        }
        Some(other) => return Err(format!("`teams` is {}, not a list", json_kind(other))),
    };

    let field = |key: &str, default: &str| {
        obj.get(key)
            .filter(|v| !v.is_null())
            .map(scalar_text)
            .unwrap_or_else(|| default.to_string())
    };

    Ok(LiveMatch {
        name: field("name", DEFAULT_NAME),
        venue: field("venue", NOT_AVAILABLE),
        date: field("date", NOT_AVAILABLE),
        status: field("status", NOT_AVAILABLE),
        team_a,
        team_b,
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Friendlier rendering of the feed's `date` field; anything unparseable is
/// shown as received.
pub fn format_match_date(raw: &str) -> String {
    let cleaned = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(cleaned, "%Y-%m-%d") {
        return date.format("%a %d %b %Y").to_string();
    }
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return format!("{} GMT", dt.format("%a %d %b %Y %H:%M"));
        }
    }
    cleaned.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_string_fields_are_stringified() {
        let record = serde_json::json!({"name": 42, "teams": ["A", "B"]});
        let m = parse_record(&record).unwrap();
        assert_eq!(m.name, "42");
        assert_eq!(m.venue, "N/A");
    }

    #[test]
    fn null_teams_fall_back_to_placeholders() {
        let record = serde_json::json!({"name": "x", "teams": null});
        let m = parse_record(&record).unwrap();
        assert_eq!((m.team_a.as_str(), m.team_b.as_str()), ("Team A", "Team B"));
    }

    #[test]
    fn formats_iso_dates() {
        assert_eq!(format_match_date("2024-06-29"), "Sat 29 Jun 2024");
        assert_eq!(
            format_match_date("2024-06-29T14:30:00"),
            "Sat 29 Jun 2024 14:30 GMT"
        );
        assert_eq!(format_match_date("N/A"), "N/A");
    }

    #[test]
    fn missing_key_short_circuits() {
        let cfg = LiveFeedConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
        };
        assert_eq!(fetch_current_matches(&cfg), Err(LiveFeedError::MissingApiKey));
    }

    #[test]
    fn missing_status_reads_as_unreachable() {
        let err = parse_current_matches_json(r#"{"data": []}"#).unwrap_err();
        assert!(matches!(err, LiveFeedError::Decode(_)));
        assert_eq!(err.to_string(), "Could not reach API");

        let err = parse_current_matches_json("[]").unwrap_err();
        assert!(matches!(err, LiveFeedError::Decode(_)));
    }

    #[test]
    fn user_messages() {
        assert_eq!(LiveFeedError::HttpStatus(503).to_string(), "Error: 503");
        assert_eq!(LiveFeedError::ApiStatus("failure".into()).to_string(), "API Error");
        assert_eq!(
            LiveFeedError::Network("timeout".into()).to_string(),
            "Could not reach API"
        );
    }
}
