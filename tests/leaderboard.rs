use std::fs;
use std::path::PathBuf;

use t20_predictor::leaderboard::{Leaderboard, LeaderboardError, winner_banner};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn first_maximum_wins_a_tie() {
    let board = Leaderboard::load(&fixture_path("leaderboard_tie.csv")).expect("fixture loads");
    assert_eq!(board.entries.len(), 3);
    let winner = board.predicted_winner().expect("has a winner");
    assert_eq!(winner.team, "Australia");
    assert_eq!(
        winner_banner(winner),
        "Predicted Winner: Australia with 60.10% win chance!"
    );
}

#[test]
fn raw_export_headers_are_accepted() {
    let board = Leaderboard::load(&fixture_path("leaderboard_raw.csv")).expect("fixture loads");
    let teams: Vec<&str> = board.entries.iter().map(|e| e.team.as_str()).collect();
    assert_eq!(teams, ["India", "Australia", "England"]);
    assert_eq!(board.entries[0].win_percent, 55.2);
    assert!(board.entries[1].win_percent.is_nan());
    assert_eq!(board.predicted_winner().map(|e| e.team.as_str()), Some("England"));
}

#[test]
fn positions_follow_source_order() {
    let board = Leaderboard::load(&fixture_path("leaderboard_tie.csv")).unwrap();
    let numbered: Vec<(usize, &str)> = board
        .numbered()
        .map(|(pos, e)| (pos, e.team.as_str()))
        .collect();
    assert_eq!(numbered, [(1, "India"), (2, "Australia"), (3, "England")]);
}

#[test]
fn missing_file_is_reported() {
    let err = Leaderboard::load(&fixture_path("no_such_results.csv")).unwrap_err();
    assert!(matches!(err, LeaderboardError::Open { .. }));
    assert!(err.to_string().contains("no_such_results.csv"));
}

#[test]
fn missing_columns_are_reported() {
    let err = Leaderboard::from_reader("Country,Chance\nIndia,40\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LeaderboardError::MissingColumn("Team")));

    let err = Leaderboard::from_reader("Team,Chance\nIndia,40\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LeaderboardError::MissingColumn("Win %")));
}

#[test]
fn bad_values_and_empty_tables_fail() {
    let err = Leaderboard::from_reader("Team,Win %\nIndia,lots\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LeaderboardError::InvalidValue { row: 1, .. }));

    let err = Leaderboard::from_reader("Team,Win %\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LeaderboardError::Empty));
}

#[test]
fn shipped_results_name_a_winner() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("data");
    path.push("final_combined_results.csv");
    let board = Leaderboard::load(&path).expect("shipped results load");
    assert!(board.predicted_winner().is_some());
}

#[test]
fn loading_results_leaves_the_directory_untouched() {
    let dir = fixture_path("");
    let listing = || {
        let mut names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    };
    let before = listing();
    let board = Leaderboard::load(&fixture_path("leaderboard_tie.csv")).unwrap();
    assert!(board.predicted_winner().is_some());
    assert_eq!(listing(), before);
}
