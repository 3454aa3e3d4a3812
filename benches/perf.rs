use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use t20_predictor::derived::compute;
use t20_predictor::features::encode;
use t20_predictor::leaderboard::Leaderboard;
use t20_predictor::live_feed::parse_current_matches_json;
use t20_predictor::match_state::MatchState;
use t20_predictor::model::LogisticPipeline;
use t20_predictor::predictor::Predictor;

const MODEL_JSON: &str = include_str!("../models/win_model.json");
const LIVE_JSON: &str = include_str!("../tests/fixtures/live_success.json");
const RESULTS_CSV: &str = include_str!("../data/final_combined_results.csv");

fn sample_state() -> MatchState {
    MatchState {
        batting_team: "India".to_string(),
        bowling_team: "Australia".to_string(),
        venue: "Bridgetown".to_string(),
        target: 180,
        current_score: 90,
        wickets_lost: 3,
        overs_completed: 10,
    }
}

fn bench_encode(c: &mut Criterion) {
    let state = sample_state();
    c.bench_function("derive_and_encode", |b| {
        b.iter(|| {
            let stats = compute(black_box(&state));
            let features = encode(&state, &stats);
            black_box(features.len());
        })
    });
}

fn bench_predict(c: &mut Criterion) {
    let model = LogisticPipeline::from_json(MODEL_JSON).expect("valid model json");
    let predictor = Predictor::new(Arc::new(model));
    let state = sample_state();
    c.bench_function("predict", |b| {
        b.iter(|| {
            let prediction = predictor.predict(black_box(&state)).unwrap();
            black_box(prediction.win_pct);
        })
    });
}

fn bench_live_parse(c: &mut Criterion) {
    c.bench_function("live_feed_parse", |b| {
        b.iter(|| {
            let feed = parse_current_matches_json(black_box(LIVE_JSON)).unwrap();
            black_box(feed.matches.len());
        })
    });
}

fn bench_leaderboard(c: &mut Criterion) {
    c.bench_function("leaderboard_parse", |b| {
        b.iter(|| {
            let board = Leaderboard::from_reader(black_box(RESULTS_CSV.as_bytes())).unwrap();
            black_box(board.predicted_winner().map(|e| e.win_percent));
        })
    });
}

criterion_group!(
    perf,
    bench_encode,
    bench_predict,
    bench_live_parse,
    bench_leaderboard
);
criterion_main!(perf);
