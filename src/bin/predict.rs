use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use t20_predictor::config::{self, AppConfig};
use t20_predictor::logging;
use t20_predictor::match_state::MatchState;
use t20_predictor::model::LogisticPipeline;
use t20_predictor::predictor::Predictor;
use t20_predictor::state::{match_summary_lines, win_chance_lines};

/// Offline one-shot prediction: `predict [case.json] [model.json]`.
fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    logging::init_stderr()?;
    let cfg = AppConfig::from_env();

    let mut args = std::env::args().skip(1);
    let case_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/match_state.json"));
    let model_path = args.next().map(PathBuf::from).unwrap_or(cfg.model_path);

    let raw = fs::read_to_string(&case_path)
        .with_context(|| format!("read match state {}", case_path.display()))?;
    let input: MatchState = serde_json::from_str(&raw)
        .with_context(|| format!("parse match state {}", case_path.display()))?;
    if input.same_team_on_both_sides() {
        tracing::warn!(team = %input.batting_team, "same team on both sides");
    }

    let model = LogisticPipeline::load(&model_path)?;
    let predictor = Predictor::new(Arc::new(model));
    let (stats, features) = predictor.features_for(&input);
    println!("Features: {}", serde_json::to_string(&features)?);
    println!("Derived: {}", serde_json::to_string(&stats)?);

    let prediction = predictor.predict(&input)?;

    for line in win_chance_lines(&input, &prediction) {
        println!("{line}");
    }
    for line in match_summary_lines(&input, &prediction) {
        println!("{line}");
    }
    println!("Momentum: {}", prediction.classification.momentum.message());
    println!("Strategy: {}", prediction.classification.strategy_tip.message());

    Ok(())
}
