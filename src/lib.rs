pub mod config;
pub mod derived;
pub mod features;
pub mod http_client;
pub mod leaderboard;
pub mod live_feed;
pub mod live_provider;
pub mod logging;
pub mod match_state;
pub mod model;
pub mod predictor;
pub mod state;
