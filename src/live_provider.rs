use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::LiveFeedConfig;
use crate::live_feed;
use crate::state::{Delta, ProviderCommand};

/// Runs live-feed fetches off the UI thread: one fetch at start-up, then one
/// per `RefreshLive` command. Each request is a single best-effort attempt.
/// The thread exits when either channel closes.
pub fn spawn_live_provider(
    cfg: LiveFeedConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if !fetch_once(&cfg, &tx) {
            return;
        }
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::RefreshLive => {
                    if !fetch_once(&cfg, &tx) {
                        return;
                    }
                }
            }
        }
    })
}

fn fetch_once(cfg: &LiveFeedConfig, tx: &Sender<Delta>) -> bool {
    if tx.send(Delta::LiveLoading).is_err() {
        return false;
    }
    let delta = match live_feed::fetch_current_matches(cfg) {
        Ok(feed) => Delta::SetLive(feed),
        Err(err) => {
            tracing::warn!(error = %err, detail = %err.detail(), "live feed unavailable");
            Delta::LiveFailed(err)
        }
    };
    tx.send(delta).is_ok()
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::live_feed::LiveFeedError;

    #[test]
    fn reports_missing_key_without_network() {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let cfg = LiveFeedConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
        };
        let handle = spawn_live_provider(cfg, tx, cmd_rx);

        assert!(matches!(rx.recv().unwrap(), Delta::LiveLoading));
        assert!(matches!(
            rx.recv().unwrap(),
            Delta::LiveFailed(LiveFeedError::MissingApiKey)
        ));

        cmd_tx.send(ProviderCommand::RefreshLive).unwrap();
        assert!(matches!(rx.recv().unwrap(), Delta::LiveLoading));
        assert!(matches!(rx.recv().unwrap(), Delta::LiveFailed(_)));

        drop(cmd_tx);
        handle.join().unwrap();
    }
}
