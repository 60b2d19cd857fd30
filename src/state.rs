use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::history::{HistoryObserver, RunSource, TracingObserver};
use crate::services::totoro::TotoroClient;

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn RunSource>,
    observer: Arc<dyn HistoryObserver>,
    config: Arc<Config>,
    started_at: Instant,
}

impl AppState {
    pub fn new(source: Arc<dyn RunSource>, config: &Config) -> Self {
        Self {
            source,
            observer: Arc::new(TracingObserver),
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        }
    }

    /// State backed by the real upstream client described in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(TotoroClient::new(&config.upstream)), config)
    }

    pub fn with_observer(mut self, observer: Arc<dyn HistoryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn source(&self) -> &dyn RunSource {
        self.source.as_ref()
    }

    pub fn observer(&self) -> &dyn HistoryObserver {
        self.observer.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
