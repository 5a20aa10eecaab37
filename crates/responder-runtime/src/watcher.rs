//! Polling loop over the communication sources.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use responder_models::CommunicationEvent;
use responder_persistence::{MarkerStore, WhitelistStore};

use crate::config::WatcherConfig;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::dnd::DndSwitch;
use crate::error::SourceError;
use crate::source::CommunicationSource;

/// An entry seen during a poll and what was done with it.
#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    /// The entry.
    pub event: CommunicationEvent,
    /// Its outcome.
    pub outcome: DispatchOutcome,
}

/// Polls call and message history and replies while DND is on.
///
/// Owns the source markers; nothing else touches them.
pub struct Watcher {
    sources: Vec<Arc<dyn CommunicationSource>>,
    markers: MarkerStore,
    dnd: DndSwitch,
    whitelist: Arc<WhitelistStore>,
    dispatcher: Dispatcher,
    config: WatcherConfig,
}

impl Watcher {
    /// Creates a watcher with no sources and the default config.
    pub fn new(
        dispatcher: Dispatcher,
        dnd: DndSwitch,
        whitelist: Arc<WhitelistStore>,
        markers: MarkerStore,
    ) -> Self {
        Self {
            sources: Vec::new(),
            markers,
            dnd,
            whitelist,
            dispatcher,
            config: WatcherConfig::default(),
        }
    }

    /// Adds a source to poll.
    pub fn with_source(mut self, source: Arc<dyn CommunicationSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Sets the watcher configuration.
    pub fn with_config(mut self, config: WatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the current markers.
    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    /// Run the polling loop until shutdown signal.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            sources = self.sources.len(),
            "starting communication watcher"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped, stopping watcher");
                        break;
                    }
                    if *shutdown.borrow() {
                        debug!("watcher received shutdown signal");
                        break;
                    }
                }
            }
        }

        info!("communication watcher stopped");
    }

    /// Polls every source once.
    pub async fn poll_once(&mut self) -> Vec<ProcessedEvent> {
        self.poll_at(Utc::now()).await
    }

    /// Polls every source once, treating `now` as the current time.
    pub async fn poll_at(&mut self, now: DateTime<Utc>) -> Vec<ProcessedEvent> {
        let mut processed = Vec::new();
        for source in self.sources.clone() {
            self.poll_source(&source, now, &mut processed).await;
        }
        processed
    }

    async fn poll_source(
        &mut self,
        source: &Arc<dyn CommunicationSource>,
        now: DateTime<Utc>,
        processed: &mut Vec<ProcessedEvent>,
    ) {
        let kind = source.kind();

        let marker = match self.markers.get(kind) {
            Some(marker) => marker,
            None => match self.establish_baseline(source).await {
                Ok(marker) => marker,
                Err(e) => {
                    warn!(source = %kind, error = %e, "failed to read source baseline");
                    return;
                }
            },
        };

        let limit = self.config.batch_limit;
        let mut entries = match read_blocking(source, move |s| s.fetch_after(marker, limit)).await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(source = %kind, marker, error = %e, "failed to read source");
                return;
            }
        };

        if entries.is_empty() {
            trace!(source = %kind, marker, "no new entries");
            return;
        }

        debug!(source = %kind, marker, count = entries.len(), "new entries");
        entries.sort_by_key(|e| (e.timestamp, e.key));

        for entry in entries {
            let outcome = self.process(&entry, now).await;
            info!(
                source = %entry.source,
                key = entry.key,
                contact = %entry.contact,
                outcome = %outcome,
                "processed entry"
            );
            processed.push(ProcessedEvent {
                event: entry,
                outcome,
            });
        }
    }

    async fn establish_baseline(
        &mut self,
        source: &Arc<dyn CommunicationSource>,
    ) -> Result<i64, SourceError> {
        let kind = source.kind();
        let baseline = read_blocking(source, |s| s.latest_key()).await?.unwrap_or(0);

        self.markers.advance(kind, baseline);
        if let Err(e) = self.markers.save() {
            warn!(source = %kind, error = %e, "failed to persist marker baseline");
        }

        info!(source = %kind, baseline, "established marker baseline");
        Ok(baseline)
    }

    /// Runs one entry through the gates and, if it passes, the dispatcher.
    ///
    /// The marker moves past the entry before anything else happens, so an
    /// entry is never dispatched twice even if the process dies mid-reply.
    async fn process(&mut self, entry: &CommunicationEvent, now: DateTime<Utc>) -> DispatchOutcome {
        self.markers.advance(entry.source, entry.key);
        if let Err(e) = self.markers.save() {
            warn!(source = %entry.source, key = entry.key, error = %e, "failed to persist marker");
        }

        if !self.dnd.is_enabled() {
            debug!(source = %entry.source, key = entry.key, "DND off, not replying");
            return DispatchOutcome::SkippedDndOff;
        }

        if self.is_stale(entry, now) {
            debug!(
                source = %entry.source,
                key = entry.key,
                timestamp = %entry.timestamp,
                "entry too old, not replying"
            );
            return DispatchOutcome::SkippedStale;
        }

        let Some(allowed) = self.whitelist.find(&entry.contact) else {
            info!(
                source = %entry.source,
                contact = %entry.contact,
                "contact not whitelisted, not replying"
            );
            return DispatchOutcome::SkippedNotWhitelisted;
        };

        let contact_name = allowed.display_name.as_deref().or(entry.contact_name.as_deref());
        self.dispatcher.reply(entry, contact_name, now).await
    }

    fn is_stale(&self, entry: &CommunicationEvent, now: DateTime<Utc>) -> bool {
        match (now - entry.timestamp).to_std() {
            Ok(age) => age > self.config.max_event_age,
            // Timestamped in the future relative to `now`.
            Err(_) => false,
        }
    }
}

/// Runs a blocking source read on the blocking pool.
async fn read_blocking<T, F>(
    source: &Arc<dyn CommunicationSource>,
    read: F,
) -> Result<T, SourceError>
where
    T: Send + 'static,
    F: FnOnce(&dyn CommunicationSource) -> Result<T, SourceError> + Send + 'static,
{
    let source = Arc::clone(source);
    tokio::task::spawn_blocking(move || read(source.as_ref()))
        .await
        .map_err(|e| SourceError::Task(e.to_string()))?
}
