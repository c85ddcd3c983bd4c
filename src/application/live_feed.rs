// Live reading feed - keeps the most recent reading current
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::SensorReading;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Fallback refresh period, used when the push channel silently drops.
pub const POLL_INTERVAL: Duration = Duration::from_secs(12);

/// Pause before re-subscribing after the push stream ends.
const RESUBSCRIBE_PAUSE: Duration = Duration::from_secs(5);

/// What the feed currently knows. At most one reading is held; every update
/// replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub enum FeedState {
    #[default]
    Loading,
    Ready(SensorReading),
}

impl FeedState {
    pub fn reading(&self) -> Option<&SensorReading> {
        match self {
            FeedState::Ready(reading) => Some(reading),
            FeedState::Loading => None,
        }
    }
}

/// Owns the push subscription and the poll timer. Both tasks write into the
/// same watch slot; consumers observe it through [`LiveFeed::state`].
pub struct LiveFeed {
    state: watch::Receiver<FeedState>,
    subscription: JoinHandle<()>,
    poller: JoinHandle<()>,
}

impl LiveFeed {
    pub fn start(repository: Arc<dyn ReadingRepository>, poll_interval: Duration) -> Self {
        let (tx, rx) = watch::channel(FeedState::Loading);
        let slot = Arc::new(tx);

        let subscription = tokio::spawn(subscription_loop(repository.clone(), slot.clone()));
        let poller = tokio::spawn(poll_loop(repository, slot, poll_interval));

        Self {
            state: rx,
            subscription,
            poller,
        }
    }

    pub fn state(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Release the push subscription and cancel the poll timer. Both must
    /// stop; a leaked task would keep hitting the store after the view is
    /// gone.
    pub fn shutdown(&self) {
        self.subscription.abort();
        self.poller.abort();
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn subscription_loop(
    repository: Arc<dyn ReadingRepository>,
    slot: Arc<watch::Sender<FeedState>>,
) {
    // Resolve the most recent reading first; until this lands the feed
    // stays in its loading state.
    match repository.latest_reading().await {
        Ok(Some(reading)) => {
            publish(&slot, reading);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("initial reading fetch failed: {e:#}"),
    }

    loop {
        match repository.subscribe_inserts().await {
            Ok(mut inserts) => {
                while let Some(reading) = inserts.recv().await {
                    publish(&slot, reading);
                }
                tracing::warn!("insert feed closed, re-subscribing");
            }
            Err(e) => tracing::warn!("insert feed subscription failed: {e:#}"),
        }
        tokio::time::sleep(RESUBSCRIBE_PAUSE).await;
    }
}

async fn poll_loop(
    repository: Arc<dyn ReadingRepository>,
    slot: Arc<watch::Sender<FeedState>>,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial fetch already
    // covers it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match repository.latest_reading().await {
            Ok(Some(reading)) => {
                publish(&slot, reading);
            }
            Ok(None) => {}
            // Keep the previously held reading; the next tick or push
            // recovers.
            Err(e) => tracing::warn!("periodic reading refresh failed: {e:#}"),
        }
    }
}

/// Install an incoming reading unless the slot already holds one at least
/// as recent. Duplicate or out-of-order deliveries never regress the view.
fn publish(slot: &watch::Sender<FeedState>, incoming: SensorReading) -> bool {
    slot.send_if_modified(|state| match state {
        FeedState::Ready(held) if incoming.recorded_at <= held.recorded_at => false,
        _ => {
            *state = FeedState::Ready(incoming);
            true
        }
    })
}
