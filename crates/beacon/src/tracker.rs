//! The beacon object: tracking, flushing, and the background flush task.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use pixel_core::{EventType, RawEvent};
use serde_json::{json, Map, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::BeaconConfig;
use crate::error::Result;
use crate::queue::EventQueue;
use crate::session::{PageContext, SessionId};
use crate::transport::{HttpTransport, Transport};

/// Longest click text carried in metadata, in characters.
const MAX_CLICK_TEXT_CHARS: usize = 50;

/// The element a click landed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
    /// Tag name, e.g. `BUTTON`
    pub tag: String,
    pub id: Option<String>,
    pub text: Option<String>,
}

/// Result of one [`Beacon::flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was queued; no request was made.
    Empty,
    Sent(usize),
    /// The send failed and the batch was discarded.
    Dropped(usize),
}

/// Per-page-load tracker owning its queue and session id.
pub struct Beacon {
    config: BeaconConfig,
    session_id: SessionId,
    page: RwLock<PageContext>,
    queue: EventQueue,
    transport: Arc<dyn Transport>,
}

impl Beacon {
    /// Creates a beacon with a fresh session id and the HTTP transport.
    pub fn new(config: BeaconConfig, page: PageContext) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, page, transport))
    }

    pub fn with_transport(
        config: BeaconConfig,
        page: PageContext,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            session_id: SessionId::generate(),
            page: RwLock::new(page),
            queue: EventQueue::new(),
            transport,
        }
    }

    /// Reuses a session id persisted by the embedding page.
    pub fn with_session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    /// Number of events waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Replaces the page context after navigation.
    pub fn set_page(&self, page: PageContext) {
        *self.page.write() = page;
    }

    /// Queues one event stamped with the session, page, and current time.
    pub fn track(&self, event_type: impl Into<EventType>, metadata: Map<String, Value>) {
        let event_type = event_type.into();
        let page = self.page.read().clone();

        self.queue.push(RawEvent {
            session_id: Some(self.session_id.as_str().to_string()),
            event_type: Some(event_type.as_str().to_string()),
            url: Some(page.url),
            referrer: page.referrer,
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            metadata: Some(Value::Object(metadata)),
        });
    }

    /// Queues a `click` carrying the target element's tag, id, and text.
    pub fn track_click(&self, target: ClickTarget) {
        let text = target
            .text
            .map(|t| t.chars().take(MAX_CLICK_TEXT_CHARS).collect::<String>());

        let metadata = json!({
            "target": target.tag,
            "id": target.id,
            "text": text,
        });

        if let Value::Object(map) = metadata {
            self.track(EventType::Click, map);
        }
    }

    /// Sends everything queued as one batch.
    ///
    /// The queue is emptied before the request goes out. A failed batch is
    /// dropped, not re-queued.
    pub async fn flush(&self) -> FlushOutcome {
        let batch = self.queue.take();
        if batch.is_empty() {
            return FlushOutcome::Empty;
        }

        let count = batch.len();
        match self.transport.send(&batch).await {
            Ok(()) => {
                debug!(count, session_id = %self.session_id, "Flushed events");
                FlushOutcome::Sent(count)
            }
            Err(e) => {
                warn!(count, error = %e, "Failed to deliver events, dropping batch");
                FlushOutcome::Dropped(count)
            }
        }
    }

    /// Tracks the initial `pageview` and starts the periodic flush.
    pub fn start(self: &Arc<Self>) -> BeaconHandle {
        self.track(EventType::Pageview, Map::new());

        let (shutdown, mut stopped) = watch::channel(false);
        let beacon = self.clone();
        let ticker = tokio::spawn(async move {
            let mut ticker = interval(beacon.config.flush_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            // Shutdown is only observed between ticks, so a send already in
            // flight always runs to completion.
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {
                        beacon.flush().await;
                    }
                }
            }
        });

        info!(session_id = %self.session_id, interval_ms = self.config.flush_interval_ms, "Beacon started");

        BeaconHandle {
            beacon: self.clone(),
            shutdown,
            ticker,
        }
    }
}

/// Running beacon: owns the periodic flush task. Dropping it stops the
/// periodic flush without a final one.
pub struct BeaconHandle {
    beacon: Arc<Beacon>,
    shutdown: watch::Sender<bool>,
    ticker: JoinHandle<()>,
}

impl BeaconHandle {
    pub fn beacon(&self) -> &Arc<Beacon> {
        &self.beacon
    }

    /// Stops the periodic flush and fires a final one in the background.
    ///
    /// A periodic send still in flight finishes first. Returns immediately;
    /// await the handle only if the caller can afford to.
    pub fn unload(self) -> JoinHandle<FlushOutcome> {
        let _ = self.shutdown.send(true);
        let Self { beacon, ticker, .. } = self;
        tokio::spawn(async move {
            if let Err(e) = ticker.await {
                warn!(error = %e, "Periodic flush task ended abnormally");
            }
            beacon.flush().await
        })
    }
}
