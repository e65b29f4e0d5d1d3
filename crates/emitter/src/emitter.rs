//! Fire-and-forget event emission.
//!
//! `log_event` never fails: identity and transport errors are logged,
//! counted, and dropped so instrumentation cannot break the user flow.
//! Events are not retried.

use analytics_core::{LogEvent, LogSink, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::BurstConfig;
use crate::device::DeviceClass;
use crate::identity::IdentityProvider;

/// Builds log events from the resolved identity and hands them to a sink.
pub struct EventEmitter {
    identity: Arc<dyn IdentityProvider>,
    sink: Arc<dyn LogSink>,
    device: DeviceClass,
    burst: BurstConfig,
    /// Scheduled companion submissions not yet awaited
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl EventEmitter {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        sink: Arc<dyn LogSink>,
        device: DeviceClass,
        burst: BurstConfig,
    ) -> Self {
        Self {
            identity,
            sink,
            device,
            burst,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Creates an emitter for the browser identified by `user_agent`.
    pub fn for_user_agent(
        identity: Arc<dyn IdentityProvider>,
        sink: Arc<dyn LogSink>,
        user_agent: &str,
        burst: BurstConfig,
    ) -> Self {
        Self::new(identity, sink, DeviceClass::from_user_agent(user_agent), burst)
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Records one event of `event_type`, optionally for a filter.
    ///
    /// Exactly one primary row is submitted per call. On the first
    /// qualifying call of a cold profile the first-visit burst is scheduled
    /// as independent tasks.
    pub async fn log_event(&self, event_type: &str, filter_id: Option<&str>) {
        if let Err(e) = self.try_log_event(event_type, filter_id).await {
            metrics().events_suppressed.inc();
            warn!(event_type, filter = ?filter_id, error = %e, "Dropped analytics event");
        }
    }

    async fn try_log_event(&self, event_type: &str, filter_id: Option<&str>) -> Result<()> {
        let user = self.identity.resolve_user_id()?;
        let session = self.identity.resolve_device_id()?;
        let filter = filter_id.map(str::to_string);

        if self.has_burst() && self.burst.is_trigger(event_type) && self.identity.claim_first_visit()
        {
            self.schedule_burst(&user, &session, &filter);
        }

        let event = LogEvent::new(user, event_type, session, filter);
        self.sink.append(&event).await?;

        metrics().events_emitted.inc();
        debug!(event_type, filter = ?event.filter, "Event logged");
        Ok(())
    }

    /// Check if a burst would emit anything on this device.
    fn has_burst(&self) -> bool {
        self.burst.record_device_type || (self.device.is_mobile() && !self.burst.companions.is_empty())
    }

    fn schedule_burst(&self, user: &str, session: &str, filter: &Option<String>) {
        debug!(device = ?self.device, "Scheduling first-visit events");

        if self.burst.record_device_type {
            self.schedule(self.device.open_event_type(), 0, user, session, filter);
        }

        if self.device.is_mobile() {
            for companion in &self.burst.companions {
                self.schedule(&companion.event_type, companion.delay_ms, user, session, filter);
            }
        }
    }

    /// Submits one synthetic event after `delay_ms`, stamped at submission time.
    fn schedule(
        &self,
        event_type: &str,
        delay_ms: u64,
        user: &str,
        session: &str,
        filter: &Option<String>,
    ) {
        let sink = self.sink.clone();
        let event_type = event_type.to_string();
        let user = user.to_string();
        let session = session.to_string();
        let filter = filter.clone();

        metrics().pending_companions.inc();
        let handle = tokio::spawn(async move {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let event = LogEvent::new(user, event_type, session, filter);
            match sink.append(&event).await {
                Ok(()) => {
                    metrics().companion_events.inc();
                    debug!(event_type = %event.event_type, "Companion event logged");
                }
                Err(e) => {
                    metrics().events_suppressed.inc();
                    warn!(event_type = %event.event_type, error = %e, "Dropped companion event");
                }
            }
            metrics().pending_companions.dec();
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Waits for every scheduled companion event to be submitted.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Companion task failed");
            }
        }
    }
}
