//! Liveness polling of the inference service
//!
//! A fixed-period ticker fires independently of everything else; each tick
//! launches its own probe. Probes may overlap when the service is slow, so
//! every probe carries a ticket and only results newer than the last one
//! applied are kept.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use iced::futures::stream::{self, Stream};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::net::InferenceService;

/// Identifies one probe, in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProbeTicket(u64);

/// Latest known liveness of the inference service
#[derive(Debug, Default)]
pub struct HealthMonitor {
    online: bool,
    issued: u64,
    applied: u64,
    last_checked: Option<DateTime<Local>>,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the ticket for a new probe
    pub fn issue(&mut self) -> ProbeTicket {
        self.issued += 1;
        ProbeTicket(self.issued)
    }

    /// Record a probe result
    ///
    /// Results from probes older than the last recorded one are dropped.
    /// Returns whether the result was applied.
    pub fn record(&mut self, ticket: ProbeTicket, online: bool) -> bool {
        if ticket.0 <= self.applied {
            debug!("Discarding stale probe #{}", ticket.0);
            return false;
        }
        if online != self.online {
            info!("Inference service is {}", if online { "online" } else { "offline" });
        }
        self.applied = ticket.0;
        self.online = online;
        self.last_checked = Some(Local::now());
        true
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn last_checked(&self) -> Option<DateTime<Local>> {
        self.last_checked
    }
}

/// Probe the liveness endpoint once
///
/// Any failure (timeout, refused connection, non-2xx) reads as offline.
pub async fn probe<S: InferenceService>(service: Arc<S>, ticket: ProbeTicket) -> (ProbeTicket, bool) {
    match service.health().await {
        Ok(()) => (ticket, true),
        Err(err) => {
            debug!("Probe #{} failed: {}", ticket.0, err);
            (ticket, false)
        }
    }
}

/// Ticks every `period`, the first one immediately
///
/// The interval is created on first poll so the stream can be built outside
/// the runtime.
pub fn ticks(period: Duration) -> impl Stream<Item = Instant> + Send + 'static {
    stream::unfold(None, move |interval: Option<Interval>| async move {
        let mut interval = interval.unwrap_or_else(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        let at = interval.tick().await;
        Some((at, Some(interval)))
    })
}
