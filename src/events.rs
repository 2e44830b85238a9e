//! Error Events
//!
//! Structured record of producer failures that were absorbed into fallbacks.
//! Kept apart from the cache counters: a fallback is not a cache miss.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::error::{ErrorKind, ProducerError};
use crate::producers::ProducerKind;

/// Number of recent events kept for inspection.
pub const RECENT_EVENTS: usize = 50;

// == Error Event ==
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub producer: ProducerKind,
    pub message: String,
    /// What the producer was working on (topic, short key, style)
    pub context: String,
    pub at: DateTime<Utc>,
}

// == Error Counts ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorCounts {
    pub network_timeout: u64,
    pub upstream_error: u64,
    pub render_error: u64,
}

impl ErrorCounts {
    fn bump(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::NetworkTimeout => self.network_timeout += 1,
            ErrorKind::UpstreamError => self.upstream_error += 1,
            ErrorKind::RenderError => self.render_error += 1,
            // Config errors abort startup and never reach a producer
            ErrorKind::ConfigError => {}
        }
    }

    pub fn total(&self) -> u64 {
        self.network_timeout + self.upstream_error + self.render_error
    }
}

#[derive(Debug, Default)]
struct Inner {
    counts: ErrorCounts,
    recent: VecDeque<ErrorEvent>,
}

// == Error Log ==
/// Cloneable handle; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    inner: Arc<Mutex<Inner>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an absorbed failure and emits a warning.
    pub fn record(&self, producer: ProducerKind, error: &ProducerError, context: impl Into<String>) {
        let event = ErrorEvent {
            kind: error.kind(),
            producer,
            message: error.message().to_string(),
            context: context.into(),
            at: Utc::now(),
        };

        warn!(
            kind = event.kind.as_str(),
            producer = producer.as_str(),
            context = %event.context,
            "{}; serving fallback",
            event.message
        );

        let mut inner = self.inner.lock();
        inner.counts.bump(event.kind);
        if inner.recent.len() == RECENT_EVENTS {
            inner.recent.pop_front();
        }
        inner.recent.push_back(event);
    }

    pub fn counts(&self) -> ErrorCounts {
        self.inner.lock().counts
    }

    /// Most recent events, newest last.
    pub fn recent(&self) -> Vec<ErrorEvent> {
        self.inner.lock().recent.iter().cloned().collect()
    }
}
