//! Session Registry
//!
//! Per-session generation bookkeeping. Every request gets a
//! [`GenerationContext`] carrying its session id and a generation number;
//! when a context completes it only becomes the session's current result if
//! no newer generation has completed first. The cache never sees any of this.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::producers::{ProducerKind, Provenance};
use crate::sources::{Quote, Style};

/// Sessions kept before the least recently active one is dropped.
pub const MAX_SESSIONS: usize = 1024;

/// Session used when a request names none.
pub const DEFAULT_SESSION: &str = "default";

/// Provenance of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageProvenance {
    pub stage: ProducerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    pub provenance: Provenance,
}

/// One request's view of its session.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    session_id: String,
    generation: u64,
    topic: String,
    stages: Vec<StageProvenance>,
    result: Option<(Quote, Vec<Style>)>,
}

impl GenerationContext {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn stages(&self) -> &[StageProvenance] {
        &self.stages
    }

    pub fn record(&mut self, stage: ProducerKind, style: Option<Style>, provenance: Provenance) {
        self.stages.push(StageProvenance {
            stage,
            style,
            provenance,
        });
    }

    /// Marks the pipeline as finished with this quote and these styles.
    pub fn finish(&mut self, quote: &Quote, styles: Vec<Style>) {
        self.result = Some((quote.clone(), styles));
    }
}

/// Completed generation as remembered by its session.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub generation: u64,
    pub topic: String,
    pub quote: String,
    pub author: String,
    pub styles: Vec<Style>,
    pub stages: Vec<StageProvenance>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub generations_started: u64,
    pub current: Option<GenerationSummary>,
}

#[derive(Debug, Default)]
struct SessionState {
    started: u64,
    last_active: u64,
    current: Option<GenerationSummary>,
}

#[derive(Debug, Default)]
struct Inner {
    tick: u64,
    sessions: HashMap<String, SessionState>,
}

impl Inner {
    fn evict_idle(&mut self) {
        while self.sessions.len() > MAX_SESSIONS {
            let idle = self
                .sessions
                .iter()
                .min_by_key(|(_, state)| state.last_active)
                .map(|(id, _)| id.clone());
            match idle {
                Some(id) => {
                    debug!(session = %id, "dropping idle session");
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }
    }
}

/// Cloneable handle; clones share the same sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a generation for `session_id`, numbered after every earlier one.
    pub fn begin(&self, session_id: &str, topic: &str) -> GenerationContext {
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;

        let state = inner.sessions.entry(session_id.to_string()).or_default();
        state.started += 1;
        state.last_active = tick;
        let generation = state.started;
        inner.evict_idle();

        GenerationContext {
            session_id: session_id.to_string(),
            generation,
            topic: topic.to_string(),
            stages: Vec::new(),
            result: None,
        }
    }

    /// Records a finished context. Returns false when the context never
    /// finished, its session was dropped as idle meanwhile, or a newer
    /// generation of the session is already recorded.
    pub fn complete(&self, context: GenerationContext) -> bool {
        let Some((quote, styles)) = context.result else {
            return false;
        };

        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;
        let Some(state) = inner.sessions.get_mut(&context.session_id) else {
            debug!(session = %context.session_id, "session dropped before completion");
            return false;
        };
        state.last_active = tick;

        let newer = state
            .current
            .as_ref()
            .map_or(true, |current| context.generation > current.generation);
        if !newer {
            debug!(
                session = %context.session_id,
                generation = context.generation,
                "superseded generation not recorded"
            );
            return false;
        }

        state.current = Some(GenerationSummary {
            generation: context.generation,
            topic: context.topic,
            quote: quote.content,
            author: quote.author,
            styles,
            stages: context.stages,
            completed_at: Utc::now(),
        });
        true
    }

    pub fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        let inner = self.inner.lock();
        inner.sessions.get(session_id).map(|state| SessionSnapshot {
            id: session_id.to_string(),
            generations_started: state.started,
            current: state.current.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
