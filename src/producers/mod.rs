//! Memoized Producers
//!
//! Each producer wraps one expensive, failure-prone operation: derive a key,
//! consult the shared cache, compute on miss, store on success and fall back
//! to a deterministic value on failure. Fallbacks are never stored.

mod background;
mod copy;
mod memo;
mod quote;
mod render;

use serde::Serialize;

pub use background::{fallback_background, Background, BackgroundProducer};
pub use copy::{fallback_copy, CopyProducer, SocialCopy};
pub use memo::{bounded, MemoContext};
pub use quote::{fallback_quote, tag_variants, QuoteProducer, FALLBACK_QUOTES};
pub use render::{Artwork, RenderProducer};

/// Which producer an event or a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerKind {
    Quote,
    Copy,
    Background,
    Render,
}

impl ProducerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProducerKind::Quote => "quote",
            ProducerKind::Copy => "copy",
            ProducerKind::Background => "background",
            ProducerKind::Render => "render",
        }
    }
}

/// Where a producer result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Cache,
    Live,
    Fallback,
}

/// A producer result tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Memoized<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Memoized<T> {
    pub fn new(value: T, provenance: Provenance) -> Self {
        Self { value, provenance }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }

    pub fn is_cached(&self) -> bool {
        self.provenance == Provenance::Cache
    }
}
