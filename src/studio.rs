//! Studio Pipeline
//!
//! Chains the producers for one generation: quote, social copy, background
//! and artwork. A batch shares the first three stages and renders every
//! style concurrently.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::info;

use crate::cache::SharedCache;
use crate::config::Config;
use crate::events::ErrorLog;
use crate::producers::{
    Artwork, Background, BackgroundProducer, CopyProducer, MemoContext, Memoized, ProducerKind,
    QuoteProducer, RenderProducer, SocialCopy,
};
use crate::session::GenerationContext;
use crate::sources::{
    CardRenderer, CopyGenerator, GroqClient, ImageRenderer, ImageSource, PicsumClient,
    QuotableClient, Quote, QuoteSource, RenderSettings, Style, UnsplashClient,
};

/// The collaborators behind the four producers.
#[derive(Clone)]
pub struct Collaborators {
    pub quotes: Arc<dyn QuoteSource>,
    pub copy: Arc<dyn CopyGenerator>,
    pub images: Arc<dyn ImageSource>,
    pub renderer: Arc<dyn ImageRenderer>,
}

impl Collaborators {
    /// HTTP clients and the card renderer, as configured.
    pub fn from_config(config: &Config) -> Self {
        let images: Arc<dyn ImageSource> = match &config.unsplash_access_key {
            Some(key) => Arc::new(UnsplashClient::new(
                config.unsplash_api_url.clone(),
                key.clone(),
                config.http_timeout,
            )),
            None => Arc::new(PicsumClient::new(config.picsum_url.clone(), config.http_timeout)),
        };

        Self {
            quotes: Arc::new(QuotableClient::new(config.quote_api_url.clone(), config.http_timeout)),
            copy: Arc::new(GroqClient::new(
                config.groq_base_url.clone(),
                config.groq_model.clone(),
                config.groq_api_key.clone(),
                config.ai_timeout,
            )),
            images,
            renderer: Arc::new(CardRenderer::new(render_settings(config))),
        }
    }
}

pub fn render_settings(config: &Config) -> RenderSettings {
    RenderSettings {
        canvas_size: config.canvas_size,
        animation_size: config.animation_size,
        frames: config.animation_frames,
        frame_ms: config.animation_frame_ms,
    }
}

/// Inputs of one generation, already validated.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    /// Skips the quote stage when given
    pub quote: Option<Quote>,
}

/// Result of the stages shared by single and batch generation.
#[derive(Debug, Clone)]
pub struct Draft {
    pub quote: Quote,
    pub copy: SocialCopy,
    pub background: Background,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub quote: Quote,
    pub copy: SocialCopy,
    pub style: Style,
    pub artwork: Artwork,
}

#[derive(Debug, Clone)]
pub struct BatchGeneration {
    pub quote: Quote,
    pub copy: SocialCopy,
    pub artworks: Vec<(Style, Memoized<Artwork>)>,
}

pub struct Studio {
    quotes: QuoteProducer,
    copy: CopyProducer,
    backgrounds: BackgroundProducer,
    renders: RenderProducer,
    memo: MemoContext,
    canvas_size: u32,
}

impl Studio {
    pub fn new(
        collaborators: Collaborators,
        memo: MemoContext,
        http_timeout: Duration,
        ai_timeout: Duration,
        settings: RenderSettings,
    ) -> Self {
        Self {
            quotes: QuoteProducer::new(collaborators.quotes, memo.clone(), http_timeout),
            copy: CopyProducer::new(collaborators.copy, memo.clone(), ai_timeout),
            backgrounds: BackgroundProducer::new(collaborators.images, memo.clone(), http_timeout),
            renders: RenderProducer::new(collaborators.renderer, memo.clone(), settings),
            memo,
            canvas_size: settings.canvas_size,
        }
    }

    /// A studio with the configured collaborators and a fresh cache.
    pub fn from_config(config: &Config) -> Self {
        let memo = MemoContext::new(
            SharedCache::new(config.cache_max_entries, config.cache_ttl),
            ErrorLog::new(),
        );
        Self::new(
            Collaborators::from_config(config),
            memo,
            config.http_timeout,
            config.ai_timeout,
            render_settings(config),
        )
    }

    pub fn cache(&self) -> &SharedCache {
        &self.memo.cache
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.memo.errors
    }

    pub async fn quote(&self, topic: &str) -> Memoized<Quote> {
        self.quotes.quote(topic).await
    }

    /// Quote, copy and background, recorded into `context`.
    async fn draft(&self, context: &mut GenerationContext, request: &GenerationRequest) -> Draft {
        let quote = match &request.quote {
            Some(quote) => quote.clone(),
            None => {
                let quote = self.quotes.quote(&request.topic).await;
                context.record(ProducerKind::Quote, None, quote.provenance);
                quote.value
            }
        };

        let copy = self.copy.copy(&quote, &request.topic).await;
        context.record(ProducerKind::Copy, None, copy.provenance);

        let background = self
            .backgrounds
            .background(&copy.value.background_keywords, self.canvas_size, self.canvas_size)
            .await;
        context.record(ProducerKind::Background, None, background.provenance);

        Draft {
            quote,
            copy: copy.value,
            background: background.value,
        }
    }

    /// One artwork in one style. Every stage degrades to its fallback, so
    /// this always produces a result.
    pub async fn generate(
        &self,
        context: &mut GenerationContext,
        request: &GenerationRequest,
        style: Style,
    ) -> Generation {
        let draft = self.draft(context, request).await;
        let artwork = self
            .renders
            .render(&draft.quote, style.as_str(), &draft.background)
            .await;
        context.record(ProducerKind::Render, Some(style), artwork.provenance);
        context.finish(&draft.quote, vec![style]);

        info!(
            session = context.session_id(),
            generation = context.generation(),
            topic = %request.topic,
            %style,
            "generation finished"
        );

        Generation {
            quote: draft.quote,
            copy: draft.copy,
            style,
            artwork: artwork.value,
        }
    }

    /// One artwork per style, rendered concurrently over a shared draft.
    pub async fn generate_batch(
        &self,
        context: &mut GenerationContext,
        request: &GenerationRequest,
    ) -> BatchGeneration {
        let draft = self.draft(context, request).await;

        let renders = Style::ALL.map(|style| {
            let draft = &draft;
            async move {
                let artwork = self
                    .renders
                    .render(&draft.quote, style.as_str(), &draft.background)
                    .await;
                (style, artwork)
            }
        });
        let artworks = join_all(renders).await;

        for (style, artwork) in &artworks {
            context.record(ProducerKind::Render, Some(*style), artwork.provenance);
        }
        context.finish(&draft.quote, Style::ALL.to_vec());

        info!(
            session = context.session_id(),
            generation = context.generation(),
            topic = %request.topic,
            styles = artworks.len(),
            "batch finished"
        );

        BatchGeneration {
            quote: draft.quote,
            copy: draft.copy,
            artworks,
        }
    }
}
