//! Memoized artwork rendering.
//!
//! Rendering and encoding run on the blocking pool. The cached form is a
//! bundle of the three encoded files.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use image::codecs::gif::GifEncoder;
use image::{Frame, ImageFormat, Rgba, RgbaImage};

use super::{Background, MemoContext, Memoized, ProducerKind};
use crate::cache::CachedValue;
use crate::error::ProducerError;
use crate::keys::render_key;
use crate::sources::{ImageRenderer, Quote, RenderJob, RenderSettings, Style};

const STILL: &str = "still.png";
const STORY: &str = "story.png";
const ANIMATION: &str = "loop.gif";

/// Encoded outputs of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub still_png: Vec<u8>,
    pub story_png: Vec<u8>,
    pub animation_gif: Vec<u8>,
}

impl Artwork {
    fn into_bundle(self) -> CachedValue {
        let mut parts = BTreeMap::new();
        parts.insert(STILL.to_string(), self.still_png);
        parts.insert(STORY.to_string(), self.story_png);
        parts.insert(ANIMATION.to_string(), self.animation_gif);
        CachedValue::bundle(parts)
    }

    /// Rebuilds an artwork from a bundle holding all three well-formed parts.
    fn from_bundle(parts: &BTreeMap<String, Vec<u8>>) -> Option<Self> {
        let still_png = parts.get(STILL).filter(|b| is_png(b))?.clone();
        let story_png = parts.get(STORY).filter(|b| is_png(b))?.clone();
        let animation_gif = parts.get(ANIMATION).filter(|b| b.starts_with(b"GIF8"))?.clone();
        Some(Self {
            still_png,
            story_png,
            animation_gif,
        })
    }
}

fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(b"\x89PNG\r\n\x1a\n")
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

fn encode_single_frame_gif(image: RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder.encode_frame(Frame::new(image))?;
    }
    Ok(out)
}

/// Solid style colors at the configured sizes, with a one-frame GIF.
fn placeholder(style: &str, settings: RenderSettings) -> Artwork {
    let palette = style.parse::<Style>().unwrap_or(Style::MidnightAura).palette();
    let [r, g, b] = palette.background;
    let fill = Rgba([r, g, b, 255]);
    let canvas = settings.canvas_size.max(1);
    let animation = settings.animation_size.max(1);

    let still = RgbaImage::from_pixel(canvas, canvas, fill);
    let story = RgbaImage::from_pixel((canvas * 9 / 16).max(1), canvas, fill);
    let frame = RgbaImage::from_pixel(animation, animation, fill);

    Artwork {
        still_png: encode_png(&still).unwrap_or_default(),
        story_png: encode_png(&story).unwrap_or_default(),
        animation_gif: encode_single_frame_gif(frame).unwrap_or_default(),
    }
}

#[derive(Clone)]
pub struct RenderProducer {
    renderer: Arc<dyn ImageRenderer>,
    memo: MemoContext,
    settings: RenderSettings,
}

impl RenderProducer {
    pub fn new(renderer: Arc<dyn ImageRenderer>, memo: MemoContext, settings: RenderSettings) -> Self {
        Self {
            renderer,
            memo,
            settings,
        }
    }

    pub async fn render(&self, quote: &Quote, style: &str, background: &Background) -> Memoized<Artwork> {
        let key = render_key(
            &quote.content,
            &quote.author,
            style,
            &background.encoded,
            self.settings.canvas_size,
        );
        let context = format!("{style} {}", key.short());

        self.memo
            .memoize(
                ProducerKind::Render,
                &key,
                &context,
                |stored| Artwork::from_bundle(stored.as_bundle()?),
                || async {
                    let renderer = Arc::clone(&self.renderer);
                    let job = RenderJob {
                        quote: quote.content.clone(),
                        author: quote.author.clone(),
                        style: style.to_string(),
                        background: Arc::clone(&background.image),
                    };

                    let artwork = tokio::task::spawn_blocking(move || {
                        let rendered = renderer.render(&job)?;
                        let encode_error = |err: image::ImageError| ProducerError::Render(err.to_string());
                        Ok::<_, ProducerError>(Artwork {
                            still_png: encode_png(&rendered.still).map_err(encode_error)?,
                            story_png: encode_png(&rendered.story).map_err(encode_error)?,
                            animation_gif: rendered.animation_gif,
                        })
                    })
                    .await
                    .map_err(|err| ProducerError::Render(format!("render task failed: {err}")))??;

                    let encoded = artwork.clone().into_bundle();
                    Ok::<_, ProducerError>((artwork, encoded))
                },
                || placeholder(style, self.settings),
            )
            .await
    }
}
