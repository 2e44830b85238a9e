//! Quote card renderer.
//!
//! Draws the card directly onto pixel buffers: a cover-cropped and tinted
//! photo, a floating card with a broken accent border, the quote laid out as
//! word blocks and an author bar. The same scene is drawn square, as a 9:16
//! story and as a looping GIF where the words reveal one after another.

use std::f32::consts::TAU;

use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame, Rgba, RgbaImage};

use super::{ImageRenderer, Palette, RenderJob, RenderedArtwork, Style};
use crate::error::ProducerError;

const MIN_CELL: u32 = 2;
const TINT_ALPHA: f32 = 0.55;
const CARD_ALPHA: f32 = 0.62;

/// Output sizes of the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Edge of the square still; the story is `canvas_size * 9 / 16` wide
    pub canvas_size: u32,
    pub animation_size: u32,
    pub frames: u32,
    pub frame_ms: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            canvas_size: 1080,
            animation_size: 360,
            frames: 12,
            frame_ms: 83,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardRenderer {
    settings: RenderSettings,
}

impl CardRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    fn animate(
        &self,
        scene: &Scene<'_>,
        background: &RgbaImage,
    ) -> Result<Vec<u8>, ProducerError> {
        let size = self.settings.animation_size;
        let frames = self.settings.frames.max(1);
        let backdrop = backdrop(background, scene.palette, size, size);
        let words = scene.words.len();
        let reveal_frames = (frames * 2 / 3).max(1) as usize;
        let amplitude = size as f32 * 0.015;

        let buffers = (0..frames).map(|i| {
            let visible = (((i as usize + 1) * words).div_ceil(reveal_frames)).min(words);
            let phase = TAU * i as f32 / frames as f32;
            let lift = (phase.sin() * amplitude).round() as i64;
            scene.draw(backdrop.clone(), visible, lift)
        });

        encode_gif(buffers, self.settings.frame_ms)
    }
}

impl ImageRenderer for CardRenderer {
    fn render(&self, job: &RenderJob) -> Result<RenderedArtwork, ProducerError> {
        let style: Style = job
            .style
            .parse()
            .map_err(|err: super::UnknownStyle| ProducerError::Render(err.to_string()))?;
        let (bw, bh) = job.background.dimensions();
        if bw == 0 || bh == 0 {
            return Err(ProducerError::Render("background image is empty".to_string()));
        }

        let scene = Scene::new(&job.quote, &job.author, style.palette());
        let canvas = self.settings.canvas_size.max(1);
        let all = scene.words.len();

        let still = scene.draw(backdrop(&job.background, scene.palette, canvas, canvas), all, 0);
        let story_width = (canvas * 9 / 16).max(1);
        let story = scene.draw(
            backdrop(&job.background, scene.palette, story_width, canvas),
            all,
            0,
        );
        let animation_gif = self.animate(&scene, &job.background)?;

        Ok(RenderedArtwork {
            still,
            story,
            animation_gif,
        })
    }
}

// == Scene ==
struct Scene<'a> {
    words: Vec<&'a str>,
    author: Vec<&'a str>,
    palette: Palette,
}

impl<'a> Scene<'a> {
    fn new(quote: &'a str, author: &'a str, palette: Palette) -> Self {
        Self {
            words: quote.split_whitespace().collect(),
            author: author.split_whitespace().collect(),
            palette,
        }
    }

    /// Draws the card over a prepared backdrop with `visible` words shown.
    fn draw(&self, mut canvas: RgbaImage, visible: usize, lift: i64) -> RgbaImage {
        let (width, height) = canvas.dimensions();
        let margin_x = width / 12;
        let margin_y = height / 8;
        let card = Rect {
            x: margin_x as i64,
            y: margin_y as i64 - lift,
            w: width.saturating_sub(margin_x * 2),
            h: height.saturating_sub(margin_y * 2),
        };

        fill_rect(&mut canvas, card, self.palette.background, CARD_ALPHA);
        draw_broken_border(&mut canvas, card, self.palette.accent, (width / 270).max(1));

        let padding = (card.w / 10).max(1);
        let inner_w = card.w.saturating_sub(padding * 2);
        let inner_h = card.h.saturating_sub(padding * 2);
        let text_h = inner_h * 3 / 4;
        let layout = TextLayout::fit(&self.words, inner_w, text_h);

        let mut top = card.y + padding as i64 + (text_h.saturating_sub(layout.height()) / 2) as i64;
        let mut drawn = 0;
        for line in &layout.lines {
            let mut x = card.x + padding as i64 + (inner_w.saturating_sub(line.width) / 2) as i64;
            for &index in &line.words {
                if drawn >= visible {
                    break;
                }
                draw_word(&mut canvas, self.words[index], x, top, layout.cell, self.palette.accent);
                x += (word_width(self.words[index], layout.cell) + layout.cell) as i64;
                drawn += 1;
            }
            top += (layout.cell * 2) as i64;
        }

        // Author bar: a short accent rule followed by the name at half size
        let author_cell = (layout.cell / 2).max(MIN_CELL);
        let bar_y = card.y + padding as i64 + text_h as i64 + (inner_h - text_h) as i64 / 3;
        let rule = Rect {
            x: card.x + padding as i64,
            y: bar_y + (author_cell / 3) as i64,
            w: author_cell * 3,
            h: (author_cell / 3).max(1),
        };
        fill_rect(&mut canvas, rule, self.palette.accent, 0.9);
        let mut x = rule.x + (rule.w + author_cell) as i64;
        for word in &self.author {
            draw_word(&mut canvas, word, x, bar_y, author_cell, self.palette.glow_on_card());
            x += (word_width(word, author_cell) + author_cell) as i64;
        }

        canvas
    }
}

impl Palette {
    fn glow_on_card(self) -> [u8; 3] {
        mix(self.accent, self.glow, 0.35)
    }
}

// == Layout ==
struct Line {
    words: Vec<usize>,
    width: u32,
}

struct TextLayout {
    cell: u32,
    lines: Vec<Line>,
}

fn word_width(word: &str, cell: u32) -> u32 {
    word.chars().count() as u32 * cell
}

impl TextLayout {
    /// Largest block size whose wrapped lines fit inside the box.
    fn fit(words: &[&str], max_width: u32, max_height: u32) -> Self {
        let mut cell = (max_width / 12).max(MIN_CELL);
        loop {
            let layout = Self::wrap(words, cell, max_width);
            if layout.fits(max_width, max_height) || cell <= MIN_CELL {
                return layout;
            }
            cell = (cell * 9 / 10).max(MIN_CELL);
        }
    }

    fn wrap(words: &[&str], cell: u32, max_width: u32) -> Self {
        let mut lines: Vec<Line> = Vec::new();
        for (index, word) in words.iter().enumerate() {
            let width = word_width(word, cell);
            match lines.last_mut() {
                Some(line) if line.width + cell + width <= max_width => {
                    line.width += cell + width;
                    line.words.push(index);
                }
                _ => lines.push(Line {
                    words: vec![index],
                    width,
                }),
            }
        }
        Self { cell, lines }
    }

    fn fits(&self, max_width: u32, max_height: u32) -> bool {
        self.height() <= max_height && self.lines.iter().all(|line| line.width <= max_width)
    }

    fn height(&self) -> u32 {
        (self.lines.len() as u32 * self.cell * 2).saturating_sub(self.cell)
    }
}

// == Drawing ==
#[derive(Debug, Clone, Copy)]
struct Rect {
    x: i64,
    y: i64,
    w: u32,
    h: u32,
}

fn mix(a: [u8; 3], b: [u8; 3], alpha: f32) -> [u8; 3] {
    let channel = |a: u8, b: u8| (a as f32 * (1.0 - alpha) + b as f32 * alpha).round() as u8;
    [channel(a[0], b[0]), channel(a[1], b[1]), channel(a[2], b[2])]
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 3], alpha: f32) {
    let [r, g, b] = mix([pixel[0], pixel[1], pixel[2]], color, alpha);
    *pixel = Rgba([r, g, b, 255]);
}

fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: [u8; 3], alpha: f32) {
    let (width, height) = canvas.dimensions();
    let x0 = rect.x.clamp(0, width as i64) as u32;
    let y0 = rect.y.clamp(0, height as i64) as u32;
    let x1 = (rect.x + rect.w as i64).clamp(0, width as i64) as u32;
    let y1 = (rect.y + rect.h as i64).clamp(0, height as i64) as u32;
    for y in y0..y1 {
        for x in x0..x1 {
            blend(canvas.get_pixel_mut(x, y), color, alpha);
        }
    }
}

/// Full sides, with the top and bottom edges broken in the middle third.
fn draw_broken_border(canvas: &mut RgbaImage, card: Rect, color: [u8; 3], thickness: u32) {
    let third = card.w / 3;
    let t = thickness as i64;
    for y in [card.y, card.y + card.h as i64 - t] {
        fill_rect(canvas, Rect { x: card.x, y, w: third, h: thickness }, color, 1.0);
        fill_rect(
            canvas,
            Rect { x: card.x + (card.w - third) as i64, y, w: third, h: thickness },
            color,
            1.0,
        );
    }
    for x in [card.x, card.x + card.w as i64 - t] {
        fill_rect(canvas, Rect { x, y: card.y, w: thickness, h: card.h }, color, 1.0);
    }
}

/// One block per character; tall letters get a full-height block.
fn draw_word(canvas: &mut RgbaImage, word: &str, x: i64, y: i64, cell: u32, color: [u8; 3]) {
    let gap = if cell >= 3 { (cell / 5).max(1) } else { 0 };
    for (i, ch) in word.chars().enumerate() {
        let tall = ch.is_uppercase() || ch.is_ascii_digit() || "bdfhklt'\"".contains(ch);
        let h = if tall { cell } else { (cell * 7 / 10).max(1) };
        let rect = Rect {
            x: x + (i as u32 * cell) as i64,
            y: y + (cell - h) as i64,
            w: cell - gap,
            h,
        };
        fill_rect(canvas, rect, color, 0.95);
    }
}

/// Cover-crops the photo to the target size, tints it with the palette
/// background and adds the glow toward the bottom edge.
fn backdrop(photo: &RgbaImage, palette: Palette, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = photo.dimensions();
    let scale = (width as f32 / sw as f32).max(height as f32 / sh as f32);
    let nw = ((sw as f32 * scale).ceil() as u32).max(width);
    let nh = ((sh as f32 * scale).ceil() as u32).max(height);
    let resized = imageops::resize(photo, nw, nh, FilterType::Triangle);
    let mut canvas =
        imageops::crop_imm(&resized, (nw - width) / 2, (nh - height) / 2, width, height).to_image();

    for (_, y, pixel) in canvas.enumerate_pixels_mut() {
        blend(pixel, palette.background, TINT_ALPHA);
        let depth = y as f32 / height.max(1) as f32;
        blend(pixel, palette.glow, depth * 0.35);
    }
    canvas
}

fn encode_gif(
    frames: impl Iterator<Item = RgbaImage>,
    frame_ms: u32,
) -> Result<Vec<u8>, ProducerError> {
    let render_error = |err: image::ImageError| ProducerError::Render(err.to_string());
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut out, 10);
        encoder.set_repeat(Repeat::Infinite).map_err(render_error)?;
        encoder
            .encode_frames(frames.map(|buffer| {
                Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(frame_ms, 1))
            }))
            .map_err(render_error)?;
    }
    Ok(out)
}
