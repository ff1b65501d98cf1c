//! The scripted conversation rendered as pixels.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};

use chatreel_common::error::{ChatreelError, ChatreelResult};
use chatreel_export_engine::RasterSource;
use chatreel_script_model::conversation::{Conversation, Message, MessageStatus, Sender};
use chatreel_script_model::playback::Playback;

use crate::draw;
use crate::style::{
    SurfaceStyle, AVATAR_BG, BUBBLE_PAD_X, BUBBLE_PAD_Y, BUBBLE_RADIUS, CHAR_W, CHROME_BG,
    HEADER_H, IMAGE_GAP, IMAGE_H, IMAGE_W, INPUT_BAR_H, INPUT_PILL_BG, LINE_GAP, LINE_H,
    MESSAGES_PAD_V, MESSAGE_GAP, META_CHAR_W, META_GAP, META_H, OWN_BUBBLE_BG, SIDE_PAD,
    STATUS_STRIP_H, SURFACE_BG, TEXT_MUTED, TEXT_PRIMARY, TICK_OVERLAP, TICK_READ, TICK_SIZE,
    WATERMARK_H,
};

/// Upper bound on either rendered dimension, in pixels.
const MAX_SURFACE_PX: u32 = 16_384;

/// A conversation plus a playback position, renderable at any moment.
///
/// Rendering is a blockout: bars sized from character counts stand in
/// for text, so output depends only on the conversation data, the
/// number of revealed messages, and the style. No fonts, no system
/// state, no randomness.
pub struct ChatSurface {
    conversation: Conversation,
    playback: Playback,
    style: SurfaceStyle,
}

/// Precomputed geometry of one message bubble.
struct BubbleLayout {
    width: u32,
    height: u32,
    line_widths: Vec<u32>,
    meta_width: u32,
    has_image: bool,
}

impl ChatSurface {
    pub fn new(conversation: Conversation, playback: Playback) -> Self {
        Self::with_style(conversation, playback, SurfaceStyle::default())
    }

    pub fn with_style(conversation: Conversation, playback: Playback, style: SurfaceStyle) -> Self {
        Self {
            conversation,
            playback,
            style,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn style(&self) -> SurfaceStyle {
        self.style
    }

    /// Render the surface at the current playback position.
    ///
    /// The height depends on how many messages are revealed; the
    /// caller re-fits the result every frame.
    pub fn render(&self) -> ChatreelResult<RgbaImage> {
        if self.style.logical_width == 0 || self.style.scale_factor == 0 {
            return Err(ChatreelError::capture(
                "Surface style has a zero logical width or scale factor",
            ));
        }

        let shown = self.playback.shown().min(self.conversation.messages.len());
        let visible = &self.conversation.messages[..shown];
        let bubbles: Vec<BubbleLayout> = visible.iter().map(|m| self.layout_bubble(m)).collect();

        let mut messages_h = 2 * MESSAGES_PAD_V + bubbles.iter().map(|b| b.height).sum::<u32>();
        if bubbles.len() > 1 {
            messages_h += (bubbles.len() as u32 - 1) * MESSAGE_GAP;
        }

        let mut logical_height = STATUS_STRIP_H + HEADER_H + messages_h + INPUT_BAR_H;
        if self.conversation.show_watermark {
            logical_height += WATERMARK_H;
        }

        let scale = self.style.scale_factor;
        let width_px = self.style.logical_width.saturating_mul(scale);
        let height_px = logical_height.saturating_mul(scale);
        if width_px > MAX_SURFACE_PX || height_px > MAX_SURFACE_PX {
            return Err(ChatreelError::capture(format!(
                "Surface of {width_px}x{height_px} px exceeds the {MAX_SURFACE_PX} px limit"
            )));
        }

        let mut image = RgbaImage::from_pixel(width_px, height_px, SURFACE_BG);
        let mut painter = Painter {
            image: &mut image,
            scale,
        };

        self.paint_status_strip(&mut painter);
        self.paint_header(&mut painter);

        let mut y = STATUS_STRIP_H + HEADER_H + MESSAGES_PAD_V;
        for (message, bubble) in visible.iter().zip(&bubbles) {
            self.paint_bubble(&mut painter, message, bubble, y);
            y += bubble.height + MESSAGE_GAP;
        }

        let input_y = STATUS_STRIP_H + HEADER_H + messages_h;
        self.paint_input_bar(&mut painter, input_y);
        if self.conversation.show_watermark {
            self.paint_watermark(&mut painter, input_y + INPUT_BAR_H);
        }

        tracing::trace!(shown, width_px, height_px, "Rendered chat surface");
        Ok(image)
    }

    fn layout_bubble(&self, message: &Message) -> BubbleLayout {
        let cpl = self.style.chars_per_line();
        let mut remaining = message.text.chars().count() as u32;

        let mut line_widths = Vec::new();
        while remaining > 0 {
            let take = remaining.min(cpl);
            line_widths.push(take * CHAR_W);
            remaining -= take;
        }

        let mut meta_width = message.timestamp.chars().count() as u32 * META_CHAR_W;
        if message.sender == Sender::Own {
            meta_width += META_GAP + tick_cluster_width(message.status);
        }

        let has_image = message.image.is_some();
        let inner_max = self.style.max_bubble_width().saturating_sub(2 * BUBBLE_PAD_X);
        let image_width = if has_image { IMAGE_W.min(inner_max) } else { 0 };

        let content_width = line_widths
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(meta_width)
            .max(image_width);
        let width = (content_width + 2 * BUBBLE_PAD_X).min(self.style.max_bubble_width());

        let lines = line_widths.len() as u32;
        let mut height = 2 * BUBBLE_PAD_Y + META_GAP + META_H;
        if has_image {
            height += IMAGE_H + IMAGE_GAP;
        }
        if lines > 0 {
            height += lines * LINE_H + (lines - 1) * LINE_GAP;
        }

        BubbleLayout {
            width,
            height,
            line_widths,
            meta_width,
            has_image,
        }
    }

    fn paint_status_strip(&self, p: &mut Painter<'_>) {
        // clock on the left, signal cluster on the right
        p.rect(SIDE_PAD, 7, 40, 10, TEXT_PRIMARY);
        let mut x = self.style.logical_width.saturating_sub(SIDE_PAD + 12);
        for _ in 0..3 {
            p.rect(x, 7, 12, 10, TEXT_PRIMARY);
            x = x.saturating_sub(16);
        }
    }

    fn paint_header(&self, p: &mut Painter<'_>) {
        p.rect(0, STATUS_STRIP_H, self.style.logical_width, HEADER_H, CHROME_BG);

        let contact = &self.conversation.contact;
        let avatar_color = if contact.avatar.is_some() {
            AVATAR_BG
        } else {
            INPUT_PILL_BG
        };
        p.circle(SIDE_PAD + 18, STATUS_STRIP_H + HEADER_H / 2, 18, avatar_color);

        let text_x = SIDE_PAD + 36 + 12;
        let name_width = (contact.name.chars().count() as u32 * 8).clamp(8, 180);
        match &contact.status {
            Some(status) => {
                p.rect(text_x, STATUS_STRIP_H + 16, name_width, 12, TEXT_PRIMARY);
                let status_width = (status.chars().count() as u32 * 6).clamp(6, 120);
                p.rect(text_x, STATUS_STRIP_H + 34, status_width, META_H, TEXT_MUTED);
            }
            None => {
                p.rect(text_x, STATUS_STRIP_H + 22, name_width, 12, TEXT_PRIMARY);
            }
        }
    }

    fn paint_bubble(&self, p: &mut Painter<'_>, message: &Message, bubble: &BubbleLayout, y: u32) {
        let own = message.sender == Sender::Own;
        let x = if own {
            self.style
                .logical_width
                .saturating_sub(SIDE_PAD + bubble.width)
        } else {
            SIDE_PAD
        };
        let bg = if own { OWN_BUBBLE_BG } else { CHROME_BG };
        p.rounded_rect(x, y, bubble.width, bubble.height, BUBBLE_RADIUS, bg);

        let mut cursor = y + BUBBLE_PAD_Y;
        if bubble.has_image {
            let inner = bubble.width.saturating_sub(2 * BUBBLE_PAD_X);
            p.rounded_rect(
                x + BUBBLE_PAD_X,
                cursor,
                inner.min(IMAGE_W),
                IMAGE_H,
                4,
                INPUT_PILL_BG,
            );
            cursor += IMAGE_H + IMAGE_GAP;
        }
        for line_width in &bubble.line_widths {
            p.rect(x + BUBBLE_PAD_X, cursor, *line_width, LINE_H, TEXT_PRIMARY);
            cursor += LINE_H + LINE_GAP;
        }

        // timestamp and ticks, right-aligned on the bottom row
        let meta_y = y + bubble.height - BUBBLE_PAD_Y - META_H;
        let meta_x = x + bubble.width - BUBBLE_PAD_X - bubble.meta_width;
        let ts_width = message.timestamp.chars().count() as u32 * META_CHAR_W;
        p.rect(meta_x, meta_y, ts_width, META_H, TEXT_MUTED);
        if own {
            paint_ticks(p, meta_x + ts_width + META_GAP, meta_y, message.status);
        }
    }

    fn paint_input_bar(&self, p: &mut Painter<'_>, y: u32) {
        let width = self.style.logical_width;
        p.rect(0, y, width, INPUT_BAR_H, CHROME_BG);

        let pill_width = width.saturating_sub(2 * SIDE_PAD + 40);
        p.rounded_rect(SIDE_PAD, y + 8, pill_width, 32, 16, INPUT_PILL_BG);
        p.rect(SIDE_PAD + 14, y + 20, (pill_width / 3).max(8), META_H, TEXT_MUTED);
        p.circle(
            width.saturating_sub(SIDE_PAD + 16),
            y + INPUT_BAR_H / 2,
            16,
            OWN_BUBBLE_BG,
        );
    }

    fn paint_watermark(&self, p: &mut Painter<'_>, y: u32) {
        let bar_width = 120u32.min(self.style.logical_width);
        let x = (self.style.logical_width - bar_width) / 2;
        p.rect(x, y + (WATERMARK_H - META_H) / 2, bar_width, META_H, TEXT_MUTED);
    }
}

#[async_trait]
impl RasterSource for ChatSurface {
    async fn capture(&mut self) -> ChatreelResult<RgbaImage> {
        self.render()
    }
}

fn tick_cluster_width(status: MessageStatus) -> u32 {
    match status {
        MessageStatus::Sent => TICK_SIZE,
        MessageStatus::Delivered | MessageStatus::Read => TICK_SIZE + TICK_OVERLAP,
    }
}

fn paint_ticks(p: &mut Painter<'_>, x: u32, y: u32, status: MessageStatus) {
    match status {
        MessageStatus::Sent => p.rect(x, y, TICK_SIZE, TICK_SIZE, TEXT_MUTED),
        MessageStatus::Delivered => double_tick(p, x, y, TEXT_MUTED),
        MessageStatus::Read => double_tick(p, x, y, TICK_READ),
    }
}

fn double_tick(p: &mut Painter<'_>, x: u32, y: u32, color: Rgba<u8>) {
    p.rect(x, y, TICK_SIZE, TICK_SIZE, color);
    p.rect(x + TICK_OVERLAP, y, TICK_SIZE, TICK_SIZE, color);
}

/// Paints in logical units, scaling to pixels on the way out.
struct Painter<'a> {
    image: &'a mut RgbaImage,
    scale: u32,
}

impl Painter<'_> {
    fn rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
        draw::fill_rect(
            self.image,
            (x * self.scale) as i64,
            (y * self.scale) as i64,
            width * self.scale,
            height * self.scale,
            color,
        );
    }

    fn rounded_rect(&mut self, x: u32, y: u32, width: u32, height: u32, radius: u32, color: Rgba<u8>) {
        draw::fill_rounded_rect(
            self.image,
            (x * self.scale) as i64,
            (y * self.scale) as i64,
            width * self.scale,
            height * self.scale,
            radius * self.scale,
            color,
        );
    }

    fn circle(&mut self, cx: u32, cy: u32, radius: u32, color: Rgba<u8>) {
        draw::fill_circle(
            self.image,
            (cx * self.scale) as i64,
            (cy * self.scale) as i64,
            radius * self.scale,
            color,
        );
    }
}
