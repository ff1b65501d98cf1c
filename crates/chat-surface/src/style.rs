//! Palette and layout metrics of the rendered surface.

use image::Rgba;

/// Deep chat background behind the message list.
pub const SURFACE_BG: Rgba<u8> = Rgba([0x0b, 0x14, 0x1a, 0xff]);
/// Header, incoming bubbles, and the input bar.
pub const CHROME_BG: Rgba<u8> = Rgba([0x20, 0x2c, 0x33, 0xff]);
/// Outgoing bubbles and the send button.
pub const OWN_BUBBLE_BG: Rgba<u8> = Rgba([0x00, 0x5c, 0x4b, 0xff]);
/// Bars standing in for primary text.
pub const TEXT_PRIMARY: Rgba<u8> = Rgba([0xe9, 0xed, 0xef, 0xff]);
/// Bars standing in for secondary text, timestamps, and sent ticks.
pub const TEXT_MUTED: Rgba<u8> = Rgba([0x86, 0x96, 0xa0, 0xff]);
/// Ticks on messages the contact has read.
pub const TICK_READ: Rgba<u8> = Rgba([0x53, 0xbd, 0xeb, 0xff]);
/// The message input pill and image placeholders.
pub const INPUT_PILL_BG: Rgba<u8> = Rgba([0x2a, 0x39, 0x42, 0xff]);
/// Avatar fill.
pub const AVATAR_BG: Rgba<u8> = Rgba([0x6b, 0x7c, 0x85, 0xff]);

// Layout metrics in device-independent units.
pub(crate) const STATUS_STRIP_H: u32 = 24;
pub(crate) const HEADER_H: u32 = 56;
pub(crate) const INPUT_BAR_H: u32 = 48;
pub(crate) const WATERMARK_H: u32 = 20;
pub(crate) const SIDE_PAD: u32 = 16;
pub(crate) const MESSAGES_PAD_V: u32 = 8;
pub(crate) const MESSAGE_GAP: u32 = 8;
pub(crate) const BUBBLE_PAD_X: u32 = 10;
pub(crate) const BUBBLE_PAD_Y: u32 = 8;
pub(crate) const BUBBLE_RADIUS: u32 = 8;
pub(crate) const CHAR_W: u32 = 7;
pub(crate) const LINE_H: u32 = 10;
pub(crate) const LINE_GAP: u32 = 4;
pub(crate) const META_CHAR_W: u32 = 5;
pub(crate) const META_H: u32 = 8;
pub(crate) const META_GAP: u32 = 4;
pub(crate) const TICK_SIZE: u32 = 7;
pub(crate) const TICK_OVERLAP: u32 = 3;
pub(crate) const IMAGE_W: u32 = 160;
pub(crate) const IMAGE_H: u32 = 120;
pub(crate) const IMAGE_GAP: u32 = 6;

/// How the surface is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStyle {
    /// Width in device-independent units.
    pub logical_width: u32,
    /// Every logical unit becomes this many pixels. Rendering larger
    /// than the final placement keeps the blockout crisp after the
    /// canvas downscale.
    pub scale_factor: u32,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            logical_width: 480,
            scale_factor: 2,
        }
    }
}

impl SurfaceStyle {
    /// Widest a bubble may grow.
    pub(crate) fn max_bubble_width(&self) -> u32 {
        self.logical_width * 3 / 4
    }

    /// How many characters fit on one wrapped line.
    pub(crate) fn chars_per_line(&self) -> u32 {
        (self.max_bubble_width().saturating_sub(2 * BUBBLE_PAD_X) / CHAR_W).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = SurfaceStyle::default();
        assert_eq!(style.logical_width, 480);
        assert_eq!(style.scale_factor, 2);
        assert_eq!(style.max_bubble_width(), 360);
        assert_eq!(style.chars_per_line(), 48);
    }

    #[test]
    fn test_chars_per_line_never_zero() {
        let style = SurfaceStyle {
            logical_width: 10,
            scale_factor: 1,
        };
        assert!(style.chars_per_line() >= 1);
    }
}
