//! The output canvas frames are composed on.

use image::{imageops, Rgba, RgbaImage};

use crate::layout::Placement;

/// Background behind the chat surface, the dark slate of the surface
/// chrome.
pub const BACKGROUND: Rgba<u8> = Rgba([0x11, 0x1b, 0x21, 0xff]);

/// Fixed-size RGBA canvas every output frame is drawn onto.
///
/// One canvas lives for the whole export; each frame clears it and
/// draws the current snapshot, so no per-frame allocation of the output
/// buffer is needed.
#[derive(Debug, Clone)]
pub struct OutputCanvas {
    image: RgbaImage,
}

impl OutputCanvas {
    /// Canvas of the output geometry, cleared to the background.
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            image: RgbaImage::new(width, height),
        };
        canvas.fill(BACKGROUND);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Flood the whole canvas with one color.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    /// Scale the snapshot per the placement and draw it.
    ///
    /// Catmull-Rom keeps edges crisp when the supersampled surface is
    /// scaled back down.
    pub fn draw_snapshot(&mut self, snapshot: &RgbaImage, placement: &Placement) {
        let scaled = imageops::resize(
            snapshot,
            placement.width,
            placement.height,
            imageops::FilterType::CatmullRom,
        );
        imageops::overlay(&mut self.image, &scaled, placement.x, placement.y);
    }

    /// Raw RGBA bytes in row-major order, as the encoder expects them.
    pub fn frame_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The composed frame.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
