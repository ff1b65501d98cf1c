//! Pixel-painting primitives, clipped to the target image.

use image::{Rgba, RgbaImage};

pub(crate) fn fill_rect(
    image: &mut RgbaImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    color: Rgba<u8>,
) {
    let (iw, ih) = (image.width() as i64, image.height() as i64);
    for py in y.max(0)..(y + height as i64).min(ih) {
        for px in x.max(0)..(x + width as i64).min(iw) {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

pub(crate) fn fill_rounded_rect(
    image: &mut RgbaImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    radius: u32,
    color: Rgba<u8>,
) {
    let w = width as i64;
    let h = height as i64;
    let r = (radius as i64).min(w / 2).min(h / 2);
    let (iw, ih) = (image.width() as i64, image.height() as i64);

    for py in 0..h {
        for px in 0..w {
            // corner pixels only survive inside their quarter circle
            let corner = if px < r && py < r {
                Some((r - 1, r - 1))
            } else if px >= w - r && py < r {
                Some((w - r, r - 1))
            } else if px < r && py >= h - r {
                Some((r - 1, h - r))
            } else if px >= w - r && py >= h - r {
                Some((w - r, h - r))
            } else {
                None
            };
            if let Some((cx, cy)) = corner {
                let (dx, dy) = (px - cx, py - cy);
                if dx * dx + dy * dy > r * r {
                    continue;
                }
            }

            let (gx, gy) = (x + px, y + py);
            if gx >= 0 && gy >= 0 && gx < iw && gy < ih {
                image.put_pixel(gx as u32, gy as u32, color);
            }
        }
    }
}

pub(crate) fn fill_circle(image: &mut RgbaImage, cx: i64, cy: i64, radius: u32, color: Rgba<u8>) {
    let r = radius as i64;
    let (iw, ih) = (image.width() as i64, image.height() as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (gx, gy) = (cx + dx, cy + dy);
            if gx >= 0 && gy >= 0 && gx < iw && gy < ih {
                image.put_pixel(gx as u32, gy as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_fill_rect_clips_to_image() {
        let mut image = RgbaImage::from_pixel(10, 10, BLACK);
        fill_rect(&mut image, -5, -5, 8, 8, WHITE);
        assert_eq!(*image.get_pixel(0, 0), WHITE);
        assert_eq!(*image.get_pixel(2, 2), WHITE);
        assert_eq!(*image.get_pixel(3, 3), BLACK);
    }

    #[test]
    fn test_rounded_rect_skips_corners() {
        let mut image = RgbaImage::from_pixel(40, 40, BLACK);
        fill_rounded_rect(&mut image, 0, 0, 40, 40, 10, WHITE);
        assert_eq!(*image.get_pixel(0, 0), BLACK);
        assert_eq!(*image.get_pixel(39, 0), BLACK);
        assert_eq!(*image.get_pixel(20, 20), WHITE);
        assert_eq!(*image.get_pixel(20, 0), WHITE);
    }

    #[test]
    fn test_circle_is_centered() {
        let mut image = RgbaImage::from_pixel(21, 21, BLACK);
        fill_circle(&mut image, 10, 10, 5, WHITE);
        assert_eq!(*image.get_pixel(10, 10), WHITE);
        assert_eq!(*image.get_pixel(10, 5), WHITE);
        assert_eq!(*image.get_pixel(0, 0), BLACK);
    }
}
