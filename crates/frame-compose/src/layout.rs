//! Snapshot placement math.
//!
//! The captured chat surface rarely matches the output geometry, so
//! every frame it is scaled (aspect preserved) into the area left after
//! padding and centered on both axes. The surface grows taller as
//! messages appear, which is why placement is recomputed per frame.

use chatreel_common::error::{ChatreelError, ChatreelResult};

/// Where and at what size a snapshot lands on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Uniform scale applied to the snapshot.
    pub scale: f64,

    /// Left edge on the canvas.
    pub x: i64,

    /// Top edge on the canvas.
    pub y: i64,

    /// Scaled width in pixels.
    pub width: u32,

    /// Scaled height in pixels.
    pub height: u32,
}

/// Reject padding fractions that leave no room for content.
///
/// Padding applies per side, so anything at or above 0.5 consumes the
/// whole axis.
pub fn validate_padding(padding_fraction: f64) -> ChatreelResult<()> {
    if !padding_fraction.is_finite() || !(0.0..0.5).contains(&padding_fraction) {
        return Err(ChatreelError::composition(format!(
            "padding fraction {padding_fraction} outside [0, 0.5)"
        )));
    }
    Ok(())
}

/// Compute where a snapshot of the given size lands on the canvas.
pub fn fit_snapshot(
    snapshot_width: u32,
    snapshot_height: u32,
    canvas_width: u32,
    canvas_height: u32,
    padding_fraction: f64,
) -> ChatreelResult<Placement> {
    validate_padding(padding_fraction)?;

    if canvas_width == 0 || canvas_height == 0 {
        return Err(ChatreelError::composition(format!(
            "output canvas has a zero dimension ({canvas_width}x{canvas_height})"
        )));
    }
    if snapshot_width == 0 || snapshot_height == 0 {
        return Err(ChatreelError::capture(format!(
            "surface snapshot has a zero dimension ({snapshot_width}x{snapshot_height})"
        )));
    }

    let pad_x = canvas_width as f64 * padding_fraction;
    let pad_y = canvas_height as f64 * padding_fraction;
    let avail_w = canvas_width as f64 - 2.0 * pad_x;
    let avail_h = canvas_height as f64 - 2.0 * pad_y;

    let scale = (avail_w / snapshot_width as f64).min(avail_h / snapshot_height as f64);
    let scaled_w = snapshot_width as f64 * scale;
    let scaled_h = snapshot_height as f64 * scale;

    // Centering inside the padded area equals centering on the whole
    // canvas because padding is symmetric.
    let x = (pad_x + (avail_w - scaled_w) / 2.0).round() as i64;
    let y = (pad_y + (avail_h - scaled_h) / 2.0).round() as i64;

    Ok(Placement {
        scale,
        x,
        y,
        width: (scaled_w.round() as u32).max(1),
        height: (scaled_h.round() as u32).max(1),
    })
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn geometry() -> impl Strategy<Value = (u32, u32, u32, u32, f64)> {
        (
            1u32..4096,
            1u32..4096,
            64u32..4096,
            64u32..4096,
            0.0f64..0.45,
        )
    }

    proptest! {
        #[test]
        fn scale_matches_the_binding_axis(
            (sw, sh, cw, ch, padding) in geometry()
        ) {
            let placement = fit_snapshot(sw, sh, cw, ch, padding).unwrap();

            let avail_w = cw as f64 * (1.0 - 2.0 * padding);
            let avail_h = ch as f64 * (1.0 - 2.0 * padding);
            let expected = (avail_w / sw as f64).min(avail_h / sh as f64);

            prop_assert!((placement.scale - expected).abs() < 1e-9);
        }

        #[test]
        fn scaled_snapshot_fits_in_the_padded_area(
            (sw, sh, cw, ch, padding) in geometry()
        ) {
            let placement = fit_snapshot(sw, sh, cw, ch, padding).unwrap();

            let pad_x = cw as f64 * padding;
            let pad_y = ch as f64 * padding;

            // 2px slack for rounding of both the offset and the size
            prop_assert!(placement.x as f64 >= pad_x - 2.0);
            prop_assert!(placement.y as f64 >= pad_y - 2.0);
            prop_assert!(placement.x as f64 + placement.width as f64 <= cw as f64 - pad_x + 2.0);
            prop_assert!(placement.y as f64 + placement.height as f64 <= ch as f64 - pad_y + 2.0);
        }

        #[test]
        fn placement_is_centered(
            (sw, sh, cw, ch, padding) in geometry()
        ) {
            let placement = fit_snapshot(sw, sh, cw, ch, padding).unwrap();

            let left = placement.x as f64;
            let right = cw as f64 - (placement.x as f64 + placement.width as f64);
            let top = placement.y as f64;
            let bottom = ch as f64 - (placement.y as f64 + placement.height as f64);

            prop_assert!((left - right).abs() <= 2.0);
            prop_assert!((top - bottom).abs() <= 2.0);
        }
    }
}
