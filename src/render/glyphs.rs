//! Built-in stroked digit face for ruler labels.
//!
//! Labels only ever contain digits and a minus sign, so a handful of
//! polylines is enough and keeps rendering independent of system fonts.
//! Glyphs are defined in a unit box: `u` grows rightwards, `v` grows
//! upwards from the baseline.

use resvg::tiny_skia::PathBuilder;

/// Horizontal pen advance per glyph, in ems
const ADVANCE: f32 = 0.6;
/// Drawn glyph width, in ems
const GLYPH_WIDTH: f32 = 0.45;
/// Height of digits above the baseline, in ems
const CAP_HEIGHT: f32 = 0.7;

type Polyline = &'static [(f32, f32)];

const TL: (f32, f32) = (0.0, 1.0);
const TR: (f32, f32) = (1.0, 1.0);
const ML: (f32, f32) = (0.0, 0.5);
const MR: (f32, f32) = (1.0, 0.5);
const BL: (f32, f32) = (0.0, 0.0);
const BR: (f32, f32) = (1.0, 0.0);

fn strokes(glyph: char) -> Option<&'static [Polyline]> {
    let lines: &'static [Polyline] = match glyph {
        '0' => &[&[TL, TR, BR, BL, TL], &[BL, TR]],
        '1' => &[&[(0.2, 0.8), (0.5, 1.0), (0.5, 0.0)], &[(0.2, 0.0), (0.8, 0.0)]],
        '2' => &[&[TL, TR, MR, ML, BL, BR]],
        '3' => &[&[TL, TR, BR, BL], &[ML, MR]],
        '4' => &[&[TL, ML, MR], &[TR, BR]],
        '5' => &[&[TR, TL, ML, MR, BR, BL]],
        '6' => &[&[TR, TL, BL, BR, MR, ML]],
        '7' => &[&[TL, TR, (0.4, 0.0)]],
        '8' => &[&[TL, TR, BR, BL, TL], &[ML, MR]],
        '9' => &[&[BL, BR, TR, TL, ML, MR]],
        '-' => &[&[(0.1, 0.5), (0.9, 0.5)]],
        _ => return None,
    };
    Some(lines)
}

/// Width of `text` set at `size`
#[must_use]
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * ADVANCE * size
}

/// Stroke width for labels set at `size`
#[must_use]
pub fn stroke_width(size: f32, bold: bool) -> f32 {
    size * if bold { 0.14 } else { 0.09 }
}

/// Append the outline of `text` with its left baseline at (`x`, `baseline`).
/// Unsupported characters advance the pen without drawing.
pub fn append_text(builder: &mut PathBuilder, text: &str, x: f32, baseline: f32, size: f32) {
    let mut pen = x;
    for glyph in text.chars() {
        if let Some(lines) = strokes(glyph) {
            for line in lines {
                let mut points = line.iter().map(|&(u, v)| {
                    (
                        pen + u * GLYPH_WIDTH * size,
                        baseline - v * CAP_HEIGHT * size,
                    )
                });
                if let Some((px, py)) = points.next() {
                    builder.move_to(px, py);
                    for (px, py) in points {
                        builder.line_to(px, py);
                    }
                }
            }
        }
        pen += ADVANCE * size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_character_has_strokes() {
        for glyph in "-0123456789".chars() {
            assert!(strokes(glyph).is_some(), "{glyph}");
        }
        assert!(strokes('x').is_none());
    }

    #[test]
    fn width_scales_with_length_and_size() {
        assert!((text_width("100", 10.0) - 18.0).abs() < 1e-4);
        assert_eq!(text_width("", 10.0), 0.0);
    }

    #[test]
    fn outline_stays_above_baseline_within_cap_height() {
        let mut builder = PathBuilder::new();
        append_text(&mut builder, "1280", 10.0, 50.0, 20.0);
        let path = builder.finish().unwrap();
        let bounds = path.bounds();
        assert!(bounds.left() >= 10.0);
        assert!(bounds.right() <= 10.0 + text_width("1280", 20.0));
        assert!(bounds.bottom() <= 50.0);
        assert!(bounds.top() >= 50.0 - CAP_HEIGHT * 20.0 - 1e-3);
    }

    #[test]
    fn unknown_characters_produce_no_path() {
        let mut builder = PathBuilder::new();
        append_text(&mut builder, "px", 0.0, 10.0, 12.0);
        assert!(builder.finish().is_none());
    }
}
