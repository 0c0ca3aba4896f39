//! Rasterizes a [`DrawList`] onto a pixmap

use resvg::tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke};

use super::glyphs;
use super::tick::DrawList;
use crate::style::RulerColor;

fn solid(color: RulerColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

/// Paint one ruler. The whole pixmap is overwritten.
pub fn paint(pixmap: &mut Pixmap, list: &DrawList) {
    pixmap.fill(list.background.to_skia());

    let mut ticks = PathBuilder::new();
    for tick in &list.ticks {
        ticks.move_to(tick.from.x, tick.from.y);
        ticks.line_to(tick.to.x, tick.to.y);
    }
    if let Some(path) = ticks.finish() {
        let stroke = Stroke {
            width: list.line_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid(list.tick_color), &stroke, list.transform, None);
    }

    let mut labels = PathBuilder::new();
    for label in &list.labels {
        glyphs::append_text(&mut labels, &label.text, label.x, label.y, list.font_size);
    }
    if let Some(path) = labels.finish() {
        let stroke = Stroke {
            width: glyphs::stroke_width(list.font_size, list.bold),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid(list.font_color), &stroke, list.transform, None);
    }
}
