//! Tick layout: turns a visible length, a style and a scroll offset into
//! drawing commands. Pure; painting happens in [`super::paint`].

use resvg::tiny_skia::{Point, Transform};

use super::glyphs;
use crate::consts::OVERSAMPLE;
use crate::geometry::{Axis, Size};
use crate::style::{LabelMode, RulerColor, RulerStyle};

/// Half-pixel nudge so 1px strokes land on pixel centers
const CRISP_OFFSET: f32 = 0.5;

/// Visual length class of a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickTier {
    Major,
    Half,
    Minor,
}

impl TickTier {
    /// Tier of the tick at absolute index `index`
    #[must_use]
    pub fn of(index: i64, gap: f32) -> Self {
        let index = index as f64;
        let gap = f64::from(gap);
        if index % gap == 0.0 {
            TickTier::Major
        } else if index % (gap / 2.0) == 0.0 {
            TickTier::Half
        } else {
            TickTier::Minor
        }
    }

    /// Coordinate (across the track) where a tick of this tier ends; ticks
    /// start at the track edge `track`
    #[must_use]
    pub fn end(self, mode: LabelMode, track: f32) -> f32 {
        let divisor = match (mode, self) {
            (LabelMode::Center, TickTier::Major) => 2.0,
            (LabelMode::Center, TickTier::Half) => 1.5,
            (LabelMode::Center, TickTier::Minor) => 1.2,
            (LabelMode::Edge, TickTier::Major) => return 0.0,
            (LabelMode::Edge, TickTier::Half) => 2.0,
            (LabelMode::Edge, TickTier::Minor) => 1.5,
        };
        (track / divisor).round()
    }
}

/// Range of tick indices covered by one redraw.
///
/// Indices are relative to the first tick at or after the window start:
/// relative index 0 sits `origin * gap - offset` pixels into the window, and
/// the range starts at `-origin`, the content origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickWindow {
    pub start: i64,
    pub end: i64,
    pub origin: i64,
}

impl TickWindow {
    #[must_use]
    pub fn new(length: f32, gap: f32, offset: f32) -> Self {
        let origin = (offset / gap).ceil() as i64;
        Self {
            start: -origin,
            end: (length / gap).ceil() as i64,
            origin,
        }
    }

    /// Absolute content index of relative index `relative`
    #[must_use]
    pub fn absolute(&self, relative: i64) -> i64 {
        relative + self.origin
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.end - self.start).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One tick segment in content coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub index: i64,
    pub tier: TickTier,
    pub from: Point,
    pub to: Point,
}

/// A text run, anchored at its left baseline, in content coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub index: i64,
    pub value: i64,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Everything needed to paint one ruler surface
#[derive(Clone, Debug)]
pub struct DrawList {
    pub axis: Axis,
    pub background: RulerColor,
    /// Content → device transform (scroll translation, then pixel ratio)
    pub transform: Transform,
    pub tick_color: RulerColor,
    pub line_width: f32,
    pub ticks: Vec<Tick>,
    pub font_color: RulerColor,
    pub font_size: f32,
    pub bold: bool,
    pub labels: Vec<Label>,
    pub window: TickWindow,
}

impl DrawList {
    pub fn labels_at(&self, index: i64) -> impl Iterator<Item = &Label> {
        self.labels.iter().filter(move |l| l.index == index)
    }
}

/// Label value shown at absolute tick index `index`
#[must_use]
pub fn label_value(index: i64, style: &RulerStyle) -> i64 {
    (index as f64 / f64::from(style.scale) * f64::from(style.gap)).round() as i64
}

/// Longest distance a label can reach past its tick along `axis`, for the
/// widest value inside `window`
fn label_extent(
    axis: Axis,
    style: &RulerStyle,
    window: &TickWindow,
    track: f32,
    font_size: f32,
) -> f32 {
    let widest = [window.start, window.end]
        .into_iter()
        .map(|relative| label_value(window.absolute(relative), style).to_string())
        .max_by_key(String::len)
        .unwrap_or_default();
    match axis {
        Axis::Horizontal => glyphs::text_width(&widest, font_size) + track * 0.2,
        Axis::Vertical => widest.chars().count() as f32 * font_size + track,
    }
}

/// Lay out one ruler.
///
/// `surface` is the logical surface size, `offset` the scroll offset along
/// `axis`. Bounded rulers ignore the offset: their container is moved
/// instead of redrawing.
#[must_use]
pub fn layout(
    axis: Axis,
    surface: Size,
    style: &RulerStyle,
    offset: f32,
    infinite: bool,
    pixel_ratio: f32,
) -> DrawList {
    debug_assert!(style.gap > 0.0, "gap must be positive");

    let offset = if infinite { offset } else { 0.0 };
    let length = surface.along(axis);
    let track = surface.across(axis);
    let gap = style.gap;
    let ratio = pixel_ratio * OVERSAMPLE;

    let transform = match axis {
        Axis::Horizontal => Transform::from_translate(CRISP_OFFSET - offset * ratio, CRISP_OFFSET),
        Axis::Vertical => Transform::from_translate(CRISP_OFFSET, CRISP_OFFSET - offset * ratio),
    }
    .pre_scale(ratio, ratio);

    let window = TickWindow::new(length, gap, offset);
    let font_size = style.label_size(track);
    let centered = style.mode == LabelMode::Center;

    // Ticks left of the window cannot show anything but label tails
    let bleed = label_extent(axis, style, &window, track, font_size);
    let first_visible = ((offset - bleed) / gap).floor() as i64 - window.origin;
    let first = window.start.max(first_visible);

    let mut ticks = Vec::with_capacity(usize::try_from(window.end - first).unwrap_or(0));
    let mut labels = Vec::new();

    for relative in first..window.end {
        let index = window.absolute(relative);
        let position = index as f32 * gap;
        let tier = TickTier::of(index, gap);
        let end = tier.end(style.mode, track);

        let (from, to) = match axis {
            Axis::Horizontal => (
                Point::from_xy(position, track),
                Point::from_xy(position, end),
            ),
            Axis::Vertical => (
                Point::from_xy(track, position),
                Point::from_xy(end, position),
            ),
        };
        ticks.push(Tick {
            index,
            tier,
            from,
            to,
        });

        if tier != TickTier::Major {
            continue;
        }
        let value = label_value(index, style);
        if value == 0 && centered {
            continue;
        }
        let text = value.to_string();

        match axis {
            Axis::Horizontal => {
                let x = if centered {
                    position - glyphs::text_width(&text, font_size) * 0.5
                } else {
                    position + track * 0.2
                };
                labels.push(Label {
                    index,
                    value,
                    text,
                    x,
                    y: track * 0.5,
                });
            }
            Axis::Vertical => {
                // One glyph per line, reading downwards
                let base = if centered {
                    position - track * 0.5
                } else {
                    position + track * 0.7
                };
                for (line, glyph) in text.chars().enumerate() {
                    labels.push(Label {
                        index,
                        value,
                        text: glyph.to_string(),
                        x: track * 0.1,
                        y: base + line as f32 * font_size,
                    });
                }
            }
        }
    }

    DrawList {
        axis,
        background: style.background_color,
        transform,
        tick_color: style.tick_color,
        line_width: 1.0,
        ticks,
        font_color: style.font_color,
        font_size,
        bold: style.is_bold(),
        labels,
        window,
    }
}
