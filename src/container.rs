//! Headless model of the ruler markup: the boxes holding the two surfaces,
//! the unit-label corner and the wrapper's visibility

use serde::Serialize;

use crate::config::RulerType;
use crate::geometry::{Axis, ScrollOffset, SurfaceGeometry};
use crate::style::{RulerColor, RulerStyle};

/// A box holding one ruler surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulerBox {
    pub width: f32,
    pub height: f32,
    /// `left` of the horizontal box, `top` of the vertical one
    pub offset: f32,
    /// translateX of the horizontal box, translateY of the vertical one
    pub translate: f32,
}

/// The square in the corner where the two rulers meet
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCorner {
    pub text: String,
    pub background_color: RulerColor,
    pub font_color: RulerColor,
    pub font_size: f32,
    pub border_color: RulerColor,
    pub size: f32,
}

impl UnitCorner {
    fn from_style(style: &RulerStyle) -> Self {
        Self {
            text: style.unit.text.clone(),
            background_color: style.unit.background_color,
            font_color: style.unit.font_color,
            font_size: style.unit.font_size,
            border_color: style.tick_color,
            size: style.size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub ruler_id: String,
    pub horizontal: Option<RulerBox>,
    pub vertical: Option<RulerBox>,
    pub unit: Option<UnitCorner>,
    pub visible: bool,
    pub mounted: bool,
}

impl Container {
    /// Produce the markup for a ruler. Single rulers only get the box for
    /// their direction and no unit corner.
    #[must_use]
    pub fn render(
        ruler_id: &str,
        kind: RulerType,
        direction: Axis,
        style: &RulerStyle,
        surfaces: &SurfaceGeometry,
    ) -> Self {
        let wrapped = kind == RulerType::Wrapped;
        let mut container = Self {
            ruler_id: ruler_id.to_string(),
            horizontal: None,
            vertical: None,
            unit: wrapped.then(|| UnitCorner::from_style(style)),
            visible: style.show,
            mounted: true,
        };
        let offset = if wrapped { style.size } else { 0.0 };
        if wrapped || direction == Axis::Horizontal {
            container.horizontal = Some(RulerBox {
                width: surfaces.horizontal.width,
                height: surfaces.horizontal.height,
                offset,
                translate: 0.0,
            });
        }
        if wrapped || direction == Axis::Vertical {
            container.vertical = Some(RulerBox {
                width: surfaces.vertical.width,
                height: surfaces.vertical.height,
                offset,
                translate: 0.0,
            });
        }
        container
    }

    /// Element id of one part of the markup, e.g. `canvas-ruler-x<id>`
    #[must_use]
    pub fn element_id(&self, part: &str) -> String {
        format!("canvas-ruler-{part}{}", self.ruler_id)
    }

    #[must_use]
    pub fn ruler_box(&self, axis: Axis) -> Option<&RulerBox> {
        match axis {
            Axis::Horizontal => self.horizontal.as_ref(),
            Axis::Vertical => self.vertical.as_ref(),
        }
    }

    /// Move the boxes opposite to the scroll position
    pub fn translate(&mut self, scroll: ScrollOffset) {
        if let Some(b) = self.horizontal.as_mut() {
            b.translate = -scroll.scroll_left;
        }
        if let Some(b) = self.vertical.as_mut() {
            b.translate = -scroll.scroll_top;
        }
    }

    pub fn reset_translate(&mut self) {
        self.translate(ScrollOffset::default());
    }

    /// Resize the boxes for new surfaces and track thickness
    pub fn resize(&mut self, surfaces: &SurfaceGeometry, track: f32) {
        let wrapped = self.unit.is_some();
        let offset = if wrapped { track } else { 0.0 };
        if let Some(b) = self.horizontal.as_mut() {
            b.width = surfaces.horizontal.width;
            b.height = track;
            b.offset = offset;
        }
        if let Some(b) = self.vertical.as_mut() {
            b.width = track;
            b.height = surfaces.vertical.height;
            b.offset = offset;
        }
        if let Some(unit) = self.unit.as_mut() {
            unit.size = track;
        }
    }

    pub fn update_unit(&mut self, style: &RulerStyle) {
        if let Some(unit) = self.unit.as_mut() {
            *unit = UnitCorner::from_style(style);
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Remove the markup from the host
    pub fn unmount(&mut self) {
        self.horizontal = None;
        self.vertical = None;
        self.unit = None;
        self.visible = false;
        self.mounted = false;
    }
}
