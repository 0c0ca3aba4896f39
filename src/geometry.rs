//! Content geometry, scroll offsets and render-mode selection

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_RATIO, OVER_SIZE};

/// A ruler axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

/// Logical (CSS pixel) size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when `other` fits inside `self`
    #[must_use]
    pub fn contains(&self, other: Size) -> bool {
        other.width <= self.width && other.height <= self.height
    }

    /// Extent along the ruler's running direction
    #[must_use]
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Extent across the ruler (the track thickness)
    #[must_use]
    pub fn across(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.height,
            Axis::Vertical => self.width,
        }
    }
}

/// Current scroll position of the watched element
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOffset {
    pub scroll_left: f32,
    pub scroll_top: f32,
}

impl ScrollOffset {
    #[must_use]
    pub const fn new(scroll_left: f32, scroll_top: f32) -> Self {
        Self {
            scroll_left,
            scroll_top,
        }
    }

    #[must_use]
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.scroll_left,
            Axis::Vertical => self.scroll_top,
        }
    }
}

/// Requested rendering strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePreference {
    /// Pick bounded/infinite from the content size, prefer the worker for
    /// infinite content when the platform has off-thread surfaces
    #[default]
    Auto,
    /// Always draw on the calling thread
    Screen,
    /// Always draw on the render worker
    Offscreen,
    /// Always redraw on scroll
    Infinite,
}

/// How scrolling is mirrored onto the rulers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// The whole content is pre-rendered; scrolling moves the container
    Bounded,
    /// Only the visible window is rendered; scrolling redraws it
    Infinite,
}

impl RenderMode {
    /// Mode for content of `content` size under `preference`
    #[must_use]
    pub fn select(content: Size, preference: ModePreference) -> Self {
        let oversized = content.width > MAX_RATIO || content.height > MAX_RATIO;
        match preference {
            ModePreference::Infinite => RenderMode::Infinite,
            ModePreference::Auto if oversized => RenderMode::Infinite,
            _ => RenderMode::Bounded,
        }
    }

    #[must_use]
    pub fn is_infinite(self) -> bool {
        self == RenderMode::Infinite
    }
}

/// Logical sizes of the two ruler surfaces
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// content-width × track
    pub horizontal: Size,
    /// track × content-height
    pub vertical: Size,
    pub infinite: bool,
}

impl SurfaceGeometry {
    #[must_use]
    pub fn size(&self, axis: Axis) -> Size {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// Content extents, viewport, scroll position and display density of a ruler
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulerGeometry {
    /// Logical content size of the canvas being measured
    pub content: Size,
    /// Measured size of the wrapper element
    pub viewport: Size,
    pub scroll: ScrollOffset,
    pub pixel_ratio: f32,
    pub mode: RenderMode,
}

impl RulerGeometry {
    /// Drawable rectangle: the whole content when bounded, the viewport when
    /// infinite, both padded by the oversize margin
    #[must_use]
    pub fn drawable(&self) -> Size {
        let base = match self.mode {
            RenderMode::Bounded => self.content,
            RenderMode::Infinite => self.viewport,
        };
        Size::new(base.width + OVER_SIZE, base.height + OVER_SIZE)
    }

    #[must_use]
    pub fn surfaces(&self, track: f32) -> SurfaceGeometry {
        let drawable = self.drawable();
        SurfaceGeometry {
            horizontal: Size::new(drawable.width, track),
            vertical: Size::new(track, drawable.height),
            infinite: self.mode.is_infinite(),
        }
    }
}
