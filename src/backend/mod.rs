//! Render backends: where the tick renderer runs and how its output reaches
//! the visible surfaces

mod offscreen;
pub mod request;
mod screen;
mod worker;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use offscreen::OffscreenBackend;
pub use request::{RequestId, WorkerRequest, WorkerResponse};
pub use screen::ScreenBackend;
pub use worker::ruler_worker;

use crate::error::Result;
use crate::geometry::{ScrollOffset, SurfaceGeometry};
use crate::render::SurfacePair;
use crate::style::RulerStyle;

/// How long `destroy` waits for the worker to acknowledge
pub const DESTROY_TIMEOUT: Duration = Duration::from_secs(2);

/// Which backend variant drives a ruler
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Draws synchronously on the calling thread
    Screen,
    /// Draws on a background worker and blits the transferred bitmaps
    Offscreen,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Screen => "screen",
            BackendKind::Offscreen => "offscreen",
        }
    }
}

/// Capability set shared by the screen and worker backends.
///
/// Each backend keeps its own copy of style, scroll offsets and surface
/// geometry; callers pass the new values in rather than sharing state.
pub trait RenderBackend: Send {
    fn kind(&self) -> BackendKind;

    /// Initial draw of both rulers
    fn draw_canvas(&mut self) -> Result<()>;

    /// Replace the style after a scale change and redraw
    fn scale(&mut self, style: &RulerStyle) -> Result<()>;

    /// Replace the style after an options update and redraw
    fn update(&mut self, style: &RulerStyle) -> Result<()>;

    /// Resize the backing stores, switch bounded/infinite and redraw
    fn resize(&mut self, geometry: &SurfaceGeometry, style: &RulerStyle) -> Result<()>;

    /// Redraw the visible window at new scroll offsets
    fn translate(&mut self, scroll: ScrollOffset) -> Result<()>;

    /// Record scroll offsets without redrawing
    fn set_scroll(&mut self, scroll: ScrollOffset);

    /// Apply finished work; returns the number of frames applied
    fn poll(&mut self) -> Result<usize>;

    /// Block until no work is in flight or `timeout` passes
    fn flush(&mut self, timeout: Duration) -> Result<usize>;

    /// The visible surfaces
    fn surfaces(&self) -> &SurfacePair;

    /// Number of times the visible surfaces received a new raster
    fn redraws(&self) -> u64;

    /// Release surfaces and any background context. Terminal.
    fn destroy(&mut self) -> Result<()>;
}
