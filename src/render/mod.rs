//! Ruler rendering: tick layout, painting and drawing surfaces

pub mod export;
pub mod glyphs;
pub mod paint;
pub mod surface;
pub mod tick;

pub use surface::{Bitmap, Surface, SurfacePair};
pub use tick::{DrawList, TickTier, TickWindow, label_value, layout};
