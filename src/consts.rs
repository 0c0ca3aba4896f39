//! Fixed ruler policy constants

/// Maximum track thickness of a ruler, in logical pixels
pub const MAX_SIZE: f32 = 50.0;

/// Content extent beyond which `auto` mode switches to infinite rendering
pub const MAX_RATIO: f32 = 20_000.0;

/// Extra drawable length added past the content (or viewport) edge
pub const OVER_SIZE: f32 = 800.0;

/// Backing-store oversampling on top of the device pixel ratio
pub const OVERSAMPLE: f32 = 1.0;

pub const DEFAULT_WIDTH: f32 = 1920.0;
pub const DEFAULT_HEIGHT: f32 = 1080.0;

pub const DEFAULT_SIZE: f32 = 20.0;
pub const DEFAULT_GAP: f32 = 10.0;
pub const DEFAULT_SCALE: f32 = 1.0;

pub const DEFAULT_RULER_ID: &str = "easy-canvas-ruler";
