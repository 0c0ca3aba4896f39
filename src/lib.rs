//! Measurement rulers for large scrollable, zoomable canvases.
//!
//! A [`Ruler`] keeps a horizontal and a vertical ruler in pixel
//! correspondence with the content it measures. Content that fits the
//! drawable limits is rendered once and scrolled by moving its container;
//! larger content is redrawn for the visible window on every scroll frame,
//! optionally on a background worker.

pub mod backend;
pub mod config;
pub mod consts;
pub mod container;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod host;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod style;

pub use backend::{BackendKind, RenderBackend};
pub use config::{OnScroll, RulerConfig, RulerType};
pub use container::Container;
pub use controller::{ResizeRequest, Ruler, ScrollDispatch};
pub use error::{Result, RulerError};
pub use geometry::{Axis, ModePreference, RenderMode, RulerGeometry, ScrollOffset, Size};
pub use host::{HeadlessHost, Host, MountTarget, ScrollTargetId, ScrollTargetRef};
pub use registry::RulerRegistry;
pub use style::{LabelMode, RulerColor, RulerStyle, StylePatch};
