//! The embedding environment a ruler is mounted into.
//!
//! A [`Host`] measures mount targets, resolves scroll targets and reports
//! display capabilities. [`HeadlessHost`] keeps all of that in memory and is
//! what the command-line renderer and the tests use.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Where a ruler is mounted
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountTarget {
    /// The wrapper element itself is measured
    Wrapper(String),
    /// A ref inside the wrapper; its parent is measured
    MountRef(String),
}

impl fmt::Display for MountTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountTarget::Wrapper(name) => write!(f, "wrapper {name}"),
            MountTarget::MountRef(name) => write!(f, "mount ref {name}"),
        }
    }
}

/// Handle of a resolved scroll target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrollTargetId(pub u64);

/// An unresolved scroll target
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTargetRef {
    Selector(String),
    Element(ScrollTargetId),
}

impl fmt::Display for ScrollTargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollTargetRef::Selector(selector) => f.write_str(selector),
            ScrollTargetRef::Element(id) => write!(f, "element #{}", id.0),
        }
    }
}

pub trait Host: Send + Sync {
    /// Computed size of the element the ruler measures for `target`
    fn mount_size(&self, target: &MountTarget) -> Option<Size>;

    fn resolve_scroll_target(&self, target: &ScrollTargetRef) -> Option<ScrollTargetId>;

    fn device_pixel_ratio(&self) -> f32;

    /// True when surfaces can be drawn off the calling thread
    fn supports_offscreen(&self) -> bool;
}

#[derive(Debug, Default)]
struct HeadlessState {
    mounts: HashMap<MountTarget, Size>,
    selectors: HashMap<String, ScrollTargetId>,
    elements: Vec<ScrollTargetId>,
}

/// In-memory host
#[derive(Debug)]
pub struct HeadlessHost {
    state: Mutex<HeadlessState>,
    pixel_ratio: f32,
    offscreen: bool,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl HeadlessHost {
    #[must_use]
    pub fn new(pixel_ratio: f32) -> Self {
        Self {
            state: Mutex::new(HeadlessState::default()),
            pixel_ratio,
            offscreen: true,
        }
    }

    #[must_use]
    pub fn with_offscreen(mut self, offscreen: bool) -> Self {
        self.offscreen = offscreen;
        self
    }

    /// Register (or re-measure) a mount target
    pub fn set_mount_size(&self, target: MountTarget, size: Size) {
        self.lock().mounts.insert(target, size);
    }

    /// Register a scroll element reachable through `selector`
    pub fn add_scroll_target(&self, selector: impl Into<String>) -> ScrollTargetId {
        let mut state = self.lock();
        let id = ScrollTargetId(state.elements.len() as u64 + 1);
        state.elements.push(id);
        state.selectors.insert(selector.into(), id);
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Host for HeadlessHost {
    fn mount_size(&self, target: &MountTarget) -> Option<Size> {
        self.lock().mounts.get(target).copied()
    }

    fn resolve_scroll_target(&self, target: &ScrollTargetRef) -> Option<ScrollTargetId> {
        let state = self.lock();
        match target {
            ScrollTargetRef::Selector(selector) => state.selectors.get(selector).copied(),
            ScrollTargetRef::Element(id) => state.elements.contains(id).then_some(*id),
        }
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn supports_offscreen(&self) -> bool {
        self.offscreen
    }
}
