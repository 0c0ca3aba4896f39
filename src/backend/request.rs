//! Worker request and response types

use crate::geometry::{ScrollOffset, SurfaceGeometry};
use crate::render::Bitmap;
use crate::style::RulerStyle;

/// Unique identifier for worker requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Request sent to the ruler worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Create the worker's surfaces and render both rulers
    Draw {
        id: RequestId,
        ruler_id: String,
        surfaces: SurfaceGeometry,
        style: RulerStyle,
        pixel_ratio: f32,
        scroll: ScrollOffset,
    },

    /// Redraw at new scroll offsets
    Scroll { id: RequestId, scroll: ScrollOffset },

    /// Replace the style after a scale change and redraw
    Scale {
        id: RequestId,
        style: RulerStyle,
        scroll: ScrollOffset,
    },

    /// Resize the backing stores and redraw
    Resize {
        id: RequestId,
        surfaces: SurfaceGeometry,
        style: RulerStyle,
        scroll: ScrollOffset,
    },

    /// Replace the style after an options update and redraw
    UpdateOptions {
        id: RequestId,
        style: RulerStyle,
        scroll: ScrollOffset,
    },

    /// Release the surfaces and stop the worker
    Destroy { id: RequestId },
}

impl WorkerRequest {
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            WorkerRequest::Draw { id, .. }
            | WorkerRequest::Scroll { id, .. }
            | WorkerRequest::Scale { id, .. }
            | WorkerRequest::Resize { id, .. }
            | WorkerRequest::UpdateOptions { id, .. }
            | WorkerRequest::Destroy { id } => *id,
        }
    }

    /// Message type name, as used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerRequest::Draw { .. } => "draw",
            WorkerRequest::Scroll { .. } => "scroll",
            WorkerRequest::Scale { .. } => "scale",
            WorkerRequest::Resize { .. } => "resize",
            WorkerRequest::UpdateOptions { .. } => "option",
            WorkerRequest::Destroy { .. } => "destroy",
        }
    }
}

/// Response from the ruler worker
#[derive(Debug)]
pub enum WorkerResponse {
    /// Freshly rendered rulers; the bitmaps are moved to the receiver
    Frame {
        id: RequestId,
        horizontal: Bitmap,
        vertical: Bitmap,
    },

    /// The worker released its surfaces and stopped
    Destroyed { id: RequestId },

    /// The request could not be handled in the worker's current state
    Rejected {
        id: RequestId,
        request: &'static str,
        reason: String,
    },
}

impl WorkerResponse {
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            WorkerResponse::Frame { id, .. }
            | WorkerResponse::Destroyed { id }
            | WorkerResponse::Rejected { id, .. } => *id,
        }
    }
}
