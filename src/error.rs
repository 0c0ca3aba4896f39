//! Error types for ruler construction and lifecycle operations

use std::path::PathBuf;

/// Errors raised by ruler operations.
///
/// Every variant is raised synchronously at the point of the call; the
/// operation does not execute and the ruler keeps its previous style and
/// geometry.
#[derive(Debug, thiserror::Error)]
pub enum RulerError {
    #[error("wrapper element or mount ref is missing")]
    MissingWrapper,

    #[error("can not measure the wrapper element {0}")]
    UnresolvedWrapper(String),

    #[error("render type is illegal: {0}")]
    IllegalRenderType(String),

    #[error("scale number is illegal: {0}")]
    InvalidScale(f32),

    #[error("resize needs a width or a height")]
    InvalidResize,

    #[error("style is illegal: {detail}")]
    InvalidStyle { detail: String },

    #[error("color is illegal: {0}")]
    InvalidColor(String),

    #[error("can not find the scroll element {0}")]
    UnresolvedScrollTarget(String),

    #[error("ruler id already registered: {0}")]
    DuplicateRulerId(String),

    #[error("can not find ruler by id {0}")]
    UnknownRulerId(String),

    #[error("ruler {0} has been destroyed")]
    Destroyed(String),

    #[error("can not allocate a {width}x{height} backing store")]
    Surface { width: u32, height: u32 },

    #[error("render worker for ruler {0} is gone")]
    WorkerDisconnected(String),

    #[error("config {path:?}: {detail}")]
    Config { path: PathBuf, detail: String },

    #[error("export {path:?}: {detail}")]
    Export { path: PathBuf, detail: String },
}

impl RulerError {
    pub fn invalid_style(msg: impl Into<String>) -> Self {
        Self::InvalidStyle { detail: msg.into() }
    }

    pub fn config(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            detail: msg.into(),
        }
    }

    /// True for caller mistakes: bad options, bad arguments, bad lookups.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::Destroyed(_)
                | Self::Surface { .. }
                | Self::WorkerDisconnected(_)
                | Self::Config { .. }
                | Self::Export { .. }
        )
    }
}

pub type Result<T, E = RulerError> = std::result::Result<T, E>;
