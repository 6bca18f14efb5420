//! Error types for towerscope.

use thiserror::Error;

/// The main error type for towerscope operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A view identifier was requested that is not in the view table.
    #[error("view '{0}' not found")]
    UnknownView(String),

    /// Two views in a catalog share the same identifier.
    #[error("view '{0}' defined more than once")]
    DuplicateView(String),

    /// The catalog does not define its default view.
    #[error("default view '{0}' is not defined")]
    MissingDefaultView(String),

    /// A hotspot points at a view that does not exist.
    #[error("hotspot '{hotspot}' references unknown view '{view}'")]
    HotspotViewMissing { hotspot: String, view: String },

    /// Overlay content is keyed by a view that does not exist.
    #[error("overlay content references unknown view '{0}'")]
    OverlayViewMissing(String),

    /// Two overlay entries are keyed by the same view.
    #[error("overlay content for view '{0}' defined more than once")]
    DuplicateOverlay(String),

    /// The default view carries overlay content, which would never be hidden.
    #[error("default view '{0}' must not carry overlay content")]
    DefaultViewHasOverlay(String),

    /// An option is outside its valid range.
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// An external scene description could not be used.
    #[error("scene load error: {0}")]
    SceneLoad(String),

    /// Rendering error.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for towerscope operations.
pub type Result<T> = std::result::Result<T, ViewerError>;
