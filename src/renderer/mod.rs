//! The external diagram renderer seam.
//!
//! Rendering is delegated to an implementation of [`DiagramRenderer`]. The
//! renderer is stateless: everything that affects the output travels in the
//! [`RenderRequest`], so concurrent calls never share configuration.

mod kind;
mod mermaid;
mod palette;

pub use kind::{DiagramKind, is_font_size_honored};
pub use mermaid::{MermaidRenderer, fix_svg_font_families};
pub use palette::ThemePalette;

use std::time::Duration;

use crate::view_state::{FontFamily, ThemeSetting};

/// Presentation options passed with every render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub theme: ThemeSetting,
    pub font_size_px: u32,
    pub font_family: FontFamily,
    pub line_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Dispatch sequence number; the latest one wins.
    pub sequence: u64,
    /// Unique id for the rendered root element (`mermaid-{generation}`).
    pub render_id: String,
    pub source: String,
    pub options: RenderOptions,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("No diagram type detected matching given configuration for text")]
    UnknownDiagram,
    #[error("{0}")]
    Syntax(String),
    #[error("renderer panicked: {0}")]
    Panicked(String),
    #[error("render worker could not be started: {0}")]
    Spawn(String),
    #[error("render did not complete within {0:?}")]
    TimedOut(Duration),
}

/// Turns diagram source text into SVG markup.
pub trait DiagramRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the source cannot be rendered.
    fn render(&self, request: &RenderRequest) -> Result<String, RenderError>;
}

impl<F> DiagramRenderer for F
where
    F: Fn(&RenderRequest) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        self(request)
    }
}
