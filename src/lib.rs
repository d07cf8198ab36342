// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. export::ExportError)
    clippy::module_name_repetitions
)]

//! # Conceptcraft
//!
//! A terminal Mermaid diagram studio.
//!
//! Conceptcraft keeps a diagram source and its styling in one view state and
//! re-renders whenever either changes:
//! - Live preview of the rendered diagram (Kitty, Sixel, half-block fallback)
//! - Named and structured themes, font size and family, line color
//! - Resizable, collapsible control panel
//! - SVG and PNG export
//!
//! ## Architecture
//!
//! The interactive UI uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! Rendering runs on worker threads behind [`coordinator::RenderCoordinator`];
//! only the most recently dispatched render may change what is displayed.
//!
//! ## Modules
//!
//! - [`view_state`]: Editable settings and their invariants
//! - [`renderer`]: The diagram renderer seam and Mermaid backend
//! - [`coordinator`]: Debounced, latest-wins render scheduling
//! - [`surface`]: What the preview currently shows
//! - [`export`]: SVG/PNG export and delivery
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`editor`]: Diagram source editing
//! - [`preview`]: Terminal image of the rendered diagram
//! - [`watcher`]: File watching
//! - [`config`]: Saved default flags

pub mod app;
pub mod config;
pub mod coordinator;
pub mod editor;
pub mod export;
pub mod perf;
pub mod preview;
pub mod renderer;
pub mod surface;
pub mod ui;
pub mod view_state;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::coordinator::{RenderCommit, RenderCoordinator};
    pub use crate::export::{DirectorySink, ExportFormat};
    pub use crate::renderer::{DiagramRenderer, MermaidRenderer, RenderError};
    pub use crate::surface::DisplaySurface;
    pub use crate::view_state::ViewState;
}
