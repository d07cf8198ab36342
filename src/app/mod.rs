//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Renders and exports never run inside `update`. The event loop compares
//! the view state's render inputs after every message and schedules a
//! render on the coordinator when they changed.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Focus, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::renderer::{DiagramRenderer, MermaidRenderer};
use crate::view_state::ViewState;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    view: ViewState,
    file_path: Option<PathBuf>,
    out_dir: PathBuf,
    watch_enabled: bool,
    force_half_cell: bool,
    renderer: Arc<dyn DiagramRenderer>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an application starting from `view`.
    pub fn new(view: ViewState) -> Self {
        Self {
            view,
            file_path: None,
            out_dir: PathBuf::from("."),
            watch_enabled: false,
            force_half_cell: false,
            renderer: Arc::new(MermaidRenderer::new()),
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// File the diagram source was read from; enables save and watch.
    #[must_use]
    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        self.file_path = path;
        self
    }

    #[must_use]
    pub fn with_out_dir(mut self, dir: PathBuf) -> Self {
        self.out_dir = dir;
        self
    }

    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Skip terminal graphics detection and draw the preview with half blocks.
    #[must_use]
    pub const fn with_force_half_cell(mut self, enabled: bool) -> Self {
        self.force_half_cell = enabled;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn DiagramRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("file_path", &self.file_path)
            .field("out_dir", &self.out_dir)
            .field("watch_enabled", &self.watch_enabled)
            .finish_non_exhaustive()
    }
}
