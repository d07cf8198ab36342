use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ratatui_image::picker::Picker;

use crate::editor::SourceEditor;
use crate::export::ExportFormat;
use crate::preview::PreviewImage;
use crate::surface::DisplaySurface;
use crate::view_state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which control in the left panel receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Source,
    Theme,
    CustomTheme,
    FontSize,
    FontFamily,
    LineColor,
}

impl Focus {
    pub const ALL: [Self; 6] = [
        Self::Source,
        Self::Theme,
        Self::CustomTheme,
        Self::FontSize,
        Self::FontFamily,
        Self::LineColor,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Source => "Diagram",
            Self::Theme => "Theme",
            Self::CustomTheme => "Custom theme",
            Self::FontSize => "Font size",
            Self::FontFamily => "Font family",
            Self::LineColor => "Line color",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Whether this control takes free text input.
    pub const fn is_text_input(self) -> bool {
        matches!(self, Self::CustomTheme | Self::LineColor)
    }
}

/// The complete application state.
pub struct Model {
    /// User-editable render settings
    pub view: ViewState,
    /// Last committed render output
    pub surface: DisplaySurface,
    /// Diagram source being edited
    pub editor: SourceEditor,
    pub focus: Focus,
    /// Text typed into the custom theme field, applied on Enter
    pub theme_input: String,
    /// Text typed into the line color field, applied on Enter
    pub color_input: String,
    /// File the source was loaded from, if any
    pub file_path: Option<PathBuf>,
    /// Directory exports are written to
    pub out_dir: PathBuf,
    pub watch_enabled: bool,
    pub help_visible: bool,
    pub should_quit: bool,
    pub terminal_size: (u16, u16),
    /// Set while the mouse is dragging the panel divider
    pub panel_dragging: bool,
    /// Export running on a worker thread
    pub export_pending: Option<ExportFormat>,
    pub picker: Option<Picker>,
    pub preview: Option<PreviewImage>,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    toast: Option<Toast>,
}

impl Model {
    pub fn new(view: ViewState, file_path: Option<PathBuf>, terminal_size: (u16, u16)) -> Self {
        let editor = SourceEditor::new(view.diagram_source());
        let color_input = view.line_color().to_string();
        Self {
            view,
            editor,
            color_input,
            file_path,
            terminal_size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    /// Copy the editor text into the view state if it changed.
    pub(super) fn sync_source_from_editor(&mut self) {
        let text = self.editor.text();
        if text != self.view.diagram_source() {
            self.view.set_diagram_source(text);
        }
    }

    /// Reload the source file into the editor. Returns `false` when unsaved
    /// edits were kept instead.
    pub(super) fn reload_from_disk(&mut self) -> Result<bool> {
        let Some(path) = self.file_path.clone() else {
            return Ok(false);
        };
        if self.editor.is_dirty() {
            return Ok(false);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.editor.replace_text(&text);
        self.sync_source_from_editor();
        Ok(true)
    }

    pub(super) fn save_to_disk(&mut self) -> Result<PathBuf> {
        let path = self
            .file_path
            .clone()
            .context("No file to save to; start with a FILE argument")?;
        std::fs::write(&path, self.editor.text())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.editor.mark_saved();
        Ok(path)
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Rebuild the preview image when the surface or the preview width
    /// changed. Clears it when the surface holds no diagram.
    pub fn refresh_preview(&mut self, width_cols: u16) {
        let Some(picker) = &self.picker else { return };
        let Some(svg) = self.surface.vector_node() else {
            self.preview = None;
            return;
        };
        let revision = self.surface.revision();
        if self
            .preview
            .as_ref()
            .is_some_and(|p| p.revision == revision && p.width_cols == width_cols)
        {
            return;
        }
        match crate::preview::build_preview(picker, svg, revision, width_cols) {
            Ok(preview) => self.preview = Some(preview),
            Err(err) => {
                tracing::debug!(%err, "preview rasterization failed");
                crate::perf::log_event("preview.error", err.to_string());
                self.preview = None;
            }
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("view", &self.view)
            .field("surface_revision", &self.surface.revision())
            .field("editor", &self.editor)
            .field("focus", &self.focus)
            .field("file_path", &self.file_path)
            .field("export_pending", &self.export_pending)
            .field("has_preview", &self.preview.is_some())
            .finish_non_exhaustive()
    }
}

// Required by std::mem::take in the event loop.
impl Default for Model {
    fn default() -> Self {
        let view = ViewState::default();
        Self {
            editor: SourceEditor::new(view.diagram_source()),
            color_input: view.line_color().to_string(),
            view,
            surface: DisplaySurface::new(),
            focus: Focus::default(),
            theme_input: String::new(),
            file_path: None,
            out_dir: PathBuf::from("."),
            watch_enabled: false,
            help_visible: false,
            should_quit: false,
            terminal_size: (80, 24),
            panel_dragging: false,
            export_pending: None,
            picker: None,
            preview: None,
            config_global_path: None,
            config_local_path: None,
            toast: None,
        }
    }
}
