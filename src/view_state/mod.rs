//! The per-session view state and its mutators.
//!
//! Every user-editable setting lives in [`ViewState`]. Each field has a
//! single mutator that enforces the field's invariant (clamps, validation),
//! so the render coordinator and the UI never see out-of-range values.

mod color;
mod font;
mod theme;

pub use color::{ColorError, is_valid_color};
pub use font::FontFamily;
pub use theme::{ThemeError, ThemeName, ThemeSetting, parse_theme_override};

use crate::renderer::RenderOptions;

pub const FONT_SIZE_MIN: u32 = 8;
pub const FONT_SIZE_MAX: u32 = 30;
pub const DEFAULT_FONT_SIZE: u32 = 14;
pub const PANEL_WIDTH_MIN: f64 = 10.0;
pub const PANEL_WIDTH_MAX: f64 = 50.0;
pub const DEFAULT_PANEL_WIDTH: f64 = 25.0;
pub const DEFAULT_LINE_COLOR: &str = "#000000";

/// Diagram shown on first load.
pub const SAMPLE_DIAGRAM: &str = "graph TD
    A[Client] --> B[Load Balancer]
    B --> C[Server1]
    B --> D[Server2]";

/// Everything that feeds a render. Two equal values render identically,
/// which is how callers decide whether a re-render is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInputs {
    pub source: String,
    pub options: RenderOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    diagram_source: String,
    theme: ThemeSetting,
    theme_draft: Option<String>,
    font_size_px: u32,
    font_family: FontFamily,
    line_color: String,
    panel_collapsed: bool,
    panel_width_percent: f64,
    last_error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            diagram_source: SAMPLE_DIAGRAM.to_string(),
            theme: ThemeSetting::default(),
            theme_draft: None,
            font_size_px: DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            line_color: DEFAULT_LINE_COLOR.to_string(),
            panel_collapsed: false,
            panel_width_percent: DEFAULT_PANEL_WIDTH,
            last_error: None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagram_source(&self) -> &str {
        &self.diagram_source
    }

    pub const fn theme(&self) -> &ThemeSetting {
        &self.theme
    }

    /// Text of the last rejected structured-theme edit, kept for editing.
    pub fn theme_draft(&self) -> Option<&str> {
        self.theme_draft.as_deref()
    }

    pub const fn font_size_px(&self) -> u32 {
        self.font_size_px
    }

    pub const fn font_family(&self) -> FontFamily {
        self.font_family
    }

    pub fn line_color(&self) -> &str {
        &self.line_color
    }

    pub const fn panel_collapsed(&self) -> bool {
        self.panel_collapsed
    }

    pub const fn panel_width_percent(&self) -> f64 {
        self.panel_width_percent
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the current diagram kind honors the font size setting.
    pub fn font_size_honored(&self) -> bool {
        crate::renderer::is_font_size_honored(&self.diagram_source)
    }

    pub fn set_diagram_source(&mut self, source: impl Into<String>) {
        self.diagram_source = source.into();
    }

    pub fn set_theme(&mut self, theme: impl Into<ThemeSetting>) {
        self.theme = theme.into();
        self.theme_draft = None;
    }

    pub fn set_theme_name(&mut self, name: ThemeName) {
        self.set_theme(name);
    }

    /// Apply a structured theme override given as JSON-like text.
    ///
    /// On failure the current theme is left untouched and `text` is kept as
    /// the draft so the user can continue editing it.
    ///
    /// # Errors
    ///
    /// Returns a [`ThemeError`] when the text is malformed or not an object.
    pub fn set_custom_theme_text(&mut self, text: &str) -> Result<(), ThemeError> {
        match parse_theme_override(text) {
            Ok(vars) => {
                self.set_theme(ThemeSetting::Custom(vars));
                Ok(())
            }
            Err(err) => {
                tracing::debug!("rejected theme override: {err}");
                self.theme_draft = Some(text.to_string());
                Err(err)
            }
        }
    }

    /// Set the font size, clamped to `[FONT_SIZE_MIN, FONT_SIZE_MAX]`.
    /// Returns the stored value.
    pub fn set_font_size(&mut self, requested: i64) -> u32 {
        let clamped = requested.clamp(i64::from(FONT_SIZE_MIN), i64::from(FONT_SIZE_MAX));
        self.font_size_px = u32::try_from(clamped).unwrap_or(DEFAULT_FONT_SIZE);
        self.font_size_px
    }

    pub fn adjust_font_size(&mut self, delta: i64) -> u32 {
        self.set_font_size(i64::from(self.font_size_px) + delta)
    }

    pub const fn set_font_family(&mut self, family: FontFamily) {
        self.font_family = family;
    }

    /// # Errors
    ///
    /// Returns [`ColorError`] and keeps the previous color when `color` is
    /// not a recognizable CSS color.
    pub fn set_line_color(&mut self, color: &str) -> Result<(), ColorError> {
        let color = color.trim();
        if !is_valid_color(color) {
            return Err(ColorError(color.to_string()));
        }
        self.line_color = color.to_string();
        Ok(())
    }

    pub const fn set_panel_collapsed(&mut self, collapsed: bool) {
        self.panel_collapsed = collapsed;
    }

    pub const fn toggle_panel(&mut self) {
        self.panel_collapsed = !self.panel_collapsed;
    }

    /// Set the control panel width, clamped to `[PANEL_WIDTH_MIN, PANEL_WIDTH_MAX]`.
    /// NaN requests are ignored.
    pub fn set_panel_width(&mut self, percent: f64) -> f64 {
        if !percent.is_nan() {
            self.panel_width_percent = percent.clamp(PANEL_WIDTH_MIN, PANEL_WIDTH_MAX);
        }
        self.panel_width_percent
    }

    pub fn resize_panel_by(&mut self, delta_percent: f64) -> f64 {
        self.set_panel_width(self.panel_width_percent + delta_percent)
    }

    /// Resize from a divider drag: the pointer position as a share of the
    /// viewport width becomes the new panel width.
    pub fn drag_panel_to(&mut self, pointer_x: f64, viewport_width: f64) -> f64 {
        if viewport_width <= 0.0 || !viewport_width.is_finite() {
            return self.panel_width_percent;
        }
        self.set_panel_width(pointer_x / viewport_width * 100.0)
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            theme: self.theme.clone(),
            font_size_px: self.font_size_px,
            font_family: self.font_family,
            line_color: self.line_color.clone(),
        }
    }

    pub fn render_inputs(&self) -> RenderInputs {
        RenderInputs {
            source: self.diagram_source.clone(),
            options: self.render_options(),
        }
    }
}
