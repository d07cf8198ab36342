//! Theme palettes resolved from the render options.

use serde_json::{Map, Value};

use super::RenderOptions;
use crate::view_state::{ThemeName, is_valid_color};

/// Concrete colors and fonts for one render.
///
/// Resolved in three layers: the base mermaid palette, then any structured
/// override variables, then the explicit font and line color settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemePalette {
    pub background: String,
    pub primary_color: String,
    pub primary_text_color: String,
    pub primary_border_color: String,
    pub line_color: String,
    pub cluster_background: String,
    pub cluster_border: String,
    pub edge_label_background: String,
    pub font_family: String,
    pub font_size: f32,
}

impl ThemePalette {
    pub fn base(name: ThemeName) -> Self {
        let (bg, primary, text, border, line, cluster_bg, cluster_border, edge_bg) = match name {
            ThemeName::Default => (
                "#ffffff", "#ECECFF", "#333333", "#9370DB", "#333333", "#ffffde", "#aaaa33",
                "#e8e8e8",
            ),
            ThemeName::Forest => (
                "#ffffff", "#cde498", "#333333", "#13540c", "#008000", "#cdffb2", "#6eaa49",
                "#e8e8e8",
            ),
            ThemeName::Dark => (
                "#333333", "#1f2020", "#cccccc", "#cccccc", "#d3d3d3", "#302f3d", "#666666",
                "#585858",
            ),
            ThemeName::Neutral => (
                "#ffffff", "#eeeeee", "#111111", "#999999", "#666666", "#f4f4f4", "#999999",
                "#ffffff",
            ),
        };
        Self {
            background: bg.to_string(),
            primary_color: primary.to_string(),
            primary_text_color: text.to_string(),
            primary_border_color: border.to_string(),
            line_color: line.to_string(),
            cluster_background: cluster_bg.to_string(),
            cluster_border: cluster_border.to_string(),
            edge_label_background: edge_bg.to_string(),
            font_family: "'trebuchet ms', verdana, arial, sans-serif".to_string(),
            font_size: 16.0,
        }
    }

    pub fn resolve(options: &RenderOptions) -> Self {
        let mut palette = Self::base(options.theme.base());
        if let Some(vars) = options.theme.overrides() {
            palette.apply_variables(vars);
        }
        palette.font_family = options.font_family.css_stack().to_string();
        #[allow(clippy::cast_precision_loss)]
        {
            palette.font_size = options.font_size_px as f32;
        }
        palette.line_color.clone_from(&options.line_color);
        palette
    }

    /// Apply mermaid `themeVariables` names. Unknown keys and values of the
    /// wrong type are ignored.
    fn apply_variables(&mut self, vars: &Map<String, Value>) {
        for (key, value) in vars {
            let target = match key.as_str() {
                "background" => &mut self.background,
                "primaryColor" | "mainBkg" => &mut self.primary_color,
                "primaryTextColor" | "textColor" => &mut self.primary_text_color,
                "primaryBorderColor" | "nodeBorder" => &mut self.primary_border_color,
                "lineColor" => &mut self.line_color,
                "clusterBkg" => &mut self.cluster_background,
                "clusterBorder" => &mut self.cluster_border,
                "edgeLabelBackground" => &mut self.edge_label_background,
                "fontFamily" => &mut self.font_family,
                "fontSize" => {
                    if let Some(size) = parse_font_size(value) {
                        self.font_size = size;
                    }
                    continue;
                }
                _ => continue,
            };
            // Overrides built without `parse_theme_override` are filtered here too.
            if let Some(text) = value.as_str()
                && (key == "fontFamily" || is_valid_color(text))
            {
                *target = text.to_string();
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_font_size(value: &Value) -> Option<f32> {
    let size: Option<f32> = match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().trim_end_matches("px").trim().parse().ok(),
        _ => None,
    };
    size.filter(|size| size.is_finite() && *size > 0.0)
}
