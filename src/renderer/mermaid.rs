//! Mermaid rendering backend.
//!
//! Produces SVG with `mermaid-rs-renderer`. The palette for each call is
//! built from the request, so nothing is configured globally.

use mermaid_rs_renderer::config::LayoutConfig;
use mermaid_rs_renderer::layout::compute_layout;
use mermaid_rs_renderer::parser::parse_mermaid;
use mermaid_rs_renderer::render::render_svg;
use mermaid_rs_renderer::theme::Theme;

use super::{DiagramKind, DiagramRenderer, RenderError, RenderRequest, ThemePalette};

/// The default [`DiagramRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidRenderer;

impl MermaidRenderer {
    pub const fn new() -> Self {
        Self
    }
}

impl DiagramRenderer for MermaidRenderer {
    fn render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        let kind = DiagramKind::detect(&request.source).ok_or(RenderError::UnknownDiagram)?;
        tracing::debug!(
            sequence = request.sequence,
            render_id = %request.render_id,
            ?kind,
            "rendering diagram"
        );

        let parsed =
            parse_mermaid(&request.source).map_err(|err| RenderError::Syntax(err.to_string()))?;
        let theme = backend_theme(&ThemePalette::resolve(&request.options));
        let layout_config = LayoutConfig::default();
        let laid_out = compute_layout(&parsed.graph, &theme, &layout_config);
        let svg = render_svg(&laid_out, &theme, &layout_config);

        Ok(tag_svg_root(
            &fix_svg_font_families(&svg),
            &request.render_id,
        ))
    }
}

fn backend_theme(palette: &ThemePalette) -> Theme {
    let mut theme = Theme::modern();
    theme.background.clone_from(&palette.background);
    theme.primary_color.clone_from(&palette.primary_color);
    theme.primary_text_color.clone_from(&palette.primary_text_color);
    theme.primary_border_color.clone_from(&palette.primary_border_color);
    theme.line_color.clone_from(&palette.line_color);
    theme.cluster_background.clone_from(&palette.cluster_background);
    theme.cluster_border.clone_from(&palette.cluster_border);
    theme.edge_label_background.clone_from(&palette.edge_label_background);
    theme.font_family.clone_from(&palette.font_family);
    theme.font_size = palette.font_size;
    theme
}

/// Give the root `<svg>` element the render id unless it already has one.
fn tag_svg_root(svg: &str, render_id: &str) -> String {
    let Some(start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let open_end = svg[start..].find('>').map_or(svg.len(), |i| start + i);
    let open_tag = &svg[start..open_end];
    if open_tag.contains(" id=\"") {
        return svg.to_string();
    }
    let insert_at = start + "<svg".len();
    let mut out = String::with_capacity(svg.len() + render_id.len() + 6);
    out.push_str(&svg[..insert_at]);
    out.push_str(" id=\"");
    out.push_str(render_id);
    out.push('"');
    out.push_str(&svg[insert_at..]);
    out
}

/// Fix unescaped double quotes inside font-family attributes.
///
/// The renderer copies the configured font stack into attributes verbatim,
/// so a stack such as `Inter, "Segoe UI", sans-serif` ends up as
/// `font-family="Inter, "Segoe UI", sans-serif"`, which no XML parser
/// accepts. Inner double quotes become single quotes.
pub fn fix_svg_font_families(svg: &str) -> String {
    const MARKER: &str = "font-family=\"";
    let mut result = String::with_capacity(svg.len());
    let mut rest = svg;

    while let Some(pos) = rest.find(MARKER) {
        result.push_str(&rest[..pos + MARKER.len()]);
        rest = &rest[pos + MARKER.len()..];

        // The closing quote is the first `"` followed by `>`, ` `, `/` or
        // the end of input.
        let mut value = String::new();
        let mut end_offset = rest.len();
        let mut closed = false;
        for (i, ch) in rest.char_indices() {
            if ch != '"' {
                value.push(ch);
                continue;
            }
            let after = rest[i + 1..].chars().next();
            if after.is_none_or(|c| matches!(c, '>' | ' ' | '/')) {
                result.push_str(&value.replace('"', "'"));
                result.push('"');
                end_offset = i + 1;
                closed = true;
                break;
            }
            value.push('"');
        }
        if !closed {
            // Unterminated attribute: keep the remainder untouched.
            result.push_str(&value);
        }
        rest = &rest[end_offset..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::ViewState;

    fn request(source: &str) -> RenderRequest {
        RenderRequest {
            sequence: 1,
            render_id: "mermaid-0".to_string(),
            source: source.to_string(),
            options: ViewState::new().render_options(),
        }
    }

    #[test]
    fn test_fix_svg_font_families_replaces_inner_quotes() {
        let input = r#"<text font-family="Inter, "Segoe UI", sans-serif" font-size="14">"#;
        assert_eq!(
            fix_svg_font_families(input),
            r#"<text font-family="Inter, 'Segoe UI', sans-serif" font-size="14">"#
        );
    }

    #[test]
    fn test_fix_svg_font_families_no_op_when_clean() {
        let input = r#"<text font-family="Inter, sans-serif" font-size="14">"#;
        assert_eq!(fix_svg_font_families(input), input);
    }

    #[test]
    fn test_tag_svg_root_inserts_id_once() {
        let tagged = tag_svg_root(r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#, "mermaid-3");
        assert!(tagged.starts_with(r#"<svg id="mermaid-3" xmlns="#));
        assert_eq!(tag_svg_root(&tagged, "mermaid-4"), tagged);
    }

    #[test]
    fn test_unknown_diagram_is_rejected_before_parsing() {
        let err = MermaidRenderer::new().render(&request("not a diagram")).unwrap_err();
        assert_eq!(err, RenderError::UnknownDiagram);
    }

    #[test]
    fn test_render_flowchart_returns_tagged_svg() {
        let svg = MermaidRenderer::new()
            .render(&request("flowchart LR\n    A[Start] --> B[End]"))
            .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains(r#"id="mermaid-0""#));
    }
}
