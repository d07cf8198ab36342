//! The display surface: where rendered markup is shown and read back for export.

/// What the surface currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceContent {
    /// Renderer output, stored verbatim.
    Markup(String),
    /// Raw diagram source shown as preformatted text after a failed render.
    Preformatted(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySurface {
    content: Option<SurfaceContent>,
    revision: u64,
}

impl DisplaySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn content(&self) -> Option<&SurfaceContent> {
        self.content.as_ref()
    }

    /// Incremented on every write; lets views cache derived data.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub const fn is_blank(&self) -> bool {
        self.content.is_none()
    }

    pub fn show_markup(&mut self, markup: String) {
        self.content = Some(SurfaceContent::Markup(markup));
        self.revision += 1;
    }

    pub fn show_fallback(&mut self, source: String) {
        self.content = Some(SurfaceContent::Preformatted(source));
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.content = None;
        self.revision += 1;
    }

    /// The `<svg>...</svg>` element currently displayed, if any.
    pub fn vector_node(&self) -> Option<&str> {
        match &self.content {
            Some(SurfaceContent::Markup(markup)) => find_svg_node(markup),
            _ => None,
        }
    }

    /// Visible text: the literal source for the fallback, or the markup's
    /// text nodes with tags stripped.
    pub fn text_content(&self) -> String {
        match &self.content {
            None => String::new(),
            Some(SurfaceContent::Preformatted(text)) => text.clone(),
            Some(SurfaceContent::Markup(markup)) => strip_tags(markup),
        }
    }

    /// HTML for embedding the surface in a page.
    pub fn to_html(&self) -> String {
        match &self.content {
            None => String::new(),
            Some(SurfaceContent::Markup(markup)) => markup.clone(),
            Some(SurfaceContent::Preformatted(text)) => format!("<pre>{}</pre>", escape_html(text)),
        }
    }
}

fn find_svg_node(markup: &str) -> Option<&str> {
    let start = find_svg_open(markup)?;
    let end = markup.rfind("</svg>")? + "</svg>".len();
    if end <= start {
        // Self-closing root: `<svg ... />`.
        let close = markup[start..].find("/>")? + start + 2;
        return Some(&markup[start..close]);
    }
    Some(&markup[start..end])
}

/// Position of the first `<svg` tag, ignoring names like `<svgfoo`.
fn find_svg_open(markup: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = markup[offset..].find("<svg") {
        let at = offset + pos;
        let next = markup[at + 4..].chars().next();
        if next.is_none_or(|c| c.is_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        offset = at + 4;
    }
    None
}

fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_blank() {
        let surface = DisplaySurface::new();
        assert!(surface.is_blank());
        assert!(surface.vector_node().is_none());
        assert_eq!(surface.text_content(), "");
    }

    #[test]
    fn test_vector_node_extracts_svg_element() {
        let mut surface = DisplaySurface::new();
        surface.show_markup(r#"<div><svg id="m"><g/></svg></div>"#.to_string());
        assert_eq!(surface.vector_node(), Some(r#"<svg id="m"><g/></svg>"#));
    }

    #[test]
    fn test_vector_node_ignores_similar_tag_names() {
        let mut surface = DisplaySurface::new();
        surface.show_markup("<svgish>no</svgish>".to_string());
        assert!(surface.vector_node().is_none());
    }

    #[test]
    fn test_fallback_has_no_vector_node_and_exact_text() {
        let mut surface = DisplaySurface::new();
        surface.show_fallback("A --> <B> & C".to_string());
        assert!(surface.vector_node().is_none());
        assert_eq!(surface.text_content(), "A --> <B> & C");
        assert_eq!(surface.to_html(), "<pre>A --&gt; &lt;B&gt; &amp; C</pre>");
    }

    #[test]
    fn test_revision_bumps_on_every_write() {
        let mut surface = DisplaySurface::new();
        surface.show_markup("<svg></svg>".to_string());
        surface.show_fallback("x".to_string());
        surface.clear();
        assert_eq!(surface.revision(), 3);
    }

    #[test]
    fn test_markup_text_content_strips_tags() {
        let mut surface = DisplaySurface::new();
        surface.show_markup("<svg><text>A</text><text>B</text></svg>".to_string());
        assert_eq!(surface.text_content(), "AB");
    }
}
