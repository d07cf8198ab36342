//! End-to-end checks against the real Mermaid backend.

use std::sync::Arc;
use std::time::Duration;

use conceptcraft::coordinator::{RenderCommit, RenderCoordinator};
use conceptcraft::export::{self, DirectorySink, ExportFormat};
use conceptcraft::renderer::MermaidRenderer;
use conceptcraft::surface::DisplaySurface;
use conceptcraft::view_state::ViewState;

const TIMEOUT: Duration = Duration::from_secs(30);

fn render(source: &str) -> (ViewState, DisplaySurface, RenderCommit) {
    let mut view = ViewState::new();
    view.set_diagram_source(source);
    let mut surface = DisplaySurface::new();
    let commit = RenderCoordinator::new(Arc::new(MermaidRenderer::new()))
        .render_blocking(&mut view, &mut surface, TIMEOUT)
        .unwrap();
    (view, surface, commit)
}

#[test]
fn test_flowchart_exports_svg_with_nodes_and_edge() {
    let (view, surface, commit) = render("graph TD\nA-->B");
    assert!(matches!(commit, RenderCommit::Rendered(_)), "{commit:?}");
    assert_eq!(view.last_error(), None);

    let dir = tempfile::tempdir().unwrap();
    let path = export::export(&surface, ExportFormat::Svg, &DirectorySink::new(dir.path())).unwrap();
    let svg = std::fs::read_to_string(path).unwrap();
    let doc = roxmltree::Document::parse(&svg).unwrap();

    let root = doc.root_element();
    assert!(root.has_tag_name("svg"));
    assert_eq!(root.attribute("id"), Some("mermaid-0"));

    let labels: Vec<String> = doc
        .descendants()
        .filter(|n| n.has_tag_name("text"))
        .map(|n| {
            n.descendants()
                .filter(roxmltree::Node::is_text)
                .filter_map(|d| d.text())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .collect();
    assert!(labels.iter().any(|l| l == "A"), "labels: {labels:?}");
    assert!(labels.iter().any(|l| l == "B"), "labels: {labels:?}");

    let edges = doc
        .descendants()
        .filter(|n| n.has_tag_name("path") && n.attribute("fill") == Some("none"))
        .count();
    assert!(edges >= 1, "expected an edge path");
}

#[test]
fn test_flowchart_exports_png() {
    let (_, surface, _) = render("graph LR\nA-->B\nB-->C");
    let dir = tempfile::tempdir().unwrap();
    let path = export::export(&surface, ExportFormat::Png, &DirectorySink::new(dir.path())).unwrap();
    let image = image::open(path).unwrap();
    assert!(image.width() > 0 && image.height() > 0);
}

#[test]
fn test_unknown_diagram_falls_back() {
    let (view, surface, commit) = render("not a diagram");
    assert!(matches!(commit, RenderCommit::Failed { .. }));
    assert!(view.last_error().is_some());
    assert_eq!(surface.text_content(), "not a diagram");
}
