use super::*;
use crate::app::{Focus, Model};
use crate::view_state::ViewState;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui_image::picker::Picker;

const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="60"><rect width="120" height="60" fill="#0000ff"/></svg>"##;

fn create_test_terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(100, 30)).unwrap()
}

fn draw(model: &mut Model) -> String {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for row in 0..buffer.area.height {
        for col in 0..buffer.area.width {
            text.push_str(buffer[(col, row)].symbol());
        }
        text.push('\n');
    }
    text
}

fn test_model() -> Model {
    Model::new(ViewState::new(), None, (100, 30))
}

#[test]
fn test_panel_width_follows_percent() {
    let mut view = ViewState::new();
    assert_eq!(panel_width_cols(100, &view), 25);
    view.set_panel_width(50.0);
    assert_eq!(panel_width_cols(100, &view), 50);
    view.toggle_panel();
    assert_eq!(panel_width_cols(100, &view), 0);
    assert_eq!(panel_divider_column(100, &view), None);
}

#[test]
fn test_divider_is_last_panel_column() {
    let view = ViewState::new();
    assert_eq!(panel_divider_column(80, &view), Some(19));
}

#[test]
fn test_collapsed_panel_gives_preview_full_width() {
    let mut view = ViewState::new();
    let area = Rect::new(0, 0, 100, 30);
    let expanded = preview_area(area, &view);
    view.set_panel_collapsed(true);
    let collapsed = preview_area(area, &view);
    assert_eq!(collapsed.width, 98);
    assert!(expanded.width < collapsed.width);
    assert_eq!(collapsed.height, 27);
}

#[test]
fn test_render_shows_source_and_controls() {
    let mut model = test_model();
    let screen = draw(&mut model);
    assert!(screen.contains("Controls"));
    assert!(screen.contains("graph TD"));
    assert!(screen.contains("Theme: < Default >"));
    assert!(screen.contains("Font size: < 14px >"));
    assert!(screen.contains("Rendering..."));
}

#[test]
fn test_render_hides_controls_when_collapsed() {
    let mut model = test_model();
    model.view.toggle_panel();
    let screen = draw(&mut model);
    assert!(!screen.contains("Controls"));
    assert!(screen.contains("Ctrl-b: show controls"));
}

#[test]
fn test_render_shows_error_banner_and_fallback_text() {
    let mut model = test_model();
    model
        .view
        .set_error("Error rendering diagram: No diagram type detected");
    model.surface.show_fallback("not a diagram".to_string());
    let screen = draw(&mut model);
    assert!(screen.contains("Error rendering diagram"));
    assert!(screen.contains("not a diagram"));
}

#[test]
fn test_font_size_marked_unused_for_sequence_diagrams() {
    let mut model = test_model();
    model.view.set_panel_width(50.0);
    model.view.set_diagram_source("sequenceDiagram\nA->>B: hi");
    let screen = draw(&mut model);
    assert!(screen.contains("(not used by this diagram)"));
}

#[test]
fn test_focused_text_field_shows_input_caret() {
    let mut model = test_model();
    model.focus = Focus::LineColor;
    model.color_input = "#ff0000".to_string();
    let screen = draw(&mut model);
    assert!(screen.contains("Line color: #ff0000_"));
}

#[test]
fn test_help_overlay_lists_export_keys() {
    let mut model = test_model();
    model.help_visible = true;
    let screen = draw(&mut model);
    assert!(screen.contains("Help"));
    assert!(screen.contains("Save SVG / PNG"));
}

#[test]
fn test_rendered_diagram_draws_preview_image() {
    let mut model = test_model().with_picker(Some(Picker::halfblocks()));
    model.view.set_panel_collapsed(true);
    model.surface.show_markup(SQUARE.to_string());
    let area = preview_area(Rect::new(0, 0, 100, 30), &model.view);
    model.refresh_preview(area.width);
    assert!(model.preview.is_some());

    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&mut model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let blue = (0..buffer.area.height)
        .flat_map(|row| (0..buffer.area.width).map(move |col| (col, row)))
        .any(|pos| {
            let cell = &buffer[pos];
            matches!(cell.fg, ratatui::style::Color::Rgb(0, 0, 255))
                || matches!(cell.bg, ratatui::style::Color::Rgb(0, 0, 255))
        });
    assert!(blue, "preview should draw the diagram's blue fill");
}

#[test]
fn test_preview_dropped_when_surface_shows_fallback() {
    let mut model = test_model().with_picker(Some(Picker::halfblocks()));
    model.surface.show_markup(SQUARE.to_string());
    model.refresh_preview(40);
    assert!(model.preview.is_some());
    model.surface.show_fallback("oops".to_string());
    model.refresh_preview(40);
    assert!(model.preview.is_none());
}

#[test]
fn test_status_bar_shows_file_and_help() {
    let mut model = test_model();
    let screen = draw(&mut model);
    assert!(screen.contains("untitled"));
    assert!(screen.contains("F1:help"));
}
