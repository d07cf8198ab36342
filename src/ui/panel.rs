use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{Focus, Model};
use crate::view_state::{FONT_SIZE_MAX, FONT_SIZE_MIN};

/// Rows taken by the option fields under the editor.
const FIELD_ROWS: u16 = 5;

fn focus_style(model: &Model, focus: Focus) -> Style {
    if model.focus == focus {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

pub fn render_panel(model: &mut Model, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(if model.panel_dragging {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [editor_area, fields_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(FIELD_ROWS)]).areas(inner);
    render_editor(model, frame, editor_area);
    render_fields(model, frame, fields_area);
}

fn render_editor(model: &mut Model, frame: &mut Frame, area: Rect) {
    let title_style = focus_style(model, Focus::Source);
    let [title_area, text_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
    let dirty = if model.editor.is_dirty() { " [+]" } else { "" };
    frame.render_widget(
        Paragraph::new(format!("{}{dirty}", Focus::Source.label())).style(title_style),
        title_area,
    );

    let height = usize::from(text_area.height);
    model.editor.scroll_to_cursor(height);
    let scroll = model.editor.scroll();
    let lines: Vec<Line> = (scroll..scroll + height)
        .map_while(|idx| model.editor.line(idx))
        .map(Line::raw)
        .collect();
    frame.render_widget(Paragraph::new(lines), text_area);

    if model.focus == Focus::Source && !model.help_visible {
        let cursor = model.editor.cursor();
        let row = cursor.line.saturating_sub(scroll);
        let col = model.editor.cursor_display_col();
        if let (Ok(row), Ok(col)) = (u16::try_from(row), u16::try_from(col))
            && row < text_area.height
            && col < text_area.width
        {
            frame.set_cursor_position((text_area.x + col, text_area.y + row));
        }
    }
}

fn render_fields(model: &Model, frame: &mut Frame, area: Rect) {
    let view = &model.view;
    let size_note = if view.font_size_honored() {
        String::new()
    } else {
        " (not used by this diagram)".to_string()
    };
    let custom_text = if model.focus == Focus::CustomTheme {
        format!("{}_", model.theme_input)
    } else if model.theme_input.is_empty() {
        "{ primaryColor: ... }".to_string()
    } else {
        model.theme_input.clone()
    };
    let color_text = if model.focus == Focus::LineColor {
        format!("{}_", model.color_input)
    } else {
        view.line_color().to_string()
    };

    let size_style = if view.font_size_honored() {
        focus_style(model, Focus::FontSize)
    } else {
        focus_style(model, Focus::FontSize).add_modifier(Modifier::DIM)
    };

    let rows = vec![
        Line::styled(
            format!("{}: < {} >", Focus::Theme.label(), view.theme().label()),
            focus_style(model, Focus::Theme),
        ),
        Line::styled(
            format!("{}: {custom_text}", Focus::CustomTheme.label()),
            focus_style(model, Focus::CustomTheme),
        ),
        Line::styled(
            format!(
                "{}: < {}px >{size_note} [{FONT_SIZE_MIN}-{FONT_SIZE_MAX}]",
                Focus::FontSize.label(),
                view.font_size_px()
            ),
            size_style,
        ),
        Line::styled(
            format!("{}: < {} >", Focus::FontFamily.label(), view.font_family().label()),
            focus_style(model, Focus::FontFamily),
        ),
        Line::styled(
            format!("{}: {color_text}", Focus::LineColor.label()),
            focus_style(model, Focus::LineColor),
        ),
    ];
    frame.render_widget(Paragraph::new(rows), area);
}
