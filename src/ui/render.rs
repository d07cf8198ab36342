use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui_image::{Resize, StatefulImage};
use unicode_width::UnicodeWidthStr;

use crate::app::Model;
use crate::surface::SurfaceContent;
use crate::view_state::ViewState;

use super::{overlays, panel, status};

/// Width in columns of the control panel for a terminal `total_width`
/// wide, or 0 when collapsed.
pub fn panel_width_cols(total_width: u16, view: &ViewState) -> u16 {
    if view.panel_collapsed() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cols = (f64::from(total_width) * view.panel_width_percent() / 100.0).round() as u16;
    cols.clamp(1, total_width.max(1))
}

/// Split the main area into panel and preview columns.
pub fn split_columns(area: Rect, view: &ViewState) -> (Rect, Rect) {
    let panel = panel_width_cols(area.width, view).min(area.width);
    let [left, right] = Layout::horizontal([Constraint::Length(panel), Constraint::Min(0)]).areas(area);
    (left, right)
}

/// Column of the panel's right border, which acts as the drag handle.
pub fn panel_divider_column(total_width: u16, view: &ViewState) -> Option<u16> {
    let cols = panel_width_cols(total_width, view);
    (cols > 0).then(|| cols - 1)
}

fn main_area(area: Rect) -> (Rect, Rect) {
    let [main, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    (main, status)
}

/// Inner area the diagram image is drawn into.
pub fn preview_area(area: Rect, view: &ViewState) -> Rect {
    let (main, _) = main_area(area);
    let (_, preview) = split_columns(main, view);
    preview_block(view).inner(preview)
}

fn preview_block(view: &ViewState) -> Block<'static> {
    let title = if view.panel_collapsed() {
        " Preview (Ctrl-b: show controls) "
    } else {
        " Preview "
    };
    Block::default().title(title).borders(Borders::ALL)
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let (main, status_area) = main_area(area);
    let (panel_area, preview_area) = split_columns(main, &model.view);

    if panel_area.width > 0 {
        panel::render_panel(model, frame, panel_area);
    }
    render_preview(model, frame, preview_area);

    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, status_area);
    } else {
        status::render_status_bar(model, frame, status_area);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_preview(model: &mut Model, frame: &mut Frame, area: Rect) {
    let block = preview_block(&model.view);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut body = inner;
    if let Some(error) = model.view.last_error() {
        let banner = Paragraph::new(error.to_string())
            .style(Style::default().bg(Color::Red).fg(Color::White))
            .wrap(Wrap { trim: false });
        let wrapped = error.width().div_ceil(usize::from(inner.width.max(1)));
        let rows = u16::try_from(wrapped)
            .unwrap_or(u16::MAX)
            .clamp(1, inner.height.max(1));
        let [top, rest] =
            Layout::vertical([Constraint::Length(rows), Constraint::Min(0)]).areas(inner);
        frame.render_widget(banner, top);
        body = rest;
    }

    match model.surface.content() {
        None => {
            let waiting = Paragraph::new("Rendering...")
                .style(Style::default().fg(Color::Indexed(245)));
            frame.render_widget(waiting, body);
        }
        Some(SurfaceContent::Preformatted(text)) => {
            let fallback = Paragraph::new(text.clone()).style(Style::default().fg(Color::Gray));
            frame.render_widget(fallback, body);
        }
        Some(SurfaceContent::Markup(_)) => {
            if let Some(preview) = model.preview.as_mut() {
                let height = preview.height_rows.min(body.height);
                let image_area = Rect::new(body.x, body.y, body.width, height);
                frame.render_stateful_widget(
                    StatefulImage::default().resize(Resize::Scale(None)),
                    image_area,
                    &mut preview.protocol,
                );
            } else {
                let note = Paragraph::new("Diagram rendered (no terminal preview available)")
                    .style(Style::default().fg(Color::Indexed(245)));
                frame.render_widget(note, body);
            }
        }
    }
}
