use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model
        .file_path
        .as_ref()
        .and_then(|path| path.file_name())
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());
    let modified = if model.editor.is_dirty() { " [+]" } else { "" };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let export_indicator = model
        .export_pending
        .map(|format| format!(" [exporting {format}]"))
        .unwrap_or_default();
    let view = &model.view;

    let status = format!(
        " {filename}{modified}  {} | {}px {}{watch_indicator}{export_indicator}  F1:help",
        view.theme().label(),
        view.font_size_px(),
        view.font_family().label(),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
