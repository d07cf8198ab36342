use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::Model;

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let lines = vec![
        Line::styled("Controls", section_style),
        Line::raw("  Tab / Shift-Tab     Next / previous control"),
        Line::raw("  Left/Right          Change theme, font size, font family"),
        Line::raw("  Enter               Apply custom theme or line color"),
        Line::raw(""),
        Line::styled("Diagram source", section_style),
        Line::raw("  Type to edit        Preview updates automatically"),
        Line::raw("  Ctrl-s              Save to file"),
        Line::raw("  Ctrl-w              Toggle watch"),
        Line::raw(""),
        Line::styled("Layout", section_style),
        Line::raw("  Ctrl-b              Collapse / expand controls"),
        Line::raw("  Ctrl-Left/Right     Narrow / widen controls"),
        Line::raw("  Drag divider        Resize controls"),
        Line::raw(""),
        Line::styled("Export", section_style),
        Line::raw(format!(
            "  Ctrl-e / Ctrl-p     Save SVG / PNG to {}",
            model.out_dir.display()
        )),
        Line::raw("  F5                  Re-render"),
        Line::raw(""),
        Line::styled("Other", section_style),
        Line::raw("  F1                  Toggle help"),
        Line::raw("  Esc / Ctrl-q        Quit"),
        Line::raw(""),
        Line::styled(format!("Config: {global_cfg}"), dim_style),
        Line::styled(format!("Local:  {local_cfg}"), dim_style),
    ];

    let help = Paragraph::new(lines)
        .block(Block::default().title(" Help ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, popup);
    frame.render_widget(help, popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
