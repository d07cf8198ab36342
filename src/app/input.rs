use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::model::Focus;
use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::export::ExportFormat;

use super::event_loop::ResizeDebouncer;

/// Percent the panel grows or shrinks per Ctrl+Left/Right.
const PANEL_STEP: i8 = 2;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) if model.focus == Focus::Source => {
                Some(Message::EditorPaste(text.replace("\r\n", "\n")))
            }
            Event::Resize(width, height) => {
                crate::perf::log_event(
                    "event.resize.queue",
                    format!("width={width} height={height}"),
                );
                resize_debouncer.queue(*width, *height, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => Some(Message::HideHelp),
                _ => None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl {
            return match key.code {
                KeyCode::Char('q' | 'c') => Some(Message::Quit),
                KeyCode::Char('b') => Some(Message::TogglePanel),
                KeyCode::Char('s') => Some(Message::SaveSource),
                KeyCode::Char('e') => Some(Message::Export(ExportFormat::Svg)),
                KeyCode::Char('p') => Some(Message::Export(ExportFormat::Png)),
                KeyCode::Char('w') => Some(Message::ToggleWatch),
                KeyCode::Left => Some(Message::ResizePanel(-PANEL_STEP)),
                KeyCode::Right => Some(Message::ResizePanel(PANEL_STEP)),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => return Some(Message::Quit),
            KeyCode::Tab => return Some(Message::FocusNext),
            KeyCode::BackTab => return Some(Message::FocusPrev),
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::F(5) => return Some(Message::ForceRerender),
            _ => {}
        }

        // Controls are hidden while the panel is collapsed.
        if model.view.panel_collapsed() {
            return None;
        }

        match model.focus {
            Focus::Source => Self::handle_source_key(key),
            Focus::Theme => match key.code {
                KeyCode::Left | KeyCode::Up => Some(Message::PrevTheme),
                KeyCode::Right | KeyCode::Down | KeyCode::Enter => Some(Message::NextTheme),
                _ => None,
            },
            Focus::FontSize => match key.code {
                KeyCode::Left | KeyCode::Down | KeyCode::Char('-') => Some(Message::FontSizeDown),
                KeyCode::Right | KeyCode::Up | KeyCode::Char('+' | '=') => {
                    Some(Message::FontSizeUp)
                }
                _ => None,
            },
            Focus::FontFamily => match key.code {
                KeyCode::Left | KeyCode::Up => Some(Message::PrevFontFamily),
                KeyCode::Right | KeyCode::Down | KeyCode::Enter => Some(Message::NextFontFamily),
                _ => None,
            },
            Focus::CustomTheme | Focus::LineColor => match key.code {
                KeyCode::Char(ch) => Some(Message::InputChar(ch)),
                KeyCode::Backspace => Some(Message::InputBackspace),
                KeyCode::Enter => Some(Message::ApplyInput),
                _ => None,
            },
        }
    }

    fn handle_source_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char(ch) => Some(Message::EditorInsert(ch)),
            KeyCode::Enter => Some(Message::EditorNewline),
            KeyCode::Backspace => Some(Message::EditorBackspace),
            KeyCode::Delete => Some(Message::EditorDelete),
            KeyCode::Left => Some(Message::EditorMove(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMove(Direction::Right)),
            KeyCode::Up => Some(Message::EditorMove(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMove(Direction::Down)),
            KeyCode::Home => Some(Message::EditorHome),
            KeyCode::End => Some(Message::EditorEnd),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.view.panel_collapsed() {
            return None;
        }
        let (width, _) = model.terminal_size;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let divider = crate::ui::panel_divider_column(width, &model.view)?;
                (mouse.column.abs_diff(divider) <= 1).then_some(Message::StartPanelDrag)
            }
            MouseEventKind::Drag(MouseButton::Left) if model.panel_dragging => {
                Some(Message::DragPanel {
                    column: mouse.column.saturating_add(1),
                    width,
                })
            }
            MouseEventKind::Up(MouseButton::Left) if model.panel_dragging => {
                Some(Message::EndPanelDrag)
            }
            _ => None,
        }
    }
}
