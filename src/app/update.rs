use std::path::PathBuf;

use crate::app::model::Focus;
use crate::app::{Model, ToastLevel};
use crate::editor::Direction;
use crate::export::ExportFormat;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Source editing
    EditorInsert(char),
    EditorNewline,
    EditorBackspace,
    EditorDelete,
    EditorMove(Direction),
    EditorHome,
    EditorEnd,
    EditorPaste(String),

    // Controls
    FocusNext,
    FocusPrev,
    NextTheme,
    PrevTheme,
    FontSizeUp,
    FontSizeDown,
    NextFontFamily,
    PrevFontFamily,
    /// Character typed into the focused text field
    InputChar(char),
    InputBackspace,
    /// Apply the focused text field (custom theme or line color)
    ApplyInput,

    // Panel
    TogglePanel,
    /// Grow (positive) or shrink the panel by this many percent
    ResizePanel(i8),
    StartPanelDrag,
    /// Pointer moved to `column` of a `width`-column terminal while dragging
    DragPanel { column: u16, width: u16 },
    EndPanelDrag,

    // File
    FileChanged,
    SaveSource,
    ToggleWatch,

    // Render and export
    ForceRerender,
    Export(ExportFormat),
    /// A background export finished, with the written path or an error message
    ExportFinished {
        format: ExportFormat,
        outcome: Result<PathBuf, String>,
    },

    // Application
    Resize(u16, u16),
    ToggleHelp,
    HideHelp,
    Quit,
}

const FONT_SIZE_STEP: i64 = 1;

/// Pure state transition. IO and threads are handled by the side-effect
/// pass that runs after this.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::EditorInsert(ch) => {
            model.editor.insert_char(ch);
            model.sync_source_from_editor();
        }
        Message::EditorNewline => {
            model.editor.insert_newline();
            model.sync_source_from_editor();
        }
        Message::EditorBackspace => {
            if model.editor.backspace() {
                model.sync_source_from_editor();
            }
        }
        Message::EditorDelete => {
            if model.editor.delete() {
                model.sync_source_from_editor();
            }
        }
        Message::EditorMove(direction) => model.editor.move_cursor(direction),
        Message::EditorHome => model.editor.move_home(),
        Message::EditorEnd => model.editor.move_end(),
        Message::EditorPaste(text) => {
            model.editor.insert_str(&text);
            model.sync_source_from_editor();
        }

        Message::FocusNext => model.focus = model.focus.next(),
        Message::FocusPrev => model.focus = model.focus.prev(),
        Message::NextTheme => {
            let name = model.view.theme().base().next();
            model.view.set_theme_name(name);
        }
        Message::PrevTheme => {
            let name = model.view.theme().base().prev();
            model.view.set_theme_name(name);
        }
        Message::FontSizeUp => {
            model.view.adjust_font_size(FONT_SIZE_STEP);
        }
        Message::FontSizeDown => {
            model.view.adjust_font_size(-FONT_SIZE_STEP);
        }
        Message::NextFontFamily => {
            let family = model.view.font_family().next();
            model.view.set_font_family(family);
        }
        Message::PrevFontFamily => {
            let family = model.view.font_family().prev();
            model.view.set_font_family(family);
        }
        Message::InputChar(ch) => match model.focus {
            Focus::CustomTheme => model.theme_input.push(ch),
            Focus::LineColor => model.color_input.push(ch),
            _ => {}
        },
        Message::InputBackspace => match model.focus {
            Focus::CustomTheme => {
                model.theme_input.pop();
            }
            Focus::LineColor => {
                model.color_input.pop();
            }
            _ => {}
        },
        Message::ApplyInput => apply_input(&mut model),

        Message::TogglePanel => model.view.toggle_panel(),
        Message::ResizePanel(delta) => {
            model.view.resize_panel_by(f64::from(delta));
        }
        Message::StartPanelDrag => model.panel_dragging = true,
        Message::DragPanel { column, width } => {
            if model.panel_dragging {
                model
                    .view
                    .drag_panel_to(f64::from(column), f64::from(width));
            }
        }
        Message::EndPanelDrag => model.panel_dragging = false,

        Message::ToggleWatch => {
            if model.file_path.is_some() {
                model.watch_enabled = !model.watch_enabled;
            } else {
                model.show_toast(ToastLevel::Warning, "Nothing to watch: no source file");
            }
        }
        Message::ExportFinished { format, outcome } => {
            model.export_pending = None;
            match outcome {
                Ok(path) => {
                    model.show_toast(
                        ToastLevel::Info,
                        format!("Saved {format} to {}", path.display()),
                    );
                }
                Err(message) => {
                    model
                        .view
                        .set_error(format!("Error downloading diagram: {message}"));
                    model.show_toast(ToastLevel::Error, format!("{format} export failed"));
                }
            }
        }

        Message::Resize(width, height) => model.terminal_size = (width, height),
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Quit => model.should_quit = true,

        // Handled as side effects.
        Message::FileChanged
        | Message::SaveSource
        | Message::ForceRerender
        | Message::Export(_) => {}
    }
    model
}

fn apply_input(model: &mut Model) {
    match model.focus {
        Focus::CustomTheme => {
            let text = model.theme_input.trim().to_string();
            if text.is_empty() {
                let base = model.view.theme().base();
                model.view.set_theme_name(base);
                model.show_toast(ToastLevel::Info, format!("Theme: {base}"));
                return;
            }
            match model.view.set_custom_theme_text(&text) {
                Ok(()) => {
                    let label = model.view.theme().label();
                    model.show_toast(ToastLevel::Info, format!("Theme: {label}"));
                }
                Err(err) => model.show_toast(ToastLevel::Warning, format!("Theme not applied: {err}")),
            }
        }
        Focus::LineColor => {
            let text = model.color_input.trim().to_string();
            match model.view.set_line_color(&text) {
                Ok(()) => model.color_input = text,
                Err(err) => {
                    model.show_toast(ToastLevel::Warning, format!("Line color not applied: {err}"));
                }
            }
        }
        _ => {}
    }
}
