use ropey::Rope;
use unicode_width::UnicodeWidthChar;

/// Caret position. `col` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
    /// Column to return to when moving vertically through shorter lines.
    sticky_col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            sticky_col: col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Rope-backed editor for the diagram source text.
///
/// Every mutating call bumps [`SourceEditor::version`], so callers can tell
/// whether the text changed without comparing strings.
pub struct SourceEditor {
    rope: Rope,
    cursor: Cursor,
    scroll: usize,
    version: u64,
    dirty: bool,
}

impl SourceEditor {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
            scroll: 0,
            version: 0,
            dirty: false,
        }
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub const fn scroll(&self) -> usize {
        self.scroll
    }

    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Whether the text differs from the last load or save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its line ending.
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(idx).to_string();
        while text.ends_with(['\n', '\r']) {
            text.pop();
        }
        Some(text)
    }

    fn line_chars(&self, idx: usize) -> usize {
        self.line(idx).map_or(0, |line| line.chars().count())
    }

    /// Replace the whole text, keeping the cursor as close as possible to
    /// where it was. Used when the file changes on disk.
    pub fn replace_text(&mut self, text: &str) {
        if self.rope == text {
            return;
        }
        self.rope = Rope::from_str(text);
        let line = self.cursor.line.min(self.rope.len_lines().saturating_sub(1));
        let col = self.cursor.col.min(self.line_chars(line));
        self.cursor = Cursor::at(line, col);
        self.version += 1;
        self.dirty = false;
    }

    pub fn insert_char(&mut self, ch: char) {
        let idx = self.char_index();
        self.rope.insert_char(idx, ch);
        if ch == '\n' {
            self.cursor = Cursor::at(self.cursor.line + 1, 0);
        } else {
            self.cursor = Cursor::at(self.cursor.line, self.cursor.col + 1);
        }
        self.touch();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Insert text (e.g. a paste), leaving the cursor after it.
    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let start = self.char_index();
        self.rope.insert(start, text);
        self.place_cursor_at_char(start + text.chars().count());
        self.touch();
    }

    /// Backspace. Returns `false` at the start of the buffer.
    pub fn backspace(&mut self) -> bool {
        let idx = self.char_index();
        if idx == 0 {
            return false;
        }
        self.rope.remove(idx - 1..idx);
        self.place_cursor_at_char(idx - 1);
        self.touch();
        true
    }

    /// Delete. Returns `false` at the end of the buffer.
    pub fn delete(&mut self) -> bool {
        let idx = self.char_index();
        if idx >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(idx..=idx);
        self.touch();
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                let idx = self.char_index();
                if idx > 0 {
                    self.place_cursor_at_char(idx - 1);
                }
            }
            Direction::Right => {
                let idx = self.char_index();
                if idx < self.rope.len_chars() {
                    self.place_cursor_at_char(idx + 1);
                }
            }
            Direction::Up if self.cursor.line > 0 => self.move_vertically(self.cursor.line - 1),
            Direction::Down if self.cursor.line + 1 < self.line_count() => {
                self.move_vertically(self.cursor.line + 1);
            }
            Direction::Up | Direction::Down => {}
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = Cursor::at(self.cursor.line, 0);
    }

    pub fn move_end(&mut self) {
        self.cursor = Cursor::at(self.cursor.line, self.line_chars(self.cursor.line));
    }

    /// Terminal column of the cursor within its line, accounting for wide
    /// characters.
    pub fn cursor_display_col(&self) -> usize {
        self.line(self.cursor.line)
            .unwrap_or_default()
            .chars()
            .take(self.cursor.col)
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    /// Adjust the scroll offset so the cursor line is inside a viewport of
    /// `height` lines.
    pub const fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor.line < self.scroll {
            self.scroll = self.cursor.line;
        } else if self.cursor.line >= self.scroll + height {
            self.scroll = self.cursor.line + 1 - height;
        }
    }

    fn move_vertically(&mut self, line: usize) {
        let col = self.cursor.sticky_col.min(self.line_chars(line));
        self.cursor = Cursor {
            line,
            col,
            sticky_col: self.cursor.sticky_col,
        };
    }

    fn char_index(&self) -> usize {
        let line = self.cursor.line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col.min(self.line_chars(line))
    }

    fn place_cursor_at_char(&mut self, idx: usize) {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        self.cursor = Cursor::at(line, idx - self.rope.line_to_char(line));
    }

    const fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }
}

impl std::fmt::Debug for SourceEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceEditor")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .field("version", &self.version)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_editor_is_clean_at_origin() {
        let editor = SourceEditor::new("graph TD\nA-->B");
        assert_eq!(editor.cursor(), Cursor::at(0, 0));
        assert!(!editor.is_dirty());
        assert_eq!(editor.line_count(), 2);
        assert_eq!(editor.line(1).as_deref(), Some("A-->B"));
        assert_eq!(editor.line(2), None);
    }

    #[test]
    fn test_typing_bumps_version_and_marks_dirty() {
        let mut editor = SourceEditor::new("");
        for ch in "graph".chars() {
            editor.insert_char(ch);
        }
        assert_eq!(editor.text(), "graph");
        assert_eq!(editor.version(), 5);
        assert!(editor.is_dirty());
        editor.mark_saved();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_newline_splits_line() {
        let mut editor = SourceEditor::new("graph TDA-->B");
        editor.cursor = Cursor::at(0, 8);
        editor.insert_newline();
        assert_eq!(editor.text(), "graph TD\nA-->B");
        assert_eq!(editor.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut editor = SourceEditor::new("ab\ncd");
        editor.cursor = Cursor::at(1, 0);
        assert!(editor.backspace());
        assert_eq!(editor.text(), "abcd");
        assert_eq!(editor.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_backspace_and_delete_at_bounds() {
        let mut editor = SourceEditor::new("x");
        assert!(!editor.backspace());
        editor.move_end();
        assert!(!editor.delete());
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_multibyte_characters_are_single_columns() {
        let mut editor = SourceEditor::new("A[Café]");
        editor.move_end();
        editor.move_cursor(Direction::Left);
        editor.move_cursor(Direction::Left);
        assert!(editor.backspace());
        assert_eq!(editor.text(), "A[Caé]");
        editor.insert_char('f');
        assert_eq!(editor.text(), "A[Café]");
    }

    #[test]
    fn test_vertical_movement_remembers_column() {
        let mut editor = SourceEditor::new("long line\nab\nanother line");
        editor.cursor = Cursor::at(0, 8);
        editor.move_cursor(Direction::Down);
        assert_eq!(editor.cursor().col, 2);
        editor.move_cursor(Direction::Down);
        assert_eq!(editor.cursor(), Cursor::at(2, 8));
    }

    #[test]
    fn test_horizontal_movement_wraps_lines() {
        let mut editor = SourceEditor::new("ab\ncd");
        editor.move_end();
        editor.move_cursor(Direction::Right);
        assert_eq!(editor.cursor(), Cursor::at(1, 0));
        editor.move_cursor(Direction::Left);
        assert_eq!(editor.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_str_places_cursor_after_paste() {
        let mut editor = SourceEditor::new("graph TD\n");
        editor.cursor = Cursor::at(1, 0);
        editor.insert_str("A-->B\nB-->C");
        assert_eq!(editor.text(), "graph TD\nA-->B\nB-->C");
        assert_eq!(editor.cursor(), Cursor::at(2, 5));
    }

    #[test]
    fn test_replace_text_clamps_cursor_and_resets_dirty() {
        let mut editor = SourceEditor::new("one\ntwo\nthree");
        editor.cursor = Cursor::at(2, 5);
        editor.insert_char('!');
        editor.replace_text("x");
        assert_eq!(editor.cursor(), Cursor::at(0, 1));
        assert!(!editor.is_dirty());

        let version = editor.version();
        editor.replace_text("x");
        assert_eq!(editor.version(), version);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let text = (0..20).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut editor = SourceEditor::new(&text);
        editor.cursor = Cursor::at(12, 0);
        editor.scroll_to_cursor(5);
        assert_eq!(editor.scroll(), 8);
        editor.cursor = Cursor::at(3, 0);
        editor.scroll_to_cursor(5);
        assert_eq!(editor.scroll(), 3);
    }

    #[test]
    fn test_cursor_display_col_counts_wide_chars() {
        let mut editor = SourceEditor::new("A[漢字]");
        editor.move_end();
        assert_eq!(editor.cursor().col, 5);
        assert_eq!(editor.cursor_display_col(), 7);
    }
}
