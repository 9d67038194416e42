/// Minimal line-based text editor backing every form field: single-line
/// fields simply never receive a newline. Cursor positions are character
/// indices, not byte offsets.
#[derive(Debug, Clone)]
pub struct Editor {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    /// Create an editor pre-filled with text, cursor at the end.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = if text.is_empty() {
            vec![String::new()]
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        let cursor_row = lines.len() - 1;
        let cursor_col = lines[cursor_row].chars().count();
        Self {
            lines,
            cursor_row,
            cursor_col,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// (row, column) of the cursor in character units.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn current_line(&self) -> &String {
        &self.lines[self.cursor_row]
    }

    fn byte_index(line: &str, char_col: usize) -> usize {
        line.char_indices()
            .nth(char_col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let col = self.cursor_col;
        let line = &mut self.lines[self.cursor_row];
        let idx = Self::byte_index(line, col);
        line.insert(idx, c);
        self.cursor_col += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.insert_newline();
            } else {
                self.insert_char(c);
            }
        }
    }

    pub fn insert_newline(&mut self) {
        let col = self.cursor_col;
        let line = &mut self.lines[self.cursor_row];
        let idx = Self::byte_index(line, col);
        let rest = line.split_off(idx);
        self.lines.insert(self.cursor_row + 1, rest);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let col = self.cursor_col - 1;
            let line = &mut self.lines[self.cursor_row];
            let idx = Self::byte_index(line, col);
            line.remove(idx);
            self.cursor_col = col;
        } else if self.cursor_row > 0 {
            // Join with the previous line
            let removed = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].chars().count();
            self.lines[self.cursor_row].push_str(&removed);
        }
    }

    pub fn delete(&mut self) {
        let len = self.current_line().chars().count();
        if self.cursor_col < len {
            let col = self.cursor_col;
            let line = &mut self.lines[self.cursor_row];
            let idx = Self::byte_index(line, col);
            line.remove(idx);
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.current_line().chars().count();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.current_line().chars().count() {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.cursor_col.min(self.current_line().chars().count());
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = self.cursor_col.min(self.current_line().chars().count());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.current_line().chars().count();
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor_row = 0;
        self.cursor_col = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace() {
        let mut editor = Editor::new();
        editor.insert_str("Rex");
        assert_eq!(editor.text(), "Rex");
        editor.backspace();
        assert_eq!(editor.text(), "Re");
        assert_eq!(editor.cursor(), (0, 2));
    }

    #[test]
    fn newline_splits_and_backspace_rejoins() {
        let mut editor = Editor::from_text("walk notes");
        editor.move_home();
        for _ in 0..4 {
            editor.move_right();
        }
        editor.insert_newline();
        assert_eq!(editor.text(), "walk\n notes");
        editor.backspace();
        assert_eq!(editor.text(), "walk notes");
        assert_eq!(editor.cursor(), (0, 4));
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut editor = Editor::from_text("héllo");
        editor.backspace();
        editor.backspace();
        assert_eq!(editor.text(), "hél");
        editor.insert_char('🐕');
        assert_eq!(editor.text(), "hél🐕");
    }

    #[test]
    fn from_text_places_cursor_at_end() {
        let editor = Editor::from_text("a\nbc");
        assert_eq!(editor.cursor(), (1, 2));
        assert!(!editor.is_empty());
        assert!(Editor::new().is_empty());
    }
}
