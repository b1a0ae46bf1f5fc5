// Query Editor Module
//
// A single-line text buffer with a cursor. It backs the statement box and
// every prompt the shell opens (file path, cell value, new row values).
// The cursor counts characters, not bytes, so multi-byte input is safe.

#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryEditor {
    buffer: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
}

impl QueryEditor {
    /// Creates a new instance of QueryEditor.
    pub fn new() -> Self {
        QueryEditor::default()
    }

    /// Creates an editor pre-filled with `text`, cursor at the end.
    pub fn with_text(text: &str) -> Self {
        let mut editor = QueryEditor::new();
        editor.set_text(text);
        editor
    }

    /// Sets the text in the editor and moves the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.chars().count();
    }

    /// Returns the current text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Clears the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.history_index = None;
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.buffer.remove(at);
        }
    }

    /// Deletes the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let at = self.byte_offset(self.cursor);
            self.buffer.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Takes the trimmed text for execution, remembering it in the history.
    ///
    /// Returns `None` for blank input. The buffer keeps its text so the
    /// statement can be edited and re-run.
    pub fn submit(&mut self) -> Option<String> {
        let statement = self.buffer.trim().to_string();
        if statement.is_empty() {
            return None;
        }
        if self.history.last() != Some(&statement) {
            self.history.push(statement.clone());
        }
        self.history_index = None;
        Some(statement)
    }

    /// Replaces the buffer with the previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            Some(i) => i.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_index = Some(index);
        let entry = self.history[index].clone();
        self.set_text(&entry);
    }

    /// Moves forward in the history; past the newest entry the buffer empties.
    pub fn history_next(&mut self) {
        match self.history_index {
            Some(i) if i + 1 < self.history.len() => {
                self.history_index = Some(i + 1);
                let entry = self.history[i + 1].clone();
                self.set_text(&entry);
            }
            Some(_) => {
                self.history_index = None;
                self.buffer.clear();
                self.cursor = 0;
            }
            None => {}
        }
    }
}
