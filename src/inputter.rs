use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Line-editor state for the search box and form fields.
/// Owns the buffer and a char-based cursor; rendering is up to the UI.
#[derive(Debug, Default, Clone)]
pub struct Inputter {
    value: String,
    cursor: usize,
}

/// Snapshot handed back after each key press.
#[derive(Debug, Default, Clone)]
pub struct InputResult {
    pub value: String,
    pub cursor: usize,
    pub finished: bool,
    pub canceled: bool,
}

impl Inputter {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.result(true, false),
            (KeyCode::Esc, KeyModifiers::NONE) => self.result(true, true),
            (KeyCode::Backspace, KeyModifiers::NONE) => {
                self.backspace();
                self.result(false, false)
            }
            (KeyCode::Left, KeyModifiers::NONE) => {
                self.cursor = self.cursor.saturating_sub(1);
                self.result(false, false)
            }
            (KeyCode::Right, KeyModifiers::NONE) => {
                self.cursor = std::cmp::min(self.cursor + 1, self.value.chars().count());
                self.result(false, false)
            }
            (KeyCode::Home, KeyModifiers::NONE) => {
                self.cursor = 0;
                self.result(false, false)
            }
            (KeyCode::End, KeyModifiers::NONE) => {
                self.cursor = self.value.chars().count();
                self.result(false, false)
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert(c);
                self.result(false, false)
            }
            _ => self.result(false, false),
        }
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_pos(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_pos(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }

    fn result(&self, finished: bool, canceled: bool) -> InputResult {
        InputResult {
            value: self.value.clone(),
            cursor: self.cursor,
            finished,
            canceled,
        }
    }
}
