use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line text editor used for deck names, the source filter, and the
/// server URL setting.
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        let cursor = text.chars().count();
        Self {
            text: text.to_string(),
            cursor,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled
    /// rendering. When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        if self.cursor >= self.text.chars().count() {
            (&self.text, None, "")
        } else {
            let ch = self.text[byte_offset..].chars().next().unwrap();
            let next_byte = byte_offset + ch.len_utf8();
            (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,

            KeyCode::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Right => {
                let len = self.text.chars().count();
                if self.cursor < len {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = self.text.chars().count();
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let byte_offset = self.char_to_byte(self.cursor - 1);
                    let ch = self.text[byte_offset..].chars().next().unwrap();
                    self.text
                        .replace_range(byte_offset..byte_offset + ch.len_utf8(), "");
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                let len = self.text.chars().count();
                if self.cursor < len {
                    let byte_offset = self.char_to_byte(self.cursor);
                    let ch = self.text[byte_offset..].chars().next().unwrap();
                    self.text
                        .replace_range(byte_offset..byte_offset + ch.len_utf8(), "");
                }
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = 0;
            }
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = self.text.chars().count();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.delete_word_back();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let byte_offset = self.char_to_byte(self.cursor);
                self.text.insert(byte_offset, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    /// Delete word before cursor (unix-word-rubout: skip whitespace, then
    /// non-whitespace).
    fn delete_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;

        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }

        let start_byte = self.char_to_byte(pos);
        let end_byte = self.char_to_byte(self.cursor);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = pos;
    }
}
