use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line edit buffer. `cursor` counts chars, not bytes.
#[derive(Clone, Debug, Default)]
pub(super) struct Input {
    pub(super) buf: String,
    pub(super) cursor: usize,
}

impl Input {
    pub(super) fn with_value(s: &str) -> Self {
        let mut input = Input::default();
        input.set(s.to_string());
        input
    }

    pub(super) fn value(&self) -> &str {
        &self.buf
    }

    pub(super) fn len(&self) -> usize {
        self.buf.chars().count()
    }

    pub(super) fn set(&mut self, s: String) {
        self.buf = s;
        self.cursor = self.len();
    }

    fn byte_at(&self, cursor: usize) -> usize {
        self.buf
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.buf.len())
    }

    pub(super) fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.buf.insert(at, c);
        self.cursor += 1;
    }

    pub(super) fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_at(self.cursor);
        self.buf.remove(at);
    }

    pub(super) fn delete(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let at = self.byte_at(self.cursor);
        self.buf.remove(at);
    }

    pub(super) fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(super) fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    /// Applies an editing key; returns false for keys it does not handle.
    pub(super) fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => {
                    self.cursor = 0;
                    true
                }
                KeyCode::Char('e') => {
                    self.cursor = self.len();
                    true
                }
                KeyCode::Char('u') => {
                    self.set(String::new());
                    true
                }
                _ => false,
            };
        }
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }

    /// Display text, masked with `*` when `secret`, with the cursor marker
    /// spliced in when `show_cursor`.
    pub(super) fn render(&self, secret: bool, show_cursor: bool) -> String {
        let shown: Vec<char> = if secret {
            std::iter::repeat_n('*', self.len()).collect()
        } else {
            self.buf.chars().collect()
        };
        if !show_cursor {
            return shown.into_iter().collect();
        }
        let mut out: String = shown[..self.cursor.min(shown.len())].iter().collect();
        out.push_str(super::CURSOR);
        out.extend(shown.iter().skip(self.cursor + 1));
        out
    }
}
