//! Single-line question input: buffer, cursor, focus, and key editing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    /// Cursor position in characters (not bytes).
    cursor: usize,
    focused: bool,
    limit: usize,
}

impl TextInput {
    /// Focused, empty input accepting at most `limit` characters.
    pub fn new(limit: usize) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            focused: true,
            limit,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Clear the buffer, keeping focus as is.
    pub fn reset(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Take the buffer contents, leaving the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, c: char) {
        if self.len() >= self.limit {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Apply an editing key. Returns false when the key is not an editing key.
    /// Ignored while blurred.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if !self.focused {
            return false;
        }
        match key.code {
            // Ctrl/Alt+letter is a shortcut, not text
            KeyCode::Char(_)
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                false
            }
            KeyCode::Char(c) => {
                self.insert(c);
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_offset(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.len();
                true
            }
            _ => false,
        }
    }

    /// The slice of characters visible in a field `width` cells wide, scrolled so the
    /// cursor cell stays in view, plus the cursor column within that window.
    pub fn window(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        let offset = (self.cursor + 1).saturating_sub(width);
        let visible: String = self.value.chars().skip(offset).take(width).collect();
        (visible, self.cursor - offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::new(200);
        for c in text.chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        input
    }

    #[test]
    fn typing_appends_at_cursor() {
        let mut input = typed("why");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Char('!')));
        assert_eq!(input.value(), "wh!y");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn backspace_and_delete_remove_around_cursor() {
        let mut input = typed("héllo");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value(), "éllo");
        input.handle_key(key(KeyCode::End));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "éll");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "éll");
    }

    #[test]
    fn respects_char_limit() {
        let mut input = TextInput::new(3);
        for c in "abcdef".chars() {
            input.insert(c);
        }
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn blurred_input_ignores_keys() {
        let mut input = typed("hi");
        input.blur();
        assert!(!input.handle_key(key(KeyCode::Char('x'))));
        assert_eq!(input.value(), "hi");
    }

    #[test]
    fn control_chars_are_not_text() {
        let mut input = TextInput::new(10);
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn take_empties_buffer() {
        let mut input = typed("why?");
        assert_eq!(input.take(), "why?");
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn window_scrolls_to_keep_cursor_visible() {
        let input = typed("abcdefgh");
        let (visible, col) = input.window(4);
        assert_eq!(visible, "fgh");
        assert_eq!(col, 3);

        let short = typed("ab");
        assert_eq!(short.window(4), ("ab".to_string(), 2));
    }
}
