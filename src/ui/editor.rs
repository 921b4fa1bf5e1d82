//! Multi-line text input

use unicode_width::UnicodeWidthChar;

/// One screen row of wrapped text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Char index of the first char on the row
    pub start: usize,
    pub text: String,
}

/// Text broken into rows no wider than the text box
#[derive(Debug, Clone)]
pub struct Wrapped {
    pub rows: Vec<Row>,
    /// (row, display column) of the cursor
    pub cursor: (usize, u16),
}

/// Editable text with a cursor
///
/// The cursor is a char index into `text`, so it is always on a char
/// boundary.
#[derive(Debug, Default, Clone)]
pub struct TextEditor {
    text: String,
    cursor: usize,
}

impl TextEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Insert pasted text; carriage returns are dropped
    pub fn insert_str(&mut self, s: &str) {
        let cleaned: String = s.chars().filter(|&c| c != '\r').collect();
        let at = self.byte_offset(self.cursor);
        self.text.insert_str(at, &cleaned);
        self.cursor += cleaned.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.char_count() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    /// Start of the current line
    pub fn move_home(&mut self) {
        let before: Vec<char> = self.text.chars().take(self.cursor).collect();
        let line_start = before
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1);
        self.cursor = line_start;
    }

    /// End of the current line
    pub fn move_end(&mut self) {
        let rest = self.text.chars().skip(self.cursor).take_while(|&c| c != '\n');
        self.cursor += rest.count();
    }

    /// Lay the text out in rows of at most `width` columns
    ///
    /// Lines break at newlines and wherever the next char would not fit.
    pub fn wrapped(&self, width: u16) -> Wrapped {
        let width = usize::from(width.max(1));
        let mut rows = vec![Row {
            start: 0,
            text: String::new(),
        }];
        let mut row_width = 0;
        let mut cursor = None;

        for (i, c) in self.text.chars().enumerate() {
            if c == '\n' {
                if i == self.cursor {
                    cursor = Some((rows.len() - 1, row_width));
                }
                rows.push(Row {
                    start: i + 1,
                    text: String::new(),
                });
                row_width = 0;
                continue;
            }

            let w = c.width().unwrap_or(0);
            if row_width > 0 && row_width + w > width {
                rows.push(Row {
                    start: i,
                    text: String::new(),
                });
                row_width = 0;
            }
            if i == self.cursor {
                cursor = Some((rows.len() - 1, row_width));
            }
            let last = rows.len() - 1;
            rows[last].text.push(c);
            row_width += w;
        }

        // Cursor after the last char
        let (row, col) = cursor.unwrap_or_else(|| {
            if row_width >= width {
                rows.push(Row {
                    start: self.char_count(),
                    text: String::new(),
                });
                (rows.len() - 1, 0)
            } else {
                (rows.len() - 1, row_width)
            }
        });

        Wrapped {
            rows,
            cursor: (row, u16::try_from(col).unwrap_or(u16::MAX)),
        }
    }

    /// One row up in the layout wrapped at `width`
    pub fn move_up(&mut self, width: u16) {
        self.move_rows(width, false);
    }

    /// One row down in the layout wrapped at `width`
    pub fn move_down(&mut self, width: u16) {
        self.move_rows(width, true);
    }

    /// Keeps the display column where the target row is long enough.
    /// Past the first or last row the cursor goes to the start or end.
    fn move_rows(&mut self, width: u16, down: bool) {
        let layout = self.wrapped(width);
        let (row, col) = layout.cursor;
        let target = if down { Some(row + 1) } else { row.checked_sub(1) };

        let Some((index, target)) = target.and_then(|r| layout.rows.get(r).map(|row| (r, row)))
        else {
            self.cursor = if down { self.char_count() } else { 0 };
            return;
        };

        let mut used = 0;
        let mut offset = 0;
        for c in target.text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > usize::from(col) {
                break;
            }
            used += w;
            offset += 1;
        }

        // The end of a soft-wrapped row is drawn at the start of the next one
        let len = target.text.chars().count();
        let soft_wrapped = layout
            .rows
            .get(index + 1)
            .is_some_and(|next| next.start == target.start + len);
        if soft_wrapped && len > 0 {
            offset = offset.min(len - 1);
        }

        self.cursor = target.start + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut editor = TextEditor::new();
        for c in "helo".chars() {
            editor.insert_char(c);
        }
        editor.move_left();
        editor.insert_char('l');
        assert_eq!(editor.text(), "hello");
        assert_eq!(editor.cursor(), 4);

        editor.backspace();
        editor.backspace();
        assert_eq!(editor.text(), "heo");
        editor.delete();
        assert_eq!(editor.text(), "he");
        editor.delete();
        assert_eq!(editor.text(), "he");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut editor = TextEditor::new();
        editor.backspace();
        editor.move_left();
        assert_eq!(editor.text(), "");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn test_multibyte_text() {
        let mut editor = TextEditor::new();
        editor.insert_str("añb");
        editor.move_left();
        editor.backspace();
        assert_eq!(editor.text(), "ab");
        assert_eq!(editor.wrapped(80).cursor, (0, 1));
    }

    #[test]
    fn test_home_end_and_position() {
        let mut editor = TextEditor::new();
        editor.insert_str("first\r\nsecond");
        assert_eq!(editor.text(), "first\nsecond");
        assert_eq!(editor.wrapped(80).cursor, (1, 6));

        editor.move_home();
        assert_eq!(editor.wrapped(80).cursor, (1, 0));
        editor.move_left();
        assert_eq!(editor.wrapped(80).cursor, (0, 5));
        editor.move_home();
        assert_eq!(editor.cursor(), 0);
        editor.move_end();
        assert_eq!(editor.cursor(), 5);
    }

    fn row_texts(wrapped: &Wrapped) -> Vec<&str> {
        wrapped.rows.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_long_line_wraps_to_width() {
        let mut editor = TextEditor::new();
        editor.insert_str("abcdefghij\nxy");
        let wrapped = editor.wrapped(4);
        assert_eq!(row_texts(&wrapped), vec!["abcd", "efgh", "ij", "xy"]);
        assert_eq!(wrapped.rows[1].start, 4);
        assert_eq!(wrapped.rows[3].start, 11);
        assert_eq!(wrapped.cursor, (3, 2));

        // Cursor on a char that starts a wrapped row
        editor.move_home();
        editor.move_left();
        editor.move_left();
        editor.move_left();
        assert_eq!(editor.cursor(), 8);
        assert_eq!(editor.wrapped(4).cursor, (2, 0));
    }

    #[test]
    fn test_full_last_row_puts_cursor_below() {
        let mut editor = TextEditor::new();
        editor.insert_str("abcd");
        let wrapped = editor.wrapped(4);
        assert_eq!(row_texts(&wrapped), vec!["abcd", ""]);
        assert_eq!(wrapped.cursor, (1, 0));
    }

    #[test]
    fn test_wide_chars_wrap_by_display_width() {
        let mut editor = TextEditor::new();
        editor.insert_str("日本語");
        let wrapped = editor.wrapped(5);
        assert_eq!(row_texts(&wrapped), vec!["日本", "語"]);
        assert_eq!(wrapped.cursor, (1, 2));
    }

    #[test]
    fn test_zero_width_does_not_hang() {
        let mut editor = TextEditor::new();
        editor.insert_str("abc");
        assert_eq!(editor.wrapped(0).rows.len(), 4);
    }

    #[test]
    fn test_up_down_keep_column() {
        let mut editor = TextEditor::new();
        editor.insert_str("first line\nsecond");
        assert_eq!(editor.cursor(), 17);

        editor.move_up(80);
        assert_eq!(editor.cursor(), 6);
        editor.move_down(80);
        assert_eq!(editor.cursor(), 17);

        // Shorter target row: cursor lands at its end
        editor.move_up(80);
        editor.move_end();
        editor.move_down(80);
        assert_eq!(editor.cursor(), 17);
    }

    #[test]
    fn test_up_down_follow_wrapped_rows() {
        let mut editor = TextEditor::new();
        editor.insert_str("abcdefghij");
        editor.move_up(4);
        assert_eq!(editor.cursor(), 6);
        editor.move_up(4);
        assert_eq!(editor.cursor(), 2);
        editor.move_up(4);
        assert_eq!(editor.cursor(), 0);

        editor.move_right();
        editor.move_right();
        editor.move_right();
        editor.move_down(4);
        assert_eq!(editor.cursor(), 7);
        editor.move_down(4);
        assert_eq!(editor.cursor(), 10);
    }
}
