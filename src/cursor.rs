//! Position-tracking cursor over declaration text.
//!
//! Every parsing routine operates through a [`Cursor`]: a byte offset into an
//! immutable source string with anchored regex matching, word-boundary
//! keyword skipping, and cheap save/restore of the offset.  Backtracking
//! across grammar alternatives is just `pos()` / `set_pos()`; the input text
//! is never mutated and no token buffer is built up front.

use regex::Regex;

/// Immutable-text cursor.  Cloning is cheap (a reference and an offset), so
/// tentative parses can also work on a clone and throw it away.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte offset of the next unconsumed character.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Restore a previously saved offset (backtracking).
    pub fn set_pos(&mut self, pos: usize) {
        debug_assert!(pos <= self.text.len());
        self.pos = pos;
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
        debug_assert!(self.pos <= self.text.len());
    }

    pub fn skip_ws(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Consume `s` exactly if it is next.
    pub fn skip_string(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Consume `s` and any whitespace after it.
    pub fn skip_string_and_ws(&mut self, s: &str) -> bool {
        if self.skip_string(s) {
            self.skip_ws();
            true
        } else {
            false
        }
    }

    /// Consume `word` only when it ends at an identifier boundary, so that
    /// e.g. `or` does not match the start of `order`.
    pub fn skip_word(&mut self, word: &str) -> bool {
        let rest = self.rest();
        if !rest.starts_with(word) {
            return false;
        }
        if rest[word.len()..].chars().next().is_some_and(is_word_char) {
            return false;
        }
        self.pos += word.len();
        true
    }

    pub fn skip_word_and_ws(&mut self, word: &str) -> bool {
        if self.skip_word(word) {
            self.skip_ws();
            true
        } else {
            false
        }
    }

    /// Text consumed since a previously saved offset.
    pub fn slice(&self, start: usize) -> &'a str {
        &self.text[start..self.pos]
    }

    /// Match an anchored regex (the pattern must start with `^`) at the
    /// current offset; on success consumes and returns the matched text.
    pub fn match_regex(&mut self, re: &Regex) -> Option<&'a str> {
        let m = re.find(self.rest())?;
        debug_assert_eq!(m.start(), 0, "cursor regexes must be anchored");
        let text = &self.rest()[..m.end()];
        self.pos += m.end();
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());

    #[test]
    fn test_skip_word_boundary() {
        let mut c = Cursor::new("order");
        assert!(!c.skip_word("or"));
        assert!(c.skip_word("order"));
        assert!(c.eof());
    }

    #[test]
    fn test_backtracking_restores_position() {
        let mut c = Cursor::new("foo bar");
        let saved = c.pos();
        assert!(c.skip_word_and_ws("foo"));
        c.set_pos(saved);
        assert_eq!(c.rest(), "foo bar");
    }

    #[test]
    fn test_match_regex_anchored() {
        let mut c = Cursor::new("abc123 rest");
        assert_eq!(c.match_regex(&IDENT), Some("abc123"));
        c.skip_ws();
        assert_eq!(c.match_regex(&IDENT), Some("rest"));
        assert!(c.match_regex(&IDENT).is_none());
    }
}
