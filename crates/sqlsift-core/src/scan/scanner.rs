//! The clause scanner: a depth-tracking keyword locator.
//!
//! Every other component relies on this module to decide whether a keyword
//! or comma is top-level, so that tokens inside subqueries, function argument
//! lists, and CASE expressions are never mistaken for clause boundaries.

use crate::error::ParseError;

/// A keyword occurrence located by the scanner.
///
/// `start` and `end` are byte offsets into the scanned string; `end` is
/// exclusive and covers every word of a multi-word keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

/// What the cursor saw at one scan step.
#[derive(Debug, Clone, Copy)]
enum Event {
    /// An identifier-shaped token.
    Ident {
        start: usize,
        end: usize,
        depth: i32,
        /// True when preceded by `@` or `.`, which disqualifies the token
        /// from matching as a keyword.
        qualified: bool,
    },
    /// Any other non-whitespace character.
    Symbol { pos: usize, c: char, depth: i32 },
}

/// A character cursor that skips string literals, quoted identifiers, and
/// line comments while tracking parenthesis depth.
#[derive(Clone)]
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    depth: i32,
    prev: Option<char>,
}

impl<'a> Cursor<'a> {
    const fn new(input: &'a str, pos: usize, depth: i32) -> Self {
        Self {
            input,
            pos,
            depth,
            prev: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips a quoted region, honoring doubled-quote escapes.
    fn skip_quoted(&mut self, quote: char) {
        self.advance(); // opening quote
        while let Some(c) = self.advance() {
            if c == quote {
                if self.peek() == Some(quote) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
    }

    /// Returns the next significant event, or `None` at end of input.
    fn next_event(&mut self) -> Option<Event> {
        loop {
            let c = self.peek()?;
            match c {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '\'' | '"' | '`' => {
                    self.prev = Some(c);
                    self.skip_quoted(c);
                }
                '-' if self.peek_next() == Some('-') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                '(' => {
                    let pos = self.pos;
                    let depth = self.depth;
                    self.depth += 1;
                    self.prev = Some(c);
                    self.advance();
                    return Some(Event::Symbol { pos, c, depth });
                }
                ')' => {
                    let pos = self.pos;
                    self.depth -= 1;
                    self.prev = Some(c);
                    self.advance();
                    return Some(Event::Symbol {
                        pos,
                        c,
                        depth: self.depth,
                    });
                }
                c if c.is_alphabetic() || c == '_' => {
                    let start = self.pos;
                    let qualified = matches!(self.prev, Some('@' | '.'));
                    while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                        self.advance();
                    }
                    self.prev = Some('\0');
                    return Some(Event::Ident {
                        start,
                        end: self.pos,
                        depth: self.depth,
                        qualified,
                    });
                }
                _ => {
                    let pos = self.pos;
                    self.prev = Some(c);
                    self.advance();
                    return Some(Event::Symbol {
                        pos,
                        c,
                        depth: self.depth,
                    });
                }
            }
        }
    }
}

/// Locates keywords and delimiters at parenthesis-depth zero.
///
/// Keyword matching is case-insensitive and word-bounded, so `FROM` never
/// matches inside `FROMAGE` or after a `.`/`@` qualifier. Absence of a
/// keyword is reported as `None`, never as an error.
pub struct ClauseScanner<'a> {
    input: &'a str,
}

impl<'a> ClauseScanner<'a> {
    /// Creates a scanner over the given subject string.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Finds the next top-level occurrence of `keyword` at or after `from`.
    ///
    /// Multi-word keywords (`"GROUP BY"`, `"IS NOT NULL"`) match across
    /// arbitrary whitespace runs.
    #[must_use]
    pub fn find_keyword(&self, keyword: &str, from: usize) -> Option<KeywordMatch> {
        self.find_keyword_from_depth(keyword, from, 0)
    }

    /// Finds `keyword` with a caller-supplied starting depth.
    ///
    /// The match position must be at running depth zero, counted from the
    /// supplied depth at offset `from`.
    #[must_use]
    pub fn find_keyword_from_depth(
        &self,
        keyword: &str,
        from: usize,
        depth: i32,
    ) -> Option<KeywordMatch> {
        self.find_keyword_impl(keyword, from, depth, false)
    }

    /// Finds `keyword` at any parenthesis depth; used for whole-text
    /// inventory scans rather than clause boundary detection.
    #[must_use]
    pub fn find_keyword_any_depth(&self, keyword: &str, from: usize) -> Option<KeywordMatch> {
        self.find_keyword_impl(keyword, from, 0, true)
    }

    fn find_keyword_impl(
        &self,
        keyword: &str,
        from: usize,
        depth: i32,
        any_depth: bool,
    ) -> Option<KeywordMatch> {
        let words: Vec<&str> = keyword.split_whitespace().collect();
        let (first, rest) = words.split_first()?;

        let mut cur = Cursor::new(self.input, from, depth);
        while let Some(event) = cur.next_event() {
            let Event::Ident {
                start,
                end,
                depth,
                qualified,
            } = event
            else {
                continue;
            };
            if (depth != 0 && !any_depth)
                || qualified
                || !self.input[start..end].eq_ignore_ascii_case(first)
            {
                continue;
            }
            if let Some(end) = self.match_rest(&cur, end, rest, any_depth) {
                return Some(KeywordMatch { start, end });
            }
        }
        None
    }

    /// Checks that the remaining words of a multi-word keyword follow.
    fn match_rest(
        &self,
        cur: &Cursor<'a>,
        first_end: usize,
        rest: &[&str],
        any_depth: bool,
    ) -> Option<usize> {
        let mut look = cur.clone();
        let mut end = first_end;
        for word in rest {
            match look.next_event() {
                Some(Event::Ident {
                    start,
                    end: word_end,
                    depth,
                    qualified: false,
                }) if (any_depth || depth == 0)
                    && self.input[start..word_end].eq_ignore_ascii_case(word) =>
                {
                    end = word_end;
                }
                _ => return None,
            }
        }
        Some(end)
    }

    /// Finds the earliest top-level occurrence of any of the given keywords.
    #[must_use]
    pub fn find_any<'k>(&self, keywords: &[&'k str], from: usize) -> Option<(KeywordMatch, &'k str)> {
        keywords
            .iter()
            .filter_map(|kw| self.find_keyword(kw, from).map(|m| (m, *kw)))
            .min_by_key(|(m, _)| m.start)
    }

    /// Finds the next top-level occurrence of a delimiter character.
    #[must_use]
    pub fn find_char(&self, delim: char, from: usize) -> Option<usize> {
        let mut cur = Cursor::new(self.input, from, 0);
        while let Some(event) = cur.next_event() {
            if let Event::Symbol { pos, c, depth: 0 } = event {
                if c == delim {
                    return Some(pos);
                }
            }
        }
        None
    }

    /// Splits the subject on a top-level delimiter character; pieces are
    /// trimmed, commas inside parentheses or strings never split.
    #[must_use]
    pub fn split_top_level(&self, delim: char) -> Vec<&'a str> {
        let mut parts = Vec::new();
        let mut start = 0;
        let mut cur = Cursor::new(self.input, 0, 0);
        while let Some(event) = cur.next_event() {
            if let Event::Symbol { pos, c, depth: 0 } = event {
                if c == delim {
                    parts.push(self.input[start..pos].trim());
                    start = pos + delim.len_utf8();
                }
            }
        }
        parts.push(self.input[start..].trim());
        parts
    }

    /// Splits the subject on a top-level keyword (typically `AND`).
    #[must_use]
    pub fn split_on_keyword(&self, keyword: &str) -> Vec<&'a str> {
        let mut parts = Vec::new();
        let mut start = 0;
        while let Some(m) = self.find_keyword(keyword, start) {
            parts.push(self.input[start..m.start].trim());
            start = m.end;
        }
        parts.push(self.input[start..].trim());
        parts
    }

    /// Returns the leading identifier token of the subject, if the first
    /// significant content is identifier-shaped.
    #[must_use]
    pub fn leading_ident(&self) -> Option<&'a str> {
        let mut cur = Cursor::new(self.input, 0, 0);
        match cur.next_event()? {
            Event::Ident { start, end, .. } => Some(&self.input[start..end]),
            Event::Symbol { .. } => None,
        }
    }

    /// Verifies that parentheses balance out over the whole subject.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnbalancedParens` when a `)` closes nothing or
    /// a `(` is never closed.
    pub fn check_balanced(&self) -> Result<(), ParseError> {
        let mut cur = Cursor::new(self.input, 0, 0);
        while let Some(event) = cur.next_event() {
            if let Event::Symbol { c: ')', depth, .. } = event {
                if depth < 0 {
                    return Err(ParseError::UnbalancedParens);
                }
            }
        }
        if cur.depth == 0 {
            Ok(())
        } else {
            Err(ParseError::UnbalancedParens)
        }
    }
}
