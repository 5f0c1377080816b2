#![forbid(unsafe_code)]

//! Delimiter-driven string tokenizer.
//!
//! [`StringTokenizer`] breaks a string into tokens separated by a
//! configurable set of single-character delimiters. In the default mode
//! delimiters only separate tokens; with
//! [`with_delimiters_returned`](StringTokenizer::with_delimiters_returned)
//! each delimiter character is itself yielded as a one-character token.
//!
//! Tokens borrow from the input string; no allocation is performed.

/// A tokenizer over `text` splitting on any character in `delimiters`.
#[derive(Debug, Clone)]
pub struct StringTokenizer<'a> {
    text: &'a str,
    delimiters: &'a str,
    return_delimiters: bool,
    pos: usize,
}

impl<'a> StringTokenizer<'a> {
    /// Tokenizer in which delimiters only separate tokens.
    #[must_use]
    pub fn new(text: &'a str, delimiters: &'a str) -> Self {
        Self {
            text,
            delimiters,
            return_delimiters: false,
            pos: 0,
        }
    }

    /// Tokenizer in which each delimiter character is itself a token.
    #[must_use]
    pub fn with_delimiters_returned(text: &'a str, delimiters: &'a str) -> Self {
        Self {
            text,
            delimiters,
            return_delimiters: true,
            pos: 0,
        }
    }

    /// True if another call to [`next_token`](Self::next_token) would
    /// yield a token.
    #[must_use]
    pub fn has_more_tokens(&self) -> bool {
        if self.return_delimiters {
            self.pos < self.text.len()
        } else {
            self.text[self.pos..]
                .chars()
                .any(|c| !self.is_delimiter(c))
        }
    }

    /// The next token, or `None` when the input is exhausted.
    pub fn next_token(&mut self) -> Option<&'a str> {
        let rest = &self.text[self.pos..];
        let mut chars = rest.char_indices();

        if self.return_delimiters {
            let (_, first) = chars.next()?;
            if self.is_delimiter(first) {
                let end = first.len_utf8();
                let token = &rest[..end];
                self.pos += end;
                return Some(token);
            }
            let end = chars
                .find(|(_, c)| self.is_delimiter(*c))
                .map_or(rest.len(), |(i, _)| i);
            let token = &rest[..end];
            self.pos += end;
            return Some(token);
        }

        // Skip leading delimiters.
        let start = rest
            .char_indices()
            .find(|(_, c)| !self.is_delimiter(*c))
            .map(|(i, _)| i)?;
        let after_start = &rest[start..];
        let end = after_start
            .char_indices()
            .find(|(_, c)| self.is_delimiter(*c))
            .map_or(after_start.len(), |(i, _)| i);
        let token = &after_start[..end];
        self.pos += start + end;
        Some(token)
    }

    /// Number of tokens remaining from the current position.
    #[must_use]
    pub fn count_tokens(&self) -> usize {
        self.clone().count()
    }

    fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(c)
    }
}

impl<'a> Iterator for StringTokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.next_token()
    }
}

/// Split `text` on any character in `delimiters`, dropping empty segments.
#[must_use]
pub fn split<'a>(text: &'a str, delimiters: &'a str) -> Vec<&'a str> {
    StringTokenizer::new(text, delimiters).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_comma_split() {
        let mut st = StringTokenizer::new("1,2,3", ",");
        assert!(st.has_more_tokens());
        assert_eq!(st.next_token(), Some("1"));
        assert_eq!(st.next_token(), Some("2"));
        assert_eq!(st.next_token(), Some("3"));
        assert!(!st.has_more_tokens());
        assert_eq!(st.next_token(), None);
    }

    #[test]
    fn consecutive_delimiters_collapse() {
        let tokens = split("a,,b,,,c", ",");
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn leading_and_trailing_delimiters_ignored() {
        let tokens = split(",,x,y,,", ",");
        assert_eq!(tokens, vec!["x", "y"]);
    }

    #[test]
    fn multiple_delimiter_characters() {
        let tokens = split("a b;c", " ;");
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        let mut st = StringTokenizer::new("", ",");
        assert!(!st.has_more_tokens());
        assert_eq!(st.next_token(), None);
    }

    #[test]
    fn delimiter_only_input_has_no_tokens() {
        let mut st = StringTokenizer::new(",,,", ",");
        assert!(!st.has_more_tokens());
        assert_eq!(st.next_token(), None);
    }

    #[test]
    fn return_delimiters_mode() {
        let tokens: Vec<&str> =
            StringTokenizer::with_delimiters_returned("a,b", ",").collect();
        assert_eq!(tokens, vec!["a", ",", "b"]);
    }

    #[test]
    fn return_delimiters_mode_consecutive() {
        let tokens: Vec<&str> =
            StringTokenizer::with_delimiters_returned(",a,,", ",").collect();
        assert_eq!(tokens, vec![",", "a", ",", ","]);
    }

    #[test]
    fn count_tokens_does_not_consume() {
        let st = StringTokenizer::new("x,y,z", ",");
        assert_eq!(st.count_tokens(), 3);
        assert_eq!(st.count_tokens(), 3);
    }

    #[test]
    fn tokens_borrow_from_input() {
        let text = String::from("alpha,beta");
        let tokens = split(&text, ",");
        assert_eq!(tokens[0].as_ptr(), text.as_ptr());
    }

    #[test]
    fn multibyte_characters() {
        let tokens = split("é,ü,ß", ",");
        assert_eq!(tokens, vec!["é", "ü", "ß"]);
    }
}
