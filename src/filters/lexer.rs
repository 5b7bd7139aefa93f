/// The kind of a lexed token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum TokenKind {
    /// A run of `<`, `>`, `=` or `!`
    Symbol,
    /// A run of ASCII digits
    Number,
    /// Digits and dashes starting with a digit, such as `2021-01-01`
    Date,
    /// A run of ASCII letters
    Word,
    /// Any other single character
    Other,
}

/// A token borrowed from the source expression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token within the source
    pub start: usize,
}

/**
 Splits a size or date expression into tokens, skipping whitespace.

 Operators and operands need no whitespace between them, `">=1kb"` lexes the same as `">= 1 kb"`.

 ```
 use storefind::filters::lexer::{Lexer, TokenKind};

 let kinds: Vec<_> = Lexer::new(">= 25kb").map(|token| token.kind).collect();
 assert_eq!(kinds, [TokenKind::Symbol, TokenKind::Number, TokenKind::Word]);
 ```
*/
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// The unconsumed input, starting at the next token
    #[must_use]
    pub fn remainder(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or_default().trim()
    }

    fn take_while<F: Fn(u8) -> bool>(&mut self, accept: F) {
        let bytes = self.source.as_bytes();
        while self.pos < bytes.len() && accept(bytes[self.pos]) {
            self.pos += 1;
        }
    }
}

const fn is_symbol(byte: u8) -> bool {
    matches!(byte, b'<' | b'>' | b'=' | b'!')
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.take_while(|byte| byte.is_ascii_whitespace());
        let start = self.pos;
        let first = *self.source.as_bytes().get(start)?;

        let kind = if is_symbol(first) {
            self.take_while(is_symbol);
            TokenKind::Symbol
        } else if first.is_ascii_digit() {
            self.take_while(|byte| byte.is_ascii_digit());
            if self.source.as_bytes().get(self.pos) == Some(&b'-') {
                self.take_while(|byte| byte.is_ascii_digit() || byte == b'-');
                TokenKind::Date
            } else {
                TokenKind::Number
            }
        } else if first.is_ascii_alphabetic() {
            self.take_while(|byte| byte.is_ascii_alphabetic());
            TokenKind::Word
        } else {
            // one whole character, which may be multi-byte
            let width = self.source[start..].chars().next().map_or(1, char::len_utf8);
            self.pos += width;
            TokenKind::Other
        };

        Some(Token {
            kind,
            text: &self.source[start..self.pos],
            start,
        })
    }
}
