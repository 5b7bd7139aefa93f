#![allow(clippy::missing_errors_doc)]
use crate::{
    ExpressionError, ExpressionErrorKind,
    filters::{
        Comparison,
        lexer::{Lexer, Token, TokenKind},
    },
    fs::Entry,
};
use clap::{
    Arg, Command, Error,
    builder::{PossibleValue, TypedValueParser},
    error::{ContextKind, ContextValue, ErrorKind},
};
use core::{fmt, iter::Peekable, str::FromStr};
use std::ffi::OsStr;

pub const KIBI: u64 = 1024;
pub const MEBI: u64 = KIBI * 1024;
pub const GIBI: u64 = MEBI * 1024;

/**
 A parsed size predicate: a comparison against a threshold in bytes.

 The grammar is `OP NUMBER UNIT?` with optional whitespace between the parts.
 - `OP` is one of `>`, `>=`, `<`, `<=`, `==`, `!=`
 - `UNIT` is `k`/`kb`/`kilo`, `m`/`mb`/`mega` or `g`/`gb`/`giga` (any case),
   all powers of 1024; without a unit the number is a byte count

 # Examples

 ```
 use storefind::filters::SizeExpression;

 let small = SizeExpression::parse("< 1k").unwrap();
 assert!(small.evaluate(1023));
 assert!(!small.evaluate(1024));

 let big = SizeExpression::parse(">=2 MB").unwrap();
 assert_eq!(big.threshold(), 2 * 1024 * 1024);

 let err = SizeExpression::parse("< 3 tb").unwrap_err();
 assert!(err.is_unsupported_unit());
 ```
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeExpression {
    operator: Comparison,
    threshold: u64,
}

impl SizeExpression {
    #[must_use]
    pub const fn new(operator: Comparison, threshold: u64) -> Self {
        Self {
            operator,
            threshold,
        }
    }

    /// Parses a raw size expression
    pub fn parse(raw: &str) -> Result<Self, ExpressionError> {
        let fail = |kind| ExpressionError::new(raw, kind);
        let mut tokens = Lexer::new(raw).peekable();

        let operator = match tokens.next() {
            None => return Err(fail(ExpressionErrorKind::Empty)),
            Some(Token {
                kind: TokenKind::Symbol,
                text,
                ..
            }) => Comparison::from_symbol(text)
                .ok_or_else(|| fail(ExpressionErrorKind::UnsupportedOperator(text.into())))?,
            Some(_) => return Err(fail(ExpressionErrorKind::MissingOperator)),
        };

        let amount = match tokens.next() {
            None => return Err(fail(ExpressionErrorKind::MissingOperand)),
            Some(Token {
                kind: TokenKind::Number,
                text,
                ..
            }) => text
                .parse::<u64>()
                .map_err(|_| fail(ExpressionErrorKind::Overflow))?,
            Some(Token { kind: TokenKind::Word, .. }) => {
                return Err(fail(ExpressionErrorKind::MissingOperand));
            }
            Some(token) => {
                return Err(fail(ExpressionErrorKind::InvalidNumber(
                    raw[token.start..].trim().into(),
                )));
            }
        };

        let multiplier = Self::parse_unit(&mut tokens).map_err(fail)?;

        if let Some(token) = tokens.next() {
            return Err(fail(ExpressionErrorKind::TrailingInput(
                raw[token.start..].trim().into(),
            )));
        }

        let threshold = amount
            .checked_mul(multiplier)
            .ok_or_else(|| fail(ExpressionErrorKind::Overflow))?;
        let expression = Self::new(operator, threshold);
        tracing::trace!(raw, %expression, "parsed size expression");
        Ok(expression)
    }

    fn parse_unit<'a, I: Iterator<Item = Token<'a>>>(
        tokens: &mut Peekable<I>,
    ) -> Result<u64, ExpressionErrorKind> {
        match tokens.peek() {
            Some(Token {
                kind: TokenKind::Word,
                text,
                ..
            }) => {
                let multiplier = Self::unit_multiplier(text)
                    .ok_or_else(|| ExpressionErrorKind::UnsupportedUnit((*text).into()))?;
                tokens.next();
                Ok(multiplier)
            }
            _ => Ok(1),
        }
    }

    fn unit_multiplier(unit: &str) -> Option<u64> {
        match unit.to_ascii_lowercase().as_str() {
            "k" | "kb" | "kilo" => Some(KIBI),
            "m" | "mb" | "mega" => Some(MEBI),
            "g" | "gb" | "giga" => Some(GIBI),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn operator(&self) -> Comparison {
        self.operator
    }

    /// The threshold in bytes, units already applied
    #[inline]
    #[must_use]
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Checks `size OP threshold`
    #[inline]
    #[must_use]
    pub fn evaluate(&self, size: u64) -> bool {
        self.operator.compare(size, self.threshold)
    }

    /// Like [`evaluate`](Self::evaluate), failing for entries that have no size
    pub fn matches(&self, entry: &Entry) -> Result<bool, ExpressionError> {
        entry.size().map(|size| self.evaluate(size)).ok_or_else(|| {
            ExpressionError::new(
                self.to_string(),
                ExpressionErrorKind::MissingSize(entry.path().into()),
            )
        })
    }

    /**
     Parses `raw` once and keeps the entries whose size satisfies it.

     Fails if the expression is malformed, or if any entry is a directory.
    */
    pub fn filter(entries: &[Entry], raw: &str) -> Result<Vec<Entry>, ExpressionError> {
        let expression = Self::parse(raw)?;
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            if expression.matches(entry)? {
                kept.push(entry.clone());
            }
        }
        Ok(kept)
    }
}

impl fmt::Display for SizeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.threshold)
    }
}

impl FromStr for SizeExpression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A Custom parser that provides helpful error messages and suggestions for size expressions
///
/// Yields the raw expression so it can be handed to the finder unchanged.
#[derive(Clone, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct SizeExpressionParser;

impl TypedValueParser for SizeExpressionParser {
    type Value = String;

    fn parse_ref(
        &self,
        cmd: &Command,
        _arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, Error> {
        let value_str = value
            .to_str()
            .ok_or_else(|| Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;

        match SizeExpression::parse(value_str) {
            Ok(_) => Ok(value_str.to_owned()),
            Err(err) => {
                let mut error = Error::new(ErrorKind::InvalidValue).with_cmd(cmd);

                error.insert(
                    ContextKind::InvalidValue,
                    ContextValue::String(format!("{err}")),
                );

                error.insert(
                    ContextKind::SuggestedValue,
                    ContextValue::Strings(vec![
                        "< 25".into(),
                        ">= 1k".into(),
                        "> 10mb".into(),
                        "<= 2 giga".into(),
                        "!= 0".into(),
                    ]),
                );

                error.insert(
                    ContextKind::Usage,
                    ContextValue::Strings(vec![
                        "Operators:".into(),
                        "  > >= < <= == !=".into(),
                        "Format: OP NUMBER [UNIT]".into(),
                    ]),
                );

                error.insert(
                    ContextKind::ValidValue,
                    ContextValue::Strings(vec![
                        "k, kb, kilo (1024)".into(),
                        "m, mb, mega (1024^2)".into(),
                        "g, gb, giga (1024^3)".into(),
                    ]),
                );

                Err(error)
            }
        }
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        Some(Box::new(
            [
                PossibleValue::new("< 25").help("smaller than 25 bytes"),
                PossibleValue::new(">= 1k").help("at least 1 KiB"),
                PossibleValue::new("> 10mb").help("larger than 10 MiB"),
                PossibleValue::new("== 0").help("empty files"),
            ]
            .into_iter(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(raw: &str) -> ExpressionErrorKind {
        SizeExpression::parse(raw).unwrap_err().kind().clone()
    }

    #[test]
    fn boundaries() {
        let eq = SizeExpression::parse("== 1024").unwrap();
        assert!(eq.evaluate(1024));
        assert!(!eq.evaluate(1023));

        let le = SizeExpression::parse("<= 1024").unwrap();
        assert!(le.evaluate(1023) && le.evaluate(1024) && !le.evaluate(1025));

        let lt = SizeExpression::parse("< 1k").unwrap();
        assert!(lt.evaluate(1023) && !lt.evaluate(1024));

        let ne = SizeExpression::parse("!= 0").unwrap();
        assert!(ne.evaluate(1) && !ne.evaluate(0));
    }

    #[test]
    fn units_are_binary_and_case_insensitive() {
        assert_eq!(SizeExpression::parse("> 1K").unwrap().threshold(), 1024);
        assert_eq!(SizeExpression::parse(">1kilo").unwrap().threshold(), 1024);
        assert_eq!(SizeExpression::parse("> 3 MB").unwrap().threshold(), 3 * MEBI);
        assert_eq!(SizeExpression::parse("> 1 Mega").unwrap().threshold(), MEBI);
        assert_eq!(SizeExpression::parse("> 2g").unwrap().threshold(), 2 * GIBI);
        assert_eq!(SizeExpression::parse(">= 7 GIGA").unwrap().threshold(), 7 * GIBI);
        assert_eq!(SizeExpression::parse("< 25").unwrap().threshold(), 25);
    }

    #[test]
    fn malformed_expressions() {
        assert_eq!(kind(""), ExpressionErrorKind::Empty);
        assert_eq!(kind("25"), ExpressionErrorKind::MissingOperator);
        assert_eq!(kind("=> 25"), ExpressionErrorKind::UnsupportedOperator("=>".into()));
        assert_eq!(kind(">"), ExpressionErrorKind::MissingOperand);
        assert_eq!(kind("> kb"), ExpressionErrorKind::MissingOperand);
        assert_eq!(kind("> -5"), ExpressionErrorKind::InvalidNumber("-5".into()));
        assert_eq!(kind("< 3 tb"), ExpressionErrorKind::UnsupportedUnit("tb".into()));
        assert_eq!(kind("< 3 b"), ExpressionErrorKind::UnsupportedUnit("b".into()));
        assert_eq!(kind("< 3 k 4"), ExpressionErrorKind::TrailingInput("4".into()));
        assert_eq!(kind("< 1.5k"), ExpressionErrorKind::TrailingInput(".5k".into()));
        assert_eq!(kind("< 99999999999999999999"), ExpressionErrorKind::Overflow);
        assert_eq!(kind("< 99999999999 giga"), ExpressionErrorKind::Overflow);
    }

    #[test]
    fn filter_keeps_matching_files() {
        let entries = [
            Entry::file("a.txt", 9, 0),
            Entry::file("b.php", 24, 0),
            Entry::file("c.bin", 4096, 0),
        ];
        let kept = SizeExpression::filter(&entries, "< 25").unwrap();
        assert_eq!(kept.len(), 2);
        assert!(SizeExpression::filter(&entries, "nope").is_err());
    }

    #[test]
    fn filter_rejects_directories() {
        let entries = [Entry::file("a.txt", 9, 0), Entry::directory("sub", 0)];
        let err = SizeExpression::filter(&entries, "< 25").unwrap_err();
        assert_eq!(err.kind(), &ExpressionErrorKind::MissingSize("sub".into()));
    }
}
