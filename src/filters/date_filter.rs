#![allow(clippy::missing_errors_doc)]
use crate::{
    ExpressionError, ExpressionErrorKind,
    filters::{
        Comparison,
        lexer::{Lexer, Token, TokenKind},
    },
    fs::Entry,
};
use chrono::{DateTime, Months, NaiveDate, TimeDelta, Utc};
use clap::{
    Arg, Command, Error,
    builder::{PossibleValue, TypedValueParser},
    error::{ContextKind, ContextValue, ErrorKind},
};
use core::fmt;
use std::ffi::OsStr;

/// A calendar or clock unit for relative dates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum DateUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DateUnit {
    /// Accepts the singular or plural name, in any case
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        let lower = word.to_ascii_lowercase();
        match lower.strip_suffix('s').unwrap_or(&lower) {
            "minute" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /**
     Steps `amount` units back from `now`.

     Months and years follow the calendar, clamping to the end of shorter months,
     so one month before March 31st is February 28th (or 29th).
     Returns `None` when the result is out of range.
    */
    #[must_use]
    pub fn subtract(self, now: DateTime<Utc>, amount: u64) -> Option<DateTime<Utc>> {
        let amount_i64 = i64::try_from(amount).ok();
        let delta = match self {
            Self::Minute => TimeDelta::try_minutes(amount_i64?),
            Self::Hour => TimeDelta::try_hours(amount_i64?),
            Self::Day => TimeDelta::try_days(amount_i64?),
            Self::Week => TimeDelta::try_weeks(amount_i64?),
            Self::Month => {
                let months = u32::try_from(amount).ok()?;
                return now.checked_sub_months(Months::new(months));
            }
            Self::Year => {
                let months = u32::try_from(amount).ok()?.checked_mul(12)?;
                return now.checked_sub_months(Months::new(months));
            }
        };
        now.checked_sub_signed(delta?)
    }
}

/**
 A parsed date predicate: a comparison of a modification time against a reference instant.

 The grammar is `OP (DATE | AMOUNT)?` where
 - `OP` is `>`, `>=`, `<`, `<=`, `==`, or one of the words `after`/`last` (meaning `>`)
   and `before` (meaning `<`)
 - `DATE` is `YYYY-MM-DD`, taken as midnight UTC
 - `AMOUNT` is `N UNIT` with `UNIT` one of minute, hour, day, week, month, year
   (singular or plural), meaning `N` units before now. A bare unit counts as one.

 With nothing after the operator the reference is now.

 The reference instant is fixed when the expression is parsed, so every entry
 checked against one expression is compared to the same instant.

 # Examples

 ```
 use storefind::filters::DateExpression;
 use chrono::{TimeZone, Utc};

 let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();

 let recent = DateExpression::parse_at("> 3 days", now).unwrap();
 assert_eq!(recent.reference(), now.timestamp() - 3 * 86_400);

 let month = DateExpression::parse_at("last month", now).unwrap();
 assert_eq!(month.reference_time().unwrap().to_rfc3339(), "2024-02-29T12:00:00+00:00");

 let after = DateExpression::parse("after 2021-01-01").unwrap();
 assert!(after.evaluate(1_700_000_000));
 ```
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateExpression {
    operator: Comparison,
    reference: i64,
}

impl DateExpression {
    #[must_use]
    pub const fn new(operator: Comparison, reference: i64) -> Self {
        Self {
            operator,
            reference,
        }
    }

    /// Parses a raw date expression against the current time
    pub fn parse(raw: &str) -> Result<Self, ExpressionError> {
        Self::parse_at(raw, Utc::now())
    }

    /// Parses a raw date expression, resolving relative amounts against `now`
    pub fn parse_at(raw: &str, now: DateTime<Utc>) -> Result<Self, ExpressionError> {
        let fail = |kind| ExpressionError::new(raw, kind);
        let mut tokens = Lexer::new(raw).peekable();

        let operator = match tokens.next() {
            None => return Err(fail(ExpressionErrorKind::Empty)),
            Some(token) => Self::parse_operator(token).map_err(fail)?,
        };

        let reference = match tokens.next() {
            None => now,
            Some(Token {
                kind: TokenKind::Date,
                text,
                ..
            }) => Self::parse_date(text).map_err(fail)?,
            Some(Token {
                kind: TokenKind::Number,
                text,
                ..
            }) => {
                let amount = text
                    .parse::<u64>()
                    .map_err(|_| fail(ExpressionErrorKind::Overflow))?;
                let unit = match tokens.next() {
                    Some(Token {
                        kind: TokenKind::Word,
                        text: word,
                        ..
                    }) => DateUnit::from_word(word)
                        .ok_or_else(|| fail(ExpressionErrorKind::UnsupportedUnit(word.into())))?,
                    // a lone number is neither a date nor an amount
                    _ => return Err(fail(ExpressionErrorKind::InvalidDate(text.into()))),
                };
                unit.subtract(now, amount)
                    .ok_or_else(|| fail(ExpressionErrorKind::Overflow))?
            }
            Some(Token {
                kind: TokenKind::Word,
                text,
                ..
            }) => DateUnit::from_word(text)
                .and_then(|unit| unit.subtract(now, 1))
                .ok_or_else(|| fail(ExpressionErrorKind::UnsupportedUnit(text.into())))?,
            Some(token) => {
                return Err(fail(ExpressionErrorKind::InvalidDate(
                    raw[token.start..].trim().into(),
                )));
            }
        };

        if let Some(token) = tokens.next() {
            return Err(fail(ExpressionErrorKind::TrailingInput(
                raw[token.start..].trim().into(),
            )));
        }

        let expression = Self::new(operator, reference.timestamp());
        tracing::trace!(raw, %expression, "parsed date expression");
        Ok(expression)
    }

    fn parse_operator(token: Token<'_>) -> Result<Comparison, ExpressionErrorKind> {
        match token.kind {
            TokenKind::Symbol => match Comparison::from_symbol(token.text) {
                // inequality against an instant is never useful
                Some(Comparison::NotEqual) | None => {
                    Err(ExpressionErrorKind::UnsupportedOperator(token.text.into()))
                }
                Some(op) => Ok(op),
            },
            TokenKind::Word => match token.text.to_ascii_lowercase().as_str() {
                "after" | "last" => Ok(Comparison::Greater),
                "before" => Ok(Comparison::Less),
                _ => Err(ExpressionErrorKind::UnsupportedOperator(token.text.into())),
            },
            TokenKind::Number | TokenKind::Date | TokenKind::Other => {
                Err(ExpressionErrorKind::MissingOperator)
            }
        }
    }

    fn parse_date(text: &str) -> Result<DateTime<Utc>, ExpressionErrorKind> {
        let invalid = || ExpressionErrorKind::InvalidDate(text.into());
        // chrono accepts unpadded fields, the grammar does not
        let shape_ok = text.len() == 10 && text.as_bytes()[4] == b'-' && text.as_bytes()[7] == b'-';
        if !shape_ok {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
            .ok_or_else(invalid)
    }

    #[inline]
    #[must_use]
    pub const fn operator(&self) -> Comparison {
        self.operator
    }

    /// The reference instant as a unix timestamp in seconds
    #[inline]
    #[must_use]
    pub const fn reference(&self) -> i64 {
        self.reference
    }

    #[must_use]
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reference, 0)
    }

    /// Checks `last_modified OP reference`
    #[inline]
    #[must_use]
    pub fn evaluate(&self, last_modified: i64) -> bool {
        self.operator.compare(last_modified, self.reference)
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, entry: &Entry) -> bool {
        self.evaluate(entry.last_modified())
    }

    /// Parses `raw` once and keeps the entries whose modification time satisfies it
    pub fn filter(entries: &[Entry], raw: &str) -> Result<Vec<Entry>, ExpressionError> {
        let expression = Self::parse(raw)?;
        Ok(entries
            .iter()
            .filter(|entry| expression.matches(entry))
            .cloned()
            .collect())
    }
}

impl fmt::Display for DateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reference_time() {
            Some(time) => write!(f, "{} {}", self.operator, time.to_rfc3339()),
            None => write!(f, "{} @{}", self.operator, self.reference),
        }
    }
}

/// A Custom parser that provides helpful error messages and suggestions for date expressions
///
/// Yields the raw expression; relative amounts are resolved when the search runs.
#[derive(Clone, Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct DateExpressionParser;

impl TypedValueParser for DateExpressionParser {
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

        match DateExpression::parse(value_str) {
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
                        "after 2021-01-01".into(),
                        "before 2024-06-30".into(),
                        "> 3 days".into(),
                        "last week".into(),
                        "<= 2 months".into(),
                    ]),
                );

                error.insert(
                    ContextKind::Usage,
                    ContextValue::Strings(vec![
                        "Operators:".into(),
                        "  > >= < <= ==".into(),
                        "  after, last  - same as >".into(),
                        "  before       - same as <".into(),
                        "Format: OP [YYYY-MM-DD | N UNIT]".into(),
                    ]),
                );

                error.insert(
                    ContextKind::ValidValue,
                    ContextValue::Strings(vec![
                        "minute(s)".into(),
                        "hour(s)".into(),
                        "day(s)".into(),
                        "week(s)".into(),
                        "month(s)".into(),
                        "year(s)".into(),
                    ]),
                );

                Err(error)
            }
        }
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        Some(Box::new(
            [
                PossibleValue::new("after 2021-01-01").help("modified after a date"),
                PossibleValue::new("before 2021-01-01").help("modified before a date"),
                PossibleValue::new("last day").help("modified in the last 24 hours"),
                PossibleValue::new("> 2 weeks").help("modified within the last two weeks"),
                PossibleValue::new("< 1 year").help("not modified for a year"),
            ]
            .into_iter(),
        ))
    }
}
