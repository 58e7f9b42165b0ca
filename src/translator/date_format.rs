//! Letter-token date patterns (`MM/dd/yyyy hh:mm a`).
//!
//! Patterns are compiled once into a `chrono` format string and reused.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use chrono::{
    DateTime,
    NaiveDateTime,
    TimeZone,
    Utc,
};
use thiserror::Error;

/// Pattern used when no locale provides `date.format`.
pub const DEFAULT_DATE_PATTERN: &str = "MM/dd/yyyy hh:mm a";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateFormatError {
    #[error("Unknown pattern letter '{0}'")]
    UnknownField(char),

    #[error("Unterminated quote in date pattern")]
    UnterminatedQuote,
}

/// A parsed date pattern.
///
/// | Letters | Meaning |
/// |---|---|
/// | `yyyy` / `yy` | year / two-digit year |
/// | `M` `MM` `MMM` `MMMM` | month, padded month, short name, full name |
/// | `d` `dd` | day of month |
/// | `H` `HH` / `h` `hh` | hour 0-23 / 1-12 |
/// | `m` `mm`, `s` `ss`, `SSS` | minute, second, millisecond |
/// | `a` | AM/PM |
/// | `E` / `EEEE` | short / full weekday |
/// | `D` / `DDD`, `u` | day of year unpadded / padded, ISO weekday number |
/// | `z` / `Z` | zone name or offset, `+hhmm` offset |
///
/// Text in single quotes is literal, `''` is a quote. Naive values carry no
/// zone, so [`DateFormat::format_naive`] renders zone fields as UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
    zoned: bool,
}

impl DateFormat {
    /// # Errors
    /// Returns [`DateFormatError`] for unknown pattern letters or an unclosed quote.
    pub fn parse(pattern: &str) -> Result<Self, DateFormatError> {
        let mut strftime = String::with_capacity(pattern.len() * 2);
        let mut zoned = false;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_ascii_alphabetic() {
                let mut count = 1;
                while chars.next_if_eq(&c).is_some() {
                    count += 1;
                }
                zoned |= matches!(c, 'z' | 'Z');
                strftime.push_str(field_specifier(c, count)?);
            } else if c == '\'' {
                read_quoted(&mut chars, &mut strftime)?;
            } else {
                push_literal(&mut strftime, c);
            }
        }

        Ok(Self { pattern: pattern.to_string(), strftime, zoned })
    }

    /// The built-in `MM/dd/yyyy hh:mm a` format.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            pattern: DEFAULT_DATE_PATTERN.to_string(),
            strftime: "%m/%d/%Y %I:%M %p".to_string(),
            zoned: false,
        }
    }

    /// Pattern this format was parsed from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        datetime.format(&self.strftime).to_string()
    }

    #[must_use]
    pub fn format_naive(&self, datetime: &NaiveDateTime) -> String {
        if self.zoned {
            return self.format(&Utc.from_utc_datetime(datetime));
        }
        datetime.format(&self.strftime).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::builtin()
    }
}

fn field_specifier(letter: char, count: usize) -> Result<&'static str, DateFormatError> {
    let specifier = match (letter, count) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('S', _) => "%3f",
        ('a', _) => "%p",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('D', 1 | 2) => "%-j",
        ('D', _) => "%j",
        ('u', _) => "%u",
        ('z', _) => "%Z",
        ('Z', _) => "%z",
        _ => return Err(DateFormatError::UnknownField(letter)),
    };
    Ok(specifier)
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<(), DateFormatError> {
    // '' outside of a quoted section is a single quote
    if chars.next_if_eq(&'\'').is_some() {
        out.push('\'');
        return Ok(());
    }

    loop {
        match chars.next() {
            Some('\'') => {
                if chars.next_if_eq(&'\'').is_some() {
                    out.push('\'');
                } else {
                    return Ok(());
                }
            }
            Some(c) => push_literal(out, c),
            None => return Err(DateFormatError::UnterminatedQuote),
        }
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
