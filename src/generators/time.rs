//! Date/time example formatting.
//!
//! Patterns use the letter grammar contract authors already write
//! (`yyyy-MM-dd'T'HH:mm:ss.SSS'Z'`): runs of a letter select a field, text in
//! single quotes is literal, `''` is a quote. They are translated once into
//! `chrono` strftime runs, plus the millisecond and 1-24 / 0-11 hour fields
//! strftime has no spelling for, and applied to the instant shifted into the zone.
use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, FixedOffset, Months, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Clock;
use crate::error::{BuildError, Result};

pub const DEFAULT_DATE: &str = "yyyy-MM-dd";
pub const DEFAULT_TIME: &str = "HH:mm:ss";
pub const DEFAULT_DATETIME: &str = "yyyy-MM-dd'T'HH:mm:ss";

/// Which rule a formatted value is checked with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemporalKind {
    Date,
    Time,
    DateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    pieces: Vec<Piece>,
}

/// One translated run of the pattern. Fields strftime has no spelling for
/// are rendered directly.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Strftime(String),
    /// `S…`: milliseconds, zero-padded to the run length.
    Millis(usize),
    /// `k…`: hour of day 1-24.
    ClockHour(usize),
    /// `K…`: hour of half-day 0-11.
    HalfDayHour(usize),
}

impl DatePattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let pieces = translate(pattern)?;
        let unusable = pieces.iter().any(|piece| match piece {
            Piece::Strftime(spec) => StrftimeItems::new(spec).any(|item| matches!(item, Item::Error)),
            _ => false,
        });
        if unusable {
            return Err(BuildError::pattern(pattern, "not a usable format"));
        }
        Ok(Self { source: pattern.to_string(), pieces })
    }

    pub fn as_str(&self) -> &str { &self.source }

    /// Format `at` as seen in `zone`.
    pub fn format(&self, at: DateTime<FixedOffset>) -> Result<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            let written = match piece {
                Piece::Strftime(spec) => write!(out, "{}", at.format(spec)),
                Piece::Millis(w) => write!(out, "{:0w$}", at.timestamp_subsec_millis().min(999), w = *w),
                Piece::ClockHour(w) => {
                    let h = match at.hour() {
                        0 => 24,
                        h => h,
                    };
                    write!(out, "{h:0w$}", w = *w)
                }
                Piece::HalfDayHour(w) => write!(out, "{:0w$}", at.hour() % 12, w = *w),
            };
            written.map_err(|_| BuildError::pattern(&self.source, "formatting failed"))?;
        }
        Ok(out)
    }

    pub fn format_clock(&self, clock: Clock) -> Result<String> {
        self.format(clock.now.with_timezone(&clock.zone))
    }
}

fn translate(pattern: &str) -> Result<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut buf = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    buf.push('\'');
                    continue;
                }
                // quoted literal, `''` inside stands for one quote
                let mut closed = false;
                while let Some(q) = chars.next() {
                    if q == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            buf.push('\'');
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        push_literal(&mut buf, q);
                    }
                }
                if !closed {
                    return Err(BuildError::pattern(pattern, "unterminated quote"));
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut run = 1usize;
                while chars.peek() == Some(&c) {
                    chars.next();
                    run += 1;
                }
                match field(pattern, c, run)? {
                    Piece::Strftime(spec) => buf.push_str(&spec),
                    direct => {
                        if !buf.is_empty() {
                            pieces.push(Piece::Strftime(std::mem::take(&mut buf)));
                        }
                        pieces.push(direct);
                    }
                }
            }
            c => push_literal(&mut buf, c),
        }
    }
    if !buf.is_empty() {
        pieces.push(Piece::Strftime(buf));
    }
    Ok(pieces)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn field(pattern: &str, letter: char, run: usize) -> Result<Piece> {
    let spec = match (letter, run) {
        ('S', _) => return Ok(Piece::Millis(run)),
        ('k', _) => return Ok(Piece::ClockHour(run)),
        ('K', _) => return Ok(Piece::HalfDayHour(run)),
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('Y', 2) => "%g",
        ('Y', _) => "%G",
        ('M' | 'L', 1) => "%-m",
        ('M' | 'L', 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', _) => "%B",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('D', 1) => "%-j",
        ('D', _) => "%j",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('u', _) => "%u",
        ('a', _) => "%p",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('z', _) => "%Z",
        ('Z', _) => "%z",
        ('X', 1) => "%:::z",
        ('X', 2) => "%z",
        ('X', 3) => "%:z",
        _ => {
            return Err(BuildError::pattern(
                pattern,
                format!("unsupported field `{}`", letter.to_string().repeat(run)),
            ));
        }
    };
    Ok(Piece::Strftime(spec.to_string()))
}

// ------------------------------ Expressions ------------------------------- //

static EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(now|today|tomorrow|yesterday)?((?:\s*[+-]\s*\d+\s*[a-z]+)*)\s*$")
        .expect("static expression grammar")
});

static ADJUSTMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([+-])\s*(\d+)\s*([a-z]+)").expect("static adjustment grammar")
});

/// Evaluate `expression` (e.g. `today + 1 day - 2 hours`) against the clock,
/// returning the instant in the clock's zone.
pub fn evaluate(expression: &str, clock: Clock) -> Result<DateTime<FixedOffset>> {
    let caps = EXPRESSION
        .captures(expression)
        .ok_or_else(|| BuildError::expression(expression, "expected `<base> [+|- <n> <unit>]*`"))?;

    let local = clock.now.with_timezone(&clock.zone);
    let mut at = match caps.get(1).map(|m| m.as_str()) {
        None | Some("now") | Some("today") => local,
        Some("tomorrow") => local + Duration::days(1),
        Some("yesterday") => local - Duration::days(1),
        Some(other) => return Err(BuildError::expression(expression, format!("unknown base `{other}`"))),
    };

    let ops = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    for adj in ADJUSTMENT.captures_iter(ops) {
        let forward = &adj[1] == "+";
        let n: u32 = adj[2]
            .parse()
            .map_err(|_| BuildError::expression(expression, "amount out of range"))?;
        at = shift(at, forward, n, &adj[3])
            .ok_or_else(|| BuildError::expression(expression, format!("cannot apply `{}`", &adj[0])))?;
    }
    Ok(at)
}

fn shift(at: DateTime<FixedOffset>, forward: bool, n: u32, unit: &str) -> Option<DateTime<FixedOffset>> {
    let n64 = i64::from(n);
    let delta = match unit.trim_end_matches('s') {
        "second" => Duration::try_seconds(n64)?,
        "minute" => Duration::try_minutes(n64)?,
        "hour" => Duration::try_hours(n64)?,
        "day" => Duration::try_days(n64)?,
        "week" => Duration::try_weeks(n64)?,
        "month" => return months(at, forward, n),
        "year" => return months(at, forward, n.checked_mul(12)?),
        _ => return None,
    };
    if forward { at.checked_add_signed(delta) } else { at.checked_sub_signed(delta) }
}

fn months(at: DateTime<FixedOffset>, forward: bool, n: u32) -> Option<DateTime<FixedOffset>> {
    if forward { at.checked_add_months(Months::new(n)) } else { at.checked_sub_months(Months::new(n)) }
}
