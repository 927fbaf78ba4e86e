//! Value generators for terminal calls.
//!
//! Every generator returns a [`Generated`]: the example written into the
//! document plus the rule (if any) registered at the example's path.
//!
//! Two families:
//! - exact (`*_value`, [`literal`]): the example *is* the expectation, no rule.
//! - typed/matched (`*_type`, [`hex_value`], [`string_matcher`], dates, …):
//!   the example is illustrative and a rule always comes with it.
pub mod strings;
pub mod time;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{Number, Value};

use crate::config::{Config, Samples};
use crate::error::Result;
use crate::rules::{MatchingRule, NumberKind};

pub use time::{DatePattern, TemporalKind};

#[derive(Clone, Debug, PartialEq)]
pub struct Generated {
    pub value: Value,
    pub rule: Option<MatchingRule>,
}

impl Generated {
    pub fn exact(value: impl Into<Value>) -> Self {
        Self { value: value.into(), rule: None }
    }

    pub fn matched(value: impl Into<Value>, rule: MatchingRule) -> Self {
        Self { value: value.into(), rule: Some(rule) }
    }
}

// ------------------------------ Exact family ------------------------------ //

pub fn literal(value: impl Into<Value>) -> Generated { Generated::exact(value) }

/// `None` writes an explicit null.
pub fn string_value(example: Option<&str>) -> Generated {
    match example {
        Some(s) => Generated::exact(s),
        None => Generated::exact(Value::Null),
    }
}

pub fn number_value(n: impl Into<Number>) -> Generated { Generated::exact(Value::Number(n.into())) }

pub fn decimal_value(n: f64) -> Generated { Generated::exact(n) }

pub fn boolean_value(b: bool) -> Generated { Generated::exact(b) }

pub fn null_value() -> Generated { Generated::exact(Value::Null) }

/// The instant formatted with `pattern`, pinned as a literal.
pub fn datetime_value(
    pattern: &str,
    at: Option<DateTime<Utc>>,
    zone: Option<FixedOffset>,
    config: &Config,
) -> Result<Generated> {
    let pattern = DatePattern::parse(pattern)?;
    let example = pattern.format_clock(config.resolve_clock(at, zone))?;
    Ok(Generated::exact(example))
}

// ------------------------------ Typed family ------------------------------ //

pub fn string_type(example: Option<&str>, samples: &Samples) -> Generated {
    let example = example.map_or_else(|| samples.string.clone(), str::to_string);
    Generated::matched(example, MatchingRule::ExactType)
}

pub fn integer_type(example: Option<i64>, samples: &Samples) -> Generated {
    Generated::matched(example.unwrap_or(samples.integer), MatchingRule::NumberKind(NumberKind::Integer))
}

pub fn decimal_type(example: Option<f64>, samples: &Samples) -> Generated {
    Generated::matched(example.unwrap_or(samples.decimal), MatchingRule::NumberKind(NumberKind::Decimal))
}

pub fn number_type(example: Option<Number>, samples: &Samples) -> Generated {
    let example = example.unwrap_or_else(|| Number::from(samples.integer));
    Generated::matched(Value::Number(example), MatchingRule::NumberKind(NumberKind::Number))
}

pub fn boolean_type(example: Option<bool>, samples: &Samples) -> Generated {
    Generated::matched(example.unwrap_or(samples.boolean), MatchingRule::ExactType)
}

/// Identifier: any value of the example's type (a number).
pub fn id(example: Option<i64>, samples: &Samples) -> Generated {
    Generated::matched(example.unwrap_or(samples.id), MatchingRule::ExactType)
}

pub fn hex_value(example: Option<&str>, samples: &Samples) -> Result<Generated> {
    matched_string(strings::HEX, example, &samples.hex)
}

pub fn uuid(example: Option<&str>, samples: &Samples) -> Result<Generated> {
    matched_string(strings::UUID, example, &samples.uuid)
}

pub fn ip_address(example: Option<&str>, samples: &Samples) -> Result<Generated> {
    matched_string(strings::IPV4, example, &samples.ip_address)
}

/// Any string matching `pattern`; synthesizes one when no example is given.
pub fn string_matcher(pattern: &str, example: Option<&str>) -> Result<Generated> {
    let example = match example {
        Some(e) => {
            strings::check(pattern, e)?;
            e.to_string()
        }
        None => strings::synthesize(pattern)?,
    };
    Ok(Generated::matched(example, MatchingRule::Regex(pattern.to_string())))
}

/// Any string containing `value`; `value` doubles as the example.
pub fn includes_str(value: &str) -> Generated {
    Generated::matched(value, MatchingRule::Include(value.to_string()))
}

fn matched_string(pattern: &str, example: Option<&str>, fallback: &str) -> Result<Generated> {
    let example = example.unwrap_or(fallback);
    strings::check(pattern, example)?;
    Ok(Generated::matched(example, MatchingRule::Regex(pattern.to_string())))
}

// ------------------------------- Temporal --------------------------------- //

/// Instant formatted with `pattern`; the rule checks the format, not the value.
pub fn temporal(
    kind: TemporalKind,
    pattern: &str,
    at: Option<DateTime<Utc>>,
    zone: Option<FixedOffset>,
    config: &Config,
) -> Result<Generated> {
    let parsed = DatePattern::parse(pattern)?;
    let example = parsed.format_clock(config.resolve_clock(at, zone))?;
    let rule = match kind {
        TemporalKind::Date => MatchingRule::DateFormat(pattern.to_string()),
        TemporalKind::Time => MatchingRule::TimeFormat(pattern.to_string()),
        TemporalKind::DateTime => MatchingRule::DateTimeFormat(pattern.to_string()),
    };
    Ok(Generated::matched(example, rule))
}

/// Value recomputed from `expression` at comparison time. The example is the
/// expression evaluated against the resolved clock; an expression this crate
/// cannot evaluate is still recorded and the example falls back to the clock.
pub fn temporal_expression(expression: &str, pattern: &str, config: &Config) -> Result<Generated> {
    let parsed = DatePattern::parse(pattern)?;
    let clock = config.resolve_clock(None, None);
    let example = match time::evaluate(expression, clock) {
        Ok(at) => parsed.format(at)?,
        Err(err) => {
            tracing::debug!(%expression, error = %err, "expression left for comparison time");
            parsed.format_clock(clock)?
        }
    };
    Ok(Generated::matched(example, MatchingRule::GeneratedExpression {
        expression: expression.to_string(),
        format: pattern.to_string(),
    }))
}

// ------------------------------- Tests ------------------------------------ //
