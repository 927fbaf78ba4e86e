//! Regex helpers for matched string calls: validation of explicit examples and
//! deterministic synthesis of an example that satisfies a pattern.
use regex::Regex;
use regex_syntax::hir::{Class, Hir, HirKind, Literal};

use crate::error::{BuildError, Result};

pub const HEX: &str = "[0-9a-fA-F]+";
pub const UUID: &str = "[0-9a-fA-F]{8}(-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12}";
pub const IPV4: &str = r"(\d{1,3}\.)+\d{1,3}";

/// Characters tried, in order, when a class has to be turned into one char.
const PREFERRED: [(char, char); 4] = [('a', 'z'), ('0', '9'), ('A', 'Z'), (' ', '~')];

/// Compile `pattern` anchored at both ends; matching is whole-value.
/// The pattern must parse on its own before it is wrapped.
pub fn anchored(pattern: &str) -> Result<Regex> {
    parse(pattern)?;
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| BuildError::Regex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn parse(pattern: &str) -> Result<Hir> {
    regex_syntax::parse(pattern).map_err(|e| BuildError::Regex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Fail unless `example` matches `pattern` in full.
pub fn check(pattern: &str, example: &str) -> Result<()> {
    if anchored(pattern)?.is_match(example) {
        Ok(())
    } else {
        Err(BuildError::ExampleMismatch {
            pattern: pattern.to_string(),
            example: example.to_string(),
        })
    }
}

/// Produce a string matching `pattern`.
///
/// Walks the parsed pattern: first alternative, minimal non-zero repetition,
/// a readable character from each class. Look-arounds and anchors emit nothing.
/// The result is verified, so unsatisfiable patterns surface as errors.
pub fn synthesize(pattern: &str) -> Result<String> {
    let hir = parse(pattern)?;
    let mut out = String::new();
    emit(&hir, &mut out);
    check(pattern, &out)?;
    Ok(out)
}

fn emit(hir: &Hir, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(Literal(bytes)) => out.push_str(&String::from_utf8_lossy(bytes)),
        HirKind::Class(Class::Unicode(cls)) => {
            if let Some(c) = pick(cls.ranges().iter().map(|r| (r.start(), r.end()))) {
                out.push(c);
            }
        }
        HirKind::Class(Class::Bytes(cls)) => {
            let ranges = cls.ranges().iter().map(|r| (char::from(r.start()), char::from(r.end())));
            if let Some(c) = pick(ranges) {
                out.push(c);
            }
        }
        HirKind::Repetition(rep) => {
            let n = match (rep.min, rep.max) {
                (0, Some(0)) => 0,
                (0, _) => 1,
                (min, _) => min,
            };
            for _ in 0..n {
                emit(&rep.sub, out);
            }
        }
        HirKind::Capture(cap) => emit(&cap.sub, out),
        HirKind::Concat(xs) => xs.iter().for_each(|x| emit(x, out)),
        HirKind::Alternation(xs) => {
            if let Some(first) = xs.first() {
                emit(first, out);
            }
        }
    }
}

fn pick<I>(ranges: I) -> Option<char>
where
    I: Iterator<Item = (char, char)> + Clone,
{
    for (lo, hi) in PREFERRED {
        for (start, end) in ranges.clone() {
            let from = start.max(lo);
            if from <= end.min(hi) {
                return Some(from);
            }
        }
    }
    ranges.clone().next().map(|(start, _)| start)
}
