//! Matching rules and the path-indexed registry that collects them.
//!
//! A rule says how a value in a real document is checked instead of being
//! compared literally. Each path keeps an ordered list of rules; lists only
//! ever grow.
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::path::{Path, ROOT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Decimal,
    Number,
}

impl NumberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::Integer => "integer",
            NumberKind::Decimal => "decimal",
            NumberKind::Number => "number",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchingRule {
    /// Same JSON type as the example, any value.
    ExactType,
    Regex(String),
    NumberKind(NumberKind),
    DateFormat(String),
    TimeFormat(String),
    DateTimeFormat(String),
    MinLength(usize),
    MaxLength(usize),
    /// Value must contain the substring.
    Include(String),
    /// Value is produced from `expression` at comparison time, rendered with `format`.
    GeneratedExpression { expression: String, format: String },
    /// Every key of an object must satisfy all of `rules`.
    EachKey { rules: Vec<MatchingRule>, value: Option<String> },
}

impl MatchingRule {
    /// Pact-style matcher object.
    pub fn to_json(&self) -> Value {
        match self {
            MatchingRule::ExactType => json!({ "match": "type" }),
            MatchingRule::Regex(rx) => json!({ "match": "regex", "regex": rx }),
            MatchingRule::NumberKind(kind) => json!({ "match": kind.as_str() }),
            MatchingRule::DateFormat(p) => json!({ "match": "date", "format": p }),
            MatchingRule::TimeFormat(p) => json!({ "match": "time", "format": p }),
            MatchingRule::DateTimeFormat(p) => json!({ "match": "timestamp", "format": p }),
            MatchingRule::MinLength(n) => json!({ "match": "type", "min": n }),
            MatchingRule::MaxLength(n) => json!({ "match": "type", "max": n }),
            MatchingRule::Include(s) => json!({ "match": "include", "value": s }),
            MatchingRule::GeneratedExpression { expression, format } => json!({
                "match": "expression",
                "expression": expression,
                "format": format,
            }),
            MatchingRule::EachKey { rules, value } => {
                let mut out = json!({
                    "match": "eachKey",
                    "rules": rules.iter().map(MatchingRule::to_json).collect::<Vec<_>>(),
                });
                if let Some(value) = value {
                    out["value"] = json!(value);
                }
                out
            }
        }
    }
}

// ------------------------------ Registry ---------------------------------- //

/// Rendered path → ordered rules, in first-registration order.
///
/// Keys are the rendered form: keys are never escaped, so distinct segment
/// sequences such as `["a.b"]` and `["a", "b"]` share one rule list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    rules: IndexMap<String, Vec<MatchingRule>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.rules.len() }

    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Append `rule` to the list at `path`.
    pub fn add(&mut self, path: Path, rule: MatchingRule) {
        self.push(path.render(), rule);
    }

    pub fn extend_at<I>(&mut self, path: Path, rules: I)
    where
        I: IntoIterator<Item = MatchingRule>,
    {
        let rendered = path.render();
        for rule in rules {
            self.push(rendered.clone(), rule);
        }
    }

    /// Append every entry of `other`, with its paths prefixed by `prefix`.
    /// Existing entries are kept; colliding paths get the new rules appended.
    pub fn merge_rerooted(&mut self, prefix: &Path, other: &Registry) {
        let base = prefix.render();
        for (rel, rules) in &other.rules {
            let at = format!("{base}{}", rel.strip_prefix(ROOT).unwrap_or(rel));
            for rule in rules {
                self.push(at.clone(), rule.clone());
            }
        }
    }

    pub fn rules_at(&self, path: &Path) -> Option<&[MatchingRule]> { self.get(&path.render()) }

    /// Lookup by rendered path, e.g. `$.items[*].id`.
    pub fn get(&self, rendered: &str) -> Option<&[MatchingRule]> {
        self.rules.get(rendered).map(Vec::as_slice)
    }

    /// Rendered paths in registration order.
    pub fn paths(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MatchingRule])> {
        self.rules.iter().map(|(p, r)| (p.as_str(), r.as_slice()))
    }

    /// Pact-v3 style `matchingRules` body section.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for (path, rules) in &self.rules {
            out.insert(path.clone(), json!({
                "combine": "AND",
                "matchers": rules.iter().map(MatchingRule::to_json).collect::<Vec<_>>(),
            }));
        }
        Value::Object(out)
    }

    fn push(&mut self, rendered: String, rule: MatchingRule) {
        tracing::trace!(path = %rendered, ?rule, "register matching rule");
        self.rules.entry(rendered).or_default().push(rule);
    }
}

// ------------------------------- Tests ------------------------------------ //
