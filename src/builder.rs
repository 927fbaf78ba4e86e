//! The fluent body builder.
//!
//! A builder owns the example document, the rule registry and a stack of
//! open containers. Frames record the kind and path of each open container;
//! the container itself is looked up from the root by path, so there are no
//! parent pointers. Every call either completes or fails immediately, and a
//! failed builder refuses further calls.
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{Map, Number, Value};

use crate::config::Config;
use crate::error::{BuildError, ContainerKind, Result};
use crate::generators::{self, time, Generated, TemporalKind};
use crate::graft::FinalizedSubtree;
use crate::path::{Path, PathSegment};
use crate::rules::{MatchingRule, Registry};

/// Where a call puts its value: a named field of the current object, or the
/// next position of the current array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Key(String),
    Next,
}

impl From<&str> for Slot {
    fn from(key: &str) -> Self { Slot::Key(key.to_string()) }
}

impl From<String> for Slot {
    fn from(key: String) -> Self { Slot::Key(key) }
}

impl From<&String> for Slot {
    fn from(key: &String) -> Self { Slot::Key(key.clone()) }
}

#[derive(Clone, Debug)]
struct Frame {
    kind: ContainerKind,
    path: Path,
}

#[derive(Debug)]
pub struct BodyBuilder {
    root: Value,
    registry: Registry,
    root_frame: Frame,
    stack: Vec<Frame>,
    config: Config,
    poisoned: bool,
}

impl Default for BodyBuilder {
    fn default() -> Self { Self::new() }
}

impl BodyBuilder {
    /// Object-rooted builder with the default configuration.
    pub fn new() -> Self { Self::rooted(ContainerKind::Object, Config::default()) }

    pub fn with_config(config: Config) -> Self { Self::rooted(ContainerKind::Object, config) }

    pub fn array_root() -> Self { Self::rooted(ContainerKind::Array, Config::default()) }

    pub fn array_root_with_config(config: Config) -> Self { Self::rooted(ContainerKind::Array, config) }

    pub(crate) fn rooted(kind: ContainerKind, config: Config) -> Self {
        Self {
            root: empty_container(kind),
            registry: Registry::new(),
            root_frame: Frame { kind, path: Path::root() },
            stack: Vec::new(),
            config,
            poisoned: false,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn document(&self) -> &Value { &self.root }

    pub fn registry(&self) -> &Registry { &self.registry }

    /// Number of containers opened and not yet closed.
    pub fn depth(&self) -> usize { self.stack.len() }

    pub fn current_path(&self) -> &Path { &self.top().path }

    pub fn current_kind(&self) -> ContainerKind { self.top().kind }

    /// Seal the builder. All containers must be closed.
    pub fn finish(self) -> Result<FinalizedSubtree> {
        if self.poisoned {
            return Err(BuildError::Poisoned);
        }
        if let Some(open) = self.stack.last() {
            return Err(BuildError::Unclosed { open: self.stack.len(), path: open.path.clone() });
        }
        Ok(FinalizedSubtree::new(self.root, self.registry))
    }

    // ---------------------------- Stack plumbing ---------------------------- //

    fn top(&self) -> &Frame { self.stack.last().unwrap_or(&self.root_frame) }

    /// Run one call. A failure poisons the builder.
    pub(crate) fn step<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.poisoned {
            return Err(BuildError::Poisoned);
        }
        match f(self) {
            Ok(()) => Ok(self),
            Err(err) => {
                tracing::debug!(error = %err, path = %self.top().path, "builder poisoned");
                self.poisoned = true;
                Err(err)
            }
        }
    }

    /// Write `node` into the current container and return the path it now has.
    pub(crate) fn place(&mut self, call: &'static str, slot: Slot, node: Value) -> Result<Path> {
        let Frame { kind, path: base } = self.top().clone();
        let container = resolve_mut(&mut self.root, &base).ok_or_else(|| BuildError::GraftTarget {
            path: base.clone(),
            reason: "open container was replaced",
        })?;
        match (container, slot) {
            (Value::Object(map), Slot::Key(key)) => {
                let path = base.key(key.as_str());
                map.insert(key, node);
                Ok(path)
            }
            (Value::Array(items), Slot::Next) => {
                let path = base.index(items.len());
                items.push(node);
                Ok(path)
            }
            (_, slot) => Err(BuildError::ContainerMismatch {
                call,
                expected: match slot {
                    Slot::Key(_) => ContainerKind::Object,
                    Slot::Next => ContainerKind::Array,
                },
                found: kind,
                path: base,
            }),
        }
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry { &mut self.registry }

    pub(crate) fn open_paths(&self) -> impl Iterator<Item = &Path> { self.stack.iter().map(|f| &f.path) }

    pub(crate) fn root_mut(&mut self) -> &mut Value { &mut self.root }

    /// Key `name` in an object, next position in an array.
    fn default_slot(&self, name: &str) -> Slot {
        match self.top().kind {
            ContainerKind::Object => Slot::Key(name.to_string()),
            ContainerKind::Array => Slot::Next,
        }
    }

    fn emit(&mut self, call: &'static str, slot: Slot, generated: Result<Generated>) -> Result<&mut Self> {
        self.step(|b| {
            let Generated { value, rule } = generated?;
            let path = b.place(call, slot, value)?;
            if let Some(rule) = rule {
                b.registry.add(path, rule);
            }
            Ok(())
        })
    }

    fn push(&mut self, call: &'static str, kind: ContainerKind, slot: Slot) -> Result<&mut Self> {
        self.step(|b| {
            let path = b.place(call, slot, empty_container(kind))?;
            tracing::debug!(path = %path, %kind, "open container");
            b.stack.push(Frame { kind, path });
            Ok(())
        })
    }

    fn close(&mut self, call: &'static str, expected: Option<ContainerKind>) -> Result<&mut Self> {
        self.step(|b| {
            let found = match b.stack.last() {
                Some(frame) => frame.kind,
                None => return Err(BuildError::PopRoot),
            };
            if let Some(expected) = expected.filter(|k| *k != found) {
                return Err(BuildError::ContainerMismatch {
                    call,
                    expected,
                    found,
                    path: b.top().path.clone(),
                });
            }
            if let Some(frame) = b.stack.pop() {
                tracing::debug!(path = %frame.path, kind = %frame.kind, "close container");
            }
            Ok(())
        })
    }

    // ------------------------------ Core ops -------------------------------- //

    pub fn push_object(&mut self, slot: impl Into<Slot>) -> Result<&mut Self> {
        self.push("push_object", ContainerKind::Object, slot.into())
    }

    pub fn push_array(&mut self, slot: impl Into<Slot>) -> Result<&mut Self> {
        self.push("push_array", ContainerKind::Array, slot.into())
    }

    /// Close the innermost open container, whatever its kind.
    pub fn pop(&mut self) -> Result<&mut Self> { self.close("pop", None) }

    pub fn add_field(&mut self, key: &str, node: Value, rule: Option<MatchingRule>) -> Result<&mut Self> {
        self.emit("add_field", Slot::from(key), Ok(Generated { value: node, rule }))
    }

    pub fn add_element(&mut self, node: Value, rule: Option<MatchingRule>) -> Result<&mut Self> {
        self.emit("add_element", Slot::Next, Ok(Generated { value: node, rule }))
    }

    /// Place a generated value (example + optional rule).
    pub fn add(&mut self, slot: impl Into<Slot>, generated: Generated) -> Result<&mut Self> {
        self.emit("add", slot.into(), Ok(generated))
    }

    // ----------------------------- Containers ------------------------------- //

    pub fn object(&mut self, slot: impl Into<Slot>) -> Result<&mut Self> {
        self.push("object", ContainerKind::Object, slot.into())
    }

    pub fn array(&mut self, slot: impl Into<Slot>) -> Result<&mut Self> {
        self.push("array", ContainerKind::Array, slot.into())
    }

    pub fn close_object(&mut self) -> Result<&mut Self> {
        self.close("close_object", Some(ContainerKind::Object))
    }

    pub fn close_array(&mut self) -> Result<&mut Self> {
        self.close("close_array", Some(ContainerKind::Array))
    }

    // ---------------------------- Exact values ------------------------------ //

    pub fn value(&mut self, slot: impl Into<Slot>, value: impl Into<Value>) -> Result<&mut Self> {
        self.emit("value", slot.into(), Ok(generators::literal(value)))
    }

    /// `None` writes null.
    pub fn string_value(&mut self, slot: impl Into<Slot>, example: Option<&str>) -> Result<&mut Self> {
        self.emit("string_value", slot.into(), Ok(generators::string_value(example)))
    }

    pub fn number_value(&mut self, slot: impl Into<Slot>, n: impl Into<Number>) -> Result<&mut Self> {
        self.emit("number_value", slot.into(), Ok(generators::number_value(n)))
    }

    pub fn decimal_value(&mut self, slot: impl Into<Slot>, n: f64) -> Result<&mut Self> {
        self.emit("decimal_value", slot.into(), Ok(generators::decimal_value(n)))
    }

    pub fn boolean_value(&mut self, slot: impl Into<Slot>, b: bool) -> Result<&mut Self> {
        self.emit("boolean_value", slot.into(), Ok(generators::boolean_value(b)))
    }

    pub fn null_value(&mut self, slot: impl Into<Slot>) -> Result<&mut Self> {
        self.emit("null_value", slot.into(), Ok(generators::null_value()))
    }

    /// Instant formatted with `pattern`, compared literally.
    pub fn datetime_value(
        &mut self,
        slot: impl Into<Slot>,
        pattern: &str,
        at: Option<DateTime<Utc>>,
        zone: Option<FixedOffset>,
    ) -> Result<&mut Self> {
        let g = generators::datetime_value(pattern, at, zone, &self.config);
        self.emit("datetime_value", slot.into(), g)
    }

    // ---------------------------- Typed values ------------------------------ //

    pub fn string_type(&mut self, slot: impl Into<Slot>, example: Option<&str>) -> Result<&mut Self> {
        let g = generators::string_type(example, &self.config.samples);
        self.emit("string_type", slot.into(), Ok(g))
    }

    pub fn integer_type(&mut self, slot: impl Into<Slot>, example: Option<i64>) -> Result<&mut Self> {
        let g = generators::integer_type(example, &self.config.samples);
        self.emit("integer_type", slot.into(), Ok(g))
    }

    pub fn decimal_type(&mut self, slot: impl Into<Slot>, example: Option<f64>) -> Result<&mut Self> {
        let g = generators::decimal_type(example, &self.config.samples);
        self.emit("decimal_type", slot.into(), Ok(g))
    }

    pub fn number_type(&mut self, slot: impl Into<Slot>, example: Option<Number>) -> Result<&mut Self> {
        let g = generators::number_type(example, &self.config.samples);
        self.emit("number_type", slot.into(), Ok(g))
    }

    pub fn boolean_type(&mut self, slot: impl Into<Slot>, example: Option<bool>) -> Result<&mut Self> {
        let g = generators::boolean_type(example, &self.config.samples);
        self.emit("boolean_type", slot.into(), Ok(g))
    }

    /// Identifier under `"id"` (or the next array position).
    pub fn id(&mut self) -> Result<&mut Self> {
        let slot = self.default_slot("id");
        self.id_at(slot, None)
    }

    pub fn id_at(&mut self, slot: impl Into<Slot>, example: Option<i64>) -> Result<&mut Self> {
        let g = generators::id(example, &self.config.samples);
        self.emit("id", slot.into(), Ok(g))
    }

    pub fn hex_value(&mut self, slot: impl Into<Slot>, example: Option<&str>) -> Result<&mut Self> {
        let g = generators::hex_value(example, &self.config.samples);
        self.emit("hex_value", slot.into(), g)
    }

    pub fn uuid(&mut self, slot: impl Into<Slot>, example: Option<&str>) -> Result<&mut Self> {
        let g = generators::uuid(example, &self.config.samples);
        self.emit("uuid", slot.into(), g)
    }

    pub fn ip_address(&mut self, slot: impl Into<Slot>, example: Option<&str>) -> Result<&mut Self> {
        let g = generators::ip_address(example, &self.config.samples);
        self.emit("ip_address", slot.into(), g)
    }

    pub fn string_matcher(
        &mut self,
        slot: impl Into<Slot>,
        pattern: &str,
        example: Option<&str>,
    ) -> Result<&mut Self> {
        self.emit("string_matcher", slot.into(), generators::string_matcher(pattern, example))
    }

    pub fn includes_str(&mut self, slot: impl Into<Slot>, value: &str) -> Result<&mut Self> {
        self.emit("includes_str", slot.into(), Ok(generators::includes_str(value)))
    }

    /// Constrain every key of the current object with `rules`.
    pub fn each_key(&mut self, rules: Vec<MatchingRule>, value: Option<&str>) -> Result<&mut Self> {
        let value = value.map(str::to_string);
        self.step(|b| {
            let Frame { kind, path } = b.top().clone();
            if kind != ContainerKind::Object {
                return Err(BuildError::ContainerMismatch {
                    call: "each_key",
                    expected: ContainerKind::Object,
                    found: kind,
                    path,
                });
            }
            b.registry.add(path, MatchingRule::EachKey { rules, value });
            Ok(())
        })
    }

    // ------------------------------ Date/time ------------------------------- //

    pub fn date(&mut self, slot: impl Into<Slot>, pattern: &str) -> Result<&mut Self> {
        self.date_at(slot, pattern, None, None)
    }

    pub fn time(&mut self, slot: impl Into<Slot>, pattern: &str) -> Result<&mut Self> {
        self.time_at(slot, pattern, None, None)
    }

    pub fn datetime(&mut self, slot: impl Into<Slot>, pattern: &str) -> Result<&mut Self> {
        self.datetime_at(slot, pattern, None, None)
    }

    pub fn date_at(
        &mut self,
        slot: impl Into<Slot>,
        pattern: &str,
        at: Option<DateTime<Utc>>,
        zone: Option<FixedOffset>,
    ) -> Result<&mut Self> {
        let g = generators::temporal(TemporalKind::Date, pattern, at, zone, &self.config);
        self.emit("date", slot.into(), g)
    }

    pub fn time_at(
        &mut self,
        slot: impl Into<Slot>,
        pattern: &str,
        at: Option<DateTime<Utc>>,
        zone: Option<FixedOffset>,
    ) -> Result<&mut Self> {
        let g = generators::temporal(TemporalKind::Time, pattern, at, zone, &self.config);
        self.emit("time", slot.into(), g)
    }

    pub fn datetime_at(
        &mut self,
        slot: impl Into<Slot>,
        pattern: &str,
        at: Option<DateTime<Utc>>,
        zone: Option<FixedOffset>,
    ) -> Result<&mut Self> {
        let g = generators::temporal(TemporalKind::DateTime, pattern, at, zone, &self.config);
        self.emit("datetime", slot.into(), g)
    }

    /// `yyyy-MM-dd'T'HH:mm:ss` under `"timestamp"` (or the next array position).
    pub fn timestamp(&mut self) -> Result<&mut Self> {
        let slot = self.default_slot("timestamp");
        self.datetime(slot, time::DEFAULT_DATETIME)
    }

    /// `yyyy-MM-dd` under `"date"` (or the next array position).
    pub fn local_date(&mut self) -> Result<&mut Self> {
        let slot = self.default_slot("date");
        self.date(slot, time::DEFAULT_DATE)
    }

    /// `HH:mm:ss` under `"time"` (or the next array position).
    pub fn local_time(&mut self) -> Result<&mut Self> {
        let slot = self.default_slot("time");
        self.time(slot, time::DEFAULT_TIME)
    }

    pub fn date_expression(&mut self, slot: impl Into<Slot>, expression: &str, pattern: &str) -> Result<&mut Self> {
        let g = generators::temporal_expression(expression, pattern, &self.config);
        self.emit("date_expression", slot.into(), g)
    }

    pub fn time_expression(&mut self, slot: impl Into<Slot>, expression: &str, pattern: &str) -> Result<&mut Self> {
        let g = generators::temporal_expression(expression, pattern, &self.config);
        self.emit("time_expression", slot.into(), g)
    }

    pub fn datetime_expression(&mut self, slot: impl Into<Slot>, expression: &str, pattern: &str) -> Result<&mut Self> {
        let g = generators::temporal_expression(expression, pattern, &self.config);
        self.emit("datetime_expression", slot.into(), g)
    }
}

fn empty_container(kind: ContainerKind) -> Value {
    match kind {
        ContainerKind::Object => Value::Object(Map::new()),
        ContainerKind::Array => Value::Array(Vec::new()),
    }
}

/// Follow `path` from `root`. Wildcards address no single node.
pub(crate) fn resolve_mut<'v>(root: &'v mut Value, path: &Path) -> Option<&'v mut Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match segment {
            PathSegment::Key(k) => node.as_object_mut()?.get_mut(k)?,
            PathSegment::Index(i) => node.as_array_mut()?.get_mut(*i)?,
            PathSegment::Wildcard => return None,
        };
    }
    Some(node)
}

// ------------------------------- Tests ------------------------------------ //
