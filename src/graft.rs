//! Finalized subtrees and grafting them into a builder.
//!
//! A [`FinalizedSubtree`] is the sealed (document, registry) pair of a
//! finished builder. It is immutable and shared, so one subtree can be
//! grafted into any number of parents. Grafting copies the document into
//! place and re-roots every rule path under the graft point.
use std::sync::Arc;

use serde_json::Value;

use crate::builder::{resolve_mut, BodyBuilder, Slot};
use crate::error::{BuildError, Result};
use crate::generators::Generated;
use crate::path::{Path, PathSegment};
use crate::rules::Registry;

#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedSubtree {
    document: Arc<Value>,
    registry: Arc<Registry>,
}

impl FinalizedSubtree {
    pub(crate) fn new(document: Value, registry: Registry) -> Self {
        Self { document: Arc::new(document), registry: Arc::new(registry) }
    }

    /// Scalar-rooted subtree; its rule (if any) sits at the root path.
    pub fn root_value(generated: Generated) -> Self {
        let mut registry = Registry::new();
        if let Some(rule) = generated.rule {
            registry.add(Path::root(), rule);
        }
        Self::new(generated.value, registry)
    }

    pub fn document(&self) -> &Value { &self.document }

    pub fn registry(&self) -> &Registry { &self.registry }

    pub fn matching_rules_json(&self) -> Value { self.registry.to_json() }

    /// Take the pair out, cloning only if it is still shared.
    pub fn into_parts(self) -> (Value, Registry) {
        let document = Arc::try_unwrap(self.document).unwrap_or_else(|shared| (*shared).clone());
        let registry = Arc::try_unwrap(self.registry).unwrap_or_else(|shared| (*shared).clone());
        (document, registry)
    }
}

impl BodyBuilder {
    /// Graft `subtree` into the current container at `slot`.
    pub fn graft(&mut self, slot: impl Into<Slot>, subtree: &FinalizedSubtree) -> Result<&mut Self> {
        let slot = slot.into();
        self.step(|b| {
            let at = b.place("graft", slot, subtree.document().clone())?;
            tracing::debug!(path = %at, rules = subtree.registry().len(), "graft subtree");
            b.registry_mut().merge_rerooted(&at, subtree.registry());
            Ok(())
        })
    }

    /// Graft `subtree` at an absolute `target` path.
    ///
    /// The parent of `target` must already be a container of the matching
    /// kind. An array target may be an existing position (replaced) or one
    /// past the end (appended). Targets enclosing an open container are refused.
    pub fn graft_at(&mut self, target: &Path, subtree: &FinalizedSubtree) -> Result<&mut Self> {
        self.step(|b| {
            let refuse = |reason| BuildError::GraftTarget { path: target.clone(), reason };

            let (parent, last) = match (target.parent(), target.last()) {
                (Some(parent), Some(last)) => (parent, last.clone()),
                _ => return Err(refuse("the root cannot be replaced")),
            };
            if b.open_paths().any(|open| starts_with(open, target)) {
                return Err(refuse("target encloses an open container"));
            }

            let node = resolve_mut(b.root_mut(), &parent).ok_or_else(|| refuse("parent does not exist"))?;
            match (node, last) {
                (Value::Object(map), PathSegment::Key(key)) => {
                    map.insert(key, subtree.document().clone());
                }
                (Value::Array(items), PathSegment::Index(i)) if i < items.len() => {
                    items[i] = subtree.document().clone();
                }
                (Value::Array(items), PathSegment::Index(i)) if i == items.len() => {
                    items.push(subtree.document().clone());
                }
                (Value::Array(_), PathSegment::Index(_)) => return Err(refuse("index past the end of the array")),
                (_, PathSegment::Wildcard) => return Err(refuse("a wildcard is not a position")),
                _ => return Err(refuse("parent is not a container of the right kind")),
            }

            tracing::debug!(path = %target, rules = subtree.registry().len(), "graft subtree");
            b.registry_mut().merge_rerooted(target, subtree.registry());
            Ok(())
        })
    }
}

fn starts_with(path: &Path, prefix: &Path) -> bool {
    path.segments().starts_with(prefix.segments())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators;
    use crate::rules::{MatchingRule, NumberKind};
    use serde_json::json;

    fn address() -> FinalizedSubtree {
        let mut b = BodyBuilder::new();
        b.string_type("street", Some("Main St")).unwrap()
            .integer_type("number", Some(12)).unwrap()
            .value("country", "NZ").unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn graft_reroots_rules_and_copies_document() -> Result<()> {
        let addr = address();
        let mut b = BodyBuilder::new();
        b.graft("home", &addr)?
            .array("previous")?
            .graft(Slot::Next, &addr)?
            .close_array()?;

        assert_eq!(b.document()["home"], json!({ "street": "Main St", "number": 12, "country": "NZ" }));
        assert_eq!(b.document()["previous"][0], b.document()["home"]);
        assert_eq!(b.registry().paths(), vec![
            "$.home.street",
            "$.home.number",
            "$.previous[0].street",
            "$.previous[0].number",
        ]);
        // the source is untouched and still shareable
        assert_eq!(addr.registry().paths(), vec!["$.street", "$.number"]);
        Ok(())
    }

    #[test]
    fn graft_appends_to_rules_already_at_the_point() -> Result<()> {
        let scalar = FinalizedSubtree::root_value(generators::integer_type(Some(5), &Default::default()));
        let mut b = BodyBuilder::new();
        b.add_field("n", json!(0), Some(MatchingRule::MinLength(1)))?;
        b.graft_at(&Path::root().key("n"), &scalar)?;

        assert_eq!(b.document()["n"], json!(5));
        assert_eq!(
            b.registry().get("$.n"),
            Some(&[MatchingRule::MinLength(1), MatchingRule::NumberKind(NumberKind::Integer)][..])
        );
        Ok(())
    }

    #[test]
    fn graft_at_positions_in_arrays() -> Result<()> {
        let addr = address();
        let mut b = BodyBuilder::new();
        b.array("xs")?.value(Slot::Next, 1)?.close_array()?;
        b.graft_at(&Path::root().key("xs").index(0), &addr)?
            .graft_at(&Path::root().key("xs").index(1), &addr)?;
        assert_eq!(b.document()["xs"].as_array().map(Vec::len), Some(2));
        assert!(b.registry().get("$.xs[1].street").is_some());
        Ok(())
    }

    #[test]
    fn graft_targets_must_sit_in_containers() {
        let addr = address();
        let bad = [
            Path::root(),
            Path::root().key("scalar").key("inner"),
            Path::root().key("missing").key("x"),
            Path::root().key("list").wildcard(),
            Path::root().key("list").index(5),
            Path::root().key("list").key("x"),
        ];
        for target in bad {
            let mut b = BodyBuilder::new();
            b.value("scalar", 1).unwrap().array("list").unwrap().close_array().unwrap();
            let err = b.graft_at(&target, &addr).unwrap_err();
            assert!(err.is_structural(), "{target}: {err}");
        }
    }

    #[test]
    fn graft_over_an_open_container_is_refused() {
        let mut b = BodyBuilder::new();
        b.object("open").unwrap();
        let err = b.graft_at(&Path::root().key("open"), &address()).unwrap_err();
        assert!(matches!(err, BuildError::GraftTarget { .. }));
    }

    #[test]
    fn subtrees_are_shareable_across_threads() {
        let addr = address();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let addr = addr.clone();
                std::thread::spawn(move || {
                    let mut b = BodyBuilder::new();
                    b.graft(format!("a{i}"), &addr).unwrap();
                    b.finish().unwrap().registry().len()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 2);
        }
    }

    #[test]
    fn into_parts_returns_the_pair() {
        let (doc, reg) = address().into_parts();
        assert_eq!(doc["country"], json!("NZ"));
        assert_eq!(reg.len(), 2);
    }
}
