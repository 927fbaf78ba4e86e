//! Arrays described by one element shape and a length constraint.
//!
//! The example array holds `examples` copies of a single element. The real
//! array only has to satisfy the declared bounds, and every real element is
//! checked against the element's rules, registered under `container[*]`.
use serde_json::Value;

use crate::builder::{BodyBuilder, Slot};
use crate::error::{BuildError, ContainerKind, Result};
use crate::generators::Generated;
use crate::graft::FinalizedSubtree;
use crate::rules::MatchingRule;

/// Length bounds plus how many example elements to generate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cardinality {
    pub min: Option<usize>,
    pub max: Option<usize>,
    /// `None` uses the configured sample count.
    pub examples: Option<usize>,
}

impl Cardinality {
    /// Any length; every element must look like the template.
    pub fn each() -> Self { Self::default() }

    pub fn at_least(min: usize) -> Self { Self { min: Some(min), ..Self::default() } }

    pub fn at_most(max: usize) -> Self { Self { max: Some(max), ..Self::default() } }

    pub fn between(min: usize, max: usize) -> Self {
        Self { min: Some(min), max: Some(max), ..Self::default() }
    }

    pub fn with_examples(mut self, examples: usize) -> Self {
        self.examples = Some(examples);
        self
    }

    fn validate(&self) -> Result<()> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(BuildError::Cardinality { min, max }),
            _ => Ok(()),
        }
    }

    /// Rules for the container itself.
    fn container_rules(&self) -> Vec<MatchingRule> {
        if self.min.is_none() && self.max.is_none() {
            return vec![MatchingRule::ExactType];
        }
        self.min
            .map(MatchingRule::MinLength)
            .into_iter()
            .chain(self.max.map(MatchingRule::MaxLength))
            .collect()
    }
}

pub type Template<'a> = Box<dyn FnOnce(&mut BodyBuilder) -> Result<&mut BodyBuilder> + 'a>;

/// What every element looks like.
pub enum Element<'a> {
    /// A scalar, exact or matched.
    Value(Generated),
    /// A prebuilt subtree.
    Subtree(&'a FinalizedSubtree),
    /// Calls run once on a fresh builder rooted at the given container kind.
    Template(ContainerKind, Template<'a>),
}

impl<'a> Element<'a> {
    pub fn object<F>(build: F) -> Self
    where
        F: FnOnce(&mut BodyBuilder) -> Result<&mut BodyBuilder> + 'a,
    {
        Element::Template(ContainerKind::Object, Box::new(build))
    }

    pub fn array<F>(build: F) -> Self
    where
        F: FnOnce(&mut BodyBuilder) -> Result<&mut BodyBuilder> + 'a,
    {
        Element::Template(ContainerKind::Array, Box::new(build))
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Value(g) => f.debug_tuple("Value").field(g).finish(),
            Element::Subtree(s) => f.debug_tuple("Subtree").field(s).finish(),
            Element::Template(kind, _) => f.debug_tuple("Template").field(kind).finish(),
        }
    }
}

impl From<Generated> for Element<'_> {
    fn from(g: Generated) -> Self { Element::Value(g) }
}

impl<'a> From<&'a FinalizedSubtree> for Element<'a> {
    fn from(s: &'a FinalizedSubtree) -> Self { Element::Subtree(s) }
}

impl BodyBuilder {
    /// Place an array of `examples` copies of `element` at `slot`, constrained
    /// by `cardinality`.
    pub fn array_like<'a>(
        &mut self,
        slot: impl Into<Slot>,
        cardinality: Cardinality,
        element: impl Into<Element<'a>>,
    ) -> Result<&mut Self> {
        let slot = slot.into();
        let element = element.into();
        self.step(|b| {
            cardinality.validate()?;
            let shape = b.realize(element)?;
            let count = cardinality.examples.unwrap_or(b.config().samples.examples);

            let items = vec![shape.document().clone(); count];
            let at = b.place("array_like", slot, Value::Array(items))?;
            tracing::debug!(
                path = %at,
                min = ?cardinality.min,
                max = ?cardinality.max,
                examples = count,
                "array-like container"
            );

            b.registry_mut().extend_at(at.clone(), cardinality.container_rules());
            b.registry_mut().merge_rerooted(&at.wildcard(), shape.registry());
            Ok(())
        })
    }

    pub fn each_like<'a>(&mut self, slot: impl Into<Slot>, element: impl Into<Element<'a>>) -> Result<&mut Self> {
        self.array_like(slot, Cardinality::each(), element)
    }

    pub fn min_array_like<'a>(
        &mut self,
        slot: impl Into<Slot>,
        min: usize,
        element: impl Into<Element<'a>>,
    ) -> Result<&mut Self> {
        self.array_like(slot, Cardinality::at_least(min), element)
    }

    pub fn max_array_like<'a>(
        &mut self,
        slot: impl Into<Slot>,
        max: usize,
        element: impl Into<Element<'a>>,
    ) -> Result<&mut Self> {
        self.array_like(slot, Cardinality::at_most(max), element)
    }

    pub fn min_max_array_like<'a>(
        &mut self,
        slot: impl Into<Slot>,
        min: usize,
        max: usize,
        element: impl Into<Element<'a>>,
    ) -> Result<&mut Self> {
        self.array_like(slot, Cardinality::between(min, max), element)
    }

    /// Turn any element descriptor into a sealed subtree.
    fn realize(&self, element: Element<'_>) -> Result<FinalizedSubtree> {
        match element {
            Element::Value(g) => Ok(FinalizedSubtree::root_value(g)),
            Element::Subtree(s) => Ok(s.clone()),
            Element::Template(kind, build) => {
                let mut sub = BodyBuilder::rooted(kind, self.config().clone());
                build(&mut sub)?;
                sub.finish()
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
