//! Fluent builder for example JSON contract bodies.
//!
//! A [`BodyBuilder`] produces two things at once: an example document and a
//! registry of matching rules keyed by canonical path (`$.items[*].id`). Exact
//! calls pin a value; typed calls write an illustrative example and register
//! the rule a real value must satisfy.
//!
//! ```
//! use json_contract::{BodyBuilder, Element, Slot};
//!
//! let mut body = BodyBuilder::new();
//! body.id()?
//!     .string_type("name", Some("Widget"))?
//!     .min_array_like("tags", 1, Element::object(|t| t.string_type("label", None)))?
//!     .array("sizes")?
//!     .integer_type(Slot::Next, Some(3))?
//!     .close_array()?;
//! let contract = body.finish()?;
//!
//! assert_eq!(contract.document()["tags"][0]["label"], "string");
//! assert!(contract.registry().get("$.tags[*].label").is_some());
//! # Ok::<(), json_contract::BuildError>(())
//! ```
pub mod builder;
pub mod cardinality;
pub mod config;
pub mod error;
pub mod generators;
pub mod graft;
pub mod path;
pub mod rules;

pub use builder::{BodyBuilder, Slot};
pub use cardinality::{Cardinality, Element};
pub use config::{Clock, Config, Samples};
pub use error::{BuildError, ContainerKind, ErrorKind, Result};
pub use generators::{DatePattern, Generated, TemporalKind};
pub use graft::FinalizedSubtree;
pub use path::{Path, PathSegment};
pub use rules::{MatchingRule, NumberKind, Registry};
