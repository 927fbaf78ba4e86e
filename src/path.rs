//! Canonical paths into a contract body.
//!
//! Grammar: the root renders as `$`; a key step appends `.` + the key verbatim
//! (no escaping); an index step appends `[i]`; a wildcard step appends `[*]`.
//! Index and wildcard steps attach directly to the previous segment.
use std::fmt;

pub const ROOT: &str = "$";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
    Wildcard,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{k}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Wildcard => f.write_str("[*]"),
        }
    }
}

/// Ordered segments from the root. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self { Self(Vec::new()) }

    pub fn is_root(&self) -> bool { self.0.is_empty() }

    pub fn segments(&self) -> &[PathSegment] { &self.0 }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// New path with `segment` appended; `self` is untouched.
    pub fn extend(&self, segment: PathSegment) -> Self {
        let mut out = self.0.clone();
        out.push(segment);
        Self(out)
    }

    pub fn key(&self, name: impl Into<String>) -> Self { self.extend(PathSegment::Key(name.into())) }

    pub fn index(&self, i: usize) -> Self { self.extend(PathSegment::Index(i)) }

    pub fn wildcard(&self) -> Self { self.extend(PathSegment::Wildcard) }

    /// `self ++ other`, used to re-root a subtree's paths under a graft point.
    pub fn concat(&self, other: &Path) -> Self {
        let mut out = Vec::with_capacity(self.0.len() + other.0.len());
        out.extend(self.0.iter().cloned());
        out.extend(other.0.iter().cloned());
        Self(out)
    }

    pub fn parent(&self) -> Option<Path> {
        match self.0.split_last() {
            Some((_, init)) => Some(Self(init.to_vec())),
            None => None,
        }
    }

    pub fn last(&self) -> Option<&PathSegment> { self.0.last() }

    pub fn render(&self) -> String { self.to_string() }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT)?;
        for segment in &self.0 {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ------------------------------- Tests ------------------------------------ //
