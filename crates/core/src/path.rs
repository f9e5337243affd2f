//! Property paths.
//!
//! A `Path` locates a property in the observable graph as the ordered list of
//! property names leading to it from the state root, e.g. `corge.waldo`.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// An ordered sequence of property-name segments.
///
/// Two paths are equal when they have the same segments in the same order.
/// The empty path denotes the state root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Returns the empty path.
    #[inline]
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a dot-separated path. Empty segments are skipped, so `""`
    /// parses to the root path.
    pub fn parse(s: &str) -> Self {
        Self::new(s.split('.').filter(|segment| !segment.is_empty()))
    }

    /// Returns the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this is the root path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns a new path with `name` appended.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(name.into());
        Self { segments }
    }

    /// Returns a new path with `name` in front, as seen from the container
    /// that holds the property under `name`.
    pub fn prepend(&self, name: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(name.into());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// Appends a segment in place.
    pub fn push(&mut self, name: impl Into<String>) {
        self.segments.push(name.into());
    }

    /// Returns true if `prefix` is an ancestor of (or equal to) this path.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns true if one path is an ancestor of (or equal to) the other.
    pub fn is_related_to(&self, other: &Path) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Iterates over the segments as string slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().map(|s| s.to_string()))
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a str;
    type IntoIter = core::iter::Map<core::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}
