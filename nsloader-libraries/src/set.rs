//! Ordered soname lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered list of library sonames exposed across a namespace link.
///
/// Order is preserved and duplicates are dropped on insertion. The
/// [`Display`](fmt::Display) form is the colon-joined list the linker
/// expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LibrarySet(Vec<String>);

impl LibrarySet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses a colon-joined list. Empty segments are skipped.
    #[must_use]
    pub fn parse(colon_list: &str) -> Self {
        colon_list.split(':').collect()
    }

    /// Appends a soname unless it is empty or already present.
    pub fn push(&mut self, soname: impl Into<String>) {
        let owned: String = soname.into();
        let soname = owned.trim();
        if soname.is_empty() || self.contains(soname) {
            return;
        }
        self.0.push(soname.to_string());
    }

    /// Returns a new set holding `self` followed by the entries of `other`.
    #[must_use]
    pub fn concat(&self, other: &LibrarySet) -> Self {
        let mut joined = self.clone();
        joined.extend(other.iter().map(str::to_string));
        joined
    }

    pub fn contains(&self, soname: &str) -> bool {
        self.0.iter().any(|s| s == soname)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for LibrarySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

impl<S: Into<String>> Extend<S> for LibrarySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for soname in iter {
            self.push(soname);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for LibrarySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<String>> for LibrarySet {
    fn from(sonames: Vec<String>) -> Self {
        sonames.into_iter().collect()
    }
}

impl From<LibrarySet> for Vec<String> {
    fn from(set: LibrarySet) -> Self {
        set.0
    }
}
