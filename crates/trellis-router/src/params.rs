//! Captured path parameters.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::str::FromStr;

/// Nested resources rarely go deeper than this many ids.
const INLINE: usize = 4;

/// Values captured by `:name` and `*name` segments, in path order.
///
/// ```rust
/// use trellis_router::Params;
///
/// let mut params = Params::new();
/// params.push("cafe_id", "7");
/// params.push("id", "42");
///
/// assert_eq!(params.get("cafe_id"), Some("7"));
/// assert_eq!(params.parse::<u32>("id"), Some(Ok(42)));
/// assert!(!params.contains("slug"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    pairs: SmallVec<[(String, String); INLINE]>,
}

impl Params {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a captured value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// The value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value.as_str()))
    }

    /// Parses the value captured for `name`.
    ///
    /// `None` when nothing was captured under that name.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.get(name).map(str::parse)
    }

    /// Whether `name` was captured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// `(name, value)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.into_iter()
    }

    // Backtracking out of a param branch.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.pairs.truncate(len);
    }

    /// The parameters as a string-keyed map.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.pairs.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let as_strs: fn(&'a (String, String)) -> (&'a str, &'a str) =
            |(key, value)| (key.as_str(), value.as_str());
        self.pairs.iter().map(as_strs)
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
