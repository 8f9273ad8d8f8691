//! Scope tracking for nested route definitions.
//!
//! A [`Scope`] combines the URL path prefix, the route-name prefix and the
//! container-key namespace in effect while a block of routes is declared.
//! [`ScopeStack`] pushes a child scope on entry to a nested block and must
//! restore the exact parent on exit.

use std::sync::Arc;
use trellis_core::{RoutingError, RoutingResult};

/// The active path, name and key prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    path_prefix: String,
    name_prefix: Vec<String>,
    key_namespace: Vec<String>,
}

impl Scope {
    /// The root scope: every prefix empty.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// URL path prefix, without a trailing slash (`""` at the root).
    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Route-name segments, outermost first.
    #[must_use]
    pub fn name_prefix(&self) -> &[String] {
        &self.name_prefix
    }

    /// Container-key segments, outermost first.
    #[must_use]
    pub fn key_namespace(&self) -> &[String] {
        &self.key_namespace
    }

    /// Prefixes `path` with this scope's path prefix.
    ///
    /// ```
    /// use trellis::scope::{ScopeSegment, ScopeStack};
    ///
    /// let mut stack = ScopeStack::new();
    /// let _token = stack.push(ScopeSegment::new().path("/admin"));
    /// assert_eq!(stack.current().path("/users"), "/admin/users");
    /// assert_eq!(stack.current().path("/"), "/admin");
    /// ```
    #[must_use]
    pub fn path(&self, path: &str) -> String {
        join_paths(&self.path_prefix, path)
    }

    /// Joins the name prefix and `parts` into a route name with `_`.
    #[must_use]
    pub fn name<'a>(&'a self, parts: impl IntoIterator<Item = &'a str>) -> String {
        self.name_prefix
            .iter()
            .map(String::as_str)
            .chain(parts)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }

    fn child(&self, segment: &ScopeSegment) -> Self {
        let mut child = self.clone();
        if let Some(path) = &segment.path {
            child.path_prefix = join_paths(&self.path_prefix, path);
            if child.path_prefix == "/" {
                child.path_prefix.clear();
            }
        }
        if let Some(name) = &segment.name {
            child.name_prefix.push(name.clone());
        }
        if let Some(key) = &segment.key {
            child.key_namespace.push(key.clone());
        }
        child
    }
}

/// Joins two path fragments into a normalized absolute path.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    let segments: Vec<&str> = prefix
        .split('/')
        .chain(path.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// What a nested block adds to the enclosing scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSegment {
    path: Option<String>,
    name: Option<String>,
    key: Option<String>,
}

impl ScopeSegment {
    /// A segment that adds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path segment.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a route-name segment.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a container-key segment.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Proof of a push; must be handed back to [`ScopeStack::pop`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pushed scope must be popped with its token"]
pub struct ScopeToken {
    depth: usize,
}

/// Stack of scopes. Never empty: the root scope is always at the bottom.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    stack: Vec<Arc<Scope>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Creates a stack holding only the root scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![Arc::new(Scope::root())],
        }
    }

    /// The innermost scope.
    #[must_use]
    pub fn current(&self) -> &Arc<Scope> {
        // never empty: pop refuses to remove the root
        &self.stack[self.stack.len() - 1]
    }

    /// Number of scopes, root included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Enters a child of the current scope.
    pub fn push(&mut self, segment: ScopeSegment) -> ScopeToken {
        let child = self.current().child(&segment);
        self.stack.push(Arc::new(child));
        ScopeToken {
            depth: self.stack.len(),
        }
    }

    /// Leaves the scope entered by `token`, restoring its parent.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::EmptyScopeStack`] if only the root remains and
    /// [`RoutingError::ScopeMismatch`] if `token` is not for the innermost
    /// scope.
    pub fn pop(&mut self, token: ScopeToken) -> RoutingResult<()> {
        let found = self.stack.len();
        if found <= 1 {
            return Err(RoutingError::EmptyScopeStack);
        }
        if token.depth != found {
            return Err(RoutingError::ScopeMismatch {
                expected: token.depth,
                found,
            });
        }
        self.stack.pop();
        Ok(())
    }
}
