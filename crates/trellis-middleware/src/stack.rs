//! Ordered middleware stack with relative insertion.
//!
//! Middleware is declared during route definition, either appended or placed
//! `before`/`after` another entry by identifier. Relative positions are
//! resolved only when the stack is frozen, so an entry may refer to middleware
//! declared later in the same definition.
//!
//! Entries remember the path prefix of the scope that declared them. Freezing
//! produces one [`Chain`] per distinct prefix; each chain runs the root entries
//! first, then those of every enclosing prefix, down to its own.

use crate::middleware::{BoxFuture, Middleware, Next};
use std::fmt;
use std::sync::Arc;
use trellis_core::{BoxedEndpoint, Endpoint, Request, Response, RoutingError, RoutingResult};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Where an entry is placed relative to the rest of the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// After everything declared so far.
    Append,
    /// Immediately before the named middleware, behind earlier entries
    /// anchored before it.
    Before(String),
    /// Immediately after the named middleware, behind earlier entries
    /// anchored after it.
    After(String),
}

impl Position {
    /// Places an entry before `id`.
    pub fn before(id: impl Into<String>) -> Self {
        Self::Before(id.into())
    }

    /// Places an entry after `id`.
    pub fn after(id: impl Into<String>) -> Self {
        Self::After(id.into())
    }

    fn anchor(&self) -> Option<&str> {
        match self {
            Self::Append => None,
            Self::Before(id) | Self::After(id) => Some(id),
        }
    }
}

/// A declared middleware.
#[derive(Clone)]
pub struct MiddlewareEntry {
    id: String,
    middleware: BoxedMiddleware,
    position: Position,
    prefix: String,
}

impl MiddlewareEntry {
    /// Identifier other entries anchor on.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Requested position.
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Path prefix of the scope that declared the entry (`""` at the root).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareEntry")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Middleware declarations in the order they were made.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareStack {
    entries: Vec<MiddlewareEntry>,
}

impl MiddlewareStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a middleware for requests under `prefix`.
    ///
    /// Anchors are not checked here; see [`MiddlewareStack::freeze`].
    pub fn use_middleware(
        &mut self,
        prefix: impl Into<String>,
        middleware: impl Middleware,
        position: Position,
    ) {
        self.push(prefix, Arc::new(middleware), position);
    }

    /// Declares an already boxed middleware.
    pub fn push(&mut self, prefix: impl Into<String>, middleware: BoxedMiddleware, position: Position) {
        let entry = MiddlewareEntry {
            id: middleware.name().to_string(),
            middleware,
            position,
            prefix: normalize_prefix(&prefix.into()),
        };
        tracing::debug!(
            middleware = %entry.id,
            position = ?entry.position,
            prefix = %entry.prefix,
            "middleware declared"
        );
        self.entries.push(entry);
    }

    /// Returns the declarations, unordered.
    #[must_use]
    pub fn entries(&self) -> &[MiddlewareEntry] {
        &self.entries
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the resolved identifiers that apply under `prefix`, outermost first.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownMiddleware`] when an anchor never
    /// resolves.
    pub fn ordered_ids(&self, prefix: &str) -> RoutingResult<Vec<String>> {
        Ok(self
            .resolve(&normalize_prefix(prefix))?
            .into_iter()
            .map(|entry| entry.id.clone())
            .collect())
    }

    /// Wraps `inner` with the root-level middleware only.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownMiddleware`] when an anchor never
    /// resolves.
    pub fn to_chain(&self, inner: BoxedEndpoint) -> RoutingResult<Chain> {
        self.chain_for("", inner)
    }

    /// Freezes the stack around `inner`, building one chain per prefix.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownMiddleware`] when an anchor never
    /// resolves.
    pub fn freeze(&self, inner: BoxedEndpoint) -> RoutingResult<ScopedChains> {
        let root = self.chain_for("", Arc::clone(&inner))?;

        let mut prefixes: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !entry.prefix.is_empty() && !prefixes.contains(&entry.prefix.as_str()) {
                prefixes.push(&entry.prefix);
            }
        }

        let mut scoped = prefixes
            .into_iter()
            .map(|prefix| {
                Ok(ScopedChain {
                    prefix: prefix.to_string(),
                    segments: split(prefix).into_iter().map(str::to_string).collect(),
                    chain: self.chain_for(prefix, Arc::clone(&inner))?,
                })
            })
            .collect::<RoutingResult<Vec<_>>>()?;
        scoped.sort_by(|a, b| b.segments.len().cmp(&a.segments.len()));

        tracing::info!(
            middleware = self.entries.len(),
            chains = scoped.len() + 1,
            "middleware stack frozen"
        );
        Ok(ScopedChains { root, scoped })
    }

    fn chain_for(&self, prefix: &str, inner: BoxedEndpoint) -> RoutingResult<Chain> {
        let middleware = self
            .resolve(prefix)?
            .into_iter()
            .map(|entry| Arc::clone(&entry.middleware))
            .collect();
        Ok(Chain { middleware, inner })
    }

    /// Orders every entry that applies under `prefix`.
    ///
    /// Enclosing prefixes come first, root outermost. Within one prefix see
    /// [`order`].
    fn resolve(&self, prefix: &str) -> RoutingResult<Vec<&MiddlewareEntry>> {
        let mut levels: Vec<&str> = self
            .entries
            .iter()
            .map(|entry| entry.prefix.as_str())
            .filter(|candidate| is_ancestor(candidate, prefix))
            .collect();
        levels.sort_by_key(|level| split(level).len());
        levels.dedup();

        let mut ordered = Vec::new();
        for level in levels {
            let declared: Vec<&MiddlewareEntry> =
                self.entries.iter().filter(|entry| entry.prefix == level).collect();
            ordered.extend(order(declared)?);
        }
        Ok(ordered)
    }
}

/// Orders the entries declared at one prefix.
///
/// Appended entries form the spine in declaration order. A relative entry
/// hangs off the first entry carrying its anchor's id; entries sharing an
/// anchor and a side keep declaration order, and each is expanded with its
/// own relatives before the next one.
fn order(declared: Vec<&MiddlewareEntry>) -> RoutingResult<Vec<&MiddlewareEntry>> {
    let mut spine = Vec::new();
    let mut before: Vec<Vec<usize>> = vec![Vec::new(); declared.len()];
    let mut after: Vec<Vec<usize>> = vec![Vec::new(); declared.len()];

    for (i, entry) in declared.iter().enumerate() {
        let (side, id) = match &entry.position {
            Position::Append => {
                spine.push(i);
                continue;
            }
            Position::Before(id) => (&mut before, id),
            Position::After(id) => (&mut after, id),
        };
        let anchor = declared
            .iter()
            .position(|candidate| candidate.id == *id)
            .ok_or_else(|| unknown_anchor(entry))?;
        side[anchor].push(i);
    }

    let mut placed = Vec::with_capacity(declared.len());
    for i in spine {
        expand(i, &before, &after, &mut placed);
    }

    // Entries anchored in a cycle never hang off the spine.
    if let Some(stuck) = (0..declared.len()).find(|i| !placed.contains(i)) {
        return Err(unknown_anchor(declared[stuck]));
    }
    Ok(placed.into_iter().map(|i| declared[i]).collect())
}

fn expand(i: usize, before: &[Vec<usize>], after: &[Vec<usize>], placed: &mut Vec<usize>) {
    for &b in &before[i] {
        expand(b, before, after, placed);
    }
    placed.push(i);
    for &a in &after[i] {
        expand(a, before, after, placed);
    }
}

fn unknown_anchor(entry: &MiddlewareEntry) -> RoutingError {
    RoutingError::UnknownMiddleware {
        middleware: entry.id.clone(),
        anchor: entry.position.anchor().unwrap_or_default().to_string(),
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let segments = split(prefix);
    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True if `ancestor` is `path` or one of its enclosing prefixes.
fn is_ancestor(ancestor: &str, path: &str) -> bool {
    let ancestor = split(ancestor);
    let path = split(path);
    ancestor.len() <= path.len() && ancestor.iter().zip(&path).all(|(a, b)| a == b)
}

/// Whether a request path falls under a prefix pattern.
///
/// `:name` segments match any one segment and a `*name` segment matches the
/// remainder.
fn prefix_matches(pattern: &[&str], path: &[&str]) -> bool {
    for (i, segment) in pattern.iter().enumerate() {
        if segment.starts_with('*') {
            return true;
        }
        match path.get(i) {
            Some(actual) if segment.starts_with(':') || segment == actual => {}
            _ => return false,
        }
    }
    true
}

/// Middleware wrapped around an endpoint, in resolved order.
///
/// Implements [`Endpoint`]: calling the chain runs the first middleware,
/// which runs the next, down to the wrapped endpoint.
#[derive(Clone)]
pub struct Chain {
    middleware: Vec<BoxedMiddleware>,
    inner: BoxedEndpoint,
}

impl Chain {
    /// Builds a chain from already ordered middleware.
    #[must_use]
    pub fn new(middleware: Vec<BoxedMiddleware>, inner: BoxedEndpoint) -> Self {
        Self { middleware, inner }
    }

    /// Identifiers of the middleware in this chain, outermost first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Returns `true` if the chain only calls the endpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl Endpoint for Chain {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        let mut next = Next::endpoint(self.inner.as_ref());
        for middleware in self.middleware.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        Box::pin(next.run(request))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("middleware", &self.names())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct ScopedChain {
    prefix: String,
    segments: Vec<String>,
    chain: Chain,
}

/// The frozen stack: one chain per declared prefix.
///
/// Matched routes pick their chain by pattern with [`ScopedChains::for_route`].
/// Requests that match no route fall back to [`ScopedChains::select`], which
/// matches the request path against each prefix.
#[derive(Debug, Clone)]
pub struct ScopedChains {
    root: Chain,
    scoped: Vec<ScopedChain>,
}

impl ScopedChains {
    /// Returns the chain of the most specific prefix matching the request
    /// path `path`, or the root chain.
    #[must_use]
    pub fn select(&self, path: &str) -> &Chain {
        let path = split(path);
        self.scoped
            .iter()
            .find(|scoped| {
                let pattern: Vec<&str> = scoped.segments.iter().map(String::as_str).collect();
                prefix_matches(&pattern, &path)
            })
            .map_or(&self.root, |scoped| &scoped.chain)
    }

    /// Returns the chain for a route declared with path pattern `pattern`.
    ///
    /// Picks the most specific prefix that `pattern` literally starts with,
    /// segment by segment, so `/posts/:post_id` serves
    /// `/posts/:post_id/comments` but not `/posts/:id`.
    #[must_use]
    pub fn for_route(&self, pattern: &str) -> &Chain {
        self.scoped
            .iter()
            .find(|scoped| is_ancestor(&scoped.prefix, pattern))
            .map_or(&self.root, |scoped| &scoped.chain)
    }

    /// Returns the chain declared at the root.
    #[must_use]
    pub const fn root(&self) -> &Chain {
        &self.root
    }

    /// Returns the scoped prefixes, most specific first.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.scoped.iter().map(|scoped| scoped.prefix.as_str())
    }
}

impl Endpoint for ScopedChains {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        let chain = self.select(request.uri().path());
        chain.call(request)
    }
}
