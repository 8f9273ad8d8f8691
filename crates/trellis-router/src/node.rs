//! Radix tree node implementation.
//!
//! Each node owns one path segment. Static children are kept sorted for
//! binary search; parameter children are tried in insertion order so that
//! `/cafes/:id` and `/cafes/:cafe_id/reviews` can share a prefix while each
//! route keeps its own parameter name.

use crate::error::PathError;
use crate::method_router::MethodRouter;
use crate::params::Params;
use http::Method;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "posts")
    Static,
    /// Named parameter (e.g., ":id")
    Param(String),
    /// Catch-all wildcard (e.g., "*path")
    Wildcard(String),
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment
    pub kind: SegmentKind,

    /// Method router for this node (if it's a route endpoint)
    pub methods: Option<MethodRouter<T>>,

    static_children: Vec<Node<T>>,

    param_children: Vec<Node<T>>,

    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn with_kind(segment: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            methods: None,
            static_children: Vec::new(),
            param_children: Vec::new(),
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind("", SegmentKind::Static)
    }

    /// Inserts a route into the tree.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the pattern is malformed (empty parameter
    /// name, or a wildcard that is not the final segment).
    pub fn insert(&mut self, path: &str, methods: MethodRouter<T>) -> Result<(), PathError> {
        let segments = parse_path(path)?;
        self.insert_segments(&segments, methods);
        Ok(())
    }

    fn insert_segments(&mut self, segments: &[(String, SegmentKind)], methods: MethodRouter<T>) {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            match &mut self.methods {
                Some(existing) => existing.merge(methods),
                None => self.methods = Some(methods),
            }
            return;
        };

        match kind {
            SegmentKind::Static => {
                match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(i) => self.static_children[i].insert_segments(remaining, methods),
                    Err(i) => {
                        let mut child = Node::with_kind(segment.clone(), SegmentKind::Static);
                        child.insert_segments(remaining, methods);
                        self.static_children.insert(i, child);
                    }
                }
            }
            SegmentKind::Param(_) => {
                if let Some(child) = self.param_children.iter_mut().find(|c| c.kind == *kind) {
                    child.insert_segments(remaining, methods);
                } else {
                    let mut child = Node::with_kind(segment.clone(), kind.clone());
                    child.insert_segments(remaining, methods);
                    self.param_children.push(child);
                }
            }
            SegmentKind::Wildcard(_) => {
                let child = self
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(Node::with_kind(segment.clone(), kind.clone())));
                match &mut child.methods {
                    Some(existing) => existing.merge(methods),
                    None => child.methods = Some(methods),
                }
            }
        }
    }

    /// Matches a path against the tree.
    ///
    /// Returns the method router and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.match_where(path, &|_| true)
    }

    /// Matches a path, skipping endpoints with no handler for `method`.
    ///
    /// A static segment whose endpoint lacks the verb falls through to
    /// parameter and wildcard siblings, so `DELETE /posts/new` still reaches
    /// `DELETE /posts/:id` when only `GET /posts/new` exists.
    #[must_use]
    pub fn match_method(&self, method: &Method, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.match_where(path, &|methods| methods.handler(method).is_some())
    }

    fn match_where(
        &self,
        path: &str,
        accept: &dyn Fn(&MethodRouter<T>) -> bool,
    ) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params, accept)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
        accept: &dyn Fn(&MethodRouter<T>) -> bool,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref().filter(|methods| accept(methods));
        };

        if let Ok(i) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
        {
            if let Some(found) = self.static_children[i].match_segments(remaining, params, accept) {
                return Some(found);
            }
        }

        for child in &self.param_children {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), *segment);
                if let Some(found) = child.match_segments(remaining, params, accept) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let (SegmentKind::Wildcard(name), Some(methods)) = (&child.kind, &child.methods) {
                if accept(methods) {
                    params.push(name.clone(), segments.join("/"));
                    return Some(methods);
                }
            }
        }

        None
    }
}

/// Splits a pattern into typed segments.
pub(crate) fn parse_path(path: &str) -> Result<Vec<(String, SegmentKind)>, PathError> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = raw.len().saturating_sub(1);

    raw.iter()
        .enumerate()
        .map(|(i, s)| {
            if let Some(name) = s.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PathError::EmptyParam(path.to_string()));
                }
                Ok((s.to_string(), SegmentKind::Param(name.to_string())))
            } else if let Some(name) = s.strip_prefix('*') {
                if i != last {
                    return Err(PathError::WildcardNotLast(path.to_string()));
                }
                Ok((s.to_string(), SegmentKind::Wildcard(name.to_string())))
            } else {
                Ok((s.to_string(), SegmentKind::Static))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_parse_path_kinds() {
        let segments = parse_path("/cafes/:cafe_id/files/*rest").unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], ("cafes".to_string(), SegmentKind::Static));
        assert_eq!(
            segments[1],
            (":cafe_id".to_string(), SegmentKind::Param("cafe_id".to_string()))
        );
        assert_eq!(
            segments[3],
            ("*rest".to_string(), SegmentKind::Wildcard("rest".to_string()))
        );
    }

    #[test]
    fn test_parse_path_rejects_inner_wildcard() {
        assert_eq!(
            parse_path("/files/*rest/more"),
            Err(PathError::WildcardNotLast("/files/*rest/more".to_string()))
        );
    }

    #[test]
    fn test_parse_path_rejects_empty_param() {
        assert!(matches!(parse_path("/posts/:"), Err(PathError::EmptyParam(_))));
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        root.insert("/posts/new", MethodRouter::new().get("new")).unwrap();
        root.insert("/posts/:id", MethodRouter::new().get("show")).unwrap();

        let (methods, params) = root.match_path("/posts/new").unwrap();
        assert_eq!(methods.handler(&Method::GET), Some(&"new"));
        assert!(params.is_empty());

        let (methods, params) = root.match_path("/posts/12").unwrap();
        assert_eq!(methods.handler(&Method::GET), Some(&"show"));
        assert_eq!(params.get("id"), Some("12"));
    }

    #[test]
    fn test_verb_miss_on_static_falls_through_to_param() {
        let mut root = Node::root();
        root.insert("/posts/new", MethodRouter::new().get("new")).unwrap();
        root.insert("/posts/:id", MethodRouter::new().get("show").delete("destroy"))
            .unwrap();

        let (methods, params) = root.match_method(&Method::DELETE, "/posts/new").unwrap();
        assert_eq!(methods.handler(&Method::DELETE), Some(&"destroy"));
        assert_eq!(params.get("id"), Some("new"));

        let (methods, params) = root.match_method(&Method::GET, "/posts/new").unwrap();
        assert_eq!(methods.handler(&Method::GET), Some(&"new"));
        assert!(params.is_empty());

        assert!(root.match_method(&Method::PUT, "/posts/new").is_none());
        assert!(root.match_path("/posts/new").is_some());
    }

    #[test]
    fn test_sibling_params_keep_their_own_names() {
        let mut root = Node::root();
        root.insert("/cafes/:id", MethodRouter::new().get("show")).unwrap();
        root.insert("/cafes/:cafe_id/reviews", MethodRouter::new().get("reviews"))
            .unwrap();

        let (methods, params) = root.match_path("/cafes/3").unwrap();
        assert_eq!(methods.handler(&Method::GET), Some(&"show"));
        assert_eq!(params.get("id"), Some("3"));

        let (methods, params) = root.match_path("/cafes/3/reviews").unwrap();
        assert_eq!(methods.handler(&Method::GET), Some(&"reviews"));
        assert_eq!(params.get("cafe_id"), Some("3"));
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_backtracking_discards_stale_params() {
        let mut root = Node::root();
        root.insert("/a/:x/b", MethodRouter::new().get("first")).unwrap();
        root.insert("/a/:y/c", MethodRouter::new().get("second")).unwrap();

        let (methods, params) = root.match_path("/a/1/c").unwrap();
        assert_eq!(methods.handler(&Method::GET), Some(&"second"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("y"), Some("1"));
    }

    #[test]
    fn test_wildcard_captures_rest() {
        let mut root = Node::root();
        root.insert("/admin/*path", MethodRouter::new().any("admin")).unwrap();

        let (methods, params) = root.match_path("/admin/users/1/edit").unwrap();
        assert_eq!(methods.handler(&Method::DELETE), Some(&"admin"));
        assert_eq!(params.get("path"), Some("users/1/edit"));
        assert!(root.match_path("/admin").is_none());
    }

    #[test]
    fn test_no_match() {
        let mut root = Node::root();
        root.insert("/profile", MethodRouter::new().get("show")).unwrap();

        assert!(root.match_path("/profiles/1").is_none());
    }
}
