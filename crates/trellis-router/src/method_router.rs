//! HTTP method-based routing.
//!
//! [`MethodRouter`] maps HTTP methods to handlers for a single path. A
//! catch-all `any` slot serves methods that have no dedicated handler, which
//! is how mounted sub-applications receive every verb.

use http::Method;

/// Maps HTTP methods to handlers for a single route.
///
/// # Example
///
/// ```rust
/// use trellis_router::MethodRouter;
/// use http::Method;
///
/// let router = MethodRouter::new()
///     .get("posts.index")
///     .post("posts.create");
///
/// assert_eq!(router.handler(&Method::GET), Some(&"posts.index"));
/// assert_eq!(router.handler(&Method::HEAD), Some(&"posts.index"));
/// assert_eq!(router.handler(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    get: Option<T>,
    post: Option<T>,
    put: Option<T>,
    delete: Option<T>,
    patch: Option<T>,
    head: Option<T>,
    options: Option<T>,
    trace: Option<T>,
    connect: Option<T>,
    /// Fallback for every method without a dedicated slot
    any: Option<T>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            get: None,
            post: None,
            put: None,
            delete: None,
            patch: None,
            head: None,
            options: None,
            trace: None,
            connect: None,
            any: None,
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a GET handler.
    #[must_use]
    pub fn get(mut self, handler: T) -> Self {
        self.get = Some(handler);
        self
    }

    /// Registers a POST handler.
    #[must_use]
    pub fn post(mut self, handler: T) -> Self {
        self.post = Some(handler);
        self
    }

    /// Registers a PUT handler.
    #[must_use]
    pub fn put(mut self, handler: T) -> Self {
        self.put = Some(handler);
        self
    }

    /// Registers a PATCH handler.
    #[must_use]
    pub fn patch(mut self, handler: T) -> Self {
        self.patch = Some(handler);
        self
    }

    /// Registers a DELETE handler.
    #[must_use]
    pub fn delete(mut self, handler: T) -> Self {
        self.delete = Some(handler);
        self
    }

    /// Registers a handler used for any method without its own slot.
    #[must_use]
    pub fn any(mut self, handler: T) -> Self {
        self.any = Some(handler);
        self
    }

    /// Registers a handler for a specific method.
    ///
    /// Extension methods outside the standard nine are ignored.
    #[must_use]
    pub fn method(mut self, method: &Method, handler: T) -> Self {
        if let Some(slot) = self.slot_mut(method) {
            *slot = Some(handler);
        }
        self
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<T>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            Method::HEAD => Some(&mut self.head),
            Method::OPTIONS => Some(&mut self.options),
            Method::TRACE => Some(&mut self.trace),
            Method::CONNECT => Some(&mut self.connect),
            _ => None,
        }
    }

    fn slot(&self, method: &Method) -> Option<&T> {
        match *method {
            Method::GET => self.get.as_ref(),
            Method::POST => self.post.as_ref(),
            Method::PUT => self.put.as_ref(),
            Method::DELETE => self.delete.as_ref(),
            Method::PATCH => self.patch.as_ref(),
            // HEAD is answered by the GET handler unless registered explicitly
            Method::HEAD => self.head.as_ref().or(self.get.as_ref()),
            Method::OPTIONS => self.options.as_ref(),
            Method::TRACE => self.trace.as_ref(),
            Method::CONNECT => self.connect.as_ref(),
            _ => None,
        }
    }

    /// Returns the handler for a given HTTP method.
    #[must_use]
    pub fn handler(&self, method: &Method) -> Option<&T> {
        self.slot(method).or(self.any.as_ref())
    }

    /// Merges another method router into this one.
    ///
    /// Slots already filled here are kept; the first registration for a
    /// method wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trellis_router::MethodRouter;
    /// use http::Method;
    ///
    /// let mut router = MethodRouter::new().get("first");
    /// router.merge(MethodRouter::new().get("second").post("create"));
    ///
    /// assert_eq!(router.handler(&Method::GET), Some(&"first"));
    /// assert_eq!(router.handler(&Method::POST), Some(&"create"));
    /// ```
    pub fn merge(&mut self, other: MethodRouter<T>) {
        fn keep_first<T>(slot: &mut Option<T>, other: Option<T>) {
            if slot.is_none() {
                *slot = other;
            }
        }

        keep_first(&mut self.get, other.get);
        keep_first(&mut self.post, other.post);
        keep_first(&mut self.put, other.put);
        keep_first(&mut self.delete, other.delete);
        keep_first(&mut self.patch, other.patch);
        keep_first(&mut self.head, other.head);
        keep_first(&mut self.options, other.options);
        keep_first(&mut self.trace, other.trace);
        keep_first(&mut self.connect, other.connect);
        keep_first(&mut self.any, other.any);
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.allowed_methods().is_empty()
    }

    /// Returns the methods this route answers, in a stable order.
    ///
    /// A route with an `any` handler answers every standard method.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        const STANDARD: [Method; 9] = [
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::TRACE,
            Method::CONNECT,
        ];

        STANDARD
            .into_iter()
            .filter(|m| self.handler(m).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_router_new() {
        let router: MethodRouter<&str> = MethodRouter::new();
        assert!(!router.has_any_method());
    }

    #[test]
    fn test_method_router_multiple() {
        let router = MethodRouter::new()
            .get("show")
            .post("create")
            .put("replace")
            .patch("update")
            .delete("destroy");

        assert_eq!(router.handler(&Method::GET), Some(&"show"));
        assert_eq!(router.handler(&Method::POST), Some(&"create"));
        assert_eq!(router.handler(&Method::PUT), Some(&"replace"));
        assert_eq!(router.handler(&Method::PATCH), Some(&"update"));
        assert_eq!(router.handler(&Method::DELETE), Some(&"destroy"));
        assert_eq!(router.handler(&Method::OPTIONS), None);
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let router = MethodRouter::new().get("show");
        assert_eq!(router.handler(&Method::HEAD), Some(&"show"));

        let explicit = MethodRouter::new().get("show").method(&Method::HEAD, "head");
        assert_eq!(explicit.handler(&Method::HEAD), Some(&"head"));
    }

    #[test]
    fn test_any_is_a_fallback() {
        let router = MethodRouter::new().post("create").any("mounted");
        assert_eq!(router.handler(&Method::POST), Some(&"create"));
        assert_eq!(router.handler(&Method::DELETE), Some(&"mounted"));
        assert_eq!(router.allowed_methods().len(), 9);
    }

    #[test]
    fn test_merge_does_not_overwrite() {
        let mut router = MethodRouter::new().get("original");
        router.merge(MethodRouter::new().get("replacement").delete("destroy"));

        assert_eq!(router.handler(&Method::GET), Some(&"original"));
        assert_eq!(router.handler(&Method::DELETE), Some(&"destroy"));
    }

    #[test]
    fn test_allowed_methods() {
        let router = MethodRouter::new().get("index").post("create");
        assert_eq!(
            router.allowed_methods(),
            vec![Method::GET, Method::HEAD, Method::POST]
        );
    }

    #[test]
    fn test_extension_method_is_ignored() {
        let custom = Method::from_bytes(b"PURGE").unwrap();
        let router = MethodRouter::new().method(&custom, "purge");
        assert!(!router.has_any_method());
        assert_eq!(router.handler(&custom), None);
    }
}
