//! Component registry contract and an in-memory container.
//!
//! Each slice owns a registry mapping dot-delimited keys
//! (`actions.posts.index`) to components. Components are built lazily from
//! factories and memoized: a key is constructed at most once no matter how
//! many lazy endpoints or threads ask for it.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::registry::{Component, ComponentRegistry, Container};
//! use trellis_core::{endpoint_fn, Response, ResponseExt};
//! use http::StatusCode;
//!
//! let container = Container::new("main");
//! container.register_factory("actions.posts.index", || {
//!     Ok(Component::endpoint(endpoint_fn(|_req| async {
//!         Response::text(StatusCode::OK, "posts")
//!     })))
//! });
//!
//! assert!(container.key_registered("actions.posts.index"));
//! assert!(container.resolve_or_raise("actions.posts.index").is_ok());
//! ```

use crate::endpoint::{BoxedEndpoint, Endpoint};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Error returned by a component registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Nothing is registered under the key.
    #[error("component {key:?} is not registered")]
    NotRegistered {
        /// The requested key.
        key: String,
    },

    /// The factory for the key failed.
    #[error("failed to construct component {key:?}: {reason}")]
    Construction {
        /// The requested key.
        key: String,
        /// The factory's error message.
        reason: String,
    },
}

/// A value stored in a component registry.
///
/// Routing only needs to tell handlers apart from everything else a slice
/// registers (repositories, settings, ...), so the two cases are explicit
/// variants rather than a runtime capability check.
#[derive(Clone)]
pub enum Component {
    /// A component that handles requests.
    Endpoint(BoxedEndpoint),
    /// Any other component.
    Value(Arc<dyn Any + Send + Sync>),
}

impl Component {
    /// Wraps a request handler.
    pub fn endpoint(endpoint: impl Endpoint) -> Self {
        Self::Endpoint(Arc::new(endpoint))
    }

    /// Wraps a non-callable value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    /// Returns the endpoint if this component handles requests.
    #[must_use]
    pub fn as_endpoint(&self) -> Option<&BoxedEndpoint> {
        match self {
            Self::Endpoint(endpoint) => Some(endpoint),
            Self::Value(_) => None,
        }
    }

    /// Returns the value downcast to `T`, if it is a value of that type.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Value(value) => value.clone().downcast::<T>().ok(),
            Self::Endpoint(_) => None,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint(_) => f.write_str("Component::Endpoint"),
            Self::Value(_) => f.write_str("Component::Value"),
        }
    }
}

/// The registry contract the routing core consumes.
///
/// Implementations own memoization: `resolve_or_raise` must construct each
/// key at most once, even under concurrent calls. The routing core adds no
/// locking of its own around resolution.
pub trait ComponentRegistry: Send + Sync + 'static {
    /// Name of the slice this registry belongs to.
    fn name(&self) -> &str;

    /// Returns the component for `key`, constructing it on first use.
    fn resolve_or_raise(&self, key: &str) -> Result<Component, RegistryError>;

    /// Returns true if `key` is registered (built or not).
    fn key_registered(&self, key: &str) -> bool;

    /// Returns true once the registry has finished booting.
    ///
    /// A booted registry will not gain keys later, so a missing key is a
    /// configuration error that can be reported before traffic arrives.
    fn booted(&self) -> bool;
}

type Factory = Box<dyn Fn() -> anyhow::Result<Component> + Send + Sync>;

struct Entry {
    factory: Option<Factory>,
    instance: Mutex<Option<Component>>,
}

/// A string-keyed, thread-safe component container.
///
/// Registration and booting take `&self`, so a container can be shared with
/// the router (which only references it) before it has finished booting.
pub struct Container {
    name: String,
    entries: RwLock<HashMap<String, Arc<Entry>>>,
    booted: AtomicBool,
}

impl Container {
    /// Creates a new empty container for the named slice.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
            booted: AtomicBool::new(false),
        }
    }

    /// Registers an already-built component.
    pub fn register(&self, key: impl Into<String>, component: Component) {
        let entry = Entry {
            factory: None,
            instance: Mutex::new(Some(component)),
        };
        self.entries.write().insert(key.into(), Arc::new(entry));
    }

    /// Registers an endpoint instance.
    pub fn register_endpoint(&self, key: impl Into<String>, endpoint: impl Endpoint) {
        self.register(key, Component::endpoint(endpoint));
    }

    /// Registers a factory that builds the component on first resolution.
    pub fn register_factory<F>(&self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> anyhow::Result<Component> + Send + Sync + 'static,
    {
        let entry = Entry {
            factory: Some(Box::new(factory)),
            instance: Mutex::new(None),
        };
        self.entries.write().insert(key.into(), Arc::new(entry));
    }

    /// Marks the container as booted.
    pub fn boot(&self) {
        self.booted.store(true, Ordering::Release);
        tracing::debug!(slice = %self.name, components = self.len(), "container booted");
    }

    /// Returns the registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ComponentRegistry for Container {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve_or_raise(&self, key: &str) -> Result<Component, RegistryError> {
        let entry = self
            .entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotRegistered {
                key: key.to_string(),
            })?;

        // Held across construction so concurrent callers wait for one build.
        let mut instance = entry.instance.lock();
        if let Some(component) = instance.as_ref() {
            return Ok(component.clone());
        }

        let factory = entry.factory.as_ref().ok_or_else(|| RegistryError::NotRegistered {
            key: key.to_string(),
        })?;
        let component = factory().map_err(|e| RegistryError::Construction {
            key: key.to_string(),
            reason: format!("{e:#}"),
        })?;
        tracing::debug!(slice = %self.name, key, "component constructed");
        *instance = Some(component.clone());
        Ok(component)
    }

    fn key_registered(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    fn booted(&self) -> bool {
        self.booted.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("component_count", &self.len())
            .field("booted", &self.booted())
            .finish()
    }
}
