//! Name-keyed service registry
//!
//! The `Registry` is the core of the runtime. It maps service names to
//! ready instances or lazy factories and resolves them on demand.

use crate::factory::{Binding, EntryState};
use crate::provider::{FactoryFn, Provider, ProviderSource};
use crate::storage::ServiceStorage;
use crate::{Instance, Result};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Thread-safe, name-keyed service registry.
///
/// Cloning a `Registry` is cheap and yields a handle to the same table, so
/// it can be passed to worker threads or captured by factories.
///
/// # Examples
///
/// ```rust
/// use xcomp::{Instance, Registry};
///
/// struct Settings { name: String }
///
/// let registry = Registry::new();
/// registry.register("Settings", Instance::new(Settings { name: "app".into() }));
///
/// let settings = registry.get_typed::<Settings>("Settings").unwrap().unwrap();
/// assert_eq!(settings.name, "app");
///
/// // Absent names are not an error
/// assert!(registry.get("Missing").unwrap().is_none());
/// ```
#[derive(Clone)]
pub struct Registry {
    /// Shared binding table
    storage: Arc<ServiceStorage>,
}

impl Registry {
    /// Create a new, empty registry.
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "xcomp", "Creating new service registry");

        Self {
            storage: Arc::new(ServiceStorage::new()),
        }
    }

    /// Create a registry with pre-allocated capacity.
    ///
    /// Use this when you know approximately how many services will be registered.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Arc::new(ServiceStorage::with_capacity(capacity)),
        }
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Bind `name` to a ready instance, replacing any previous binding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xcomp::{Instance, Registry};
    ///
    /// let registry = Registry::new();
    /// registry.register("Port", Instance::new(8080u16));
    /// registry.register("Port", Instance::new(9090u16));
    ///
    /// assert_eq!(*registry.get_typed::<u16>("Port").unwrap().unwrap(), 9090);
    /// ```
    #[inline]
    pub fn register(&self, name: impl Into<Arc<str>>, instance: Instance) {
        let name = name.into();
        debug_assert!(!name.is_empty(), "service name must not be empty");

        #[cfg(feature = "logging")]
        debug!(
            target: "xcomp",
            service = &*name,
            instance_type = instance.type_name(),
            "Registering static service"
        );

        let _replaced = self.storage.insert(name, Binding::Static(instance));

        #[cfg(feature = "logging")]
        if _replaced {
            trace!(target: "xcomp", "Previous binding replaced");
        }
    }

    /// Bind `name` to a lazily constructed singleton.
    ///
    /// The factory is not called here; it runs on the first [`get`](Self::get)
    /// and never again. It receives this registry and may call back into it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xcomp::{Instance, Registry};
    ///
    /// struct Pool { size: usize }
    ///
    /// let registry = Registry::new();
    /// registry.register("PoolSize", Instance::new(4usize));
    /// registry.register_factory("Pool", |registry| {
    ///     let size = registry.get_typed::<usize>("PoolSize")?.map_or(1, |s| *s);
    ///     Ok(Instance::new(Pool { size }))
    /// });
    ///
    /// assert_eq!(registry.get_typed::<Pool>("Pool").unwrap().unwrap().size, 4);
    /// ```
    #[inline]
    pub fn register_factory<F>(&self, name: impl Into<Arc<str>>, factory: F)
    where
        F: Fn(&Registry) -> Result<Instance> + Send + Sync + 'static,
    {
        self.register_factory_fn(name.into(), Arc::new(factory));
    }

    /// Register a single provider according to its source.
    pub fn register_provider(&self, provider: Provider) {
        let (name, source) = provider.into_parts();
        match source {
            ProviderSource::Instance(instance) => self.register(name, instance),
            ProviderSource::Factory(factory) => self.register_factory_fn(name, factory),
        }
    }

    fn register_factory_fn(&self, name: Arc<str>, factory: FactoryFn) {
        debug_assert!(!name.is_empty(), "service name must not be empty");

        #[cfg(feature = "logging")]
        debug!(
            target: "xcomp",
            service = &*name,
            "Registering lazy service (will be created on first access)"
        );

        let _replaced = self
            .storage
            .insert(Arc::clone(&name), Binding::lazy(name, factory));

        #[cfg(feature = "logging")]
        if _replaced {
            trace!(target: "xcomp", "Previous binding replaced");
        }
    }

    // =========================================================================
    // Resolution Methods
    // =========================================================================

    /// Resolve a service by name.
    ///
    /// Returns `Ok(None)` if `name` was never registered. Forces construction
    /// of a lazy binding on first access; an `Err` is that construction's
    /// failure, which is recorded and returned again on every later call.
    pub fn get(&self, name: &str) -> Result<Option<Instance>> {
        // The shard lock is released before the binding resolves
        let Some(binding) = self.storage.get(name) else {
            #[cfg(feature = "logging")]
            debug!(target: "xcomp", service = name, "Service not registered");
            return Ok(None);
        };

        #[cfg(feature = "logging")]
        trace!(target: "xcomp", service = name, "Resolving service");

        binding.resolve(self).map(Some)
    }

    /// Resolve a service and view it as `Arc<X>`.
    ///
    /// `None` when the name is absent or the instance is not assignable to `X`.
    #[inline]
    pub fn get_typed<X: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<X>>> {
        Ok(self.get(name)?.and_then(|instance| instance.downcast::<X>()))
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// All registered names, in no particular order. Diagnostics only.
    #[inline]
    pub fn names(&self) -> Vec<String> {
        self.storage.names()
    }

    /// Check if a name is bound, without constructing anything.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.storage.contains(name)
    }

    /// Lifecycle state of the binding for `name`, without constructing anything.
    #[inline]
    pub fn state(&self, name: &str) -> Option<EntryState> {
        self.storage.state(name)
    }

    /// Number of bound names.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("service_count", &self.len())
            .finish()
    }
}
