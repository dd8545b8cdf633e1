//! Providers: the declarative (name, instance-or-factory) pairing
//!
//! A [`Provider`] is what a module holds before anything is registered.

use crate::{Instance, Registry, Result};
use std::fmt;
use std::sync::Arc;

/// Marker trait for values that can be stored in the registry.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
/// You never need to implement this manually.
pub trait Injectable: Send + Sync + 'static {
    /// Returns the type name for debugging
    #[inline]
    fn type_name_of() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type-erased factory function. Receives the registry it is being resolved
/// from so it can look up, register or inject further services.
pub type FactoryFn = Arc<dyn Fn(&Registry) -> Result<Instance> + Send + Sync>;

/// Where a provider's value comes from.
#[derive(Clone)]
pub enum ProviderSource {
    /// Ready-made value, registered as-is
    Instance(Instance),
    /// Deferred construction, run at most once on first `get`
    Factory(FactoryFn),
}

/// A named service declaration.
///
/// Always has a name and exactly one source.
///
/// # Examples
///
/// ```rust
/// use xcomp::{Instance, Provider};
///
/// struct Settings { debug: bool }
///
/// let fixed = Provider::instance("Settings", Instance::new(Settings { debug: true }));
/// let lazy = Provider::factory("Settings", |_| Ok(Instance::new(Settings { debug: false })));
///
/// assert!(!fixed.is_factory());
/// assert!(lazy.is_factory());
/// ```
#[derive(Clone)]
pub struct Provider {
    name: Arc<str>,
    source: ProviderSource,
}

impl Provider {
    /// Provider for a static instance.
    #[inline]
    pub fn instance(name: impl Into<Arc<str>>, instance: Instance) -> Self {
        Self {
            name: name.into(),
            source: ProviderSource::Instance(instance),
        }
    }

    /// Provider for a lazily constructed singleton.
    #[inline]
    pub fn factory<F>(name: impl Into<Arc<str>>, factory: F) -> Self
    where
        F: Fn(&Registry) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            source: ProviderSource::Factory(Arc::new(factory)),
        }
    }

    /// Service name this provider binds.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The provider's source.
    #[inline]
    pub fn source(&self) -> &ProviderSource {
        &self.source
    }

    /// Whether this provider defers construction to a factory.
    #[inline]
    pub fn is_factory(&self) -> bool {
        matches!(self.source, ProviderSource::Factory(_))
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (Arc<str>, ProviderSource) {
        (self.name, self.source)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ProviderSource::Instance(instance) => instance.type_name(),
            ProviderSource::Factory(_) => "<factory>",
        };
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("source", &source)
            .finish()
    }
}
