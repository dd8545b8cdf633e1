//! Declarative module graphs
//!
//! A module is a list of providers plus a list of imported modules. Modules
//! are built before any registry exists and flattened into one with
//! [`Registry::register_module`].

use crate::provider::Provider;
use crate::{DiError, Instance, Registry, Result};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Identity of a module during flattening.
///
/// Two modules with the same id on one import path form a cycle. Names play
/// no part in this; they are only used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(IdRepr);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum IdRepr {
    /// Address of a shared module definition
    Shared(usize),
    /// One module per implementing type
    Type(TypeId),
    /// One module per (type, key)
    Keyed(TypeId, u64),
}

impl ModuleId {
    /// Every value of `M` is the same module.
    #[inline]
    pub fn of_type<M: ?Sized + 'static>() -> Self {
        Self(IdRepr::Type(TypeId::of::<M>()))
    }

    /// Values of `M` are told apart by `key`.
    #[inline]
    pub fn keyed<M: ?Sized + 'static>(key: u64) -> Self {
        Self(IdRepr::Keyed(TypeId::of::<M>(), key))
    }

    /// The definition behind `def`; clones of the `Arc` are the same module.
    #[inline]
    pub(crate) fn of_shared<T>(def: &Arc<T>) -> Self {
        Self(IdRepr::Shared(Arc::as_ptr(def) as *const () as usize))
    }
}

/// A node in the module graph.
///
/// [`ModuleBuilder`] produces [`BasicModule`]; implement the trait directly
/// for modules that compute their providers or imports.
pub trait Module: Send + Sync + 'static {
    /// Display name, used in logs and in `CyclicImport` reports.
    fn name(&self) -> &str;

    /// Identity used for cycle detection.
    ///
    /// Defaults to the implementing type, which suits unit-struct modules.
    /// Types whose values are distinct modules should override this with
    /// [`ModuleId::keyed`].
    fn id(&self) -> ModuleId {
        ModuleId::of_type::<Self>()
    }

    /// Providers this module contributes, in registration order.
    fn providers(&self) -> Vec<Provider>;

    /// Modules to register before this one, in registration order.
    fn imports(&self) -> Vec<Arc<dyn Module>>;
}

/// Generate a unique name for an unnamed module.
fn anonymous_name() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("module-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

struct ModuleDef {
    name: String,
    providers: Vec<Provider>,
    imports: Vec<Arc<dyn Module>>,
}

/// Immutable module produced by [`ModuleBuilder::build`].
///
/// Cheap to clone; clones share the same definition.
#[derive(Clone)]
pub struct BasicModule {
    def: Arc<ModuleDef>,
}

impl Module for BasicModule {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn id(&self) -> ModuleId {
        ModuleId::of_shared(&self.def)
    }

    fn providers(&self) -> Vec<Provider> {
        self.def.providers.clone()
    }

    fn imports(&self) -> Vec<Arc<dyn Module>> {
        self.def.imports.clone()
    }
}

impl fmt::Debug for BasicModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let imports: Vec<String> = self
            .def
            .imports
            .iter()
            .map(|m| m.name().to_owned())
            .collect();
        f.debug_struct("BasicModule")
            .field("name", &self.def.name)
            .field("providers", &self.def.providers)
            .field("imports", &imports)
            .finish()
    }
}

/// Fluent builder for [`BasicModule`].
///
/// The order of calls is the registration order, and therefore the override
/// order for providers sharing a name.
///
/// # Examples
///
/// ```rust
/// use xcomp::{Instance, ModuleBuilder, Registry};
///
/// struct Settings { env: &'static str }
///
/// let infra = ModuleBuilder::named("infra")
///     .add_provider("Settings", Instance::new(Settings { env: "dev" }))
///     .build();
///
/// let app = ModuleBuilder::named("app")
///     .import(infra)
///     .add_provider("Settings", Instance::new(Settings { env: "prod" }))
///     .build();
///
/// let registry = Registry::new();
/// registry.register_module(&app).unwrap();
///
/// // The importing module's provider wins
/// let settings = registry.get_typed::<Settings>("Settings").unwrap().unwrap();
/// assert_eq!(settings.env, "prod");
/// ```
#[derive(Default)]
pub struct ModuleBuilder {
    name: Option<String>,
    providers: Vec<Provider>,
    imports: Vec<Arc<dyn Module>>,
}

impl ModuleBuilder {
    /// Start an empty, unnamed module.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty module with an explicit name.
    #[inline]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a static instance provider.
    #[inline]
    pub fn add_provider(self, name: impl Into<Arc<str>>, instance: Instance) -> Self {
        self.provider(Provider::instance(name, instance))
    }

    /// Add a lazily constructed provider.
    #[inline]
    pub fn add_factory_provider<F>(self, name: impl Into<Arc<str>>, factory: F) -> Self
    where
        F: Fn(&Registry) -> Result<Instance> + Send + Sync + 'static,
    {
        self.provider(Provider::factory(name, factory))
    }

    /// Add a prepared provider.
    #[inline]
    pub fn provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Import a module; its providers are registered before this module's own.
    #[inline]
    pub fn import<M: Module + 'static>(mut self, module: M) -> Self {
        self.imports.push(Arc::new(module));
        self
    }

    /// Import a shared module handle.
    #[inline]
    pub fn import_shared(mut self, module: Arc<dyn Module>) -> Self {
        self.imports.push(module);
        self
    }

    /// Freeze into an immutable module.
    pub fn build(self) -> BasicModule {
        BasicModule {
            def: Arc::new(ModuleDef {
                name: self.name.unwrap_or_else(anonymous_name),
                providers: self.providers,
                imports: self.imports,
            }),
        }
    }
}

impl Registry {
    /// Flatten a module graph into this registry.
    ///
    /// Imports are registered depth-first in declaration order, each fully
    /// (including its own imports) before the next, and all of them before
    /// the module's own providers. Fails with `CyclicImport` if a module (by
    /// [`Module::id`]) is reached again while it is still being flattened;
    /// the reported cycle starts at its first occurrence. Providers
    /// registered before the cycle was found stay registered.
    pub fn register_module<M: Module + ?Sized>(&self, module: &M) -> Result<()> {
        let mut path = Vec::new();
        let _count = self.register_module_on_path(module, &mut path)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "xcomp",
            module = module.name(),
            providers_registered = _count,
            service_count = self.len(),
            "Module graph registered"
        );

        Ok(())
    }

    fn register_module_on_path<M: Module + ?Sized>(
        &self,
        module: &M,
        path: &mut Vec<(ModuleId, String)>,
    ) -> Result<usize> {
        let name = module.name();
        let id = module.id();

        if let Some(start) = path.iter().position(|(seen, _)| *seen == id) {
            let mut cycle: Vec<String> = path[start..].iter().map(|(_, n)| n.clone()).collect();
            cycle.push(name.to_owned());

            #[cfg(feature = "logging")]
            warn!(
                target: "xcomp",
                module = name,
                cycle = %cycle.join(" -> "),
                "Cyclic module import detected"
            );

            return Err(DiError::CyclicImport {
                module: name.to_owned(),
                cycle,
            });
        }

        path.push((id, name.to_owned()));

        let mut count = 0;
        for import in module.imports() {
            count += self.register_module_on_path(import.as_ref(), path)?;
        }

        let providers = module.providers();

        #[cfg(feature = "logging")]
        trace!(
            target: "xcomp",
            module = name,
            depth = path.len() - 1,
            providers = providers.len(),
            "Registering module providers"
        );

        count += providers.len();
        for provider in providers {
            self.register_provider(provider);
        }

        path.pop();
        Ok(count)
    }
}
