//! Field injection
//!
//! A type opts into injection by implementing [`Inject`], normally through
//! `#[derive(Inject)]` with `#[inject("ServiceName")]` on each field to wire.
//! The generated `inject` walks the annotated fields in declaration order
//! and assigns each from the registry by name.
//!
//! Supported field shapes are `Arc<X>` and `Option<Arc<X>>`, where `X` is a
//! concrete type or a `dyn Trait` capability. A registered instance is
//! assignable when `X` is its registered type or one of its declared
//! capabilities (see [`Instance::provides`](crate::Instance::provides)).
//!
//! Injection stops at the first failing field. Fields assigned before the
//! failure keep their new values.

use crate::{DiError, Registry, Result};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Static description of one annotated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InjectionPoint {
    /// Field name on the target type
    pub field: &'static str,
    /// Service name the field is wired from
    pub service: &'static str,
    /// Type the service must be assignable to
    pub expected: &'static str,
}

/// Types whose fields can be wired from a [`Registry`].
///
/// # Examples
///
/// A hand-written implementation, equivalent to what `#[derive(Inject)]`
/// generates:
///
/// ```rust
/// use xcomp::{Inject, InjectionPoint, Instance, Registry, Result};
/// use std::sync::Arc;
///
/// struct Settings { url: String }
///
/// #[derive(Default)]
/// struct Repository {
///     settings: Option<Arc<Settings>>,
///     hits: u64,
/// }
///
/// impl Inject for Repository {
///     fn injection_points() -> Vec<InjectionPoint> {
///         vec![InjectionPoint {
///             field: "settings",
///             service: "Settings",
///             expected: std::any::type_name::<Settings>(),
///         }]
///     }
///
///     fn inject(&mut self, registry: &Registry) -> Result<()> {
///         self.settings = Some(registry.resolve_field::<Settings>("Settings", "settings")?);
///         Ok(())
///     }
/// }
///
/// let registry = Registry::new();
/// registry.register("Settings", Instance::new(Settings { url: "postgres://".into() }));
///
/// let repo: Repository = registry.autowire().unwrap();
/// assert_eq!(repo.settings.unwrap().url, "postgres://");
/// ```
pub trait Inject {
    /// The annotated fields, in the order they are injected.
    fn injection_points() -> Vec<InjectionPoint>
    where
        Self: Sized;

    /// Assign every annotated field from `registry`.
    fn inject(&mut self, registry: &Registry) -> Result<()>;
}

impl Registry {
    /// Wire the annotated fields of `target` in place.
    ///
    /// Fails with `ServiceNotFound` or `TypeMismatch` on the first field that
    /// cannot be wired; a construction failure of a named service is
    /// propagated unchanged.
    pub fn inject<T: Inject + ?Sized>(&self, target: &mut T) -> Result<()> {
        #[cfg(feature = "logging")]
        trace!(
            target: "xcomp",
            target_type = std::any::type_name::<T>(),
            "Injecting annotated fields"
        );

        let result = target.inject(self);

        #[cfg(feature = "logging")]
        if let Err(err) = &result {
            debug!(
                target: "xcomp",
                target_type = std::any::type_name::<T>(),
                error = %err,
                "Injection aborted"
            );
        }

        result
    }

    /// Default-construct `T`, then inject it.
    #[inline]
    pub fn autowire<T: Inject + Default>(&self) -> Result<T> {
        let mut target = T::default();
        self.inject(&mut target)?;
        Ok(target)
    }

    /// Resolve the value for one annotated field.
    ///
    /// This is the assignability check used by generated `Inject` impls.
    pub fn resolve_field<X: ?Sized + Send + Sync + 'static>(
        &self,
        service: &str,
        field: &str,
    ) -> Result<Arc<X>> {
        let instance = self
            .get(service)?
            .ok_or_else(|| DiError::service_not_found(service, field))?;

        instance
            .downcast::<X>()
            .ok_or_else(|| DiError::type_mismatch::<X>(service, field, instance.type_name()))
    }

    /// Injection points of `T` whose service is not currently registered.
    ///
    /// Does not construct anything; a registered service may still fail to
    /// construct or turn out not to be assignable.
    pub fn missing_for<T: Inject>(&self) -> Vec<InjectionPoint> {
        T::injection_points()
            .into_iter()
            .filter(|point| !self.contains(point.service))
            .collect()
    }
}
