//! Registry bindings and exactly-once lazy construction
//!
//! A name is bound either to a ready [`Instance`] or to a [`LazyEntry`] that
//! runs its factory the first time anyone asks for it.
//!
//! ## Failure semantics
//!
//! The gate is consumed by the first attempt whatever its outcome. A factory
//! that returns an error, or panics, leaves the entry in the terminal
//! [`EntryState::Failed`] state and every later resolve returns the recorded
//! error. There is no retry path.

use crate::provider::FactoryFn;
use crate::{DiError, Instance, Registry, Result};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Observable lifecycle of a registry binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// Registered as a ready instance
    Static,
    /// Factory-backed, factory not yet run
    Unresolved,
    /// Factory currently running on some thread
    Resolving,
    /// Factory ran and produced an instance
    Resolved,
    /// Factory ran and failed; never retried
    Failed,
}

/// Lazy singleton binding - runs its factory at most once
pub(crate) struct LazyEntry {
    /// Service name, for errors and logging
    name: Arc<str>,
    /// Type-erased factory function
    init: FactoryFn,
    /// Cached outcome; the cell itself is the exactly-once gate
    outcome: OnceCell<Result<Instance>>,
    /// Set once some thread has entered the factory
    started: AtomicBool,
}

impl LazyEntry {
    #[inline]
    pub fn new(name: Arc<str>, init: FactoryFn) -> Self {
        Self {
            name,
            init,
            outcome: OnceCell::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Get the instance, running the factory if this is the first access.
    ///
    /// Concurrent first accessors block until the running factory returns.
    pub fn resolve(&self, registry: &Registry) -> Result<Instance> {
        if let Some(outcome) = self.outcome.get() {
            #[cfg(feature = "logging")]
            trace!(
                target: "xcomp",
                service = &*self.name,
                "Lazy service already constructed, returning cached outcome"
            );
            return outcome.clone();
        }

        self.outcome
            .get_or_init(|| self.construct(registry))
            .clone()
    }

    fn construct(&self, registry: &Registry) -> Result<Instance> {
        self.started.store(true, Ordering::Release);

        #[cfg(feature = "logging")]
        debug!(
            target: "xcomp",
            service = &*self.name,
            "Lazy service initializing on first access"
        );

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (self.init)(registry))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(DiError::construction_failed(
                &*self.name,
                panic_message(payload.as_ref()),
            )),
        };

        #[cfg(feature = "logging")]
        match &outcome {
            Ok(instance) => debug!(
                target: "xcomp",
                service = &*self.name,
                instance_type = instance.type_name(),
                "Lazy service constructed"
            ),
            Err(err) => warn!(
                target: "xcomp",
                service = &*self.name,
                error = %err,
                "Lazy service construction failed, entry will not retry"
            ),
        }

        outcome
    }

    pub fn state(&self) -> EntryState {
        match self.outcome.get() {
            Some(Ok(_)) => EntryState::Resolved,
            Some(Err(_)) => EntryState::Failed,
            None if self.started.load(Ordering::Acquire) => EntryState::Resolving,
            None => EntryState::Unresolved,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    match detail {
        Some(detail) => format!("factory panicked: {detail}"),
        None => "factory panicked".to_owned(),
    }
}

/// What a service name is bound to.
///
/// Cheap to clone, so storage hands out copies and never holds its lock
/// while a factory runs.
#[derive(Clone)]
pub(crate) enum Binding {
    /// Ready instance
    Static(Instance),
    /// Constructed on first access
    Lazy(Arc<LazyEntry>),
}

impl Binding {
    #[inline]
    pub fn lazy(name: Arc<str>, init: FactoryFn) -> Self {
        Binding::Lazy(Arc::new(LazyEntry::new(name, init)))
    }

    #[inline]
    pub fn resolve(&self, registry: &Registry) -> Result<Instance> {
        match self {
            Binding::Static(instance) => Ok(instance.clone()),
            Binding::Lazy(entry) => entry.resolve(registry),
        }
    }

    #[inline]
    pub fn state(&self) -> EntryState {
        match self {
            Binding::Static(_) => EntryState::Static,
            Binding::Lazy(entry) => entry.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct TestService {
        id: u32,
    }

    fn counting_entry(counter: Arc<AtomicU32>) -> LazyEntry {
        LazyEntry::new(
            "Counted".into(),
            Arc::new(move |_: &Registry| {
                let id = counter.fetch_add(1, Ordering::SeqCst);
                Ok(Instance::new(TestService { id }))
            }),
        )
    }

    #[test]
    fn test_lazy_entry_runs_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let entry = counting_entry(Arc::clone(&counter));
        let registry = Registry::new();

        assert_eq!(entry.state(), EntryState::Unresolved);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let a = entry.resolve(&registry).unwrap();
        let b = entry.resolve(&registry).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(entry.state(), EntryState::Resolved);
        assert!(a.same_instance(&b));
        assert_eq!(a.downcast::<TestService>().unwrap().id, 0);
    }

    #[test]
    fn test_failed_factory_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        let entry = LazyEntry::new(
            "Broken".into(),
            Arc::new(move |_: &Registry| {
                seen.fetch_add(1, Ordering::SeqCst);
                Err(DiError::construction_failed("Broken", "connection refused"))
            }),
        );
        let registry = Registry::new();

        let first = entry.resolve(&registry).unwrap_err();
        let second = entry.resolve(&registry).unwrap_err();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(entry.state(), EntryState::Failed);
    }

    #[test]
    fn test_panicking_factory_is_captured() {
        let entry = LazyEntry::new(
            "Panics".into(),
            Arc::new(|_: &Registry| -> Result<Instance> { panic!("no database") }),
        );
        let registry = Registry::new();

        let err = entry.resolve(&registry).unwrap_err();
        assert_eq!(
            err,
            DiError::ConstructionFailed {
                service: "Panics".into(),
                reason: "factory panicked: no database".into(),
            }
        );
        assert_eq!(entry.state(), EntryState::Failed);
    }

    #[test]
    fn test_binding_states() {
        let fixed = Binding::Static(Instance::new(TestService { id: 7 }));
        let lazy = Binding::lazy(
            "Lazy".into(),
            Arc::new(|_: &Registry| Ok(Instance::new(TestService { id: 8 }))),
        );
        let registry = Registry::new();

        assert_eq!(fixed.state(), EntryState::Static);
        assert_eq!(lazy.state(), EntryState::Unresolved);

        let a = fixed.resolve(&registry).unwrap();
        let b = fixed.resolve(&registry).unwrap();
        assert!(a.same_instance(&b));

        lazy.resolve(&registry).unwrap();
        assert_eq!(lazy.state(), EntryState::Resolved);
    }
}
