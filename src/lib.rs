//! # xcomp - Named-service inversion of control
//!
//! A small runtime that resolves services by name, constructs lazy services
//! exactly once, wires struct fields from `#[inject("Name")]` annotations and
//! flattens declarative module graphs into a registry.
//!
//! ## Features
//!
//! - 🏷️ **Name-keyed** - Services are looked up by string name, not by type
//! - 🏭 **Lazy singletons** - Factories run on first access, exactly once, even under contention
//! - 🔌 **Capabilities** - One instance can be wired into `Arc<Concrete>` and `Arc<dyn Trait>` fields
//! - 🧩 **Modules** - Builder-assembled provider trees with deterministic override order
//! - 🔁 **Cycle-safe flattening** - Cyclic module imports fail fast instead of overflowing the stack
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use xcomp::{instance, Instance, Registry};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn info(&self, msg: &str);
//! }
//!
//! struct StdoutLogger;
//!
//! impl Logger for StdoutLogger {
//!     fn info(&self, msg: &str) { println!("{msg}"); }
//! }
//!
//! struct Repo {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! let registry = Registry::new();
//! registry.register("Logger", instance!(StdoutLogger => dyn Logger));
//! registry.register_factory("Repo", |registry| {
//!     let logger = registry.resolve_field::<dyn Logger>("Logger", "logger")?;
//!     logger.info("building repo");
//!     Ok(Instance::new(Repo { logger }))
//! });
//!
//! let repo = registry.get_typed::<Repo>("Repo").unwrap().unwrap();
//! repo.logger.info("ready");
//! ```
//!
//! ## Field Injection
//!
//! With the `derive` feature:
//!
//! ```rust,ignore
//! use xcomp::{Inject, Registry};
//! use std::sync::Arc;
//!
//! #[derive(Default, Inject)]
//! struct CustomerService {
//!     #[inject("CustomerRepository")]
//!     repo: Option<Arc<dyn CustomerRepository>>,
//!     #[inject("Logger")]
//!     logger: Option<Arc<dyn Logger>>,
//! }
//!
//! let service: CustomerService = registry.autowire()?;
//! ```
//!
//! ## Modules
//!
//! ```rust
//! use xcomp::{Instance, ModuleBuilder, Registry};
//!
//! struct Config { dsn: String }
//!
//! let infrastructure = ModuleBuilder::named("infrastructure")
//!     .add_provider("Config", Instance::new(Config { dsn: "postgres://localhost".into() }))
//!     .build();
//!
//! let customers = ModuleBuilder::named("customers")
//!     .import(infrastructure)
//!     .add_factory_provider("CustomerRepository", |registry| {
//!         let config = registry.resolve_field::<Config>("Config", "config")?;
//!         Ok(Instance::new(config.dsn.clone()))
//!     })
//!     .build();
//!
//! let registry = Registry::new();
//! registry.register_module(&customers).unwrap();
//! assert!(registry.contains("Config"));
//! ```

// Lets the derive macro's `::xcomp::` paths resolve inside this crate too
extern crate self as xcomp;

mod error;
mod factory;
mod inject;
mod instance;
#[cfg(feature = "logging")]
pub mod logging;
mod module;
mod provider;
mod registry;
mod storage;

pub use error::*;
pub use factory::EntryState;
pub use inject::*;
pub use instance::*;
pub use module::*;
pub use provider::*;
pub use registry::*;

#[cfg(feature = "derive")]
pub use xcomp_derive::Inject;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BasicModule, DiError, EntryState, Inject, InjectionPoint, Instance, Module,
        ModuleBuilder, ModuleId, Provider, Registry, Result, instance,
    };
    pub use std::sync::Arc;
}
