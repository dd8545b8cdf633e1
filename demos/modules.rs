//! A small customer/order application wired from modules
//!
//! Run with:
//!   cargo run --example modules --features derive
//!
//! Add `logging-pretty` to watch the registry's events:
//!   cargo run --example modules --features derive,logging-pretty

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use xcomp::{DiError, Inject, Instance, ModuleBuilder, Registry, Result, instance};

// ============================================================================
// Capabilities
// ============================================================================

trait Logger: Send + Sync {
    fn info(&self, msg: &str);
}

trait CustomerRepository: Send + Sync {
    fn find(&self, id: u32) -> Option<String>;
}

trait OrderRepository: Send + Sync {
    fn place(&self, customer: &str, item: &str) -> u32;
}

// ============================================================================
// Infrastructure
// ============================================================================

struct Config {
    database_url: String,
}

struct ConsoleLogger {
    prefix: &'static str,
}

impl Logger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("  [{}] {msg}", self.prefix);
    }
}

struct InMemoryCustomers {
    rows: HashMap<u32, String>,
}

impl CustomerRepository for InMemoryCustomers {
    fn find(&self, id: u32) -> Option<String> {
        self.rows.get(&id).cloned()
    }
}

#[derive(Default)]
struct InMemoryOrders {
    next_id: Mutex<u32>,
}

impl OrderRepository for InMemoryOrders {
    fn place(&self, _customer: &str, _item: &str) -> u32 {
        let mut next = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
        *next += 1;
        *next
    }
}

// ============================================================================
// Application services
// ============================================================================

#[derive(Default, Inject)]
struct OrderService {
    #[inject("CustomerRepository")]
    customers: Option<Arc<dyn CustomerRepository>>,
    #[inject("OrderRepository")]
    orders: Option<Arc<dyn OrderRepository>>,
    #[inject("Logger")]
    logger: Option<Arc<dyn Logger>>,
}

impl OrderService {
    fn checkout(&self, customer_id: u32, item: &str) -> Option<u32> {
        let customer = self.customers.as_ref()?.find(customer_id)?;
        let order_id = self.orders.as_ref()?.place(&customer, item);
        if let Some(logger) = &self.logger {
            logger.info(&format!("order #{order_id}: {item} for {customer}"));
        }
        Some(order_id)
    }
}

fn infrastructure_module() -> xcomp::BasicModule {
    ModuleBuilder::named("infrastructure")
        .add_provider(
            "Config",
            Instance::new(Config {
                database_url: "postgres://localhost/shop".into(),
            }),
        )
        .add_provider("Logger", instance!(ConsoleLogger { prefix: "shop" } => dyn Logger))
        .build()
}

fn customer_module() -> xcomp::BasicModule {
    ModuleBuilder::named("customer")
        .add_factory_provider("CustomerRepository", |registry| {
            let config = registry.get_typed::<Config>("Config")?.ok_or_else(|| {
                DiError::construction_failed("CustomerRepository", "Config missing")
            })?;
            println!("  connecting customers to {}", config.database_url);

            let rows = HashMap::from([(1, "Ada".to_string()), (2, "Grace".to_string())]);
            Ok(instance!(InMemoryCustomers { rows } => dyn CustomerRepository))
        })
        .build()
}

fn order_module() -> xcomp::BasicModule {
    ModuleBuilder::named("order")
        .add_factory_provider("OrderRepository", |_| {
            Ok(instance!(InMemoryOrders::default() => dyn OrderRepository))
        })
        .add_factory_provider("OrderService", |registry| {
            let service: OrderService = registry.autowire()?;
            Ok(Instance::new(service))
        })
        .build()
}

fn app_module() -> xcomp::BasicModule {
    ModuleBuilder::named("app")
        .import(infrastructure_module())
        .import(customer_module())
        .import(order_module())
        .build()
}

fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    xcomp::logging::init();

    println!("=== xcomp module demo ===\n");

    let registry = Registry::new();
    registry.register_module(&app_module())?;

    let mut names = registry.names();
    names.sort();
    println!("Registered services: {}", names.join(", "));
    println!("OrderService state before first use: {:?}\n", registry.state("OrderService"));

    let orders = registry
        .get_typed::<OrderService>("OrderService")?
        .ok_or_else(|| DiError::construction_failed("OrderService", "not registered"))?;

    for (customer, item) in [(1, "keyboard"), (2, "monitor"), (7, "mouse")] {
        match orders.checkout(customer, item) {
            Some(id) => println!("  checkout ok: order {id}"),
            None => println!("  checkout failed: unknown customer {customer}"),
        }
    }

    println!("\nOrderService state after first use: {:?}", registry.state("OrderService"));

    // A module that imports itself is rejected before anything loops forever
    struct SelfImport;
    impl xcomp::Module for SelfImport {
        fn name(&self) -> &str {
            "self-import"
        }
        fn providers(&self) -> Vec<xcomp::Provider> {
            Vec::new()
        }
        fn imports(&self) -> Vec<Arc<dyn xcomp::Module>> {
            vec![Arc::new(SelfImport)]
        }
    }

    if let Err(err) = registry.register_module(&SelfImport) {
        println!("Rejected: {err}");
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
