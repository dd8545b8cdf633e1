//! Example demonstrating the registry's structured logs
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use xcomp::{DiError, Instance, ModuleBuilder, Registry};

#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct UserService {
    db_url: String,
}

fn main() {
    // JSON if logging-json is enabled, pretty if logging-pretty is
    xcomp::logging::init();

    println!("=== xcomp Logging Demo ===\n");

    let registry = Registry::new();

    // logs: "Creating new service registry", "Registering static service"
    registry.register(
        "Database",
        Instance::new(Database {
            url: "postgres://localhost/mydb".into(),
        }),
    );

    // logs: "Registering lazy service (will be created on first access)"
    registry.register_factory("UserService", |registry| {
        let db = registry.resolve_field::<Database>("Database", "db")?;
        Ok(Instance::new(UserService {
            db_url: db.url.clone(),
        }))
    });

    // logs: "Lazy service initializing on first access", "Lazy service constructed"
    let _users = registry.get("UserService");
    // Second access takes the fast path
    let _users = registry.get("UserService");

    // logs: "Service not registered"
    assert!(matches!(registry.get("Cache"), Ok(None)));

    // logs: "Lazy service construction failed, entry will not retry"
    // The second access returns the recorded error without running the factory
    registry.register_factory("Mailer", |_| {
        Err(DiError::construction_failed("Mailer", "smtp host unreachable"))
    });
    let _ = registry.get("Mailer");
    let _ = registry.get("Mailer");

    // logs: "Registering module providers", "Module graph registered"
    let module = ModuleBuilder::named("overrides")
        .add_provider(
            "Database",
            Instance::new(Database {
                url: "postgres://replica/mydb".into(),
            }),
        )
        .build();
    let _ = registry.register_module(&module);

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
