//! `#[derive(Inject)]` against a live registry

use std::sync::Arc;
use xcomp::{DiError, Inject, Instance, ModuleBuilder, Registry, instance};

trait Logger: Send + Sync {
    fn log(&self, msg: &str) -> String;
}

trait CustomerRepository: Send + Sync {
    fn find(&self, id: u32) -> Option<String>;
}

struct PrefixLogger(&'static str);

impl Logger for PrefixLogger {
    fn log(&self, msg: &str) -> String {
        format!("[{}] {msg}", self.0)
    }
}

struct InMemoryCustomers;

impl CustomerRepository for InMemoryCustomers {
    fn find(&self, id: u32) -> Option<String> {
        (id == 1).then(|| "Ada".to_string())
    }
}

struct Settings {
    region: &'static str,
}

#[derive(Default, Inject)]
struct CustomerService {
    #[inject("CustomerRepository")]
    repo: Option<Arc<dyn CustomerRepository>>,
    #[inject(name = "Logger")]
    logger: Option<Arc<dyn Logger>>,
    lookups: u64,
}

#[derive(Inject)]
struct Reporter {
    #[inject("Settings")]
    settings: Arc<Settings>,
    label: &'static str,
}

#[derive(Default, Inject)]
struct Nothing {
    _counter: u32,
}

fn registry() -> Registry {
    let registry = Registry::new();
    registry.register("Logger", instance!(PrefixLogger("app") => dyn Logger));
    registry.register(
        "CustomerRepository",
        instance!(InMemoryCustomers => dyn CustomerRepository),
    );
    registry.register("Settings", Instance::new(Settings { region: "eu" }));
    registry
}

#[test]
fn test_autowire_trait_fields() {
    let registry = registry();
    let service: CustomerService = registry.autowire().unwrap();

    assert_eq!(service.repo.unwrap().find(1).as_deref(), Some("Ada"));
    assert_eq!(service.logger.unwrap().log("hi"), "[app] hi");
    assert_eq!(service.lookups, 0);
}

#[test]
fn test_plain_arc_field_and_untouched_fields() {
    let registry = registry();
    let mut reporter = Reporter {
        settings: Arc::new(Settings { region: "unset" }),
        label: "daily",
    };
    registry.inject(&mut reporter).unwrap();

    assert_eq!(reporter.settings.region, "eu");
    assert_eq!(reporter.label, "daily");
}

#[test]
fn test_injected_value_is_the_registered_instance() {
    let registry = registry();
    let service: CustomerService = registry.autowire().unwrap();
    let logger = registry.get_typed::<dyn Logger>("Logger").unwrap().unwrap();

    assert!(Arc::ptr_eq(&service.logger.unwrap(), &logger));
}

#[test]
fn test_missing_service() {
    let registry = Registry::new();
    registry.register(
        "CustomerRepository",
        instance!(InMemoryCustomers => dyn CustomerRepository),
    );

    let mut service = CustomerService::default();
    let err = registry.inject(&mut service).unwrap_err();

    assert_eq!(err, DiError::service_not_found("Logger", "logger"));
    assert_eq!(err.to_string(), "service 'Logger' not found for field 'logger'");
    assert!(service.repo.is_some());
    assert!(service.logger.is_none());
}

#[test]
fn test_type_mismatch() {
    let registry = registry();
    // Concrete type only, no Logger capability
    registry.register("Logger", Instance::new(PrefixLogger("raw")));

    let Err(err) = registry.autowire::<CustomerService>() else {
        panic!("expected autowire to fail");
    };
    match err {
        DiError::TypeMismatch {
            service,
            field,
            expected,
            actual,
        } => {
            assert_eq!(service, "Logger");
            assert_eq!(field, "logger");
            assert!(expected.contains("Logger"));
            assert!(actual.ends_with("PrefixLogger"));
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_lazy_dependency_from_module() {
    let module = ModuleBuilder::named("customers")
        .add_provider("Logger", instance!(PrefixLogger("mod") => dyn Logger))
        .add_factory_provider("CustomerRepository", |_| {
            Ok(instance!(InMemoryCustomers => dyn CustomerRepository))
        })
        .build();

    let registry = Registry::new();
    registry.register_module(&module).unwrap();

    let service: CustomerService = registry.autowire().unwrap();
    assert_eq!(service.repo.unwrap().find(2), None);
}

#[test]
fn test_injection_points() {
    let points = CustomerService::injection_points();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].field, "repo");
    assert_eq!(points[0].service, "CustomerRepository");
    assert!(points[0].expected.contains("CustomerRepository"));
    assert_eq!(points[1].field, "logger");
    assert_eq!(points[1].service, "Logger");

    assert!(Nothing::injection_points().is_empty());
}

#[test]
fn test_no_annotated_fields() {
    let registry = Registry::new();
    let nothing: Nothing = registry.autowire().unwrap();
    assert_eq!(nothing._counter, 0);
}

#[test]
fn test_missing_for_derived_type() {
    let registry = Registry::new();
    registry.register("Logger", instance!(PrefixLogger("app") => dyn Logger));

    let missing = registry.missing_for::<CustomerService>();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].service, "CustomerRepository");
}
