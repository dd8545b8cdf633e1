//! Benchmarks for the named-service registry

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use xcomp::{Inject, InjectionPoint, Instance, ModuleBuilder, Registry, Result, instance};

trait Logger: Send + Sync {
    fn level(&self) -> u8;
}

#[allow(dead_code)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

struct QuietLogger;

impl Logger for QuietLogger {
    fn level(&self) -> u8 {
        0
    }
}

#[derive(Default)]
struct Handler {
    logger: Option<Arc<dyn Logger>>,
    small: Option<Arc<SmallService>>,
}

impl Inject for Handler {
    fn injection_points() -> Vec<InjectionPoint> {
        vec![
            InjectionPoint {
                field: "logger",
                service: "Logger",
                expected: std::any::type_name::<dyn Logger>(),
            },
            InjectionPoint {
                field: "small",
                service: "Small",
                expected: std::any::type_name::<SmallService>(),
            },
        ]
    }

    fn inject(&mut self, registry: &Registry) -> Result<()> {
        self.logger = Some(registry.resolve_field::<dyn Logger>("Logger", "logger")?);
        self.small = Some(registry.resolve_field::<SmallService>("Small", "small")?);
        Ok(())
    }
}

fn populated() -> Registry {
    let registry = Registry::new();
    registry.register("Small", Instance::new(SmallService { value: 42 }));
    registry.register("Logger", instance!(QuietLogger => dyn Logger));
    registry.register_factory("Medium", |_| {
        Ok(Instance::new(MediumService {
            name: "medium".into(),
            values: (0..64).collect(),
        }))
    });
    registry
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("static", |b| {
        b.iter(|| {
            let registry = Registry::new();
            registry.register("Small", Instance::new(SmallService { value: 42 }));
            black_box(registry)
        })
    });

    group.bench_function("factory", |b| {
        b.iter(|| {
            let registry = Registry::new();
            registry.register_factory("Small", |_| Ok(Instance::new(SmallService { value: 42 })));
            black_box(registry)
        })
    });

    group.bench_function("with_capability", |b| {
        b.iter(|| {
            let registry = Registry::new();
            registry.register("Logger", instance!(QuietLogger => dyn Logger));
            black_box(registry)
        })
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let registry = populated();
    // Construct Medium up front so the loop measures the cached path
    let _ = registry.get("Medium");

    group.bench_function("get_static", |b| {
        b.iter(|| black_box(registry.get(black_box("Small"))))
    });

    group.bench_function("get_lazy_resolved", |b| {
        b.iter(|| black_box(registry.get(black_box("Medium"))))
    });

    group.bench_function("get_typed_capability", |b| {
        b.iter(|| black_box(registry.get_typed::<dyn Logger>(black_box("Logger"))))
    });

    group.bench_function("get_missing", |b| {
        b.iter(|| black_box(registry.get(black_box("Missing"))))
    });

    group.bench_function("lazy_first_access", |b| {
        b.iter(|| {
            let registry = populated();
            black_box(registry.get("Medium"))
        })
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");
    let registry = populated();
    let _ = registry.get("Medium");

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 1_000) as u64));
        group.bench_with_input(BenchmarkId::new("get", threads), &threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let registry = registry.clone();
                        thread::spawn(move || {
                            for _ in 0..1_000 {
                                black_box(registry.get("Medium").ok());
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            })
        });
    }

    group.finish();
}

fn bench_modules(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules");

    for width in [4usize, 16, 64] {
        let leaves: Vec<_> = (0..width)
            .map(|i| {
                ModuleBuilder::named(format!("leaf-{i}"))
                    .add_provider(
                        format!("Service{i}"),
                        Instance::new(SmallService { value: i as i32 }),
                    )
                    .add_factory_provider(format!("Lazy{i}"), |_| {
                        Ok(Instance::new(SmallService { value: 0 }))
                    })
                    .build()
            })
            .collect();
        let root = leaves
            .into_iter()
            .fold(ModuleBuilder::named("root"), |builder, leaf| builder.import(leaf))
            .build();

        group.throughput(Throughput::Elements((width * 2) as u64));
        group.bench_with_input(BenchmarkId::new("register_module", width), &root, |b, root| {
            b.iter(|| {
                let registry = Registry::with_capacity(width * 2);
                registry.register_module(root).ok();
                black_box(registry)
            })
        });
    }

    group.finish();
}

fn bench_injection(c: &mut Criterion) {
    let mut group = c.benchmark_group("injection");
    let registry = populated();

    group.bench_function("autowire", |b| {
        b.iter(|| black_box(registry.autowire::<Handler>()))
    });

    group.bench_function("inject_existing", |b| {
        let mut handler = Handler::default();
        b.iter(|| black_box(registry.inject(&mut handler)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_resolution,
    bench_concurrent,
    bench_modules,
    bench_injection,
);
criterion_main!(benches);
