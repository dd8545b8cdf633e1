#![no_main]

//! Fuzz target for registry operations
//!
//! Replays random register/get sequences over a small name space and checks
//! the registry against a simple model of which binding is current.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use xcomp::{DiError, EntryState, Instance, Registry};

const NAMES: [&str; 4] = ["Alpha", "Beta", "Gamma", "Delta"];

#[derive(Debug, Arbitrary)]
enum RegistryOp {
    RegisterStatic { slot: u8, value: u32 },
    RegisterFactory { slot: u8, value: u32 },
    RegisterFailing { slot: u8 },
    Get { slot: u8 },
    GetTyped { slot: u8 },
    Names,
}

#[derive(Clone, Copy)]
enum Expected {
    Value(u32),
    Fails,
}

struct LiveFactory {
    expected: Expected,
    calls: Arc<AtomicU32>,
}

fn name(slot: u8) -> &'static str {
    NAMES[slot as usize % NAMES.len()]
}

fuzz_target!(|ops: Vec<RegistryOp>| {
    let registry = Registry::new();
    let mut model: HashMap<&'static str, LiveFactory> = HashMap::new();

    for op in ops.into_iter().take(256) {
        match op {
            RegistryOp::RegisterStatic { slot, value } => {
                registry.register(name(slot), Instance::new(value));
                model.insert(
                    name(slot),
                    LiveFactory {
                        expected: Expected::Value(value),
                        calls: Arc::new(AtomicU32::new(0)),
                    },
                );
            }
            RegistryOp::RegisterFactory { slot, value } => {
                let calls = Arc::new(AtomicU32::new(0));
                let counter = Arc::clone(&calls);
                registry.register_factory(name(slot), move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Instance::new(value))
                });
                model.insert(
                    name(slot),
                    LiveFactory {
                        expected: Expected::Value(value),
                        calls,
                    },
                );
            }
            RegistryOp::RegisterFailing { slot } => {
                let calls = Arc::new(AtomicU32::new(0));
                let counter = Arc::clone(&calls);
                let service = name(slot);
                registry.register_factory(service, move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(DiError::construction_failed(service, "fuzz"))
                });
                model.insert(
                    service,
                    LiveFactory {
                        expected: Expected::Fails,
                        calls,
                    },
                );
            }
            RegistryOp::Get { slot } => {
                let result = registry.get(name(slot));
                match (model.get(name(slot)), result) {
                    (None, Ok(None)) => {}
                    (Some(live), Ok(Some(instance))) => {
                        let Expected::Value(value) = live.expected else {
                            panic!("failing factory produced a value");
                        };
                        assert_eq!(instance.downcast::<u32>().as_deref(), Some(&value));
                        assert!(live.calls.load(Ordering::SeqCst) <= 1);
                    }
                    (Some(live), Err(_)) => {
                        assert!(matches!(live.expected, Expected::Fails));
                        assert_eq!(registry.state(name(slot)), Some(EntryState::Failed));
                        assert_eq!(live.calls.load(Ordering::SeqCst), 1);
                    }
                    _ => panic!("registry and model disagree on {}", name(slot)),
                }
            }
            RegistryOp::GetTyped { slot } => {
                // Never assignable to an unrelated type
                if let Ok(found) = registry.get_typed::<String>(name(slot)) {
                    assert!(found.is_none());
                }
            }
            RegistryOp::Names => {
                let mut names = registry.names();
                names.sort();
                let mut expected: Vec<String> = model.keys().map(|n| n.to_string()).collect();
                expected.sort();
                assert_eq!(names, expected);
                assert_eq!(registry.len(), model.len());
            }
        }
    }
});
