#![no_main]

//! Fuzz target for concurrent registry operations
//!
//! Threads race on first access to lazy services while others register and
//! read; every factory that is never overridden must run at most once.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use xcomp::{Instance, Registry};

#[derive(Debug, Clone, Arbitrary)]
enum ThreadOp {
    Get(u8),
    Contains(u8),
    Names,
    RegisterScratch(u32),
}

#[derive(Debug, Arbitrary)]
struct ConcurrentScenario {
    // Number of lazy services registered up front (clamped to 1-8)
    lazy_count: u8,
    // Number of threads (clamped to 1-8)
    thread_count: u8,
    ops_per_thread: Vec<ThreadOp>,
}

fuzz_target!(|scenario: ConcurrentScenario| {
    let registry = Registry::new();

    let lazy_count = (scenario.lazy_count % 8).max(1) as usize;
    let counters: Vec<Arc<AtomicU32>> = (0..lazy_count)
        .map(|i| {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            registry.register_factory(format!("Lazy{i}"), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Instance::new(i))
            });
            calls
        })
        .collect();

    let thread_count = (scenario.thread_count % 8).max(1) as usize;
    let ops = scenario.ops_per_thread;

    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let registry = registry.clone();
            let ops = ops.clone();
            thread::spawn(move || {
                for op in ops.into_iter().take(50) {
                    match op {
                        ThreadOp::Get(slot) => {
                            let i = slot as usize % lazy_count;
                            let found = registry.get_typed::<usize>(&format!("Lazy{i}"));
                            assert_eq!(found.ok().flatten().as_deref(), Some(&i));
                        }
                        ThreadOp::Contains(slot) => {
                            let i = slot as usize % lazy_count;
                            assert!(registry.contains(&format!("Lazy{i}")));
                        }
                        ThreadOp::Names => {
                            assert!(registry.names().len() >= lazy_count);
                        }
                        ThreadOp::RegisterScratch(value) => {
                            registry.register("Scratch", Instance::new(value));
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    for calls in &counters {
        assert!(calls.load(Ordering::SeqCst) <= 1);
    }
    let _ = registry.get("Scratch");
});
