#![no_main]

//! Fuzz target for module graph flattening
//!
//! Builds an arbitrary import graph (cycles included) out of hand-written
//! modules and checks that flattening terminates with either success or
//! `CyclicImport`, and that an acyclic graph registers every provider.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use xcomp::{DiError, Instance, Module, ModuleId, Provider, Registry};

const MAX_NODES: usize = 8;

#[derive(Debug, Arbitrary)]
struct Graph {
    // edges[i] lists the modules node i imports
    edges: Vec<Vec<u8>>,
    root: u8,
}

struct Node {
    id: usize,
    edges: Arc<Vec<Vec<usize>>>,
}

impl Module for Node {
    fn name(&self) -> &str {
        const NAMES: [&str; MAX_NODES] = ["n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7"];
        NAMES[self.id]
    }

    fn id(&self) -> ModuleId {
        ModuleId::keyed::<Self>(self.id as u64)
    }

    fn providers(&self) -> Vec<Provider> {
        vec![Provider::instance(format!("Service{}", self.id), Instance::new(self.id))]
    }

    fn imports(&self) -> Vec<Arc<dyn Module>> {
        self.edges[self.id]
            .iter()
            .map(|&id| {
                Arc::new(Node {
                    id,
                    edges: Arc::clone(&self.edges),
                }) as Arc<dyn Module>
            })
            .collect()
    }
}

fn reachable(edges: &[Vec<usize>], root: usize) -> Vec<bool> {
    let mut seen = vec![false; edges.len()];
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !std::mem::replace(&mut seen[node], true) {
            stack.extend(edges[node].iter().copied());
        }
    }
    seen
}

fuzz_target!(|graph: Graph| {
    let count = graph.edges.len().clamp(1, MAX_NODES);
    let edges: Vec<Vec<usize>> = (0..count)
        .map(|i| {
            graph
                .edges
                .get(i)
                .map(|targets| {
                    targets
                        .iter()
                        .take(4)
                        .map(|&t| t as usize % count)
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();
    let root = graph.root as usize % count;
    let seen = reachable(&edges, root);

    let registry = Registry::new();
    let module = Node {
        id: root,
        edges: Arc::new(edges),
    };

    match registry.register_module(&module) {
        Ok(()) => {
            for (id, reached) in seen.iter().enumerate() {
                assert_eq!(registry.contains(&format!("Service{id}")), *reached);
            }
        }
        Err(DiError::CyclicImport { module, cycle }) => {
            assert!(cycle.len() >= 2);
            assert_eq!(cycle.first(), Some(&module));
            assert_eq!(cycle.last(), Some(&module));
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
});
