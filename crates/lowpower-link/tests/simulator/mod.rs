// crates/lowpower-link/tests/simulator/mod.rs
pub mod boards;

pub use boards::{VirtualResponderBoard, VirtualSamplerBoard};

use lowpower_link::node::Node;

/// Steps `node` until it is back in `idle` after having left it.
/// Panics if that takes more than `max_steps`.
pub fn run_cycle<N: Node>(node: &mut N, idle: N::State, max_steps: usize) -> Vec<N::State> {
    let mut visited = Vec::new();
    for _ in 0..max_steps {
        let next = node.step().expect("node step failed");
        visited.push(next);
        if next == idle && visited.len() > 1 {
            return visited;
        }
    }
    panic!("node did not return to {:?} within {} steps", idle, max_steps);
}
