pub mod dag;
pub mod topo;
pub mod visualize;

pub use dag::DependencyGraph;
pub use topo::{topological_sort, CycleDetected};
pub use visualize::{visualize, GraphFormat};
