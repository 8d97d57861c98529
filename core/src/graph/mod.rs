//! Subtask dependency graph.
//!
//! ```text
//! Vec<Subtask>
//!   ↓
//! Dag::build() → duplicate ids, dangling dependencies, cycle (DFS)
//!   ↓
//! Dag { nodes, edges, reverse_edges }
//!   ↓
//! Dag::topological_layers() → Iterator<Item = Vec<String>>
//! ```

mod dag;
mod layers;
mod types;

pub use dag::Dag;
pub use layers::TopologicalLayers;
pub use types::{GraphNode, NodeResolution, Subtask};
