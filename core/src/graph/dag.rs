use std::collections::{HashMap, HashSet};

use crate::error::ValidationError;

use super::layers::TopologicalLayers;
use super::types::{merge_paths, GraphNode, NodeResolution, Subtask};

/// Validated subtask dependency graph (DAG).
///
/// Never mutated after [`Dag::build`] succeeds. Attaching match results
/// produces a new value through [`Dag::with_resolutions`].
#[derive(Debug, Clone)]
pub struct Dag {
    /// Graph nodes: subtask_id -> node
    nodes: HashMap<String, GraphNode>,

    /// Dependency edges: subtask_id -> list of dependencies
    edges: HashMap<String, Vec<String>>,

    /// Reverse edges: subtask_id -> list of subtasks that depend on it
    reverse_edges: HashMap<String, Vec<String>>,

    /// Declaration order (for stable layering)
    insertion_order: Vec<String>,

    /// subtask_id -> declaration index
    positions: HashMap<String, usize>,
}

impl Dag {
    /// Build and validate a graph from a subtask list.
    ///
    /// Checks, in order: duplicate ids, dangling dependencies, cycles.
    pub fn build(subtasks: Vec<Subtask>) -> Result<Self, ValidationError> {
        Self::from_nodes(subtasks.into_iter().map(GraphNode::new).collect())
    }

    pub fn from_nodes(list: Vec<GraphNode>) -> Result<Self, ValidationError> {
        let mut nodes = HashMap::with_capacity(list.len());
        let mut edges = HashMap::with_capacity(list.len());
        let mut reverse_edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut insertion_order = Vec::with_capacity(list.len());

        for mut node in list {
            if nodes.contains_key(node.id()) {
                return Err(ValidationError::DuplicateId(node.id().to_string()));
            }

            // A dependency listed twice is still one edge.
            let mut seen = HashSet::new();
            node.subtask.dependencies.retain(|d| seen.insert(d.clone()));

            let id = node.id().to_string();
            edges.insert(id.clone(), node.subtask.dependencies.clone());
            insertion_order.push(id.clone());
            nodes.insert(id, node);
        }

        for id in &insertion_order {
            for dep in &edges[id] {
                if !nodes.contains_key(dep) {
                    return Err(ValidationError::UnknownDependency {
                        subtask_id: id.clone(),
                        missing_dep: dep.clone(),
                    });
                }
                reverse_edges.entry(dep.clone()).or_default().push(id.clone());
            }
        }

        let positions = insertion_order
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        let dag = Self {
            nodes,
            edges,
            reverse_edges,
            insertion_order,
            positions,
        };

        if let Some(path) = dag.detect_cycle() {
            return Err(ValidationError::Cycle { path });
        }

        tracing::debug!(
            target: "skillwave.graph",
            nodes = dag.len(),
            edges = dag.edge_count(),
            "graph validated"
        );

        Ok(dag)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Dependencies of `id` (nodes that must run first).
    pub fn dependencies(&self, id: &str) -> &[String] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes that declare a dependency on `id`.
    pub fn dependents(&self, id: &str) -> &[String] {
        self.reverse_edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Node ids in subtask declaration order.
    pub fn node_ids(&self) -> &[String] {
        &self.insertion_order
    }

    /// Nodes in subtask declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.insertion_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub(crate) fn position(&self, id: &str) -> usize {
        self.positions.get(id).copied().unwrap_or(usize::MAX)
    }

    /// Lazy, restartable batch topological order (Kahn's algorithm over layers).
    ///
    /// Layer k holds the nodes whose dependencies all sit in layers < k.
    /// Every call starts from the first layer again.
    pub fn topological_layers(&self) -> TopologicalLayers<'_> {
        TopologicalLayers::new(self)
    }

    /// New graph with skill ids and predicted write paths attached.
    ///
    /// Nodes without an entry keep their current resolution.
    pub fn with_resolutions(&self, resolutions: &HashMap<String, NodeResolution>) -> Self {
        let mut next = self.clone();
        for (id, node) in next.nodes.iter_mut() {
            let Some(res) = resolutions.get(id) else {
                continue;
            };
            node.skill_id = res.skill_id.clone();
            node.predicted_write_paths =
                merge_paths(&node.subtask.write_paths, &res.skill_write_paths);
        }
        next
    }

    /// Detect circular dependencies using DFS with a recursion stack.
    ///
    /// Iterative: each frame is `(node, next dependency index)`, so long
    /// chains never grow the call stack.
    /// Returns the cycle as a closed path, e.g. `[a, b, a]`.
    fn detect_cycle(&self) -> Option<Vec<String>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_stack: HashSet<&str> = HashSet::new();
        let mut frames: Vec<(&str, usize)> = Vec::new();

        for root in &self.insertion_order {
            if visited.contains(root.as_str()) {
                continue;
            }
            visited.insert(root.as_str());
            on_stack.insert(root.as_str());
            frames.push((root.as_str(), 0));

            while let Some(frame) = frames.last_mut() {
                let (node, next) = *frame;
                let deps = self.dependencies(node);
                let Some(dep) = deps.get(next) else {
                    on_stack.remove(node);
                    frames.pop();
                    continue;
                };
                frame.1 += 1;

                if on_stack.contains(dep.as_str()) {
                    // `node` depends on something still being explored: report
                    // the loop in execution order (dependency first).
                    let pos = frames
                        .iter()
                        .position(|(id, _)| *id == dep.as_str())
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        frames[pos..].iter().rev().map(|(id, _)| id.to_string()).collect();
                    cycle.push(node.to_string());
                    return Some(cycle);
                }

                if visited.insert(dep.as_str()) {
                    on_stack.insert(dep.as_str());
                    frames.push((dep.as_str(), 0));
                }
            }
        }

        None
    }
}
