use std::collections::HashMap;

use super::dag::Dag;

/// Iterator over topological layers of a [`Dag`].
///
/// # Algorithm
///
/// 1. Calculate in-degree for all nodes
/// 2. Yield all nodes with in-degree 0 (first layer)
/// 3. Remove these nodes and update in-degrees
/// 4. Repeat until all nodes are placed
///
/// Layers are computed one at a time as the iterator is advanced.
/// O(V + E) over a full pass.
pub struct TopologicalLayers<'a> {
    dag: &'a Dag,
    in_degree: HashMap<&'a str, usize>,
    frontier: Vec<&'a str>,
}

impl<'a> TopologicalLayers<'a> {
    pub(crate) fn new(dag: &'a Dag) -> Self {
        let mut in_degree: HashMap<&'a str, usize> = HashMap::with_capacity(dag.len());
        for id in dag.node_ids() {
            in_degree.insert(id.as_str(), dag.dependencies(id).len());
        }

        // node_ids() is already in declaration order.
        let frontier = dag
            .node_ids()
            .iter()
            .map(String::as_str)
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();

        Self {
            dag,
            in_degree,
            frontier,
        }
    }
}

impl<'a> Iterator for TopologicalLayers<'a> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frontier.is_empty() {
            return None;
        }

        let current = std::mem::take(&mut self.frontier);
        let mut next_layer = Vec::new();

        for id in &current {
            for dependent in self.dag.dependents(id) {
                if let Some(degree) = self.in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        next_layer.push(dependent.as_str());
                    }
                }
            }
        }

        // Preserve declaration order
        next_layer.sort_by_key(|id| self.dag.position(id));
        self.frontier = next_layer;

        Some(current.into_iter().map(str::to_string).collect())
    }
}
