//! Cell dependency graph.
//!
//! Used for diagnostics only: the generated module keeps document order and
//! the reactive runtime schedules evaluation itself.

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::transpile::TranspiledCell;

/// Directed graph with an edge from each producer cell to each consumer cell.
pub struct DependencyGraph {
    graph: DiGraph<usize, ()>,
    node_indices: FxHashMap<usize, NodeIndex>,
    names: FxHashMap<usize, String>,
}

impl DependencyGraph {
    /// Build the graph from cells whose inputs are already resolved.
    pub fn build(cells: &[TranspiledCell]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = FxHashMap::default();
        let mut names = FxHashMap::default();
        let mut producers: FxHashMap<&str, usize> = FxHashMap::default();

        for cell in cells {
            node_indices.insert(cell.index, graph.add_node(cell.index));
            names.insert(cell.index, display_name(cell));
            for output in &cell.outputs {
                producers.insert(output.as_str(), cell.index);
            }
        }

        for cell in cells {
            for input in &cell.inputs {
                if let Some(&producer) = producers.get(input.as_str()) {
                    graph.add_edge(node_indices[&producer], node_indices[&cell.index], ());
                }
            }
        }

        Self {
            graph,
            node_indices,
            names,
        }
    }

    /// Dependency cycles, each as the display names of the cells involved.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        use petgraph::algo::kosaraju_scc;

        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut indices: Vec<usize> = scc.iter().map(|&idx| self.graph[idx]).collect();
                indices.sort_unstable();
                indices.iter().map(|i| self.names[i].clone()).collect()
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Cells that read an output of `index`, directly.
    pub fn dependents(&self, index: usize) -> Vec<usize> {
        let Some(&node) = self.node_indices.get(&index) else {
            return Vec::new();
        };
        let mut dependents: Vec<usize> = self
            .graph
            .neighbors(node)
            .map(|idx| self.graph[idx])
            .collect();
        dependents.sort_unstable();
        dependents.dedup();
        dependents
    }

    /// Emit a warning per cycle. Returns the number of cycles found.
    pub fn warn_cycles(&self) -> usize {
        let cycles = self.cycles();
        for cycle in &cycles {
            tracing::warn!(
                "cyclic dependency: {} -> {}",
                cycle.join(" -> "),
                cycle[0]
            );
        }
        cycles.len()
    }
}

fn display_name(cell: &TranspiledCell) -> String {
    match cell.outputs.first() {
        Some(name) => name.clone(),
        None => format!("cell {}", cell.index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpile::CellShape;

    fn cell(index: usize, outputs: &[&str], inputs: &[&str]) -> TranspiledCell {
        TranspiledCell {
            index,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            body: String::new(),
            dependencies: Default::default(),
            dependency_specs: Default::default(),
            shape: if outputs.is_empty() {
                CellShape::Anonymous
            } else {
                CellShape::Single
            },
            is_async: false,
            is_generator: false,
        }
    }

    #[test]
    fn test_dependents() {
        let graph = DependencyGraph::build(&[
            cell(0, &["a"], &[]),
            cell(1, &["b"], &["a"]),
            cell(2, &[], &["a", "b"]),
        ]);
        assert_eq!(graph.dependents(0), vec![1, 2]);
        assert_eq!(graph.dependents(1), vec![2]);
        assert!(graph.dependents(2).is_empty());
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn test_cycles_are_reported() {
        let graph = DependencyGraph::build(&[
            cell(0, &["a"], &["c"]),
            cell(1, &["b"], &["a"]),
            cell(2, &["c"], &["b"]),
            cell(3, &["d"], &[]),
        ]);
        assert_eq!(graph.cycles(), vec![vec!["a", "b", "c"]]);
        assert_eq!(graph.warn_cycles(), 1);
    }
}
