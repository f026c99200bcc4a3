//! Neighbor queries used for highlighting.

use indexmap::IndexSet;

use relmap_core::identifier::Id;

use crate::graph::Graph;

/// The node `id` together with every node one edge away from it.
///
/// An isolated node yields `{id}`; an id that is not in the graph yields
/// the empty set.
///
/// # Examples
///
/// ```
/// # use relmap::{graph::build_graph, query::neighbors_closure};
/// # use relmap_core::identifier::Id;
/// # use relmap_parser::{read_connections, read_elements};
/// let elements = read_elements("Label\nA\nB\nC\n");
/// let connections = read_connections("From,To\nA,B\n");
/// let (graph, _) = build_graph(elements.records(), connections.records());
///
/// let closure = neighbors_closure(&graph, &Id::new("A"));
/// assert!(closure.contains(&Id::new("B")));
/// assert_eq!(closure.len(), 2);
/// assert!(neighbors_closure(&graph, &Id::new("Z")).is_empty());
/// ```
pub fn neighbors_closure(graph: &Graph, id: &Id) -> IndexSet<Id> {
    let Some(neighbors) = graph.neighbors(id) else {
        return IndexSet::new();
    };

    let mut closure = IndexSet::with_capacity(neighbors.len() + 1);
    closure.insert(id.clone());
    closure.extend(neighbors.iter().cloned());
    closure
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use relmap_parser::{Connection, RowRef, SheetKind};

    use super::*;
    use crate::graph::build_graph;

    // ===================
    // Strategies
    // ===================

    /// Strategy for small edge lists over a handful of labels.
    fn edges_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(("[a-f]", "[a-f]"), 0..20)
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every connection shows up in the closures of both endpoints.
    fn check_closure_symmetric(edges: &[(String, String)]) -> Result<(), TestCaseError> {
        let row = RowRef::new(SheetKind::Connections, 2, None);
        let connections: Vec<_> = edges
            .iter()
            .map(|(from, to)| Connection::new(from.as_str(), to.as_str(), row))
            .collect();
        let (graph, _) = build_graph(&[], &connections);

        for (from, to) in edges {
            let (from, to) = (Id::new(from), Id::new(to));
            prop_assert!(neighbors_closure(&graph, &from).contains(&to));
            prop_assert!(neighbors_closure(&graph, &to).contains(&from));
        }

        for node in graph.nodes() {
            let closure = neighbors_closure(&graph, node.id());
            prop_assert!(closure.contains(node.id()));
            for other in closure.iter().filter(|other| *other != node.id()) {
                prop_assert!(neighbors_closure(&graph, other).contains(node.id()));
            }
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn closure_symmetric(edges in edges_strategy()) {
            check_closure_symmetric(&edges)?;
        }
    }
}
