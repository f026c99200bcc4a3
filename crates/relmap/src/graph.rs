//! Relationship graph.
//!
//! A simple undirected graph keyed by node label. The adjacency index is
//! updated together with the edge list, so neighbor lookups and degrees
//! never scan edges. Nodes and edges iterate in insertion order, which keeps
//! the layout reproducible for a fixed seed.

use indexmap::{IndexMap, IndexSet, map::Entry};
use log::{debug, trace};
use serde::Serialize;

use relmap_core::identifier::Id;
use relmap_parser::{
    Connection, Element, RowRef, UNKNOWN_TYPE,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
};

/// A graph node with its display attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: Id,
    label: String,
    kind: String,
    description: String,
    aka: String,
}

impl Node {
    /// Create a node with default attributes, as for an implicit node.
    pub fn new(label: &str) -> Self {
        Self {
            id: Id::new(label),
            label: label.to_string(),
            kind: UNKNOWN_TYPE.to_string(),
            description: String::new(),
            aka: String::new(),
        }
    }

    fn from_element(label: &str, element: &Element) -> Self {
        Self {
            kind: element.kind.trim().to_string(),
            description: element.description.trim().to_string(),
            aka: element.aka.trim().to_string(),
            ..Self::new(label)
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Node type, used to pick its color.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Alternative names, free text.
    pub fn aka(&self) -> &str {
        &self.aka
    }
}

/// An undirected edge, kept in the orientation it was first added with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    from: Id,
    to: Id,
}

impl Edge {
    pub fn from(&self) -> &Id {
        &self.from
    }

    pub fn to(&self) -> &Id {
        &self.to
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// One option of the node search box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    /// Text shown and matched against.
    pub label: String,
    /// Node the option selects.
    pub value: Id,
}

/// Undirected relationship graph with an adjacency index.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<Id, Node>,
    edges: Vec<Edge>,
    adjacency: IndexMap<Id, IndexSet<Id>>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node, keeping its position in iteration order.
    ///
    /// Returns the replaced node, if any.
    pub fn upsert_node(&mut self, node: Node) -> Option<Node> {
        let id = node.id.clone();
        self.adjacency.entry(id.clone()).or_default();
        self.nodes.insert(id, node)
    }

    /// Make sure a node labeled `label` exists.
    ///
    /// Returns `true` if the node had to be created.
    pub fn ensure_node(&mut self, label: &str) -> bool {
        match self.nodes.entry(Id::new(label)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                entry.insert(Node::new(label));
                self.adjacency.entry(id).or_default();
                true
            }
        }
    }

    /// Add an undirected edge between two existing nodes.
    ///
    /// Returns `false` if the edge already exists in either orientation or
    /// an endpoint is missing.
    pub fn add_edge(&mut self, from: Id, to: Id) -> bool {
        if !self.contains(&from) || !self.contains(&to) {
            return false;
        }
        if self.adjacency.get(&from).is_some_and(|n| n.contains(&to)) {
            return false;
        }

        self.adjacency.entry(from.clone()).or_default().insert(to.clone());
        self.adjacency.entry(to.clone()).or_default().insert(from.clone());
        self.edges.push(Edge { from, to });
        true
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &Id) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up the id of the node labeled exactly `label`.
    ///
    /// Does not allocate, so it is safe to call with arbitrary user text.
    pub fn id_of(&self, label: &str) -> Option<&Id> {
        self.nodes.get_key_value(label).map(|(id, _)| id)
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.values()
    }

    /// Position of `id` in node iteration order.
    pub fn index_of(&self, id: &Id) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Distinct neighbors of `id`, or `None` for an unknown node.
    ///
    /// A node with a self-loop is its own neighbor.
    pub fn neighbors(&self, id: &Id) -> Option<&IndexSet<Id>> {
        self.adjacency.get(id)
    }

    /// Number of distinct neighbors of `id`; zero for an unknown node.
    pub fn degree(&self, id: &Id) -> usize {
        self.neighbors(id).map_or(0, IndexSet::len)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Search options: one per node, plus one per node with alternative
    /// names so the node can be found by alias.
    pub fn search_entries(&self) -> Vec<SearchEntry> {
        let mut entries = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.values() {
            entries.push(SearchEntry {
                label: node.label.clone(),
                value: node.id.clone(),
            });
            if !node.aka.is_empty() {
                entries.push(SearchEntry {
                    label: format!("{} (AKA: {})", node.label, node.aka),
                    value: node.id.clone(),
                });
            }
        }
        entries
    }

    /// Fill attributes that upstream input left blank.
    ///
    /// Returns the number of nodes changed.
    fn backfill(&mut self) -> usize {
        let mut changed = 0;
        for node in self.nodes.values_mut() {
            if node.kind.is_empty() {
                node.kind = UNKNOWN_TYPE.to_string();
                changed += 1;
            }
        }
        changed
    }
}

/// Build a graph from normalized records.
///
/// Elements are applied first, in order; a repeated label replaces the
/// earlier node's attributes (`E300`). Connections then add edges, creating
/// default nodes for labels no element defines (`E301`). Connections with a
/// blank endpoint are skipped (`E302`). Never fails; all problems are
/// returned as diagnostics.
///
/// # Examples
///
/// ```
/// # use relmap::graph::build_graph;
/// # use relmap_parser::{read_connections, read_elements};
/// let elements = read_elements("Label,Type\nA,Person\nB,Org\n");
/// let connections = read_connections("From,To\nA,B\n");
///
/// let (graph, diagnostics) = build_graph(elements.records(), connections.records());
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// assert!(diagnostics.is_empty());
/// ```
pub fn build_graph(elements: &[Element], connections: &[Connection]) -> (Graph, Vec<Diagnostic>) {
    let mut graph = Graph::new();
    let mut diagnostics = DiagnosticCollector::new();
    let mut defined_at: IndexMap<Id, RowRef> = IndexMap::new();

    for element in elements {
        let label = element.label.trim();
        if label.is_empty() {
            diagnostics.emit(
                Diagnostic::error(format!("{} has an empty label", element.row))
                    .with_code(ErrorCode::E200)
                    .with_row(element.row),
            );
            continue;
        }

        let node = Node::from_element(label, element);
        let id = node.id.clone();
        if graph.upsert_node(node).is_some() {
            diagnostics.emit(duplicate_label(label, element.row, defined_at.get(&id)));
        }
        defined_at.insert(id, element.row);
    }

    for connection in connections {
        let from = connection.from.trim();
        let to = connection.to.trim();
        if from.is_empty() || to.is_empty() {
            let mut diag = Diagnostic::error(format!(
                "{} connects `{from}` to `{to}`; both endpoints are required",
                connection.row
            ))
            .with_code(ErrorCode::E302)
            .with_row(connection.row);
            if let Some(span) = connection.row.span() {
                diag = diag.with_label(span, "connection skipped");
            }
            diagnostics.emit(diag);
            continue;
        }

        for label in [from, to] {
            if graph.ensure_node(label) {
                diagnostics.emit(unknown_reference(label, connection.row));
            }
        }
        graph.add_edge(Id::new(from), Id::new(to));
    }

    let backfilled = graph.backfill();

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        backfilled,
        diagnostics = diagnostics.diagnostics().len();
        "Graph built"
    );
    trace!(graph:?; "Built graph");

    (graph, diagnostics.into_diagnostics())
}

fn duplicate_label(label: &str, row: RowRef, first: Option<&RowRef>) -> Diagnostic {
    let mut diag = Diagnostic::warning(format!("label `{label}` is defined more than once"))
        .with_code(ErrorCode::E300)
        .with_row(row)
        .with_help("the last definition wins; remove or rename the duplicates");
    if let Some(span) = row.span() {
        diag = diag.with_label(span, "this definition wins");
    }
    if let Some(span) = first.and_then(RowRef::span) {
        diag = diag.with_secondary_label(span, "first defined here");
    }
    diag
}

fn unknown_reference(label: &str, row: RowRef) -> Diagnostic {
    let mut diag = Diagnostic::warning(format!(
        "{row} references `{label}`, which is not in the Elements sheet"
    ))
    .with_code(ErrorCode::E301)
    .with_row(row)
    .with_help(format!("add a `{label}` row to the Elements sheet to set its type"));
    if let Some(span) = row.span() {
        diag = diag.with_label(span, format!("`{label}` created with default attributes"));
    }
    diag
}

#[cfg(test)]
mod tests {
    use relmap_parser::SheetKind;

    use super::*;

    fn element(label: &str, kind: &str) -> Element {
        Element::new(label, RowRef::new(SheetKind::Elements, 2, None)).with_kind(kind)
    }

    fn connection(from: &str, to: &str) -> Connection {
        Connection::new(from, to, RowRef::new(SheetKind::Connections, 2, None))
    }

    #[test]
    fn test_two_nodes_one_edge() {
        let (graph, diagnostics) = build_graph(
            &[element("A", "Person"), element("B", "Org")],
            &[connection("A", "B")],
        );

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(diagnostics.is_empty());
        assert_eq!(graph.degree(&Id::new("A")), 1);
    }

    #[test]
    fn test_implicit_nodes() {
        let (graph, diagnostics) = build_graph(&[], &[connection("X", "Y")]);

        assert_eq!(graph.edge_count(), 1);
        for label in ["X", "Y"] {
            let node = graph.node(&Id::new(label)).unwrap();
            assert_eq!(node.kind(), UNKNOWN_TYPE);
            assert_eq!(node.description(), "");
            assert_eq!(node.aka(), "");
        }

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code() == Some(ErrorCode::E301)));
        assert!(diagnostics.iter().all(|d| d.severity().is_warning()));
    }

    #[test]
    fn test_implicit_node_reported_once() {
        let (_, diagnostics) = build_graph(&[], &[connection("X", "Y"), connection("Y", "X")]);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_duplicate_label_last_write_wins() {
        let (graph, diagnostics) = build_graph(
            &[
                element("A", "Person"),
                element("B", "Org"),
                element("A", "Malware"),
            ],
            &[],
        );

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node(&Id::new("A")).unwrap().kind(), "Malware");
        // Replacing keeps the first insertion position
        assert_eq!(graph.nodes().next().unwrap().label(), "A");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E300));
    }

    #[test]
    fn test_parallel_and_reverse_connections_collapse() {
        let (graph, _) = build_graph(
            &[element("A", "Person"), element("B", "Org")],
            &[connection("A", "B"), connection("B", "A"), connection("A", "B")],
        );

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].from(), "A");
        assert_eq!(graph.degree(&Id::new("B")), 1);
    }

    #[test]
    fn test_self_loop() {
        let (graph, _) = build_graph(&[element("A", "Person")], &[connection("A", "A")]);

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges()[0].is_self_loop());
        assert_eq!(graph.degree(&Id::new("A")), 1);
    }

    #[test]
    fn test_blank_endpoint_skipped() {
        let (graph, diagnostics) =
            build_graph(&[element("A", "Person")], &[connection("A", "  ")]);

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E302));
        assert!(diagnostics[0].severity().is_error());
    }

    #[test]
    fn test_backfill_blank_type() {
        let (graph, _) = build_graph(&[element("A", " ")], &[]);
        assert_eq!(graph.node(&Id::new("A")).unwrap().kind(), UNKNOWN_TYPE);
    }

    #[test]
    fn test_search_entries_with_aka() {
        let elements = [
            element("Lazarus Group", "Group").with_aka("Hidden Cobra"),
            element("WannaCry", "Ransomware"),
        ];
        let (graph, _) = build_graph(&elements, &[]);
        let entries = graph.search_entries();

        let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Lazarus Group",
                "Lazarus Group (AKA: Hidden Cobra)",
                "WannaCry"
            ]
        );
        assert_eq!(entries[0].value, entries[1].value);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let elements = [element("A", "Person"), element("B", "Org")];
        let connections = [connection("A", "B"), connection("B", "C")];

        let (first, _) = build_graph(&elements, &connections);
        let (second, _) = build_graph(&elements, &connections);

        let ids = |g: &Graph| g.nodes().map(Node::id).cloned().collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.edges(), second.edges());
    }

    #[test]
    fn test_ids_compare_across_builds() {
        let (first, _) = build_graph(&[element("A", "Person")], &[]);
        let (second, _) = build_graph(&[element("A", "Org")], &[]);

        let id = first.id_of("A").unwrap();
        assert_eq!(second.node(id).unwrap().kind(), "Org");
        drop(first);
        assert!(second.contains(&Id::new("A")));
    }

    #[test]
    fn test_id_of_unknown_label() {
        let (graph, _) = build_graph(&[element("A", "Person")], &[]);

        assert_eq!(graph.id_of("A").map(Id::as_str), Some("A"));
        assert_eq!(graph.id_of("Nobody"), None);
        assert_eq!(graph.node_count(), 1);
    }
}
