//! Render model handed to front-ends.
//!
//! A [`RenderModel`] is the display-ready view of one [`GraphState`]: nodes
//! with their colors and degrees, edges, positions, search options and the
//! legend. Highlighting only changes styling; topology and positions stay as
//! laid out.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use relmap_core::{color::Color, identifier::Id};

use crate::{
    GraphState, RelmapError,
    config::{ColorMap, StyleConfig},
    graph::{Graph, SearchEntry},
    query::neighbors_closure,
};

/// A node as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: Id,
    pub label: String,
    /// Tooltip text, `Type: <type>`.
    pub title: String,
    pub color: Color,
    /// Number of distinct neighbors.
    pub degree: usize,
    pub opacity: f32,
    /// Part of the highlighted neighborhood.
    pub highlighted: bool,
}

/// An edge as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEdge {
    pub from: Id,
    pub to: Id,
    /// Incident to the highlighted node.
    pub highlighted: bool,
}

/// Styling applied to nodes outside a highlighted neighborhood.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Dimming {
    color: Color,
    opacity: f32,
}

/// Display-ready view of a graph state.
#[derive(Debug, Clone, Serialize)]
pub struct RenderModel {
    title: String,
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    positions: IndexMap<Id, [f32; 2]>,
    search_options: Vec<SearchEntry>,
    color_map: ColorMap,
    /// Node the current highlight is centered on.
    selected: Option<Id>,
    #[serde(skip)]
    background: Color,
    #[serde(skip)]
    dimming: Dimming,
    #[serde(skip)]
    state: Arc<GraphState>,
}

impl RenderModel {
    /// Build the unhighlighted model of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`RelmapError::Config`] if a configured color is invalid.
    pub fn new(state: Arc<GraphState>, style: &StyleConfig) -> Result<Self, RelmapError> {
        let dimming = Dimming {
            color: style.dimmed_color().map_err(RelmapError::Config)?,
            opacity: style.dimmed_opacity(),
        };
        let background = style.background_color().map_err(RelmapError::Config)?;

        let graph = state.graph();
        let layout = state.layout();
        let color_map = state.color_map();

        let nodes = graph
            .nodes()
            .map(|node| RenderNode {
                id: node.id().clone(),
                label: node.label().to_string(),
                title: format!("Type: {}", node.kind()),
                color: color_map.color_for(node.kind()),
                degree: layout.degree(node.id()),
                opacity: 1.0,
                highlighted: false,
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|edge| RenderEdge {
                from: edge.from().clone(),
                to: edge.to().clone(),
                highlighted: false,
            })
            .collect();
        let positions = layout
            .positions()
            .map(|(id, p)| (id.clone(), p.to_array()))
            .collect();

        Ok(Self {
            title: style.title().to_string(),
            nodes,
            edges,
            positions,
            search_options: graph.search_entries(),
            color_map: color_map.clone(),
            selected: None,
            background,
            dimming,
            state,
        })
    }

    /// Highlight `id` and its direct neighbors.
    ///
    /// Other nodes are dimmed and edges incident to `id` are marked. An id
    /// that is not in the graph leaves the model unchanged.
    pub fn highlight(&self, id: &Id) -> Self {
        let closure = neighbors_closure(self.state.graph(), id);
        if closure.is_empty() {
            debug!(node = id.to_text(); "Nothing to highlight");
            return self.clone();
        }

        let mut model = self.deselect();
        for node in &mut model.nodes {
            if closure.contains(&node.id) {
                node.highlighted = true;
            } else {
                node.color = self.dimming.color;
                node.opacity = self.dimming.opacity;
            }
        }
        for edge in &mut model.edges {
            edge.highlighted = edge.from == *id || edge.to == *id;
        }
        model.selected = Some(id.clone());

        debug!(node = id.to_text(), neighborhood = closure.len(); "Node highlighted");
        model
    }

    /// Clear any highlight.
    pub fn deselect(&self) -> Self {
        let mut model = self.clone();
        let graph = self.state.graph();
        for node in &mut model.nodes {
            node.color = graph
                .node(&node.id)
                .map_or(self.color_map.default_color(), |n| {
                    self.color_map.color_for(n.kind())
                });
            node.opacity = 1.0;
            node.highlighted = false;
        }
        for edge in &mut model.edges {
            edge.highlighted = false;
        }
        model.selected = None;
        model
    }

    /// Resolve a search entry label (a node label or its AKA form) to a node.
    pub fn search(&self, text: &str) -> Option<&Id> {
        self.search_options
            .iter()
            .find(|entry| entry.label == text)
            .map(|entry| &entry.value)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RenderEdge] {
        &self.edges
    }

    /// Position of `id` in normalized layout units.
    pub fn position(&self, id: &Id) -> Option<[f32; 2]> {
        self.positions.get(id).copied()
    }

    pub fn search_options(&self) -> &[SearchEntry] {
        &self.search_options
    }

    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    pub fn selected(&self) -> Option<&Id> {
        self.selected.as_ref()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// The state this model was built from.
    pub fn state(&self) -> &GraphState {
        &self.state
    }
}

/// Content of the node information panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetails {
    pub heading: String,
    pub kind: String,
    pub description: String,
    pub aka: String,
    pub degree: usize,
}

impl NodeDetails {
    const NO_DESCRIPTION: &'static str = "No description available.";
    const NO_AKA: &'static str = "No alternative names available.";

    /// Panel content for node `id`, or `None` if the graph has no such node.
    pub fn lookup(graph: &Graph, id: &Id) -> Option<Self> {
        let node = graph.node(id)?;
        let or_default = |value: &str, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        Some(Self {
            heading: format!("Node: {}", node.label()),
            kind: node.kind().to_string(),
            description: or_default(node.description(), Self::NO_DESCRIPTION),
            aka: or_default(node.aka(), Self::NO_AKA),
            degree: graph.degree(id),
        })
    }
}

impl fmt::Display for NodeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "Type: {}", self.kind)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "AKA: {}", self.aka)?;
        write!(f, "Connections: {}", self.degree)
    }
}
