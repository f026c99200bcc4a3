//! Force-directed layout.
//!
//! Nodes start at seeded random positions in the unit square. Every pair
//! repels with force `k² / d` and every edge attracts with force
//! `spring_constant · d² / k`. Each step moves a node along its net force by
//! at most the current temperature, which cools linearly to zero. The
//! simulation stops when the mean step falls below `threshold` or the
//! iteration budget runs out. The result is centered on the origin and
//! scaled so the largest coordinate is `scale`.
//!
//! A single minimum-separation pass then pushes apart every pair closer
//! than `min_dist`. Corrections are applied in place in node order, so a
//! later correction can undo part of an earlier one; the pass reduces
//! overlap but does not guarantee its absence.
//!
//! Repulsion and separation are both quadratic in the node count, which is
//! fine for maps of up to a few hundred nodes.

use indexmap::IndexMap;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};

use relmap_core::{
    geometry::{Bounds, Point},
    identifier::Id,
};
use relmap_parser::error::{Diagnostic, ErrorCode};

use crate::{
    config::LayoutConfig,
    graph::{Graph, Node},
};

/// Distances are clamped to this value so forces stay finite.
const MIN_FORCE_DISTANCE: f32 = 0.01;

/// Initial temperature, as a fraction of the unit square.
const INITIAL_TEMPERATURE: f32 = 0.1;

/// Direction used to separate two nodes at the same position.
const FALLBACK_DIRECTION: Point = Point::new(1.0, 0.0);

/// Node positions and degrees for one graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    positions: IndexMap<Id, Point>,
    degrees: IndexMap<Id, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Layout {
    /// Position of `id`, if it is part of the layout.
    pub fn position(&self, id: &Id) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Iterate over `(id, position)` in graph node order.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = (&Id, Point)> {
        self.positions.iter().map(|(id, p)| (id, *p))
    }

    /// Number of distinct neighbors of `id`; zero for an unknown node.
    pub fn degree(&self, id: &Id) -> usize {
        self.degrees.get(id).copied().unwrap_or(0)
    }

    /// Largest degree in the graph, zero for an empty layout.
    pub fn max_degree(&self) -> usize {
        self.degrees.values().copied().max().unwrap_or(0)
    }

    /// Smallest box containing every position.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.positions.values().copied())
    }

    /// Warnings raised while placing nodes.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Compute positions for every node of `graph`.
///
/// The result depends only on the graph (including node and edge insertion
/// order) and `config`: identical inputs give bit-identical positions.
///
/// # Examples
///
/// ```
/// # use relmap::{config::LayoutConfig, graph::build_graph, layout::compute_layout};
/// # use relmap_parser::{read_connections, read_elements};
/// let elements = read_elements("Label\nA\nB\nC\n");
/// let connections = read_connections("From,To\nA,B\n");
/// let (graph, _) = build_graph(elements.records(), connections.records());
///
/// let config = LayoutConfig::default();
/// let layout = compute_layout(&graph, &config);
///
/// assert_eq!(layout.len(), 3);
/// assert_eq!(layout, compute_layout(&graph, &config));
/// ```
pub fn compute_layout(graph: &Graph, config: &LayoutConfig) -> Layout {
    info!(nodes = graph.node_count(), edges = graph.edge_count(); "Computing layout");

    let mut positions = match graph.node_count() {
        0 => Vec::new(),
        1 => vec![Point::default()],
        _ => {
            let mut simulation = Simulation::new(graph, config);
            simulation.run();
            rescale(&mut simulation.positions, config.scale());
            simulation.positions
        }
    };

    let coincident = enforce_min_distance(&mut positions, config.min_dist());

    let mut diagnostics = Vec::new();
    if coincident > 0 {
        warn!(pairs = coincident; "Coincident nodes separated along fallback direction");
        diagnostics.push(
            Diagnostic::warning(format!(
                "{coincident} pair(s) of nodes shared a position and were separated along a fixed direction"
            ))
            .with_code(ErrorCode::E400),
        );
    }

    let ids: Vec<Id> = graph.nodes().map(Node::id).cloned().collect();
    Layout {
        degrees: ids.iter().map(|id| (id.clone(), graph.degree(id))).collect(),
        positions: ids.into_iter().zip(positions).collect(),
        diagnostics,
    }
}

/// Push apart every pair of positions closer than `min_dist`.
///
/// Each violating pair moves apart along the line joining them by half the
/// deficit each, so their midpoint is preserved and they end up exactly
/// `min_dist` apart. Pairs are visited once, in index order, against the
/// positions as already corrected.
///
/// Returns the number of pairs that coincided exactly and were separated
/// along a fixed direction.
pub fn enforce_min_distance(positions: &mut [Point], min_dist: f32) -> usize {
    let mut coincident = 0;
    let mut corrected = 0;

    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let delta = positions[j].sub_point(positions[i]);
            let dist = delta.hypot();
            if dist >= min_dist {
                continue;
            }

            let direction = if delta.is_zero() {
                coincident += 1;
                FALLBACK_DIRECTION
            } else {
                delta.scale(1.0 / dist)
            };
            let push = direction.scale((min_dist - dist) / 2.0);

            positions[i] = positions[i].sub_point(push);
            positions[j] = positions[j].add_point(push);
            corrected += 1;
        }
    }

    debug!(corrected, coincident, min_dist; "Minimum separation enforced");
    coincident
}

/// Center `positions` on the origin and scale them into `[-scale, scale]`.
fn rescale(positions: &mut [Point], scale: f32) {
    if positions.is_empty() {
        return;
    }

    let count = positions.len() as f32;
    let sum = positions
        .iter()
        .fold(Point::default(), |acc, p| acc.add_point(*p));
    let mean = sum.scale(1.0 / count);

    let mut extent = 0.0_f32;
    for p in positions.iter_mut() {
        *p = p.sub_point(mean);
        extent = extent.max(p.x().abs()).max(p.y().abs());
    }

    if extent > 0.0 {
        let factor = scale / extent;
        for p in positions.iter_mut() {
            *p = p.scale(factor);
        }
    }
}

/// Fruchterman-Reingold simulation state.
struct Simulation<'a> {
    config: &'a LayoutConfig,
    positions: Vec<Point>,
    /// Edges as index pairs into `positions`; self-loops excluded.
    springs: Vec<(usize, usize)>,
}

impl<'a> Simulation<'a> {
    fn new(graph: &Graph, config: &'a LayoutConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.random_seed());
        let positions = (0..graph.node_count())
            .map(|_| Point::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
            .collect();

        let springs = graph
            .edges()
            .iter()
            .filter(|edge| !edge.is_self_loop())
            .filter_map(|edge| Some((graph.index_of(edge.from())?, graph.index_of(edge.to())?)))
            .collect();

        Self {
            config,
            positions,
            springs,
        }
    }

    fn run(&mut self) {
        let iterations = self.config.iterations();
        let cooling = INITIAL_TEMPERATURE / (iterations as f32 + 1.0);
        let mut temperature = INITIAL_TEMPERATURE;
        let mut steps = 0;

        for _ in 0..iterations {
            steps += 1;
            let displacement = self.forces();
            let moved = self.step(&displacement, temperature);
            temperature -= cooling;

            if moved / (self.positions.len() as f32) < self.config.threshold() {
                break;
            }
        }

        debug!(steps, iterations; "Force simulation finished");
    }

    /// Net force on every node.
    fn forces(&self) -> Vec<Point> {
        let k = self.config.k();
        let k_squared = k * k;
        let mut displacement = vec![Point::default(); self.positions.len()];

        for i in 0..self.positions.len() {
            for j in (i + 1)..self.positions.len() {
                let (direction, dist) = separation(self.positions[i], self.positions[j]);
                let repulsion = direction.scale(k_squared / dist);
                displacement[i] = displacement[i].add_point(repulsion);
                displacement[j] = displacement[j].sub_point(repulsion);
            }
        }

        for &(i, j) in &self.springs {
            let (direction, dist) = separation(self.positions[i], self.positions[j]);
            let attraction = direction.scale(self.config.spring_constant() * dist * dist / k);
            displacement[i] = displacement[i].sub_point(attraction);
            displacement[j] = displacement[j].add_point(attraction);
        }

        displacement
    }

    /// Move every node along its force by at most `temperature`.
    ///
    /// Returns the total distance moved.
    fn step(&mut self, displacement: &[Point], temperature: f32) -> f32 {
        let mut moved = 0.0;
        for (position, force) in self.positions.iter_mut().zip(displacement) {
            let length = force.hypot();
            if length == 0.0 {
                continue;
            }
            let distance = length.min(temperature.max(0.0));
            *position = position.add_point(force.scale(distance / length));
            moved += distance;
        }
        moved
    }
}

/// Unit vector from `b` to `a` and their clamped distance.
fn separation(a: Point, b: Point) -> (Point, f32) {
    let delta = a.sub_point(b);
    let dist = delta.hypot();
    if delta.is_zero() {
        return (FALLBACK_DIRECTION, MIN_FORCE_DISTANCE);
    }
    (delta.scale(1.0 / dist), dist.max(MIN_FORCE_DISTANCE))
}
