//! Relmap - relationship maps from spreadsheet data.
//!
//! Reads an Elements sheet and a Connections sheet, builds an undirected
//! graph, lays it out with a seeded force-directed simulation and renders
//! it with search and neighbor highlighting.
//!
//! # Pipeline
//!
//! ```text
//! RecordSource ─fetch→ SheetSources
//!     ↓ read + normalize      (relmap_parser)
//! Elements, Connections
//!     ↓ graph::build_graph
//! Graph
//!     ↓ layout::compute_layout
//! GraphState ─→ render::RenderModel ─→ export
//! ```

pub mod config;
pub mod export;
pub mod graph;
pub mod layout;
pub mod query;
pub mod render;
pub mod source;

mod error;

pub use relmap_core::{color, geometry, identifier};
pub use relmap_parser::error::{Diagnostic, ErrorCode, Severity};

pub use error::RelmapError;
pub use source::{CsvFileSource, RecordSource, SheetSources, StaticSource};

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, trace, warn};

use relmap_parser::{error::DiagnosticCollector, read_connections, read_elements};

use config::{AppConfig, ColorMap};
use export::Exporter;
use graph::{Graph, build_graph};
use layout::{Layout, compute_layout};
use render::RenderModel;

/// Everything one refresh produces.
///
/// Replaced as a whole on every refresh, never patched.
#[derive(Debug, Clone)]
pub struct GraphState {
    graph: Graph,
    layout: Layout,
    color_map: ColorMap,
    diagnostics: Vec<Diagnostic>,
}

impl GraphState {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    /// Diagnostics from reading, building and laying out, in that order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Builder running the map pipeline.
///
/// # Examples
///
/// ```
/// use relmap::{MapBuilder, SheetSources, config::AppConfig};
///
/// let sources = SheetSources::new(
///     "Label,Type\nLazarus Group,Group\nWannaCry,Ransomware\n",
///     "From,To\nLazarus Group,WannaCry\n",
/// );
///
/// let builder = MapBuilder::new(AppConfig::default());
/// let state = builder.build(&sources).expect("Failed to build");
/// assert_eq!(state.graph().node_count(), 2);
///
/// let model = builder.render_model(state.into()).expect("Failed to render");
/// let svg = builder.render_svg(&model).expect("Failed to export");
/// assert!(svg.contains("Lazarus Group"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    config: AppConfig,
}

impl MapBuilder {
    /// Create a new map builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read both sheets and compute a fresh [`GraphState`].
    ///
    /// Bad rows are skipped and reported in [`GraphState::diagnostics`].
    ///
    /// # Errors
    ///
    /// Returns [`RelmapError::Config`] for invalid layout or color settings,
    /// and [`RelmapError::Parse`] when strict mode is on and any error
    /// diagnostic was produced.
    pub fn build(&self, sources: &SheetSources) -> Result<GraphState, RelmapError> {
        self.config
            .layout()
            .validate()
            .map_err(RelmapError::Config)?;
        let color_map = self
            .config
            .style()
            .color_map()
            .map_err(RelmapError::Config)?;

        info!("Reading sheets");
        let (elements, element_diagnostics) = read_elements(sources.elements()).into_parts();
        let (connections, connection_diagnostics) =
            read_connections(sources.connections()).into_parts();
        debug!(
            elements = elements.len(),
            connections = connections.len();
            "Records normalized"
        );

        info!("Building graph");
        let (graph, graph_diagnostics) = build_graph(&elements, &connections);

        let layout = compute_layout(&graph, self.config.layout());
        info!(nodes = layout.len(); "Layout calculated");

        let mut collector = DiagnosticCollector::new();
        collector.extend(element_diagnostics);
        collector.extend(connection_diagnostics);
        collector.extend(graph_diagnostics);
        collector.extend(layout.diagnostics().iter().cloned());
        log_diagnostics(collector.diagnostics());

        let diagnostics = if self.config.data().strict() {
            collector
                .finish()
                .map_err(|err| RelmapError::new_parse_error(err, sources.clone()))?
        } else {
            collector.into_diagnostics()
        };

        Ok(GraphState {
            graph,
            layout,
            color_map,
            diagnostics,
        })
    }

    /// Build the unhighlighted [`RenderModel`] of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`RelmapError::Config`] if a configured color is invalid.
    pub fn render_model(&self, state: Arc<GraphState>) -> Result<RenderModel, RelmapError> {
        RenderModel::new(state, self.config.style())
    }

    /// Render `model` to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`RelmapError::Export`] if rendering fails.
    pub fn render_svg(&self, model: &RenderModel) -> Result<String, RelmapError> {
        Ok(export::svg::SvgExporter::new().export(model)?)
    }

    /// Render `model` to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RelmapError::Export`] if serialization fails.
    pub fn render_json(&self, model: &RenderModel) -> Result<String, RelmapError> {
        Ok(export::json::to_json(model)?)
    }
}

fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.severity().is_error() {
            error!(diagnostic:%; "Row rejected");
        } else {
            warn!(diagnostic:%; "Input tolerated");
        }
    }
}

/// Serializes refreshes of a [`GraphState`] from a [`RecordSource`].
///
/// At most one refresh runs at a time; concurrent callers wait for the
/// running one and then run their own. Readers always see a complete state:
/// the new state replaces the old one only after the whole pipeline has
/// succeeded, and a failed refresh keeps the previous state.
#[derive(Debug)]
pub struct Refresher<S> {
    source: S,
    builder: MapBuilder,
    refresh_lock: Mutex<()>,
    current: Mutex<Arc<GraphState>>,
}

impl<S: RecordSource> Refresher<S> {
    /// Create a refresher and run the first refresh.
    ///
    /// # Errors
    ///
    /// Returns the error of the initial fetch or build.
    pub fn new(source: S, builder: MapBuilder) -> Result<Self, RelmapError> {
        let state = builder.build(&source.fetch()?)?;
        Ok(Self {
            source,
            builder,
            refresh_lock: Mutex::new(()),
            current: Mutex::new(Arc::new(state)),
        })
    }

    /// Fetch both sheets again and rebuild the state.
    ///
    /// # Errors
    ///
    /// Returns the fetch or build error; the previous state stays current.
    pub fn refresh(&self) -> Result<Arc<GraphState>, RelmapError> {
        let _guard = lock(&self.refresh_lock);
        info!("Refreshing map");

        let state = self
            .source
            .fetch()
            .and_then(|sources| self.builder.build(&sources))
            .inspect_err(|err| warn!(err:%; "Refresh failed, keeping previous map"))?;

        let state = Arc::new(state);
        *lock(&self.current) = Arc::clone(&state);
        trace!(nodes = state.graph().node_count(); "Map state replaced");
        Ok(state)
    }

    /// The last successfully built state.
    pub fn current(&self) -> Arc<GraphState> {
        Arc::clone(&lock(&self.current))
    }

    pub fn builder(&self) -> &MapBuilder {
        &self.builder
    }
}

/// Lock `mutex`, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
