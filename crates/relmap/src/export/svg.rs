//! SVG drawing of a relationship map.
//!
//! Positions in normalized layout units are mapped onto a fixed-size canvas.
//! Edges are drawn under nodes, nodes are sized by degree and colored by
//! type, and a legend lists the configured types.

use log::{debug, info};
use svg::{
    Document,
    node::{Text as SvgText, element as svg_element},
};

use relmap_core::{
    color::Color,
    draw::{LayeredOutput, RenderLayer},
    geometry::{Bounds, Point},
    identifier::Id,
};

use super::{Error, Exporter};
use crate::render::{RenderEdge, RenderModel, RenderNode};

const EDGE_COLOR: &str = "#888";
const EDGE_WIDTH: f32 = 0.5;
const HIGHLIGHTED_EDGE_COLOR: &str = "red";
const HIGHLIGHTED_EDGE_WIDTH: f32 = 2.0;
const TEXT_COLOR: &str = "white";
const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Renders a [`RenderModel`] into an SVG document.
///
/// # Examples
///
/// ```
/// # use relmap::export::svg::SvgExporter;
/// let exporter = SvgExporter::new().with_size(800.0, 600.0);
/// assert_eq!(exporter.width(), 800.0);
/// ```
#[derive(Debug, Clone)]
pub struct SvgExporter {
    width: f32,
    height: f32,
    margin: f32,
    min_radius: f32,
    max_radius: f32,
    font_size: f32,
}

impl Default for SvgExporter {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 900.0,
            margin: 60.0,
            min_radius: 5.0,
            max_radius: 16.0,
            font_size: 10.0,
        }
    }
}

impl SvgExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas size in pixels.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Build the SVG document for `model`.
    pub fn render(&self, model: &RenderModel) -> Document {
        let canvas = Canvas::new(self, model);
        let max_degree = model.state().layout().max_degree();

        let mut output = LayeredOutput::new();
        output.merge(self.render_background(model.background()));
        for edge in model.edges() {
            output.merge(self.render_edge(&canvas, model, edge));
        }
        for node in model.nodes() {
            output.merge(self.render_node(&canvas, model, node, max_degree));
        }
        output.merge(self.render_title(model.title()));
        output.merge(self.render_legend(model));

        let doc = Document::new()
            .set("viewBox", format!("0 0 {} {}", self.width, self.height))
            .set("width", self.width)
            .set("height", self.height);

        output.render().into_iter().fold(doc, Document::add)
    }

    fn render_background(&self, color: Color) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let rect = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", self.width)
            .set("height", self.height)
            .set("fill", color);
        output.add_to_layer(RenderLayer::Background, Box::new(rect));
        output
    }

    fn render_edge(&self, canvas: &Canvas, model: &RenderModel, edge: &RenderEdge) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let (Some(from), Some(to)) = (canvas.point(model, &edge.from), canvas.point(model, &edge.to))
        else {
            return output;
        };

        let (layer, color, width) = if edge.highlighted {
            (
                RenderLayer::HighlightedEdge,
                HIGHLIGHTED_EDGE_COLOR,
                HIGHLIGHTED_EDGE_WIDTH,
            )
        } else {
            (RenderLayer::Edge, EDGE_COLOR, EDGE_WIDTH)
        };

        let line = svg_element::Line::new()
            .set("x1", from.x())
            .set("y1", from.y())
            .set("x2", to.x())
            .set("y2", to.y())
            .set("stroke", color)
            .set("stroke-width", width);
        output.add_to_layer(layer, Box::new(line));
        output
    }

    fn render_node(
        &self,
        canvas: &Canvas,
        model: &RenderModel,
        node: &RenderNode,
        max_degree: usize,
    ) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let Some(center) = canvas.point(model, &node.id) else {
            return output;
        };
        let radius = self.radius(node.degree, max_degree);

        let circle = svg_element::Circle::new()
            .set("cx", center.x())
            .set("cy", center.y())
            .set("r", radius)
            .set("fill", node.color)
            .set("fill-opacity", node.opacity)
            .set("stroke", TEXT_COLOR)
            .set("stroke-width", if node.highlighted { 1.5_f32 } else { 0.5 })
            .set("stroke-opacity", node.opacity)
            .add(svg_element::Title::new(node.title.as_str()));
        output.add_to_layer(RenderLayer::Node, Box::new(circle));

        let label = svg_element::Text::new(node.label.as_str())
            .set("x", center.x())
            .set("y", center.y() - radius - 4.0)
            .set("text-anchor", "middle")
            .set("font-family", FONT_FAMILY)
            .set("font-size", self.font_size)
            .set("fill", TEXT_COLOR)
            .set("fill-opacity", node.opacity);
        output.add_to_layer(RenderLayer::Text, Box::new(label));
        output
    }

    fn render_title(&self, title: &str) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        if title.is_empty() {
            return output;
        }

        let text = svg_element::Text::new(title)
            .set("x", self.width / 2.0)
            .set("y", self.margin / 2.0)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", FONT_FAMILY)
            .set("font-size", self.font_size * 2.0)
            .set("fill", TEXT_COLOR);
        output.add_to_layer(RenderLayer::Text, Box::new(text));
        output
    }

    fn render_legend(&self, model: &RenderModel) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let swatch = self.font_size * 1.2;
        let line_height = swatch + 4.0;
        let x = 10.0;

        let mut group = svg_element::Group::new();
        for (idx, (kind, color)) in model.color_map().iter().enumerate() {
            let y = self.margin + idx as f32 * line_height;
            group = group
                .add(
                    svg_element::Rectangle::new()
                        .set("x", x)
                        .set("y", y)
                        .set("width", swatch)
                        .set("height", swatch)
                        .set("fill", color),
                )
                .add(
                    svg_element::Text::new("")
                        .set("x", x + swatch + 5.0)
                        .set("y", y + swatch / 2.0)
                        .set("dominant-baseline", "central")
                        .set("font-family", FONT_FAMILY)
                        .set("font-size", self.font_size)
                        .set("fill", TEXT_COLOR)
                        .add(SvgText::new(kind)),
                );
        }
        output.add_to_layer(RenderLayer::Legend, Box::new(group));
        output
    }

    /// Radius for a node, growing linearly with its share of the largest degree.
    fn radius(&self, degree: usize, max_degree: usize) -> f32 {
        if max_degree == 0 {
            return self.min_radius;
        }
        let share = degree as f32 / max_degree as f32;
        self.min_radius + (self.max_radius - self.min_radius) * share
    }
}

impl Exporter for SvgExporter {
    fn export(&self, model: &RenderModel) -> Result<String, Error> {
        if !(self.width > 2.0 * self.margin && self.height > 2.0 * self.margin) {
            return Err(Error::Render(format!(
                "canvas {}x{} leaves no room inside a {} margin",
                self.width, self.height, self.margin
            )));
        }

        info!(nodes = model.nodes().len(), edges = model.edges().len(); "Rendering SVG");
        let svg = self.render(model).to_string();
        debug!(bytes = svg.len(); "SVG document rendered");
        Ok(svg)
    }
}

/// Maps normalized layout coordinates onto the drawing area.
struct Canvas {
    bounds: Option<Bounds>,
    origin: Point,
    width: f32,
    height: f32,
}

impl Canvas {
    fn new(exporter: &SvgExporter, model: &RenderModel) -> Self {
        let bounds = Bounds::enclosing(
            model
                .nodes()
                .iter()
                .filter_map(|node| model.position(&node.id))
                .map(|[x, y]| Point::new(x, y)),
        );

        Self {
            bounds,
            origin: Point::new(exporter.margin, exporter.margin),
            width: exporter.width - 2.0 * exporter.margin,
            height: exporter.height - 2.0 * exporter.margin,
        }
    }

    fn point(&self, model: &RenderModel, id: &Id) -> Option<Point> {
        let [x, y] = model.position(id)?;
        let bounds = self.bounds?;

        // A degenerate extent collapses to the center of that axis
        let fit = |value: f32, min: f32, extent: f32, size: f32| {
            if extent > 0.0 {
                (value - min) / extent * size
            } else {
                size / 2.0
            }
        };

        Some(self.origin.add_point(Point::new(
            fit(x, bounds.min_x(), bounds.width(), self.width),
            fit(y, bounds.min_y(), bounds.height(), self.height),
        )))
    }
}
