//! Configuration types for building and rendering relationship maps.
//!
//! All types implement [`serde::Deserialize`] and every field has a default,
//! so a configuration file only needs the values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Force-directed layout parameters.
//! - [`StyleConfig`] - Title, colors and dimming used when rendering.
//! - [`DataConfig`] - How diagnostics affect a build.
//!
//! # Example
//!
//! ```
//! # use relmap::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.layout().validate().is_ok());
//! assert!(config.style().color_map().is_ok());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

use relmap_core::color::Color;
use relmap_parser::UNKNOWN_TYPE;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Data handling section.
    #[serde(default)]
    data: DataConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig, data: DataConfig) -> Self {
        Self {
            layout,
            style,
            data,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the data configuration.
    pub fn data(&self) -> &DataConfig {
        &self.data
    }
}

/// Largest accepted `k`. Repulsion grows with `k²`, so larger values
/// overflow the force sums.
pub const MAX_K: f32 = 1.0e3;

/// Force-directed layout parameters.
///
/// Positions are computed in normalized units: after the simulation the
/// layout is centered on the origin and scaled so the largest coordinate is
/// `scale`. `min_dist` is measured in the same units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    k: f32,
    spring_constant: f32,
    iterations: usize,
    random_seed: u64,
    min_dist: f32,
    threshold: f32,
    scale: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            k: 2.0,
            spring_constant: 1.0,
            iterations: 1000,
            random_seed: 42,
            min_dist: 0.05,
            threshold: 1e-4,
            scale: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Optimal node distance; scales both repulsion and attraction.
    pub fn k(&self) -> f32 {
        self.k
    }

    /// Multiplier on the attractive force along edges.
    pub fn spring_constant(&self) -> f32 {
        self.spring_constant
    }

    /// Maximum number of simulation steps.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Seed for the initial placement.
    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    /// Minimum separation enforced after the simulation.
    pub fn min_dist(&self) -> f32 {
        self.min_dist
    }

    /// Mean displacement below which the simulation stops early.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Half-extent of the normalized layout.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn with_k(mut self, k: f32) -> Self {
        self.k = k;
        self
    }

    pub fn with_spring_constant(mut self, spring_constant: f32) -> Self {
        self.spring_constant = spring_constant;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }

    pub fn with_min_dist(mut self, min_dist: f32) -> Self {
        self.min_dist = min_dist;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Check that the parameters describe a usable simulation.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid parameter.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.k > 0.0 && self.k <= MAX_K) {
            return Err(format!(
                "layout.k must be positive and at most {MAX_K}, got {}",
                self.k
            ));
        }
        if !(self.spring_constant >= 0.0 && self.spring_constant.is_finite()) {
            return Err(format!(
                "layout.spring_constant must not be negative, got {}",
                self.spring_constant
            ));
        }
        // Attraction divides by k
        if !(self.spring_constant / self.k).is_finite() {
            return Err(format!(
                "layout.spring_constant {} is too large for layout.k {}",
                self.spring_constant, self.k
            ));
        }
        if !(self.min_dist >= 0.0 && self.min_dist.is_finite()) {
            return Err(format!(
                "layout.min_dist must not be negative, got {}",
                self.min_dist
            ));
        }
        if !(self.threshold >= 0.0 && self.threshold.is_finite()) {
            return Err(format!(
                "layout.threshold must not be negative, got {}",
                self.threshold
            ));
        }
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(format!("layout.scale must be positive, got {}", self.scale));
        }
        Ok(())
    }
}

/// Visual styling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    title: String,
    background_color: String,
    default_color: String,
    dimmed_color: String,
    dimmed_opacity: f32,
    /// Node type to color string.
    color_map: IndexMap<String, String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let color_map = [
            ("Group", "blue"),
            ("Malware", "orange"),
            ("Organization", "red"),
            ("Person", "green"),
            ("Ransomware", "purple"),
            ("Vulnerability", "pink"),
            (UNKNOWN_TYPE, "#97C2FC"),
        ]
        .into_iter()
        .map(|(kind, color)| (kind.to_string(), color.to_string()))
        .collect();

        Self {
            title: "Relationship Map".to_string(),
            background_color: "black".to_string(),
            default_color: "#97C2FC".to_string(),
            dimmed_color: "gray".to_string(),
            dimmed_opacity: 0.1,
            color_map,
        }
    }
}

impl StyleConfig {
    /// Title shown above the map.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Opacity of nodes outside a highlighted neighborhood.
    pub fn dimmed_opacity(&self) -> f32 {
        self.dimmed_opacity
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Returns the parsed background [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string is not a valid color.
    pub fn background_color(&self) -> Result<Color, String> {
        Color::new(&self.background_color)
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the parsed color for nodes outside a highlighted neighborhood.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string is not a valid color.
    pub fn dimmed_color(&self) -> Result<Color, String> {
        Color::new(&self.dimmed_color)
            .map_err(|err| format!("Invalid dimmed color in config: {err}"))
    }

    /// Builds the [`ColorMap`] from the configured colors.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first type whose color does not parse.
    pub fn color_map(&self) -> Result<ColorMap, String> {
        let default = Color::new(&self.default_color)
            .map_err(|err| format!("Invalid default color in config: {err}"))?;

        let colors = self
            .color_map
            .iter()
            .map(|(kind, color)| {
                Color::new(color)
                    .map(|color| (kind.clone(), color))
                    .map_err(|err| format!("Invalid color for type `{kind}` in config: {err}"))
            })
            .collect::<Result<_, _>>()?;

        Ok(ColorMap { colors, default })
    }
}

/// Data handling configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    strict: bool,
}

impl DataConfig {
    /// Creates a new [`DataConfig`].
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// When set, any error diagnostic fails the build.
    pub fn strict(&self) -> bool {
        self.strict
    }
}

/// Node type to display color, with a fallback for unlisted types.
///
/// Serializes as a `type -> color` map in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    colors: IndexMap<String, Color>,
    default: Color,
}

impl ColorMap {
    /// Color for nodes of type `kind`.
    pub fn color_for(&self, kind: &str) -> Color {
        self.colors.get(kind).copied().unwrap_or(self.default)
    }

    /// Fallback color for types missing from the map.
    pub fn default_color(&self) -> Color {
        self.default
    }

    /// Iterate over `(type, color)` pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.colors.iter().map(|(kind, color)| (kind.as_str(), *color))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Serialize for ColorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.colors.len()))?;
        for (kind, color) in &self.colors {
            map.serialize_entry(kind, color)?;
        }
        map.end()
    }
}
