//! Drawing support shared by exporters.
//!
//! Exporters emit SVG nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]; the output is flattened bottom-to-top so edges never
//! cover nodes and labels always stay readable.

mod layer;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
