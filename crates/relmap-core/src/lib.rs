//! Relmap Core Types
//!
//! This crate provides the foundational types shared by the relmap crates:
//!
//! - **Identifiers**: Reference-counted node identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Points and bounding boxes for layout ([`geometry`] module)
//! - **Draw**: Layered SVG output ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
