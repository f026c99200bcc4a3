//! Command-line argument definitions for the Relmap CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the two sheets, the output file and
//! format, an optional highlighted node, configuration and logging.

use clap::{Parser, ValueEnum};

/// Output format of the rendered map.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Standalone SVG drawing
    #[default]
    Svg,
    /// Render model as JSON, for web front-ends
    Json,
}

/// Command-line arguments for the Relmap tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the Elements sheet (CSV)
    #[arg(help = "Path to the Elements CSV file")]
    pub elements: String,

    /// Path to the Connections sheet (CSV)
    #[arg(help = "Path to the Connections CSV file")]
    pub connections: String,

    /// Path to the output file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Svg)]
    pub format: Format,

    /// Highlight a node and its direct neighbors, by label or search entry
    #[arg(long, value_name = "NODE")]
    pub highlight: Option<String>,

    /// Print the details panel of a node
    #[arg(long, value_name = "NODE")]
    pub info: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Re-read the sheets and re-render every N seconds
    #[arg(long, value_name = "SECS")]
    pub refresh_secs: Option<u64>,
}
