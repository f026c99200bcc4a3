//! CLI logic for the Relmap tool.
//!
//! Reads the Elements and Connections sheets, builds the map and writes it
//! as SVG or JSON, optionally re-reading the sheets on an interval.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Format};

use std::{fs, sync::Arc, thread, time::Duration};

use log::{info, warn};

use relmap::{
    CsvFileSource, GraphState, MapBuilder, Refresher, RelmapError,
    identifier::Id,
    render::{NodeDetails, RenderModel},
};

/// Run the Relmap CLI application
///
/// Builds the map from the two CSV files and writes it to the output file.
/// With `--refresh-secs` the sheets are re-read and the output rewritten on
/// every interval until the process is stopped; a failed refresh keeps the
/// previous map.
///
/// # Errors
///
/// Returns `RelmapError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Rejected rows in strict mode
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), RelmapError> {
    info!(
        elements_path = args.elements,
        connections_path = args.connections,
        output_path = args.output;
        "Processing sheets"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = CsvFileSource::new(&args.elements, &args.connections);
    let refresher = Refresher::new(source, MapBuilder::new(app_config))?;
    publish(args, refresher.builder(), refresher.current())?;

    let Some(secs) = args.refresh_secs else {
        return Ok(());
    };

    let interval = Duration::from_secs(secs.max(1));
    info!(interval_secs = interval.as_secs(); "Watching sheets");
    loop {
        thread::sleep(interval);
        // Failures are logged by the refresher; the last output stays in place
        if let Ok(state) = refresher.refresh() {
            publish(args, refresher.builder(), state)?;
        }
    }
}

/// Render `state` as requested by `args` and write it out.
fn publish(args: &Args, builder: &MapBuilder, state: Arc<GraphState>) -> Result<(), RelmapError> {
    let mut model = builder.render_model(Arc::clone(&state))?;

    if let Some(target) = &args.highlight {
        match find_node(&model, target) {
            Some(id) => model = model.highlight(&id),
            None => warn!(node = target.as_str(); "No node to highlight"),
        }
    }

    if let Some(target) = &args.info {
        match find_node(&model, target).and_then(|id| NodeDetails::lookup(state.graph(), &id)) {
            Some(details) => println!("{details}"),
            None => warn!(node = target.as_str(); "No node to describe"),
        }
    }

    let output = match args.format {
        Format::Svg => builder.render_svg(&model)?,
        Format::Json => builder.render_json(&model)?,
    };
    fs::write(&args.output, output)?;

    info!(output_file = args.output, format:? = args.format; "Map exported successfully");
    Ok(())
}

/// Resolve a search entry or a plain node label.
fn find_node(model: &RenderModel, text: &str) -> Option<Id> {
    model
        .search(text)
        .or_else(|| model.state().graph().id_of(text))
        .cloned()
}

#[cfg(test)]
mod tests {
    use relmap::{SheetSources, config::AppConfig};

    use super::*;

    fn model() -> RenderModel {
        let builder = MapBuilder::new(AppConfig::default());
        let sources = SheetSources::new(
            "Label,Type,AKA\nAPT38,Group,BlueNoroff\nFASTCash,Malware,\n",
            "From,To\nAPT38,FASTCash\n",
        );
        let state = builder.build(&sources).unwrap();
        builder.render_model(Arc::new(state)).unwrap()
    }

    #[test]
    fn test_find_node_by_label_and_alias() {
        let model = model();
        assert_eq!(find_node(&model, "FASTCash"), Some(Id::new("FASTCash")));
        assert_eq!(
            find_node(&model, "APT38 (AKA: BlueNoroff)"),
            Some(Id::new("APT38"))
        );
    }

    #[test]
    fn test_find_node_unknown_text() {
        let model = model();
        assert_eq!(find_node(&model, "BlueNoroff"), None);
        assert_eq!(find_node(&model, ""), None);
        assert_eq!(model.state().graph().node_count(), 2);
    }
}
