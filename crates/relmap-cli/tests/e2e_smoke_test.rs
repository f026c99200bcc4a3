use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use relmap::RelmapError;
use relmap_cli::{Args, Format, run};

/// Demo sheets live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(dir: &Path, output: &str) -> Args {
    Args {
        elements: dir.join("elements.csv").to_string_lossy().to_string(),
        connections: dir.join("connections.csv").to_string_lossy().to_string(),
        output: output.to_string(),
        format: Format::Svg,
        highlight: None,
        info: None,
        config: None,
        log_level: "off".to_string(),
        refresh_secs: None,
    }
}

#[test]
fn e2e_smoke_test_demo_svg() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("map.svg");

    let mut args = args(&demos_path(), &output.to_string_lossy());
    args.highlight = Some("Lazarus Group".to_string());
    args.info = Some("WannaCry".to_string());

    run(&args).expect("Demo sheets should render");

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Bangladesh Bank"));
    assert!(svg.contains("data-layer=\"highlighted-edge\""));
}

#[test]
fn e2e_smoke_test_demo_json() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("map.json");

    let mut args = args(&demos_path(), &output.to_string_lossy());
    args.format = Format::Json;
    // Search entries resolve AKA forms too
    args.highlight = Some("APT38 (AKA: BlueNoroff)".to_string());

    run(&args).expect("Demo sheets should render");

    let json = fs::read_to_string(&output).unwrap();
    assert!(json.contains("\"selected\": \"APT38\""));
    assert!(json.contains("\"search_options\""));
}

#[test]
fn e2e_smoke_test_bad_rows_tolerated() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("errors.svg");

    let args = args(&demos_path().join("errors"), &output.to_string_lossy());
    run(&args).expect("Bad rows are skipped by default");
    assert!(output.exists());
}

#[test]
fn e2e_smoke_test_strict_mode_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("errors.svg");
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[data]\nstrict = true\n").unwrap();

    let mut args = args(&demos_path().join("errors"), &output.to_string_lossy());
    args.config = Some(config.to_string_lossy().to_string());

    match run(&args) {
        Err(RelmapError::Parse { err, .. }) => assert_eq!(err.diagnostics().len(), 2),
        other => panic!("Expected strict mode to reject the sheets, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn e2e_smoke_test_missing_sheet() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("out.svg");

    let args = args(temp_dir.path(), &output.to_string_lossy());
    assert!(matches!(run(&args), Err(RelmapError::Io(_))));
}
