// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Outline editor: the interactive core of a glyph outline editor
//!
//! Contours of corner, smooth and off-curve points are edited with pointer
//! driven tools (select, pen, ruler, knife) on a zoomable canvas, with
//! snapshot undo. Painting, windows and font files belong to the host.

use anyhow::Context;
use std::path::PathBuf;

pub mod editing;
pub mod error;
pub mod model;
pub mod path;
pub mod replay;
pub mod settings;
pub mod tools;

pub use editing::{EditSession, Editor};
pub use error::{EditError, Result};
pub use model::Glyph;

use model::{GlyphSnapshot, SnapshotScope};
use settings::Settings;

const USAGE: &str = "Usage: outline-editor <glyph.json> <script.json> [--settings <settings.toml>]";

/// Command-line arguments of the replay tool
#[derive(Debug, Clone, PartialEq)]
struct Args {
    glyph: PathBuf,
    script: PathBuf,
    settings: Option<PathBuf>,
}

/// Entry point for the replay tool: load a glyph, run a script, print the
/// resulting glyph snapshot to stdout
pub fn run() -> anyhow::Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("outline_editor=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let glyph_bytes = std::fs::read(&args.glyph)
        .with_context(|| format!("Failed to read glyph {:?}", args.glyph))?;
    let glyph = GlyphSnapshot::from_bytes(&glyph_bytes)
        .with_context(|| format!("Failed to parse glyph {:?}", args.glyph))?
        .to_glyph();

    let script_text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {:?}", args.script))?;
    let script = replay::Script::from_json(&script_text)
        .with_context(|| format!("Failed to parse script {:?}", args.script))?;

    let mut editor = Editor::new(settings);
    editor.open(glyph);
    let summary = replay::replay(&mut editor, &script);
    tracing::info!(
        "Replayed {} events ({} failed)",
        summary.events,
        summary.failed
    );

    let glyph = editor.close().context("No glyph open after replay")?;
    let bytes = GlyphSnapshot::capture(&glyph, SnapshotScope::ALL).to_bytes()?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut settings = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--settings" {
            let path = args.next().context("--settings needs a path")?;
            settings = Some(PathBuf::from(path));
        } else {
            positional.push(PathBuf::from(arg));
        }
    }
    let [glyph, script]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!(USAGE))?;
    Ok(Args {
        glyph,
        script,
        settings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_positional_and_settings() {
        let args = parse_args(strings(&["g.json", "--settings", "s.toml", "s.json"])).unwrap();
        assert_eq!(args.glyph, PathBuf::from("g.json"));
        assert_eq!(args.script, PathBuf::from("s.json"));
        assert_eq!(args.settings, Some(PathBuf::from("s.toml")));
    }

    #[test]
    fn missing_arguments_print_usage() {
        let err = parse_args(strings(&["g.json"])).unwrap_err();
        assert!(err.to_string().starts_with("Usage"));
        assert!(parse_args(strings(&["a", "b", "--settings"])).is_err());
    }
}
