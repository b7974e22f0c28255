#![deny(unsafe_code)]
//! CLI binary for evenflow streamline placement.
//!
//! Subcommands:
//! - `place <field>`: sample a field onto a grid, place streamlines, write JSON
//! - `list`: print available fields and their parameters

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use evenflow_core::TraceConfig;
use evenflow_scene::export::Export;
use evenflow_scene::{FieldKind, GridSpec, Scene};
use glam::DVec2;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "evenflow", about = "Evenly spaced streamline placement")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Place evenly spaced streamlines over a sampled field and write JSON.
    Place(PlaceArgs),
    /// List available fields and their parameters.
    List,
}

/// Arguments of `place`. Flags override values read from `--config`.
#[derive(Args)]
struct PlaceArgs {
    /// Field name (e.g. "vortex").
    field: String,

    /// JSON settings file with grid keys (`min`, `max`, `nx`, `ny`) and
    /// trace keys (`step_size`, `separation_distance`, `initial_seed`, ...).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lower-left grid corner as "x,y" [default: 0,0].
    #[arg(long)]
    min: Option<String>,

    /// Upper-right grid corner as "x,y" [default: 10,10].
    #[arg(long)]
    max: Option<String>,

    /// Cells along x [default: 20].
    #[arg(long)]
    nx: Option<usize>,

    /// Cells along y [default: 20].
    #[arg(long)]
    ny: Option<usize>,

    /// Integration step length [default: 0.1].
    #[arg(long)]
    step_size: Option<f64>,

    /// Step cap per direction [default: 1000].
    #[arg(long)]
    max_steps: Option<usize>,

    /// Separation between streamlines (d_sep) [default: 0.8].
    #[arg(short, long)]
    separation: Option<f64>,

    /// Distance a growing streamline keeps from others (d_test).
    /// Defaults to half the separation.
    #[arg(long)]
    self_avoidance: Option<f64>,

    /// First seed as "x,y". Defaults to three quarters across the middle row.
    #[arg(long)]
    seed: Option<String>,

    /// Stop after this many streamlines.
    #[arg(long)]
    max_streamlines: Option<usize>,

    /// Include accepted candidate seeds in the output.
    #[arg(long)]
    record_candidates: bool,

    /// Skip singularity detection.
    #[arg(long)]
    no_singularities: bool,

    /// Output file path.
    #[arg(short, long, default_value = "streamlines.json")]
    output: PathBuf,

    /// Field parameters as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,
}

impl PlaceArgs {
    /// Reads the `--config` file, or an empty object without one.
    fn settings(&self) -> Result<Value, CliError> {
        let Some(path) = &self.config else {
            return Ok(Value::Object(Map::new()));
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::Input(format!("cannot read --config {}: {e}", path.display()))
        })?;
        let settings: Value = serde_json::from_str(&text)
            .map_err(|e| CliError::Input(format!("invalid --config JSON: {e}")))?;
        if !settings.is_object() {
            return Err(CliError::Input("--config must hold a JSON object".into()));
        }
        Ok(settings)
    }

    /// Field parameters, with `--no-singularities` folded in.
    fn field_params(&self) -> Result<Value, CliError> {
        let mut params: Value = serde_json::from_str(&self.params)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
        let Some(obj) = params.as_object_mut() else {
            return Err(CliError::Input(format!(
                "--params must be a JSON object, got '{}'",
                self.params
            )));
        };
        if self.no_singularities {
            obj.insert("locate_singularities".into(), false.into());
        }
        Ok(params)
    }

    fn grid(&self, settings: &Value) -> Result<GridSpec, CliError> {
        let mut grid = GridSpec::from_json(settings);
        if let Some(text) = &self.min {
            grid.min = parse_point("min", text)?;
        }
        if let Some(text) = &self.max {
            grid.max = parse_point("max", text)?;
        }
        grid.nx = self.nx.unwrap_or(grid.nx);
        grid.ny = self.ny.unwrap_or(grid.ny);
        Ok(grid)
    }

    /// A separation given without a d_test, in the file or on the command
    /// line, sets d_test to half of it.
    fn trace_config(&self, settings: &Value, grid: &GridSpec) -> Result<TraceConfig, CliError> {
        let mut config = TraceConfig::from_json(settings);
        if settings.get("self_avoidance_distance").is_none() {
            let d = config.separation_distance;
            config = config.with_separation(d);
        }
        if let Some(d) = self.separation {
            config = config.with_separation(d);
        }
        if let Some(d) = self.self_avoidance {
            config.self_avoidance_distance = d;
        }
        config.step_size = self.step_size.unwrap_or(config.step_size);
        config.max_steps = self.max_steps.unwrap_or(config.max_steps);
        config.initial_seed = match &self.seed {
            Some(text) => parse_point("seed", text)?,
            None if settings.get("initial_seed").is_some() => config.initial_seed,
            None => DVec2::new(
                grid.min.x + 0.75 * (grid.max.x - grid.min.x),
                (grid.min.y + grid.max.y) / 2.0,
            ),
        };
        if self.max_streamlines.is_some() {
            config.max_streamlines = self.max_streamlines;
        }
        config.record_candidates |= self.record_candidates;
        Ok(config)
    }
}

/// Parses "x,y" into a point.
fn parse_point(arg: &str, text: &str) -> Result<DVec2, CliError> {
    let invalid = || CliError::Input(format!("invalid --{arg} '{text}': expected \"x,y\""));
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    Ok(DVec2::new(x, y))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let fields = FieldKind::list_fields();
            if cli.json {
                let schemas: Map<String, Value> = fields
                    .iter()
                    .filter_map(|name| {
                        let kind = FieldKind::from_name(name).ok()?;
                        Some((name.to_string(), kind.param_schema()))
                    })
                    .collect();
                let info = serde_json::json!({ "fields": schemas });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Fields:");
                for name in fields {
                    let kind = FieldKind::from_name(name)?;
                    let params = kind
                        .param_schema()
                        .as_object()
                        .map(|o| o.keys().cloned().collect::<Vec<_>>().join(", "))
                        .unwrap_or_default();
                    println!("  {name:<8} ({params})");
                }
            }
        }
        Command::Place(args) => {
            let settings = args.settings()?;
            let params = args.field_params()?;
            let grid = args.grid(&settings)?;
            let config = args.trace_config(&settings, &grid)?;
            let (field, output) = (&args.field, &args.output);

            let scene = Scene::build(field, grid, &params)?;
            let placed = scene.place(config.clone())?;
            Export::new(scene.kind.name(), &config, &placed).write_json(output)?;

            if cli.json {
                let info = serde_json::json!({
                    "field": scene.kind.name(),
                    "vertices": scene.mesh.vertex_count(),
                    "cells": scene.mesh.cell_count(),
                    "singularities": scene.singularity_count(),
                    "streamlines": placed.streamlines.len(),
                    "segments": placed.segment_count(),
                    "total_length": placed.total_length(),
                    "stats": placed.stats,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "placed {} streamlines over {field} ({}x{}, d_sep {}) -> {}",
                    placed.streamlines.len(),
                    grid.nx,
                    grid.ny,
                    config.separation_distance,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({
                "error": e.to_string(),
                "kind": e.kind(),
                "exit_code": e.exit_code(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
