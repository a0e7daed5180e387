/// Hypertower - build and view hyperboloid lattice towers in the terminal
///
/// Controls in the viewer:
///   - WASD / Arrow Keys: Orbit the tower
///   - Z/X: Zoom, F: Reframe
///   - Tab / Shift-Tab: Select a parameter, +/-: Adjust it
///   - V: Wireframe / solid, Space: Toggle spin
///   - Q/ESC: Quit

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hypertower_core::{build_tower, mesh::tower_mesh, stl, TowerGeometry, TowerSpec};
use hypertower_terminal::{SpecArgs, TerminalApp};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

#[derive(Parser)]
#[command(name = "hypertower")]
#[command(about = "Hyperboloid lattice tower generator and terminal viewer", long_about = None)]
struct Cli {
    #[command(flatten)]
    spec: SpecArgs,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive viewer
    View,
    /// Print sections, waist and element counts
    Info {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the tower mesh as STL
    Export {
        /// Output .stl file
        output: PathBuf,
        /// Write ASCII STL instead of binary
        #[arg(long)]
        ascii: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let spec = cli.spec.resolve().context("invalid tower parameters")?;
    tracing::debug!(?spec, "resolved tower spec");

    match cli.command.unwrap_or(Commands::View) {
        Commands::View => {
            let mut app = TerminalApp::new(spec)?;
            app.run()?;
        }
        Commands::Info { json } => show_info(&spec, json)?,
        Commands::Export { output, ascii } => export(&spec, &output, ascii)?,
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let writer = match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(writer)
        .init();
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SectionSummary {
    index: usize,
    bottom_height: f64,
    top_height: f64,
    bottom_radius: f64,
    top_radius: f64,
    twist_degrees: f64,
    waist_position: f64,
    waist_radius: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TowerSummary {
    spec: TowerSpec,
    struts: usize,
    rings: usize,
    waist_position: f64,
    waist_radius: f64,
    sections: Vec<SectionSummary>,
}

impl TowerSummary {
    fn new(spec: &TowerSpec, geometry: &TowerGeometry) -> Self {
        Self {
            spec: *spec,
            struts: geometry.struts.len(),
            rings: geometry.rings.len(),
            waist_position: geometry.waist.position,
            waist_radius: geometry.waist.radius,
            sections: geometry
                .sections
                .iter()
                .map(|section| {
                    let waist = section.waist();
                    SectionSummary {
                        index: section.index,
                        bottom_height: section.bottom_height,
                        top_height: section.top_height,
                        bottom_radius: section.bottom_radius,
                        top_radius: section.top_radius,
                        twist_degrees: section.twist_radians.to_degrees(),
                        waist_position: waist.position,
                        waist_radius: waist.radius,
                    }
                })
                .collect(),
        }
    }
}

fn show_info(spec: &TowerSpec, json: bool) -> Result<()> {
    let geometry = build_tower(spec);
    let summary = TowerSummary::new(spec, &geometry);
    let mut out = io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Tower: height {:.2}, radius {:.2} -> {:.2}", spec.height, spec.base_radius, spec.top_radius)?;
    writeln!(
        out,
        "Waist: r = {:.3} at {:.3} ({})",
        summary.waist_radius,
        summary.waist_position,
        if spec.waist.is_auto() { "auto" } else { "manual" }
    )?;
    writeln!(out, "Struts: {}  Rings: {}", summary.struts, summary.rings)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:>3} {:>9} {:>9} {:>9} {:>9} {:>8} {:>9}",
        "#", "bottom", "top", "r0", "r1", "twist", "waist r"
    )?;
    for s in &summary.sections {
        writeln!(
            out,
            "{:>3} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>8.1} {:>9.2}",
            s.index, s.bottom_height, s.top_height, s.bottom_radius, s.top_radius, s.twist_degrees, s.waist_radius
        )?;
    }
    Ok(())
}

fn export(spec: &TowerSpec, output: &Path, ascii: bool) -> Result<()> {
    let geometry = build_tower(spec);
    let mesh = tower_mesh(&geometry, spec.strut_radius);

    let file = File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    if ascii {
        stl::write_ascii_stl(&mesh, "hypertower", &mut writer)?;
    } else {
        stl::write_binary_stl(&mesh, &mut writer)?;
    }
    writer.flush()?;

    println!("Exported {} triangles to {}", mesh.triangles.len(), output.display());
    Ok(())
}
