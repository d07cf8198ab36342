//! Conceptcraft - A terminal Mermaid diagram studio.
//!
//! # Usage
//!
//! ```bash
//! conceptcraft
//! conceptcraft --watch flow.mmd
//! conceptcraft --theme forest --export png --out build flow.mmd
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use conceptcraft::app::App;
use conceptcraft::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use conceptcraft::coordinator::{RenderCommit, RenderCoordinator};
use conceptcraft::export::{self, DirectorySink, ExportFormat};
use conceptcraft::perf;
use conceptcraft::renderer::MermaidRenderer;
use conceptcraft::surface::DisplaySurface;
use conceptcraft::view_state::{FontFamily, ThemeName, ViewState};

const HEADLESS_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// A terminal Mermaid diagram studio with live preview and SVG/PNG export
#[derive(Parser, Debug)]
#[command(name = "conceptcraft", version, about, long_about = None)]
struct Cli {
    /// Mermaid source file (the sample diagram is used when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Diagram theme
    #[arg(long, value_enum)]
    theme: Option<ThemeName>,

    /// Font size in pixels (clamped to 8-30)
    #[arg(long, value_name = "PX", allow_negative_numbers = true)]
    font_size: Option<i64>,

    /// Font family
    #[arg(long, value_enum)]
    font_family: Option<FontFamily>,

    /// Edge color (#hex, rgb()/rgba(), hsl()/hsla() or a CSS color name)
    #[arg(long, value_name = "COLOR")]
    line_color: Option<String>,

    /// Control panel width as a percentage of the terminal (10-50)
    #[arg(long, value_name = "PERCENT")]
    panel_width: Option<u16>,

    /// Render without the UI and write the diagram in this format
    #[arg(long, value_enum, value_name = "FORMAT")]
    export: Option<ExportFormat>,

    /// Directory exported files are written to
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Watch FILE for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Force preview rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Enable performance timing output
    #[arg(long)]
    perf: bool,

    /// Write detailed render/export debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn read_source(file: Option<&Path>) -> Result<Option<String>> {
    let Some(path) = file else {
        return Ok(None);
    };
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(source))
}

fn run_headless(view: ViewState, format: ExportFormat, out_dir: &Path) -> Result<()> {
    let _scope = perf::scope("headless.total");
    let mut view = view;
    let mut surface = DisplaySurface::new();
    let mut coordinator = RenderCoordinator::new(Arc::new(MermaidRenderer::new()));

    match coordinator
        .render_blocking(&mut view, &mut surface, HEADLESS_RENDER_TIMEOUT)
        .context("Render failed")?
    {
        RenderCommit::Rendered(_) => {}
        RenderCommit::Failed { message, .. } => anyhow::bail!("{message}"),
        RenderCommit::Stale(_) => anyhow::bail!("Render was superseded"),
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = export::export(&surface, format, &DirectorySink::new(out_dir))
        .map_err(|err| anyhow::anyhow!("Error downloading diagram: {err}"))?;
    println!("{}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
        eprintln!("Cleared saved defaults in {}", global_path.display());
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
        eprintln!("Saved defaults to {}", global_path.display());
    }
    if (cli.save || cli.clear) && cli.file.is_none() && cli.export.is_none() {
        return Ok(());
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("CONCEPTCRAFT_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let mut view = ViewState::new();
    for warning in effective.apply_to(&mut view) {
        eprintln!("[warn] {warning}");
    }
    if let Some(source) = read_source(cli.file.as_deref())? {
        view.set_diagram_source(source);
    }
    let out_dir = effective.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    if let Some(format) = cli.export {
        return run_headless(view, format, &out_dir);
    }

    // Run the application
    let mut app = App::new(view)
        .with_file(cli.file)
        .with_out_dir(out_dir)
        .with_watch(effective.watch)
        .with_force_half_cell(effective.force_half_cell)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
