#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use theme_layout::config::EditorConfig;
use theme_layout::editor::CanvasEditor;
use theme_layout::events::EditorEvent;
use theme_layout::interaction::PointerTarget;
use theme_layout::sample::sample_theme;
use theme_layout::snapping::{self, SnapContext};
use theme_layout::types::{ElementBounds, ElementId, Point, Rect, ResizeHandle};

/// Theme canvas layout and snap-assist diagnostics
#[derive(Parser, Debug)]
#[command(name = "theme-layout")]
#[command(version)]
#[command(about = "Layout and snapping engine for presentation theme canvases")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a drag, a resize and a height report against the sample theme
    Demo,

    /// Snap a drag candidate (percent) against the sample theme
    Snap {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        /// Snap threshold in percent (defaults to the configured one)
        #[arg(long)]
        threshold: Option<f64>,
        /// Treat the candidate as a flow element (no vertical snapping)
        #[arg(long)]
        flow: bool,
    },

    /// Print the config path and the effective settings
    Config,
}

fn init_logging(config: &EditorConfig) -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| config.log_level.clone())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = EditorConfig::load().context("Failed to load editor config")?;
    init_logging(&config)?;

    match args.command {
        Command::Demo => run_demo(config),
        Command::Snap {
            x,
            y,
            width,
            height,
            threshold,
            flow,
        } => run_snap(&config, Rect::new(x, y, width, height), threshold, flow),
        Command::Config => {
            let output = json!({
                "path": EditorConfig::path(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}

fn run_demo(config: EditorConfig) -> Result<()> {
    let mut editor = CanvasEditor::new(sample_theme(), config, Vec::<EditorEvent>::new());
    let viewport = *editor.viewport();
    let px = |x: f64, y: f64| {
        Point::new(
            x * viewport.render.width / 100.0,
            y * viewport.render.height / 100.0,
        )
    };

    // Drag the title down; the slight horizontal drift snaps back to center
    let start = Instant::now();
    editor.pointer_down(ElementId(2), PointerTarget::Body, px(50.0, 10.0))?;
    editor.pointer_move(px(50.3, 12.0), start);
    editor.pointer_move(px(50.4, 14.0), start + Duration::from_millis(20));
    editor.pointer_up(px(50.4, 14.0));

    // Stretch the footer to the right edge
    editor.pointer_down(
        ElementId(6),
        PointerTarget::Handle(ResizeHandle::Right),
        px(55.0, 94.0),
    )?;
    editor.pointer_up(px(99.6, 94.0));

    // Verse text measured by the renderer
    editor.on_height_measured(ElementId(3), 24.0);

    info!(events = editor.sink().len(), "Demo finished");
    let output = json!({
        "elements": editor.elements(),
        "layout": editor.layout(),
        "events": editor.sink(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_snap(config: &EditorConfig, candidate: Rect, threshold: Option<f64>, flow: bool) -> Result<()> {
    let layout = theme_layout::layout::resolve(&sample_theme(), &Default::default());
    let others: Vec<ElementBounds> = layout
        .iter()
        .map(|e| ElementBounds::new(e.id, e.visual_bounds()))
        .collect();
    // id 0 is never used by the sample theme
    let ctx = SnapContext::new(
        ElementId(0),
        threshold.unwrap_or(config.snap_threshold),
        &others,
    );
    let result = snapping::snap_drag(candidate, &ctx, flow);
    info!(guides = result.guides.len(), "Snap evaluated");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
