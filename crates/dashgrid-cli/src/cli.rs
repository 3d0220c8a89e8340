use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dashgrid_layout::invariants::check;
use dashgrid_layout::{
    CompactionReport, Compactor, DEFAULT_MAX_ITERATIONS, InvariantSeverity, Layout, LayoutError,
    compact,
};
use dashgrid_store::{
    DEFAULT_NAMESPACE, Dashboard, DashboardConfig, JsonFileStore, LayoutStore, StoreKey,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CliError, Result};
use crate::input::{emit, read_layout, read_placements};
use crate::logging::{self, LogFormat};
use crate::presets::{DEFAULT_COLUMNS, TRADING_CARDS, trading_placements};
use crate::render::render;

#[derive(Debug, Parser)]
#[command(
    name = "dashgrid",
    about = "Compact, check, and edit dashboard card layouts",
    version
)]
pub struct Cli {
    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log filter directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compact a layout and print the result as JSON.
    Compact(CompactArgs),

    /// Report every packing invariant a layout breaks.
    Check(LayoutArgs),

    /// Draw a layout as an ASCII grid.
    Render(RenderArgs),

    /// Edit a persisted dashboard.
    Dashboard(DashboardArgs),
}

#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Grid column count.
    #[arg(long, short)]
    pub columns: u16,

    /// Layout JSON file, or `-` for stdin.
    #[arg(long, short, default_value = "-")]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct CompactArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Write the result here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Cap on compaction passes.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Wrap the output as `{"layout": ..., "report": ...}`.
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Compact before drawing.
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DashboardArgs {
    /// Directory holding one JSON snapshot per dashboard.
    #[arg(long)]
    pub store_dir: PathBuf,

    #[arg(long, default_value = "main")]
    pub name: String,

    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Column count; defaults to the saved one, else 3.
    #[arg(long)]
    pub columns: Option<u16>,

    /// Placement table JSON; defaults to the built-in trading cards.
    #[arg(long)]
    pub placements: Option<PathBuf>,

    #[command(subcommand)]
    pub action: DashboardAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DashboardAction {
    /// Print the current layout.
    Show,

    /// Show or hide a card.
    Toggle { id: String, state: Switch },

    /// Drop a card at a new position.
    #[command(allow_negative_numbers = true)]
    Move { id: String, x: i32, y: i32 },

    /// Resize a card.
    Resize { id: String, w: i32, h: i32 },

    /// Change the column count.
    Columns { columns: u16 },

    /// Restore default placements for the visible cards.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Serialize)]
struct CompactOutput<'a> {
    layout: &'a Layout,
    report: CompactionReport,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format, &cli.log_level)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Compact(args) => run_compact(args, out),
        Commands::Check(args) => run_check(args, out),
        Commands::Render(args) => run_render(args, out),
        Commands::Dashboard(args) => run_dashboard(args, out),
    }
}

fn run_compact(args: CompactArgs, out: &mut dyn Write) -> Result<()> {
    let layout = read_layout(&args.layout.input)?;
    let compaction = Compactor::new()
        .with_max_iterations(args.max_iterations)
        .run(&layout, args.layout.columns)?;
    info!(
        items = compaction.layout.len(),
        iterations = compaction.report.iterations,
        converged = compaction.report.converged,
        moved = compaction.report.moved,
        "compacted layout"
    );
    let mut json = if args.report {
        serde_json::to_string_pretty(&CompactOutput {
            layout: &compaction.layout,
            report: compaction.report,
        })?
    } else {
        serde_json::to_string_pretty(&compaction.layout)?
    };
    json.push('\n');
    emit(args.output.as_ref(), out, &json)
}

fn run_check(args: LayoutArgs, out: &mut dyn Write) -> Result<()> {
    let layout = read_layout(&args.input)?;
    let report = check(&layout, args.columns);
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    out.write_all(json.as_bytes())?;
    if report.has_errors() {
        let errors = report
            .issues
            .iter()
            .filter(|issue| issue.severity == InvariantSeverity::Error)
            .count();
        return Err(CliError::exit(
            2,
            format!("layout breaks {errors} invariant(s)"),
        ));
    }
    Ok(())
}

fn run_render(args: RenderArgs, out: &mut dyn Write) -> Result<()> {
    let columns = args.layout.columns;
    if columns == 0 {
        return Err(LayoutError::ZeroColumns.into());
    }
    let mut layout = read_layout(&args.layout.input)?;
    if args.compact {
        layout = compact(&layout, columns)?;
    }
    out.write_all(render(&layout, columns).as_bytes())?;
    Ok(())
}

fn run_dashboard(args: DashboardArgs, out: &mut dyn Write) -> Result<()> {
    let key = StoreKey::new(args.namespace, args.name)?;
    let store = JsonFileStore::new(&args.store_dir);
    let columns = match args.columns {
        Some(columns) => columns,
        None => store
            .load(&key)?
            .map_or(DEFAULT_COLUMNS, |snapshot| snapshot.columns),
    };
    let config = match &args.placements {
        Some(path) => DashboardConfig::new(read_placements(path)?, columns),
        None => DashboardConfig::new(trading_placements(), columns).cards(TRADING_CARDS),
    };
    debug!(key = %key, columns, "opening dashboard");
    let mut dashboard = Dashboard::open(store, key, config)?;

    match args.action {
        DashboardAction::Show => {}
        DashboardAction::Toggle { id, state } => {
            if !dashboard.set_visible(&id, state == Switch::On)? {
                info!(id = %id, "card already in requested state");
            }
        }
        DashboardAction::Move { id, x, y } => dashboard.move_card(&id, x, y)?,
        DashboardAction::Resize { id, w, h } => {
            if w < 1 || h < 1 {
                return Err(CliError::invalid(format!(
                    "card size must be at least 1x1, got {w}x{h}"
                )));
            }
            dashboard.resize_card(&id, w, h)?;
        }
        DashboardAction::Columns { columns } => dashboard.set_columns(columns)?,
        DashboardAction::Reset => dashboard.reset()?,
    }

    out.write_all(render(dashboard.layout(), dashboard.columns()).as_bytes())?;
    let hidden: Vec<&str> = dashboard
        .cards()
        .iter()
        .map(String::as_str)
        .filter(|id| !dashboard.is_visible(id))
        .collect();
    if !hidden.is_empty() {
        writeln!(out, "hidden: {}", hidden.join(", "))?;
    }
    Ok(())
}
