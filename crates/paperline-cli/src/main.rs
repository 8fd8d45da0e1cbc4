//! paperline CLI: Command-line interface for the AI paper timeline

use clap::{Parser, Subcommand};
use paperline_engine::{
    format_cursor_date, reading_list, write_export, Catalog, Config, ExportFormat, ItemSource,
    LayoutEngine, OrderingMode,
};
use paperline_tui::App;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Scroll through foundational AI papers and the events around them
#[derive(Parser)]
#[command(name = "paperline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog JSON file (defaults to the builtin reading list)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui {
        /// Ordering mode for this session (chronological or curated)
        #[arg(long)]
        mode: Option<OrderingMode>,

        /// Use the high-contrast color theme
        #[arg(long)]
        high_contrast: bool,
    },

    /// Print items in mode order
    List {
        /// Ordering mode (defaults to the saved preference)
        #[arg(long)]
        mode: Option<OrderingMode>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print computed offsets, durations, and excluded items
    Layout {
        /// Ordering mode (defaults to the saved preference)
        #[arg(long)]
        mode: Option<OrderingMode>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the curated reading list
    Export {
        /// Write JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Initialize .paperline/ directory and config
    Init,
}

const PAPERLINE_DIR: &str = ".paperline";

/// Environment variable naming the TUI log file.
const LOG_ENV: &str = "PAPERLINE_LOG";

fn main() {
    let cli = Cli::parse();
    let is_tui = matches!(cli.command, None | Some(Commands::Tui { .. }));
    init_logging(is_tui);

    let data = cli.data.as_deref();
    match cli.command {
        None => cmd_tui(data, None, false),
        Some(Commands::Tui {
            mode,
            high_contrast,
        }) => cmd_tui(data, mode, high_contrast),
        Some(Commands::List { mode, json }) => cmd_list(data, mode, json),
        Some(Commands::Layout { mode, json }) => cmd_layout(data, mode, json),
        Some(Commands::Export { json, csv }) => cmd_export(data, json, csv),
        Some(Commands::Init) => cmd_init(),
    }
}

/// Batch commands log to stderr; the TUI owns the terminal, so it logs to a
/// file only when `PAPERLINE_LOG` is set.
fn init_logging(tui: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if !tui {
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    }

    let Ok(path) = std::env::var(LOG_ENV) else {
        return;
    };
    match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let _ = fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(e) => eprintln!("Warning: cannot open log file {path}: {e}"),
    }
}

fn config_path() -> PathBuf {
    Path::new(PAPERLINE_DIR).join("config.json")
}

fn load_config() -> Config {
    match Config::load(&config_path()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load {}: {e}", config_path().display());
            std::process::exit(1);
        }
    }
}

fn load_catalog(data: Option<&Path>) -> Catalog {
    let result = match data {
        Some(path) => Catalog::from_path(path),
        None => Catalog::builtin(),
    };
    match result {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: failed to load catalog: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tui(data: Option<&Path>, mode: Option<OrderingMode>, high_contrast: bool) {
    let mut config = load_config();
    if let Some(mode) = mode {
        config.mode = mode;
    }
    let catalog = load_catalog(data);

    let mut app = match App::new(config, catalog) {
        Ok(app) => app.with_config_path(config_path()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(path) = data {
        app = app.with_data_path(path.to_path_buf());
    }
    if high_contrast {
        app = app.with_high_contrast();
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(paperline_tui::run_tui(app)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_list(data: Option<&Path>, mode: Option<OrderingMode>, json: bool) {
    let mode = mode.unwrap_or_else(|| load_config().mode);
    let items = load_catalog(data).list_items(mode);

    if json {
        match serde_json::to_string_pretty(&items) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{} items ({mode})\n", items.len());
    for item in &items {
        let rank = item.rank.map_or_else(|| "-".to_string(), |r| r.to_string());
        let date = item
            .date
            .map_or_else(|| "????-??-??".to_string(), |d| d.format("%Y-%m-%d").to_string());
        println!("{rank:>3}  {date}  {:<5}  {}", item.kind.to_string(), item.title);
    }
}

fn cmd_layout(data: Option<&Path>, mode: Option<OrderingMode>, json: bool) {
    let config = load_config();
    let mode = mode.unwrap_or(config.mode);
    let catalog = load_catalog(data);

    let mut engine = match LayoutEngine::new(config.layout) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let layout = engine.layout(&catalog.list_items(mode), mode);

    if json {
        match serde_json::to_string_pretty(&layout) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!(
        "{} placed, {} excluded, height {:.1} ({mode})\n",
        layout.placements.len(),
        layout.excluded.len(),
        layout.height
    );
    for placement in &layout.placements {
        let title = catalog
            .get(&placement.id)
            .map_or(placement.id.as_str(), |item| item.title.as_str());
        let date = placement
            .date
            .map(format_cursor_date)
            .unwrap_or_default();
        let duration = placement
            .duration
            .map(|d| format!("  [span {d:.1}]"))
            .unwrap_or_default();
        println!("{:>8.1}  {date:<8}  {title}{duration}", placement.offset);
    }

    if !layout.excluded.is_empty() {
        println!("\nExcluded:");
        for item in &layout.excluded {
            println!("  {} ({:?}): {}", item.id, item.reason, item.title);
        }
    }

    let markers = layout.year_markers();
    if !markers.is_empty() {
        println!("\nYears:");
        for marker in markers {
            println!("  {}  {:.1}", marker.year, marker.offset);
        }
    }
}

fn cmd_export(data: Option<&Path>, json: Option<PathBuf>, csv: Option<PathBuf>) {
    let items = reading_list(&load_catalog(data));

    // Without explicit targets, write both formats under output/
    let targets: Vec<(ExportFormat, PathBuf)> = if json.is_none() && csv.is_none() {
        let dir = Path::new("output");
        vec![
            (ExportFormat::Json, dir.join("papers.json")),
            (ExportFormat::Csv, dir.join("papers.csv")),
        ]
    } else {
        json.map(|p| (ExportFormat::Json, p))
            .into_iter()
            .chain(csv.map(|p| (ExportFormat::Csv, p)))
            .collect()
    };

    for (format, path) in targets {
        match write_export(&items, format, &path) {
            Ok(()) => println!("{} exported to {}", format.to_string().to_uppercase(), path.display()),
            Err(e) => {
                eprintln!("Error: failed to export {format}: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn cmd_init() {
    let dir = Path::new(PAPERLINE_DIR);
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Failed to create {}: {e}", dir.display());
        std::process::exit(1);
    }

    let config_path = config_path();
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    match Config::default().save(&config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }
}
