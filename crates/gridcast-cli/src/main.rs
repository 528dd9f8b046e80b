// gridcast entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (stderr, or a file with --log-file)
// 3. Copy default config files, load config
// 4. Load projections
// 5. Compute valuations
// 6. Print results to stdout

mod present;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use gridcast_core::config;
use gridcast_core::player::Position;
use gridcast_core::report;
use gridcast_core::valuation;
use tracing::info;

use present::{OutputFormat, SortKey, View};

#[derive(Parser, Debug)]
#[command(name = "gridcast")]
#[command(about = "Fantasy football auction values from season projections")]
#[command(version)]
struct Cli {
    /// Projection CSV. Defaults to `data_paths.projections` in league.toml.
    projections: Option<PathBuf>,

    /// Directory holding config/ (and defaults/ to seed it from).
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Only show one position (QB, RB, WR, TE).
    #[arg(long, value_parser = present::parse_position)]
    position: Option<Position>,

    #[arg(long, value_enum, default_value_t = SortKey::Points)]
    sort: SortKey,

    /// Show at most N players.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Print slot counts, baselines and price factors before the table.
    #[arg(long)]
    summary: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing(cli.log_file.as_deref())?;

    // 3. Load config
    let copied = config::ensure_config_files(&cli.base_dir)
        .context("failed to prepare config directory")?;
    for path in &copied {
        info!("Created {} from defaults", path.display());
    }
    let config = config::load_config_from(&cli.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, ${} per team",
        config.league.name, config.league.num_teams, config.league.team_budget
    );

    // 4. Load projections
    let mut pool = match &cli.projections {
        Some(path) => valuation::projections::load_projections(path, &config.data),
        None => valuation::projections::load_all(&config, &cli.base_dir),
    }
    .context("failed to load projections")?;

    // 5. Compute valuations
    let run = valuation::compute_valuations(&mut pool, &config.league, &config.scoring)
        .context("failed to compute valuations")?;

    // 6. Print results
    let view = View {
        position: cli.position,
        sort: cli.sort,
        limit: cli.limit,
    };
    let mut built = report::build_report(&pool, &config.league, &run);
    built.records = present::select(std::mem::take(&mut built.records), &view);

    let mut out = String::new();
    match cli.format {
        OutputFormat::Json => {
            out = built.to_json_pretty().context("failed to serialize report")?;
            out.push('\n');
        }
        OutputFormat::Tsv => out.push_str(&present::render_tsv(&built.records)),
        OutputFormat::Table => {
            if cli.summary {
                out.push_str(&present::render_summary(&built.summary));
                out.push('\n');
            }
            out.push_str(&present::render_table(&built.records, &built.budget));
        }
    }

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(out.as_bytes())
        .context("failed to write output")?;

    Ok(())
}

/// Initialize tracing. Logs go to stderr so stdout carries only results,
/// or to `log_file` when one is given.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gridcast=info,warn"));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
        None => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
    }

    Ok(())
}
