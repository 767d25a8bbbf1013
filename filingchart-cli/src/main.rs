//! filingchart CLI: inspect marker tables and tooltips without a display.
//!
//! Commands:
//! - `markers`: resolved marker table per ticker (date, category, anchor)
//! - `tooltip`: tooltip lines and placement for one date, via a headless chart
//! - `config`: print the effective (or default) overlay configuration

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use filingchart_core::coords::Size;
use filingchart_core::domain::sort_bars;
use filingchart_core::host::MountOutcome;
use filingchart_core::source::{EventSource, FileSource, Lookback, PriceSource};
use filingchart_core::viewport::Modality;
use filingchart_core::{ChartHost, ChartInputs, MarkerTable, MemoryEngine, OverlayConfig};

#[derive(Parser)]
#[command(
    name = "filingchart",
    about = "filingchart CLI: filing markers and tooltips over price history"
)]
struct Cli {
    /// Overlay config file (TOML). Missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of <TICKER>/prices.{json,csv} and <TICKER>/events.json.
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Ticker(s) to inspect. Defaults to every ticker in the data directory.
    #[arg(long = "ticker", short, global = true)]
    tickers: Vec<String>,

    /// Price lookback: 1mo, 3mo, 6mo, 1y, 2y or 5y.
    #[arg(long, global = true, default_value = "1y")]
    period: Lookback,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved marker table.
    Markers {
        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Pin the tooltip on a date and print its lines and placement.
    Tooltip {
        /// Marker date (YYYY-MM-DD).
        #[arg(long)]
        date: String,

        /// Viewport width in pixels.
        #[arg(long, default_value_t = 1280.0)]
        width: f64,

        /// Viewport height in pixels.
        #[arg(long, default_value_t = 900.0)]
        height: f64,

        /// Use the touch layout (docked tooltip).
        #[arg(long, default_value_t = false)]
        touch: bool,

        /// Emit JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the overlay configuration as TOML.
    Config {
        /// Print built-in defaults, ignoring --config.
        #[arg(long, default_value_t = false)]
        print_default: bool,
    },
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_env("FILINGCHART_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::Markers { json } => run_markers(&cli, *json),
        Commands::Tooltip {
            date,
            width,
            height,
            touch,
            json,
        } => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{date}' (expected YYYY-MM-DD)"))?;
            run_tooltip(&cli, config, date, Size::new(*width, *height), *touch, *json)
        }
        Commands::Config { print_default } => {
            let shown = if *print_default {
                OverlayConfig::default()
            } else {
                config
            };
            print!("{}", shown.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<OverlayConfig> {
    match path {
        Some(path) => OverlayConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(OverlayConfig::default()),
    }
}

fn load_inputs(cli: &Cli) -> Result<Vec<ChartInputs>> {
    let source = FileSource::new(&cli.data_dir);
    let tickers = if cli.tickers.is_empty() {
        source
            .tickers()
            .with_context(|| format!("Failed to list tickers in {}", cli.data_dir.display()))?
    } else {
        cli.tickers.iter().map(|t| t.trim().to_uppercase()).collect()
    };
    if tickers.is_empty() {
        bail!("No tickers found in {}", cli.data_dir.display());
    }

    let mut inputs = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let bars = source
            .prices(&ticker, cli.period)
            .with_context(|| format!("Failed to load prices for {ticker}"))?;
        let events = source
            .events(&ticker)
            .with_context(|| format!("Failed to load events for {ticker}"))?;
        debug!(%ticker, bars = bars.len(), events = events.len(), "loaded");
        inputs.push(ChartInputs::new(ticker, bars, events));
    }
    Ok(inputs)
}

fn run_markers(cli: &Cli, json: bool) -> Result<()> {
    let mut out = serde_json::Map::new();
    for inputs in load_inputs(cli)? {
        let bars = sort_bars(&inputs.bars);
        let table = MarkerTable::resolve(&bars, &inputs.events);
        let dropped = inputs.events.len() - table.event_count();

        if json {
            out.insert(inputs.ticker.clone(), serde_json::to_value(table.entries())?);
            continue;
        }

        println!(
            "{}: {} bars, {} events, {} markers ({} events off the price series)",
            inputs.ticker,
            bars.len(),
            inputs.events.len(),
            table.len(),
            dropped
        );
        if bars.is_empty() {
            println!("  no price data");
            continue;
        }
        println!(
            "  {:<12} {:<20} {:>10} {:>7}  {}",
            "date", "category", "anchor", "events", "forms"
        );
        for entry in table.entries() {
            let events = table.events_on(entry.date);
            let forms: Vec<&str> = events.iter().map(|e| e.form_type.as_str()).collect();
            println!(
                "  {:<12} {:<20} {:>10.2} {:>7}  {}",
                entry.date.to_string(),
                entry.category.label(),
                entry.price_anchor,
                events.len(),
                forms.join(", ")
            );
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    Ok(())
}

fn run_tooltip(
    cli: &Cli,
    config: OverlayConfig,
    date: NaiveDate,
    viewport: Size,
    touch: bool,
    json: bool,
) -> Result<()> {
    let all = load_inputs(cli)?;
    if all.len() > 1 {
        warn!(tickers = all.len(), "several tickers loaded, using the first");
    }
    let Some(inputs) = all.into_iter().next() else {
        bail!("No ticker to chart");
    };
    let ticker = inputs.ticker.clone();

    let mut host: ChartHost<MemoryEngine> = ChartHost::new(config);
    if touch {
        host.force_modality(Some(Modality::Touch));
    }
    let container = host.resize(viewport);
    let min_spacing = host.config().viewport.min_bar_spacing;
    let outcome = host
        .mount(inputs, container, Instant::now(), |size| {
            Ok(MemoryEngine::new(size)
                .settles_on_fit(true)
                .with_min_spacing(min_spacing))
        })
        .with_context(|| format!("Failed to build chart for {ticker}"))?;
    if outcome == MountOutcome::Empty {
        bail!("{ticker} has no price data");
    }

    if let Some(engine) = host.engine_mut() {
        engine.click_date(date);
    }
    host.pump();

    let Some(view) = host.tooltip_view() else {
        bail!("{ticker} has no visible marker on {date}");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let r = view.placement.rect;
    println!(
        "{ticker} {date} ({} events) at x={:.0} y={:.0} {}x{}{}{}",
        view.content.len(),
        r.x,
        r.y,
        r.width,
        r.height,
        if view.placement.docked { " docked" } else { "" },
        if view.placement.scrollable { " scrollable" } else { "" },
    );
    for line in &view.content.lines {
        println!(
            "  [{}] {:<6} {} - {}",
            line.color.to_hex(),
            line.form_label,
            line.description,
            line.headline
        );
        if !line.document_url.is_empty() {
            println!("         {}", line.document_url);
        }
    }
    Ok(())
}
