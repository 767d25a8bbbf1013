//! filingchart TUI: annotated candlestick chart in the terminal.
//!
//! Layout (top to bottom):
//! 1. Title: ticker, company, bar and event counts
//! 2. Legend: marker colors by form category
//! 3. Chart: candles, markers, tooltip, notice
//! 4. Status: chart status and last message
//! 5. Keys: shortcut hints (pointer layout only)

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::info;
use tracing_subscriber::EnvFilter;

use filingchart_core::source::Lookback;
use filingchart_core::OverlayConfig;
use filingchart_tui::data_loader::{load_library, LoadConfig};
use filingchart_tui::{input, ui, AppState};

#[derive(Parser)]
#[command(
    name = "filingchart-tui",
    about = "Candlestick chart with SEC filing markers"
)]
struct Args {
    /// Directory of <TICKER>/prices.{json,csv} and <TICKER>/events.json.
    /// Generated sample data is used when omitted.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Ticker to show (repeatable). Defaults to every ticker found.
    #[arg(long = "ticker", short)]
    tickers: Vec<String>,

    /// Price lookback: 1mo, 3mo, 6mo, 1y, 2y or 5y.
    #[arg(long, default_value = "1y")]
    period: Lookback,

    /// Start in the touch layout regardless of terminal width.
    #[arg(long)]
    touch: bool,

    /// Overlay config file. Defaults to <config dir>/filingchart/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = init_logging()?;
    info!(log = %log_path.display(), "filingchart-tui starting");

    let config_path = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("filingchart")
            .join("config.toml")
    });
    let config = OverlayConfig::load_over(OverlayConfig::terminal(), &config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let library = load_library(&LoadConfig {
        data_dir: args.data_dir.clone(),
        lookback: args.period,
        tickers: args.tickers.clone(),
    })?;
    let mut app = AppState::new(library, config, args.touch);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture);
        default_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.host.unmount();
    info!("filingchart-tui exiting");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Size and mount
        let size = terminal.size()?;
        app.on_resize(Rect::new(0, 0, size.width, size.height));
        app.sync(Instant::now());

        // 2. Render, then let the chart settle and timers run
        terminal.draw(|f| ui::draw(f, app))?;
        app.after_frame(Instant::now());

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                Event::Resize(width, height) => {
                    app.on_resize(Rect::new(0, 0, width, height));
                }
                _ => {}
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() -> Result<PathBuf> {
    let dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filingchart");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let path = dir.join("filingchart.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("FILINGCHART_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}
