use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use harvestwatch::config::Settings;
use harvestwatch::ui::{self, Theme};
use harvestwatch::{events, App, DataSource, FileSource, SimulatedSource, StreamSource, Thresholds};

/// How often the event loop wakes up.
const TICK: Duration = Duration::from_millis(100);

/// How often a watched file is checked for changes.
const FILE_REFRESH: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "harvestwatch", version)]
#[command(about = "Terminal dashboard for irrigation and water-harvesting sensors")]
struct Args {
    /// Run the built-in simulation instead of following the feed
    #[arg(short, long, conflicts_with_all = ["file", "connect"])]
    simulate: bool,

    /// Watch a JSON file holding one reading (or null)
    #[arg(short, long, conflicts_with_all = ["connect"])]
    file: Option<PathBuf>,

    /// Connect to a TCP endpoint streaming NDJSON readings (host:port)
    #[arg(short, long)]
    connect: Option<String>,

    /// Settings file (default: ./harvestwatch.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Realtime database URL, e.g. https://<project>.firebaseio.com
    #[arg(long)]
    database_url: Option<String>,

    /// Database location holding the readings
    #[arg(long)]
    path: Option<String>,

    /// Seconds between simulated readings
    #[arg(short, long)]
    interval: Option<f64>,

    /// Seed for the simulation
    #[arg(long)]
    seed: Option<u64>,

    /// Export the reading from --file (or one simulated reading) to JSON and exit
    #[arg(short, long, conflicts_with_all = ["connect"])]
    export: Option<PathBuf>,

    /// Where to write logs (the terminal is owned by the dashboard)
    #[arg(long, default_value = "harvestwatch.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_file, args.verbose)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    apply_overrides(&mut settings, &args);
    let thresholds = settings.display.clone();

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        let source: Box<dyn DataSource> = match args.file {
            Some(ref path) => Box::new(FileSource::new(path)),
            None => Box::new(simulated_source(&settings)),
        };
        return export_to_file(source, export_path, thresholds);
    }

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, thresholds);
    }

    if let Some(ref path) = args.file {
        return run_with_file(path, thresholds);
    }

    if args.simulate {
        return run_simulated(&settings, thresholds);
    }

    if settings.feed.database_url.is_some() {
        return run_with_feed(&settings, thresholds);
    }

    info!("No database URL configured, running the simulation");
    run_simulated(&settings, thresholds)
}

/// Send logs to a file so they do not corrupt the TUI.
fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Command line flags win over the settings file and environment.
fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(ref url) = args.database_url {
        settings.feed.database_url = Some(url.clone());
    }
    if let Some(ref path) = args.path {
        settings.feed.path = path.clone();
    }
    if let Some(interval) = args.interval {
        settings.simulation.interval_secs = interval;
    }
    if args.seed.is_some() {
        settings.simulation.seed = args.seed;
    }
}

fn simulated_source(settings: &Settings) -> SimulatedSource {
    let interval = settings.simulation.interval();
    match settings.simulation.seed {
        Some(seed) => SimulatedSource::with_seed(interval, seed),
        None => SimulatedSource::new(interval),
    }
}

/// Run with readings generated locally on a timer
fn run_simulated(settings: &Settings, thresholds: Thresholds) -> Result<()> {
    let source = simulated_source(settings);
    info!("Starting {}", source.description());
    run_tui(Box::new(source), thresholds, TICK)
}

/// Run with a file-based data source
fn run_with_file(path: &Path, thresholds: Thresholds) -> Result<()> {
    info!("Watching {}", path.display());
    let source = Box::new(FileSource::new(path));
    run_tui(source, thresholds, FILE_REFRESH)
}

/// Run with the realtime database push client
#[cfg(feature = "feed")]
fn run_with_feed(settings: &Settings, thresholds: Thresholds) -> Result<()> {
    use harvestwatch::feed::create_subscriber;

    let rt = tokio::runtime::Runtime::new()?;

    // The client task is spawned onto the runtime, which keeps driving it
    // from its worker threads while the TUI runs here.
    let (source, handle) = rt.block_on(async { create_subscriber(&settings.feed) })?;

    let result = run_tui(Box::new(source), thresholds, TICK);

    handle.abort();

    result
}

#[cfg(not(feature = "feed"))]
fn run_with_feed(settings: &Settings, thresholds: Thresholds) -> Result<()> {
    warn!("Built without the feed feature, running the simulation instead");
    run_simulated(settings, thresholds)
}

/// Run with a TCP stream data source
fn run_with_tcp(addr: &str, thresholds: Thresholds) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("Connected to {}", addr);
                Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn DataSource>)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    run_tui(source, thresholds, TICK)
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    thresholds: Thresholds,
    refresh_interval: Duration,
) -> Result<()> {
    // Detect the background before raw mode takes over the terminal
    let theme = Theme::auto_detect();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::with_theme(source, thresholds, theme);
    let result = app
        .reload_data()
        .and_then(|_| run_app(&mut terminal, &mut app, refresh_interval));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events::poll_event(TICK)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data()?;
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Export the current reading to a JSON file
fn export_to_file(
    source: Box<dyn DataSource>,
    export_path: &Path,
    thresholds: Thresholds,
) -> Result<()> {
    let mut app = App::with_theme(source, thresholds, Theme::dark());
    app.reload_data()?;
    if let Some(err) = app.load_error.as_deref() {
        anyhow::bail!("{}", err);
    }
    if app.no_data {
        warn!("Source holds no reading");
    }

    app.export_state(export_path)?;

    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}
