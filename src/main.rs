// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod animate;
mod api;
mod app;
mod config;
mod data;
mod events;
mod source;
mod ui;

use api::{Guardian, HealthApi, HttpHealthApi};
use app::{ActionRunner, App, View};
use config::Settings;
use data::duration::parse_duration;
use data::ScoreHistory;
use source::{fetch_snapshot, DataSource, FileSource, PollOptions, PollerRegistry, PollerState};

/// How often the dashboard checks its source and redraws.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "vitalwatch")]
#[command(about = "Terminal dashboard for live patient health scores and vitals")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Patient to watch
    #[arg(short, long)]
    patient: Option<String>,

    /// Health API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Notification service base URL
    #[arg(long)]
    notification_url: Option<String>,

    /// Poll interval (e.g., "30s", "1m")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Per-request timeout (e.g., "5s", "800ms")
    #[arg(long)]
    timeout: Option<String>,

    /// Replay a captured API response instead of polling
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Export current state to JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Start the emergency workflow for the patient and exit
    #[arg(long, conflicts_with_all = ["file", "export", "add_guardian"])]
    trigger_emergency: bool,

    /// Register a guardian for the patient and exit
    #[arg(
        long,
        requires_all = ["guardian_name", "guardian_email", "guardian_phone"],
        conflicts_with_all = ["file", "export"]
    )]
    add_guardian: bool,

    #[arg(long)]
    guardian_name: Option<String>,

    #[arg(long)]
    guardian_email: Option<String>,

    #[arg(long)]
    guardian_phone: Option<String>,

    #[arg(long, default_value = "Family")]
    guardian_relationship: String,

    /// 1 (first contacted) to 5
    #[arg(long, default_value = "1")]
    guardian_priority: u8,

    /// Log file (overrides logging.file)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;
    init_logging(&settings)?;

    let patient_id = settings.poll.patient_id.clone();

    // Offline replay needs neither the runtime nor the API
    if let Some(ref path) = args.file {
        let mut source = FileSource::new(path, &patient_id);
        if let Some(ref export_path) = args.export {
            let state = source.poll().unwrap_or_else(|| PollerState::new(&patient_id));
            return export_to_file(&state, export_path, settings.poll.history_hours);
        }
        let app = App::new(Box::new(source)).with_history_hours(settings.poll.history_hours);
        return run_tui(app);
    }

    let rt = Runtime::new()?;
    let api: Arc<dyn HealthApi> = Arc::new(HttpHealthApi::from_settings(&settings.api)?);
    let options = PollOptions::from_settings(&settings);

    if args.trigger_emergency {
        rt.block_on(api.trigger_emergency(&patient_id))
            .with_context(|| format!("failed to trigger emergency for {}", patient_id))?;
        println!("Emergency triggered for patient {}", patient_id);
        return Ok(());
    }

    if args.add_guardian {
        let guardian = Guardian::new(
            &patient_id,
            args.guardian_name.clone().unwrap_or_default(),
            args.guardian_email.clone().unwrap_or_default(),
            args.guardian_phone.clone().unwrap_or_default(),
        )
        .relationship(args.guardian_relationship.clone())
        .priority(args.guardian_priority);

        rt.block_on(api.register_guardian(&guardian))
            .context("failed to register guardian")?;
        println!("Registered {} as guardian of {}", guardian.name, patient_id);
        return Ok(());
    }

    if let Some(ref export_path) = args.export {
        let mut state = PollerState::new(&patient_id);
        let result = rt.block_on(fetch_snapshot(api.as_ref(), &patient_id, options));
        if let Err(ref e) = result {
            warn!(patient = %patient_id, error = %e, "export fetch failed");
        }
        state.apply(1, result, Utc::now());
        return export_to_file(&state, export_path, settings.poll.history_hours);
    }

    // Pollers spawn onto this runtime; the TUI stays on the main thread
    let _guard = rt.enter();
    let registry = PollerRegistry::new(Arc::clone(&api), options);
    let handle = registry.subscribe(&patient_id);
    let actions = ActionRunner::new(rt.handle().clone(), api, &patient_id);

    let app = App::new(Box::new(handle))
        .with_history_hours(settings.poll.history_hours)
        .with_actions(actions);
    run_tui(app)
}

/// Defaults, then the config file and environment, then flags.
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref patient) = args.patient {
        settings.poll.patient_id = patient.clone();
    }
    if let Some(ref url) = args.api_url {
        settings.api.base_url = url.clone();
    }
    if let Some(ref url) = args.notification_url {
        settings.api.notification_url = url.clone();
    }
    if let Some(ref refresh) = args.refresh {
        settings.poll.interval = parse_duration(refresh)?;
    }
    if let Some(ref timeout) = args.timeout {
        settings.api.request_timeout = parse_duration(timeout)?;
    }
    if let Some(ref path) = args.log_file {
        settings.logging.file = path.clone();
    }

    if settings.poll.interval.is_zero() || settings.api.request_timeout.is_zero() {
        anyhow::bail!("refresh interval and timeout must be greater than zero");
    }
    Ok(settings)
}

/// Log to a file: the terminal belongs to the dashboard.
fn init_logging(settings: &Settings) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.logging.file)
        .with_context(|| format!("failed to open log file {}", settings.logging.file.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        patient = %settings.poll.patient_id,
        api = %settings.api.base_url,
        "vitalwatch starting"
    );
    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    app.reload_data(Instant::now());

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("vitalwatch stopped");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        let now = Instant::now();
        app.reload_data(now);
        app.animate(now);

        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(12),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Scores => ui::scores::render(frame, app, chunks[2]),
                View::Timeline => ui::timeline::render(frame, app, chunks[2]),
                View::Vitals => ui::vitals::render(frame, app, chunks[2]),
                View::Alerts => ui::alerts::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.confirm_emergency {
                ui::common::render_confirm(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(FRAME_INTERVAL)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Export a single state to a JSON file
fn export_to_file(state: &PollerState, export_path: &Path, history_hours: u32) -> Result<()> {
    let value = app::export_value(state, &ScoreHistory::new(), history_hours);
    app::write_export(export_path, &value)?;

    println!(
        "Exported {} health state ({}) to: {}",
        state.patient_id,
        state.origin().badge(),
        export_path.display()
    );
    Ok(())
}
