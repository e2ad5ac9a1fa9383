// services/trip-dash/src/main.rs
//
// Terminal dashboard for NYC taxi trip analytics
//
// Run with: cargo run --bin trip-dash -- --demo

use std::fs::OpenOptions;
use std::io::stdout;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svckit::config::ObservabilityConfig;
use svckit::metrics;
use svckit::transport::{HttpTransport, Transport};

use trip_dash::config::load_config;
use trip_dash::controller::Direction;
use trip_dash::mock::MockBackend;
use trip_dash::notice::Notifier;
use trip_dash::tui::{self, SharedView, TuiSink, ViewState};
use trip_dash::{Dashboard, FilterDraft};

#[derive(Parser, Debug)]
#[command(name = "trip-dash")]
#[command(about = "Terminal dashboard for NYC taxi trip analytics")]
#[command(version = "0.1.0")]
struct Args {
    /// Run against the built-in simulated backend (no API required)
    #[arg(long, short)]
    demo: bool,

    /// Analytics API base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    #[arg(short, long, default_value = "config/trip-dash.yaml")]
    config: String,

    /// Redraw interval in milliseconds (overrides config)
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Filters applied after startup and on [a]. Dates are YYYY-MM-DD.
    #[arg(long)]
    start_date: Option<String>,

    #[arg(long)]
    end_date: Option<String>,

    #[arg(long)]
    pickup_zone: Option<String>,

    #[arg(long)]
    dropoff_zone: Option<String>,

    #[arg(long)]
    min_fare: Option<String>,

    #[arg(long)]
    max_fare: Option<String>,

    #[arg(long)]
    min_distance: Option<String>,
}

impl Args {
    /// None when no filter flag was given
    fn filter_draft(&self) -> Option<FilterDraft> {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        let draft = FilterDraft {
            start_date: field(&self.start_date),
            end_date: field(&self.end_date),
            pickup_zone: field(&self.pickup_zone),
            dropoff_zone: field(&self.dropoff_zone),
            min_fare: field(&self.min_fare),
            max_fare: field(&self.max_fare),
            min_distance: field(&self.min_distance),
        };
        (draft != FilterDraft::default()).then_some(draft)
    }
}

// Stdout belongs to the terminal UI, so logs go to a file
fn init_tracing(observability: &ObservabilityConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&observability.log_file)
        .with_context(|| format!("opening log file {}", observability.log_file))?;
    
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "trip_dash={level},svckit={level}",
                    level = observability.log_level
                )
                .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    
    let mut config = load_config(&args.config)?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(refresh_ms) = args.refresh_ms {
        config.ui.refresh_ms = refresh_ms;
    }
    
    init_tracing(&config.observability)?;
    
    let transport: Arc<dyn Transport> = if args.demo {
        info!("Starting trip-dash in DEMO mode");
        Arc::new(MockBackend::new())
    } else {
        info!("Starting trip-dash against {}", config.api.base_url);
        Arc::new(HttpTransport::new())
    };
    
    let view: SharedView = Arc::new(RwLock::new(ViewState::new(args.demo, &config.api.base_url)));
    let sink = Arc::new(TuiSink::new(view.clone()));
    let notifier = Arc::new(Notifier::new(config.ui.notice_duration()));
    let dashboard = Arc::new(Dashboard::new(&config.api, transport, notifier, sink)?);
    
    let draft = args.filter_draft();
    
    // Startup runs in the background so the first frame draws immediately
    let startup = {
        let dashboard = dashboard.clone();
        let draft = draft.clone();
        tokio::spawn(async move {
            let clock = dashboard.initialize().await;
            if let Some(draft) = draft {
                dashboard.apply_filters(&draft).await;
            }
            clock
        })
    };
    
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    
    let tick_rate = Duration::from_millis(config.ui.refresh_ms);
    let result = run_app(&mut terminal, &dashboard, &view, tick_rate, draft);
    
    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    
    startup.abort();
    dashboard.shutdown();
    debug!("Final metrics:\n{}", metrics::snapshot());
    info!("trip-dash stopped");
    
    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &Arc<Dashboard>,
    view: &SharedView,
    tick_rate: Duration,
    draft: Option<FilterDraft>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let state = view.read().unwrap_or_else(|e| e.into_inner());
            tui::draw(frame, &state);
        })?;
        
        if !event::poll(tick_rate)? {
            continue;
        }
        
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        
        // Actions are fire-and-forget; the sink picks up their results
        let dashboard = dashboard.clone();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Left | KeyCode::Char('h') => {
                tokio::spawn(async move { dashboard.navigate(Direction::Previous).await });
            }
            KeyCode::Right | KeyCode::Char('l') => {
                tokio::spawn(async move { dashboard.navigate(Direction::Next).await });
            }
            KeyCode::Char('r') => {
                tokio::spawn(async move { dashboard.reset_filters().await });
            }
            KeyCode::Char('a') => {
                if let Some(draft) = draft.clone() {
                    tokio::spawn(async move { dashboard.apply_filters(&draft).await });
                }
            }
            _ => {}
        }
    }
}
