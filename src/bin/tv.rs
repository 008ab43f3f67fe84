use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rate_board::config::{DisplayConfig, CHANNEL_CAPACITY, INPUT_POLL_MS};
use rate_board::display::render::render;
use rate_board::display::{poll_all, EngineEvent, HttpSource, PollBatch, RotationEngine, Scheduler};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let cfg = match DisplayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // stdout belongs to the terminal UI
    if let Some(path) = &cfg.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(&cfg.log_level))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    let source = match HttpSource::new(cfg.api_url.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };
    info!("Display polling {} (timezone {})", cfg.api_url, cfg.timezone.name());

    let mut engine = RotationEngine::new(Utc::now(), cfg.timezone, Scheduler::new());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut engine, &source).await;
    engine.dispose();

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Display stopped");
    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: &mut RotationEngine,
    source: &HttpSource,
) -> io::Result<()> {
    let started = Instant::now();
    let input_cap = Duration::from_millis(INPUT_POLL_MS);
    let (tx, mut rx) = mpsc::channel::<PollBatch>(CHANNEL_CAPACITY);

    loop {
        for event in engine.advance_to(started.elapsed()) {
            if event == EngineEvent::PollDue {
                spawn_poll(source.clone(), tx.clone());
            }
        }
        while let Ok(batch) = rx.try_recv() {
            engine.apply_poll(batch);
        }

        terminal.draw(|f| render(f, engine))?;

        let timeout = engine
            .next_deadline()
            .map_or(input_cap, |d| d.saturating_sub(started.elapsed()))
            .min(input_cap);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc = key.code {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// One poll cycle on its own task; the batch comes back over `tx`.
fn spawn_poll(source: HttpSource, tx: mpsc::Sender<PollBatch>) {
    tokio::spawn(async move {
        let batch = poll_all(&source).await;
        if tx.send(batch).await.is_err() {
            debug!("Display closed before poll finished");
        }
    });
}
