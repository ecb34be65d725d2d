//! `idlookup`: terminal console for the identity record service.
//!
//! # Usage
//!
//! ```
//! idlookup --url http://localhost:5000
//! idlookup --config ~/.config/idlookup/idlookup.toml --log-file idlookup.log
//! ```

mod app;
mod audit;
mod client;
mod settings;
mod ui;


use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::{App, AppEvent, Console};
use audit::WebhookAudit;
use clap::Parser;
use client::ApiClient;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use idlookup_core::gateway::Session;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Upper bound on the one-off public IP lookup at startup.
const IP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "idlookup", version, about = "Terminal console for the identity record service")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "idlookup.toml")]
  config: PathBuf,

  /// Base URL of the record service.
  #[arg(long)]
  url: Option<String>,

  /// Messaging webhook receiving audit lines.
  #[arg(long, env = "IDLOOKUP_WEBHOOK")]
  webhook: Option<String>,

  /// Write logs to this file (the terminal is taken by the UI).
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // CLI flags override the config file and environment.
  let mut cfg = settings::load(&args.config)?;
  if let Some(url) = args.url {
    cfg.api_url = url;
  }
  if args.webhook.is_some() {
    cfg.webhook_url = args.webhook;
  }
  if args.log_file.is_some() {
    cfg.log_file = args.log_file;
  }

  init_tracing(cfg.log_file.as_deref())?;
  tracing::info!(api_url = %cfg.api_url, "starting console");

  let api = ApiClient::new(&cfg)?;
  let plain = reqwest::Client::builder()
    .timeout(cfg.request_timeout())
    .build()
    .context("failed to build HTTP client")?;

  // Session context: resolved once, read-only afterwards.
  let client_ip = client::resolve_client_ip(&plain, &cfg.ip_lookup_url, IP_LOOKUP_TIMEOUT).await;
  let session = Session::new(client_ip);
  let audit = WebhookAudit::new(plain, cfg.webhook_url.clone());
  if !audit.is_enabled() {
    tracing::info!("no webhook configured; audit lines are only logged");
  }

  let coordinator = Console::new(api.clone(), audit, session);
  coordinator.audit("new session");

  let (events_tx, mut events_rx) = unbounded_channel();
  tokio::spawn(app::poll_readiness(api, events_tx.clone()));
  let mut app = App::new(coordinator, events_tx);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app, &mut events_rx).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match log_file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::sink)
        .init();
    }
  }
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  events: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
  loop {
    // Apply everything background tasks reported since the last frame.
    while let Ok(evt) = events.try_recv() {
      app.handle_event(evt);
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}
