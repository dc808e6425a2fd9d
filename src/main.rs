//! Entry point. Wires Form -> Prediction service -> Chart in one event loop.

mod app;
mod config;
mod error;
mod normalize;
mod predict;
mod types;
mod ui;

use std::time::Duration;

use anyhow::Context;
use crossterm::event::{Event, EventStream};
use dotenvy::dotenv;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::error::FetchError;
use crate::predict::PredictClient;
use crate::types::RawEntry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Load config
    let cfg_path =
        std::env::var("STOCKCAST_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let cfg = config::AppConfig::load(&cfg_path)?;

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = std::fs::File::create(&cfg.log.path)
        .with_context(|| format!("open log file {}", cfg.log.path))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let client = PredictClient::new(&cfg.service)?;
    let mut app = App::new(cfg.companies.clone());

    info!(
        "Stockcast started. Endpoint={}, Timeout={}s, Companies={}",
        cfg.service.endpoint,
        cfg.service.timeout_sec,
        cfg.companies.len()
    );

    let mut terminal = ratatui::init();
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let res = run(&mut terminal, &mut app, client).await;

    ratatui::restore();
    info!("Stockcast stopped.");
    res
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    client: PredictClient,
) -> anyhow::Result<()> {
    let mut form = ui::FormState::default();
    let mut events = EventStream::new();
    let (done_tx, mut done_rx) = mpsc::channel::<(u64, Result<Vec<RawEntry>, FetchError>)>(8);
    let mut in_flight: Option<JoinHandle<()>> = None;

    let mut redraw = tokio::time::interval(Duration::from_millis(33));
    redraw.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            maybe = events.next() => {
                match maybe {
                    Some(Ok(Event::Key(key))) => {
                        match ui::handle_key(key, &mut form, app) {
                            Some(ui::UiAction::Quit) => break,
                            Some(ui::UiAction::Submit) => {
                                if let Some(job) = app.submit() {
                                    // The sequence check in the controller drops
                                    // any late result; aborting also frees the
                                    // socket early.
                                    if let Some(old) = in_flight.take() {
                                        old.abort();
                                    }
                                    let client = client.clone();
                                    let done = done_tx.clone();
                                    in_flight = Some(tokio::spawn(async move {
                                        let result = client.fetch(&job.ticker, &job.start).await;
                                        let _ = done.send((job.seq, result)).await;
                                    }));
                                }
                            }
                            None => {}
                        }
                    }
                    Some(Ok(_)) => {} // resize etc.; the redraw tick covers it
                    Some(Err(e)) => {
                        error!("input stream error: {:#}", e);
                        break;
                    }
                    None => break,
                }
            }

            maybe = done_rx.recv() => {
                let Some((seq, result)) = maybe else { break; };
                app.complete_fetch(seq, result);
            }

            _ = redraw.tick() => {
                terminal.draw(|frame| ui::render(frame, &form, app))?;
            }
        }
    }

    if let Some(task) = in_flight.take() {
        task.abort();
    }
    Ok(())
}
