//! A TUI for logging into and registering with an account server

/// The "functional core" to the main module's "imperative shell"
mod app;

/// Configuration and argument parsing
mod config;

/// Tab-cycling form fields
mod form_fields;

/// Cancellable timers
mod timers;

use app::{App, EffectContext};
use clap::Parser;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use keycard_core::{FileStorage, Session};
use ratatui::DefaultTerminal;
use std::{io, process::ExitCode, sync::Arc};
use timers::Timers;
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedSender},
    task::JoinHandle,
};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let config = config::Config::parse();

    // The terminal belongs to the UI, so logs go to a file next to the
    // session. Hold on to the guard so they get flushed on exit.
    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("keycard.log")
        .build(config.data_dir())
    {
        Ok(appender) => appender,
        Err(problem) => {
            eprintln!("could not open log file: {problem}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let (log_writer, _log_guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(log_writer))
        .init();

    let session = match FileStorage::open(config.session_path()) {
        Ok(storage) => {
            tracing::info!(path = %storage.path().display(), "opened session storage");
            Session::new(storage)
        }
        Err(problem) => {
            tracing::error!(?problem, "could not open session storage");
            eprintln!("could not open session storage: {problem}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let conn = match EffectContext::new(&config) {
        Ok(conn) => Arc::new(conn),
        Err(problem) => {
            tracing::error!(?problem, "could not set up HTTP client");
            eprintln!("{problem}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut terminal = ratatui::init();
    terminal.clear()?;
    let res = run(terminal, App::new(session), &config, conn).await;
    ratatui::restore();
    res
}

/// Manage the lifecycle of the app
async fn run(
    mut terminal: DefaultTerminal,
    mut app: App<FileStorage>,
    config: &config::Config,
    conn: Arc<EffectContext>,
) -> io::Result<ExitCode> {
    // We expect side-effectful behaviors (that is, network access) to take
    // place via async tasks. Once those tasks are done, we read their results
    // off of a channel. Timers send on the same channel. We keep track of
    // outstanding effects so we can exit cleanly.
    let (action_tx, mut action_rx) = unbounded_channel();
    let mut outstanding_effects = Vec::with_capacity(1);
    let mut timers = Timers::default();

    for effect in app.init(config.start_at) {
        handle_effect(effect, &action_tx, &conn, &mut timers, &mut outstanding_effects);
    }
    terminal.draw(|frame| app.render(frame))?;

    let mut event_stream = EventStream::new();

    // Start our event loop!
    loop {
        // First thing we do is wait for an event. This can be either external
        // input, the async result of an effect, or a timer going off. This is
        // an `Option<_>` because we don't necessarily need to pay attention to
        // every single piece of external input.
        let next_action_opt = tokio::select! {
            event_opt = event_stream.next() => {
                match event_opt {
                    Some(Ok(Event::Key(key_event))) => {
                        Some(app::Action::Key(key_event))
                    }
                    Some(Err(err)) => {
                        Some(app::Action::Problem(err.to_string()))
                    }
                    _ => None,
                }
            },

            action_opt = action_rx.recv() => {
                action_opt
            }
        };

        if let Some(action) = next_action_opt {
            if let app::Action::TimerFired(id) = &action {
                timers.fired(*id);
            }

            for effect in app.handle(action) {
                handle_effect(effect, &action_tx, &conn, &mut timers, &mut outstanding_effects);
            }
        }

        // Now that we handle the event, we re-render to display any changes the
        // app cares about.
        terminal.draw(|frame| app.render(frame))?;

        // Completed effects have already sent their actions, so we only need
        // to keep the handles that are still running.
        outstanding_effects.retain(|handle| !handle.is_finished());

        // Finally, if the app indicates that it should exit, we wait for any
        // requests still in flight before exiting. Pending timers are aborted
        // when `timers` drops.
        if let Some(code) = app.should_exit() {
            if !timers.is_empty() {
                tracing::debug!(pending = timers.len(), "dropping pending timers");
            }

            for effect in outstanding_effects.drain(..) {
                if let Err(err) = effect.await {
                    tracing::error!(?err, "effect task failed");
                }
            }

            return Ok(code);
        }
    }
}

/// Route an effect: timers go to the timer service, everything else gets its
/// own task.
fn handle_effect(
    effect: app::Effect,
    action_tx: &UnboundedSender<app::Action>,
    conn: &Arc<EffectContext>,
    timers: &mut Timers,
    outstanding_effects: &mut Vec<JoinHandle<()>>,
) {
    match effect {
        app::Effect::Schedule(id, delay) => timers.schedule(id, delay, action_tx.clone()),
        app::Effect::Cancel(id) => timers.cancel(id),
        effect => outstanding_effects.push(spawn_effect_task(
            action_tx.clone(),
            Arc::clone(conn),
            effect,
        )),
    }
}

/// Spawn a task to run an effect and send the next action to the app.
fn spawn_effect_task(
    action_tx: UnboundedSender<app::Action>,
    conn: Arc<EffectContext>,
    effect: app::Effect,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(next_action) = effect.run(&conn).await {
            // If the channel is closed we're shutting down and it's OK to drop
            // the message.
            let _ = action_tx.send(next_action);
        }
    })
}
