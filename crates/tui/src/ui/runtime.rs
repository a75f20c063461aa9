//! Runtime: event loop and input routing for the TUI.
//!
//! - Owns the terminal lifecycle (alternate screen, raw mode).
//! - A dedicated input task blocks on `crossterm` and forwards events over a
//!   channel.
//! - Keys go to the current route's component; returned [`Effect`]s are
//!   either handled here (route changes, quit) or spawned as commands whose
//!   [`Msg`] results are fed back into the app.
//! - Ticks are fast (100 ms) while a request is in flight and slow (5 s)
//!   otherwise.

use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eremetic_api::EremeticClient;
use eremetic_types::TaskId;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::app::{App, Effect, Msg, Route};
use crate::cmd;
use crate::ui::main_component::MainView;

type Backend = CrosstermBackend<Stdout>;

/// Spawn a blocking input reader that forwards terminal events.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    tokio::task::spawn_blocking(move || {
        let poll_interval = Duration::from_millis(16);
        loop {
            match event::poll(poll_interval) {
                Ok(false) => {
                    if sender.is_closed() {
                        break;
                    }
                }
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if let Err(error) = sender.blocking_send(event) {
                            debug!("input channel closed: {error}");
                            break;
                        }
                    }
                    Err(error) => {
                        warn!("failed to read terminal event: {error}");
                        break;
                    }
                },
                Err(error) => {
                    warn!("failed to poll terminal: {error}");
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn cleanup_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<Backend>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn is_quit_key(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(key) if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => main_view.handle_key_events(app, key_event),
        Event::Resize(width, height) => main_view.handle_message(app, Msg::Resize(width, height)),
        _ => Vec::new(),
    }
}

/// Drain `effects`: route changes and quit are applied here, the rest are
/// spawned. Route changes may queue more effects, which are drained too.
/// Returns `false` when the app should exit.
fn process_effects(
    app: &mut App,
    main_view: &mut MainView,
    mut effects: Vec<Effect>,
    pending: &mut FuturesUnordered<JoinHandle<Msg>>,
) -> bool {
    while !effects.is_empty() {
        let batch = std::mem::take(&mut effects);
        let mut network = Vec::with_capacity(batch.len());
        for effect in batch {
            match effect {
                Effect::Quit => return false,
                Effect::SwitchTo(route) => effects.extend(main_view.set_current_route(app, route)),
                other => network.push(other),
            }
        }
        pending.extend(cmd::spawn_cmds(&app.client, cmd::from_effects(network)));
    }
    true
}

/// Set up the terminal, run the event loop, and restore the terminal.
pub async fn run_app(client: Arc<EremeticClient>, initial_task: Option<TaskId>) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut main_view = MainView::new();
    let mut app = App::new(client);
    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();

    if let Some(task_id) = initial_task {
        process_effects(&mut app, &mut main_view, vec![Effect::SwitchTo(Route::Task(task_id))], &mut pending);
    }

    let mut terminal = setup_terminal()?;
    if let Ok((width, height)) = crossterm::terminal::size() {
        app.update(Msg::Resize(width, height));
    }

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = async {
        render(&mut terminal, &mut app, &mut main_view)?;
        loop {
            let target_interval = if app.is_busy() { fast_interval } else { idle_interval };
            if target_interval != current_interval {
                current_interval = target_interval;
                ticker = time::interval(current_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            }

            let mut needs_render = false;
            let effects = tokio::select! {
                maybe_event = input_receiver.recv() => {
                    let Some(event) = maybe_event else {
                        break;
                    };
                    if is_quit_key(&event) {
                        break;
                    }
                    needs_render = true;
                    handle_input_event(&mut app, &mut main_view, event)
                }
                _ = ticker.tick() => {
                    needs_render = app.is_busy();
                    main_view.handle_message(&mut app, Msg::Tick)
                }
                Some(joined) = pending.next(), if !pending.is_empty() => {
                    needs_render = true;
                    match joined {
                        Ok(msg) => main_view.handle_message(&mut app, msg),
                        Err(error) => {
                            warn!("background request failed to complete: {error}");
                            Vec::new()
                        }
                    }
                }
                _ = signal::ctrl_c() => break,
            };

            if !process_effects(&mut app, &mut main_view, effects, &mut pending) {
                break;
            }
            if needs_render {
                render(&mut terminal, &mut app, &mut main_view)?;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    cleanup_terminal(&mut terminal)?;
    result
}
