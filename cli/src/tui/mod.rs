mod app;
mod events;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use tablero_core::api::{CliError, TaskQueryCache};

pub use app::BoardApp;
use app::{Action, UiEvent, WriteOp};

use crate::app::AppContext;

pub fn check_tui_support() -> Result<(), String> {
    if !atty::is(atty::Stream::Stdout) {
        return Err("stdout is not a terminal".to_string());
    }
    if !cfg!(windows) && std::env::var("TERM").is_err() {
        return Err("TERM environment variable not set".to_string());
    }
    let (width, height) = terminal::size().map_err(|e| format!("terminal size failed: {e}"))?;
    if width < 80 || height < 20 {
        return Err(format!(
            "terminal too small ({}x{}), need at least 80x20",
            width, height
        ));
    }
    Ok(())
}

pub async fn run_board(ctx: &AppContext) -> Result<i32, CliError> {
    check_tui_support().map_err(CliError::Command)?;
    let mut terminal = setup_terminal().map_err(CliError::Command)?;
    let result = run_on_terminal(&mut terminal, ctx).await;
    restore_terminal(&mut terminal);
    result
}

async fn run_on_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ctx: &AppContext,
) -> Result<i32, CliError> {
    let mut board = BoardApp::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<UiEvent>();
    let (input_reader, mut input_rx) = events::InputReader::start();
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    spawn_load(&ctx.cache, &tx);

    let mut exit_requested = false;

    loop {
        tokio::select! {
            Some(key) = input_rx.recv() => {
                let action = board.handle_key(key);
                if perform(&mut board, ctx, &tx, action) {
                    exit_requested = true;
                }
            }
            Some(event) = rx.recv() => {
                match event {
                    UiEvent::Loaded(result) => board.apply_loaded(result),
                    UiEvent::WriteDone { op, result } => {
                        if board.on_write_done(op, result) {
                            board.loading = true;
                            spawn_load(&ctx.cache, &tx);
                        }
                    }
                }
            }
            _ = tick.tick() => {}
        }

        board.expire_notification(Instant::now());
        terminal
            .draw(|f| ui::draw(f, &board))
            .map_err(|e| CliError::Command(e.to_string()))?;

        if exit_requested {
            break;
        }
    }

    input_reader.stop();
    Ok(0)
}

/// Execute an action against the cache; network work runs as a spawned task
/// that reports back through the event channel. Returns true on quit.
fn perform(
    board: &mut BoardApp,
    ctx: &AppContext,
    tx: &mpsc::UnboundedSender<UiEvent>,
    action: Action,
) -> bool {
    match action {
        Action::None => {}
        Action::Quit => return true,
        Action::Reload => {
            ctx.cache.invalidate();
            board.loading = true;
            spawn_load(&ctx.cache, tx);
        }
        Action::Create {
            title,
            description,
            completed,
        } => {
            let cache = Arc::clone(&ctx.cache);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = cache
                    .create_task(&title, &description, completed)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                let _ = tx.send(UiEvent::WriteDone {
                    op: WriteOp::Create,
                    result,
                });
            });
        }
        Action::Update {
            id,
            title,
            description,
            completed,
        } => {
            let cache = Arc::clone(&ctx.cache);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = cache
                    .update_task(id, &title, &description, completed)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                let _ = tx.send(UiEvent::WriteDone {
                    op: WriteOp::Update,
                    result,
                });
            });
        }
        Action::Delete { id } => {
            let cache = Arc::clone(&ctx.cache);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = cache.delete_task(id).await.map_err(|e| e.to_string());
                let _ = tx.send(UiEvent::WriteDone {
                    op: WriteOp::Delete,
                    result,
                });
            });
        }
        Action::SetCompleted { id, completed } => {
            let cache = Arc::clone(&ctx.cache);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = cache
                    .set_completed(id, completed)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                let _ = tx.send(UiEvent::WriteDone {
                    op: WriteOp::Toggle,
                    result,
                });
            });
        }
    }
    false
}

fn spawn_load(cache: &Arc<TaskQueryCache>, tx: &mpsc::UnboundedSender<UiEvent>) {
    let cache = Arc::clone(cache);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = cache.tasks().await;
        let _ = tx.send(UiEvent::Loaded(result));
    });
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, String> {
    enable_raw_mode().map_err(|e| e.to_string())?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).map_err(|e| e.to_string())?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.to_string())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen);
    let _ = terminal.show_cursor();
}
