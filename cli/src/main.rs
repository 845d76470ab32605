use clap::Parser;

mod app;
mod commands;
mod form;
mod tui;

use commands::cli;
use tablero_core::api::{CliError, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = tablero_core::config::load_default()
        .map_err(|e| CliError::Config(e.to_string()))?;

    if let Some(base_url) = args.base_url.as_deref() {
        cfg.api.base_url = base_url.to_string();
    }

    let is_board = matches!(&args.command, None | Some(cli::Commands::Board));
    if is_board {
        // stderr writes would corrupt the alternate screen; board sessions
        // log to file only.
        cfg.logging.console = false;
    }
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let ctx = app::AppContext::new(cfg)?;

    match args.command {
        None | Some(cli::Commands::Board) => tui::run_board(&ctx).await,
        Some(cli::Commands::List(list_args)) => app::run_list(&ctx, list_args).await,
        Some(cli::Commands::Add(add_args)) => app::run_add(&ctx, add_args).await,
        Some(cli::Commands::Edit(edit_args)) => app::run_edit(&ctx, edit_args).await,
        Some(cli::Commands::Done(id)) => app::run_set_completed(&ctx, id, true).await,
        Some(cli::Commands::Reopen(id)) => app::run_set_completed(&ctx, id, false).await,
        Some(cli::Commands::Rm(rm_args)) => app::run_rm(&ctx, rm_args).await,
    }
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: command / IO error
    // 30: api error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Command(_) => 20,
        CliError::Io(_) => 20,
        CliError::Api(_) => 30,
        CliError::Json(_) => 50,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("tablero"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("tablero.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        // Nothing to write to; behave as if logging were disabled.
        return Ok(());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
