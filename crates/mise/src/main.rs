//! Mise: voice-guided cooking assistant for the terminal.

mod app;
mod app_command;
mod config;
mod error;
mod keyboard_capture;
mod renderer;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    keyboard_capture::KeyboardCapture,
};

use crate::config::Config;

use std::time::Duration;

use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "mise=debug,mise_core=debug";
const LOG_FILE_PREFIX: &str = "mise.log";

/// Application entry point.
fn main() {
    // stdout carries the conversation, so logs go to a file.
    let log_guard = init_logging();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(async {
        let app = App::new(&config)?;
        app.run().await
    });

    // The stdin reader may still be blocked on a read.
    rt.shutdown_timeout(Duration::from_secs(1));

    if let Err(e) = result {
        error!(error = ?e, "App error");
        eprintln!("{}", e);
        drop(log_guard);
        std::process::exit(1);
    }
}

/// Daily rolling log file in the data directory, stderr if there is none.
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match Config::data_dir() {
        Some(data_dir) => {
            let appender = tracing_appender::rolling::daily(data_dir.join("logs"), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
