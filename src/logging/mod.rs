/*!
 * Logging Module
 * Centralized logging configuration and utilities
 */
pub mod middleware;

use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_DIR: &str = "logs";

/// Default filter when `RUST_LOG` is unset.
fn default_filter(level: &str) -> String {
    format!("multisite_cms={level},tower_http=debug,axum=debug")
}

/// Initialize the logging system.
///
/// The returned guards flush the background writers on drop and must be
/// held for the lifetime of the program.
pub fn init(environment: &str) -> Vec<WorkerGuard> {
    let is_production = environment == "production";

    if let Err(err) = std::fs::create_dir_all(LOG_DIR) {
        eprintln!("could not create {LOG_DIR}/: {err}");
    }

    let (file_writer, file_guard) = non_blocking(rolling::daily(LOG_DIR, "app.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());
    let mut guards = vec![file_guard, console_guard];

    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| if is_production { "info" } else { "debug" }.to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&log_level)));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if is_production {
        let (error_writer, error_guard) = non_blocking(rolling::daily(LOG_DIR, "error.log"));
        guards.push(error_guard);

        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        let result = subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .try_init();
        if let Err(err) = result {
            eprintln!("logging already initialized: {err}");
        }
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        if let Err(err) = subscriber.with(file_layer).with(console_layer).try_init() {
            eprintln!("logging already initialized: {err}");
        }
    }

    tracing::info!(environment, level = %log_level, "logging initialized");
    guards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_targets_crate() {
        assert_eq!(
            default_filter("info"),
            "multisite_cms=info,tower_http=debug,axum=debug"
        );
        assert!(EnvFilter::try_new(default_filter("debug")).is_ok());
    }
}
