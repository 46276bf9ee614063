//! File logging shared by the launcher and the worker.
//!
//! Both binaries run windowless, so the rolling log file is the only place
//! their traces go. The returned guard must stay alive for the duration of
//! the process or buffered lines are lost.

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;

fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "sangafabrice", "cvmd2html")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Daily rolling file logging with an env-filter, one file per component.
pub fn init(component: &str) -> WorkerGuard {
    let dir = log_dir();
    std::fs::create_dir_all(&dir).ok();
    let file_appender = tracing_appender::rolling::daily(&dir, format!("{component}.log"));
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}
