pub mod cmd;
pub mod error;

pub use error::TrapdoorError;

pub fn log_error<T>(x: Result<T, anyhow::Error>) -> Option<T> {
    x.map_err(|e| {
        log::error!("{e:#}");
    })
    .ok()
}

/// Logs the error and ends the process with status 1.
pub fn exit_on_error<T>(x: Result<T, anyhow::Error>) -> T {
    match log_error(x) {
        Some(t) => t,
        None => std::process::exit(1),
    }
}
