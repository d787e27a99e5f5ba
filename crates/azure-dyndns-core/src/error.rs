use thiserror::Error;

/// Failure taxonomy for one update attempt.
///
/// Nothing below the binary's `main` terminates the process; every
/// component returns one of these and the caller decides.
#[derive(Error, Debug)]
pub enum Error {
    /// Public-IP discovery failed (transport, non-2xx status, bad body).
    #[error("network error: {0}")]
    Network(String),

    /// Credential resolution or token acquisition failed.
    #[error("auth error: {0}")]
    Auth(String),

    /// The DNS provider rejected or failed the upsert.
    #[error("provider error: {0}")]
    Provider(String),

    /// Missing required fields or an unreadable/malformed config file.
    #[error("config error: {0}")]
    Config(String),
}
