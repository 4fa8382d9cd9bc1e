//! Defines the [`Termination`] trait.

use std::{convert::Infallible, fmt::Display};

/// Exit status introspection for the function passed to [`crate::run`].
///
/// The GUI event loop owns the main thread and never returns, so the process has to be exited
/// explicitly once the application code finishes. This trait tells the runner which exit code to
/// use and how to report a failure.
pub trait Termination {
    fn is_success(&self) -> bool;

    /// Logs a human-readable description of the failure.
    ///
    /// Called only when [`Termination::is_success`] returned `false`.
    fn log_failure(&self) {}
}

impl Termination for Infallible {
    fn is_success(&self) -> bool {
        match *self {}
    }
}

impl Termination for () {
    fn is_success(&self) -> bool {
        true
    }
}

impl<T: Termination, E: Display> Termination for Result<T, E> {
    fn is_success(&self) -> bool {
        match self {
            Ok(term) => term.is_success(),
            Err(_) => false,
        }
    }

    fn log_failure(&self) {
        match self {
            Ok(term) => term.log_failure(),
            // `{:#}` prints the whole context chain of `anyhow` errors, but never a backtrace.
            Err(e) => log::error!("{e:#}"),
        }
    }
}
