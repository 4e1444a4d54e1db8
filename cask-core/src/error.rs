use crate::{Command, Parameter};
use std::{borrow::Cow, time::Duration};
use thiserror::Error;

/// Invalid configuration detected before anything is executed.
#[derive(Debug, Error)]
#[error("Invalid argument `{argument}`: {message}")]
pub struct ArgumentError {
    pub argument: &'static str,
    pub message: Cow<'static, str>,
}

impl ArgumentError {
    pub fn new(argument: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            argument,
            message: message.into(),
        }
    }
}

/// A single property could not be read from its column or converted to its declared type.
#[derive(Debug, Error)]
#[error("Cannot bind column `{alias}` to property `{property}` of type `{target_type}`")]
pub struct ColumnBindingError {
    pub property: &'static str,
    pub alias: String,
    pub target_type: &'static str,
    #[source]
    pub cause: anyhow::Error,
}

/// Cursor acquisition was abandoned because the cancellation token fired.
#[derive(Debug, Error)]
#[error("The operation was cancelled before the cursor was opened")]
pub struct Cancelled;

/// Any failure while building, executing or mapping a command.
///
/// Carries the full command (text, kind, timeout and parameters) so that the
/// failure can be diagnosed without reproducing it.
#[derive(Debug, Error)]
#[error("Failed to execute {command}")]
pub struct ExecutionError {
    command: Box<Command>,
    #[source]
    cause: anyhow::Error,
}

impl ExecutionError {
    pub fn new(command: Command, cause: anyhow::Error) -> Self {
        Self {
            command: Box::new(command),
            cause,
        }
    }
    pub fn command(&self) -> &Command {
        &self.command
    }
    pub fn timeout(&self) -> Option<Duration> {
        self.command.timeout()
    }
    pub fn parameters(&self) -> &[Parameter] {
        self.command.parameters()
    }
    /// The original failure.
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
    pub fn is_cancelled(&self) -> bool {
        self.cause.is::<Cancelled>()
    }
}

/// An exception interception handler failed while observing an [`ExecutionError`].
///
/// Both failures are kept, the original one is the `source`.
#[derive(Debug, Error)]
#[error("The exception handler failed ({handler:#}) while intercepting: {original}")]
pub struct InterceptionError {
    pub handler: anyhow::Error,
    #[source]
    pub original: anyhow::Error,
}

impl InterceptionError {
    pub fn execution_error(&self) -> Option<&ExecutionError> {
        self.original.downcast_ref()
    }
}

/// Wrap `error` into an [`ExecutionError`] for `command`, unless it already is one.
pub fn execution_error(command: &Command, error: anyhow::Error) -> anyhow::Error {
    if error.is::<ExecutionError>() || error.is::<InterceptionError>() {
        return error;
    }
    let cancelled = error.is::<Cancelled>();
    let error = anyhow::Error::new(ExecutionError::new(command.clone(), error));
    if cancelled {
        log::debug!("{:#}", error);
    } else {
        log::error!("{:#}", error);
    }
    error
}
