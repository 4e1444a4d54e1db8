use crate::{CancellationToken, Command, Cursor, Result, RowsAffected, Value};
use std::future::Future;

/// Execution collaborator implemented by drivers.
///
/// Every operation comes in a synchronous and an asynchronous form. The
/// asynchronous forms receive the caller's cancellation token, drivers may
/// use it to abort early, processors additionally race cursor acquisition
/// against it. Enforcing [`Command::timeout`] is the driver's job.
pub trait Executor: Send {
    type Cursor: Cursor + Send;

    /// Execute the command and return a cursor over its result sets.
    fn open_cursor(&mut self, command: &Command) -> Result<Self::Cursor>;

    fn open_cursor_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Cursor>> + Send;

    /// Execute the command and return the first column of the first row.
    fn execute_scalar(&mut self, command: &Command) -> Result<Value>;

    fn execute_scalar_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Execute the command and return the total number of rows affected.
    fn execute_non_query(&mut self, command: &Command) -> Result<RowsAffected>;

    fn execute_non_query_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;
}

impl<E: Executor> Executor for &mut E {
    type Cursor = E::Cursor;

    fn open_cursor(&mut self, command: &Command) -> Result<Self::Cursor> {
        (**self).open_cursor(command)
    }
    fn open_cursor_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Cursor>> + Send {
        (**self).open_cursor_async(command, cancel)
    }
    fn execute_scalar(&mut self, command: &Command) -> Result<Value> {
        (**self).execute_scalar(command)
    }
    fn execute_scalar_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Value>> + Send {
        (**self).execute_scalar_async(command, cancel)
    }
    fn execute_non_query(&mut self, command: &Command) -> Result<RowsAffected> {
        (**self).execute_non_query(command)
    }
    fn execute_non_query_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<RowsAffected>> + Send {
        (**self).execute_non_query_async(command, cancel)
    }
}
