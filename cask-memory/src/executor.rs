use crate::{MemoryCursor, Responder, Response, ResultSet};
use cask_core::{
    Cancelled, CancellationToken, Command, Context, Error, Executor, Result, RowsAffected, Value,
    truncate_long,
};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::time::{sleep, timeout};

/// Execution collaborator answering commands from a script.
///
/// Responses are looked up by exact command text. Asynchronous operations
/// wait for the configured latency first and fail when it exceeds the
/// command timeout. Every command received is recorded.
#[derive(Default)]
pub struct MemoryExecutor {
    responders: HashMap<String, Responder>,
    latency: Option<Duration>,
    history: Vec<Command>,
    cursors_opened: usize,
    scalars_executed: usize,
    non_queries_executed: usize,
    field_reads: Arc<AtomicUsize>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every asynchronous operation by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer `text` with a fixed response.
    pub fn respond(&mut self, text: impl Into<String>, response: impl Into<Response>) -> &mut Self {
        let response = response.into();
        self.respond_with(text, move |_| Ok(response.clone()))
    }

    /// Answer `text` with whatever `responder` computes from the command.
    pub fn respond_with<F>(&mut self, text: impl Into<String>, responder: F) -> &mut Self
    where
        F: Fn(&Command) -> Result<Response> + Send + Sync + 'static,
    {
        self.responders.insert(text.into(), Arc::new(responder));
        self
    }

    /// Make `text` fail with `message`.
    pub fn fail(&mut self, text: impl Into<String>, message: &'static str) -> &mut Self {
        self.respond_with(text, move |_| Err(Error::msg(message)))
    }

    pub fn history(&self) -> &[Command] {
        &self.history
    }
    pub fn cursors_opened(&self) -> usize {
        self.cursors_opened
    }
    pub fn scalars_executed(&self) -> usize {
        self.scalars_executed
    }
    pub fn non_queries_executed(&self) -> usize {
        self.non_queries_executed
    }
    /// Number of column names read from the cursors this executor opened.
    pub fn field_reads(&self) -> usize {
        self.field_reads.load(Ordering::Relaxed)
    }

    /// Reset counters and history, the script is kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.cursors_opened = 0;
        self.scalars_executed = 0;
        self.non_queries_executed = 0;
        self.field_reads.store(0, Ordering::Relaxed);
    }

    fn answer(&mut self, command: &Command) -> Result<Response> {
        self.history.push(command.clone());
        let responder = self
            .responders
            .get(command.command_text())
            .with_context(|| {
                format!(
                    "No response scripted for `{}`",
                    truncate_long!(command.command_text())
                )
            })?;
        responder(command)
    }

    async fn wait(&self, command: &Command, cancel: &CancellationToken) -> Result<()> {
        if let Some(latency) = self.latency {
            match command.timeout() {
                Some(limit) => timeout(limit, sleep(latency))
                    .await
                    .with_context(|| format!("Command timed out after {:?}", limit))?,
                None => sleep(latency).await,
            }
        }
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }
        Ok(())
    }
}

impl Executor for MemoryExecutor {
    type Cursor = MemoryCursor;

    fn open_cursor(&mut self, command: &Command) -> Result<Self::Cursor> {
        let sets = match self.answer(command)? {
            Response::ResultSets(sets) => sets,
            Response::Scalar(value) => vec![ResultSet::new(["value"]).row([value])],
            Response::Affected(..) => Vec::new(),
        };
        self.cursors_opened += 1;
        log::trace!("Opened cursor over {} result sets", sets.len());
        Ok(MemoryCursor::with_counter(sets, self.field_reads.clone()))
    }

    async fn open_cursor_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> Result<Self::Cursor> {
        self.wait(command, cancel).await?;
        self.open_cursor(command)
    }

    fn execute_scalar(&mut self, command: &Command) -> Result<Value> {
        let value = match self.answer(command)? {
            Response::Scalar(value) => value,
            Response::ResultSets(sets) => sets
                .into_iter()
                .next()
                .and_then(|s| s.rows.into_iter().next())
                .and_then(|r| r.into_vec().into_iter().next())
                .unwrap_or_default(),
            Response::Affected(affected) => Value::UInt64(Some(affected.rows_affected)),
        };
        self.scalars_executed += 1;
        Ok(value)
    }

    async fn execute_scalar_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        self.wait(command, cancel).await?;
        self.execute_scalar(command)
    }

    fn execute_non_query(&mut self, command: &Command) -> Result<RowsAffected> {
        let affected = match self.answer(command)? {
            Response::Affected(affected) => affected,
            Response::ResultSets(..) | Response::Scalar(..) => RowsAffected::default(),
        };
        self.non_queries_executed += 1;
        Ok(affected)
    }

    async fn execute_non_query_async(
        &mut self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> Result<RowsAffected> {
        self.wait(command, cancel).await?;
        self.execute_non_query(command)
    }
}

impl fmt::Debug for MemoryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryExecutor")
            .field("scripted", &self.responders.len())
            .field("latency", &self.latency)
            .field("history", &self.history.len())
            .finish()
    }
}
