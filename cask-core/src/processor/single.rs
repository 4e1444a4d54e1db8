use super::{Lookup, ProcessorCore, cancellable};
use crate::{
    CancellationToken, ColumnIndex, Command, CommandProcessor, CommandTransform, Cursor, Executor,
    Extractor, Mapping, MappingCompiler, ParameterSource, Result, ResultCache, Rows,
    execution_error,
};
use std::{fmt, future::Future, sync::Arc};

/// Executes a command producing one result set and maps every row to `T`.
pub struct SingleResultProcessor<T> {
    core: ProcessorCore<Rows<T>>,
    extractor: Arc<Extractor<T>>,
    columns: [ColumnIndex; 1],
}

impl<T> SingleResultProcessor<T>
where
    T: Default + Send + Sync + 'static,
{
    /// Compile `mapping` (or reuse its compiled extractor) and bind it to `command`.
    pub fn new(compiler: &MappingCompiler, command: Command, mapping: &Mapping<T>) -> Result<Self> {
        Ok(Self {
            core: ProcessorCore::new(command)?,
            extractor: compiler.compile(mapping),
            columns: Default::default(),
        })
    }

    /// Register a transform applied to every built command, lower priorities first.
    pub fn with_transform(mut self, priority: i32, transform: CommandTransform) -> Self {
        self.core.add_transform(priority, transform);
        self
    }

    pub fn extractor(&self) -> &Arc<Extractor<T>> {
        &self.extractor
    }

    fn map(&self, cursor: &mut dyn Cursor) -> Result<Rows<T>> {
        self.extractor.collect(cursor, &self.columns[0])
    }
}

impl<T> CommandProcessor for SingleResultProcessor<T>
where
    T: Default + Send + Sync + 'static,
{
    type Output = Rows<T>;

    fn command(&self) -> &Command {
        self.core.command()
    }

    fn cache_hash(&self) -> u64 {
        self.extractor.structural_hash()
    }

    fn result_cache(&self) -> &ResultCache<Self::Output> {
        self.core.cache()
    }

    fn column_indexes(&self) -> &[ColumnIndex] {
        &self.columns
    }

    fn build(&self, source: &dyn ParameterSource) -> Result<Command> {
        self.core.build(source)
    }

    fn run<E: Executor>(&self, executor: &mut E, command: Command) -> Result<Self::Output> {
        let fingerprint = match self.core.lookup(&command) {
            Lookup::Hit(rows) => return Ok(rows),
            Lookup::Miss(fingerprint) => Some(fingerprint),
            Lookup::Disabled => None,
        };
        let rows = executor
            .open_cursor(&command)
            .and_then(|mut cursor| self.map(&mut cursor))
            .map_err(|e| execution_error(&command, e))?;
        self.core.store(fingerprint, &rows);
        Ok(rows)
    }

    fn run_async<E: Executor>(
        &self,
        executor: &mut E,
        command: Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send {
        async move {
            let fingerprint = match self.core.lookup(&command) {
                Lookup::Hit(rows) => return Ok(rows),
                Lookup::Miss(fingerprint) => Some(fingerprint),
                Lookup::Disabled => None,
            };
            let rows = cancellable(cancel, executor.open_cursor_async(&command, cancel))
                .await
                .and_then(|mut cursor| self.map(&mut cursor))
                .map_err(|e| execution_error(&command, e))?;
            self.core.store(fingerprint, &rows);
            Ok(rows)
        }
    }
}

impl<T> fmt::Debug for SingleResultProcessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleResultProcessor")
            .field("command", self.core.command())
            .field("extractor", &self.extractor)
            .field("columns", &self.columns)
            .field("cache", self.core.cache())
            .finish()
    }
}
