use super::{Lookup, ProcessorCore, cancellable};
use crate::{
    AsValue, CancellationToken, Command, CommandProcessor, CommandTransform, Executor,
    ParameterSource, Result, ResultCache, RowsAffected, StructuralHasher, execution_error,
};
use std::{any, fmt, future::Future, marker::PhantomData};

fn command_hash(command: &Command, output: &'static str) -> u64 {
    StructuralHasher::new()
        .add(command.command_text())
        .add(&command.kind())
        .add(output)
        .finish()
}

/// Executes a command that produces no result set, returning the rows it affected.
pub struct NonQueryProcessor {
    core: ProcessorCore<RowsAffected>,
}

impl NonQueryProcessor {
    pub fn new(command: Command) -> Result<Self> {
        Ok(Self {
            core: ProcessorCore::new(command)?,
        })
    }

    /// Register a transform applied to every built command, lower priorities first.
    pub fn with_transform(mut self, priority: i32, transform: CommandTransform) -> Self {
        self.core.add_transform(priority, transform);
        self
    }
}

impl CommandProcessor for NonQueryProcessor {
    type Output = RowsAffected;

    fn command(&self) -> &Command {
        self.core.command()
    }

    fn cache_hash(&self) -> u64 {
        command_hash(self.core.command(), "non query")
    }

    fn result_cache(&self) -> &ResultCache<Self::Output> {
        self.core.cache()
    }

    fn build(&self, source: &dyn ParameterSource) -> Result<Command> {
        self.core.build(source)
    }

    fn run<E: Executor>(&self, executor: &mut E, command: Command) -> Result<Self::Output> {
        let fingerprint = match self.core.lookup(&command) {
            Lookup::Hit(affected) => return Ok(affected),
            Lookup::Miss(fingerprint) => Some(fingerprint),
            Lookup::Disabled => None,
        };
        let affected = executor
            .execute_non_query(&command)
            .map_err(|e| execution_error(&command, e))?;
        self.core.store(fingerprint, &affected);
        Ok(affected)
    }

    fn run_async<E: Executor>(
        &self,
        executor: &mut E,
        command: Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send {
        async move {
            let fingerprint = match self.core.lookup(&command) {
                Lookup::Hit(affected) => return Ok(affected),
                Lookup::Miss(fingerprint) => Some(fingerprint),
                Lookup::Disabled => None,
            };
            let affected = cancellable(cancel, executor.execute_non_query_async(&command, cancel))
                .await
                .map_err(|e| execution_error(&command, e))?;
            self.core.store(fingerprint, &affected);
            Ok(affected)
        }
    }
}

impl fmt::Debug for NonQueryProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonQueryProcessor")
            .field("command", self.core.command())
            .field("cache", self.core.cache())
            .finish()
    }
}

/// Executes a command and converts the first column of its first row to `V`.
///
/// A SQL NULL converts like any other value: use `Option<V>` to accept it.
pub struct ScalarProcessor<V> {
    core: ProcessorCore<V>,
    _type: PhantomData<fn() -> V>,
}

impl<V> ScalarProcessor<V>
where
    V: AsValue + Clone + Send + Sync + 'static,
{
    pub fn new(command: Command) -> Result<Self> {
        Ok(Self {
            core: ProcessorCore::new(command)?,
            _type: PhantomData,
        })
    }

    /// Register a transform applied to every built command, lower priorities first.
    pub fn with_transform(mut self, priority: i32, transform: CommandTransform) -> Self {
        self.core.add_transform(priority, transform);
        self
    }
}

impl<V> CommandProcessor for ScalarProcessor<V>
where
    V: AsValue + Clone + Send + Sync + 'static,
{
    type Output = V;

    fn command(&self) -> &Command {
        self.core.command()
    }

    fn cache_hash(&self) -> u64 {
        command_hash(self.core.command(), any::type_name::<V>())
    }

    fn result_cache(&self) -> &ResultCache<Self::Output> {
        self.core.cache()
    }

    fn build(&self, source: &dyn ParameterSource) -> Result<Command> {
        self.core.build(source)
    }

    fn run<E: Executor>(&self, executor: &mut E, command: Command) -> Result<Self::Output> {
        let fingerprint = match self.core.lookup(&command) {
            Lookup::Hit(value) => return Ok(value),
            Lookup::Miss(fingerprint) => Some(fingerprint),
            Lookup::Disabled => None,
        };
        let value = executor
            .execute_scalar(&command)
            .and_then(V::try_from_value)
            .map_err(|e| execution_error(&command, e))?;
        self.core.store(fingerprint, &value);
        Ok(value)
    }

    fn run_async<E: Executor>(
        &self,
        executor: &mut E,
        command: Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send {
        async move {
            let fingerprint = match self.core.lookup(&command) {
                Lookup::Hit(value) => return Ok(value),
                Lookup::Miss(fingerprint) => Some(fingerprint),
                Lookup::Disabled => None,
            };
            let value = cancellable(cancel, executor.execute_scalar_async(&command, cancel))
                .await
                .and_then(V::try_from_value)
                .map_err(|e| execution_error(&command, e))?;
            self.core.store(fingerprint, &value);
            Ok(value)
        }
    }
}

impl<V: Clone> fmt::Debug for ScalarProcessor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarProcessor")
            .field("type", &any::type_name::<V>())
            .field("command", self.core.command())
            .field("cache", self.core.cache())
            .finish()
    }
}
