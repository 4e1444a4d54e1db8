use crate::{
    CancellationToken, ColumnIndex, Command, CommandProcessor, CommandTransform, Executor,
    ParameterSource, Result, ResultCache, execution_error,
};
use std::{fmt, future::Future, time::Duration};

/// Rewrites every command right before the wrapped processor runs it.
///
/// Transforms run in order, a failing one aborts the execution with an
/// [`ExecutionError`](crate::ExecutionError).
pub struct TransformProxy<P> {
    source: P,
    transforms: Vec<CommandTransform>,
}

impl<P: CommandProcessor> TransformProxy<P> {
    pub fn new(source: P, transforms: impl IntoIterator<Item = CommandTransform>) -> Self {
        Self {
            source,
            transforms: transforms.into_iter().collect(),
        }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn into_source(self) -> P {
        self.source
    }

    fn transform(&self, mut command: Command) -> Result<Command> {
        for transform in &self.transforms {
            transform(&mut command).map_err(|e| execution_error(&command, e))?;
        }
        command
            .validate()
            .map_err(|e| execution_error(&command, e))?;
        Ok(command)
    }
}

impl<P: CommandProcessor> CommandProcessor for TransformProxy<P> {
    type Output = P::Output;

    fn command(&self) -> &Command {
        self.source.command()
    }

    fn timeout(&self) -> Option<Duration> {
        self.source.timeout()
    }

    fn cache_hash(&self) -> u64 {
        self.source.cache_hash()
    }

    fn result_cache(&self) -> &ResultCache<Self::Output> {
        self.source.result_cache()
    }

    fn column_indexes(&self) -> &[ColumnIndex] {
        self.source.column_indexes()
    }

    fn build(&self, source: &dyn ParameterSource) -> Result<Command> {
        self.source.build(source)
    }

    fn run<E: Executor>(&self, executor: &mut E, command: Command) -> Result<Self::Output> {
        let command = self.transform(command)?;
        self.source.run(executor, command)
    }

    fn run_async<E: Executor>(
        &self,
        executor: &mut E,
        command: Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send {
        let command = self.transform(command);
        async move { self.source.run_async(executor, command?, cancel).await }
    }
}

impl<P: fmt::Debug> fmt::Debug for TransformProxy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformProxy")
            .field("transforms", &self.transforms.len())
            .field("source", &self.source)
            .finish()
    }
}
