use crate::{
    CancellationToken, ColumnIndex, Command, CommandProcessor, Error, ExecutionError, Executor,
    InterceptionError, ParameterSource, Result, ResultCache,
};
use std::{fmt, future::Future, time::Duration};

/// Shows every [`ExecutionError`] of the wrapped processor to a handler.
///
/// The original error always reaches the caller. When the handler fails too,
/// the caller receives an [`InterceptionError`] holding both.
pub struct InterceptProxy<P, H> {
    source: P,
    handler: H,
}

impl<P, H> InterceptProxy<P, H>
where
    P: CommandProcessor,
    H: Fn(&ExecutionError) -> Result<()> + Send + Sync,
{
    pub fn new(source: P, handler: H) -> Self {
        Self { source, handler }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn into_source(self) -> P {
        self.source
    }

    fn intercept(&self, error: Error) -> Error {
        let observed = match error.downcast_ref::<InterceptionError>() {
            Some(inner) => inner.execution_error(),
            None => error.downcast_ref::<ExecutionError>(),
        };
        let Some(execution) = observed else {
            return error;
        };
        match (self.handler)(execution) {
            Ok(()) => error,
            Err(handler) => {
                let error = Error::new(InterceptionError {
                    handler,
                    original: error,
                });
                log::error!("{:#}", error);
                error
            }
        }
    }
}

impl<P, H> CommandProcessor for InterceptProxy<P, H>
where
    P: CommandProcessor,
    H: Fn(&ExecutionError) -> Result<()> + Send + Sync,
{
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
        self.source.build(source).map_err(|e| self.intercept(e))
    }

    fn run<E: Executor>(&self, executor: &mut E, command: Command) -> Result<Self::Output> {
        self.source
            .run(executor, command)
            .map_err(|e| self.intercept(e))
    }

    fn run_async<E: Executor>(
        &self,
        executor: &mut E,
        command: Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send {
        async move {
            self.source
                .run_async(executor, command, cancel)
                .await
                .map_err(|e| self.intercept(e))
        }
    }
}

impl<P: fmt::Debug, H> fmt::Debug for InterceptProxy<P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptProxy")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
