mod multiple;
mod no_result;
mod shared;
mod single;

use shared::*;
pub use multiple::*;
pub use no_result::*;
pub use single::*;

use crate::{
    CacheMode, CancellationToken, ColumnIndex, Command, CommandTransform, ExecutionError, Executor,
    InterceptProxy, ParameterSource, Result, ResultCache, TransformProxy,
};
use std::{future::Future, time::Duration};

/// Contract shared by every command processor and by the proxies wrapping them.
///
/// An execution is split in two steps so that decorators can hook into either:
/// [`CommandProcessor::build`] produces the command of one execution out of
/// the template and the caller's parameters, [`CommandProcessor::run`] looks
/// the result cache up, executes, maps and stores. Every failure surfaces as
/// an [`ExecutionError`].
pub trait CommandProcessor: Send + Sync + Sized {
    /// What one execution returns (and what the result cache stores).
    type Output: Clone + Send + Sync + 'static;

    /// Command template.
    fn command(&self) -> &Command;

    fn timeout(&self) -> Option<Duration> {
        self.command().timeout()
    }

    /// Structural hash identifying the compiled mapping(s) of this processor.
    fn cache_hash(&self) -> u64;

    fn result_cache(&self) -> &ResultCache<Self::Output>;

    /// Column indexes retained between executions, one per result set.
    fn column_indexes(&self) -> &[ColumnIndex] {
        &[]
    }

    /// Build the command of one execution.
    fn build(&self, source: &dyn ParameterSource) -> Result<Command>;

    /// Run an already built command.
    fn run<E: Executor>(&self, executor: &mut E, command: Command) -> Result<Self::Output>;

    fn run_async<E: Executor>(
        &self,
        executor: &mut E,
        command: Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send;

    fn execute<E: Executor>(
        &self,
        executor: &mut E,
        source: &dyn ParameterSource,
    ) -> Result<Self::Output> {
        let command = self.build(source)?;
        self.run(executor, command)
    }

    fn execute_async<E: Executor>(
        &self,
        executor: &mut E,
        source: &dyn ParameterSource,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send {
        let command = self.build(source);
        async move { self.run_async(executor, command?, cancel).await }
    }

    /// Cache results of this processor, see [`ResultCache::activate`].
    fn enable_result_caching(&self, mode: CacheMode, interval: Option<u64>) -> Result<()> {
        self.result_cache().activate(mode, interval)
    }

    fn disable_result_caching(&self) {
        self.result_cache().deactivate();
    }

    fn flush_cache(&self) {
        self.result_cache().flush();
    }

    fn clear_column_index_info(&self) {
        for index in self.column_indexes() {
            index.clear();
        }
    }

    /// Independent copies of the retained column indexes.
    fn retrieve_column_index_info(&self) -> Vec<ColumnIndex> {
        self.column_indexes().iter().map(ColumnIndex::copy).collect()
    }

    /// Seed the retained column indexes, in result set order.
    fn update_column_index_info(&self, info: &[ColumnIndex]) {
        for (index, source) in self.column_indexes().iter().zip(info) {
            index.update(source);
        }
    }

    /// Replace this processor with whatever `f` builds around it.
    fn intercept_or_proxy_with<P, F>(self, f: F) -> P
    where
        P: CommandProcessor<Output = Self::Output>,
        F: FnOnce(Self) -> P,
    {
        f(self)
    }

    /// Rewrite every built command with `transforms`, in order.
    fn apply_transforms<I>(self, transforms: I) -> TransformProxy<Self>
    where
        I: IntoIterator<Item = CommandTransform>,
    {
        self.intercept_or_proxy_with(|source| TransformProxy::new(source, transforms))
    }

    /// Observe every [`ExecutionError`] with `handler` before it reaches the caller.
    fn intercept_exceptions<H>(self, handler: H) -> InterceptProxy<Self, H>
    where
        H: Fn(&ExecutionError) -> Result<()> + Send + Sync,
    {
        self.intercept_or_proxy_with(|source| InterceptProxy::new(source, handler))
    }
}
