use crate::{
    Cancelled, CancellationToken, Command, CommandTransform, Fingerprint, ParameterSource, Result,
    ResultCache, build_command, execution_error,
};
use futures::future::{self, Either};
use std::{future::Future, pin::pin};

/// Result of the cache check that precedes an execution.
pub(crate) enum Lookup<O> {
    Disabled,
    Hit(O),
    Miss(Fingerprint),
}

/// State every processor shape shares: template, registered transforms and result cache.
pub(crate) struct ProcessorCore<O> {
    command: Command,
    transforms: Vec<(i32, CommandTransform)>,
    cache: ResultCache<O>,
}

impl<O: Clone> ProcessorCore<O> {
    pub(crate) fn new(command: Command) -> Result<Self> {
        command.validate()?;
        Ok(Self {
            command,
            transforms: Vec::new(),
            cache: ResultCache::new(),
        })
    }

    pub(crate) fn command(&self) -> &Command {
        &self.command
    }

    pub(crate) fn cache(&self) -> &ResultCache<O> {
        &self.cache
    }

    /// Register a pre-execution transform, lower priorities run first.
    pub(crate) fn add_transform(&mut self, priority: i32, transform: CommandTransform) {
        let position = self.transforms.partition_point(|(p, _)| *p <= priority);
        self.transforms.insert(position, (priority, transform));
    }

    pub(crate) fn build(&self, source: &dyn ParameterSource) -> Result<Command> {
        build_command(
            &self.command,
            source,
            self.transforms.iter().map(|(_, t)| t),
        )
        .map_err(|e| execution_error(&self.command, e))
    }

    pub(crate) fn lookup(&self, command: &Command) -> Lookup<O> {
        if !self.cache.is_enabled() {
            return Lookup::Disabled;
        }
        let fingerprint = Fingerprint::of_command(command);
        match self.cache.try_get(&fingerprint) {
            Some(value) => {
                log::debug!("Cache hit {} for {}", fingerprint, command);
                Lookup::Hit(value)
            }
            None => {
                log::debug!("Cache miss {} for {}", fingerprint, command);
                Lookup::Miss(fingerprint)
            }
        }
    }

    pub(crate) fn store(&self, lookup: Option<Fingerprint>, value: &O) {
        if let Some(fingerprint) = lookup {
            self.cache.put(fingerprint, value.clone());
        }
    }
}

/// Run `operation` unless `cancel` fires first.
pub(crate) async fn cancellable<F, T>(cancel: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(Cancelled.into());
    }
    let operation = pin!(operation);
    let cancelled = pin!(cancel.cancelled());
    match future::select(operation, cancelled).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(Cancelled.into()),
    }
}
