use crate::{
    ArgumentError, AsValue, CacheMode, Command, CommandProcessor, Mapping, MappingCompiler,
    MultipleResultProcessor, NonQueryProcessor, Result, ResultSets, ScalarProcessor,
    SingleResultProcessor,
};
use std::{env, sync::Arc, time::Duration};

/// Defaults applied to every processor an [`Engine`] builds.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Timeout of commands that do not carry their own.
    pub default_timeout: Option<Duration>,
    /// Caching policy activated on every new processor.
    pub result_caching: Option<(CacheMode, u64)>,
}

impl EngineConfig {
    pub const TIMEOUT_VAR: &'static str = "CASK_COMMAND_TIMEOUT";
    pub const CACHE_MODE_VAR: &'static str = "CASK_CACHE_MODE";
    pub const CACHE_INTERVAL_VAR: &'static str = "CASK_CACHE_INTERVAL";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn with_result_caching(mut self, mode: CacheMode, interval: u64) -> Self {
        self.result_caching = match mode {
            CacheMode::None => None,
            mode => Some((mode, interval)),
        };
        self
    }

    /// Read the configuration from the environment.
    ///
    /// `CASK_COMMAND_TIMEOUT` is a number of seconds, `CASK_CACHE_MODE` one of
    /// `none`, `permanent`, `timespan`, `repeated` and `CASK_CACHE_INTERVAL`
    /// the interval of the cache mode. Unset variables keep the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(timeout) = var(Self::TIMEOUT_VAR) {
            let duration = timeout
                .parse::<f64>()
                .ok()
                .filter(|v| *v > 0.0)
                .and_then(|v| Duration::try_from_secs_f64(v).ok());
            let Some(duration) = duration else {
                return Err(ArgumentError::new(
                    Self::TIMEOUT_VAR,
                    format!("`{}` is not a positive number of seconds", timeout),
                )
                .into());
            };
            config.default_timeout = Some(duration);
        }
        if let Some(mode) = var(Self::CACHE_MODE_VAR) {
            let mode = mode.parse::<CacheMode>()?;
            let interval = match var(Self::CACHE_INTERVAL_VAR) {
                Some(interval) => interval.parse::<u64>().map_err(|e| {
                    ArgumentError::new(
                        Self::CACHE_INTERVAL_VAR,
                        format!("`{}` is not a valid interval: {}", interval, e),
                    )
                })?,
                None => 0,
            };
            if !matches!(mode, CacheMode::None | CacheMode::Permanent) && interval == 0 {
                return Err(ArgumentError::new(
                    Self::CACHE_INTERVAL_VAR,
                    format!("cache mode {} requires a positive interval", mode),
                )
                .into());
            }
            config = config.with_result_caching(mode, interval);
        }
        log::debug!("Engine configuration from the environment: {:?}", config);
        Ok(config)
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Caller owned context building processors.
///
/// Holds the compiled extractor cache shared by every processor it builds and
/// the defaults they start from. Cloning is cheap, clones share the same
/// compiler.
#[derive(Default, Debug, Clone)]
pub struct Engine {
    compiler: Arc<MappingCompiler>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            compiler: Default::default(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compiler(&self) -> &MappingCompiler {
        &self.compiler
    }

    /// Drop every compiled extractor, processors already built keep theirs.
    pub fn clear_compiled(&self) {
        self.compiler.clear();
    }

    pub fn non_query(&self, command: Command) -> Result<NonQueryProcessor> {
        let processor = NonQueryProcessor::new(self.prepare(command))?;
        self.configure(processor)
    }

    pub fn scalar<V>(&self, command: Command) -> Result<ScalarProcessor<V>>
    where
        V: AsValue + Clone + Send + Sync + 'static,
    {
        let processor = ScalarProcessor::new(self.prepare(command))?;
        self.configure(processor)
    }

    pub fn single<T>(&self, command: Command, mapping: &Mapping<T>) -> Result<SingleResultProcessor<T>>
    where
        T: Default + Send + Sync + 'static,
    {
        let processor = SingleResultProcessor::new(&self.compiler, self.prepare(command), mapping)?;
        self.configure(processor)
    }

    pub fn multiple<S: ResultSets>(
        &self,
        command: Command,
        mappings: &S::Mappings,
    ) -> Result<MultipleResultProcessor<S>> {
        let processor =
            MultipleResultProcessor::new(&self.compiler, self.prepare(command), mappings)?;
        self.configure(processor)
    }

    fn prepare(&self, mut command: Command) -> Command {
        if command.timeout().is_none() {
            command.set_timeout(self.config.default_timeout);
        }
        command
    }

    fn configure<P: CommandProcessor>(&self, processor: P) -> Result<P> {
        if let Some((mode, interval)) = self.config.result_caching {
            processor.enable_result_caching(mode, Some(interval))?;
        }
        Ok(processor)
    }
}
