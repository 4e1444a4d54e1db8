use super::{Lookup, ProcessorCore, cancellable};
use crate::{
    CancellationToken, ColumnIndex, Command, CommandProcessor, CommandTransform, Cursor, Executor,
    Extractor, Mapping, MappingCompiler, ParameterSource, Result, ResultCache, Rows,
    StructuralHasher, execution_error,
};
use std::{fmt, future::Future, sync::Arc};

/// Ordered group of result types read from consecutive result sets of one cursor.
///
/// Implemented for tuples of 2 to 7 types. The output has one `Option<Rows<T>>`
/// per type, `None` for every result set the command did not return.
pub trait ResultSets: Send + Sync + 'static {
    /// Number of result sets expected.
    const COUNT: usize;
    /// One [`Mapping`] per result type.
    type Mappings;
    type Extractors: Send + Sync;
    type Output: Clone + Send + Sync + 'static;

    fn compile(compiler: &MappingCompiler, mappings: &Self::Mappings) -> Self::Extractors;

    fn structural_hash(extractors: &Self::Extractors) -> u64;

    /// Map the current result set, then advance and map the next one, stopping
    /// at the first missing result set.
    fn extract(
        extractors: &Self::Extractors,
        cursor: &mut dyn Cursor,
        columns: &[ColumnIndex],
    ) -> Result<Self::Output>;
}

macro_rules! impl_result_sets {
    ($count:literal; $($t:ident $i:tt),+) => {
        impl<$($t),+> ResultSets for ($($t,)+)
        where
            $($t: Default + Send + Sync + 'static,)+
        {
            const COUNT: usize = $count;
            type Mappings = ($(Mapping<$t>,)+);
            type Extractors = ($(Arc<Extractor<$t>>,)+);
            type Output = ($(Option<Rows<$t>>,)+);

            fn compile(compiler: &MappingCompiler, mappings: &Self::Mappings) -> Self::Extractors {
                ($(compiler.compile(&mappings.$i),)+)
            }

            fn structural_hash(extractors: &Self::Extractors) -> u64 {
                let mut hasher = StructuralHasher::new();
                $(hasher.add(&extractors.$i.structural_hash());)+
                hasher.finish()
            }

            fn extract(
                extractors: &Self::Extractors,
                cursor: &mut dyn Cursor,
                columns: &[ColumnIndex],
            ) -> Result<Self::Output> {
                let mut available = true;
                Ok(($(
                    {
                        if $i != 0 && available {
                            available = cursor.next_result_set()?;
                        }
                        if available {
                            Some(extractors.$i.collect(cursor, &columns[$i])?)
                        } else {
                            None
                        }
                    },
                )+))
            }
        }
    };
}

impl_result_sets!(2; A 0, B 1);
impl_result_sets!(3; A 0, B 1, C 2);
impl_result_sets!(4; A 0, B 1, C 2, D 3);
impl_result_sets!(5; A 0, B 1, C 2, D 3, E 4);
impl_result_sets!(6; A 0, B 1, C 2, D 3, E 4, F 5);
impl_result_sets!(7; A 0, B 1, C 2, D 3, E 4, F 5, G 6);

/// Executes a command producing several result sets, each mapped to its own type.
///
/// Returning fewer result sets than configured is not an error.
pub struct MultipleResultProcessor<S: ResultSets> {
    core: ProcessorCore<S::Output>,
    extractors: S::Extractors,
    columns: Box<[ColumnIndex]>,
}

impl<S: ResultSets> MultipleResultProcessor<S> {
    pub fn new(compiler: &MappingCompiler, command: Command, mappings: &S::Mappings) -> Result<Self> {
        Ok(Self {
            core: ProcessorCore::new(command)?,
            extractors: S::compile(compiler, mappings),
            columns: (0..S::COUNT).map(|_| ColumnIndex::new()).collect(),
        })
    }

    /// Register a transform applied to every built command, lower priorities first.
    pub fn with_transform(mut self, priority: i32, transform: CommandTransform) -> Self {
        self.core.add_transform(priority, transform);
        self
    }

    pub fn extractors(&self) -> &S::Extractors {
        &self.extractors
    }

    fn map(&self, cursor: &mut dyn Cursor) -> Result<S::Output> {
        S::extract(&self.extractors, cursor, &self.columns)
    }
}

impl<S: ResultSets> CommandProcessor for MultipleResultProcessor<S> {
    type Output = S::Output;

    fn command(&self) -> &Command {
        self.core.command()
    }

    fn cache_hash(&self) -> u64 {
        S::structural_hash(&self.extractors)
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
            Lookup::Hit(output) => return Ok(output),
            Lookup::Miss(fingerprint) => Some(fingerprint),
            Lookup::Disabled => None,
        };
        let output = executor
            .open_cursor(&command)
            .and_then(|mut cursor| self.map(&mut cursor))
            .map_err(|e| execution_error(&command, e))?;
        self.core.store(fingerprint, &output);
        Ok(output)
    }

    fn run_async<E: Executor>(
        &self,
        executor: &mut E,
        command: Command,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Output>> + Send {
        async move {
            let fingerprint = match self.core.lookup(&command) {
                Lookup::Hit(output) => return Ok(output),
                Lookup::Miss(fingerprint) => Some(fingerprint),
                Lookup::Disabled => None,
            };
            let output = cancellable(cancel, executor.open_cursor_async(&command, cancel))
                .await
                .and_then(|mut cursor| self.map(&mut cursor))
                .map_err(|e| execution_error(&command, e))?;
            self.core.store(fingerprint, &output);
            Ok(output)
        }
    }
}

impl<S: ResultSets> fmt::Debug for MultipleResultProcessor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipleResultProcessor")
            .field("command", self.core.command())
            .field("result_sets", &S::COUNT)
            .field("columns", &self.columns)
            .field("cache", self.core.cache())
            .finish()
    }
}
