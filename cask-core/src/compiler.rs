use crate::{
    ColumnBindingError, ColumnIndex, Cursor, Mapping, PropertySignature, Result, Rows,
    mapping::Assign,
};
use dashmap::DashMap;
use std::{
    any::{self, Any, TypeId},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

type Bind<T> = Box<dyn Fn(&mut T, &dyn Cursor, usize) -> Result<()> + Send + Sync>;

struct CompiledProperty<T> {
    alias: Arc<str>,
    bind: Bind<T>,
}

/// Reusable routine turning cursor rows into `T` values for one mapping configuration.
///
/// Immutable once built, it can be shared between threads and processors.
pub struct Extractor<T> {
    structural_hash: u64,
    signature: Arc<[PropertySignature]>,
    properties: Box<[CompiledProperty<T>]>,
    _type: PhantomData<fn() -> T>,
}

fn bind_cell<T>(
    assign: &Assign<T>,
    target: &mut T,
    cursor: &dyn Cursor,
    ordinal: usize,
    property: &'static str,
    alias: &str,
    target_type: &'static str,
) -> Result<()> {
    if cursor.is_null(ordinal)? {
        return Ok(());
    }
    cursor
        .value(ordinal)
        .and_then(|value| assign(target, value))
        .map_err(|cause| {
            ColumnBindingError {
                property,
                alias: alias.to_owned(),
                target_type,
                cause,
            }
            .into()
        })
}

impl<T: Default + 'static> Extractor<T> {
    fn compile(mapping: &Mapping<T>, structural_hash: u64) -> Self {
        let properties = mapping
            .properties()
            .iter()
            .map(|property| {
                let (assign, predicate) = property.parts();
                let alias: Arc<str> = property.active_alias().into();
                let name = property.property();
                let target_type = property.target_type();
                let column = alias.clone();
                let bind: Bind<T> = match predicate {
                    Some(predicate) => Box::new(move |target, cursor, ordinal| {
                        if !predicate(cursor, &column) {
                            return Ok(());
                        }
                        bind_cell(&assign, target, cursor, ordinal, name, &column, target_type)
                    }),
                    None => Box::new(move |target, cursor, ordinal| {
                        bind_cell(&assign, target, cursor, ordinal, name, &column, target_type)
                    }),
                };
                CompiledProperty { alias, bind }
            })
            .collect();
        Self {
            structural_hash,
            signature: mapping.signature().into(),
            properties,
            _type: PhantomData,
        }
    }

    /// Lazily extract the rows of the cursor's current result set.
    ///
    /// Column ordinals are resolved once, before the first row. The returned
    /// iterator drives the cursor itself, is single pass and stops after the
    /// first error.
    pub fn extract<'c>(
        &'c self,
        cursor: &'c mut dyn Cursor,
        columns: &ColumnIndex,
    ) -> Result<Extraction<'c, T>> {
        let ordinals = columns.ordinals(&*cursor, self.properties.iter().map(|p| &*p.alias))?;
        Ok(Extraction {
            extractor: self,
            cursor,
            ordinals,
            done: false,
        })
    }

    /// Extract every row of the current result set, either all of them or an error.
    pub fn collect(&self, cursor: &mut dyn Cursor, columns: &ColumnIndex) -> Result<Rows<T>> {
        self.extract(cursor, columns)?.collect()
    }

    fn row(&self, cursor: &dyn Cursor, ordinals: &[Option<usize>]) -> Result<T> {
        let mut result = T::default();
        for (property, ordinal) in self.properties.iter().zip(ordinals) {
            if let Some(ordinal) = *ordinal {
                (property.bind)(&mut result, cursor, ordinal)?;
            }
        }
        Ok(result)
    }
}

impl<T> Extractor<T> {
    pub fn structural_hash(&self) -> u64 {
        self.structural_hash
    }

    pub fn signature(&self) -> &[PropertySignature] {
        &self.signature
    }

    /// Active column aliases, in mapping order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| &*p.alias)
    }
}

impl<T> fmt::Debug for Extractor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("type", &any::type_name::<T>())
            .field("structural_hash", &format_args!("{:016x}", self.structural_hash))
            .field("signature", &self.signature)
            .finish()
    }
}

/// Finite, single pass sequence of mapped rows, see [`Extractor::extract`].
pub struct Extraction<'c, T> {
    extractor: &'c Extractor<T>,
    cursor: &'c mut dyn Cursor,
    ordinals: Vec<Option<usize>>,
    done: bool,
}

impl<T: Default + 'static> Iterator for Extraction<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let row = match self.cursor.advance_row() {
            Ok(true) => self.extractor.row(&*self.cursor, &self.ordinals),
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if row.is_err() {
            self.done = true;
        }
        Some(row)
    }
}

struct CompiledEntry {
    type_id: TypeId,
    signature: Arc<[PropertySignature]>,
    extractor: Arc<dyn Any + Send + Sync>,
}

/// Memoizes compiled extractors by structural hash.
///
/// The hash only locates the bucket, an entry is reused when both the result
/// type and the full mapping signature are equal. Entries live until
/// [`MappingCompiler::clear`] is called.
#[derive(Default)]
pub struct MappingCompiler {
    extractors: DashMap<u64, Vec<CompiledEntry>>,
}

impl MappingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled extractor for `mapping`, built on first request.
    pub fn compile<T>(&self, mapping: &Mapping<T>) -> Arc<Extractor<T>>
    where
        T: Default + Send + Sync + 'static,
    {
        let hash = mapping.structural_hash();
        let signature = mapping.signature();
        let type_id = TypeId::of::<T>();
        let mut bucket = self.extractors.entry(hash).or_default();
        let found = bucket
            .iter()
            .filter(|e| e.type_id == type_id && *e.signature == *signature)
            .find_map(|e| e.extractor.clone().downcast::<Extractor<T>>().ok());
        if let Some(extractor) = found {
            return extractor;
        }
        let extractor = Arc::new(Extractor::compile(mapping, hash));
        log::debug!(
            "Compiled extractor {:016x} for {} ({} properties)",
            hash,
            any::type_name::<T>(),
            mapping.len()
        );
        bucket.push(CompiledEntry {
            type_id,
            signature: extractor.signature.clone(),
            extractor: extractor.clone(),
        });
        extractor
    }

    /// Number of distinct compiled extractors.
    pub fn len(&self) -> usize {
        self.extractors.iter().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every compiled extractor. Processors keep the ones they already hold.
    pub fn clear(&self) {
        self.extractors.clear();
    }
}

impl fmt::Debug for MappingCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingCompiler")
            .field("extractors", &self.len())
            .finish()
    }
}
