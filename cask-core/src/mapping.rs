use crate::{ArgumentError, AsValue, Cursor, Result, StructuralHasher, Value};
use std::{
    any::{self, TypeId},
    borrow::Cow,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

/// Converts a raw cell value and assigns it to a property of `T`.
pub(crate) type Assign<T> = Arc<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;
/// Decides, for the current row and the active alias, whether the property is mapped.
pub type Predicate = Arc<dyn Fn(&dyn Cursor, &str) -> bool + Send + Sync>;

/// Identity of a closure taking part in a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClosureId {
    /// Capture free closure or function item: every instance behaves the same.
    Type(TypeId),
    /// Closure with captured state, identified by the allocation holding it.
    Instance(usize),
}

impl ClosureId {
    fn of<F: 'static, A: ?Sized>(stored: &Arc<A>) -> Self {
        if size_of::<F>() == 0 {
            Self::Type(TypeId::of::<F>())
        } else {
            Self::Instance(Arc::as_ptr(stored) as *const () as usize)
        }
    }
}

/// Identity of a property mapping, what the structural hash and the compiled
/// extractor cache compare.
///
/// Two mappings built from the same capture free closures are the same
/// configuration. Closures capturing state only match clones of the mapping
/// that holds them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySignature {
    pub property: &'static str,
    pub alias: Cow<'static, str>,
    pub target_type: &'static str,
    pub assign: ClosureId,
    pub predicate: Option<ClosureId>,
}

/// How one property of `T` is filled from a column.
pub struct PropertyMapping<T> {
    property: &'static str,
    alias: Cow<'static, str>,
    target_type: &'static str,
    assign: Assign<T>,
    assign_id: ClosureId,
    predicate: Option<(Predicate, ClosureId)>,
}

impl<T: 'static> PropertyMapping<T> {
    /// Map `property` from the column with the same name, converting with [`AsValue`].
    pub fn new<V, S>(property: &'static str, setter: S) -> Self
    where
        V: AsValue + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let assign: Assign<T> = Arc::new(move |target: &mut T, value| {
            setter(target, V::try_from_value(value)?);
            Ok(())
        });
        Self {
            property,
            alias: Cow::Borrowed(property),
            target_type: any::type_name::<V>(),
            assign_id: ClosureId::of::<S, _>(&assign),
            assign,
            predicate: None,
        }
    }

    /// Map `property` using a custom conversion function.
    pub fn converted<V, C, S>(property: &'static str, converter: C, setter: S) -> Self
    where
        V: 'static,
        C: Fn(Value) -> Result<V> + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let assign: Assign<T> = Arc::new(move |target: &mut T, value| {
            setter(target, converter(value)?);
            Ok(())
        });
        Self {
            property,
            alias: Cow::Borrowed(property),
            target_type: any::type_name::<V>(),
            assign_id: ClosureId::of::<(C, S), _>(&assign),
            assign,
            predicate: None,
        }
    }

    /// Read the property from the column `alias` instead.
    pub fn alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Only map the property on rows where `predicate` holds.
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&dyn Cursor, &str) -> bool + Send + Sync + 'static,
    {
        let predicate: Predicate = Arc::new(predicate);
        let id = ClosureId::of::<P, _>(&predicate);
        self.predicate = Some((predicate, id));
        self
    }

    pub fn set_alias(&mut self, alias: impl Into<Cow<'static, str>>) -> Result<()> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(ArgumentError::new(
                "alias",
                format!("the alias of property `{}` is empty", self.property),
            )
            .into());
        }
        self.alias = alias;
        Ok(())
    }

    pub fn property(&self) -> &'static str {
        self.property
    }
    pub fn active_alias(&self) -> &str {
        &self.alias
    }
    pub fn target_type(&self) -> &'static str {
        self.target_type
    }

    pub fn signature(&self) -> PropertySignature {
        PropertySignature {
            property: self.property,
            alias: self.alias.clone(),
            target_type: self.target_type,
            assign: self.assign_id,
            predicate: self.predicate.as_ref().map(|(_, id)| *id),
        }
    }

    /// Contribution of this property to the structural hash of its mapping.
    pub fn structural_hash(&self) -> u64 {
        StructuralHasher::new().add(&self.signature()).finish()
    }

    pub(crate) fn parts(&self) -> (Assign<T>, Option<Predicate>) {
        (
            self.assign.clone(),
            self.predicate.as_ref().map(|(p, _)| p.clone()),
        )
    }
}

impl<T> Clone for PropertyMapping<T> {
    fn clone(&self) -> Self {
        Self {
            property: self.property,
            alias: self.alias.clone(),
            target_type: self.target_type,
            assign: self.assign.clone(),
            assign_id: self.assign_id,
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> fmt::Debug for PropertyMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMapping")
            .field("property", &self.property)
            .field("alias", &self.alias)
            .field("target_type", &self.target_type)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Ordered mapping configuration of a result type.
///
/// Freely editable until it is handed to the compiler, which takes a
/// snapshot: later edits never affect an already compiled extractor.
pub struct Mapping<T> {
    properties: Vec<PropertyMapping<T>>,
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> Mapping<T> {
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            _type: PhantomData,
        }
    }

    /// Append a property mapped from the column with the same name.
    pub fn property<V, S>(self, property: &'static str, setter: S) -> Self
    where
        V: AsValue + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.with(PropertyMapping::new(property, setter))
    }

    pub fn with(mut self, mapping: PropertyMapping<T>) -> Self {
        self.properties.push(mapping);
        self
    }

    /// Reassign the column alias of `property`.
    pub fn set_alias(&mut self, property: &str, alias: impl Into<Cow<'static, str>>) -> Result<()> {
        self.properties
            .iter_mut()
            .find(|p| p.property == property)
            .ok_or_else(|| {
                ArgumentError::new("property", format!("`{}` is not mapped", property))
            })?
            .set_alias(alias)
    }

    pub fn get(&self, property: &str) -> Option<&PropertyMapping<T>> {
        self.properties.iter().find(|p| p.property == property)
    }

    pub fn properties(&self) -> &[PropertyMapping<T>] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn signature(&self) -> Vec<PropertySignature> {
        self.properties.iter().map(PropertyMapping::signature).collect()
    }

    /// Order sensitive hash of the result type identity and every property.
    pub fn structural_hash(&self) -> u64 {
        let mut hasher = StructuralHasher::new();
        hasher.add(&TypeId::of::<T>()).add(any::type_name::<T>());
        for property in &self.properties {
            hasher.add(&property.structural_hash());
        }
        hasher.finish()
    }
}

impl<T: 'static> Default for Mapping<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Mapping<T> {
    fn clone(&self) -> Self {
        Self {
            properties: self.properties.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Mapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.properties).finish()
    }
}

impl<T: 'static> FromIterator<PropertyMapping<T>> for Mapping<T> {
    fn from_iter<I: IntoIterator<Item = PropertyMapping<T>>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
            _type: PhantomData,
        }
    }
}
