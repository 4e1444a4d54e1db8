use crate::{Command, Parameter, write_value};
use std::{
    fmt::{self, Display},
    hash::Hash,
};
use xxhash_rust::xxh3::Xxh3;

/// 128 bit key addressing the result cache.
///
/// Derived from the parameter names and their rendered values, in order.
/// Collisions are an accepted risk of the hash function: two distinct
/// parameter sets producing the same fingerprint would share a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u128);

impl Fingerprint {
    const VERSION: u8 = 1;

    /// Fingerprint of a parameter list alone.
    pub fn of_parameters(parameters: &[Parameter]) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&[Self::VERSION]);
        feed_parameters(&mut hasher, parameters);
        Self(hasher.digest128())
    }

    /// Fingerprint of a built command: its text and kind followed by its parameters.
    pub fn of_command(command: &Command) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&[Self::VERSION]);
        feed_str(&mut hasher, command.command_text());
        hasher.update(&[command.kind() as u8]);
        feed_parameters(&mut hasher, command.parameters());
        Self(hasher.digest128())
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

///
/// Canonical byte representation
///
/// Every string is length prefixed so that concatenations cannot alias
/// (`"ab" + "c"` and `"a" + "bc"` feed different bytes), values are prefixed
/// by their type tag so that `5` and `'5'` differ.
///

#[inline]
fn feed_str(h: &mut Xxh3, s: &str) {
    h.update(&(s.len() as u64).to_be_bytes());
    h.update(s.as_bytes());
}

fn feed_parameters(h: &mut Xxh3, parameters: &[Parameter]) {
    h.update(&(parameters.len() as u64).to_be_bytes());
    let mut rendered = String::new();
    for parameter in parameters {
        feed_str(h, &parameter.name);
        feed_str(h, parameter.value.type_name());
        rendered.clear();
        write_value(&mut rendered, &parameter.value);
        feed_str(h, &rendered);
    }
}

/// Order sensitive 64 bit structural hash, the key of the compiled extractor cache.
///
/// Only a locator: the cache confirms every hit with an explicit type and
/// configuration equality check.
pub struct StructuralHasher(Xxh3);

impl StructuralHasher {
    pub fn new() -> Self {
        Self(Xxh3::new())
    }
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.hash(&mut self.0);
        self
    }
    pub fn finish(&self) -> u64 {
        self.0.digest()
    }
}

impl Default for StructuralHasher {
    fn default() -> Self {
        Self::new()
    }
}
