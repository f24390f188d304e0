//! Deep merge of configuration trees
//!
//! Merge semantics:
//! - Mappings: deep merge recursively, union of keys
//! - Scalars: `update` wins (last-writer-wins)
//! - Sequences: `update` replaces entirely
//! - Null in `update`: replaces the base value
//! - Type mismatch: `update` wins

use crate::value::Value;

/// Merge `update` on top of `base`.
///
/// If either side is absent or not a mapping the result is `update`.
pub fn merge(base: Option<Value>, update: Value) -> Value {
    match (base, update) {
        (Some(Value::Mapping(mut base)), Value::Mapping(update)) => {
            for (key, update_value) in update {
                match base.get_mut(&key) {
                    Some(base_value) => {
                        let previous = std::mem::take(base_value);
                        *base_value = merge(Some(previous), update_value);
                    }
                    None => {
                        base.insert(key, update_value);
                    }
                }
            }
            Value::Mapping(base)
        }
        (_, update) => update,
    }
}

/// Fold `merge` left to right over `sources`.
///
/// Later sources override earlier ones leaf by leaf. An empty input yields
/// `Value::Null`.
pub fn merge_all<I>(sources: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    sources
        .into_iter()
        .fold(None, |merged, source| Some(merge(merged, source)))
        .unwrap_or_default()
}

impl Value {
    /// Merge another value into this one
    pub fn merge(&mut self, other: Value) {
        let base = std::mem::take(self);
        *self = merge(Some(base), other);
    }

    /// Create a merged value from two values (non-mutating)
    pub fn merged(mut self, other: Value) -> Value {
        self.merge(other);
        self
    }
}
