//! Bind implementations for standard library types

use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{
    Bind, MapKey, MapSlot, OptionalSlot, ScalarMismatch, ScalarSlot, SequenceSlot, Target,
};
use crate::error::Result;
use crate::value::Value;

macro_rules! bind_integer {
    ($($ty:ty),*) => {$(
        impl Bind for $ty {
            fn target(&mut self) -> Target<'_> {
                Target::Scalar(self)
            }
        }

        impl ScalarSlot for $ty {
            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }

            fn assign(&mut self, value: &Value) -> std::result::Result<(), ScalarMismatch> {
                *self = match value {
                    Value::Integer(i) => {
                        <$ty>::try_from(*i).map_err(|_| ScalarMismatch::OutOfRange)?
                    }
                    Value::Float(f) => {
                        // fractional part is truncated toward zero
                        let t = f.trunc();
                        if !t.is_finite()
                            || t < <$ty>::MIN as f64
                            || t >= <$ty>::MAX as f64 + 1.0
                        {
                            return Err(ScalarMismatch::OutOfRange);
                        }
                        t as $ty
                    }
                    _ => return Err(ScalarMismatch::Incompatible),
                };
                Ok(())
            }
        }

        impl MapKey for $ty {
            fn from_key(key: &str) -> Option<Self> {
                key.parse().ok()
            }
        }
    )*};
}

bind_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! bind_float {
    ($($ty:ty),*) => {$(
        impl Bind for $ty {
            fn target(&mut self) -> Target<'_> {
                Target::Scalar(self)
            }
        }

        impl ScalarSlot for $ty {
            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }

            fn assign(&mut self, value: &Value) -> std::result::Result<(), ScalarMismatch> {
                *self = match value {
                    Value::Integer(i) => *i as $ty,
                    Value::Float(f) => {
                        let t = *f as $ty;
                        // finite sources must not saturate to infinity
                        if f.is_finite() && !t.is_finite() {
                            return Err(ScalarMismatch::OutOfRange);
                        }
                        t
                    }
                    _ => return Err(ScalarMismatch::Incompatible),
                };
                Ok(())
            }
        }
    )*};
}

bind_float!(f32, f64);

impl Bind for bool {
    fn target(&mut self) -> Target<'_> {
        Target::Scalar(self)
    }
}

impl ScalarSlot for bool {
    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn assign(&mut self, value: &Value) -> std::result::Result<(), ScalarMismatch> {
        match value {
            Value::Bool(b) => {
                *self = *b;
                Ok(())
            }
            _ => Err(ScalarMismatch::Incompatible),
        }
    }
}

impl Bind for String {
    fn target(&mut self) -> Target<'_> {
        Target::Scalar(self)
    }
}

impl ScalarSlot for String {
    fn type_name(&self) -> &'static str {
        "String"
    }

    fn assign(&mut self, value: &Value) -> std::result::Result<(), ScalarMismatch> {
        match value {
            Value::String(s) => {
                self.clone_from(s);
                Ok(())
            }
            _ => Err(ScalarMismatch::Incompatible),
        }
    }
}

impl MapKey for String {
    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

impl Bind for PathBuf {
    fn target(&mut self) -> Target<'_> {
        Target::Scalar(self)
    }
}

impl ScalarSlot for PathBuf {
    fn type_name(&self) -> &'static str {
        "PathBuf"
    }

    fn assign(&mut self, value: &Value) -> std::result::Result<(), ScalarMismatch> {
        match value {
            Value::String(s) => {
                *self = PathBuf::from(s);
                Ok(())
            }
            _ => Err(ScalarMismatch::Incompatible),
        }
    }
}

impl Bind for Value {
    fn target(&mut self) -> Target<'_> {
        Target::Opaque(self)
    }
}

impl<T: Bind + Default> Bind for Option<T> {
    fn target(&mut self) -> Target<'_> {
        Target::Optional(self)
    }
}

impl<T: Bind + Default> OptionalSlot for Option<T> {
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn reset(&mut self) {
        *self = None;
    }

    fn get_or_allocate(&mut self) -> &mut dyn Bind {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Bind + ?Sized> Bind for Box<T> {
    fn target(&mut self) -> Target<'_> {
        (**self).target()
    }
}

impl<T: Bind> Bind for Arc<T> {
    fn target(&mut self) -> Target<'_> {
        match Arc::get_mut(self) {
            Some(inner) => inner.target(),
            None => Target::Shared(type_name::<Self>()),
        }
    }
}

impl<T: Bind> Bind for Rc<T> {
    fn target(&mut self) -> Target<'_> {
        match Rc::get_mut(self) {
            Some(inner) => inner.target(),
            None => Target::Shared(type_name::<Self>()),
        }
    }
}

impl<T: Bind + Default, const N: usize> Bind for [T; N] {
    fn target(&mut self) -> Target<'_> {
        Target::Array(self)
    }
}

impl<T: Bind + Default, const N: usize> SequenceSlot for [T; N] {
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn len(&self) -> usize {
        N
    }

    fn grow(&mut self, _len: usize) {}

    fn element(&mut self, index: usize) -> Option<&mut dyn Bind> {
        self.get_mut(index).map(|e| e as &mut dyn Bind)
    }

    fn discard_from(&mut self, index: usize) {
        for element in self.iter_mut().skip(index) {
            *element = T::default();
        }
    }
}

impl<T: Bind + Default> Bind for Vec<T> {
    fn target(&mut self) -> Target<'_> {
        Target::List(self)
    }
}

impl<T: Bind + Default> SequenceSlot for Vec<T> {
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn grow(&mut self, len: usize) {
        if Vec::len(self) < len {
            self.resize_with(len, T::default);
        }
    }

    fn element(&mut self, index: usize) -> Option<&mut dyn Bind> {
        self.get_mut(index).map(|e| e as &mut dyn Bind)
    }

    fn discard_from(&mut self, index: usize) {
        self.truncate(index);
    }

    fn assign_bytes(&mut self, bytes: &[u8]) -> bool {
        match (self as &mut dyn Any).downcast_mut::<Vec<u8>>() {
            Some(buffer) => {
                buffer.clear();
                buffer.extend_from_slice(bytes);
                true
            }
            None => false,
        }
    }
}

fn fill_default<V: Bind + Default>(
    fill: &mut dyn FnMut(&mut dyn Bind) -> Result<()>,
) -> Result<V> {
    let mut element = V::default();
    fill(&mut element)?;
    Ok(element)
}

impl<K, V, S> Bind for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash + 'static,
    V: Bind + Default,
    S: BuildHasher + 'static,
{
    fn target(&mut self) -> Target<'_> {
        Target::Map(self)
    }
}

impl<K, V, S> MapSlot for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash + 'static,
    V: Bind + Default,
    S: BuildHasher + 'static,
{
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn key_type(&self) -> &'static str {
        type_name::<K>()
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn insert_with(
        &mut self,
        key: &str,
        fill: &mut dyn FnMut(&mut dyn Bind) -> Result<()>,
    ) -> Result<bool> {
        let Some(key) = K::from_key(key) else {
            return Ok(false);
        };
        self.insert(key, fill_default(fill)?);
        Ok(true)
    }
}

impl<K, V> Bind for BTreeMap<K, V>
where
    K: MapKey + Ord + 'static,
    V: Bind + Default,
{
    fn target(&mut self) -> Target<'_> {
        Target::Map(self)
    }
}

impl<K, V> MapSlot for BTreeMap<K, V>
where
    K: MapKey + Ord + 'static,
    V: Bind + Default,
{
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn key_type(&self) -> &'static str {
        type_name::<K>()
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn insert_with(
        &mut self,
        key: &str,
        fill: &mut dyn FnMut(&mut dyn Bind) -> Result<()>,
    ) -> Result<bool> {
        let Some(key) = K::from_key(key) else {
            return Ok(false);
        };
        self.insert(key, fill_default(fill)?);
        Ok(true)
    }
}

impl<K, V, S> Bind for IndexMap<K, V, S>
where
    K: MapKey + Eq + Hash + 'static,
    V: Bind + Default,
    S: BuildHasher + 'static,
{
    fn target(&mut self) -> Target<'_> {
        Target::Map(self)
    }
}

impl<K, V, S> MapSlot for IndexMap<K, V, S>
where
    K: MapKey + Eq + Hash + 'static,
    V: Bind + Default,
    S: BuildHasher + 'static,
{
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn key_type(&self) -> &'static str {
        type_name::<K>()
    }

    fn clear(&mut self) {
        IndexMap::clear(self);
    }

    fn insert_with(
        &mut self,
        key: &str,
        fill: &mut dyn FnMut(&mut dyn Bind) -> Result<()>,
    ) -> Result<bool> {
        let Some(key) = K::from_key(key) else {
            return Ok(false);
        };
        self.insert(key, fill_default(fill)?);
        Ok(true)
    }
}
