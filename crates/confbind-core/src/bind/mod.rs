//! Binding of configuration values onto typed Rust values
//!
//! A bind target describes its own shape through [`Bind::target`], which
//! returns one of a closed set of [`Target`] handles. The [`Binder`] walks a
//! [`Value`] tree and the target side by side, dispatching on the shape of
//! both:
//!
//! - sequences go to the array/list handler
//! - mappings go to the struct, map or interface handler
//! - everything else goes to the scalar handler
//!
//! Standard library types (scalars, `Option`, `Box`, `Arc`, `Rc`, arrays,
//! `Vec`, `HashMap`, `BTreeMap`) and `IndexMap` implement [`Bind`] out of the
//! box. Structs declare their field table with [`bind_struct!`](crate::bind_struct),
//! and polymorphic slots use [`Interface`].

mod impls;
mod interface;

pub use interface::{Capability, Interface};

use indexmap::IndexMap;

use crate::error::{Error, Result, ValueErrorKind};
use crate::registry::{Instance, TypeRegistry};
use crate::value::Value;

/// Mapping key naming the registered type of an interface value
pub const TYPE_KEY: &str = "type";

/// A value that can be populated from configuration data
pub trait Bind: std::any::Any {
    /// Describe the shape of this value for the binder
    fn target(&mut self) -> Target<'_>;
}

/// A writable handle to a bind target, by shape
pub enum Target<'a> {
    /// bool, integers, floats, strings
    Scalar(&'a mut dyn ScalarSlot),
    /// A nullable wrapper allocated on demand
    Optional(&'a mut dyn OptionalSlot),
    /// A struct with named fields
    Struct(&'a mut dyn StructSlot),
    /// A fixed-length sequence
    Array(&'a mut dyn SequenceSlot),
    /// A growable sequence
    List(&'a mut dyn SequenceSlot),
    /// A string or integer keyed map
    Map(&'a mut dyn MapSlot),
    /// An empty polymorphic slot that needs a registered type
    Interface(&'a mut dyn InterfaceSlot),
    /// Accepts the configuration value verbatim
    Opaque(&'a mut Value),
    /// A handle that is not uniquely owned and cannot be written through
    Shared(&'static str),
}

impl Target<'_> {
    /// Name of the target type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Target::Scalar(s) => s.type_name(),
            Target::Optional(s) => s.type_name(),
            Target::Struct(s) => s.type_name(),
            Target::Array(s) | Target::List(s) => s.type_name(),
            Target::Map(s) => s.type_name(),
            Target::Interface(s) => s.interface_name(),
            Target::Opaque(_) => std::any::type_name::<Value>(),
            Target::Shared(name) => *name,
        }
    }
}

/// Why a scalar could not be assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScalarMismatch {
    #[error("the value kind cannot be converted")]
    Incompatible,
    #[error("the value is out of range")]
    OutOfRange,
}

/// A primitive value
pub trait ScalarSlot {
    fn type_name(&self) -> &'static str;

    /// Convert `value` and store it. Never called with `Value::Null`.
    fn assign(&mut self, value: &Value) -> std::result::Result<(), ScalarMismatch>;
}

/// A nullable wrapper
pub trait OptionalSlot {
    fn type_name(&self) -> &'static str;

    /// Reset to the empty state
    fn reset(&mut self);

    /// The wrapped value, allocated with its default if empty
    fn get_or_allocate(&mut self) -> &mut dyn Bind;
}

/// Result of looking up a struct field by name
pub enum Field<'a> {
    Writable(&'a mut dyn Bind),
    ReadOnly,
    Missing,
}

/// A struct with a field table
pub trait StructSlot {
    fn type_name(&self) -> &'static str;

    /// Look up a field by its exact name
    fn field(&mut self, name: &str) -> Field<'_>;
}

/// A fixed-length or growable sequence
pub trait SequenceSlot {
    fn type_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow to at least `len` elements, keeping existing ones in place.
    /// Fixed-length sequences ignore this.
    fn grow(&mut self, len: usize);

    fn element(&mut self, index: usize) -> Option<&mut dyn Bind>;

    /// Drop everything from `index` on. Fixed-length sequences reset those
    /// elements to their default instead.
    fn discard_from(&mut self, index: usize);

    /// Store a string as raw bytes. Only byte buffers accept this.
    fn assign_bytes(&mut self, _bytes: &[u8]) -> bool {
        false
    }
}

/// A key type that can be parsed from a mapping key
pub trait MapKey: Sized {
    fn from_key(key: &str) -> Option<Self>;
}

/// An associative container
pub trait MapSlot {
    fn type_name(&self) -> &'static str;

    fn key_type(&self) -> &'static str;

    fn clear(&mut self);

    /// Convert `key`, let `fill` populate a fresh default element and insert
    /// it. Returns `Ok(false)` if the key cannot be converted.
    fn insert_with(
        &mut self,
        key: &str,
        fill: &mut dyn FnMut(&mut dyn Bind) -> Result<()>,
    ) -> Result<bool>;
}

/// An empty polymorphic slot
pub trait InterfaceSlot {
    /// Name of the capability the slot requires
    fn interface_name(&self) -> &'static str;

    fn reset(&mut self);

    /// Check that `instance` provides the capability, store it and return it
    /// for field binding.
    fn install(&mut self, instance: Instance, registry: &TypeRegistry) -> Result<&mut dyn Bind>;
}

/// Declare the field table of a struct so it can be bound from a mapping.
///
/// Fields listed in the main block are writable; fields in the optional
/// `readonly` block are recognized but rejected. Any other key is unknown.
///
/// ```
/// use confbind_core::{bind_struct, Config};
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
///     id: u64,
/// }
///
/// bind_struct!(Server { host, port } readonly { id });
///
/// let config = Config::from_json(r#"{"host": "localhost", "port": 8080}"#).unwrap();
/// let mut server = Server::default();
/// config.configure(&mut server).unwrap();
/// assert_eq!(server.port, 8080);
/// ```
#[macro_export]
macro_rules! bind_struct {
    ($ty:ty { $($field:ident),* $(,)? } $(readonly { $($readonly:ident),* $(,)? })?) => {
        impl $crate::Bind for $ty {
            fn target(&mut self) -> $crate::Target<'_> {
                $crate::Target::Struct(self)
            }
        }

        impl $crate::bind::StructSlot for $ty {
            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }

            fn field(&mut self, name: &str) -> $crate::bind::Field<'_> {
                match name {
                    $(stringify!($field) => $crate::bind::Field::Writable(&mut self.$field),)*
                    $($(stringify!($readonly) => $crate::bind::Field::ReadOnly,)*)?
                    _ => $crate::bind::Field::Missing,
                }
            }
        }
    };
}

/// Walks a configuration value and a bind target together
pub struct Binder<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Binder<'r> {
    /// Create a binder that resolves interface slots through `registry`
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Bind `source` onto a caller-supplied root target.
    ///
    /// Unlike [`Binder::bind`], a root that cannot be written through is a
    /// target error rather than a value error.
    pub fn bind_root(&self, target: &mut dyn Bind, source: &Value, path: &str) -> Result<()> {
        if let Target::Shared(name) = target.target() {
            return Err(Error::target(format!(
                "{} is shared and cannot be configured",
                name
            )));
        }
        self.bind(target, source, path)
    }

    /// Bind `source` onto `target`. `path` is used for error reporting only.
    pub fn bind(&self, target: &mut dyn Bind, source: &Value, path: &str) -> Result<()> {
        match target.target() {
            Target::Optional(slot) => {
                if source.is_null() {
                    slot.reset();
                    Ok(())
                } else {
                    self.bind(slot.get_or_allocate(), source, path)
                }
            }
            Target::Shared(name) => Err(Error::value(
                path,
                ValueErrorKind::SharedHandle {
                    target: name.to_string(),
                },
            )),
            target => match source {
                Value::Sequence(items) => self.bind_sequence(target, source, items, path),
                Value::Mapping(map) => self.bind_mapping(target, source, map, path),
                _ => self.bind_scalar(target, source, path),
            },
        }
    }

    fn bind_sequence(
        &self,
        target: Target<'_>,
        source: &Value,
        items: &[Value],
        path: &str,
    ) -> Result<()> {
        match target {
            Target::Opaque(slot) => {
                *slot = source.clone();
                Ok(())
            }
            Target::Array(slot) => {
                // excess source elements are dropped
                let n = items.len().min(slot.len());
                self.bind_elements(slot, &items[..n], path)?;
                slot.discard_from(n);
                Ok(())
            }
            Target::List(slot) => {
                slot.grow(items.len());
                self.bind_elements(slot, items, path)?;
                slot.discard_from(items.len());
                Ok(())
            }
            other => Err(shape_mismatch(source, &other, path)),
        }
    }

    fn bind_elements(
        &self,
        slot: &mut dyn SequenceSlot,
        items: &[Value],
        path: &str,
    ) -> Result<()> {
        let type_name = slot.type_name();
        for (i, item) in items.iter().enumerate() {
            let child = child_path(path, &i.to_string());
            let element = slot.element(i).ok_or_else(|| {
                Error::internal(format!("{} has no element at index {}", type_name, i))
                    .with_path(&child)
            })?;
            self.bind(element, item, &child)?;
        }
        Ok(())
    }

    fn bind_mapping(
        &self,
        target: Target<'_>,
        source: &Value,
        map: &IndexMap<String, Value>,
        path: &str,
    ) -> Result<()> {
        match target {
            Target::Interface(slot) => self.bind_interface(slot, map, path),
            Target::Struct(slot) => self.bind_struct(slot, map, path),
            Target::Map(slot) => self.bind_map(slot, map, path),
            Target::Opaque(slot) => {
                *slot = source.clone();
                Ok(())
            }
            other => Err(shape_mismatch(source, &other, path)),
        }
    }

    fn bind_struct(
        &self,
        slot: &mut dyn StructSlot,
        map: &IndexMap<String, Value>,
        path: &str,
    ) -> Result<()> {
        let type_name = slot.type_name();
        for (key, value) in map {
            if key == TYPE_KEY {
                continue;
            }
            let child = child_path(path, key);
            match slot.field(key) {
                Field::Writable(field) => self.bind(field, value, &child)?,
                Field::ReadOnly => {
                    return Err(Error::value(
                        child,
                        ValueErrorKind::UnwritableField {
                            field: key.clone(),
                            target: type_name.to_string(),
                        },
                    ))
                }
                Field::Missing => {
                    return Err(Error::value(
                        child,
                        ValueErrorKind::UnknownField {
                            field: key.clone(),
                            target: type_name.to_string(),
                        },
                    ))
                }
            }
        }
        Ok(())
    }

    fn bind_map(
        &self,
        slot: &mut dyn MapSlot,
        map: &IndexMap<String, Value>,
        path: &str,
    ) -> Result<()> {
        let key_type = slot.key_type();
        for (key, value) in map {
            let child = child_path(path, key);
            let inserted = slot.insert_with(key, &mut |element| self.bind(element, value, &child))?;
            if !inserted {
                return Err(Error::value(
                    child,
                    ValueErrorKind::IncompatibleKey {
                        key: key.clone(),
                        target: key_type.to_string(),
                    },
                ));
            }
        }
        Ok(())
    }

    fn bind_interface(
        &self,
        slot: &mut dyn InterfaceSlot,
        map: &IndexMap<String, Value>,
        path: &str,
    ) -> Result<()> {
        let name = match map.get(TYPE_KEY) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(Error::value(
                    path,
                    ValueErrorKind::InvalidTypeTag {
                        found: other.type_name().to_string(),
                    },
                ))
            }
            None => return Err(Error::value(path, ValueErrorKind::MissingTypeTag)),
        };

        let interface = slot.interface_name();
        let instance = self
            .registry
            .construct(name)
            .map_err(|e| e.with_path(path))?;
        log::trace!(
            "Constructed '{}' ({}) for {} at '{}'",
            name,
            instance.type_name(),
            interface,
            path
        );

        let concrete = slot
            .install(instance, self.registry)
            .map_err(|e| e.with_path(path))?;
        match concrete.target() {
            Target::Struct(fields) => self.bind_struct(fields, map, path),
            other => Err(Error::value(
                path,
                ValueErrorKind::ShapeMismatch {
                    found: "mapping".into(),
                    target: other.type_name().to_string(),
                },
            )),
        }
    }

    fn bind_scalar(&self, target: Target<'_>, source: &Value, path: &str) -> Result<()> {
        if source.is_null() {
            match target {
                Target::Array(slot) | Target::List(slot) => slot.discard_from(0),
                Target::Map(slot) => slot.clear(),
                Target::Interface(slot) => slot.reset(),
                Target::Opaque(slot) => *slot = Value::Null,
                // null never erases a scalar or struct default
                _ => {}
            }
            return Ok(());
        }

        match target {
            Target::Scalar(slot) => {
                let target_name = slot.type_name();
                slot.assign(source).map_err(|mismatch| match mismatch {
                    ScalarMismatch::Incompatible => Error::value(
                        path,
                        ValueErrorKind::IncompatibleScalar {
                            found: source.type_name().to_string(),
                            target: target_name.to_string(),
                        },
                    ),
                    ScalarMismatch::OutOfRange => Error::value(
                        path,
                        ValueErrorKind::NumericOverflow {
                            value: source.to_string(),
                            target: target_name.to_string(),
                        },
                    ),
                })
            }
            Target::Opaque(slot) => {
                *slot = source.clone();
                Ok(())
            }
            Target::List(slot) => {
                let accepted = match source {
                    Value::String(s) => slot.assign_bytes(s.as_bytes()),
                    _ => false,
                };
                if accepted {
                    Ok(())
                } else {
                    Err(Error::value(
                        path,
                        ValueErrorKind::IncompatibleScalar {
                            found: source.type_name().to_string(),
                            target: slot.type_name().to_string(),
                        },
                    ))
                }
            }
            other => Err(Error::value(
                path,
                ValueErrorKind::IncompatibleScalar {
                    found: source.type_name().to_string(),
                    target: other.type_name().to_string(),
                },
            )),
        }
    }
}

fn shape_mismatch(source: &Value, target: &Target<'_>, path: &str) -> Error {
    Error::value(
        path,
        ValueErrorKind::ShapeMismatch {
            found: source.type_name().to_string(),
            target: target.type_name().to_string(),
        },
    )
}

fn child_path(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, HashMap};
    use std::rc::Rc;
    use std::sync::Arc;

    fn json(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    fn bind<T: Bind>(target: &mut T, source: &str) -> Result<()> {
        let registry = TypeRegistry::new();
        Binder::new(&registry).bind_root(target, &json(source), "")
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Entry {
        a1: String,
        a2: i32,
    }

    bind_struct!(Entry { a1, a2 });

    #[derive(Debug, Default)]
    struct Settings {
        a0: String,
        a1: bool,
        a2: i32,
        a3: f64,
        a4: String,
        a5: Option<bool>,
        a6: Vec<i32>,
        a7: HashMap<String, i32>,
        a8: HashMap<String, Value>,
    }

    bind_struct!(Settings { a0, a1, a2, a3, a4, a5, a6, a7, a8 });

    #[derive(Debug, Default)]
    struct Inner {
        c1: i32,
        c2: String,
    }

    bind_struct!(Inner { c1, c2 });

    #[derive(Debug, Default)]
    struct Middle {
        b1: Inner,
        b2: String,
    }

    bind_struct!(Middle { b1, b2 });

    #[derive(Debug, Default)]
    struct Flag {
        b3: bool,
    }

    bind_struct!(Flag { b3 });

    #[derive(Debug, Default)]
    struct Nested {
        a1: i32,
        a2: Option<Box<Middle>>,
        a3: Vec<Flag>,
    }

    bind_struct!(Nested { a1, a2, a3 });

    #[derive(Debug, Default)]
    struct Account {
        name: String,
        id: u64,
    }

    bind_struct!(Account { name } readonly { id });

    #[test]
    fn test_scalar_targets() {
        let mut b = false;
        bind(&mut b, "true").unwrap();
        assert!(b);

        let mut i = 0i32;
        bind(&mut i, "-100").unwrap();
        assert_eq!(i, -100);

        let mut i8v = 0i8;
        bind(&mut i8v, "-10").unwrap();
        assert_eq!(i8v, -10);

        let mut i64v = 0i64;
        bind(&mut i64v, "-100000").unwrap();
        assert_eq!(i64v, -100000);

        let mut u = 0u32;
        bind(&mut u, "13").unwrap();
        assert_eq!(u, 13);

        let mut f32v = 0f32;
        bind(&mut f32v, "1.2").unwrap();
        assert_eq!(f32v, 1.2f32);

        let mut f = 0f64;
        bind(&mut f, "2.3").unwrap();
        assert_eq!(f, 2.3);

        let mut s = String::new();
        bind(&mut s, r#""abc""#).unwrap();
        assert_eq!(s, "abc");
    }

    #[test]
    fn test_float_truncates_into_integers() {
        for (source, expected) in [("10.1", 10u64), ("10.6", 10), ("10", 10)] {
            let mut u = 0u64;
            bind(&mut u, source).unwrap();
            assert_eq!(u, expected, "binding {}", source);
        }

        let mut i = 0i16;
        bind(&mut i, "-7.9").unwrap();
        assert_eq!(i, -7);
    }

    #[test]
    fn test_integer_widens_into_floats() {
        let mut f = 0f64;
        bind(&mut f, "3").unwrap();
        assert_eq!(f, 3.0);
    }

    #[test]
    fn test_numeric_overflow_is_rejected() {
        let mut u = 0u8;
        let err = bind(&mut u, "300").unwrap_err();
        assert!(matches!(
            err.value_kind(),
            Some(ValueErrorKind::NumericOverflow { .. })
        ));

        let mut unsigned = 0u32;
        assert!(bind(&mut unsigned, "-1").is_err());

        let mut small = 0i8;
        assert!(bind(&mut small, "1e10").is_err());

        let mut single = 0f32;
        let err = bind(&mut single, "1e300").unwrap_err();
        assert!(matches!(
            err.value_kind(),
            Some(ValueErrorKind::NumericOverflow { .. })
        ));
        assert_eq!(single, 0.0);

        let mut double = 0f64;
        bind(&mut double, "1e300").unwrap();
        assert_eq!(double, 1e300);
    }

    #[test]
    fn test_incompatible_scalar_names_both_types() {
        let mut b = false;
        let err = bind(&mut b, r#""yes""#).unwrap_err();

        assert_eq!(
            err.value_kind(),
            Some(&ValueErrorKind::IncompatibleScalar {
                found: "string".into(),
                target: "bool".into(),
            })
        );

        let mut s = String::new();
        assert!(bind(&mut s, "12").is_err());
    }

    #[test]
    fn test_null_leaves_scalars_untouched() {
        let mut b = true;
        bind(&mut b, "null").unwrap();
        assert!(b);

        let mut s = String::from("keep");
        bind(&mut s, "null").unwrap();
        assert_eq!(s, "keep");
    }

    #[test]
    fn test_optional_is_allocated_on_write() {
        let mut b: Option<bool> = None;
        bind(&mut b, "true").unwrap();
        assert_eq!(b, Some(true));

        let mut nested: Option<Option<String>> = None;
        bind(&mut nested, r#""abc""#).unwrap();
        assert_eq!(nested, Some(Some("abc".into())));

        let mut reset = Some(5u8);
        bind(&mut reset, "null").unwrap();
        assert_eq!(reset, None);
    }

    #[test]
    fn test_box_is_transparent() {
        let mut b = Box::new(0i32);
        bind(&mut b, "42").unwrap();
        assert_eq!(*b, 42);
    }

    #[test]
    fn test_opaque_value_is_stored_verbatim() {
        let mut v = Value::Null;
        bind(&mut v, r#""abc""#).unwrap();
        assert_eq!(v, Value::from("abc"));

        bind(&mut v, "[true, false]").unwrap();
        assert_eq!(v, json("[true, false]"));

        bind(&mut v, r#"{"k": 1}"#).unwrap();
        assert_eq!(v, json(r#"{"k": 1}"#));

        let mut opt: Option<Value> = None;
        bind(&mut opt, r#""abc""#).unwrap();
        assert_eq!(opt, Some(Value::from("abc")));
    }

    #[test]
    fn test_byte_buffer_accepts_strings() {
        let mut bytes: Vec<u8> = Vec::new();
        bind(&mut bytes, r#""abc""#).unwrap();
        assert_eq!(bytes, b"abc".to_vec());

        let mut numbers: Vec<i32> = Vec::new();
        assert!(bind(&mut numbers, r#""abc""#).is_err());
    }

    #[test]
    fn test_array_truncation_and_padding() {
        let cases: [(&str, [i32; 3]); 4] = [
            ("[1, 3, 2]", [1, 3, 2]),
            ("[1, 3, 2, 4]", [1, 3, 2]),
            ("[1, 3]", [1, 3, 0]),
            ("null", [0, 0, 0]),
        ];
        for (source, expected) in cases {
            let mut target = [7, 7, 7];
            bind(&mut target, source).unwrap();
            assert_eq!(target, expected, "binding {}", source);
        }
    }

    #[test]
    fn test_list_grows_and_shrinks() {
        let cases: [(&str, Vec<i32>); 5] = [
            ("[10, 30, 20]", vec![10, 30, 20]),
            ("[10, 30, 20, 40]", vec![10, 30, 20, 40]),
            ("[10, 30]", vec![10, 30]),
            ("null", vec![]),
            ("[10.1, 30]", vec![10, 30]),
        ];
        for (source, expected) in cases {
            let mut target = vec![0, 0, 0];
            bind(&mut target, source).unwrap();
            assert_eq!(target, expected, "binding {}", source);
        }
    }

    #[test]
    fn test_list_of_opaque_values() {
        let mut target = vec![Value::Null; 3];
        bind(&mut target, r#"[true, "abc", null, 2.1]"#).unwrap();
        assert_eq!(
            target,
            vec![
                Value::Bool(true),
                Value::from("abc"),
                Value::Null,
                Value::Float(2.1)
            ]
        );
    }

    #[test]
    fn test_list_of_structs() {
        let mut target = vec![Entry::default(); 3];
        bind(
            &mut target,
            r#"[{"a1": "a1", "a2": 1}, {"a1": "a2", "a2": 2}]"#,
        )
        .unwrap();
        assert_eq!(
            target,
            vec![
                Entry {
                    a1: "a1".into(),
                    a2: 1
                },
                Entry {
                    a1: "a2".into(),
                    a2: 2
                },
            ]
        );
    }

    #[test]
    fn test_list_elements_are_bound_in_place() {
        let mut target = vec![Entry {
            a1: "keep".into(),
            a2: 0,
        }];
        bind(&mut target, r#"[{"a2": 5}]"#).unwrap();
        assert_eq!(target[0].a1, "keep");
        assert_eq!(target[0].a2, 5);
    }

    #[test]
    fn test_sequence_element_error_carries_index() {
        let mut target: Vec<bool> = Vec::new();
        let err = bind(&mut target, r#"[true, "x"]"#).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("1"));
    }

    #[test]
    fn test_struct_from_mapping() {
        let mut settings = Settings {
            a0: "xyz".into(),
            ..Default::default()
        };
        bind(
            &mut settings,
            r#"{
                "a1": true,
                "a2": 100,
                "a3": 1.23,
                "a4": "abc",
                "a5": true,
                "a6": [3, 2],
                "a7": {"a1": 1, "a3": 3},
                "a8": {"b1": 1, "b2": "abc"}
            }"#,
        )
        .unwrap();

        assert_eq!(settings.a0, "xyz");
        assert!(settings.a1);
        assert_eq!(settings.a2, 100);
        assert_eq!(settings.a3, 1.23);
        assert_eq!(settings.a4, "abc");
        assert_eq!(settings.a5, Some(true));
        assert_eq!(settings.a6, vec![3, 2]);
        assert_eq!(settings.a7.len(), 2);
        assert_eq!(settings.a7["a1"], 1);
        assert_eq!(settings.a7["a3"], 3);
        assert_eq!(settings.a8["b1"], Value::Integer(1));
        assert_eq!(settings.a8["b2"], Value::from("abc"));
    }

    #[test]
    fn test_nested_structs() {
        let mut nested = Nested::default();
        bind(
            &mut nested,
            r#"{
                "a1": 100,
                "a2": {"b2": "v1", "b1": {"c1": 300}},
                "a3": [{"b3": true}, {"b3": false}]
            }"#,
        )
        .unwrap();

        assert_eq!(nested.a1, 100);
        let a2 = nested.a2.as_ref().unwrap();
        assert_eq!(a2.b2, "v1");
        assert_eq!(a2.b1.c1, 300);
        assert_eq!(a2.b1.c2, "");
        assert_eq!(nested.a3.len(), 2);
        assert!(nested.a3[0].b3);
        assert!(!nested.a3[1].b3);
    }

    #[test]
    fn test_unknown_field_path_includes_key() {
        let mut nested = Nested::default();
        let err = bind(&mut nested, r#"{"a2": {"b1": {"zz": 1}}}"#).unwrap_err();

        assert_eq!(err.path.as_deref(), Some("a2.b1.zz"));
        assert!(matches!(
            err.value_kind(),
            Some(ValueErrorKind::UnknownField { field, .. }) if field == "zz"
        ));
    }

    #[test]
    fn test_readonly_field_is_rejected() {
        let mut account = Account::default();
        let err = bind(&mut account, r#"{"name": "a", "id": 5}"#).unwrap_err();

        assert!(matches!(
            err.value_kind(),
            Some(ValueErrorKind::UnwritableField { field, .. }) if field == "id"
        ));
        assert_eq!(account.id, 0);
    }

    #[test]
    fn test_struct_skips_type_key() {
        let mut entry = Entry::default();
        bind(&mut entry, r#"{"type": "ignored", "a2": 4}"#).unwrap();
        assert_eq!(entry.a2, 4);
    }

    #[test]
    fn test_null_leaves_struct_untouched() {
        let mut entry = Entry {
            a1: "x".into(),
            a2: 1,
        };
        bind(&mut entry, "null").unwrap();
        assert_eq!(entry.a1, "x");
    }

    #[test]
    fn test_map_is_additive() {
        let mut map = BTreeMap::from([("old".to_string(), 1), ("b".to_string(), 9)]);
        bind(&mut map, r#"{"a": 2, "b": 3}"#).unwrap();
        assert_eq!(
            map,
            BTreeMap::from([
                ("a".to_string(), 2),
                ("b".to_string(), 3),
                ("old".to_string(), 1)
            ])
        );

        bind(&mut map, "null").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_map_entries_start_from_default() {
        let mut map = HashMap::from([(
            "e".to_string(),
            Entry {
                a1: "stale".into(),
                a2: 1,
            },
        )]);
        bind(&mut map, r#"{"e": {"a2": 2}}"#).unwrap();
        assert_eq!(map["e"].a1, "");
        assert_eq!(map["e"].a2, 2);
    }

    #[test]
    fn test_map_integer_keys() {
        let mut map: BTreeMap<u16, String> = BTreeMap::new();
        bind(&mut map, r#"{"80": "http", "443": "https"}"#).unwrap();
        assert_eq!(map[&443], "https");

        let err = bind(&mut map, r#"{"web": "http"}"#).unwrap_err();
        assert!(matches!(
            err.value_kind(),
            Some(ValueErrorKind::IncompatibleKey { .. })
        ));
        assert_eq!(err.path.as_deref(), Some("web"));
    }

    #[test]
    fn test_indexmap_target() {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
        bind(&mut map, r#"{"z": ["a"], "y": []}"#).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "y"]);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut entry = Entry::default();
        let err = bind(&mut entry, "[1, 2]").unwrap_err();
        assert!(matches!(
            err.value_kind(),
            Some(ValueErrorKind::ShapeMismatch { .. })
        ));

        let mut n = 0i32;
        assert!(bind(&mut n, r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_shared_root_is_a_target_error() {
        let mut shared = Arc::new(0i32);
        let _other = Arc::clone(&shared);
        let err = bind(&mut shared, "1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Target);
    }

    #[test]
    fn test_unique_handles_are_written_through() {
        let mut arc = Arc::new(0i32);
        bind(&mut arc, "1").unwrap();
        assert_eq!(*arc, 1);

        let mut rc: Option<Rc<String>> = None;
        bind(&mut rc, r#""abc""#).unwrap();
        assert_eq!(rc.as_deref().map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_nested_shared_handle_is_a_value_error() {
        let mut list = vec![Arc::new(0i32)];
        let _other = Arc::clone(&list[0]);
        let err = bind(&mut list, "[5]").unwrap_err();
        assert!(matches!(
            err.value_kind(),
            Some(ValueErrorKind::SharedHandle { .. })
        ));
        assert_eq!(err.path.as_deref(), Some("0"));
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "a"), "a");
        assert_eq!(child_path("a", "0"), "a.0");
    }
}
