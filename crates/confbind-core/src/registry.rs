//! Registry of named types for interface slots
//!
//! Interface slots are filled by constructing the type named by the `type`
//! key of the mapping being bound. Each name maps to a factory producing a
//! fresh default instance. Which capabilities a registered type provides is
//! declared at registration time with [`Registration::implements`], since
//! trait implementations cannot be discovered at runtime.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::bind::Bind;
use crate::error::{Error, Result, ValueErrorKind};

type Factory = Box<dyn Fn() -> Box<dyn Any>>;

struct Provider {
    type_name: &'static str,
    type_id: TypeId,
    factory: Factory,
}

/// Converts an erased instance into a boxed `I`
struct Cast<I: ?Sized>(Box<dyn Fn(Box<dyn Any>) -> Option<Box<I>>>);

/// A freshly constructed instance of a registered type
pub struct Instance {
    type_name: &'static str,
    type_id: TypeId,
    value: Box<dyn Any>,
}

impl Instance {
    /// Name of the concrete type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the concrete value
    pub fn downcast<T: Any>(self) -> std::result::Result<Box<T>, Self> {
        if self.type_id != TypeId::of::<T>() {
            return Err(self);
        }
        let Self {
            type_name,
            type_id,
            value,
        } = self;
        value.downcast::<T>().map_err(|value| Self {
            type_name,
            type_id,
            value,
        })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Maps type names to factories and (concrete, capability) pairs to casts
#[derive(Default)]
pub struct TypeRegistry {
    providers: HashMap<String, Provider>,
    casts: HashMap<(TypeId, TypeId), Box<dyn Any>>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`.
    ///
    /// Registering a name twice replaces the earlier factory. The returned
    /// [`Registration`] declares which capabilities the type provides.
    pub fn register<T, F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<Registration<'_, T>>
    where
        T: Bind,
        F: Fn() -> T + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::provider(format!(
                "cannot register {} under an empty name",
                type_name::<T>()
            ))
            .with_help("Pass the name used as the \"type\" value in configuration"));
        }

        let provider = Provider {
            type_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            factory: Box::new(move || Box::new(factory()) as Box<dyn Any>),
        };
        if let Some(previous) = self.providers.insert(name.clone(), provider) {
            log::warn!(
                "Type '{}' was registered for {} and is now replaced by {}",
                name,
                previous.type_name,
                type_name::<T>()
            );
        } else {
            log::debug!("Registered type '{}' as {}", name, type_name::<T>());
        }

        Ok(Registration {
            registry: self,
            _type: PhantomData,
        })
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Construct a fresh instance of the type registered as `name`
    pub fn construct(&self, name: &str) -> Result<Instance> {
        let provider = self.providers.get(name).ok_or_else(|| {
            Error::value(
                "",
                ValueErrorKind::UnknownRegisteredType {
                    name: name.to_string(),
                },
            )
        })?;

        Ok(Instance {
            type_name: provider.type_name,
            type_id: provider.type_id,
            value: (provider.factory)(),
        })
    }

    /// Convert `instance` into the capability `I`, if it was declared
    pub fn cast<I: ?Sized + 'static>(&self, instance: Instance) -> Result<Box<I>> {
        let concrete = instance.type_name;
        let entry = self
            .casts
            .get(&(instance.type_id, TypeId::of::<I>()))
            .ok_or_else(|| {
                Error::value(
                    "",
                    ValueErrorKind::CapabilityMismatch {
                        concrete: concrete.to_string(),
                        interface: type_name::<I>().to_string(),
                    },
                )
            })?;

        let entry: &dyn Any = entry.as_ref();
        let cast = entry.downcast_ref::<Cast<I>>().ok_or_else(|| {
            Error::internal(format!(
                "cast table entry for {} has the wrong type",
                type_name::<I>()
            ))
        })?;

        (cast.0)(instance.value)
            .ok_or_else(|| Error::internal(format!("instance is not a {}", concrete)))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names())
            .field("casts", &self.casts.len())
            .finish()
    }
}

/// Handle returned by [`TypeRegistry::register`]
pub struct Registration<'r, T> {
    registry: &'r mut TypeRegistry,
    _type: PhantomData<fn() -> T>,
}

impl<T: Bind> Registration<'_, T> {
    /// Declare that `T` provides the capability `I`.
    ///
    /// `cast` is normally the identity closure `|t| t`, which the compiler
    /// accepts only if `T` actually implements the trait behind `I`.
    pub fn implements<I: ?Sized + 'static>(self, cast: fn(Box<T>) -> Box<I>) -> Self {
        let erased = Cast::<I>(Box::new(move |value: Box<dyn Any>| {
            value.downcast::<T>().ok().map(cast)
        }));
        self.registry
            .casts
            .insert((TypeId::of::<T>(), TypeId::of::<I>()), Box::new(erased));
        self
    }
}
