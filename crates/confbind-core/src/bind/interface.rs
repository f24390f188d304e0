//! Polymorphic bind slots
//!
//! An [`Interface`] holds an optional boxed trait object. When empty, the
//! binder fills it with a registered type named by the `type` key of the
//! mapping being bound. When already populated, the current instance is
//! bound in place and its factory is not called again.

use std::any::type_name;
use std::fmt;

use super::{Bind, InterfaceSlot, Target};
use crate::error::Result;
use crate::registry::{Instance, TypeRegistry};

/// A trait object type that can stand in an [`Interface`] slot.
///
/// Implement it for `dyn YourTrait` (where `YourTrait: Bind`) with the
/// [`capability!`](crate::capability) macro.
pub trait Capability: 'static {
    fn as_bind(&mut self) -> &mut dyn Bind;
}

/// Implement [`Capability`] for one or more trait object types.
///
/// ```
/// use confbind_core::{capability, Bind};
///
/// trait Shape: Bind {
///     fn area(&self) -> f64;
/// }
///
/// capability!(dyn Shape);
/// ```
#[macro_export]
macro_rules! capability {
    ($(dyn $trait:path),+ $(,)?) => {$(
        impl $crate::bind::Capability for dyn $trait {
            fn as_bind(&mut self) -> &mut dyn $crate::Bind {
                self
            }
        }
    )+};
}

/// A slot for any registered type providing the capability `I`
pub struct Interface<I: ?Sized + Capability> {
    instance: Option<Box<I>>,
}

impl<I: ?Sized + Capability> Interface<I> {
    /// An empty slot
    pub fn empty() -> Self {
        Self { instance: None }
    }

    /// A slot pre-populated with `instance`
    pub fn new(instance: Box<I>) -> Self {
        Self {
            instance: Some(instance),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
    }

    pub fn get(&self) -> Option<&I> {
        self.instance.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut I> {
        self.instance.as_deref_mut()
    }

    /// Take the instance out, leaving the slot empty
    pub fn take(&mut self) -> Option<Box<I>> {
        self.instance.take()
    }

    pub fn into_inner(self) -> Option<Box<I>> {
        self.instance
    }
}

impl<I: ?Sized + Capability> Default for Interface<I> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<I: ?Sized + Capability> From<Box<I>> for Interface<I> {
    fn from(instance: Box<I>) -> Self {
        Self::new(instance)
    }
}

impl<I: ?Sized + Capability + fmt::Debug> fmt::Debug for Interface<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Interface").field(&self.instance).finish()
    }
}

impl<I: ?Sized + Capability> Bind for Interface<I> {
    fn target(&mut self) -> Target<'_> {
        match self.instance {
            Some(ref mut instance) => instance.as_bind().target(),
            None => Target::Interface(self),
        }
    }
}

impl<I: ?Sized + Capability> InterfaceSlot for Interface<I> {
    fn interface_name(&self) -> &'static str {
        type_name::<I>()
    }

    fn reset(&mut self) {
        self.instance = None;
    }

    fn install(&mut self, instance: Instance, registry: &TypeRegistry) -> Result<&mut dyn Bind> {
        let boxed = registry.cast::<I>(instance)?;
        Ok(self.instance.insert(boxed).as_bind())
    }
}
