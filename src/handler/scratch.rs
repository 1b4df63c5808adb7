//! Per-run scratch storage keyed by typed tokens.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};

/// Typed scratch key.
///
/// The name is the storage slot; `T` is the type a handler expects to find
/// there. Two keys with the same name and different types address the same
/// slot, so reading through the wrong one is a type error, not a miss.
///
/// ```
/// use msgchain::handler::Key;
///
/// const ATTEMPTS: Key<u32> = Key::new("attempts");
/// assert_eq!(ATTEMPTS.name(), "attempts");
/// ```
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// Mutable key/value space owned by one chain run.
#[derive(Default)]
pub struct Scratch {
    values: HashMap<&'static str, Box<dyn Any + Send>>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing whatever the slot held.
    pub fn set<T: Send + 'static>(&mut self, key: &Key<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    /// Read a value. Missing slot and wrong type both yield `None`.
    pub fn get<T: 'static>(&self, key: &Key<T>) -> Option<&T> {
        self.values.get(key.name)?.downcast_ref::<T>()
    }

    /// Read a value, telling a missing slot apart from a wrong type.
    pub fn try_get<T: 'static>(&self, key: &Key<T>) -> Result<&T> {
        let value = self
            .values
            .get(key.name)
            .ok_or(Error::MissingValue { key: key.name })?;
        value.downcast_ref::<T>().ok_or(Error::ValueType {
            key: key.name,
            expected: type_name::<T>(),
        })
    }

    /// Move a value out. A value of another type is left in place.
    pub fn take<T: 'static>(&mut self, key: &Key<T>) -> Option<T> {
        self.try_take(key).ok()
    }

    /// Move a value out, telling a missing slot apart from a wrong type.
    pub fn try_take<T: 'static>(&mut self, key: &Key<T>) -> Result<T> {
        let value = self
            .values
            .remove(key.name)
            .ok_or(Error::MissingValue { key: key.name })?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                self.values.insert(key.name, value);
                Err(Error::ValueType {
                    key: key.name,
                    expected: type_name::<T>(),
                })
            }
        }
    }

    pub fn contains<T>(&self, key: &Key<T>) -> bool {
        self.values.contains_key(key.name)
    }

    /// Drop whatever the slot holds. Returns whether it held anything.
    pub fn remove<T>(&mut self, key: &Key<T>) -> bool {
        self.values.remove(key.name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Scratch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
