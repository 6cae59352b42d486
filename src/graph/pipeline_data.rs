//! Typed data shared between passes of one pipeline.
//!
//! A pass publishes a value during `setup` or `execute`, and any later pass reads it back using only its type.
//! At most one value of each type can be stored at a time.
//!
//! # Example
//! ```
//! use deimos::prelude::*;
//!
//! #[derive(Default)]
//! struct GBufferLayout {
//!     attachments: u32,
//! }
//!
//! let mut data = PipelineData::new();
//! data.create::<GBufferLayout>()?.attachments = 3;
//! assert_eq!(data.get::<GBufferLayout>()?.attachments, 3);
//! // Publishing the same type twice is an error.
//! assert!(data.create::<GBufferLayout>().is_err());
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use anyhow::Result;

use crate::Error;

/// Stores at most one instance per type. This is a communication channel between passes of the same frame,
/// not a cache: values are never evicted, and creating a value that already exists fails.
#[derive(Default)]
pub struct PipelineData {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl std::fmt::Debug for PipelineData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineData").field("len", &self.entries.len()).finish()
    }
}

impl PipelineData {
    /// Create an empty data container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a default constructed `T` and return it.
    /// # Errors
    /// * Fails with [`Error::DuplicateData`] if a value of type `T` is already stored.
    pub fn create<T: Any + Default>(&mut self) -> Result<&mut T> {
        self.set(T::default())
    }

    /// Store the given value and return a reference to it.
    /// # Errors
    /// * Fails with [`Error::DuplicateData`] if a value of type `T` is already stored.
    pub fn set<T: Any>(&mut self, value: T) -> Result<&mut T> {
        match self.entries.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => Err(anyhow::Error::from(Error::DuplicateData(type_name::<T>()))),
            Entry::Vacant(slot) => slot
                .insert(Box::new(value))
                .downcast_mut::<T>()
                .ok_or_else(|| Error::Uncategorized("Pipeline data stored under the wrong type id").into()),
        }
    }

    /// Get the stored value of type `T`.
    /// # Errors
    /// * Fails with [`Error::MissingData`] if no value of type `T` is stored.
    pub fn get<T: Any>(&self) -> Result<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or_else(|| Error::MissingData(type_name::<T>()).into())
    }

    /// Get mutable access to the stored value of type `T`.
    /// # Errors
    /// * Fails with [`Error::MissingData`] if no value of type `T` is stored.
    pub fn get_mut<T: Any>(&mut self) -> Result<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
            .ok_or_else(|| Error::MissingData(type_name::<T>()).into())
    }

    /// Whether a value of type `T` is stored.
    pub fn has<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Remove the value of type `T`, returning it if there was one.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.entries
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Remove all stored values.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Amount of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
