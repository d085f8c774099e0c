//! Model registry: the top-level model types emitted for one API.
//!
//! A registry lives for exactly one API's generation pass. It owns every
//! top-level model class; nested types are owned by their enclosing class.

use crate::descriptor::ClassDescriptor;
use crate::error::CodegenError;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ModelRegistry {
    classes: BTreeMap<String, ClassDescriptor>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a finished top-level class under its simple name.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError::DuplicateType` if a class of the same name was
    /// already registered; the existing entry is left untouched.
    pub fn register(&mut self, class: ClassDescriptor) -> Result<(), CodegenError> {
        let name: String = class.name.simple_name().to_string();
        if self.classes.contains_key(&name) {
            return Err(CodegenError::DuplicateType {
                name: class.name.to_string(),
            });
        }
        debug!(type_name = %class.name, nested = class.nested.len(), "registered model type");
        self.classes.insert(name, class);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Registered classes, ordered by name.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }
}
