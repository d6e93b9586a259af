//! Generator registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ComponentError, ComponentResult};
use crate::generators::{BendCircular, Compass, Mmi, Pad, Straight, Taper};
use crate::traits::Generator;

/// Generators addressable by id.
#[derive(Clone, Default)]
pub struct Library {
    generators: BTreeMap<String, Arc<dyn Generator>>,
}

impl Library {
    /// Empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with every built-in generator registered.
    pub fn standard() -> Self {
        let mut lib = Self::new();
        lib.register(Straight);
        lib.register(Taper);
        lib.register(BendCircular);
        lib.register(Compass);
        lib.register(Pad);
        lib.register(Mmi);
        lib
    }

    /// Register `generator` under its id, replacing any previous entry.
    pub fn register(&mut self, generator: impl Generator + 'static) -> &mut Self {
        self.generators
            .insert(generator.id().to_string(), Arc::new(generator));
        self
    }

    pub fn get(&self, id: &str) -> ComponentResult<Arc<dyn Generator>> {
        self.generators
            .get(id)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownGenerator { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.generators.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.generators.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("generators", &self.ids())
            .finish()
    }
}
