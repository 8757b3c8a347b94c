// expecta-core/src/domain/expectation/registry.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::error::{ConfigError, RuntimeError};
use crate::domain::expectation::check::Check;
use crate::domain::expectation::checks;
use crate::domain::expectation::schema::{ParamSchema, Scope};
use crate::error::ExpectaError;

/// Name + scope + parameter schema + evaluation logic of one expectation type.
pub struct ExpectationDescriptor {
    name: String,
    scope: Scope,
    schema: ParamSchema,
    check: Arc<dyn Check>,
    description: String,
}

impl ExpectationDescriptor {
    pub fn new(
        name: impl Into<String>,
        scope: Scope,
        schema: ParamSchema,
        check: Arc<dyn Check>,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            schema,
            check,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    pub fn check(&self) -> &dyn Check {
        self.check.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for ExpectationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectationDescriptor")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Expectation catalog. Writable during setup, frozen once a runner owns it.
#[derive(Debug, Default)]
pub struct ExpectationRegistry {
    entries: HashMap<String, Arc<ExpectationDescriptor>>,
    order: Vec<String>,
    frozen: bool,
}

impl ExpectationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the built-in catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in checks::builtin_descriptors() {
            registry.insert(descriptor);
        }
        registry
    }

    pub fn register(&mut self, descriptor: ExpectationDescriptor) -> Result<(), ExpectaError> {
        if self.frozen {
            return Err(RuntimeError::RegistryFrozen(descriptor.name).into());
        }
        if self.entries.contains_key(&descriptor.name) {
            return Err(ConfigError::DuplicateExpectation(descriptor.name).into());
        }
        debug!(expectation = %descriptor.name, scope = %descriptor.scope, "Registering expectation");
        self.insert(descriptor);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<ExpectationDescriptor>, RuntimeError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownExpectation(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ExpectationDescriptor>> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    fn insert(&mut self, descriptor: ExpectationDescriptor) {
        self.order.push(descriptor.name.clone());
        self.entries
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }
}
