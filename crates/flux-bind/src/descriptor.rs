//! Immutable description of a store, produced by binding.

use std::fmt;
use std::rc::Rc;

use crate::definition::StoreDefinition;
use crate::mixin::StoreMixin;
use crate::runtime::ActionSet;

/// Everything a runtime needs to construct a store.
///
/// Built from the caller's [`StoreDefinition`] instead of being patched onto
/// it; the definition is moved in and owned from here on.
pub struct StoreDescriptor<S> {
    name: String,
    mixins: Vec<Rc<dyn StoreMixin>>,
    listenables: ActionSet,
    definition: StoreDefinition<S>,
}

/// Owned fields of a [`StoreDescriptor`], for runtimes consuming it.
pub struct StoreParts<S> {
    pub name: String,
    pub mixins: Vec<Rc<dyn StoreMixin>>,
    pub listenables: ActionSet,
    pub definition: StoreDefinition<S>,
}

impl<S> StoreDescriptor<S> {
    pub fn new(
        name: impl Into<String>,
        mixins: Vec<Rc<dyn StoreMixin>>,
        listenables: ActionSet,
        definition: StoreDefinition<S>,
    ) -> Self {
        Self {
            name: name.into(),
            mixins,
            listenables,
            definition,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mixins(&self) -> &[Rc<dyn StoreMixin>] {
        &self.mixins
    }

    pub fn listenables(&self) -> &ActionSet {
        &self.listenables
    }

    pub fn definition(&self) -> &StoreDefinition<S> {
        &self.definition
    }

    pub fn into_parts(self) -> StoreParts<S> {
        StoreParts {
            name: self.name,
            mixins: self.mixins,
            listenables: self.listenables,
            definition: self.definition,
        }
    }
}

impl<S> fmt::Debug for StoreDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDescriptor")
            .field("name", &self.name)
            .field("mixins", &self.mixins.iter().map(|m| m.id()).collect::<Vec<_>>())
            .field("listenables", &self.listenables.names().collect::<Vec<_>>())
            .field("definition", &self.definition)
            .finish()
    }
}
