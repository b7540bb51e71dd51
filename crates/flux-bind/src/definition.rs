//! Store definitions: named handlers plus an optional initial state.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{BindError, Result};
use crate::runtime::Payload;

/// Handler invoked when an action the store listens to is emitted.
pub type Handler<S> = Box<dyn FnMut(&mut S, &Payload)>;

/// Declared dispatch kind of a store method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    /// Classified by the binding's selectors.
    #[default]
    Undeclared,
    /// Always a sync action, unless an explicit sync name list overrides it.
    Sync,
    /// Always an async action, unless an explicit async name list overrides it.
    Async,
    /// Never an action.
    Plain,
}

pub(crate) struct Method<S> {
    pub(crate) kind: MethodKind,
    pub(crate) handler: Handler<S>,
}

/// Methods of a store, in declaration order.
pub struct StoreDefinition<S> {
    pub(crate) methods: IndexMap<String, Method<S>>,
    pub(crate) get_initial_state: Option<Box<dyn FnOnce() -> S>>,
}

impl<S> Default for StoreDefinition<S> {
    fn default() -> Self {
        Self {
            methods: IndexMap::new(),
            get_initial_state: None,
        }
    }
}

impl<S> StoreDefinition<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method whose role is decided by the naming convention.
    pub fn method(
        self,
        name: impl Into<String>,
        handler: impl FnMut(&mut S, &Payload) + 'static,
    ) -> Self {
        self.with_kind(name, MethodKind::Undeclared, handler)
    }

    pub fn sync_action(
        self,
        name: impl Into<String>,
        handler: impl FnMut(&mut S, &Payload) + 'static,
    ) -> Self {
        self.with_kind(name, MethodKind::Sync, handler)
    }

    pub fn async_action(
        self,
        name: impl Into<String>,
        handler: impl FnMut(&mut S, &Payload) + 'static,
    ) -> Self {
        self.with_kind(name, MethodKind::Async, handler)
    }

    /// Add a method that is never turned into an action.
    pub fn plain(
        self,
        name: impl Into<String>,
        handler: impl FnMut(&mut S, &Payload) + 'static,
    ) -> Self {
        self.with_kind(name, MethodKind::Plain, handler)
    }

    /// Add a method with an explicit kind. A later method with the same name
    /// replaces the earlier one but keeps its position.
    pub fn with_kind(
        mut self,
        name: impl Into<String>,
        kind: MethodKind,
        handler: impl FnMut(&mut S, &Payload) + 'static,
    ) -> Self {
        self.methods.insert(
            name.into(),
            Method {
                kind,
                handler: Box::new(handler),
            },
        );
        self
    }

    pub fn get_initial_state(mut self, init: impl FnOnce() -> S + 'static) -> Self {
        self.get_initial_state = Some(Box::new(init));
        self
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub(crate) fn methods_of_kind(&self) -> impl Iterator<Item = (&str, MethodKind)> {
        self.methods
            .iter()
            .map(|(name, method)| (name.as_str(), method.kind))
    }

    pub fn kind_of(&self, name: &str) -> Option<MethodKind> {
        self.methods.get(name).map(|method| method.kind)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.methods.keys().any(String::is_empty) {
            return Err(BindError::invalid("store definition method names must be non-empty"));
        }
        Ok(())
    }
}

impl<S> fmt::Debug for StoreDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDefinition")
            .field("methods", &self.methods_of_kind().collect::<Vec<_>>())
            .field("get_initial_state", &self.get_initial_state.is_some())
            .finish()
    }
}
