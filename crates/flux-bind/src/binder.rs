//! Store binding: classify a definition's methods into sync and async
//! actions, register them with the API registry and hand the resulting
//! descriptor to the runtime.

use std::rc::Rc;

use crate::actions::create_actions;
use crate::convention::NamingConvention;
use crate::definition::{MethodKind, StoreDefinition};
use crate::descriptor::StoreDescriptor;
use crate::error::{BindError, Result};
use crate::mixin::{NameMixin, StoreMixin};
use crate::names::dedup_names;
use crate::registry::ApiRegistry;
use crate::runtime::{ActionOptions, ActionSet, DispatchRuntime, Store};
use crate::selector::ActionSelector;

/// How a store is bound: its namespace and how its actions are picked.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Namespace of the store's actions within the registry
    pub name: String,
    /// Selects the async actions
    pub actions: ActionSelector,
    /// Selects the sync actions
    pub sync_actions: ActionSelector,
    /// Used by [`ActionSelector::Convention`]
    pub convention: NamingConvention,
}

impl BindingConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: ActionSelector::Convention,
            sync_actions: ActionSelector::Convention,
            convention: NamingConvention::default(),
        }
    }

    pub fn actions(mut self, selector: ActionSelector) -> Self {
        self.actions = selector;
        self
    }

    pub fn sync_actions(mut self, selector: ActionSelector) -> Self {
        self.sync_actions = selector;
        self
    }

    pub fn convention(mut self, convention: NamingConvention) -> Self {
        self.convention = convention;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(BindError::invalid("binding name should be a non-empty string"));
        }
        self.actions.validate("actions")?;
        self.sync_actions.validate("sync actions")
    }
}

/// Action names of a store, split by dispatch kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    pub sync: Vec<String>,
    pub actions: Vec<String>,
}

/// Split the definition's methods into sync and async action names.
///
/// Explicit name lists are used verbatim. Otherwise a method qualifies when
/// it is declared with the matching [`MethodKind`], or is undeclared and
/// passes the selector's predicate. Names in the sync partition never appear
/// in the async one.
pub fn classify<S>(config: &BindingConfig, definition: &StoreDefinition<S>) -> Partition {
    let convention = &config.convention;
    let sync = select(&config.sync_actions, definition, MethodKind::Sync, |name| {
        convention.is_sync_action(name)
    });
    let actions = select(&config.actions, definition, MethodKind::Async, |name| {
        convention.is_action(name)
    })
    .into_iter()
    .filter(|name| !sync.contains(name))
    .collect();

    Partition { sync, actions }
}

fn select<S>(
    selector: &ActionSelector,
    definition: &StoreDefinition<S>,
    declared: MethodKind,
    convention: impl Fn(&str) -> bool,
) -> Vec<String> {
    let matches = |name: &str| match selector {
        ActionSelector::Predicate(predicate) => predicate(name),
        _ => convention(name),
    };

    match selector {
        ActionSelector::Names(names) => dedup_names(names.clone()),
        ActionSelector::Convention | ActionSelector::Predicate(_) => definition
            .methods_of_kind()
            .filter(|(name, kind)| {
                *kind == declared || (*kind == MethodKind::Undeclared && matches(*name))
            })
            .map(|(name, _)| name.to_string())
            .collect(),
    }
}

/// Merge the sync and async sets; a name present in both is an error.
pub fn merge_actions(sync: ActionSet, actions: ActionSet) -> Result<ActionSet> {
    if let Some(name) = actions.names().find(|name| sync.contains(name)) {
        return Err(BindError::ActionCollision(name.to_string()));
    }

    let mut merged = sync;
    for (_, action) in actions {
        merged.insert(action);
    }
    Ok(merged)
}

/// Bind a store definition.
///
/// Validates the configuration and definition, creates the sync and async
/// actions, registers them under `config.name` and builds the store on the
/// runtime. Nothing is registered unless validation passes.
pub fn create_store<R, A, S>(
    runtime: &R,
    api: &mut A,
    config: BindingConfig,
    definition: StoreDefinition<S>,
) -> Result<Store<S>>
where
    R: DispatchRuntime,
    A: ApiRegistry + ?Sized,
    S: Default + 'static,
{
    config.validate()?;
    definition.validate()?;

    let partition = classify(&config, &definition);
    log::debug!(
        "Binding store {}: sync {:?}, async {:?}",
        config.name,
        partition.sync,
        partition.actions
    );

    let sync_actions = create_actions(runtime, partition.sync, ActionOptions::sync())?;
    let async_actions = create_actions(runtime, partition.actions, ActionOptions::default())?;
    let store_actions = merge_actions(sync_actions, async_actions)?;

    api.add_api_actions(&config.name, store_actions)?;
    let listenables = api
        .actions(&config.name)
        .cloned()
        .ok_or_else(|| BindError::RegistryContract(config.name.clone()))?;

    let mixins: Vec<Rc<dyn StoreMixin>> = vec![Rc::new(NameMixin)];
    let descriptor = StoreDescriptor::new(config.name, mixins, listenables, definition);
    Ok(runtime.create_store(descriptor))
}

/// A runtime and registry owned together, for binding several stores.
#[derive(Default)]
pub struct StoreBinder<R, A> {
    runtime: R,
    api: A,
}

impl<R: DispatchRuntime, A: ApiRegistry> StoreBinder<R, A> {
    pub fn new(runtime: R, api: A) -> Self {
        Self { runtime, api }
    }

    pub fn create_actions(
        &self,
        names: impl Into<crate::ActionNames>,
        options: ActionOptions,
    ) -> Result<ActionSet> {
        create_actions(&self.runtime, names, options)
    }

    pub fn create_store<S: Default + 'static>(
        &mut self,
        config: BindingConfig,
        definition: StoreDefinition<S>,
    ) -> Result<Store<S>> {
        create_store(&self.runtime, &mut self.api, config, definition)
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }
}
