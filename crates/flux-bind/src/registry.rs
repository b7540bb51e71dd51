//! Shared registry under which each store's actions are namespaced.

use indexmap::IndexMap;

use crate::error::{BindError, Result};
use crate::runtime::ActionSet;

/// Capability the binder needs from an API registry.
///
/// After a successful [`add_api_actions`](Self::add_api_actions),
/// [`actions`](Self::actions) must return exactly the registered set.
pub trait ApiRegistry {
    /// Register `actions` under `name`, returning any set it replaced.
    fn add_api_actions(&mut self, name: &str, actions: ActionSet) -> Result<Option<ActionSet>>;

    fn actions(&self, name: &str) -> Option<&ActionSet>;
}

/// What [`ApiHolder`] does when a namespace is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Last write wins.
    #[default]
    Replace,
    /// Fail with [`BindError::NamespaceTaken`].
    Reject,
}

/// Default in-memory registry.
#[derive(Debug, Default)]
pub struct ApiHolder {
    namespaces: IndexMap<String, ActionSet>,
    policy: CollisionPolicy,
}

impl ApiHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self {
            namespaces: IndexMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Registered namespaces, in first-registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<ActionSet> {
        self.namespaces.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl ApiRegistry for ApiHolder {
    fn add_api_actions(&mut self, name: &str, actions: ActionSet) -> Result<Option<ActionSet>> {
        if self.policy == CollisionPolicy::Reject && self.namespaces.contains_key(name) {
            return Err(BindError::NamespaceTaken(name.to_string()));
        }

        let previous = self.namespaces.insert(name.to_string(), actions);
        if previous.is_some() {
            log::warn!("ApiHolder: replaced actions registered under {}", name);
        }
        Ok(previous)
    }

    fn actions(&self, name: &str) -> Option<&ActionSet> {
        self.namespaces.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ActionOptions, DispatchRuntime, LocalRuntime};

    fn actions(runtime: &LocalRuntime, names: &[&str]) -> ActionSet {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        runtime.create_actions(&names, ActionOptions::default()).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let runtime = LocalRuntime::new();
        let mut api = ApiHolder::new();
        let set = actions(&runtime, &["onA"]);

        assert!(api.add_api_actions("todos", set.clone()).unwrap().is_none());
        assert!(api.actions("todos").unwrap().ptr_eq(&set));
        assert!(api.actions("other").is_none());
    }

    #[test]
    fn test_replace_policy_is_last_write_wins() {
        let runtime = LocalRuntime::new();
        let mut api = ApiHolder::new();
        let first = actions(&runtime, &["onA"]);
        let second = actions(&runtime, &["onB"]);

        api.add_api_actions("todos", first.clone()).unwrap();
        let replaced = api.add_api_actions("todos", second.clone()).unwrap();

        assert!(replaced.unwrap().ptr_eq(&first));
        assert!(api.actions("todos").unwrap().ptr_eq(&second));
        assert_eq!(api.len(), 1);
    }

    #[test]
    fn test_reject_policy() {
        let runtime = LocalRuntime::new();
        let mut api = ApiHolder::with_policy(CollisionPolicy::Reject);
        let first = actions(&runtime, &["onA"]);

        api.add_api_actions("todos", first.clone()).unwrap();
        let err = api
            .add_api_actions("todos", actions(&runtime, &["onB"]))
            .unwrap_err();

        assert_eq!(err, BindError::NamespaceTaken("todos".to_string()));
        assert!(api.actions("todos").unwrap().ptr_eq(&first));
    }

    #[test]
    fn test_remove() {
        let runtime = LocalRuntime::new();
        let mut api = ApiHolder::new();
        api.add_api_actions("a", actions(&runtime, &[])).unwrap();
        api.add_api_actions("b", actions(&runtime, &[])).unwrap();

        assert!(api.remove("a").is_some());
        assert_eq!(api.names().collect::<Vec<_>>(), vec!["b"]);
    }
}
