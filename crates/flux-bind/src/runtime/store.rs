use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde_json::Value;

use super::gate::{self, HandlerGuard};
use super::{Action, ListenerId, Payload};
use crate::definition::Handler;
use crate::descriptor::StoreDescriptor;
use crate::mixin::{StoreMeta, STORE_NAME_FIELD};

type Subscriber<S> = Rc<dyn Fn(&S)>;

/// Identifies a subscriber registered with [`Store::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Binding {
    action: Action,
    listener: ListenerId,
    method: String,
}

struct StoreCell<S> {
    name: String,
    meta: StoreMeta,
    state: RefCell<S>,
    handlers: RefCell<IndexMap<String, Handler<S>>>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<S>)>>,
    next_subscriber: Cell<u64>,
    /// Emissions received while a handler or subscriber is running
    pending: RefCell<VecDeque<(String, Payload)>>,
    dispatching: Cell<bool>,
    bindings: RefCell<Vec<Binding>>,
}

impl<S> StoreCell<S> {
    fn receive(&self, method: &str, payload: &Payload) {
        self.pending
            .borrow_mut()
            .push_back((method.to_string(), payload.clone()));
        if self.dispatching.replace(true) {
            return;
        }
        let _dispatching = ResetOnDrop(&self.dispatching);

        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some((method, payload)) = next else {
                break;
            };
            self.dispatch(&method, &payload);
        }
    }

    fn dispatch(&self, method: &str, payload: &Payload) {
        {
            let mut handlers = self.handlers.borrow_mut();
            let Some(handler) = handlers.get_mut(method) else {
                log::warn!("Store {}: no handler named {}", self.name, method);
                return;
            };
            log::trace!("Store {}: {}", self.name, method);
            let _running = HandlerGuard::enter();
            let mut state = self.state.borrow_mut();
            handler(&mut *state, payload);
        }
        gate::release();
        self.notify();
    }

    fn notify(&self) {
        let subscribers: Vec<Subscriber<S>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect();
        if subscribers.is_empty() {
            return;
        }

        let state = self.state.borrow();
        for subscriber in subscribers {
            subscriber(&*state);
        }
    }
}

/// Clears the dispatching flag even if a handler unwinds.
struct ResetOnDrop<'a>(&'a Cell<bool>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<S> Drop for StoreCell<S> {
    fn drop(&mut self) {
        for binding in self.bindings.get_mut().drain(..) {
            binding.action.unlisten(binding.listener);
        }
    }
}

/// A bound store: state plus the handlers wired to its listenable actions.
///
/// Handles are cheap to clone. When the last one is dropped the store stops
/// listening to its actions.
pub struct Store<S> {
    inner: Rc<StoreCell<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Default + 'static> Store<S> {
    /// Build a store from a descriptor and subscribe it to its listenables.
    pub fn bind(descriptor: StoreDescriptor<S>) -> Self {
        let parts = descriptor.into_parts();

        let mut meta = StoreMeta::new();
        for mixin in &parts.mixins {
            mixin.apply(&parts.name, &mut meta);
        }

        let definition = parts.definition;
        let state = definition
            .get_initial_state
            .map(|init| init())
            .unwrap_or_default();
        let handlers: IndexMap<String, Handler<S>> = definition
            .methods
            .into_iter()
            .map(|(name, method)| (name, method.handler))
            .collect();

        let inner = Rc::new(StoreCell {
            name: parts.name,
            meta,
            state: RefCell::new(state),
            handlers: RefCell::new(handlers),
            subscribers: RefCell::new(Vec::new()),
            next_subscriber: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
            bindings: RefCell::new(Vec::new()),
        });

        for (action_name, action) in parts.listenables.iter() {
            let Some(method) = resolve_method(&*inner.handlers.borrow(), action_name) else {
                log::warn!(
                    "Store {}: no handler for listenable action {}",
                    inner.name,
                    action_name
                );
                continue;
            };

            let weak: Weak<StoreCell<S>> = Rc::downgrade(&inner);
            let target = method.clone();
            let listener = action.listen(move |payload| {
                if let Some(cell) = weak.upgrade() {
                    cell.receive(&target, payload);
                }
            });
            inner.bindings.borrow_mut().push(Binding {
                action: action.clone(),
                listener,
                method,
            });
        }

        log::debug!(
            "Store {}: listening to {} action(s)",
            inner.name,
            inner.bindings.borrow().len()
        );
        Self { inner }
    }
}

impl<S> Store<S> {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Bind name as published by the standard mixin.
    pub fn store_name(&self) -> Option<&str> {
        self.meta(STORE_NAME_FIELD).and_then(Value::as_str)
    }

    /// Introspection field contributed by a mixin.
    pub fn meta(&self, field: &str) -> Option<&Value> {
        self.inner.meta.get(field)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.inner.state.borrow())
    }

    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.with_state(S::clone)
    }

    /// Subscribe to state changes; called after every handled action.
    pub fn listen(&self, subscriber: impl Fn(&S) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscriber.get());
        self.inner.next_subscriber.set(self.inner.next_subscriber.get() + 1);
        let subscriber: Subscriber<S> = Rc::new(subscriber);
        self.inner.subscribers.borrow_mut().push((id, subscriber));
        id
    }

    pub fn unlisten(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
        subscribers.len() != before
    }

    /// Invoke a store method directly, action or not. Returns `false` if the
    /// store has no method with that name.
    pub fn call(&self, method: &str, payload: Payload) -> bool {
        if !self.inner.handlers.borrow().contains_key(method) {
            return false;
        }
        self.inner.receive(method, &payload);
        true
    }

    /// Names of the actions this store is subscribed to, in binding order.
    pub fn listened_actions(&self) -> Vec<String> {
        self.inner
            .bindings
            .borrow()
            .iter()
            .map(|binding| binding.action.name().to_string())
            .collect()
    }

    /// Method that handles `action`, if the store listens to it.
    pub fn handler_for(&self, action: &str) -> Option<String> {
        self.inner
            .bindings
            .borrow()
            .iter()
            .find(|binding| binding.action.name() == action)
            .map(|binding| binding.method.clone())
    }

    /// Stop listening to every action. State and subscribers are kept.
    pub fn stop_listening(&self) {
        for binding in self.inner.bindings.borrow_mut().drain(..) {
            binding.action.unlisten(binding.listener);
        }
    }
}

impl<S> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("listened_actions", &self.listened_actions())
            .finish()
    }
}

/// `on` + capitalised action name first, then the exact action name.
fn resolve_method<S>(handlers: &IndexMap<String, Handler<S>>, action: &str) -> Option<String> {
    let mut chars = action.chars();
    let first = chars.next()?;
    let prefixed = format!("on{}{}", first.to_uppercase(), chars.as_str());
    if handlers.contains_key(&prefixed) {
        return Some(prefixed);
    }

    handlers
        .contains_key(action)
        .then(|| action.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixin::{NameMixin, StoreMixin};
    use crate::runtime::{ActionOptions, DispatchRuntime, LocalRuntime};
    use crate::StoreDefinition;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bind_counter(runtime: &LocalRuntime, actions: &[&str], sync: bool) -> Store<i64> {
        let names: Vec<String> = actions.iter().map(|n| n.to_string()).collect();
        let listenables = runtime
            .create_actions(&names, ActionOptions { sync })
            .unwrap();
        let definition = StoreDefinition::new()
            .method("onAdd", |count: &mut i64, payload: &Payload| {
                *count += payload.as_i64().unwrap_or(1)
            })
            .method("onReset", |count: &mut i64, _: &Payload| *count = 0)
            .get_initial_state(|| 10);
        let mixins: Vec<Rc<dyn StoreMixin>> = vec![Rc::new(NameMixin)];
        runtime.create_store(StoreDescriptor::new("counter", mixins, listenables, definition))
    }

    #[test]
    fn test_initial_state_and_meta() {
        let runtime = LocalRuntime::new();
        let store = bind_counter(&runtime, &[], true);

        assert_eq!(store.state(), 10);
        assert_eq!(store.name(), "counter");
        assert_eq!(store.store_name(), Some("counter"));
    }

    #[test]
    fn test_default_state_without_initializer() {
        let runtime = LocalRuntime::new();
        let store: Store<Vec<String>> = runtime.create_store(StoreDescriptor::new(
            "empty",
            Vec::new(),
            Default::default(),
            StoreDefinition::new(),
        ));
        assert!(store.state().is_empty());
        assert_eq!(store.store_name(), None);
    }

    #[test]
    fn test_sync_action_updates_state_inline() {
        let runtime = LocalRuntime::new();
        let listenables = runtime
            .create_actions(&["onAdd".to_string()], ActionOptions::sync())
            .unwrap();
        let add = listenables.get("onAdd").unwrap().clone();
        let store = runtime.create_store(StoreDescriptor::new(
            "counter",
            Vec::new(),
            listenables,
            StoreDefinition::new().method("onAdd", |count: &mut i64, payload: &Payload| {
                *count += payload.as_i64().unwrap_or(1)
            }),
        ));

        add.trigger(json!(5));
        assert_eq!(store.state(), 5);
    }

    #[test]
    fn test_async_action_waits_for_flush() {
        let runtime = LocalRuntime::new();
        let store = bind_counter(&runtime, &["onAdd"], false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.listen(move |count| sink.borrow_mut().push(*count));

        let names: Vec<String> = store.listened_actions();
        assert_eq!(names, vec!["onAdd"]);

        // Trigger through the action the store listens to
        store.inner.bindings.borrow()[0].action.trigger(json!(2));
        assert_eq!(store.state(), 10);

        runtime.flush();
        assert_eq!(store.state(), 12);
        assert_eq!(*seen.borrow(), vec![12]);
    }

    #[test]
    fn test_listenable_resolves_prefixed_method() {
        let runtime = LocalRuntime::new();
        let store = bind_counter(&runtime, &["reset", "missing"], true);

        assert_eq!(store.listened_actions(), vec!["reset"]);
        assert_eq!(store.handler_for("reset"), Some("onReset".to_string()));
        assert_eq!(store.handler_for("missing"), None);
    }

    #[test]
    fn test_reentrant_emission_is_queued() {
        let runtime = LocalRuntime::new();
        let listenables = runtime
            .create_actions(&["onAddSync".to_string()], ActionOptions::sync())
            .unwrap();
        let add = listenables.get("onAddSync").unwrap().clone();
        let store = runtime.create_store(StoreDescriptor::new(
            "counter",
            Vec::new(),
            listenables,
            StoreDefinition::new().method("onAddSync", |count: &mut i64, _: &Payload| *count += 1),
        ));

        // A subscriber emitting again must not re-borrow the state mid-dispatch
        let again = add.clone();
        store.listen(move |count| {
            if *count < 3 {
                again.trigger(json!(null));
            }
        });

        add.trigger(json!(null));
        assert_eq!(store.state(), 3);
    }

    #[test]
    fn test_prefixed_method_preferred_over_exact() {
        let runtime = LocalRuntime::new();
        let listenables = runtime
            .create_actions(&["save".to_string()], ActionOptions::sync())
            .unwrap();
        let store = runtime.create_store(StoreDescriptor::new(
            "docs",
            Vec::new(),
            listenables,
            StoreDefinition::new()
                .method("save", |count: &mut i64, _: &Payload| *count += 1)
                .method("onSave", |count: &mut i64, _: &Payload| *count += 10),
        ));

        assert_eq!(store.handler_for("save"), Some("onSave".to_string()));
    }

    #[test]
    fn test_handler_emission_observed_by_other_store() {
        let runtime = LocalRuntime::new();
        let ping = runtime
            .create_actions(&["onPingSync".to_string()], ActionOptions::sync())
            .unwrap();
        let bump = runtime
            .create_actions(&["onBumpSync".to_string()], ActionOptions::sync())
            .unwrap();
        let ping_action = ping.get("onPingSync").unwrap().clone();
        let bump_action = bump.get("onBumpSync").unwrap().clone();

        let emit = ping_action.clone();
        let a: Store<i64> = runtime.create_store(StoreDescriptor::new(
            "a",
            Vec::new(),
            bump,
            StoreDefinition::new().method("onBumpSync", move |count: &mut i64, _: &Payload| {
                *count += 1;
                emit.trigger(json!(null));
            }),
        ));
        let b: Store<i64> = runtime.create_store(StoreDescriptor::new(
            "b",
            Vec::new(),
            ping,
            StoreDefinition::new().method("onPingSync", |pings: &mut i64, _: &Payload| *pings += 1),
        ));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let (sink, reader) = (Rc::clone(&seen), a.clone());
        b.listen(move |_| sink.borrow_mut().push(reader.state()));
        let (sink, reader) = (Rc::clone(&seen), a.clone());
        ping_action.listen(move |_| sink.borrow_mut().push(reader.state()));

        bump_action.trigger(json!(null));

        assert_eq!(a.state(), 1);
        assert_eq!(b.state(), 1);
        assert_eq!(*seen.borrow(), vec![1, 1]);
    }

    #[test]
    fn test_panicking_handler_does_not_stall_store() {
        let runtime = LocalRuntime::new();
        let listenables = runtime
            .create_actions(&["onAddSync".to_string()], ActionOptions::sync())
            .unwrap();
        let add = listenables.get("onAddSync").unwrap().clone();
        let store: Store<i64> = runtime.create_store(StoreDescriptor::new(
            "counter",
            Vec::new(),
            listenables,
            StoreDefinition::new().method("onAddSync", |count: &mut i64, payload: &Payload| {
                if payload.is_null() {
                    panic!("missing amount");
                }
                *count += payload.as_i64().unwrap_or(0);
            }),
        ));

        let trigger = add.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            trigger.trigger(json!(null))
        }));
        assert!(result.is_err());

        add.trigger(json!(4));
        assert_eq!(store.state(), 4);
    }

    #[test]
    fn test_subscription_ids_are_store_scoped() {
        let runtime = LocalRuntime::new();
        let store = bind_counter(&runtime, &[], true);
        let first = store.listen(|_| {});
        let second = store.listen(|_| {});

        assert_ne!(first, second);
        assert!(store.unlisten(first));
        assert!(!store.unlisten(first));
        assert!(store.unlisten(second));
    }

    #[test]
    fn test_call_plain_method() {
        let runtime = LocalRuntime::new();
        let store = bind_counter(&runtime, &[], true);

        assert!(store.call("onReset", json!(null)));
        assert_eq!(store.state(), 0);
        assert!(!store.call("nope", json!(null)));
    }

    #[test]
    fn test_drop_unlistens() {
        let runtime = LocalRuntime::new();
        let listenables = runtime
            .create_actions(&["onAdd".to_string()], ActionOptions::sync())
            .unwrap();
        let add = listenables.get("onAdd").unwrap().clone();
        let store = runtime.create_store(StoreDescriptor::new(
            "counter",
            Vec::new(),
            listenables,
            StoreDefinition::new().method("onAdd", |count: &mut i64, _: &Payload| *count += 1),
        ));
        assert_eq!(add.listener_count(), 1);

        store.stop_listening();
        assert_eq!(add.listener_count(), 0);
        assert!(store.listened_actions().is_empty());
    }

    #[test]
    fn test_last_handle_dropped_unlistens() {
        let runtime = LocalRuntime::new();
        let listenables = runtime
            .create_actions(&["onAdd".to_string()], ActionOptions::sync())
            .unwrap();
        let add = listenables.get("onAdd").unwrap().clone();
        let store: Store<i64> = runtime.create_store(StoreDescriptor::new(
            "counter",
            Vec::new(),
            listenables,
            StoreDefinition::new().method("onAdd", |count: &mut i64, _: &Payload| *count += 1),
        ));
        let other = store.clone();

        drop(store);
        assert_eq!(add.listener_count(), 1);
        drop(other);
        assert_eq!(add.listener_count(), 0);
    }
}
