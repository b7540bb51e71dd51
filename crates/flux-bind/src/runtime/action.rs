//! Action handles and the ordered sets they are grouped in.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use indexmap::IndexMap;

use super::{gate, Payload};

/// Identifies a listener registered on an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Payload)>;

/// A deferred trigger waiting for [`LocalRuntime::flush`](super::LocalRuntime::flush).
pub(crate) struct Emission {
    pub(crate) action: Action,
    pub(crate) payload: Payload,
}

struct ActionInner {
    name: String,
    sync: bool,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
    deferred_tx: Sender<Emission>,
}

/// A named, triggerable event handle.
///
/// Cloning is cheap; clones share listeners.
#[derive(Clone)]
pub struct Action {
    inner: Rc<ActionInner>,
}

impl Action {
    pub(crate) fn new(name: String, sync: bool, deferred_tx: Sender<Emission>) -> Self {
        Self {
            inner: Rc::new(ActionInner {
                name,
                sync,
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                deferred_tx,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether [`trigger`](Self::trigger) delivers in-line.
    pub fn is_sync(&self) -> bool {
        self.inner.sync
    }

    /// Emit the action.
    ///
    /// Sync actions reach their listeners before this returns; others are
    /// queued until the runtime is flushed.
    pub fn trigger(&self, payload: Payload) {
        if self.is_sync() {
            self.trigger_sync(payload);
            return;
        }

        let emission = Emission {
            action: self.clone(),
            payload,
        };
        if let Err(e) = self.inner.deferred_tx.send(emission) {
            log::error!("Action {}: failed to queue emission: {}", self.name(), e);
        }
    }

    /// Emit the action in-line regardless of its sync flag.
    ///
    /// Inside a store handler, delivery waits until the handler returns.
    pub fn trigger_sync(&self, payload: Payload) {
        self.deliver(&payload);
    }

    pub(crate) fn deliver(&self, payload: &Payload) {
        if gate::hold(self, payload) {
            log::trace!("Action {}: held until the running handler returns", self.name());
            return;
        }

        // Snapshot so listeners may (un)register while being called
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        log::trace!("Action {} -> {} listener(s)", self.name(), listeners.len());
        for listener in listeners {
            listener(payload);
        }
    }

    pub fn listen(&self, listener: impl Fn(&Payload) + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        let listener: Listener = Rc::new(listener);
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn unlisten(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Whether both handles refer to the same action.
    pub fn ptr_eq(&self, other: &Action) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.inner.name)
            .field("sync", &self.inner.sync)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Action handles keyed by name, in creation order.
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    actions: IndexMap<String, Action>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an action under its own name, returning the one it replaces.
    pub fn insert(&mut self, action: Action) -> Option<Action> {
        self.actions.insert(action.name().to_string(), action)
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.actions.iter().map(|(name, action)| (name.as_str(), action))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether both sets hold the same handles under the same names.
    pub fn ptr_eq(&self, other: &ActionSet) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, action)| other.get(name).is_some_and(|o| o.ptr_eq(action)))
    }
}

impl IntoIterator for ActionSet {
    type Item = (String, Action);
    type IntoIter = indexmap::map::IntoIter<String, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}
