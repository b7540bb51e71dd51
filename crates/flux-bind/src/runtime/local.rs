use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

use super::action::Emission;
use super::{Action, ActionOptions, ActionSet, DispatchRuntime, Store};
use crate::descriptor::StoreDescriptor;
use crate::error::Result;

/// Single-threaded runtime.
///
/// Deferred triggers are sent over a channel and collected into a backlog,
/// which [`flush`](Self::flush) drains until nothing is left.
pub struct LocalRuntime {
    deferred_tx: Sender<Emission>,
    deferred_rx: Receiver<Emission>,
    backlog: RefCell<VecDeque<Emission>>,
}

impl Default for LocalRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRuntime {
    pub fn new() -> Self {
        let (deferred_tx, deferred_rx) = mpsc::channel();
        Self {
            deferred_tx,
            deferred_rx,
            backlog: RefCell::new(VecDeque::new()),
        }
    }

    fn collect(&self) {
        let mut backlog = self.backlog.borrow_mut();
        backlog.extend(self.deferred_rx.try_iter());
    }

    /// Number of deferred emissions waiting for delivery.
    pub fn pending(&self) -> usize {
        self.collect();
        self.backlog.borrow().len()
    }

    /// Deliver deferred emissions in trigger order, including ones queued
    /// while flushing. Returns how many were delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            self.collect();
            let next = self.backlog.borrow_mut().pop_front();
            let Some(emission) = next else {
                break;
            };
            emission.action.deliver(&emission.payload);
            delivered += 1;
        }

        if delivered > 0 {
            log::debug!("LocalRuntime: flushed {} deferred emission(s)", delivered);
        }
        delivered
    }
}

impl DispatchRuntime for LocalRuntime {
    fn create_actions(&self, names: &[String], options: ActionOptions) -> Result<ActionSet> {
        let mut set = ActionSet::new();
        for name in names {
            set.insert(Action::new(name.clone(), options.sync, self.deferred_tx.clone()));
        }
        Ok(set)
    }

    fn create_store<S: Default + 'static>(&self, descriptor: StoreDescriptor<S>) -> Store<S> {
        Store::bind(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::rc::Rc;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_create_actions_keeps_order_and_flag() {
        let runtime = LocalRuntime::new();
        let set = runtime
            .create_actions(&names(&["onB", "onA"]), ActionOptions::sync())
            .unwrap();

        assert_eq!(set.names().collect::<Vec<_>>(), vec!["onB", "onA"]);
        assert!(set.iter().all(|(_, action)| action.is_sync()));
    }

    #[test]
    fn test_flush_delivers_in_trigger_order() {
        let runtime = LocalRuntime::new();
        let set = runtime
            .create_actions(&names(&["onA", "onB"]), ActionOptions::default())
            .unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for (name, action) in set.iter() {
            let sink = Rc::clone(&seen);
            let name = name.to_string();
            action.listen(move |payload| sink.borrow_mut().push((name.clone(), payload.clone())));
        }

        set.get("onB").unwrap().trigger(json!(1));
        set.get("onA").unwrap().trigger(json!(2));
        assert_eq!(runtime.pending(), 2);
        assert!(seen.borrow().is_empty());

        assert_eq!(runtime.flush(), 2);
        assert_eq!(
            *seen.borrow(),
            vec![("onB".to_string(), json!(1)), ("onA".to_string(), json!(2))]
        );
        assert_eq!(runtime.pending(), 0);
    }

    #[test]
    fn test_flush_drains_emissions_queued_during_flush() {
        let runtime = LocalRuntime::new();
        let set = runtime
            .create_actions(&names(&["onPing", "onPong"]), ActionOptions::default())
            .unwrap();
        let pong = set.get("onPong").unwrap().clone();
        set.get("onPing")
            .unwrap()
            .listen(move |payload| pong.trigger(payload.clone()));

        set.get("onPing").unwrap().trigger(json!(null));

        assert_eq!(runtime.flush(), 2);
        assert_eq!(runtime.flush(), 0);
    }
}
