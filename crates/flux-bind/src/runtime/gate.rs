//! Holds back in-line deliveries that start while a store handler runs.
//!
//! A handler borrows its store's state mutably. Sync actions it triggers are
//! parked here and delivered once the outermost handler has returned, so
//! their listeners may read any store.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::{Action, Payload};

#[derive(Default)]
struct Gate {
    depth: usize,
    held: VecDeque<(Action, Payload)>,
}

thread_local! {
    static GATE: RefCell<Gate> = RefCell::new(Gate::default());
}

/// Marks a handler as running until dropped, also when it unwinds.
pub(crate) struct HandlerGuard(());

impl HandlerGuard {
    pub(crate) fn enter() -> Self {
        GATE.with(|gate| gate.borrow_mut().depth += 1);
        Self(())
    }
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        GATE.with(|gate| gate.borrow_mut().depth -= 1);
    }
}

/// Park the delivery if a handler is running. Returns `true` when parked.
pub(crate) fn hold(action: &Action, payload: &Payload) -> bool {
    GATE.with(|gate| {
        let mut gate = gate.borrow_mut();
        if gate.depth == 0 {
            return false;
        }
        gate.held.push_back((action.clone(), payload.clone()));
        true
    })
}

/// Deliver parked emissions in order once no handler is running.
pub(crate) fn release() {
    loop {
        let next = GATE.with(|gate| {
            let mut gate = gate.borrow_mut();
            if gate.depth > 0 {
                None
            } else {
                gate.held.pop_front()
            }
        });
        let Some((action, payload)) = next else {
            break;
        };
        log::trace!("Releasing held emission of {}", action.name());
        action.deliver(&payload);
    }
}
