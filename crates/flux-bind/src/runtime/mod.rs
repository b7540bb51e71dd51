//! In-process dispatch runtime.
//!
//! The binder only prepares configuration; creating action handles, wiring
//! stores to them and delivering emissions happens behind [`DispatchRuntime`].
//! [`LocalRuntime`] is the single-threaded implementation shipped with the
//! crate: sync actions deliver in-line, everything else waits for
//! [`LocalRuntime::flush`].

mod action;
mod gate;
mod local;
mod store;

pub use action::{Action, ActionSet, ListenerId};
pub use local::LocalRuntime;
pub use store::{Store, SubscriptionId};

use crate::descriptor::StoreDescriptor;
use crate::error::Result;

/// Data carried by an emitted action.
pub type Payload = serde_json::Value;

/// Options applied to every action of one [`DispatchRuntime::create_actions`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionOptions {
    /// Deliver in-line with the trigger call instead of deferring.
    pub sync: bool,
}

impl ActionOptions {
    pub fn sync() -> Self {
        Self { sync: true }
    }
}

/// The dispatch/store runtime the binder delegates to.
///
/// Implementations must keep the order of `names` and create exactly one
/// handle per name.
pub trait DispatchRuntime {
    fn create_actions(&self, names: &[String], options: ActionOptions) -> Result<ActionSet>;

    fn create_store<S: Default + 'static>(&self, descriptor: StoreDescriptor<S>) -> Store<S>;
}
