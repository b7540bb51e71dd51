//! # flux-bind
//!
//! Convention-driven action and store binding for a Flux-style dispatch
//! runtime.
//!
//! Two entry points:
//!
//! - [`create_actions`] validates a name or list of names and creates one
//!   trigger handle per name.
//! - [`create_store`] splits a [`StoreDefinition`]'s methods into sync and
//!   async actions (by default `on...Sync` and `on...`), registers them in an
//!   [`ApiRegistry`] under the store's name and builds a [`Store`] listening
//!   to exactly those actions.
//!
//! Dispatch itself is delegated to a [`DispatchRuntime`]; [`LocalRuntime`]
//! is the single-threaded one shipped here.
//!
//! ## Usage
//!
//! ```
//! use flux_bind::{create_store, ApiHolder, ApiRegistry, BindingConfig, LocalRuntime, StoreDefinition};
//! use serde_json::json;
//!
//! let runtime = LocalRuntime::new();
//! let mut api = ApiHolder::new();
//!
//! let definition = StoreDefinition::new()
//!     .method("onAdd", |count: &mut i64, by: &serde_json::Value| *count += by.as_i64().unwrap_or(1))
//!     .method("onResetSync", |count: &mut i64, _: &serde_json::Value| *count = 0);
//! let store = create_store(&runtime, &mut api, BindingConfig::new("counter"), definition)?;
//!
//! let actions = api.actions("counter").unwrap();
//! actions.get("onAdd").unwrap().trigger(json!(2));
//! runtime.flush();
//! assert_eq!(store.state(), 2);
//!
//! actions.get("onResetSync").unwrap().trigger(json!(null));
//! assert_eq!(store.state(), 0);
//! # Ok::<(), flux_bind::BindError>(())
//! ```

mod actions;
mod binder;
mod convention;
mod definition;
mod descriptor;
mod error;
mod mixin;
mod names;
mod registry;
pub mod runtime;
mod selector;

pub use actions::create_actions;
pub use binder::{classify, create_store, merge_actions, BindingConfig, Partition, StoreBinder};
pub use convention::NamingConvention;
pub use definition::{Handler, MethodKind, StoreDefinition};
pub use descriptor::{StoreDescriptor, StoreParts};
pub use error::{BindError, Result};
pub use mixin::{NameMixin, StoreMeta, StoreMixin, STORE_NAME_FIELD};
pub use names::ActionNames;
pub use registry::{ApiHolder, ApiRegistry, CollisionPolicy};
pub use runtime::{
    Action, ActionOptions, ActionSet, DispatchRuntime, ListenerId, LocalRuntime, Payload, Store,
    SubscriptionId,
};
pub use selector::{ActionSelector, NamePredicate};
