//! Mixins contribute introspection fields to every bound store.

use indexmap::IndexMap;
use serde_json::Value;

/// Field under which [`NameMixin`] publishes the bind name.
pub const STORE_NAME_FIELD: &str = "storeName";

/// Introspection fields exposed by a store, keyed by field name.
pub type StoreMeta = IndexMap<String, Value>;

/// Behaviour shared by bound stores.
pub trait StoreMixin {
    /// Short identifier used in logs.
    fn id(&self) -> &'static str;

    /// Add this mixin's fields for a store bound under `store_name`.
    fn apply(&self, store_name: &str, meta: &mut StoreMeta);
}

/// The standard mixin: exposes the store's bind name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameMixin;

impl StoreMixin for NameMixin {
    fn id(&self) -> &'static str {
        "name"
    }

    fn apply(&self, store_name: &str, meta: &mut StoreMeta) {
        meta.insert(STORE_NAME_FIELD.to_string(), Value::String(store_name.to_string()));
    }
}
