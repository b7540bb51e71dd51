//! Selection of the sync or async partition of a store definition.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{BindError, Result};
use crate::names::{strings_from_array, validate_list};

/// Predicate over store method names.
pub type NamePredicate = Rc<dyn Fn(&str) -> bool>;

/// How one partition (sync or async) of a store's actions is chosen.
#[derive(Clone, Default)]
pub enum ActionSelector {
    /// Filter method names with the [`NamingConvention`](crate::NamingConvention).
    #[default]
    Convention,
    /// Filter method names with a custom predicate.
    Predicate(NamePredicate),
    /// Use these names verbatim, whether or not the store defines them.
    Names(Vec<String>),
}

impl ActionSelector {
    pub fn predicate(filter: impl Fn(&str) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(filter))
    }

    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    pub(crate) fn validate(&self, field: &str) -> Result<()> {
        match self {
            Self::Names(names) => validate_list(names, field),
            Self::Convention | Self::Predicate(_) => Ok(()),
        }
    }
}

impl fmt::Debug for ActionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Convention => f.write_str("Convention"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Names(names) => f.debug_tuple("Names").field(names).finish(),
        }
    }
}

/// Only arrays of strings are accepted; predicates cannot come from data.
impl TryFrom<&Value> for ActionSelector {
    type Error = BindError;

    fn try_from(value: &Value) -> Result<Self> {
        strings_from_array(value)
            .map(Self::Names)
            .ok_or_else(|| BindError::invalid("actions should be a function or array of strings"))
    }
}
