//! Action name input accepted by [`create_actions`](crate::create_actions).

use indexmap::IndexSet;
use serde_json::Value;

use crate::error::{BindError, Result};

/// One action name or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionNames {
    Single(String),
    List(Vec<String>),
}

impl ActionNames {
    /// Check the names and flatten them into an ordered list.
    ///
    /// A single name must be non-empty. A list may be empty, but each entry
    /// must be non-empty; repeated names collapse onto their first position.
    pub fn into_validated(self) -> Result<Vec<String>> {
        match self {
            Self::Single(name) => {
                if name.is_empty() {
                    return Err(BindError::invalid("please mention action names"));
                }
                Ok(vec![name])
            }
            Self::List(names) => {
                validate_list(&names, "action names")?;
                Ok(dedup_names(names))
            }
        }
    }
}

/// Reject empty entries in an explicit name list.
pub(crate) fn validate_list(names: &[String], what: &str) -> Result<()> {
    if names.iter().any(String::is_empty) {
        return Err(BindError::invalid(format!(
            "{what} should be an array of non-empty strings"
        )));
    }
    Ok(())
}

/// Drop repeated names, keeping each at its first position.
pub(crate) fn dedup_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Read a list of strings out of a dynamic value.
pub(crate) fn strings_from_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

impl From<&str> for ActionNames {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for ActionNames {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for ActionNames {
    fn from(names: Vec<String>) -> Self {
        Self::List(names)
    }
}

impl From<Vec<&str>> for ActionNames {
    fn from(names: Vec<&str>) -> Self {
        Self::List(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ActionNames {
    fn from(names: &[&str]) -> Self {
        Self::List(names.iter().map(|name| name.to_string()).collect())
    }
}

impl TryFrom<&Value> for ActionNames {
    type Error = BindError;

    fn try_from(value: &Value) -> Result<Self> {
        if let Some(name) = value.as_str() {
            return Ok(Self::Single(name.to_string()));
        }
        strings_from_array(value).map(Self::List).ok_or_else(|| {
            BindError::invalid(
                "please mention action names as array of strings or single action as a string",
            )
        })
    }
}
