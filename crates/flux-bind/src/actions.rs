//! Action factory: validated names in, one trigger handle per name out.

use crate::error::Result;
use crate::names::ActionNames;
use crate::runtime::{ActionOptions, ActionSet, DispatchRuntime};

/// Create an [`ActionSet`] holding one action per name.
///
/// `names` is a single non-empty name or a list of distinct non-empty names.
/// Use [`ActionNames::try_from`] to accept names from dynamic data.
pub fn create_actions<R: DispatchRuntime>(
    runtime: &R,
    names: impl Into<ActionNames>,
    options: ActionOptions,
) -> Result<ActionSet> {
    let names = names.into().into_validated()?;
    runtime.create_actions(&names, options)
}
