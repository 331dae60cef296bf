//! Conversions between the pipeline's internal errors and the task
//! runtime's [`TaskFailure`].

use paise_model::PaiseError;
use paise_store::StoreError;
use paise_tasks::TaskFailure;

/// Converts any error surfacing from a plugin call or a store operation
/// into the task runtime's retry currency. [`PaiseError::Transient`] maps
/// to [`TaskFailure::Transient`]; everything else is treated as permanent,
/// since a store-layer failure (`StoreError` always arrives as
/// [`PaiseError::Assertion`]) is not expected to clear itself on retry.
pub(crate) fn to_task_failure(err: PaiseError) -> TaskFailure {
    if err.is_transient() {
        TaskFailure::Transient(err.to_string())
    } else {
        TaskFailure::Permanent(err.to_string())
    }
}

pub(crate) fn store_failure(err: StoreError) -> TaskFailure {
    to_task_failure(err.into())
}
