//! Registry-layer error types.

use noodles_ids::ComponentId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0} does not exist")]
    NotFound(ComponentId),

    #[error("field `{field}` references {target}, which does not exist")]
    DanglingReference {
        field: &'static str,
        target: ComponentId,
    },

    #[error("cannot delete {0}: still referenced by at least one other component")]
    InUse(ComponentId),

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("{0} is a stale id (its slot has already been reused)")]
    StaleId(ComponentId),
}
