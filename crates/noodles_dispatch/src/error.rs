//! Dispatch-layer errors: everything that can go wrong resolving and
//! invoking a method, before a handler's own [`MethodException`] takes over.

use noodles_ids::ComponentId;
use noodles_wire::MethodException;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("method {0} does not exist")]
    MethodNotFound(ComponentId),

    #[error("method {0} has no registered handler")]
    NoHandler(ComponentId),

    #[error("invocation context {0} does not exist")]
    ContextNotFound(ComponentId),

    #[error("method {0} is not attached to the given context")]
    NotAttached(ComponentId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal dispatch error: {0}")]
    InternalError(String),
}

impl DispatchError {
    /// Convert this dispatch-level failure into the one error shape that's
    /// allowed to cross the wire as a method reply.
    ///
    /// A stale context or an unattached method are both, from the caller's
    /// point of view, "that method can't be invoked here" — both map to
    /// `MethodNotFound` rather than a bespoke code of their own.
    #[must_use]
    pub fn into_exception(self) -> MethodException {
        use noodles_wire::codes;
        match self {
            DispatchError::MethodNotFound(_)
            | DispatchError::NoHandler(_)
            | DispatchError::ContextNotFound(_)
            | DispatchError::NotAttached(_) => {
                MethodException::new(codes::METHOD_NOT_FOUND, self.to_string())
            }
            DispatchError::InvalidArgument(_) => {
                MethodException::new(codes::INVALID_PARAMS, self.to_string())
            }
            DispatchError::InternalError(_) => {
                MethodException::new(codes::INTERNAL_ERROR, self.to_string())
            }
        }
    }
}
