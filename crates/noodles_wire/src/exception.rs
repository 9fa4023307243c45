//! The one error shape that is allowed to cross the wire: a method handler
//! either returns a result value or a [`MethodException`], never a raw Rust
//! error.

use serde::{Deserialize, Serialize};

use crate::message::MethodValue;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MethodException {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MethodValue>,
}

impl MethodException {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: MethodValue) -> Self {
        self.data = Some(data);
        self
    }
}

/// Well-known exception codes a dispatcher may raise on the registry's
/// behalf, before a method handler ever runs.
pub mod codes {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_attaches_optional_data() {
        let exc = MethodException::new(codes::INVALID_PARAMS, "bad arg")
            .with_data(MethodValue::Text("detail".into()));
        assert_eq!(exc.code, codes::INVALID_PARAMS);
        assert!(exc.data.is_some());
    }
}
