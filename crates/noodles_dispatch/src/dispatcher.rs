//! Resolves a method invocation to a registered handler and runs it.

use std::collections::HashMap;

use noodles_ids::ComponentId;
use noodles_registry::Registry;
use noodles_wire::records::MethodRecord;
use noodles_wire::MethodValue;

use crate::context::Context;
use crate::error::DispatchError;
use crate::handler::{HandlerOutcome, MethodHandler};

/// Maps method component ids to their handler implementation and drives
/// invocation, including the context-liveness check every call goes
/// through before the handler runs.
#[derive(Default)]
pub struct MethodDispatcher {
    handlers: HashMap<ComponentId, Box<dyn MethodHandler>>,
}

impl MethodDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method_id: ComponentId, handler: Box<dyn MethodHandler>) {
        self.handlers.insert(method_id, handler);
    }

    pub fn unregister(&mut self, method_id: ComponentId) {
        self.handlers.remove(&method_id);
    }

    /// # Errors
    /// Returns [`DispatchError::MethodNotFound`] if `method_id` isn't a live
    /// method component, [`DispatchError::ContextNotFound`] if `context`
    /// names a dead component, [`DispatchError::NotAttached`] if the method
    /// isn't listed in the target's (or the document's global) method list,
    /// [`DispatchError::InvalidArgument`] if the argument count or a
    /// hinted argument's shape doesn't match the method's declared
    /// arguments, or [`DispatchError::NoHandler`] if the method exists but
    /// no handler was ever registered for it.
    pub fn dispatch(
        &self,
        method_id: ComponentId,
        context: Context,
        args: Vec<MethodValue>,
        registry: &mut Registry,
    ) -> Result<HandlerOutcome, DispatchError> {
        let record = registry
            .get_method(method_id)
            .ok_or(DispatchError::MethodNotFound(method_id))?
            .clone();
        if let Some(ctx_id) = context.component() {
            if !registry.alive(ctx_id) {
                return Err(DispatchError::ContextNotFound(ctx_id));
            }
        }
        if !is_attached(registry, context, method_id) {
            return Err(DispatchError::NotAttached(method_id));
        }
        validate_args(&record, &args)?;
        let handler = self
            .handlers
            .get(&method_id)
            .ok_or(DispatchError::NoHandler(method_id))?;
        Ok(handler.call(context, args, registry))
    }
}

/// Whether `method_id` is listed in the given context's `methods_list`, or
/// in the document's global method list for [`Context::Global`].
fn is_attached(registry: &Registry, context: Context, method_id: ComponentId) -> bool {
    match context {
        Context::Global => registry.global_methods().contains(&method_id),
        Context::Entity(id) => registry
            .get_entity(id)
            .is_some_and(|r| r.methods_list.contains(&method_id)),
        Context::Table(id) => registry
            .get_table(id)
            .is_some_and(|r| r.methods_list.contains(&method_id)),
        Context::Plot(id) => registry
            .get_plot(id)
            .is_some_and(|r| r.methods_list.contains(&method_id)),
    }
}

/// The CBOR array length a well-known `editor_hint` implies, for arguments
/// whose shape is meant to be a fixed-length numeric vector or matrix.
fn hinted_array_len(hint: &str) -> Option<usize> {
    match hint {
        "vec2" => Some(2),
        "vec3" | "rgb" => Some(3),
        "vec4" | "rgba" | "quat" => Some(4),
        "mat3" => Some(9),
        "mat4" => Some(16),
        _ => None,
    }
}

fn validate_args(method: &MethodRecord, args: &[MethodValue]) -> Result<(), DispatchError> {
    if args.len() != method.arguments.len() {
        return Err(DispatchError::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            method.name,
            method.arguments.len(),
            args.len()
        )));
    }
    for (arg, spec) in args.iter().zip(&method.arguments) {
        let Some(expected_len) = spec.editor_hint.as_deref().and_then(hinted_array_len) else {
            continue;
        };
        let actual_len = match arg {
            MethodValue::Array(items) => items.len(),
            _ => {
                return Err(DispatchError::InvalidArgument(format!(
                    "argument `{}` (hint `{}`) must be an array of length {expected_len}",
                    spec.name,
                    spec.editor_hint.as_deref().unwrap_or_default(),
                )));
            }
        };
        if actual_len != expected_len {
            return Err(DispatchError::InvalidArgument(format!(
                "argument `{}` (hint `{}`) must have length {expected_len}, got {actual_len}",
                spec.name,
                spec.editor_hint.as_deref().unwrap_or_default(),
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_ids::ComponentKind;
    use noodles_wire::records::{EntityRecord, MethodArg, MethodRecord};

    fn echo_handler() -> Box<dyn MethodHandler> {
        Box::new(|_ctx: Context, args: Vec<MethodValue>, _registry: &mut Registry| {
            HandlerOutcome::Result(args.into_iter().next().unwrap_or(MethodValue::Null))
        })
    }

    fn one_arg_method(registry: &mut Registry, name: &str) -> ComponentId {
        registry.create_method(MethodRecord {
            name: name.into(),
            arguments: vec![MethodArg {
                name: "value".into(),
                doc: None,
                editor_hint: None,
            }],
            ..Default::default()
        })
    }

    #[test]
    fn dispatch_fails_for_unknown_method() {
        let dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let bogus = ComponentId::new(ComponentKind::Method, 0, 0);
        let err = dispatcher
            .dispatch(bogus, Context::Global, vec![], &mut registry)
            .unwrap_err();
        assert!(matches!(err, DispatchError::MethodNotFound(_)));
    }

    #[test]
    fn dispatch_fails_when_method_exists_but_has_no_handler() {
        let dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let id = registry.create_method(MethodRecord {
            name: "ping".into(),
            ..Default::default()
        });
        registry.attach_global_method(id).unwrap();
        let err = dispatcher
            .dispatch(id, Context::Global, vec![], &mut registry)
            .unwrap_err();
        assert!(matches!(err, DispatchError::NoHandler(_)));
    }

    #[test]
    fn dispatch_rejects_a_method_not_attached_to_the_given_context() {
        let dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let id = registry.create_method(MethodRecord {
            name: "ping".into(),
            ..Default::default()
        });
        // never attached as global or to any entity/table/plot
        let err = dispatcher
            .dispatch(id, Context::Global, vec![], &mut registry)
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotAttached(_)));
    }

    #[test]
    fn registered_handler_runs_and_returns_a_result() {
        let mut dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let id = one_arg_method(&mut registry, "echo");
        registry.attach_global_method(id).unwrap();
        dispatcher.register(id, echo_handler());
        let outcome = dispatcher
            .dispatch(id, Context::Global, vec![MethodValue::Integer(7.into())], &mut registry)
            .unwrap();
        match outcome {
            HandlerOutcome::Result(MethodValue::Integer(v)) => {
                assert_eq!(i64::try_from(v).unwrap(), 7);
            }
            _ => panic!("expected an integer result"),
        }
    }

    #[test]
    fn dispatch_rejects_wrong_argument_count() {
        let mut dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let id = one_arg_method(&mut registry, "echo");
        registry.attach_global_method(id).unwrap();
        dispatcher.register(id, echo_handler());
        let err = dispatcher
            .dispatch(id, Context::Global, vec![], &mut registry)
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
    }

    #[test]
    fn dispatch_rejects_a_hinted_argument_with_the_wrong_shape() {
        let mut dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let id = registry.create_method(MethodRecord {
            name: "set_position".into(),
            arguments: vec![MethodArg {
                name: "position".into(),
                doc: None,
                editor_hint: Some("vec3".into()),
            }],
            ..Default::default()
        });
        registry.attach_global_method(id).unwrap();
        dispatcher.register(id, echo_handler());
        let bad_shape = vec![MethodValue::Array(vec![MethodValue::Integer(1.into())])];
        let err = dispatcher.dispatch(id, Context::Global, bad_shape, &mut registry).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
    }

    #[test]
    fn dispatch_allows_a_method_attached_to_its_entity() {
        let mut dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let id = registry.create_method(MethodRecord {
            name: "touch".into(),
            ..Default::default()
        });
        dispatcher.register(id, echo_handler());
        let entity = registry
            .create_entity(EntityRecord {
                methods_list: vec![id],
                ..Default::default()
            })
            .unwrap();
        assert!(dispatcher.dispatch(id, Context::Entity(entity), vec![], &mut registry).is_ok());
    }

    #[test]
    fn dispatch_rejects_dead_entity_context() {
        let mut dispatcher = MethodDispatcher::new();
        let mut registry = Registry::new();
        let id = registry.create_method(MethodRecord {
            name: "touch".into(),
            ..Default::default()
        });
        dispatcher.register(id, echo_handler());
        let dead_entity = ComponentId::new(ComponentKind::Entity, 42, 0);
        let err = dispatcher
            .dispatch(id, Context::Entity(dead_entity), vec![], &mut registry)
            .unwrap_err();
        assert!(matches!(err, DispatchError::ContextNotFound(_)));
        // The wire-level exception intentionally collapses this into the
        // same code as an unknown method: a stale context is indistinguishable
        // from "this method can't be invoked here" to the caller.
        assert_eq!(err.into_exception().code, noodles_wire::codes::METHOD_NOT_FOUND);
    }
}
