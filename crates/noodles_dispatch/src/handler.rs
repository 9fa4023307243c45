//! The method handler trait and the shapes a handler can resolve to.

use noodles_registry::Registry;
use noodles_wire::{MethodException, MethodValue};
use tokio::task::JoinHandle;

use crate::context::Context;

/// What invoking a method produced.
///
/// [`HandlerOutcome::Deferred`] is the escape hatch for handlers that need
/// to do real async work (a disk read, an outbound HTTP call) without
/// blocking the single-threaded core loop: the handler spawns the work
/// itself and hands back the join handle, which the loop polls to
/// completion alongside everything else instead of awaiting it inline.
pub enum HandlerOutcome {
    Result(MethodValue),
    Exception(MethodException),
    Deferred(JoinHandle<Result<MethodValue, MethodException>>),
}

/// A method implementation. Handlers run on the core loop and may mutate
/// the registry directly; anything that can't complete synchronously must
/// go through [`HandlerOutcome::Deferred`] instead of blocking.
pub trait MethodHandler: Send + Sync {
    fn call(
        &self,
        context: Context,
        args: Vec<MethodValue>,
        registry: &mut Registry,
    ) -> HandlerOutcome;
}

impl<F> MethodHandler for F
where
    F: Fn(Context, Vec<MethodValue>, &mut Registry) -> HandlerOutcome + Send + Sync,
{
    fn call(
        &self,
        context: Context,
        args: Vec<MethodValue>,
        registry: &mut Registry,
    ) -> HandlerOutcome {
        self(context, args, registry)
    }
}
