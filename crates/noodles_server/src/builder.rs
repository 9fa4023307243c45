//! Assembles a [`Server`] from configuration, an initial document, method
//! handlers, and delegates.

use noodles_dispatch::{DelegateFactory, MethodDispatcher};
use noodles_ids::ComponentKind;
use noodles_dispatch::MethodHandler;
use noodles_registry::Registry;

use crate::config::ServerConfig;
use crate::server::Server;
use crate::starting_state::StartingState;

pub struct ServerBuilder {
    config: ServerConfig,
    starting_state: StartingState,
    method_handlers: Vec<(String, Box<dyn MethodHandler>)>,
    delegate_factory: Option<Box<dyn DelegateFactory>>,
}

impl ServerBuilder {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            starting_state: StartingState::empty(),
            method_handlers: Vec::new(),
            delegate_factory: None,
        }
    }

    #[must_use]
    pub fn with_starting_state(mut self, state: StartingState) -> Self {
        self.starting_state = state;
        self
    }

    /// Bind a handler to a method by name. The method itself must be
    /// created by the starting state — handlers are resolved to a
    /// [`noodles_ids::ComponentId`] at [`build`](Self::build) time by
    /// looking up the method of that name.
    #[must_use]
    pub fn with_method_handler(
        mut self,
        method_name: impl Into<String>,
        handler: impl MethodHandler + 'static,
    ) -> Self {
        self.method_handlers.push((method_name.into(), Box::new(handler)));
        self
    }

    #[must_use]
    pub fn with_delegate(mut self, factory: impl DelegateFactory + 'static) -> Self {
        self.delegate_factory = Some(Box::new(factory));
        self
    }

    /// # Errors
    /// Returns an error if the starting state fails validation, or if a
    /// `with_method_handler` name doesn't match any method the starting
    /// state created.
    pub fn build(self) -> anyhow::Result<Server> {
        let mut registry = Registry::new();
        self.starting_state
            .apply(&mut registry)
            .map_err(|err| anyhow::anyhow!("starting state failed validation: {err}"))?;

        let mut dispatcher = MethodDispatcher::new();
        for (name, handler) in self.method_handlers {
            let method_id = registry
                .ids_by_kind(ComponentKind::Method)
                .into_iter()
                .find(|id| registry.get_method(*id).is_some_and(|m| m.name == name))
                .ok_or_else(|| {
                    anyhow::anyhow!("no method named `{name}` was created by the starting state")
                })?;
            dispatcher.register(method_id, handler);
        }

        let mut server = Server::new(self.config, registry, dispatcher, self.delegate_factory);
        server.attach_pending_table_delegates();
        Ok(server)
    }
}
