//! The core event loop.
//!
//! Everything here runs on a single task: accepting a connection and
//! reading/writing its frames happen on dedicated per-session tasks, but
//! every mutation of the registry and every dispatch decision happens back
//! on this loop, serialized through the `inbound` channel. That's what
//! lets the registry and dispatcher stay free of any locking.

use std::fs::File;
use std::io::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use noodles_dispatch::{Context, DelegateFactory, DelegateRegistry, HandlerOutcome, MethodDispatcher};
use noodles_ids::{ComponentId, ComponentKind};
use noodles_net::Connection;
use noodles_registry::Registry;
use noodles_wire::records::{Selection, TableDelta, TableKey, TableRow, TableRowUpdate};
use noodles_wire::{
    codes, ClientMessage, IntroMessage, InvokeMethodMessage, MethodException, MethodValue,
    ServerMessage,
};

/// Reserved method names every table carries in its own `methods_list`,
/// routed straight to the table's [`noodles_dispatch::TableOps`] delegate
/// instead of through the ordinary handler table.
mod table_ops_names {
    pub const INSERT: &str = "tbl_insert";
    pub const UPDATE: &str = "tbl_update";
    pub const REMOVE: &str = "tbl_remove";
    pub const CLEAR: &str = "tbl_clear";
    pub const UPDATE_SELECTION: &str = "tbl_update_selection";
}

use crate::broadcast::BroadcastEngine;
use crate::config::ServerConfig;
use crate::session::{ClientSession, SessionId, OUTBOUND_QUEUE_CAPACITY};

const SHUTDOWN_DRAIN: Duration = Duration::from_secs(2);
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(20);

enum InboundEvent {
    Connected {
        id: SessionId,
        outbound: mpsc::Sender<Vec<ServerMessage>>,
    },
    Message {
        id: SessionId,
        message: ClientMessage,
    },
    Disconnected {
        id: SessionId,
    },
}

pub struct Server {
    config: ServerConfig,
    registry: Registry,
    dispatcher: MethodDispatcher,
    delegates: DelegateRegistry,
    delegate_factory: Option<Box<dyn DelegateFactory>>,
    broadcast: Arc<BroadcastEngine>,
    json_dump: Option<File>,
}

impl Server {
    pub(crate) fn new(
        config: ServerConfig,
        registry: Registry,
        dispatcher: MethodDispatcher,
        delegate_factory: Option<Box<dyn DelegateFactory>>,
    ) -> Self {
        let json_dump = config.json_dump_path.as_ref().and_then(|path| {
            File::create(path)
                .inspect_err(|err| warn!(%err, path = %path.display(), "could not open json dump file"))
                .ok()
        });
        Self {
            config,
            registry,
            dispatcher,
            delegates: DelegateRegistry::new(),
            delegate_factory,
            broadcast: Arc::new(BroadcastEngine::new()),
            json_dump,
        }
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// # Errors
    /// Returns an error if the listening socket can't be bound.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", self.config.port)).await?;
        self.run_on(listener).await
    }

    /// Run the server against an already-bound listener. Exposed
    /// separately from [`run`](Self::run) so tests can bind an ephemeral
    /// port and learn its address before the server starts accepting.
    ///
    /// # Errors
    /// Propagated from the accept loop's own setup; currently infallible
    /// but kept fallible to match [`run`](Self::run)'s signature.
    pub async fn run_on(mut self, listener: TcpListener) -> anyhow::Result<()> {
        info!(addr = ?listener.local_addr().ok(), "noodles server listening");

        let (inbound_tx, mut inbound_rx) = mpsc::channel::<InboundEvent>(256);
        let accept_handle = tokio::spawn(accept_loop(listener, inbound_tx));

        loop {
            tokio::select! {
                event = inbound_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        accept_handle.abort();
        self.shutdown().await;
        Ok(())
    }

    /// Refuse new work, drain every session's outbound queue up to a bounded
    /// timeout, then close every remaining session.
    async fn shutdown(&self) {
        info!(sessions = self.broadcast.len(), "draining sessions before shutdown");
        let deadline = tokio::time::Instant::now() + SHUTDOWN_DRAIN;
        while tokio::time::Instant::now() < deadline && !self.broadcast.all_queues_drained() {
            tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
        }
        if !self.broadcast.all_queues_drained() {
            warn!(sessions = self.broadcast.len(), "shutdown drain timed out, closing anyway");
        }
        self.broadcast.close_all();
    }

    fn handle_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Connected { id, outbound } => {
                self.broadcast.insert(ClientSession::new(id, outbound));
            }
            InboundEvent::Message { id, message } => self.handle_message(id, message),
            InboundEvent::Disconnected { id } => {
                self.broadcast.remove(id);
            }
        }
    }

    fn handle_message(&mut self, id: SessionId, message: ClientMessage) {
        match message {
            ClientMessage::Intro(intro) => self.handle_intro(id, intro),
            ClientMessage::InvokeMethod(invoke) => self.handle_invoke(id, invoke),
        }
    }

    fn handle_intro(&mut self, id: SessionId, intro: IntroMessage) {
        let introduced = self
            .broadcast
            .with_session(id, |session| session.mark_introduced(intro.client_name));
        match introduced {
            Some(Ok(())) => {
                let snapshot = self.registry.snapshot();
                self.deliver_to(id, snapshot);
                self.deliver_to(id, vec![ServerMessage::InitDone]);
                let _ = self.broadcast.with_session(id, |session| session.mark_active());
            }
            Some(Err(err)) => warn!(session = %id, %err, "rejected out-of-order intro message"),
            None => {}
        }
    }

    fn handle_invoke(&mut self, id: SessionId, invoke: InvokeMethodMessage) {
        let state = self.broadcast.with_session(id, |session| session.state());
        if state != Some(crate::session::SessionState::Active) {
            warn!(session = %id, ?state, "invoke received before session is active, closing");
            if let Some(session) = self.broadcast.remove(id) {
                session.enqueue(vec![ServerMessage::MethodReply {
                    invoke_id: invoke.invoke_id,
                    result: None,
                    exception: Some(MethodException::new(
                        codes::INVALID_PARAMS,
                        "method invoked before session completed introduction",
                    )),
                }]);
            }
            return;
        }

        let InvokeMethodMessage {
            method,
            context,
            args,
            invoke_id,
        } = invoke;

        let context = match resolve_context(context) {
            Ok(context) => context,
            Err(exception) => {
                self.reply(id, invoke_id, Err(exception));
                return;
            }
        };

        if let Context::Table(table_id) = context {
            if let Some(outcome) = self.try_table_op(table_id, method, &args) {
                self.broadcast_pending();
                self.reply(id, invoke_id, outcome);
                return;
            }
        }

        let outcome = self.dispatcher.dispatch(method, context, args, &mut self.registry);
        self.broadcast_pending();

        match outcome {
            Ok(HandlerOutcome::Result(value)) => self.reply(id, invoke_id, Ok(value)),
            Ok(HandlerOutcome::Exception(exception)) => self.reply(id, invoke_id, Err(exception)),
            Ok(HandlerOutcome::Deferred(join)) => self.spawn_deferred_reply(id, invoke_id, join),
            Err(err) => self.reply(id, invoke_id, Err(err.into_exception())),
        }
    }

    /// Route a table-scoped invocation to its delegate if `method` is one
    /// of the reserved row-mutation names. Returns `None` for anything
    /// else, letting the caller fall through to the ordinary dispatcher —
    /// a table can still declare its own custom methods alongside the
    /// standard ones.
    fn try_table_op(
        &mut self,
        table_id: ComponentId,
        method: ComponentId,
        args: &[MethodValue],
    ) -> Option<Result<MethodValue, MethodException>> {
        let name = self.registry.get_method(method)?.name.clone();
        Some(match name.as_str() {
            table_ops_names::INSERT => self.table_insert(table_id, args),
            table_ops_names::UPDATE => self.table_update(table_id, args),
            table_ops_names::REMOVE => self.table_remove(table_id, args),
            table_ops_names::CLEAR => self.table_clear(table_id),
            table_ops_names::UPDATE_SELECTION => self.table_update_selection(table_id, args),
            _ => return None,
        })
    }

    fn delegate_mut(&mut self, table_id: ComponentId) -> Result<&mut dyn noodles_dispatch::TableOps, MethodException> {
        self.delegates
            .table_delegate_mut(table_id)
            .ok_or_else(|| MethodException::new(codes::INVALID_PARAMS, format!("{table_id} has no row delegate")))
    }

    fn broadcast_row_update(&mut self, table_id: ComponentId, row_update: TableRowUpdate) -> Result<(), MethodException> {
        let delta = TableDelta {
            row_update: Some(row_update),
            ..Default::default()
        };
        self.registry
            .update_table(table_id, delta)
            .map_err(|err| MethodException::new(codes::INTERNAL_ERROR, err.to_string()))
    }

    fn table_insert(&mut self, table_id: ComponentId, args: &[MethodValue]) -> Result<MethodValue, MethodException> {
        let rows: Vec<TableRow> = decode_arg(args.first())?;
        let keys = self.delegate_mut(table_id)?.insert(rows.clone())?;
        self.broadcast_row_update(table_id, TableRowUpdate::Inserted { keys: keys.clone(), rows })?;
        Ok(keys_to_value(&keys))
    }

    fn table_update(&mut self, table_id: ComponentId, args: &[MethodValue]) -> Result<MethodValue, MethodException> {
        let keys: Vec<TableKey> = decode_arg(args.first())?;
        let rows: Vec<TableRow> = decode_arg(args.get(1))?;
        self.delegate_mut(table_id)?.update(keys.clone(), rows.clone())?;
        self.broadcast_row_update(table_id, TableRowUpdate::Updated { keys, rows })?;
        Ok(MethodValue::Null)
    }

    fn table_remove(&mut self, table_id: ComponentId, args: &[MethodValue]) -> Result<MethodValue, MethodException> {
        let keys: Vec<TableKey> = decode_arg(args.first())?;
        self.delegate_mut(table_id)?.remove(keys.clone())?;
        self.broadcast_row_update(table_id, TableRowUpdate::Removed { keys })?;
        Ok(MethodValue::Null)
    }

    fn table_clear(&mut self, table_id: ComponentId) -> Result<MethodValue, MethodException> {
        self.delegate_mut(table_id)?.clear()?;
        self.broadcast_row_update(table_id, TableRowUpdate::Cleared)?;
        Ok(MethodValue::Null)
    }

    fn table_update_selection(
        &mut self,
        table_id: ComponentId,
        args: &[MethodValue],
    ) -> Result<MethodValue, MethodException> {
        let selection: Selection = decode_arg(args.first())?;
        self.delegate_mut(table_id)?.update_selection(selection.clone())?;
        self.broadcast_row_update(table_id, TableRowUpdate::SelectionUpdated { selection })?;
        Ok(MethodValue::Null)
    }

    /// Drain and fan out whatever lifecycle messages the last dispatch
    /// queued, to every session. Called before the triggering invocation's
    /// own reply is sent, so broadcasts always precede their reply.
    fn broadcast_pending(&mut self) {
        self.attach_pending_table_delegates();
        let pending = self.registry.drain_pending();
        if pending.is_empty() {
            return;
        }
        self.dump_if_configured(&pending);
        self.broadcast.broadcast(pending);
    }

    /// Attach a delegate to every table created since the last call,
    /// whether by the starting state or by a method handler at runtime.
    pub(crate) fn attach_pending_table_delegates(&mut self) {
        for table_id in self.registry.drain_pending_table_creates() {
            self.attach_table_delegate(table_id);
        }
    }

    fn reply(&mut self, id: SessionId, invoke_id: String, outcome: Result<MethodValue, MethodException>) {
        let message = match outcome {
            Ok(result) => ServerMessage::MethodReply {
                invoke_id,
                result: Some(result),
                exception: None,
            },
            Err(exception) => ServerMessage::MethodReply {
                invoke_id,
                result: None,
                exception: Some(exception),
            },
        };
        self.deliver_to(id, vec![message]);
    }

    fn spawn_deferred_reply(
        &self,
        id: SessionId,
        invoke_id: String,
        join: tokio::task::JoinHandle<Result<MethodValue, MethodException>>,
    ) {
        let broadcast = Arc::clone(&self.broadcast);
        tokio::spawn(async move {
            let message = match join.await {
                Ok(Ok(result)) => ServerMessage::MethodReply {
                    invoke_id,
                    result: Some(result),
                    exception: None,
                },
                Ok(Err(exception)) => ServerMessage::MethodReply {
                    invoke_id,
                    result: None,
                    exception: Some(exception),
                },
                Err(join_err) => ServerMessage::MethodReply {
                    invoke_id,
                    result: None,
                    exception: Some(MethodException::new(
                        codes::INTERNAL_ERROR,
                        format!("deferred handler did not complete: {join_err}"),
                    )),
                },
            };
            broadcast.send_to(id, vec![message]);
        });
    }

    fn deliver_to(&mut self, id: SessionId, messages: Vec<ServerMessage>) {
        self.dump_if_configured(&messages);
        self.broadcast.send_to(id, messages);
    }

    fn dump_if_configured(&mut self, messages: &[ServerMessage]) {
        let Some(file) = self.json_dump.as_mut() else {
            return;
        };
        if let Ok(line) = serde_json::to_string(messages) {
            let _ = writeln!(file, "{line}");
        }
    }

    /// Attach a table's delegate, constructed by the server's configured
    /// [`DelegateFactory`] if one was supplied. Called automatically for
    /// every table the registry reports as newly created; kept public so
    /// an embedder can re-attach a delegate out of band if it ever needs to.
    pub fn attach_table_delegate(&mut self, table_id: ComponentId) {
        if let Some(factory) = &self.delegate_factory {
            if let Some(delegate) = factory.create_table_delegate(table_id) {
                self.delegates.set_table_delegate(table_id, delegate);
            }
        }
    }
}

/// Decode one positional method argument into a typed value by
/// round-tripping it through `ciborium`'s serializer, the same bounce
/// `noodles_wire` uses to turn a raw [`MethodValue`] into a typed payload.
fn decode_arg<T: serde::de::DeserializeOwned>(arg: Option<&MethodValue>) -> Result<T, MethodException> {
    let arg = arg.ok_or_else(|| MethodException::new(codes::INVALID_PARAMS, "missing argument"))?;
    let mut buf = Vec::new();
    ciborium::ser::into_writer(arg, &mut buf)
        .map_err(|err| MethodException::new(codes::INVALID_PARAMS, format!("bad argument: {err}")))?;
    ciborium::de::from_reader(buf.as_slice())
        .map_err(|err| MethodException::new(codes::INVALID_PARAMS, format!("bad argument: {err}")))
}

fn keys_to_value(keys: &[TableKey]) -> MethodValue {
    MethodValue::Array(keys.iter().map(|&k| MethodValue::Integer(k.into())).collect())
}

fn resolve_context(context: Option<ComponentId>) -> Result<Context, MethodException> {
    match context {
        None => Ok(Context::Global),
        Some(id) => match id.kind {
            ComponentKind::Entity => Ok(Context::Entity(id)),
            ComponentKind::Table => Ok(Context::Table(id)),
            ComponentKind::Plot => Ok(Context::Plot(id)),
            other => Err(MethodException::new(
                codes::INVALID_PARAMS,
                format!("{other} components cannot be used as an invocation context"),
            )),
        },
    }
}

async fn accept_loop(listener: TcpListener, inbound_tx: mpsc::Sender<InboundEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let tx = inbound_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, addr, tx).await {
                        warn!(%addr, %err, "connection ended with an error");
                    }
                });
            }
            Err(err) => warn!(%err, "failed to accept a connection"),
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    inbound_tx: mpsc::Sender<InboundEvent>,
) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut reader, mut writer) = Connection::new(ws_stream).split();

    let id = Uuid::new_v4();
    let (out_tx, mut out_rx) = mpsc::channel::<Vec<ServerMessage>>(OUTBOUND_QUEUE_CAPACITY);
    if inbound_tx
        .send(InboundEvent::Connected { id, outbound: out_tx })
        .await
        .is_err()
    {
        return Ok(());
    }
    info!(%addr, session = %id, "session connected");

    let writer_task = tokio::spawn(async move {
        while let Some(batch) = out_rx.recv().await {
            if writer.send_frame(&batch).await.is_err() {
                break;
            }
        }
        let _ = writer.close().await;
    });

    loop {
        match reader.recv_frame().await {
            Ok(Some(messages)) => {
                for message in messages {
                    if inbound_tx.send(InboundEvent::Message { id, message }).await.is_err() {
                        break;
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(%addr, session = %id, %err, "read error, closing session");
                break;
            }
        }
    }

    let _ = inbound_tx.send(InboundEvent::Disconnected { id }).await;
    writer_task.abort();
    info!(%addr, session = %id, "session disconnected");
    Ok(())
}
