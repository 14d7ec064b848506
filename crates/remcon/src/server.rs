//! `ConsoleServer`: lifecycle, broadcast, and the inbound dispatch
//! pipeline.
//!
//! One `ConsoleServer` exists per process, constructed explicitly and
//! handed around by reference — there is no hidden global. The shared
//! state each connection task needs lives in one [`ConsoleContext`]
//! behind an `Arc`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use remcon_protocol::{Codec, JsonCodec, RemoteMessage, parse_command};
use remcon_session::{RemoteClient, SessionRegistry};
use remcon_transport::{OutboundSender, WebSocketTransport};
use tokio::task::{JoinHandle, JoinSet};

use crate::backend::{CommandExecutor, FaultSink, NoopFaultSink};
use crate::client::WebSocketClient;
use crate::config::RconConfig;
use crate::hooks::{self, ConsoleHook};
use crate::listener;
use crate::RconError;

/// Shared state passed to every connection task.
pub(crate) struct ConsoleContext {
    pub(crate) registry: SessionRegistry,
    pub(crate) codec: JsonCodec,
    hooks: Vec<Arc<dyn ConsoleHook>>,
    executor: Option<Arc<dyn CommandExecutor>>,
    fault_sink: Arc<dyn FaultSink>,
    /// True between a successful start and the matching stop. Connection
    /// tasks can outlive `stop` until the peer acknowledges the close
    /// frame; this flag keeps such stragglers from dispatching commands
    /// or re-registering sessions in the cleared registry.
    pub(crate) online: AtomicBool,
    /// Per-connection listener tasks, aborted on stop so connections that
    /// never acknowledge the close frame are torn down anyway.
    conn_tasks: Mutex<JoinSet<()>>,
}

impl ConsoleContext {
    /// Whether the server this context belongs to is currently running.
    pub(crate) fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Resolves the session handle for a connection, registering a fresh
    /// one bound to `sender` if the key is not yet known.
    pub(crate) fn resolve_client(
        &self,
        peer: SocketAddr,
        sender: &OutboundSender,
    ) -> Arc<dyn RemoteClient> {
        let key = format!("{}:{}", peer.ip(), peer.port());
        let sender = sender.clone();
        self.registry
            .get_or_insert(key, move || Arc::new(WebSocketClient::new(peer, sender)))
    }

    /// The inbound pipeline, run once per received text frame:
    ///
    /// 1. executor-missing guard
    /// 2. decode the envelope
    /// 3. resolve the session handle
    /// 4. hook point: `on_message`
    /// 5. empty-command guard
    /// 6. tokenize
    /// 7. hook point: `on_command`
    /// 8. dispatch to the executor
    ///
    /// Every failure is logged and drops the frame; none of them touch
    /// the connection, let alone the server.
    pub(crate) fn handle_inbound(
        &self,
        payload: &str,
        peer: SocketAddr,
        sender: &OutboundSender,
    ) {
        if !self.is_online() {
            tracing::debug!(%peer, "dropping message, console is stopped");
            return;
        }

        let Some(executor) = &self.executor else {
            tracing::error!(%peer, "dropping command, no command executor is attached");
            return;
        };

        let message: RemoteMessage = match self.codec.decode(payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(%peer, error = %e, "dropping message, malformed envelope");
                return;
            }
        };

        let client = self.resolve_client(peer, sender);

        if hooks::run_message_hooks(&self.hooks, &client, &message).is_some() {
            return;
        }

        let Some((command, args)) = parse_command(&message.message) else {
            tracing::error!(%peer, "dropping command, message text is empty");
            return;
        };

        if hooks::run_command_hooks(&self.hooks, &client, &command, &args).is_some() {
            return;
        }

        executor.execute(&command, &args);
    }
}

/// Builder for configuring a [`ConsoleServer`].
///
/// Hooks run in the order they were added.
pub struct ConsoleServerBuilder {
    config: RconConfig,
    hooks: Vec<Arc<dyn ConsoleHook>>,
    executor: Option<Arc<dyn CommandExecutor>>,
    fault_sink: Arc<dyn FaultSink>,
}

impl ConsoleServerBuilder {
    /// Creates a builder with the default (disabled) configuration.
    pub fn new() -> Self {
        Self {
            config: RconConfig::default(),
            hooks: Vec::new(),
            executor: None,
            fault_sink: Arc::new(NoopFaultSink),
        }
    }

    /// Sets the console configuration.
    pub fn config(mut self, config: RconConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a hook to the interceptor chain.
    pub fn hook(mut self, hook: impl ConsoleHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Sets the command executor commands are dispatched to. Without one
    /// the server still accepts connections and broadcasts, but drops
    /// every inbound command.
    pub fn executor(mut self, executor: impl CommandExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Sets the sink that receives start/bind failures.
    pub fn fault_sink(mut self, sink: impl FaultSink + 'static) -> Self {
        self.fault_sink = Arc::new(sink);
        self
    }

    /// Builds the server. Nothing is bound until [`ConsoleServer::start`].
    pub fn build(self) -> ConsoleServer {
        ConsoleServer {
            config: self.config,
            ctx: Arc::new(ConsoleContext {
                registry: SessionRegistry::new(),
                codec: JsonCodec,
                hooks: self.hooks,
                executor: self.executor,
                fault_sink: self.fault_sink,
                online: AtomicBool::new(false),
                conn_tasks: Mutex::new(JoinSet::new()),
            }),
            active: Mutex::new(None),
        }
    }
}

impl Default for ConsoleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running console listener: the accept task plus where it is bound.
struct ActiveServer {
    local_addr: Option<SocketAddr>,
    accept_task: JoinHandle<()>,
}

/// The remote console server.
///
/// `start` and `stop` are expected to be called from a single
/// administrative context; everything else (broadcast, targeted send,
/// the per-connection pipeline) is safe to call concurrently with them.
pub struct ConsoleServer {
    config: RconConfig,
    ctx: Arc<ConsoleContext>,
    active: Mutex<Option<ActiveServer>>,
}

impl ConsoleServer {
    /// Creates a new builder.
    pub fn builder() -> ConsoleServerBuilder {
        ConsoleServerBuilder::new()
    }

    /// Starts the console listener.
    ///
    /// A no-op when the console is already running, disabled by
    /// configuration, or the password is unset (the last logs a warning —
    /// an open console without a secret would be an open door). A bind
    /// failure is logged, reported to the fault sink, and leaves the
    /// server inactive; there is no automatic retry.
    pub async fn start(&self) {
        if !self.config.enabled {
            tracing::debug!("remote console disabled by configuration");
            return;
        }
        if self.config.password.is_empty() {
            tracing::warn!("remote console password is not set, leaving it disabled");
            return;
        }
        if self.is_active() {
            return;
        }

        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let path = format!("/{}", self.config.password);

        match WebSocketTransport::bind(&addr, path).await {
            Ok(transport) => {
                let local_addr = transport.local_addr().ok();
                let ctx = Arc::clone(&self.ctx);
                self.ctx.online.store(true, Ordering::Release);
                let accept_task = tokio::spawn(accept_loop(transport, ctx));
                *self.active.lock().expect("active lock poisoned") =
                    Some(ActiveServer { local_addr, accept_task });
                tracing::info!(port = self.config.port, "remote console listening");
            }
            Err(e) => {
                let e = RconError::from(e);
                tracing::error!(
                    port = self.config.port,
                    error = %e,
                    "failed to start the remote console"
                );
                self.ctx
                    .fault_sink
                    .report("failed to start the remote console", &e);
            }
        }
    }

    /// Stops the console listener, closing every session with the given
    /// close code and reason.
    ///
    /// Idempotent: stopping an inactive server is a no-op. Safe to call
    /// from a partially-initialized state (i.e. after a failed start).
    ///
    /// Shutdown is immediate from the dispatch side: once this returns,
    /// no further inbound frame reaches hooks or the executor, and no
    /// session can register, even if a peer ignores the close frame.
    pub fn stop(&self, code: u16, reason: &str) {
        let Some(active) = self.active.lock().expect("active lock poisoned").take()
        else {
            return;
        };

        self.ctx.online.store(false, Ordering::Release);
        active.accept_task.abort();
        self.ctx.registry.for_each(|client| client.close(code, reason));
        self.ctx.registry.clear();
        // Close frames are already queued on the per-connection writer
        // tasks; the reader tasks can go now.
        self.ctx
            .conn_tasks
            .lock()
            .expect("conn tasks lock poisoned")
            .abort_all();
        tracing::info!(%reason, code, "remote console stopped");
    }

    /// Whether the listener is currently running.
    pub fn is_active(&self) -> bool {
        self.active.lock().expect("active lock poisoned").is_some()
    }

    /// The address the listener is bound to, when active. Mostly useful
    /// with a configured port of `0`.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.active
            .lock()
            .expect("active lock poisoned")
            .as_ref()
            .and_then(|active| active.local_addr)
    }

    /// The number of currently registered sessions.
    pub fn session_count(&self) -> usize {
        self.ctx.registry.len()
    }

    /// Delivers an envelope to every registered session.
    ///
    /// A no-op while the server is inactive. The envelope is encoded once
    /// and the same text is sent to each session.
    pub fn broadcast(&self, message: &RemoteMessage) {
        if !self.is_active() {
            return;
        }
        let text = match self.ctx.codec.encode(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode broadcast envelope");
                return;
            }
        };
        self.ctx.registry.for_each(|client| client.send_raw(&text));
    }

    /// Broadcasts a plain text message under the given correlation id
    /// (`-1` for unsolicited traffic). Empty messages are dropped.
    pub fn broadcast_text(&self, message: &str, identifier: i32) {
        if message.is_empty() {
            return;
        }
        self.broadcast(&RemoteMessage::new(message, identifier));
    }

    /// Delivers a text message to exactly one session, identified by its
    /// registry key (`"<address>:<port>"`). A no-op when the server is
    /// inactive or no such session exists.
    pub fn send_to(&self, key: &str, message: &str, identifier: i32) {
        if !self.is_active() || message.is_empty() {
            return;
        }
        if let Some(client) = self.ctx.registry.try_get(key) {
            client.send(&RemoteMessage::new(message, identifier));
        }
    }
}

/// Accepts connections forever, spawning one listener task per upgrade.
///
/// A failed upgrade (wrong path, handshake error) only affects that one
/// attempt; the loop keeps accepting.
async fn accept_loop(transport: WebSocketTransport, ctx: Arc<ConsoleContext>) {
    loop {
        match transport.accept().await {
            Ok(conn) => {
                let conn_ctx = Arc::clone(&ctx);
                let mut tasks =
                    ctx.conn_tasks.lock().expect("conn tasks lock poisoned");
                // Reap listeners whose connections already ended.
                while tasks.try_join_next().is_some() {}
                tasks.spawn(listener::drive(conn, conn_ctx));
            }
            Err(e) => {
                tracing::warn!(error = %e, "console connection attempt failed");
            }
        }
    }
}


// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for the configuration guards and the inbound pipeline.
    //! Full lifecycle coverage with real WebSocket clients lives in
    //! `tests/console.rs`.

    use super::*;
    use crate::hooks::HookOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records each dispatched `(command, args)` pair. Clones share the
    /// call log.
    #[derive(Default, Clone)]
    struct RecordingExecutor {
        calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    }

    impl CommandExecutor for RecordingExecutor {
        fn execute(&self, command: &str, args: &[String]) {
            self.calls
                .lock()
                .unwrap()
                .push((command.to_string(), args.to_vec()));
        }
    }

    fn context_with(
        executor: Option<Arc<dyn CommandExecutor>>,
        hooks: Vec<Arc<dyn ConsoleHook>>,
    ) -> ConsoleContext {
        ConsoleContext {
            registry: SessionRegistry::new(),
            codec: JsonCodec,
            hooks,
            executor,
            fault_sink: Arc::new(NoopFaultSink),
            online: AtomicBool::new(true),
            conn_tasks: Mutex::new(JoinSet::new()),
        }
    }

    fn peer() -> SocketAddr {
        "203.0.113.5:51000".parse().unwrap()
    }

    // =====================================================================
    // start() configuration guards
    // =====================================================================

    #[tokio::test]
    async fn test_start_disabled_config_stays_inactive() {
        let server = ConsoleServer::builder().build();

        server.start().await;

        assert!(!server.is_active());
        assert!(server.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_start_empty_password_stays_inactive() {
        let server = ConsoleServer::builder()
            .config(RconConfig {
                enabled: true,
                bind_address: "127.0.0.1".parse().unwrap(),
                port: 0,
                password: String::new(),
            })
            .build();

        server.start().await;

        assert!(!server.is_active());
    }

    #[tokio::test]
    async fn test_start_bind_failure_reports_to_fault_sink() {
        struct CountingSink(Arc<AtomicUsize>);
        impl FaultSink for CountingSink {
            fn report(&self, _context: &str, _error: &(dyn std::error::Error + 'static)) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        // Occupy a port, then ask the console to bind the same one.
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let reports = Arc::new(AtomicUsize::new(0));
        let server = ConsoleServer::builder()
            .config(RconConfig {
                enabled: true,
                bind_address: "127.0.0.1".parse().unwrap(),
                port,
                password: "s3cret".into(),
            })
            .fault_sink(CountingSink(Arc::clone(&reports)))
            .build();

        server.start().await;

        assert!(!server.is_active(), "bind failure must leave the server inactive");
        assert_eq!(reports.load(Ordering::Relaxed), 1);
        // Stopping a server that never started must be safe.
        server.stop(1001, "shutdown");
    }

    #[tokio::test]
    async fn test_stop_quiesces_connections_that_ignore_the_close() {
        let executor = RecordingExecutor::default();
        let server = ConsoleServer::builder()
            .config(RconConfig {
                enabled: true,
                bind_address: "127.0.0.1".parse().unwrap(),
                port: 0,
                password: "s3cret".into(),
            })
            .executor(executor.clone())
            .build();
        server.start().await;
        assert!(server.is_active());

        server.stop(1001, "shutting down");

        // A frame arriving from a connection task that outlived the stop
        // must neither dispatch nor re-register a session.
        let (sender, _rx) = OutboundSender::channel();
        server.ctx.handle_inbound(
            r#"{"Message":"restart now","Identifier":1}"#,
            peer(),
            &sender,
        );

        assert!(executor.calls.lock().unwrap().is_empty());
        assert!(server.ctx.registry.is_empty());
    }

    // =====================================================================
    // Inbound pipeline
    // =====================================================================

    #[test]
    fn test_handle_inbound_dispatches_tokenized_command() {
        let executor = Arc::new(RecordingExecutor::default());
        let ctx = context_with(Some(executor.clone()), Vec::new());
        let (sender, _rx) = OutboundSender::channel();

        ctx.handle_inbound(
            r#"{"Message":"say \"hello world\"","Identifier":7}"#,
            peer(),
            &sender,
        );

        let calls = executor.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![("say".to_string(), vec!["hello world".to_string()])]
        );
    }

    #[test]
    fn test_handle_inbound_registers_session_lazily() {
        let ctx = context_with(Some(Arc::new(RecordingExecutor::default())), Vec::new());
        let (sender, _rx) = OutboundSender::channel();
        assert!(ctx.registry.is_empty());

        ctx.handle_inbound(r#"{"Message":"status"}"#, peer(), &sender);

        assert!(ctx.registry.try_get("203.0.113.5:51000").is_some());
    }

    #[test]
    fn test_handle_inbound_without_executor_drops_frame() {
        let ctx = context_with(None, Vec::new());
        let (sender, _rx) = OutboundSender::channel();

        ctx.handle_inbound(r#"{"Message":"status"}"#, peer(), &sender);

        // Dropped before session resolution, so nothing registered.
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn test_handle_inbound_malformed_envelope_dropped() {
        let executor = Arc::new(RecordingExecutor::default());
        let ctx = context_with(Some(executor.clone()), Vec::new());
        let (sender, _rx) = OutboundSender::channel();

        ctx.handle_inbound("not json", peer(), &sender);

        assert!(executor.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_inbound_empty_message_dropped() {
        let executor = Arc::new(RecordingExecutor::default());
        let ctx = context_with(Some(executor.clone()), Vec::new());
        let (sender, _rx) = OutboundSender::channel();

        ctx.handle_inbound(r#"{"Message":"","Identifier":3}"#, peer(), &sender);
        ctx.handle_inbound(r#"{"Message":"   "}"#, peer(), &sender);

        assert!(executor.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_inbound_message_hook_short_circuits() {
        struct Veto;
        impl ConsoleHook for Veto {
            fn on_message(
                &self,
                _client: &Arc<dyn RemoteClient>,
                _message: &RemoteMessage,
            ) -> Option<HookOutcome> {
                Some(HookOutcome::Handled)
            }
        }

        let executor = Arc::new(RecordingExecutor::default());
        let ctx = context_with(Some(executor.clone()), vec![Arc::new(Veto)]);
        let (sender, _rx) = OutboundSender::channel();

        ctx.handle_inbound(r#"{"Message":"status"}"#, peer(), &sender);

        assert!(executor.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_inbound_command_hook_short_circuits() {
        struct VetoStatus;
        impl ConsoleHook for VetoStatus {
            fn on_command(
                &self,
                _client: &Arc<dyn RemoteClient>,
                command: &str,
                _args: &[String],
            ) -> Option<HookOutcome> {
                (command == "status").then_some(HookOutcome::Handled)
            }
        }

        let executor = Arc::new(RecordingExecutor::default());
        let ctx = context_with(Some(executor.clone()), vec![Arc::new(VetoStatus)]);
        let (sender, _rx) = OutboundSender::channel();

        ctx.handle_inbound(r#"{"Message":"STATUS"}"#, peer(), &sender);
        ctx.handle_inbound(r#"{"Message":"say hi"}"#, peer(), &sender);

        // Only the non-vetoed command reaches the executor, case-folded.
        let calls = executor.calls.lock().unwrap();
        assert_eq!(*calls, vec![("say".to_string(), vec!["hi".to_string()])]);
    }

    // =====================================================================
    // Broadcast guards
    // =====================================================================

    #[tokio::test]
    async fn test_broadcast_while_inactive_is_noop() {
        let server = ConsoleServer::builder().build();
        // Must not panic or deliver anywhere.
        server.broadcast(&RemoteMessage::broadcast("log line"));
        server.broadcast_text("log line", -1);
        server.send_to("203.0.113.5:51000", "hello", 1);
    }
}
