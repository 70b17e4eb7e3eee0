//! Connection lifecycle, read loop and send path.
//!
//! A [`Connection`] collects handlers while unconnected. [`Connection::connect`]
//! consumes it: the WebSocket is opened, the registration frame written, and
//! the handler table moves into the read loop task. What remains for the
//! caller is a [`PluginHandle`] for sending commands and waiting for exit.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use streamdeck_client::{Connection, RegistrationArgs};
//! use streamdeck_core::{received::KeyUp, TypeRegistry};
//!
//! let mut conn = Connection::new(Arc::new(TypeRegistry::builtin()));
//! conn.on(|event: KeyUp| println!("released {}", event.context))?;
//!
//! let plugin = conn.connect(&RegistrationArgs::from_env()?).await?;
//! plugin.wait_for_exit().await;
//! ```

use std::fmt;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use streamdeck_core::{
    ConnectionState, InboundEvent, InboundShape, Outbound, Registration, TypeRegistry,
};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use crate::args::RegistrationArgs;
use crate::error::{ClientError, Result};
use crate::handler::HandlerTable;
use crate::router::Router;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// An unconnected plugin session collecting handlers.
#[derive(Debug)]
pub struct Connection {
    registry: Arc<TypeRegistry>,
    handlers: HandlerTable,
}

impl Connection {
    /// Create a connection that decodes inbound frames with `registry`.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            handlers: HandlerTable::new(),
        }
    }

    /// Register the handler for record type `E`.
    ///
    /// At most one handler per event; a second one fails with
    /// [`ClientError::DuplicateHandler`].
    pub fn on<E, F>(&mut self, handler: F) -> Result<()>
    where
        E: InboundShape,
        F: Fn(E) + Send + 'static,
    {
        self.handlers.register(handler)
    }

    /// Register a handler by `event` name, receiving the whole [`InboundEvent`].
    pub fn on_event<F>(&mut self, discriminator: &str, handler: F) -> Result<()>
    where
        F: Fn(InboundEvent) + Send + 'static,
    {
        self.handlers
            .register_by_name(&self.registry, discriminator, handler)
    }

    /// Connect to the port given at launch and register the plugin.
    pub async fn connect(self, args: &RegistrationArgs) -> Result<PluginHandle> {
        let registration = Registration::new(&args.register_event, &args.plugin_uuid);
        self.connect_url(&args.url(), &registration).await
    }

    /// Connect to an explicit WebSocket URL.
    ///
    /// The registration frame is written once and no reply is awaited.
    pub async fn connect_url(self, url: &str, registration: &Registration) -> Result<PluginHandle> {
        info!(%url, state = ?ConnectionState::Connecting, "connecting to Stream Deck");
        let (ws, _response) =
            tokio_tungstenite::connect_async(url)
                .await
                .map_err(|source| ClientError::Connect {
                    url: url.to_string(),
                    source,
                })?;
        let (mut sink, stream) = ws.split();

        debug!(event = %registration.event, "writing registration");
        let text = serde_json::to_string(registration)?;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(ClientError::Handshake)?;

        let (state_tx, state_rx) = watch::channel(ConnectionState::Open);
        let router = Router::new(self.registry, self.handlers);
        let writer = Arc::new(Mutex::new(sink));

        info!("starting reader");
        tokio::spawn(read_loop(stream, router, writer.clone(), ExitSignal(state_tx)));

        Ok(PluginHandle {
            writer,
            state: state_rx,
        })
    }
}

/// Moves the session to [`ConnectionState::Closed`] when dropped.
///
/// Held by the read loop so that the exit signal also fires when the task
/// unwinds out of a panicking handler.
struct ExitSignal(watch::Sender<ConnectionState>);

impl Drop for ExitSignal {
    fn drop(&mut self) {
        self.0.send_replace(ConnectionState::Closed);
    }
}

/// Reads frames until the transport ends, routing each text frame.
///
/// Frames are handled strictly one after another; the exit signal is
/// raised exactly once, after the last frame and the close handshake.
async fn read_loop(
    mut stream: SplitStream<WsStream>,
    router: Router,
    writer: Arc<Mutex<WsSink>>,
    _exit: ExitSignal,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                trace!(frame = %text.as_str(), "received");
                router.route(text.as_str());
            }
            Ok(Message::Close(close)) => {
                debug!(?close, "close frame received");
                break;
            }
            Ok(other) => {
                trace!(len = other.len(), "ignoring non-text frame");
            }
            Err(e) => {
                warn!("WebSocket read error: {}", e);
                break;
            }
        }
    }

    info!("websocket closed, shutting down reader");
    // Flushes the queued close reply, completing the handshake from our side.
    if let Err(e) = writer.lock().await.close().await {
        debug!("close handshake not completed: {}", e);
    }
}

/// An open plugin session.
///
/// Cheap to clone; clones share the writer, so concurrent sends are
/// written one at a time.
#[derive(Clone)]
pub struct PluginHandle {
    writer: Arc<Mutex<WsSink>>,
    state: watch::Receiver<ConnectionState>,
}

impl PluginHandle {
    /// Serialize `command` and write it as one text frame.
    ///
    /// Transport errors are returned as-is; nothing is retried.
    pub async fn send<C: Outbound>(&self, command: &C) -> Result<()> {
        let text = serde_json::to_string(command)?;
        debug!(event = command.event_name(), context = ?command.context(), "sending command");
        self.write(text).await
    }

    /// Write an arbitrary JSON value as one frame.
    pub async fn send_raw(&self, value: &serde_json::Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        debug!("sending raw frame");
        self.write(text).await
    }

    async fn write(&self, text: String) -> Result<()> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        let mut sink = self.writer.lock().await;
        sink.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// [`ConnectionState::Open`] until the read loop ends, then [`ConnectionState::Closed`].
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.state().is_terminal()
    }

    /// Wait until the Stream Deck application closes the connection.
    ///
    /// Any number of callers may wait; all are released together. Returns
    /// immediately once the connection is already closed.
    pub async fn wait_for_exit(&self) {
        let mut state = self.state.clone();
        if state.wait_for(|s| s.is_terminal()).await.is_err() {
            warn!("reader stopped without signalling exit");
        }
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
