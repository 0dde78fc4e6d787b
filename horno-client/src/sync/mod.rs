//! Realtime order-sync channel
//!
//! One long-lived connection to the order-events hub per client. The
//! channel announces itself with a handshake, then consumes refresh
//! and attention signals and republishes them on an in-process
//! broadcast bus. The connection is kept alive forever: on loss the
//! actor reconnects with capped exponential backoff and re-announces
//! itself, while consumers keep their subscriptions untouched.

pub mod transport;

pub use transport::{ChannelError, MemoryTransport, TcpTransport, Transport};

use shared::message::{
    AttentionPayload, EventType, HandshakePayload, SyncAction, SyncPayload, WireMessage,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

/// First reconnect delay after a connection loss
const BACKOFF_INITIAL: Duration = Duration::from_millis(500);
/// Ceiling for the reconnect delay
const BACKOFF_MAX: Duration = Duration::from_secs(30);

/// Observable connection state of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Signal republished to in-process consumers
#[derive(Debug, Clone, PartialEq)]
pub enum OrderSignal {
    /// A new order exists; re-fetch the list
    Created(String),
    /// An existing order changed; re-fetch the list
    Updated(String),
    /// Out-of-band: a human must look at something
    AttentionRequired { source: String, message: String },
}

/// Produces a fresh transport for every (re)connection attempt
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn Transport>, ChannelError>;
}

/// Redials the hub's TCP address on every attempt
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>, ChannelError> {
        Ok(Arc::new(TcpTransport::connect(&self.addr).await?))
    }
}

/// Re-subscribes to an in-process broadcast pair on every attempt
pub struct MemoryConnector {
    hub_broadcast_tx: broadcast::Sender<WireMessage>,
    client_to_hub_tx: broadcast::Sender<WireMessage>,
}

impl MemoryConnector {
    pub fn new(
        hub_broadcast_tx: &broadcast::Sender<WireMessage>,
        client_to_hub_tx: &broadcast::Sender<WireMessage>,
    ) -> Self {
        Self {
            hub_broadcast_tx: hub_broadcast_tx.clone(),
            client_to_hub_tx: client_to_hub_tx.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>, ChannelError> {
        Ok(Arc::new(MemoryTransport::new(
            &self.hub_broadcast_tx,
            &self.client_to_hub_tx,
        )))
    }
}

/// Handle to the order-sync actor.
///
/// Dropping the handle does not stop the actor; call
/// [`SyncChannel::shutdown`] for an orderly stop.
pub struct SyncChannel {
    signal_tx: broadcast::Sender<OrderSignal>,
    status_rx: watch::Receiver<ConnectionStatus>,
    cancel: CancellationToken,
}

impl SyncChannel {
    /// Spawn the channel actor. It starts connecting immediately and
    /// keeps the connection alive until [`SyncChannel::shutdown`].
    pub fn spawn(connector: impl Connector + 'static, handshake: HandshakePayload) -> Self {
        let (signal_tx, _) = broadcast::channel(1024);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let cancel = CancellationToken::new();

        tokio::spawn(run_channel(
            Arc::new(connector) as Arc<dyn Connector>,
            handshake,
            signal_tx.clone(),
            status_tx,
            cancel.clone(),
        ));

        Self {
            signal_tx,
            status_rx,
            cancel,
        }
    }

    /// Subscribe to order signals. Signals published while the channel
    /// was disconnected are not replayed; the next refresh covers them.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderSignal> {
        self.signal_tx.subscribe()
    }

    /// Watch the connection status, for the status indicator
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Stop the actor and drop the connection
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

async fn run_channel(
    connector: Arc<dyn Connector>,
    handshake: HandshakePayload,
    signal_tx: broadcast::Sender<OrderSignal>,
    status_tx: watch::Sender<ConnectionStatus>,
    cancel: CancellationToken,
) {
    let mut backoff = BACKOFF_INITIAL;

    loop {
        if cancel.is_cancelled() {
            break;
        }
        let _ = status_tx.send(ConnectionStatus::Connecting);

        let transport = tokio::select! {
            () = cancel.cancelled() => break,
            result = connector.connect() => match result {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(error = %e, delay_ms = backoff.as_millis() as u64, "sync connect failed, retrying");
                    let _ = status_tx.send(ConnectionStatus::Disconnected);
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(BACKOFF_MAX);
                    continue;
                }
            },
        };

        if let Err(e) = announce(transport.as_ref(), &handshake).await {
            tracing::warn!(error = %e, "sync handshake failed, reconnecting");
            let _ = transport.close().await;
            let _ = status_tx.send(ConnectionStatus::Disconnected);
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(BACKOFF_MAX);
            continue;
        }

        tracing::info!(station = %handshake.station_name, "sync channel connected");
        let _ = status_tx.send(ConnectionStatus::Connected);
        backoff = BACKOFF_INITIAL;

        read_until_closed(transport.as_ref(), &signal_tx, &cancel).await;

        let _ = transport.close().await;
        let _ = status_tx.send(ConnectionStatus::Disconnected);
        if cancel.is_cancelled() {
            break;
        }
        tracing::warn!("sync connection lost, reconnecting");
    }

    let _ = status_tx.send(ConnectionStatus::Disconnected);
}

async fn announce(
    transport: &dyn Transport,
    handshake: &HandshakePayload,
) -> Result<(), ChannelError> {
    let msg = WireMessage::handshake(handshake)?;
    transport.write_message(&msg).await
}

/// Pump frames into the signal bus until the connection drops or the
/// channel is shut down.
async fn read_until_closed(
    transport: &dyn Transport,
    signal_tx: &broadcast::Sender<OrderSignal>,
    cancel: &CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            () = cancel.cancelled() => return,
            result = transport.read_message() => match result {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(error = %e, "sync read ended");
                    return;
                }
            },
        };

        if let Some(signal) = decode_signal(&msg) {
            // Send fails only with zero subscribers; nothing to do.
            let _ = signal_tx.send(signal);
        }
    }
}

/// Map a wire frame to an in-process signal. Unknown or malformed
/// frames are dropped with a trace; they must never kill the channel.
fn decode_signal(msg: &WireMessage) -> Option<OrderSignal> {
    match msg.event_type {
        EventType::Sync => match msg.parse_payload::<SyncPayload>() {
            Ok(payload) => Some(match payload.action {
                SyncAction::Created => OrderSignal::Created(payload.id),
                SyncAction::Updated => OrderSignal::Updated(payload.id),
            }),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed sync payload");
                None
            }
        },
        EventType::Attention => match msg.parse_payload::<AttentionPayload>() {
            Ok(payload) => Some(OrderSignal::AttentionRequired {
                source: payload.source,
                message: payload.message,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed attention payload");
                None
            }
        },
        EventType::Handshake => {
            tracing::debug!("ignoring unexpected handshake frame from hub");
            None
        }
    }
}
