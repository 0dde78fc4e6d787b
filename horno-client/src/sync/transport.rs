use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use shared::message::{EventType, WireMessage};

/// Largest payload accepted off the wire
const MAX_PAYLOAD: usize = 4 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transport abstraction for the order-sync channel
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn read_message(&self) -> Result<WireMessage, ChannelError>;
    async fn write_message(&self, msg: &WireMessage) -> Result<(), ChannelError>;
    async fn close(&self) -> Result<(), ChannelError>;
}

/// TCP transport.
///
/// Frame layout: event type (1 byte), message id (16 bytes), payload
/// length (u32 LE), payload bytes.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, ChannelError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read_message(&self) -> Result<WireMessage, ChannelError> {
        let mut reader = self.reader.lock().await;

        // Event type (1 byte)
        let mut type_buf = [0u8; 1];
        reader.read_exact(&mut type_buf).await?;
        let event_type = EventType::try_from(type_buf[0])
            .map_err(|e| ChannelError::InvalidMessage(e.to_string()))?;

        // Message id (16 bytes)
        let mut uuid_buf = [0u8; 16];
        reader.read_exact(&mut uuid_buf).await?;
        let id = Uuid::from_bytes(uuid_buf);

        // Payload length (4 bytes)
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_PAYLOAD {
            return Err(ChannelError::InvalidMessage(format!(
                "payload of {len} bytes exceeds limit"
            )));
        }

        // Payload
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).await?;

        Ok(WireMessage {
            id,
            event_type,
            payload,
        })
    }

    async fn write_message(&self, msg: &WireMessage) -> Result<(), ChannelError> {
        let mut writer = self.writer.lock().await;
        let mut data = Vec::with_capacity(21 + msg.payload.len());
        data.push(msg.event_type as u8);
        data.extend_from_slice(msg.id.as_bytes());
        data.extend_from_slice(&(msg.payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&msg.payload);

        writer.write_all(&data).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ChannelError> {
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
        Ok(())
    }
}

/// In-process transport over a pair of broadcast channels, for tests
/// and single-process deployments.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    /// Messages FROM the hub
    rx: Arc<Mutex<broadcast::Receiver<WireMessage>>>,
    /// Messages TO the hub
    tx: broadcast::Sender<WireMessage>,
}

impl MemoryTransport {
    pub fn new(
        hub_broadcast_tx: &broadcast::Sender<WireMessage>,
        client_to_hub_tx: &broadcast::Sender<WireMessage>,
    ) -> Self {
        Self {
            rx: Arc::new(Mutex::new(hub_broadcast_tx.subscribe())),
            tx: client_to_hub_tx.clone(),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_message(&self) -> Result<WireMessage, ChannelError> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .map_err(|e| ChannelError::Connection(format!("memory channel error: {e}")))
    }

    async fn write_message(&self, msg: &WireMessage) -> Result<(), ChannelError> {
        self.tx
            .send(msg.clone())
            .map_err(|e| ChannelError::Connection(format!("failed to send to hub: {e}")))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
