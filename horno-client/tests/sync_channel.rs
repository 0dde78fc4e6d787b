//! Sync channel lifecycle: connect, signal delivery, reconnect

use async_trait::async_trait;
use horno_client::sync::{MemoryConnector, SyncChannel, TcpConnector};
use horno_client::{
    ClientResult, ConnectionStatus, OrderBackend, OrderBoard, OrderSignal,
};
use shared::message::{
    AttentionPayload, EventType, HandshakePayload, StationRole, SyncPayload, WireMessage,
    PROTOCOL_VERSION,
};
use shared::models::{
    Courier, CreateOrderRequest, Customer, FlavorCatalog, Order, OrderKind, OrderState,
    UpdateOrderRequest,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn handshake() -> HandshakePayload {
    HandshakePayload {
        version: PROTOCOL_VERSION,
        role: StationRole::Mostrador,
        station_name: "mostrador-1".to_string(),
        client_id: None,
    }
}

async fn wait_for_status(channel: &SyncChannel, wanted: ConnectionStatus) {
    let mut status = channel.status();
    tokio::time::timeout(WAIT, status.wait_for(|s| *s == wanted))
        .await
        .expect("status wait timed out")
        .expect("status channel closed");
}

// ==================== Memory transport ====================

#[tokio::test]
async fn signals_flow_from_hub_to_subscribers() {
    let (hub_tx, _keep_hub) = broadcast::channel::<WireMessage>(16);
    let (client_tx, mut hub_rx) = broadcast::channel::<WireMessage>(16);

    let channel = SyncChannel::spawn(MemoryConnector::new(&hub_tx, &client_tx), handshake());
    let mut signals = channel.subscribe();
    wait_for_status(&channel, ConnectionStatus::Connected).await;

    // The channel announced itself first.
    let announced = tokio::time::timeout(WAIT, hub_rx.recv()).await.unwrap().unwrap();
    assert_eq!(announced.event_type, EventType::Handshake);
    let parsed: HandshakePayload = announced.parse_payload().unwrap();
    assert_eq!(parsed.role, StationRole::Mostrador);

    hub_tx
        .send(WireMessage::sync(&SyncPayload::created("ord-1")).unwrap())
        .unwrap();
    hub_tx
        .send(WireMessage::sync(&SyncPayload::updated("ord-1")).unwrap())
        .unwrap();
    hub_tx
        .send(
            WireMessage::attention(&AttentionPayload {
                source: "whatsapp".to_string(),
                message: "pedido sin atender".to_string(),
            })
            .unwrap(),
        )
        .unwrap();

    let first = tokio::time::timeout(WAIT, signals.recv()).await.unwrap().unwrap();
    assert_eq!(first, OrderSignal::Created("ord-1".to_string()));
    let second = tokio::time::timeout(WAIT, signals.recv()).await.unwrap().unwrap();
    assert_eq!(second, OrderSignal::Updated("ord-1".to_string()));
    let third = tokio::time::timeout(WAIT, signals.recv()).await.unwrap().unwrap();
    assert!(matches!(third, OrderSignal::AttentionRequired { ref source, .. } if source == "whatsapp"));

    channel.shutdown();
}

#[tokio::test]
async fn shutdown_reports_disconnected() {
    let (hub_tx, _keep_hub) = broadcast::channel::<WireMessage>(16);
    let (client_tx, _keep_client) = broadcast::channel::<WireMessage>(16);

    let channel = SyncChannel::spawn(MemoryConnector::new(&hub_tx, &client_tx), handshake());
    wait_for_status(&channel, ConnectionStatus::Connected).await;

    channel.shutdown();
    wait_for_status(&channel, ConnectionStatus::Disconnected).await;
}

// ==================== TCP transport ====================

async fn read_frame(stream: &mut TcpStream) -> WireMessage {
    let mut type_buf = [0u8; 1];
    stream.read_exact(&mut type_buf).await.unwrap();
    let event_type = EventType::try_from(type_buf[0]).unwrap();

    let mut uuid_buf = [0u8; 16];
    stream.read_exact(&mut uuid_buf).await.unwrap();

    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await.unwrap();
    let mut payload = vec![0u8; u32::from_le_bytes(len_buf) as usize];
    stream.read_exact(&mut payload).await.unwrap();

    WireMessage {
        id: Uuid::from_bytes(uuid_buf),
        event_type,
        payload,
    }
}

async fn write_frame(stream: &mut TcpStream, msg: &WireMessage) {
    let mut data = Vec::new();
    data.push(msg.event_type as u8);
    data.extend_from_slice(msg.id.as_bytes());
    data.extend_from_slice(&(msg.payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&msg.payload);
    stream.write_all(&data).await.unwrap();
}

#[tokio::test]
async fn reconnects_and_reannounces_after_connection_loss() {
    init_tracing();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let channel = SyncChannel::spawn(TcpConnector::new(&addr), handshake());
    let mut signals = channel.subscribe();

    // First session: handshake, one signal, then the hub drops us.
    let (mut stream, _) = tokio::time::timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let announced = read_frame(&mut stream).await;
    assert_eq!(announced.event_type, EventType::Handshake);

    write_frame(
        &mut stream,
        &WireMessage::sync(&SyncPayload::created("ord-1")).unwrap(),
    )
    .await;
    let signal = tokio::time::timeout(WAIT, signals.recv()).await.unwrap().unwrap();
    assert_eq!(signal, OrderSignal::Created("ord-1".to_string()));
    wait_for_status(&channel, ConnectionStatus::Connected).await;

    drop(stream);

    // Second session: the channel comes back by itself and announces
    // again; the old subscription keeps working. The accept itself is
    // the reconnect proof, since status may flap faster than a watch
    // reader observes it.
    let (mut stream, _) = tokio::time::timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    let announced = read_frame(&mut stream).await;
    assert_eq!(announced.event_type, EventType::Handshake);
    wait_for_status(&channel, ConnectionStatus::Connected).await;

    write_frame(
        &mut stream,
        &WireMessage::sync(&SyncPayload::updated("ord-1")).unwrap(),
    )
    .await;
    let signal = tokio::time::timeout(WAIT, signals.recv()).await.unwrap().unwrap();
    assert_eq!(signal, OrderSignal::Updated("ord-1".to_string()));

    channel.shutdown();
}

#[tokio::test]
async fn keeps_retrying_until_the_hub_appears() {
    init_tracing();
    // Reserve a port, then close the listener so the first attempts fail.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let channel = SyncChannel::spawn(TcpConnector::new(&addr), handshake());
    wait_for_status(&channel, ConnectionStatus::Disconnected).await;

    // Hub comes up late; the channel finds it on a retry.
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    let (mut stream, _) = tokio::time::timeout(Duration::from_secs(10), listener.accept())
        .await
        .unwrap()
        .unwrap();
    let announced = read_frame(&mut stream).await;
    assert_eq!(announced.event_type, EventType::Handshake);
    wait_for_status(&channel, ConnectionStatus::Connected).await;

    channel.shutdown();
}

// ==================== Board convergence ====================

#[derive(Default)]
struct ListBackend {
    orders: Mutex<Vec<Order>>,
}

impl ListBackend {
    async fn push(&self, id: &str) {
        self.orders.lock().await.push(Order {
            id: id.to_string(),
            kind: OrderKind::Llevar,
            state: OrderState::Pendiente,
            created_at: chrono::Utc::now(),
            customer_name: "Luis".to_string(),
            customer_phone: None,
            table_number: None,
            delivery_address: None,
            courier_phone: None,
            lines: vec![],
            total: 18000.0,
            delivery_fee: None,
            payment_method: None,
            notes: None,
            invoice_ref: None,
        });
    }
}

#[async_trait]
impl OrderBackend for ListBackend {
    async fn create_order(&self, _req: &CreateOrderRequest) -> ClientResult<Order> {
        unimplemented!("not used in these tests")
    }

    async fn update_order(&self, _id: &str, _req: &UpdateOrderRequest) -> ClientResult<Order> {
        unimplemented!("not used in these tests")
    }

    async fn list_today_orders(&self) -> ClientResult<Vec<Order>> {
        Ok(self.orders.lock().await.clone())
    }

    async fn fetch_flavor_catalog(&self) -> ClientResult<FlavorCatalog> {
        Ok(FlavorCatalog::new(Vec::new()))
    }

    async fn fetch_couriers(&self) -> ClientResult<Vec<Courier>> {
        Ok(Vec::new())
    }

    async fn customer_by_phone(&self, _phone: &str) -> ClientResult<Option<Customer>> {
        Ok(None)
    }
}

#[tokio::test]
async fn board_converges_on_sync_signals() {
    init_tracing();
    let (hub_tx, _keep_hub) = broadcast::channel::<WireMessage>(16);
    let (client_tx, _keep_client) = broadcast::channel::<WireMessage>(16);

    let backend = Arc::new(ListBackend::default());
    let board = OrderBoard::new(backend.clone());
    let channel = SyncChannel::spawn(MemoryConnector::new(&hub_tx, &client_tx), handshake());
    wait_for_status(&channel, ConnectionStatus::Connected).await;

    let cancel = CancellationToken::new();
    let follower = board.follow(channel.subscribe(), cancel.clone());

    backend.push("ord-1").await;
    hub_tx
        .send(WireMessage::sync(&SyncPayload::created("ord-1")).unwrap())
        .unwrap();

    // Converges to the backend state within the wait window.
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        if board.orders().await.iter().any(|o| o.id == "ord-1") {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "board never converged");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // Attention signals pile up as notices instead of refreshing.
    hub_tx
        .send(
            WireMessage::attention(&AttentionPayload {
                source: "whatsapp".to_string(),
                message: "pedido sin atender".to_string(),
            })
            .unwrap(),
        )
        .unwrap();

    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        if !board.notices().await.is_empty() {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "notice never arrived");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(board.notices().await[0].source, "whatsapp");

    board.dismiss_notices().await;
    assert!(board.notices().await.is_empty());

    cancel.cancel();
    let _ = follower.await;
    channel.shutdown();
}
