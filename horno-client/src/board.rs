//! Shared order board
//!
//! Client-side cache of today's orders, refreshed whole from the
//! backend whenever a sync signal arrives. Signals carry no diffs, so
//! a refresh triggered by signal N also reflects everything the
//! backend applied before N; coalescing bursts into one refresh is
//! therefore always safe.

use crate::error::ClientResult;
use crate::sync::OrderSignal;
use crate::OrderBackend;
use shared::models::Order;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// A pending attention notice shown until the operator dismisses it
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionNotice {
    pub source: String,
    pub message: String,
}

#[derive(Default)]
struct BoardState {
    orders: Vec<Order>,
    /// Generation of the fetch whose result is currently applied
    applied: u64,
}

/// Today's orders as this client last saw them
#[derive(Clone)]
pub struct OrderBoard {
    backend: Arc<dyn OrderBackend>,
    state: Arc<RwLock<BoardState>>,
    notices: Arc<RwLock<Vec<AttentionNotice>>>,
    generation: Arc<AtomicU64>,
}

impl OrderBoard {
    pub fn new(backend: Arc<dyn OrderBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(BoardState::default())),
            notices: Arc::new(RwLock::new(Vec::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Re-fetch today's orders and replace the cached list.
    ///
    /// Fetches are generation-tagged: when two refreshes overlap, a
    /// slower older fetch can finish after a newer one and must not
    /// roll the board back, so only the newest started fetch applies.
    pub async fn refresh(&self) -> ClientResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let orders = self.backend.list_today_orders().await?;

        let mut state = self.state.write().await;
        if generation > state.applied {
            state.orders = orders;
            state.applied = generation;
        }
        Ok(())
    }

    /// The cached list, newest first as the backend returns it
    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    /// Pending attention notices, oldest first
    pub async fn notices(&self) -> Vec<AttentionNotice> {
        self.notices.read().await.clone()
    }

    /// Drop all pending notices (operator acknowledged them)
    pub async fn dismiss_notices(&self) {
        self.notices.write().await.clear();
    }

    /// Consume sync signals until the channel closes or `cancel`
    /// fires. Refresh signals re-pull the list; attention signals pile
    /// up as notices. Lagging behind the bus is recovered by a plain
    /// refresh, since refreshes converge regardless of missed signals.
    pub fn follow(
        &self,
        mut signals: broadcast::Receiver<OrderSignal>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let board = self.clone();
        tokio::spawn(async move {
            loop {
                let signal = tokio::select! {
                    () = cancel.cancelled() => return,
                    result = signals.recv() => match result {
                        Ok(signal) => signal,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(missed, "order signal bus lagged, refreshing");
                            if let Err(e) = board.refresh().await {
                                tracing::warn!(error = %e, "board refresh failed");
                            }
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    },
                };

                match signal {
                    OrderSignal::Created(id) | OrderSignal::Updated(id) => {
                        tracing::debug!(order_id = %id, "refreshing board on sync signal");
                        if let Err(e) = board.refresh().await {
                            tracing::warn!(error = %e, "board refresh failed");
                        }
                    }
                    OrderSignal::AttentionRequired { source, message } => {
                        tracing::info!(%source, "attention signal received");
                        board
                            .notices
                            .write()
                            .await
                            .push(AttentionNotice { source, message });
                    }
                }
            }
        })
    }
}
