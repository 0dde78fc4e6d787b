//! Order submission
//!
//! Validates the draft against the order-type rules, builds the wire
//! payload, submits it exactly once, and reacts to the result. At most
//! one submission is in flight per submitter: a second `submit` while
//! the first is pending is rejected without disturbing it.

use crate::cart::OrderDraft;
use crate::draft::DraftSession;
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::notify::{DeliveryNotifier, HandoffItem, HandoffTicket};
use crate::OrderBackend;
use shared::models::{CreateOrderRequest, Order, OrderKind};
use std::sync::{Arc, Mutex};

/// Submission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Submits drafts to the backend, one at a time.
pub struct OrderSubmitter {
    backend: Arc<dyn OrderBackend>,
    notifier: Option<Arc<dyn DeliveryNotifier>>,
    state: Mutex<SubmissionState>,
}

impl OrderSubmitter {
    pub fn new(backend: Arc<dyn OrderBackend>) -> Self {
        Self {
            backend,
            notifier: None,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    /// Attach the delivery hand-off collaborator.
    pub fn with_notifier(mut self, notifier: Arc<dyn DeliveryNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate and submit the draft.
    ///
    /// Returns the created order. On any error the caller's draft is
    /// untouched, so the operator retries without re-entering data.
    pub async fn submit(&self, draft: &OrderDraft) -> ClientResult<Order> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == SubmissionState::Submitting {
                return Err(ClientError::SubmissionInFlight);
            }
            *state = SubmissionState::Validating;
        }

        if let Err(rule) = validate(draft) {
            self.set_state(SubmissionState::Failed);
            return Err(rule.into());
        }

        self.set_state(SubmissionState::Submitting);
        let request = build_request(draft);
        let result = self.backend.create_order(&request).await;

        match result {
            Ok(order) => {
                tracing::info!(order_id = %order.id, kind = ?order.kind, "order accepted");
                self.dispatch_handoff(draft, &order).await;
                self.set_state(SubmissionState::Succeeded);
                Ok(order)
            }
            Err(e) => {
                tracing::warn!(error = %e, "order submission failed");
                self.set_state(SubmissionState::Failed);
                Err(e)
            }
        }
    }

    /// Submit the session's draft; on acceptance clear it for the next
    /// order (kind and payment method kept) and flush the snapshot.
    pub async fn submit_session(&self, session: &mut DraftSession) -> ClientResult<Order> {
        let order = self.submit(&session.draft().clone()).await?;
        session.reset_after_submit()?;
        Ok(order)
    }

    fn set_state(&self, next: SubmissionState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Fire the hand-off ticket for an accepted delivery order with an
    /// assigned courier. Failures are logged, never propagated.
    async fn dispatch_handoff(&self, draft: &OrderDraft, order: &Order) {
        if draft.kind != OrderKind::Domicilio {
            return;
        }
        let Some(courier_phone) = draft.courier_phone.as_deref() else {
            return;
        };
        let Some(notifier) = self.notifier.as_ref() else {
            return;
        };

        let ticket = build_ticket(draft, order, courier_phone);
        if let Err(e) = notifier.notify(&ticket).await {
            tracing::warn!(order_id = %order.id, error = %e, "delivery hand-off notification failed");
        }
    }
}

/// Check the order-type rules in order; the first violated rule wins.
pub fn validate(draft: &OrderDraft) -> Result<(), ValidationError> {
    match draft.kind {
        OrderKind::Mesa => {
            if draft
                .table_number
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
            {
                return Err(ValidationError::TableRequired);
            }
        }
        OrderKind::Domicilio => {
            if draft.customer_name.trim().is_empty() {
                return Err(ValidationError::CustomerNameRequired);
            }
            if draft.address.resolved().is_none() {
                return Err(ValidationError::DeliveryAddressRequired);
            }
        }
        OrderKind::Llevar => {
            if draft.customer_name.trim().is_empty() {
                return Err(ValidationError::CustomerNameRequired);
            }
        }
    }

    if draft.cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    Ok(())
}

/// Map a validated draft to the wire payload.
fn build_request(draft: &OrderDraft) -> CreateOrderRequest {
    CreateOrderRequest {
        kind: draft.kind,
        customer_name: draft.customer_name.trim().to_string(),
        customer_phone: draft.customer_phone.clone(),
        table_number: draft.table_number.clone(),
        delivery_address: draft.address.resolved().map(str::to_string),
        courier_phone: draft.courier_phone.clone(),
        lines: draft.cart.to_order_lines(),
        total: draft.total(),
        delivery_fee: draft.delivery_fee,
        payment_method: draft.payment_method.clone(),
        notes: (!draft.notes.trim().is_empty()).then(|| draft.notes.trim().to_string()),
    }
}

fn build_ticket(draft: &OrderDraft, order: &Order, courier_phone: &str) -> HandoffTicket {
    HandoffTicket {
        order_id: order.id.clone(),
        customer_name: draft.customer_name.trim().to_string(),
        address: draft.address.resolved().unwrap_or_default().to_string(),
        customer_phone: draft.customer_phone.clone(),
        courier_phone: courier_phone.to_string(),
        items: draft
            .cart
            .lines()
            .iter()
            .map(|l| HandoffItem {
                name: format!("{} {}", l.product_name, l.variant_name),
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect(),
        total: draft.total(),
        delivery_fee: draft.delivery_fee,
        payment_method: draft.payment_method.clone(),
    }
}
