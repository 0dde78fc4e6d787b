//! Consumed REST surface
//!
//! The backend owns storage, auth and bookkeeping; this module is the
//! client's only way in. [`OrderBackend`] is the seam: the real
//! implementation speaks HTTP via reqwest, tests substitute an
//! in-memory one.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shared::models::{
    Courier, CreateOrderRequest, Customer, FlavorCatalog, Order, UpdateOrderRequest,
};

/// Backend operations the order-intake core consumes
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Submit a new order
    async fn create_order(&self, req: &CreateOrderRequest) -> ClientResult<Order>;

    /// Partial update, state changes included
    async fn update_order(&self, id: &str, req: &UpdateOrderRequest) -> ClientResult<Order>;

    /// Today's orders, newest first
    async fn list_today_orders(&self) -> ClientResult<Vec<Order>>;

    /// The flavor catalog (read-only)
    async fn fetch_flavor_catalog(&self) -> ClientResult<FlavorCatalog>;

    /// Active couriers
    async fn fetch_couriers(&self) -> ClientResult<Vec<Courier>>;

    /// Look a returning customer up by phone; None when unknown
    async fn customer_by_phone(&self, phone: &str) -> ClientResult<Option<Customer>>;
}

/// HTTP implementation of [`OrderBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(map_transport_error)?;
        handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        handle_response(response).await
    }

    async fn patch<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        handle_response(response).await
    }
}

/// Map a reqwest transport failure into the taxonomy.
fn map_transport_error(e: reqwest::Error) -> ClientError {
    if e.is_connect() || e.is_timeout() {
        ClientError::NetworkUnreachable
    } else {
        ClientError::Connection(e.to_string())
    }
}

/// Map the response status into the taxonomy, or decode the body.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();

    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(status_error(status, detail));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))
}

fn status_error(status: StatusCode, detail: String) -> ClientError {
    match status.as_u16() {
        404 => ClientError::ServiceNotFound,
        400..=499 => ClientError::InvalidData(if detail.is_empty() {
            "solicitud inválida".to_string()
        } else {
            detail
        }),
        500..=599 => ClientError::ServerError,
        other => ClientError::Rejected { status: other },
    }
}

#[async_trait]
impl OrderBackend for HttpBackend {
    async fn create_order(&self, req: &CreateOrderRequest) -> ClientResult<Order> {
        self.post("api/orders", req).await
    }

    async fn update_order(&self, id: &str, req: &UpdateOrderRequest) -> ClientResult<Order> {
        self.patch(&format!("api/orders/{id}"), req).await
    }

    async fn list_today_orders(&self) -> ClientResult<Vec<Order>> {
        self.get("api/orders/today").await
    }

    async fn fetch_flavor_catalog(&self) -> ClientResult<FlavorCatalog> {
        let entries: Vec<shared::models::Flavor> = self.get("api/flavors").await?;
        Ok(FlavorCatalog::new(entries))
    }

    async fn fetch_couriers(&self) -> ClientResult<Vec<Courier>> {
        self.get("api/couriers").await
    }

    async fn customer_by_phone(&self, phone: &str) -> ClientResult<Option<Customer>> {
        match self.get(&format!("api/customers/by-phone/{phone}")).await {
            Ok(customer) => Ok(Some(customer)),
            Err(ClientError::ServiceNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
