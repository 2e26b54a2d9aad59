//! Order service

use shared::{ApiMessage, Order, OrderStatus, OrdersResponse, UpdateOrderStatusInput};

use crate::error::ApiResult;
use crate::http::ApiClient;

/// Order endpoints of the storefront API
#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List orders visible to the signed-in account.
    ///
    /// The server picks the listing from the token: buyers get their own
    /// orders, farmers get incoming sales.
    pub async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        let response: OrdersResponse = self.api.get("/orders").await?;
        tracing::debug!("Fetched {} order(s)", response.orders.len());
        Ok(response.orders)
    }

    /// Request a status change for an order
    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> ApiResult<ApiMessage> {
        let input = UpdateOrderStatusInput { status };
        let message = self
            .api
            .patch(&format!("/orders/{}/status", order_id), &input)
            .await?;
        tracing::info!(order_id, %status, "Order status change accepted");
        Ok(message)
    }
}
