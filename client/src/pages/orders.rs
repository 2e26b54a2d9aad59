//! Orders page controller
//!
//! Buyers see their own orders, farmers see incoming sales and may confirm
//! or reject the pending ones.

use async_trait::async_trait;
use shared::{validate_status_change, Order, OrderStatus, UserType};

use super::list::{ListPage, ListSource};
use crate::error::ApiResult;
use crate::services::OrderService;

pub struct OrderList {
    service: OrderService,
}

impl OrderList {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ListSource for OrderList {
    type Item = Order;

    const LOAD_FAILED: &'static str = "Failed to load orders";
    const REQUIRES_USER: bool = true;

    async fn fetch(&self) -> ApiResult<Vec<Order>> {
        self.service.list_orders().await
    }
}

pub type OrdersPage = ListPage<OrderList>;

impl ListPage<OrderList> {
    pub fn viewer_role(&self) -> Option<UserType> {
        self.session().state().user().map(|user| user.user_type)
    }

    pub fn heading(&self) -> &'static str {
        match self.viewer_role() {
            Some(UserType::Farmer) => "My Sales",
            _ => "My Orders",
        }
    }

    /// Status buttons to render for an order; empty for buyers
    pub fn available_actions(&self, order: &Order) -> &'static [OrderStatus] {
        match self.viewer_role() {
            Some(role) => order.available_actions(role),
            None => &[],
        }
    }

    pub async fn load_orders(&self) -> bool {
        self.reload().await
    }

    /// Ask the server to move an order to `status`, then reload the list.
    ///
    /// Nothing is sent unless the viewer is a farmer and the order, as last
    /// fetched, allows that transition.
    pub async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> bool {
        if !self.accepts_actions() {
            return false;
        }
        let Some(role) = self.viewer_role() else {
            return false;
        };
        let Some(current) = self
            .items()
            .iter()
            .find(|order| order.id == order_id)
            .map(|order| order.status)
        else {
            tracing::debug!(order_id, "Order not in the current listing");
            return false;
        };
        if let Err(reason) = validate_status_change(role, current, status) {
            tracing::debug!(order_id, %current, %status, "Status change refused: {}", reason);
            return false;
        }

        self.mutate(
            self.source().service.update_status(order_id, status),
            "Order status updated",
            "Failed to update order status",
        )
        .await
    }
}
