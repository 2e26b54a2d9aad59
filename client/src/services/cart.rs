//! Cart service

use shared::{
    checked_cart_subtotal, ApiMessage, CartItem, CartResponse, CheckoutInput, CheckoutReceipt,
    UpdateCartItemInput,
};

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

/// Cart endpoints of the storefront API
#[derive(Clone)]
pub struct CartService {
    api: ApiClient,
}

impl CartService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the whole cart
    pub async fn get_cart(&self) -> ApiResult<Vec<CartItem>> {
        let cart: CartResponse = self.api.get("/cart").await?;
        if checked_cart_subtotal(&cart.items).is_none() {
            return Err(ApiError::Unclassified(
                "Cart total is out of range".to_string(),
            ));
        }
        tracing::debug!("Fetched cart with {} item(s)", cart.items.len());
        Ok(cart.items)
    }

    /// Set the quantity of a cart line
    pub async fn update_item(
        &self,
        item_id: i64,
        input: &UpdateCartItemInput,
    ) -> ApiResult<ApiMessage> {
        self.api
            .put(&format!("/cart/items/{}", item_id), input)
            .await
    }

    /// Remove a cart line
    pub async fn remove_item(&self, item_id: i64) -> ApiResult<ApiMessage> {
        self.api.delete(&format!("/cart/items/{}", item_id)).await
    }

    /// Turn the cart into an order
    pub async fn checkout(&self, input: &CheckoutInput) -> ApiResult<CheckoutReceipt> {
        let receipt: CheckoutReceipt = self.api.post("/cart/checkout", input).await?;
        tracing::info!(order_id = ?receipt.order_id, "Checkout accepted");
        Ok(receipt)
    }
}
