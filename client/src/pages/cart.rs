//! Cart page controller

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{cart_subtotal, validate_quantity, CartItem, CheckoutInput, CheckoutReceipt};

use super::list::{ListPage, ListSource, ListView};
use crate::error::{ApiError, ApiResult};
use crate::navigation::{Navigator, Route};
use crate::notify::Notice;
use crate::services::CartService;

/// Cart lines fetched from the cart service
pub struct CartList {
    service: CartService,
    checking_out: AtomicBool,
}

impl CartList {
    pub fn new(service: CartService) -> Self {
        Self {
            service,
            checking_out: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ListSource for CartList {
    type Item = CartItem;

    const LOAD_FAILED: &'static str = "Failed to load cart";
    const REQUIRES_USER: bool = false;

    async fn fetch(&self) -> ApiResult<Vec<CartItem>> {
        self.service.get_cart().await
    }
}

pub type CartPage = ListPage<CartList>;

/// Result of a checkout attempt
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    Placed(CheckoutReceipt),
    /// Another checkout was still outstanding; nothing was sent
    AlreadyInProgress,
    /// The page is not accepting actions (unmounted or redirecting)
    Unavailable,
    Failed(ApiError),
}

/// Marks a checkout as outstanding until dropped
struct CheckoutFlight<'a>(&'a AtomicBool);

impl<'a> CheckoutFlight<'a> {
    fn begin(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CheckoutFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ListView<CartItem> {
    /// Sum of price times quantity over the snapshot
    pub fn subtotal(&self) -> Decimal {
        cart_subtotal(&self.items)
    }

    /// Shipping is free, so the total equals the subtotal
    pub fn total(&self) -> Decimal {
        self.subtotal()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl ListPage<CartList> {
    pub fn subtotal(&self) -> Decimal {
        cart_subtotal(&self.items())
    }

    pub fn is_checking_out(&self) -> bool {
        self.source().checking_out.load(Ordering::SeqCst)
    }

    pub async fn load_cart(&self) -> bool {
        self.reload().await
    }

    /// Change the quantity of a line, then reload the cart.
    ///
    /// Quantities below one are refused locally without any request.
    pub async fn update_quantity(&self, item_id: i64, quantity: i64) -> bool {
        let input = match validate_quantity(quantity) {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(item_id, quantity, "Quantity refused: {}", e);
                return false;
            }
        };
        if !self.accepts_actions() {
            return false;
        }

        self.mutate(
            self.source().service.update_item(item_id, &input),
            "Cart updated",
            "Failed to update cart",
        )
        .await
    }

    pub async fn remove_item(&self, item_id: i64) -> bool {
        if !self.accepts_actions() {
            return false;
        }

        self.mutate(
            self.source().service.remove_item(item_id),
            "Item removed from cart",
            "Failed to remove item",
        )
        .await
    }

    /// Place an order for the whole cart.
    ///
    /// While a checkout is outstanding further calls return
    /// [`CheckoutOutcome::AlreadyInProgress`] without sending anything.
    pub async fn checkout(&self) -> CheckoutOutcome {
        if !self.accepts_actions() {
            return CheckoutOutcome::Unavailable;
        }
        let Some(_flight) = CheckoutFlight::begin(&self.source().checking_out) else {
            tracing::debug!("Checkout already in progress");
            return CheckoutOutcome::AlreadyInProgress;
        };

        let address = self
            .session()
            .state()
            .user()
            .and_then(|user| user.shipping_address().map(str::to_string));
        let input = CheckoutInput::for_address(address.as_deref());

        match self.source().service.checkout(&input).await {
            Ok(receipt) => {
                self.clear();
                self.notify(Notice::success("Order placed successfully!"));
                self.session().navigator().navigate(Route::Orders);
                CheckoutOutcome::Placed(receipt)
            }
            Err(e) if e.is_unauthorized() => {
                self.notify_session_expired();
                self.end_session(&e);
                CheckoutOutcome::Failed(e)
            }
            Err(e) => {
                tracing::warn!("Checkout failed: {}", e);
                self.notify(Notice::error(e.user_message("Checkout failed")));
                CheckoutOutcome::Failed(e)
            }
        }
    }
}
