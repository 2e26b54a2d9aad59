//! In-process storefront API used by the integration tests
//!
//! Serves the cart, order and auth endpoints over real HTTP with axum so the
//! client is exercised end to end through reqwest. Every request is counted
//! per endpoint and failures can be injected per endpoint.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::Json;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::{
    Animal, CartItem, CheckoutInput, LoginInput, Order, OrderItem, OrderStatus,
    UpdateCartItemInput, UpdateOrderStatusInput, User, UserType,
};
use storefront_client::{
    Config, MemoryTokenStore, NoticeBoard, Route, Router, Storefront, TokenStore,
};
use tokio::sync::Notify;

pub const VALID_TOKEN: &str = "valid-token";
pub const PASSWORD: &str = "secret123";

// ============================================================================
// Mock server
// ============================================================================

#[derive(Default)]
pub struct MockState {
    pub user: Mutex<Option<User>>,
    pub cart: Mutex<Vec<CartItem>>,
    pub orders: Mutex<Vec<Order>>,
    /// Requests per endpoint, keyed like `"GET /cart"`
    pub hits: Mutex<HashMap<String, usize>>,
    /// Authorization header of every request, in arrival order
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub checkout_inputs: Mutex<Vec<CheckoutInput>>,
    failures: Mutex<HashMap<String, VecDeque<(StatusCode, Value)>>>,
    /// Answer every authenticated endpoint with 401
    pub reject_all: AtomicBool,
    /// Hold checkout responses until `checkout_gate` is notified
    pub hold_checkout: AtomicBool,
    pub checkout_gate: Notify,
    /// Announced once a held checkout has arrived
    pub checkout_arrived: Notify,
    /// Hold GET /cart responses until `cart_gate` is notified
    pub hold_cart: AtomicBool,
    pub cart_gate: Notify,
    pub cart_arrived: Notify,
    next_order_id: AtomicI64,
}

impl MockState {
    pub fn hits(&self, endpoint: &str) -> usize {
        self.hits.lock().get(endpoint).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().values().sum()
    }

    /// Answer the next request to `endpoint` with `status` and `body`
    pub fn fail_next(&self, endpoint: &str, status: StatusCode, body: Value) {
        self.failures
            .lock()
            .entry(endpoint.to_string())
            .or_default()
            .push_back((status, body));
    }

    pub fn set_cart(&self, items: Vec<CartItem>) {
        *self.cart.lock() = items;
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        *self.orders.lock() = orders;
    }

    fn record(&self, endpoint: &str, headers: &HeaderMap) {
        *self.hits.lock().entry(endpoint.to_string()).or_insert(0) += 1;
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().push(auth);
    }

    /// Count the request, then decide whether it is answered by an injected
    /// failure or rejected for a missing or wrong bearer token
    fn admit(&self, endpoint: &str, headers: &HeaderMap) -> Result<(), Response> {
        self.record(endpoint, headers);

        if let Some((status, body)) = self
            .failures
            .lock()
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
        {
            return Err((status, Json(body)).into_response());
        }

        let expected = format!("Bearer {}", VALID_TOKEN);
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == expected)
            .unwrap_or(false);

        if self.reject_all.load(Ordering::SeqCst) || !authorized {
            return Err(unauthorized());
        }
        Ok(())
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Token has expired" })),
    )
        .into_response()
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        state.next_order_id.store(100, Ordering::SeqCst);

        let app = axum::Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/profile", get(profile))
            .route("/api/cart", get(get_cart))
            .route("/api/cart/items/:id", put(update_item).delete(remove_item))
            .route("/api/cart/checkout", post(checkout))
            .route("/api/orders", get(list_orders))
            .route("/api/orders/:id/status", patch(update_order_status))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

type Shared = State<Arc<MockState>>;

async fn login(State(state): Shared, headers: HeaderMap, Json(input): Json<LoginInput>) -> Response {
    state.record("POST /auth/login", &headers);
    let user = state.user.lock().clone();
    match user {
        Some(user) if user.email.as_deref() == Some(input.email.as_str()) && input.password == PASSWORD => {
            Json(json!({
                "message": "Login successful",
                "access_token": VALID_TOKEN,
                "user": user,
            }))
            .into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response(),
    }
}

async fn profile(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.admit("GET /auth/profile", &headers) {
        return response;
    }
    let user = state.user.lock().clone();
    match user {
        Some(user) => Json(json!({ "user": user })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "User not found" }))).into_response(),
    }
}

async fn get_cart(State(state): Shared, headers: HeaderMap) -> Response {
    let admitted = state.admit("GET /cart", &headers);
    // capture the snapshot before any hold so late answers carry stale data
    let items = state.cart.lock().clone();
    // only the first request after arming is held
    if state.hold_cart.swap(false, Ordering::SeqCst) {
        state.cart_arrived.notify_one();
        state.cart_gate.notified().await;
    }
    if let Err(response) = admitted {
        return response;
    }
    Json(json!({ "items": items })).into_response()
}

async fn update_item(
    State(state): Shared,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<UpdateCartItemInput>,
) -> Response {
    if let Err(response) = state.admit("PUT /cart/items", &headers) {
        return response;
    }
    if input.quantity < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Quantity must be at least 1" })),
        )
            .into_response();
    }
    let mut cart = state.cart.lock();
    match cart.iter_mut().find(|item| item.id == id) {
        Some(item) => {
            item.quantity = input.quantity;
            Json(json!({ "message": "Cart updated" })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Cart item not found" })),
        )
            .into_response(),
    }
}

async fn remove_item(State(state): Shared, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    if let Err(response) = state.admit("DELETE /cart/items", &headers) {
        return response;
    }
    let mut cart = state.cart.lock();
    let before = cart.len();
    cart.retain(|item| item.id != id);
    if cart.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Cart item not found" })),
        )
            .into_response();
    }
    Json(json!({ "message": "Item removed from cart" })).into_response()
}

async fn checkout(State(state): Shared, headers: HeaderMap, Json(input): Json<CheckoutInput>) -> Response {
    if let Err(response) = state.admit("POST /cart/checkout", &headers) {
        return response;
    }
    state.checkout_inputs.lock().push(input.clone());

    if state.hold_checkout.load(Ordering::SeqCst) {
        state.checkout_arrived.notify_one();
        state.checkout_gate.notified().await;
    }

    let items = std::mem::take(&mut *state.cart.lock());
    if items.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Cart is empty" }))).into_response();
    }

    let total = shared::cart_subtotal(&items);
    let order_id = state.next_order_id.fetch_add(1, Ordering::SeqCst);
    state.orders.lock().push(Order {
        id: order_id,
        status: OrderStatus::Pending,
        created_at: Some("2024-03-01T10:00:00".to_string()),
        total_amount: total,
        shipping_address: Some(input.shipping_address),
        order_items: items
            .iter()
            .map(|item| OrderItem {
                id: Some(item.id),
                animal: None,
                animal_name: Some(item.animal.name.clone()),
                quantity: item.quantity,
                price: item.animal.price,
                subtotal: Some(item.line_total()),
            })
            .collect(),
        user: None,
    });

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully",
            "order_id": order_id,
            "total_amount": total,
        })),
    )
        .into_response()
}

async fn list_orders(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(response) = state.admit("GET /orders", &headers) {
        return response;
    }
    let orders = state.orders.lock().clone();
    Json(json!({ "orders": orders })).into_response()
}

async fn update_order_status(
    State(state): Shared,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<UpdateOrderStatusInput>,
) -> Response {
    if let Err(response) = state.admit("PATCH /orders/status", &headers) {
        return response;
    }
    let is_farmer = state
        .user
        .lock()
        .as_ref()
        .map(|u| u.user_type == UserType::Farmer)
        .unwrap_or(false);
    if !is_farmer {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Only farmers can update order status" })),
        )
            .into_response();
    }

    let mut orders = state.orders.lock();
    match orders.iter_mut().find(|order| order.id == id) {
        Some(order) if order.status.can_transition_to(input.status) => {
            order.status = input.status;
            Json(json!({ "message": "Order status updated" })).into_response()
        }
        Some(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid status transition" })),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Order not found" }))).into_response(),
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn user(user_type: UserType) -> User {
    User {
        id: 7,
        email: Some("someone@example.com".to_string()),
        first_name: Some("Ama".to_string()),
        last_name: Some("Owusu".to_string()),
        user_type,
        address: Some("12 Ranch Road".to_string()),
        phone: None,
    }
}

pub fn cart_item(id: i64, quantity: u32, price: &str) -> CartItem {
    CartItem {
        id,
        quantity,
        animal: Animal {
            id: id * 10,
            name: format!("Animal {}", id),
            breed: Some("Boer".to_string()),
            animal_type: Some("goat".to_string()),
            age: Some(12),
            price: price.parse::<Decimal>().expect("price"),
            image_url: None,
        },
    }
}

pub fn order(id: i64, status: OrderStatus) -> Order {
    Order {
        id,
        status,
        created_at: Some("2024-02-10T08:30:00Z".to_string()),
        total_amount: Decimal::new(2500, 2),
        shipping_address: Some("12 Ranch Road".to_string()),
        order_items: vec![OrderItem {
            id: Some(1),
            animal: None,
            animal_name: Some("Bessie".to_string()),
            quantity: 1,
            price: Decimal::new(2500, 2),
            subtotal: None,
        }],
        user: None,
    }
}

// ============================================================================
// Client harness
// ============================================================================

pub struct TestApp {
    pub server: MockServer,
    pub app: Storefront,
    pub storage: Arc<MemoryTokenStore>,
    pub router: Arc<Router>,
    pub notices: Arc<NoticeBoard>,
}

impl TestApp {
    /// A client holding `token` (if any) against a fresh mock server whose
    /// account is a `user_type`. The session is not resolved yet.
    pub async fn new(user_type: UserType, token: Option<&str>) -> Self {
        let server = MockServer::start().await;
        *server.state.user.lock() = Some(user(user_type));

        let storage = Arc::new(match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        });
        let router = Arc::new(Router::new(Route::Other("/".to_string())));
        let notices = Arc::new(NoticeBoard::new());
        let app = Storefront::new(
            Config::with_base_url(server.base_url()),
            storage.clone(),
            router.clone(),
            notices.clone(),
        );

        Self {
            server,
            app,
            storage,
            router,
            notices,
        }
    }

    /// A client whose persisted token was accepted by the profile endpoint
    pub async fn signed_in(user_type: UserType) -> Self {
        let app = Self::new(user_type, Some(VALID_TOKEN)).await;
        app.app.auth().restore().await.expect("restore session");
        app
    }

    pub fn state(&self) -> &MockState {
        &self.server.state
    }

    pub fn token(&self) -> Option<String> {
        self.storage.load().expect("token store")
    }

    pub fn notice_messages(&self) -> Vec<String> {
        self.notices
            .snapshot()
            .into_iter()
            .map(|notice| notice.message)
            .collect()
    }
}
