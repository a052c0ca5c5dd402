//! Integration tests for Maplemart.
//!
//! The client is exercised against [`StubApi`], an in-process HTTP server
//! that speaks the remote API's wire protocol: bearer-token auth, JSON
//! bodies, `{ "message": ... }` error payloads, and full-cart responses
//! from every cart mutation.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p maplemart-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use maplemart_core::{
    Cart, Identity, LineItem, Order, OrderId, OrderStatus, PaymentInfo, Price, Product, ProductId,
    Role, ShippingAddress, UserId,
};

use maplemart_client::storage::MemoryStore;
use maplemart_client::{AppState, ClientConfig};

type Shared = Arc<Mutex<StubState>>;

// =============================================================================
// Test fixture
// =============================================================================

/// A stub server plus a client wired to it with in-memory credential
/// storage.
pub struct TestApp {
    pub stub: StubApi,
    pub app: AppState,
    pub store: Arc<MemoryStore>,
}

/// Spawn a stub server and build an [`AppState`] pointed at it.
///
/// # Panics
///
/// Panics if the stub's URL does not parse; it always does.
#[allow(clippy::unwrap_used)]
pub async fn test_app() -> TestApp {
    let stub = StubApi::spawn().await;
    let store = Arc::new(MemoryStore::new());
    let config = ClientConfig::new(stub.api_url().parse().unwrap(), std::env::temp_dir());
    let storage: Arc<dyn maplemart_client::storage::CredentialStore> = store.clone();
    let app = AppState::with_store(config, storage);
    TestApp { stub, app, store }
}

// =============================================================================
// Stub server state
// =============================================================================

struct StubUser {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct StubState {
    users: Vec<StubUser>,
    tokens: HashMap<String, UserId>,
    products: Vec<Product>,
    carts: HashMap<UserId, Cart>,
    orders: Vec<(UserId, Order)>,
    next_id: u64,
    /// When set, every cart mutation fails with a 500.
    fail_cart_mutations: bool,
}

impl StubState {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn user_by_token(&self, token: &str) -> Option<&StubUser> {
        let user_id = self.tokens.get(token)?;
        self.users.iter().find(|u| &u.identity.id == user_id)
    }
}

/// An in-process HTTP server implementing the storefront API.
pub struct StubApi {
    addr: SocketAddr,
    state: Shared,
}

impl StubApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound; tests cannot proceed then.
    #[allow(clippy::unwrap_used)]
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::default()));

        let router = Router::new()
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/auth/profile", get(profile))
            .route("/api/products", get(list_products).post(create_product))
            .route(
                "/api/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/api/cart", get(get_cart))
            .route("/api/cart/add", post(cart_add))
            .route("/api/cart/update", put(cart_update))
            .route("/api/cart/remove/{id}", delete(cart_remove))
            .route("/api/cart/clear", delete(cart_clear))
            .route("/api/orders", post(place_order).get(my_orders))
            .route("/api/orders/all", get(all_orders))
            .route("/api/orders/{id}", get(get_order))
            .route("/api/orders/{id}/status", put(update_order_status))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL of the API, ending in `/api`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Seed a product and return its ID.
    pub fn seed_product(&self, name: &str, price: Price, stock: u32) -> ProductId {
        let mut state = self.lock();
        let id = ProductId::new(state.fresh_id("p"));
        state.products.push(Product {
            id: id.clone(),
            name: name.to_owned(),
            description: format!("{name} description"),
            price,
            image: format!("{name}.png"),
            category: "General".to_owned(),
            stock,
        });
        id
    }

    /// Seed an account with the given role.
    ///
    /// # Panics
    ///
    /// Panics if `email` does not parse; test fixtures use literals.
    #[allow(clippy::unwrap_used)]
    pub fn seed_user(&self, name: &str, email: &str, password: &str, role: Role) {
        let mut state = self.lock();
        let id = UserId::new(state.fresh_id("u"));
        state.users.push(StubUser {
            identity: Identity {
                id,
                name: name.to_owned(),
                email: email.parse().unwrap(),
                role,
            },
            password: password.to_owned(),
        });
    }

    /// Invalidate every issued token: the next authenticated request gets
    /// a 401.
    pub fn revoke_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Make every cart mutation fail with a 500 until turned off.
    pub fn fail_cart_mutations(&self, fail: bool) {
        self.lock().fail_cart_mutations = fail;
    }

    /// Number of orders the server has recorded.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Response helpers
// =============================================================================

fn ok(value: Value) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

#[allow(clippy::unwrap_used)]
fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

fn lock(state: &Shared) -> std::sync::MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticate(state: &StubState, headers: &HeaderMap) -> Result<Identity, Response> {
    let token =
        bearer_token(headers).ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authorized"))?;
    state
        .user_by_token(token)
        .map(|u| u.identity.clone())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Token is not valid"))
}

fn require_admin(identity: &Identity) -> Result<(), Response> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(error(StatusCode::FORBIDDEN, "Admin access required"))
    }
}

// =============================================================================
// Auth handlers
// =============================================================================

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

fn auth_response(state: &mut StubState, identity: &Identity) -> Response {
    let token = state.fresh_id("tok");
    state.tokens.insert(token.clone(), identity.id.clone());

    let mut body = to_value(identity);
    body["token"] = json!(token);
    ok(body)
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = lock(&state);

    if state
        .users
        .iter()
        .any(|u| u.identity.email.as_str() == body.email)
    {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }

    let Ok(email) = body.email.parse() else {
        return error(StatusCode::BAD_REQUEST, "Invalid email");
    };

    let id = UserId::new(state.fresh_id("u"));
    let identity = Identity {
        id,
        name: body.name,
        email,
        role: Role::User,
    };
    state.users.push(StubUser {
        identity: identity.clone(),
        password: body.password,
    });

    auth_response(&mut state, &identity)
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut state = lock(&state);

    let Some(identity) = state
        .users
        .iter()
        .find(|u| u.identity.email.as_str() == body.email && u.password == body.password)
        .map(|u| u.identity.clone())
    else {
        return error(StatusCode::BAD_REQUEST, "Invalid credentials");
    };

    auth_response(&mut state, &identity)
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match authenticate(&state, &headers) {
        Ok(identity) => ok(to_value(&identity)),
        Err(response) => response,
    }
}

// =============================================================================
// Product handlers
// =============================================================================

#[derive(Deserialize)]
struct ProductQuery {
    category: Option<String>,
    search: Option<String>,
}

async fn list_products(
    State(state): State<Shared>,
    Query(query): Query<ProductQuery>,
) -> Response {
    let state = lock(&state);
    let products: Vec<&Product> = state
        .products
        .iter()
        .filter(|p| {
            query
                .category
                .as_ref()
                .is_none_or(|category| &p.category == category)
        })
        .filter(|p| {
            query
                .search
                .as_ref()
                .is_none_or(|term| p.name.to_lowercase().contains(&term.to_lowercase()))
        })
        .collect();
    ok(json!({ "products": to_value(&products) }))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = lock(&state);
    let id = ProductId::new(id);
    state.products.iter().find(|p| p.id == id).map_or_else(
        || error(StatusCode::NOT_FOUND, "Product not found"),
        |product| ok(to_value(product)),
    )
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&identity) {
        return response;
    }

    let mut body = body;
    body["id"] = json!(state.fresh_id("p"));
    let product: Product = match serde_json::from_value(body) {
        Ok(product) => product,
        Err(_) => return error(StatusCode::BAD_REQUEST, "Invalid product"),
    };
    state.products.push(product.clone());
    ok(to_value(&product))
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&identity) {
        return response;
    }

    let mut body = body;
    body["id"] = json!(id);
    let updated: Product = match serde_json::from_value(body) {
        Ok(product) => product,
        Err(_) => return error(StatusCode::BAD_REQUEST, "Invalid product"),
    };

    let Some(slot) = state.products.iter_mut().find(|p| p.id == updated.id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    *slot = updated.clone();
    ok(to_value(&updated))
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&identity) {
        return response;
    }

    let id = ProductId::new(id);
    let before = state.products.len();
    state.products.retain(|p| p.id != id);
    if state.products.len() == before {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    ok(json!({ "message": "Product removed" }))
}

// =============================================================================
// Cart handlers
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemBody {
    product_id: ProductId,
    quantity: u32,
}

fn cart_of<'a>(state: &'a mut StubState, user: &UserId) -> &'a mut Cart {
    state.carts.entry(user.clone()).or_insert_with(Cart::empty)
}

fn check_cart_available(state: &StubState) -> Result<(), Response> {
    if state.fail_cart_mutations {
        Err(error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Cart service unavailable",
        ))
    } else {
        Ok(())
    }
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    let cart = cart_of(&mut state, &identity.id).clone();
    ok(to_value(&cart))
}

async fn cart_add(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CartItemBody>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = check_cart_available(&state) {
        return response;
    }

    let Some(product) = state.products.iter().find(|p| p.id == body.product_id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    let summary = product.summary();

    let cart = cart_of(&mut state, &identity.id);
    if let Some(line) = cart
        .items
        .iter_mut()
        .find(|line| line.product.id == body.product_id)
    {
        line.quantity += body.quantity;
    } else {
        cart.items.push(LineItem {
            product: summary,
            quantity: body.quantity,
        });
    }
    ok(to_value(&cart.clone()))
}

async fn cart_update(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CartItemBody>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = check_cart_available(&state) {
        return response;
    }

    let cart = cart_of(&mut state, &identity.id);
    let Some(line) = cart
        .items
        .iter_mut()
        .find(|line| line.product.id == body.product_id)
    else {
        return error(StatusCode::NOT_FOUND, "Item not in cart");
    };
    line.quantity = body.quantity;
    ok(to_value(&cart.clone()))
}

async fn cart_remove(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = check_cart_available(&state) {
        return response;
    }

    let id = ProductId::new(id);
    let cart = cart_of(&mut state, &identity.id);
    cart.items.retain(|line| line.product.id != id);
    ok(to_value(&cart.clone()))
}

async fn cart_clear(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = check_cart_available(&state) {
        return response;
    }

    let cart = cart_of(&mut state, &identity.id);
    cart.items.clear();
    ok(to_value(&cart.clone()))
}

// =============================================================================
// Order handlers
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    shipping_address: ShippingAddress,
    payment_info: PaymentInfo,
}

#[derive(Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn place_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderBody>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let cart = cart_of(&mut state, &identity.id).clone();
    if cart.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let order = Order {
        id: OrderId::new(state.fresh_id("o")),
        user: None,
        items: cart.items.clone(),
        total_amount: cart.subtotal(),
        status: OrderStatus::Pending,
        shipping_address: body.shipping_address,
        payment_info: Some(body.payment_info),
        created_at: Utc::now(),
    };

    cart_of(&mut state, &identity.id).items.clear();
    state.orders.push((identity.id, order.clone()));
    ok(to_value(&order))
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let orders: Vec<&Order> = state
        .orders
        .iter()
        .filter(|(user, _)| user == &identity.id)
        .map(|(_, order)| order)
        .collect();
    ok(to_value(&orders))
}

async fn get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let id = OrderId::new(id);
    // Someone else's order looks like a missing one
    state
        .orders
        .iter()
        .find(|(owner, order)| order.id == id && (owner == &identity.id || identity.is_admin()))
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Order not found"),
            |(_, order)| ok(to_value(order)),
        )
}

async fn all_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&identity) {
        return response;
    }

    let orders: Vec<Order> = state
        .orders
        .iter()
        .map(|(user_id, order)| {
            let mut order = order.clone();
            order.user = state
                .users
                .iter()
                .find(|u| &u.identity.id == user_id)
                .map(|u| maplemart_core::OrderUser {
                    name: u.identity.name.clone(),
                    email: Some(u.identity.email.clone()),
                });
            order
        })
        .collect();
    ok(to_value(&orders))
}

async fn update_order_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Response {
    let mut state = lock(&state);
    let identity = match authenticate(&state, &headers) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&identity) {
        return response;
    }

    let id = OrderId::new(id);
    let Some((_, order)) = state.orders.iter_mut().find(|(_, order)| order.id == id) else {
        return error(StatusCode::NOT_FOUND, "Order not found");
    };
    order.status = body.status;
    ok(to_value(&order.clone()))
}
