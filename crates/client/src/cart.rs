//! Cart state.
//!
//! The server owns the cart; every mutation sends the change and adopts
//! the full cart the server returns. Fetches and mutations are serialized
//! through an async mutex so their effects land in issue order, and every
//! response carries the generation it was issued under: `reset()` bumps the
//! generation, so responses from before a reset are discarded instead of
//! resurrecting a signed-out user's cart.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::Mutex;
use tracing::{debug, instrument};

use maplemart_core::{Cart, Price, ProductId};

use crate::api::ApiClient;
use crate::error::{ActionError, ActionResult, ApiError};

/// Store for the shopping cart.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: ApiClient,
    cart: RwLock<Cart>,
    loading: AtomicBool,
    /// Bumped by `reset()`; responses issued under an older generation
    /// are stale and must not be installed.
    generation: AtomicU64,
    /// Serializes fetches and mutations so the last-issued one wins.
    mutation: Mutex<()>,
}

impl CartStore {
    #[must_use]
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                cart: RwLock::new(Cart::empty()),
                loading: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                mutation: Mutex::new(()),
            }),
        }
    }

    /// Fetch the cart from the server and adopt it.
    ///
    /// Takes the same mutation lock as the mutating operations: a fetch
    /// racing a mutation must not overwrite the mutation's fresher server
    /// cart with an older snapshot.
    ///
    /// # Errors
    ///
    /// Returns a display-message error; the local cart is unchanged on
    /// failure.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> ActionResult {
        let _serialized = self.inner.mutation.lock().await;
        let issued = self.generation();
        self.inner.loading.store(true, Ordering::SeqCst);
        let result = self.inner.api.cart().await;
        self.inner.loading.store(false, Ordering::SeqCst);

        let cart = result.map_err(|e| ActionError::from_api(&e, "Failed to load cart"))?;
        self.install(cart, issued);
        Ok(())
    }

    /// Add units of a product.
    ///
    /// # Errors
    ///
    /// Returns a display-message error; the local cart is unchanged on
    /// failure.
    #[instrument(skip(self), fields(product = %product_id))]
    pub async fn add_item(&self, product_id: &ProductId, quantity: u32) -> ActionResult {
        self.mutate("Failed to add to cart", |api| async move {
            api.add_to_cart(product_id, quantity).await
        })
        .await
    }

    /// Set the absolute quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Rejects a quantity of zero without contacting the server; use
    /// [`Self::remove_item`] to drop a line. Otherwise returns a
    /// display-message error on request failure.
    #[instrument(skip(self), fields(product = %product_id))]
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> ActionResult {
        if quantity == 0 {
            return Err(ActionError::new("Quantity must be at least 1"));
        }
        self.mutate("Failed to update quantity", |api| async move {
            api.update_cart_item(product_id, quantity).await
        })
        .await
    }

    /// Remove a product's line entirely.
    ///
    /// # Errors
    ///
    /// Returns a display-message error; the local cart is unchanged on
    /// failure.
    #[instrument(skip(self), fields(product = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> ActionResult {
        self.mutate("Failed to remove from cart", |api| async move {
            api.remove_from_cart(product_id).await
        })
        .await
    }

    /// Empty the cart on the server.
    ///
    /// # Errors
    ///
    /// Returns a display-message error; the local cart is unchanged on
    /// failure.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> ActionResult {
        self.mutate("Failed to clear cart", |api| async move {
            api.clear_cart().await
        })
        .await
    }

    /// Drop the local cart without contacting the server. Bumping the
    /// generation first means any response still in flight is discarded.
    pub(crate) fn reset(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let mut guard = self
            .inner
            .cart
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Cart::empty();
    }

    /// A snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.inner
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .item_count()
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.inner
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subtotal()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    /// Weak handle for wiring callbacks without keeping the store alive.
    pub(crate) fn downgrade(&self) -> WeakCartStore {
        WeakCartStore(Arc::downgrade(&self.inner))
    }

    /// Run one serialized mutation: snapshot the generation, call the
    /// server, and adopt the returned cart if still current.
    async fn mutate<'a, F, Fut>(&'a self, fallback: &str, call: F) -> ActionResult
    where
        F: FnOnce(&'a ApiClient) -> Fut,
        Fut: Future<Output = Result<Cart, ApiError>> + 'a,
    {
        let _serialized = self.inner.mutation.lock().await;
        let issued = self.generation();
        let cart = call(&self.inner.api)
            .await
            .map_err(|e| ActionError::from_api(&e, fallback))?;
        self.install(cart, issued);
        Ok(())
    }

    /// Adopt a server cart, unless the store was reset after the request
    /// was issued.
    fn install(&self, cart: Cart, issued: u64) {
        let mut guard = self
            .inner
            .cart
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if self.generation() != issued {
            debug!(issued, "discarding cart response from before a reset");
            return;
        }
        *guard = cart;
    }

    fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }
}

/// Weak handle to a [`CartStore`].
pub(crate) struct WeakCartStore(Weak<CartStoreInner>);

impl WeakCartStore {
    pub(crate) fn upgrade(&self) -> Option<CartStore> {
        self.0.upgrade().map(|inner| CartStore { inner })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpClient;
    use crate::storage::MemoryStore;
    use maplemart_core::{LineItem, ProductSummary};
    use rust_decimal::Decimal;

    fn store() -> CartStore {
        let storage: Arc<dyn crate::storage::CredentialStore> = Arc::new(MemoryStore::new());
        let config = ClientConfig::new(
            "http://127.0.0.1:9".parse().unwrap(),
            std::env::temp_dir(),
        );
        CartStore::new(ApiClient::new(HttpClient::new(&config, storage)))
    }

    fn cart_with_one_line() -> Cart {
        Cart {
            items: vec![LineItem {
                product: ProductSummary {
                    id: "p1".into(),
                    name: "Mug".to_owned(),
                    price: Price::new(Decimal::new(999, 2)),
                    image: "mug.png".to_owned(),
                },
                quantity: 2,
            }],
        }
    }

    #[test]
    fn test_starts_empty_and_idle() {
        let cart = store();
        assert!(cart.cart().is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), Price::ZERO);
        assert!(!cart.is_loading());
    }

    #[tokio::test]
    async fn test_set_quantity_zero_fails_without_server() {
        // The base URL points at a closed port, so any request would
        // surface a transport error rather than this message.
        let cart = store();
        let error = cart
            .set_quantity(&ProductId::new("p1"), 0)
            .await
            .unwrap_err();
        assert_eq!(error.message(), "Quantity must be at least 1");
    }

    #[test]
    fn test_install_adopts_current_generation() {
        let cart = store();
        let issued = cart.generation();
        cart.install(cart_with_one_line(), issued);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_install_discards_stale_generation() {
        let cart = store();
        let issued = cart.generation();
        cart.reset();
        cart.install(cart_with_one_line(), issued);
        assert!(cart.cart().is_empty());
    }

    #[test]
    fn test_reset_empties_cart() {
        let cart = store();
        let issued = cart.generation();
        cart.install(cart_with_one_line(), issued);
        assert!(!cart.cart().is_empty());

        cart.reset();
        assert!(cart.cart().is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
    }
}
