//! # Cart State
//!
//! One cart per client, kept in memory only. Carts hold intent (product,
//! variant, quantity, force flag); prices are quoted live from the catalog.

use std::collections::HashMap;
use std::sync::Mutex;

use loom_core::cart::Cart;

/// Per-client carts behind a single mutex.
///
/// Operations on a cart are short and synchronous, so one lock for all
/// clients is enough.
#[derive(Debug, Default)]
pub struct CartState {
    carts: Mutex<HashMap<String, Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` on the client's cart, creating an empty one if needed.
    pub fn with_cart_mut<F, R>(&self, client_id: &str, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self.carts.lock().expect("Cart mutex poisoned");
        f(carts.entry(client_id.to_string()).or_default())
    }

    /// Copy of the client's cart (empty if they never had one).
    pub fn snapshot(&self, client_id: &str) -> Cart {
        let carts = self.carts.lock().expect("Cart mutex poisoned");
        carts.get(client_id).cloned().unwrap_or_default()
    }

    /// Number of clients with a non-empty cart.
    pub fn active_carts(&self) -> usize {
        let carts = self.carts.lock().expect("Cart mutex poisoned");
        carts.values().filter(|c| !c.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carts_are_per_client() {
        let state = CartState::new();
        state.with_cart_mut("c1", |cart| cart.push_line("silk", None, 10, false));

        assert_eq!(state.snapshot("c1").items().len(), 1);
        assert!(state.snapshot("c2").is_empty());
        assert_eq!(state.active_carts(), 1);

        state.with_cart_mut("c1", |cart| cart.clear());
        assert_eq!(state.active_carts(), 0);
        assert!(state.snapshot("c1").is_empty());
    }
}
