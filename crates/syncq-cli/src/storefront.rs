//! Storefront state mutated through the processor: cart, team roster, stock.
//!
//! Every mutation is an [`Operation`] so it only ever runs on the drain loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use syncq_core::{Operation, SyncError};

#[derive(Debug, Default, Serialize)]
pub struct Storefront {
    pub cart: BTreeMap<String, u32>,
    pub team: BTreeMap<String, String>,
    pub stock: BTreeMap<String, i64>,
}

pub type SharedStore = Arc<Mutex<Storefront>>;

impl Storefront {
    pub fn with_stock(items: &[(&str, i64)]) -> SharedStore {
        let mut store = Storefront::default();
        for (sku, qty) in items {
            store.stock.insert(sku.to_string(), *qty);
        }
        Arc::new(Mutex::new(store))
    }
}

pub struct AddToCart {
    pub store: SharedStore,
    pub sku: String,
    label: String,
}

impl AddToCart {
    pub fn new(store: SharedStore, sku: impl Into<String>) -> Self {
        let sku = sku.into();
        Self {
            store,
            label: format!("cart.add {sku}"),
            sku,
        }
    }
}

#[async_trait]
impl Operation for AddToCart {
    async fn execute(self: Box<Self>) -> Result<(), SyncError> {
        let mut store = self.store.lock().await;
        let available = store.stock.get(&self.sku).copied().unwrap_or(0);
        if available <= 0 {
            return Err(SyncError::failed(format!("{} is out of stock", self.sku)));
        }
        store.stock.insert(self.sku.clone(), available - 1);
        *store.cart.entry(self.sku.clone()).or_default() += 1;
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

pub struct EditTeamMember {
    pub store: SharedStore,
    pub name: String,
    pub role: String,
    label: String,
}

impl EditTeamMember {
    pub fn new(store: SharedStore, name: impl Into<String>, role: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            store,
            label: format!("team.edit {name}"),
            name,
            role: role.into(),
        }
    }
}

#[async_trait]
impl Operation for EditTeamMember {
    async fn execute(self: Box<Self>) -> Result<(), SyncError> {
        let mut store = self.store.lock().await;
        store.team.insert(self.name.clone(), self.role.clone());
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

pub struct StockChange {
    pub store: SharedStore,
    pub sku: String,
    pub delta: i64,
    label: String,
}

impl StockChange {
    pub fn new(store: SharedStore, sku: impl Into<String>, delta: i64) -> Self {
        let sku = sku.into();
        Self {
            store,
            label: format!("stock {sku} {delta:+}"),
            sku,
            delta,
        }
    }
}

#[async_trait]
impl Operation for StockChange {
    async fn execute(self: Box<Self>) -> Result<(), SyncError> {
        let mut store = self.store.lock().await;
        let qty = store.stock.entry(self.sku.clone()).or_default();
        *qty = (*qty + self.delta).max(0);
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_to_cart_moves_one_unit_from_stock() {
        let store = Storefront::with_stock(&[("laptop", 2)]);
        Box::new(AddToCart::new(Arc::clone(&store), "laptop"))
            .execute()
            .await
            .unwrap();

        let store = store.lock().await;
        assert_eq!(store.cart["laptop"], 1);
        assert_eq!(store.stock["laptop"], 1);
    }

    #[tokio::test]
    async fn add_to_cart_fails_when_out_of_stock() {
        let store = Storefront::with_stock(&[("mouse", 0)]);
        let err = Box::new(AddToCart::new(Arc::clone(&store), "mouse"))
            .execute()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("out of stock"));
        assert!(store.lock().await.cart.is_empty());
    }

    #[tokio::test]
    async fn stock_never_goes_negative() {
        let store = Storefront::with_stock(&[("monitor", 1)]);
        Box::new(StockChange::new(Arc::clone(&store), "monitor", -5))
            .execute()
            .await
            .unwrap();

        assert_eq!(store.lock().await.stock["monitor"], 0);
    }
}
