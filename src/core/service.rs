use crate::config::StockConfig;
use crate::core::normalizer;
use crate::domain::model::StockResult;
use crate::domain::ports::{InventoryApi, SessionStore};
use crate::utils::error::{InventoryError, Result};
use tokio::sync::Mutex;

/// Entry point for the presentation layer: ties the remote API to the
/// injected session store.
pub struct StockService<A: InventoryApi, S: SessionStore> {
    api: A,
    store: S,
    stock: StockConfig,
    in_flight: Mutex<()>,
}

impl<A: InventoryApi, S: SessionStore> StockService<A, S> {
    pub fn new(api: A, store: S, stock: StockConfig) -> Self {
        Self {
            api,
            store,
            stock,
            in_flight: Mutex::new(()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn default_base(&self) -> &str {
        &self.stock.default_base
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        self.api.register(username.trim(), password).await
    }

    /// Logs in and persists the issued token.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let token = self.api.login(username.trim(), password).await?;
        self.store.save(&token).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub async fn has_session(&self) -> Result<bool> {
        Ok(self.store.load().await?.is_some())
    }

    /// Runs one stock query. A rejected token clears the stored session
    /// before the error is returned.
    pub async fn query(&self, sku: &str, base: &str) -> Result<StockResult> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| InventoryError::QueryInProgress)?;

        let sku = sku.trim();
        let base = match base.trim() {
            "" => self.stock.default_base.as_str(),
            base => base,
        };

        if sku.is_empty() {
            return Err(InventoryError::ValidationError {
                message: "SKU cannot be empty".to_string(),
            });
        }
        if !self.stock.is_known_base(base) {
            tracing::warn!("Base '{}' is not in the configured list; sending anyway", base);
        }

        // The server decides whether a missing token is acceptable.
        let token = match self.store.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read session, continuing without a token: {}", e);
                None
            }
        };

        match self.api.query_stock(sku, base, token.as_ref()).await {
            Ok(raw) => {
                let result = normalizer::normalize(raw);
                tracing::info!(
                    "Stock for '{}' at {}: {} variants",
                    sku,
                    base,
                    result.len()
                );
                Ok(result)
            }
            Err(e) if e.requires_reauthentication() => {
                tracing::warn!("Stock query rejected the session, clearing token");
                if let Err(clear_err) = self.store.clear().await {
                    tracing::error!("Failed to clear rejected session: {}", clear_err);
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
