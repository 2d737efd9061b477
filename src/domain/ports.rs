use crate::domain::model::{RawStockResponse, SessionToken};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable home of the single active session token.
pub trait SessionStore: Send + Sync {
    /// Overwrites any previously saved token.
    fn save(&self, token: &SessionToken) -> impl std::future::Future<Output = Result<()>> + Send;
    /// `Ok(None)` when nobody is logged in.
    fn load(&self) -> impl std::future::Future<Output = Result<Option<SessionToken>>> + Send;
    /// Idempotent.
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The remote inventory service. Implementations are stateless and one-shot.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<()>;
    async fn login(&self, username: &str, password: &str) -> Result<SessionToken>;
    async fn query_stock(
        &self,
        sku: &str,
        base: &str,
        token: Option<&SessionToken>,
    ) -> Result<RawStockResponse>;
}
