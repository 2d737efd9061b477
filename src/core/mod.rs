pub mod normalizer;
pub mod service;
pub mod variant;

pub use crate::domain::model::{
    LocationPayload, LocationRecord, ParsedVariant, RawStockResponse, SessionToken, StockResult,
    UpdateDate, VariantGroup,
};
pub use crate::domain::ports::{InventoryApi, SessionStore};
pub use crate::utils::error::Result;
