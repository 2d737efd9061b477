pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{FileSessionStore, InventoryClient, MemorySessionStore};
pub use app::console::{Console, PasswordInput};
pub use config::ClientConfig;
pub use core::service::StockService;
pub use utils::error::{InventoryError, QueryErrorKind, Result};
