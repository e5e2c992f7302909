pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use db::create_pool;
pub use error::{AppError, BillingError};
pub use models::{Bill, Detection, LineItem};
pub use service::{BillingService, CatalogRegistry, PriceCatalog};
