pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::http::{HttpBackend, HttpOrderStore, TableSubscriptionSource};
pub use crate::adapters::memory::MemoryOrderStore;
pub use crate::config::FunnelConfig;
pub use crate::core::availability::AvailabilityResolver;
pub use crate::core::catalog::{AddOnCatalog, SubscriptionCatalog};
pub use crate::core::payment::{InvoiceRequester, PaymentSettingsResolver};
pub use crate::core::persist::OrderPersister;
pub use crate::utils::error::{FunnelError, Result};
