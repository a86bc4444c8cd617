pub mod availability;
pub mod candidates;
pub mod catalog;
pub mod payment;
pub mod persist;

pub use crate::domain::model::{
    AddOnItem, DomainCandidate, DomainStatus, DomainSuggestion, InvoiceReceipt, InvoiceRequest,
    OrderRecord, OrderStatus, PaymentSettings, StepPayload, SubscriptionAddOn,
};
pub use crate::domain::ports::{
    AddOnCatalogSource, DomainChecker, OrderStore, PaymentGateway, SessionProvider,
    SubscriptionAddOnSource,
};
pub use crate::utils::error::Result;
