// Adapters layer: concrete implementations for external systems (http backend, order store).

pub mod http;
pub mod memory;
