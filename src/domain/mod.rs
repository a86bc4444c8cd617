// Domain layer: core models and ports (interfaces). No external collaborators beyond serde.

pub mod model;
pub mod ports;
