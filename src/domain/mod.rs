// Domain layer: report models and the ports (traits) adapters implement.

pub mod model;
pub mod ports;
