// Adapters layer: concrete implementations of the domain ports (storage, data sources).

pub mod http;
pub mod snapshot;
pub mod storage;
