// Adapters layer: concrete implementations for external systems (http backend, token storage, notifications).

pub mod http;
pub mod notify;
pub mod storage;
