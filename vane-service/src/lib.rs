//! Vane Service - Orchestration Layer
//!
//! Business logic between the HTTP surface and the storage/provider
//! edges: cache-aside reads, invalidate-on-write, and the concurrent
//! history fan-out. This crate has no HTTP types and no SQL; it talks
//! only to the traits defined in vane-storage and vane-provider.

pub mod history;
pub mod service;

pub use history::{HistoryAggregator, DEFAULT_MAX_WINDOW_DAYS};
pub use service::{LocationWeatherService, DEFAULT_COUNTRY_CODE};
