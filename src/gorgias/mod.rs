pub mod cache;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;
