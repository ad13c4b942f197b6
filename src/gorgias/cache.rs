//! Cache keys and lifetimes for Gorgias resources.

use chrono::Duration;
use serde_json::json;

use crate::cache::cache_key;

use super::types::{ListCustomersParams, ListTicketsParams};

/// Prefix shared by ticket list and single-ticket keys.
pub const TICKET_PREFIX: &str = "ticket";

/// Cache TTL per resource.
pub struct CacheTtl;

impl CacheTtl {
  // Lists move when tickets are opened or closed
  pub fn ticket_list() -> Duration {
    Duration::minutes(5)
  }

  // A single ticket changes with every customer or agent reply
  pub fn ticket() -> Duration {
    Duration::minutes(1)
  }

  pub fn customers() -> Duration {
    Duration::minutes(15)
  }
}

pub fn tickets_key(params: &ListTicketsParams) -> Result<String, serde_json::Error> {
  cache_key("tickets", params)
}

pub fn ticket_key(id: u64) -> Result<String, serde_json::Error> {
  cache_key("ticket", &json!({ "id": id }))
}

pub fn customers_key(params: &ListCustomersParams) -> Result<String, serde_json::Error> {
  cache_key("customers", params)
}

pub fn customer_key(id: u64) -> Result<String, serde_json::Error> {
  cache_key("customer", &json!({ "id": id }))
}
