//! Cached Gorgias client that wraps GorgiasClient with transparent caching.

use tracing::debug;

use crate::cache::{CacheLayer, CacheOptions, CacheStats};
use crate::config::Config;

use super::cache::{customer_key, customers_key, ticket_key, tickets_key, CacheTtl, TICKET_PREFIX};
use super::client::GorgiasClient;
use super::error::GorgiasError;
use super::transport::{HttpTransport, ReqwestTransport};
use super::types::{
  Customer, ListCustomersParams, ListResponse, ListTicketsParams, Message, NewMessage, NewTicket,
  Ticket,
};

/// Gorgias client with transparent caching support.
///
/// Reads go through the cache layer. Writes always hit the API and then
/// invalidate the entries they can make stale.
#[derive(Clone)]
pub struct CachedGorgiasClient<T = ReqwestTransport> {
  inner: GorgiasClient<T>,
  cache: CacheLayer,
  /// Skip cache reads (fresh values are still stored)
  bypass_cache: bool,
}

impl CachedGorgiasClient<ReqwestTransport> {
  /// Create a new cached client from configuration.
  pub fn new(config: &Config) -> Result<Self, GorgiasError> {
    let inner = GorgiasClient::new(&config.gorgias)?;
    let cache = CacheLayer::new(config.cache.namespace.clone())
      .with_default_ttl(config.cache.default_ttl());
    if !config.cache.enabled {
      cache.disable();
    }

    Ok(Self::from_parts(inner, cache))
  }
}

impl<T: HttpTransport> CachedGorgiasClient<T> {
  pub fn from_parts(inner: GorgiasClient<T>, cache: CacheLayer) -> Self {
    Self {
      inner,
      cache,
      bypass_cache: false,
    }
  }

  pub fn with_bypass_cache(mut self, bypass_cache: bool) -> Self {
    self.bypass_cache = bypass_cache;
    self
  }

  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  fn options(&self, ttl: chrono::Duration) -> CacheOptions {
    CacheOptions::with_ttl(ttl).bypass(self.bypass_cache)
  }

  pub async fn list_tickets(
    &self,
    params: &ListTicketsParams,
  ) -> Result<ListResponse<Ticket>, GorgiasError> {
    let key = tickets_key(params)?;
    self
      .cache
      .get_or_fetch(&key, self.options(CacheTtl::ticket_list()), || {
        self.inner.list_tickets(params)
      })
      .await
  }

  pub async fn get_ticket(&self, id: u64) -> Result<Ticket, GorgiasError> {
    let key = ticket_key(id)?;
    self
      .cache
      .get_or_fetch(&key, self.options(CacheTtl::ticket()), || {
        self.inner.get_ticket(id)
      })
      .await
  }

  /// Create a ticket (not cached - write operation).
  ///
  /// A new ticket can change any list, so every ticket entry is dropped.
  pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, GorgiasError> {
    let created = self.inner.create_ticket(ticket).await?;
    let removed = self.cache.invalidate_pattern(TICKET_PREFIX);
    debug!(removed, "invalidated ticket cache after create");
    Ok(created)
  }

  /// Add a message (not cached - write operation).
  ///
  /// Only the ticket itself goes stale; lists keep their entries.
  pub async fn add_message(
    &self,
    ticket_id: u64,
    message: &NewMessage,
  ) -> Result<Message, GorgiasError> {
    let created = self.inner.add_message(ticket_id, message).await?;
    self.cache.invalidate(&ticket_key(ticket_id)?);
    Ok(created)
  }

  pub async fn list_customers(
    &self,
    params: &ListCustomersParams,
  ) -> Result<ListResponse<Customer>, GorgiasError> {
    let key = customers_key(params)?;
    self
      .cache
      .get_or_fetch(&key, self.options(CacheTtl::customers()), || {
        self.inner.list_customers(params)
      })
      .await
  }

  pub async fn get_customer(&self, id: u64) -> Result<Customer, GorgiasError> {
    let key = customer_key(id)?;
    self
      .cache
      .get_or_fetch(&key, self.options(CacheTtl::customers()), || {
        self.inner.get_customer(id)
      })
      .await
  }

  pub fn cache_stats(&self) -> CacheStats {
    self.cache.stats()
  }

  pub fn clear_cache(&self) -> usize {
    self.cache.clear()
  }
}
