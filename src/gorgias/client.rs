use base64::Engine;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GorgiasConfig;
use crate::gorgias::error::GorgiasError;
use crate::gorgias::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::gorgias::types::{
  Customer, ListCustomersParams, ListResponse, ListTicketsParams, Message, NewMessage, NewTicket,
  Ticket,
};

/// Gorgias REST API client.
///
/// Every request carries Basic auth built from `email:api_key` and is aborted
/// once the configured timeout elapses. Failures are returned as-is, there
/// is no retry.
#[derive(Clone)]
pub struct GorgiasClient<T = ReqwestTransport> {
  transport: T,
  base_url: Url,
  authorization: String,
  timeout: Duration,
}

impl GorgiasClient<ReqwestTransport> {
  pub fn new(config: &GorgiasConfig) -> Result<Self, GorgiasError> {
    Self::with_transport(config, ReqwestTransport::new()?)
  }
}

impl<T: HttpTransport> GorgiasClient<T> {
  pub fn with_transport(config: &GorgiasConfig, transport: T) -> Result<Self, GorgiasError> {
    let credentials = format!("{}:{}", config.email, config.api_key);
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

    Ok(Self {
      transport,
      base_url: config.api_base_url()?,
      authorization: format!("Basic {}", encoded),
      timeout: config.timeout(),
    })
  }

  fn endpoint(&self, path: &str, query: &[(&str, Option<String>)]) -> Result<Url, GorgiasError> {
    let mut url = Url::parse(&format!(
      "{}{}",
      self.base_url.as_str().trim_end_matches('/'),
      path
    ))?;

    let present: Vec<_> = query
      .iter()
      .filter_map(|(name, value)| value.as_ref().map(|v| (*name, v)))
      .collect();
    if !present.is_empty() {
      url.query_pairs_mut().extend_pairs(present);
    }

    Ok(url)
  }

  async fn request<R: DeserializeOwned>(
    &self,
    method: Method,
    url: Url,
    body: Option<Value>,
  ) -> Result<R, GorgiasError> {
    debug!(%method, %url, "gorgias request");

    let request = HttpRequest {
      method,
      url,
      authorization: self.authorization.clone(),
      body,
    };

    let response = tokio::time::timeout(self.timeout, self.transport.send(request))
      .await
      .map_err(|_| GorgiasError::Timeout(self.timeout))??;

    if !response.is_success() {
      warn!(status = response.status, "gorgias request failed");
      return Err(GorgiasError::from_status(response.status, response.body));
    }

    Ok(serde_json::from_str(&response.body)?)
  }

  /// List tickets. The API cannot filter by status, so `status` is matched
  /// exactly against each returned ticket and the result is capped at `limit`.
  pub async fn list_tickets(
    &self,
    params: &ListTicketsParams,
  ) -> Result<ListResponse<Ticket>, GorgiasError> {
    let url = self.endpoint(
      "/tickets",
      &[
        ("limit", params.limit.map(|l| l.to_string())),
        ("order_by", params.order_by.clone()),
        ("cursor", params.cursor.clone()),
      ],
    )?;

    let mut response: ListResponse<Ticket> = self.request(Method::GET, url, None).await?;

    if let Some(status) = &params.status {
      response
        .data
        .retain(|ticket| ticket.status() == Some(status.as_str()));
      if let Some(limit) = params.limit {
        response.data.truncate(limit as usize);
      }
    }

    debug!(
      count = response.data.len(),
      next_cursor = response.next_cursor(),
      "listed tickets"
    );
    Ok(response)
  }

  /// Get a single ticket, including nested messages and customer.
  pub async fn get_ticket(&self, id: u64) -> Result<Ticket, GorgiasError> {
    let url = self.endpoint(&format!("/tickets/{}", id), &[])?;
    self.request(Method::GET, url, None).await
  }

  pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, GorgiasError> {
    let url = self.endpoint("/tickets", &[])?;
    let created: Ticket = self
      .request(Method::POST, url, Some(ticket.to_body()))
      .await?;
    info!(ticket_id = created.id, "ticket created");
    Ok(created)
  }

  pub async fn add_message(
    &self,
    ticket_id: u64,
    message: &NewMessage,
  ) -> Result<Message, GorgiasError> {
    let url = self.endpoint(&format!("/tickets/{}/messages", ticket_id), &[])?;
    let created: Message = self
      .request(Method::POST, url, Some(message.to_body()))
      .await?;
    info!(ticket_id, message_id = created.id, "message added");
    Ok(created)
  }

  pub async fn list_customers(
    &self,
    params: &ListCustomersParams,
  ) -> Result<ListResponse<Customer>, GorgiasError> {
    let url = self.endpoint(
      "/customers",
      &[
        ("limit", params.limit.map(|l| l.to_string())),
        ("email", params.email.clone()),
        ("cursor", params.cursor.clone()),
      ],
    )?;
    self.request(Method::GET, url, None).await
  }

  pub async fn get_customer(&self, id: u64) -> Result<Customer, GorgiasError> {
    let url = self.endpoint(&format!("/customers/{}", id), &[])?;
    self.request(Method::GET, url, None).await
  }
}
