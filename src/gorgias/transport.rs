//! HTTP transport used by the Gorgias client.
//!
//! The client builds fully-formed requests and hands them to an
//! [`HttpTransport`]. Production uses reqwest; tests plug in a stub.

use reqwest::Method;
use serde_json::Value;
use std::future::Future;
use url::Url;

use super::error::GorgiasError;

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
  pub method: Method,
  pub url: Url,
  /// Value of the `Authorization` header
  pub authorization: String,
  pub body: Option<Value>,
}

/// Raw response: status and body text, before any JSON decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: u16,
  pub body: String,
}

impl HttpResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

pub trait HttpTransport: Send + Sync {
  /// Execute one request. Non-success statuses are returned as responses,
  /// only transport-level failures are errors.
  fn send(
    &self,
    request: HttpRequest,
  ) -> impl Future<Output = Result<HttpResponse, GorgiasError>> + Send;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Result<Self, GorgiasError> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("gorgias-cli/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| GorgiasError::Network(Box::new(e)))?;

    Ok(Self { client })
  }
}

impl HttpTransport for ReqwestTransport {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GorgiasError> {
    let mut builder = self
      .client
      .request(request.method, request.url)
      .header(reqwest::header::AUTHORIZATION, request.authorization)
      .header(reqwest::header::ACCEPT, "application/json");

    if let Some(body) = request.body {
      builder = builder
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body)?);
    }

    let response = builder.send().await.map_err(map_reqwest_error)?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(map_reqwest_error)?;

    Ok(HttpResponse { status, body })
  }
}

fn map_reqwest_error(e: reqwest::Error) -> GorgiasError {
  GorgiasError::Network(Box::new(e))
}
