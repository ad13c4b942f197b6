//! Gorgias resource payloads and request parameters.
//!
//! Resources are passed through untouched: only the fields the client needs
//! are named, everything else lands in `fields` and is re-emitted verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
  pub id: u64,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Ticket {
  pub fn status(&self) -> Option<&str> {
    self.fields.get("status").and_then(Value::as_str)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
  pub id: u64,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Customer {
  pub fn email(&self) -> Option<&str> {
    self.fields.get("email").and_then(Value::as_str)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub id: u64,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

/// Pagination envelope returned by list endpoints.
///
/// `meta` and any other envelope keys stay in `fields` as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
  pub data: Vec<T>,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl<T> ListResponse<T> {
  /// Cursor of the next page, if the API reported one.
  pub fn next_cursor(&self) -> Option<&str> {
    self
      .fields
      .get("meta")
      .and_then(|meta| meta.get("next_cursor"))
      .and_then(Value::as_str)
  }
}

/// Parameters for listing tickets. `status` is applied client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListTicketsParams {
  pub limit: Option<u32>,
  pub status: Option<String>,
  pub order_by: Option<String>,
  pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListCustomersParams {
  pub limit: Option<u32>,
  pub email: Option<String>,
  pub cursor: Option<String>,
}

/// Input for a new ticket opened on behalf of a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
  pub customer_email: String,
  pub subject: String,
  pub message: String,
}

impl NewTicket {
  pub(crate) fn to_body(&self) -> Value {
    serde_json::json!({
      "customer": { "email": self.customer_email },
      "subject": self.subject,
      "channel": "email",
      "via": "api",
      "messages": [{
        "sender": { "email": self.customer_email },
        "channel": "email",
        "via": "api",
        "from_agent": false,
        "subject": self.subject,
        "body_text": self.message,
      }],
    })
  }
}

/// Input for a message appended to an existing ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
  pub body: String,
  pub from_agent: bool,
}

impl NewMessage {
  pub(crate) fn to_body(&self) -> Value {
    serde_json::json!({
      "channel": "api",
      "via": "api",
      "from_agent": self.from_agent,
      "body_text": self.body,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_ticket_round_trips_unknown_fields() {
    let raw = json!({
      "id": 42,
      "status": "open",
      "subject": "Where is my order?",
      "messages": [{"id": 1, "body_text": "hi"}],
      "customer": {"id": 100, "email": "a@example.com"}
    });

    let ticket: Ticket = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(ticket.id, 42);
    assert_eq!(ticket.status(), Some("open"));
    assert_eq!(serde_json::to_value(&ticket).unwrap(), raw);

    let raw = json!({"id": 1, "status": null, "subject": "x"});
    let ticket: Ticket = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(ticket.status(), None);
    assert_eq!(serde_json::to_value(&ticket).unwrap(), raw);
  }

  #[test]
  fn test_customer_keeps_null_email() {
    let raw = r#"{"id":7,"email":null,"name":"Ann"}"#;
    let customer: Customer = serde_json::from_str(raw).unwrap();
    assert_eq!(customer.email(), None);
    assert_eq!(
      serde_json::to_value(&customer).unwrap(),
      serde_json::from_str::<Value>(raw).unwrap()
    );
  }

  #[test]
  fn test_list_response_without_meta() {
    let raw = json!({"data": [{"id": 1, "email": "a@example.com"}]});
    let list: ListResponse<Customer> = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(list.data.len(), 1);
    assert_eq!(list.data[0].email(), Some("a@example.com"));
    assert_eq!(list.next_cursor(), None);
    assert_eq!(serde_json::to_value(&list).unwrap(), raw);
  }

  #[test]
  fn test_list_meta_is_passed_through() {
    let raw = json!({
      "data": [],
      "meta": {"next_cursor": "abc", "prev_cursor": null, "total_resources": 9}
    });
    let list: ListResponse<Ticket> = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(list.next_cursor(), Some("abc"));
    assert_eq!(list.fields["meta"]["prev_cursor"], Value::Null);
    assert_eq!(serde_json::to_value(&list).unwrap(), raw);
  }

  #[test]
  fn test_new_ticket_body() {
    let body = NewTicket {
      customer_email: "a@example.com".into(),
      subject: "Refund".into(),
      message: "Please refund order 12".into(),
    }
    .to_body();

    assert_eq!(body["customer"]["email"], "a@example.com");
    assert_eq!(body["messages"][0]["body_text"], "Please refund order 12");
    assert_eq!(body["messages"][0]["from_agent"], false);
  }

  #[test]
  fn test_new_message_body() {
    let body = NewMessage {
      body: "On its way".into(),
      from_agent: true,
    }
    .to_body();
    assert_eq!(body["from_agent"], true);
    assert_eq!(body["body_text"], "On its way");
  }
}
