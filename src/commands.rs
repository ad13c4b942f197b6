//! Command surface: one variant per client operation, plus batch execution.

use clap::Subcommand;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::gorgias::cached_client::CachedGorgiasClient;
use crate::gorgias::error::GorgiasError;
use crate::gorgias::transport::HttpTransport;
use crate::gorgias::types::{ListCustomersParams, ListTicketsParams, NewMessage, NewTicket};

/// Operations available from the command line and from batch input.
///
/// Batch lines use the same shape as JSON, tagged by `command`:
/// `{"command": "get-ticket", "id": 42}`.
#[derive(Debug, Clone, PartialEq, Subcommand, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
  /// List tickets (status is matched client-side)
  #[command(visible_alias = "tickets")]
  ListTickets {
    #[arg(long)]
    limit: Option<u32>,
    /// Exact, case-sensitive status to keep (e.g. "open")
    #[arg(long)]
    status: Option<String>,
    /// Sort order, e.g. "created_datetime:desc"
    #[arg(long)]
    order_by: Option<String>,
    #[arg(long)]
    cursor: Option<String>,
  },

  /// Get a ticket with its messages
  #[command(visible_alias = "ticket")]
  GetTicket { id: u64 },

  /// Open a ticket on behalf of a customer
  CreateTicket {
    #[arg(long)]
    customer_email: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
  },

  /// Post a message on an existing ticket
  AddMessage {
    ticket_id: u64,
    #[arg(long)]
    message: String,
    #[arg(long)]
    #[serde(default)]
    from_agent: bool,
  },

  /// List customers
  #[command(visible_alias = "customers")]
  ListCustomers {
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    cursor: Option<String>,
  },

  /// Get a customer
  #[command(visible_alias = "customer")]
  GetCustomer { id: u64 },

  /// Show cache hit/miss counters
  CacheStats,

  /// Drop every cached entry
  CacheClear,
}

/// Run one command and return its JSON output.
pub async fn execute<T: HttpTransport>(
  client: &CachedGorgiasClient<T>,
  command: Command,
) -> Result<Value, GorgiasError> {
  let output = match command {
    Command::ListTickets {
      limit,
      status,
      order_by,
      cursor,
    } => {
      let params = ListTicketsParams {
        limit,
        status,
        order_by,
        cursor,
      };
      serde_json::to_value(client.list_tickets(&params).await?)?
    }
    Command::GetTicket { id } => serde_json::to_value(client.get_ticket(id).await?)?,
    Command::CreateTicket {
      customer_email,
      subject,
      message,
    } => {
      let ticket = NewTicket {
        customer_email,
        subject,
        message,
      };
      serde_json::to_value(client.create_ticket(&ticket).await?)?
    }
    Command::AddMessage {
      ticket_id,
      message,
      from_agent,
    } => {
      let message = NewMessage {
        body: message,
        from_agent,
      };
      serde_json::to_value(client.add_message(ticket_id, &message).await?)?
    }
    Command::ListCustomers {
      limit,
      email,
      cursor,
    } => {
      let params = ListCustomersParams {
        limit,
        email,
        cursor,
      };
      serde_json::to_value(client.list_customers(&params).await?)?
    }
    Command::GetCustomer { id } => serde_json::to_value(client.get_customer(id).await?)?,
    Command::CacheStats => serde_json::to_value(client.cache_stats())?,
    Command::CacheClear => json!({ "removed": client.clear_cache() }),
  };

  Ok(output)
}

/// Run JSON-lines commands from `input` against one shared client.
///
/// Each result (or `{"error": ...}`) is written as one line to `out`. Blank
/// lines and lines starting with `#` are skipped. Returns the number of
/// failed lines.
pub async fn run_batch<T, R, W>(
  client: &CachedGorgiasClient<T>,
  input: R,
  out: &mut W,
) -> std::io::Result<usize>
where
  T: HttpTransport,
  R: AsyncBufRead + Unpin,
  W: Write,
{
  let mut lines = input.lines();
  let mut failures = 0;
  let mut line_no = 0;

  while let Some(line) = lines.next_line().await? {
    line_no += 1;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    let result = match serde_json::from_str::<Command>(line) {
      Ok(command) => execute(client, command).await.map_err(|e| e.to_string()),
      Err(e) => Err(format!("invalid command: {}", e)),
    };

    let output = match result {
      Ok(value) => value,
      Err(error) => {
        warn!(line = line_no, %error, "batch command failed");
        failures += 1;
        json!({ "line": line_no, "error": error })
      }
    };

    writeln!(out, "{}", output)?;
  }

  Ok(failures)
}
