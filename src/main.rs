mod cache;
mod commands;
mod config;
mod gorgias;
mod logging;

use clap::{Parser, Subcommand};
use color_eyre::{
  eyre::{eyre, Report},
  Result, Section,
};
use std::path::PathBuf;
use tokio::io::BufReader;

use crate::commands::Command;
use crate::gorgias::cached_client::CachedGorgiasClient;
use crate::gorgias::error::GorgiasError;

#[derive(Parser, Debug)]
#[command(name = "gorgias")]
#[command(about = "Command-line client for the Gorgias helpdesk API")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./gorgias.yaml or $XDG_CONFIG_HOME/gorgias-cli/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Do not read or write the cache
  #[arg(long, global = true)]
  no_cache: bool,

  /// Skip cached values but store the fresh responses
  #[arg(long, global = true)]
  refresh: bool,

  /// Increase log verbosity (-v info, -vv debug)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// Write logs to this file instead of stderr
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
  #[command(flatten)]
  Run(Command),

  /// Read JSON-lines commands from stdin and run them with a shared cache
  Batch,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init(args.verbose, args.log_file.as_deref())?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  let client = CachedGorgiasClient::new(&config)?.with_bypass_cache(args.refresh);
  if args.no_cache {
    client.cache().disable();
  }

  match args.command {
    CliCommand::Run(command) => {
      let output = commands::execute(&client, command)
        .await
        .map_err(report)?;
      println!("{}", serde_json::to_string_pretty(&output)?);
    }
    CliCommand::Batch => {
      let stdin = BufReader::new(tokio::io::stdin());
      let failures = commands::run_batch(&client, stdin, &mut std::io::stdout()).await?;
      if failures > 0 {
        return Err(eyre!("{} batch command(s) failed", failures));
      }
    }
  }

  Ok(())
}

fn report(error: GorgiasError) -> Report {
  let rate_limited = error.is_rate_limited();
  let timed_out = error.is_timeout();
  let report = Report::new(error);

  if rate_limited {
    report.suggestion("Gorgias is rate limiting this account; wait a moment and run the command again")
  } else if timed_out {
    report.suggestion("The API did not answer in time; retry, or raise `timeout_secs` in the config")
  } else {
    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_list_tickets() {
    let args = Args::try_parse_from([
      "gorgias",
      "--no-cache",
      "list-tickets",
      "--status",
      "open",
      "--limit",
      "10",
    ])
    .unwrap();

    assert!(args.no_cache);
    match args.command {
      CliCommand::Run(Command::ListTickets { limit, status, .. }) => {
        assert_eq!(limit, Some(10));
        assert_eq!(status.as_deref(), Some("open"));
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn test_parse_add_message_and_global_flags_after_subcommand() {
    let args = Args::try_parse_from([
      "gorgias",
      "add-message",
      "42",
      "--message",
      "On its way",
      "--from-agent",
      "--refresh",
      "-vv",
    ])
    .unwrap();

    assert!(args.refresh);
    assert_eq!(args.verbose, 2);
    assert!(matches!(
      args.command,
      CliCommand::Run(Command::AddMessage {
        ticket_id: 42,
        from_agent: true,
        ..
      })
    ));
  }

  #[test]
  fn test_parse_aliases_and_batch() {
    let args = Args::try_parse_from(["gorgias", "customer", "100"]).unwrap();
    assert!(matches!(
      args.command,
      CliCommand::Run(Command::GetCustomer { id: 100 })
    ));

    let args = Args::try_parse_from(["gorgias", "batch"]).unwrap();
    assert!(matches!(args.command, CliCommand::Batch));
  }

  #[test]
  fn test_create_ticket_requires_fields() {
    assert!(Args::try_parse_from(["gorgias", "create-ticket", "--subject", "x"]).is_err());
  }

  #[test]
  fn test_report_adds_rate_limit_note() {
    // Sections are only kept once the color-eyre hook is installed
    let _ = color_eyre::install();

    let rate_limited = report(GorgiasError::from_status(429, "Too many requests"));
    assert!(rate_limited.to_string().contains("429"));
    assert!(format!("{rate_limited:?}").contains("rate limiting this account"));

    let timed_out = report(GorgiasError::Timeout(std::time::Duration::from_secs(30)));
    let rendered = format!("{timed_out:?}");
    assert!(rendered.contains("timeout_secs"));
    assert!(!rendered.contains("rate limiting"));
  }
}
