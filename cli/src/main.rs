//! bizerrors CLI — inspect and forward thrown values from the terminal.
//!
//! Usage:
//! ```bash
//! # Is this value error-like, and what is its name?
//! bizerrors inspect --value '{"name":"NotFoundError","message":"no user"}'
//!
//! # Forward a cause with added context, print the wire form
//! bizerrors forward --message "loading profile" --cause '{"name":"NotFoundError","message":"no user"}'
//!
//! # Build a taxonomy error, reading the cause from stdin
//! echo '"connection reset"' | bizerrors new --kind conflict --message "sync failed" --cause -
//! ```

use std::io::Read;

use anyhow::{Context, Result};
use bizerrors_core::{
    extract_name, inspect, is_error_like, BusinessError, ErrorIdentity, ErrorKind,
    SerializeOptions, SerializedError, Thrown,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bizerrors",
    about = "Inspect, forward and render business errors",
    long_about = "
Values are given as JSON. Anything that is not valid JSON is taken as a
plain string. Pass `-` to read a value from stdin.

ENVIRONMENT VARIABLES:
  RUST_LOG           Log filter (default: warn)
  RUST_BACKTRACE     Capture backtraces into rendered stacks
",
    version
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a value is error-like and which name it carries
    Inspect {
        /// The value (JSON, or `-` for stdin)
        #[arg(long)]
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Wrap a cause with added context, keeping the cause's name
    Forward {
        /// Context message
        #[arg(short, long)]
        message: String,
        /// The cause (JSON, or `-` for stdin)
        #[arg(long)]
        cause: String,
        /// Include the stack in the output
        #[arg(long)]
        stack: bool,
    },

    /// Build a taxonomy error
    New {
        /// Kind, e.g. `not_found` or `NotFoundError`
        #[arg(short, long)]
        kind: String,
        /// Error message
        #[arg(short, long)]
        message: String,
        /// Optional cause (JSON, or `-` for stdin)
        #[arg(long)]
        cause: Option<String>,
        /// Include the stack in the output
        #[arg(long)]
        stack: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    error_like: bool,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<ErrorIdentity>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { value, json } => cmd_inspect(&value, json),
        Commands::Forward { message, cause, stack } => {
            let cause = parse_value(&cause)?;
            print_error(&BusinessError::forward(message, cause), stack)
        }
        Commands::New { kind, message, cause, stack } => {
            let kind: ErrorKind = kind.parse()?;
            let cause = cause.as_deref().map(parse_value).transpose()?;
            print_error(&BusinessError::new(kind, message, cause), stack)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_inspect(raw: &str, as_json: bool) -> Result<()> {
    let value = parse_value(raw)?;
    let report = InspectReport {
        error_like: is_error_like(&value),
        name: extract_name(&value),
        identity: inspect(&value),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{value}");
        println!("  Error-like: {}", report.error_like);
        println!("  Name:       {}", report.name);
        if let Some(stack) = report.identity.as_ref().and_then(|id| id.stack.as_deref()) {
            println!("  Stack:\n{stack}");
        }
    }
    Ok(())
}

fn print_error(err: &BusinessError, include_stack: bool) -> Result<()> {
    let opts = SerializeOptions {
        include_stack,
        ..SerializeOptions::default()
    };
    let serialized = SerializedError::from_error(err, &opts);
    let json = serde_json::to_string_pretty(&serialized).context("serializing error")?;
    println!("{json}");
    Ok(())
}

/// Decode a value argument. `-` reads stdin; invalid JSON becomes a string.
fn parse_value(raw: &str) -> Result<Thrown> {
    let text = if raw == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading value from stdin")?;
        buf
    } else {
        raw.to_owned()
    };

    Ok(match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => Thrown::from(value),
        Err(e) => {
            debug!(error = %e, "value is not JSON, using it as a string");
            Thrown::from(text.trim_end().to_owned())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_and_plain_values() {
        let v = parse_value(r#"{"name":"InputError","message":"bad"}"#).unwrap();
        assert!(is_error_like(&v));

        let v = parse_value("connection reset").unwrap();
        assert_eq!(v.as_data(), Some(&serde_json::json!("connection reset")));
    }

    #[test]
    fn cli_parses_new_command() {
        let cli = Cli::try_parse_from([
            "bizerrors", "new", "--kind", "not_found", "--message", "gone",
        ])
        .unwrap();
        match cli.command {
            Commands::New { kind, cause, .. } => {
                assert_eq!(kind.parse::<ErrorKind>().unwrap(), ErrorKind::NotFound);
                assert!(cause.is_none());
            }
            _ => panic!("expected new"),
        }
    }
}
