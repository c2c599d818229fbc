//! # Session Subcommand
//!
//! A long-lived station driven one line at a time, for a bench operator or
//! a wrapping front end. Policy toggles made in a session apply to the
//! issuances that follow in the same session and are forgotten when it
//! ends.
//!
//! ```text
//! status
//! toggle print
//! issue RC-103-000123
//! check RC-103-000123
//! recent 20 240
//! quit
//! ```

use anyhow::Result;
use labelstation_core::PolicyField;
use labelstation_station::{Station, station};
use serde::Serialize;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{Context, EXIT_OK, Output, render};

const HELP: &str = "commands: status | issue <serial> | toggle <validation|print> | policy \
                    | check <barcode> | recent [limit] [window_minutes] | help | quit";

const DEFAULT_RECENT_LIMIT: u32 = 10;
const DEFAULT_RECENT_WINDOW: u32 = 60;

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Status,
    Issue(String),
    Toggle(PolicyField),
    Policy,
    Check(String),
    Recent { limit: u32, window_minutes: u32 },
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        if verb.starts_with('#') {
            return Ok(None);
        }

        let args: Vec<&str> = words.collect();
        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("status", []) => SessionCommand::Status,
            ("issue", [serial]) => SessionCommand::Issue((*serial).to_string()),
            ("toggle", [field]) => {
                SessionCommand::Toggle(field.parse().map_err(|e| format!("{e}"))?)
            }
            ("policy", []) => SessionCommand::Policy,
            ("check", [barcode]) => SessionCommand::Check((*barcode).to_string()),
            ("recent", rest) if rest.len() <= 2 => SessionCommand::Recent {
                limit: number(rest.first(), DEFAULT_RECENT_LIMIT)?,
                window_minutes: number(rest.get(1), DEFAULT_RECENT_WINDOW)?,
            },
            ("help", []) => SessionCommand::Help,
            ("quit" | "exit", []) => SessionCommand::Quit,
            (verb, _) => return Err(format!("cannot parse {verb:?}; {HELP}")),
        };
        Ok(Some(command))
    }
}

fn number(word: Option<&&str>, default: u32) -> Result<u32, String> {
    match word {
        None => Ok(default),
        Some(word) => word
            .parse()
            .map_err(|_| format!("expected a number, got {word:?}")),
    }
}

#[derive(Debug, Serialize)]
struct SessionError<'a> {
    error: &'a str,
}

#[derive(Debug, Serialize)]
struct PolicyChange {
    field: PolicyField,
    enabled: bool,
}

/// Execute the session subcommand on stdin and stdout.
pub async fn run_session(ctx: &Context) -> Result<u8> {
    let (station, db) = station::open(&ctx.config).await?;
    let output = if ctx.output.is_json() {
        ctx.output.line_delimited()
    } else {
        ctx.output
    };

    let mut out = io::stdout();
    if !output.is_json() {
        writeln!(
            out,
            "Station {} ready on printer {}; {HELP}",
            station.identity().station_id,
            station.printer_id()
        )?;
    }

    let code = serve(&station, BufReader::new(tokio::io::stdin()), &mut out, output).await;
    db.close().await;
    code
}

/// Answer every command read from `input` until `quit` or end of input.
pub async fn serve<R, W>(station: &Station, input: R, out: &mut W, output: Output) -> Result<u8>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                output.emit(out, &SessionError { error: &message }, || message.clone())?;
                continue;
            }
        };

        debug!(?command, "Session command");
        if command == SessionCommand::Quit {
            break;
        }
        answer(station, command, out, output).await?;
        out.flush()?;
    }

    Ok(EXIT_OK)
}

async fn answer<W: Write>(
    station: &Station,
    command: SessionCommand,
    out: &mut W,
    output: Output,
) -> Result<()> {
    match command {
        SessionCommand::Status => {
            let status = station.readiness_status().await;
            output.emit(out, &status, || render::readiness(&status))
        }
        SessionCommand::Issue(serial) => {
            let outcome = station.issue_label(&serial).await;
            output.emit(out, &outcome.to_response(), || render::outcome(&outcome))
        }
        SessionCommand::Toggle(field) => {
            let change = PolicyChange {
                field,
                enabled: station.toggle_policy(field),
            };
            output.emit(out, &change, || {
                let state = if change.enabled { "on" } else { "off" };
                format!("{field} is now {state}")
            })
        }
        SessionCommand::Policy => {
            let policy = station.policy().current();
            output.emit(out, &policy, || {
                PolicyField::ALL
                    .iter()
                    .map(|f| format!("{f}: {}", if policy.get(*f) { "on" } else { "off" }))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
        }
        SessionCommand::Check(barcode) => match station.check_scan_confirmation(&barcode).await {
            Ok(confirmation) => output.emit(out, &confirmation, || {
                render::confirmation(&barcode, &confirmation)
            }),
            Err(failure) => output.emit(out, &failure, || render::failure(&failure)),
        },
        SessionCommand::Recent {
            limit,
            window_minutes,
        } => match station.list_recent_issuances(limit, window_minutes).await {
            Ok(records) => output.emit(out, &records, || render::records(&records)),
            Err(failure) => output.emit(out, &failure, || render::failure(&failure)),
        },
        SessionCommand::Help => output.emit(out, &serde_json::json!({ "help": HELP }), || HELP.to_string()),
        SessionCommand::Quit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("status", SessionCommand::Status)]
    #[case("  ISSUE RC-103-000123 ", SessionCommand::Issue("RC-103-000123".into()))]
    #[case("toggle print", SessionCommand::Toggle(PolicyField::PhysicalPrint))]
    #[case("toggle device_validation", SessionCommand::Toggle(PolicyField::DeviceValidation))]
    #[case("check RC-102-000001", SessionCommand::Check("RC-102-000001".into()))]
    #[case("recent", SessionCommand::Recent { limit: 10, window_minutes: 60 })]
    #[case("recent 5", SessionCommand::Recent { limit: 5, window_minutes: 60 })]
    #[case("recent 5 240", SessionCommand::Recent { limit: 5, window_minutes: 240 })]
    #[case("exit", SessionCommand::Quit)]
    fn test_parse_command(#[case] line: &str, #[case] expected: SessionCommand) {
        assert_eq!(SessionCommand::parse(line).unwrap(), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("# comment")]
    fn test_parse_skips_blank_and_comments(#[case] line: &str) {
        assert_eq!(SessionCommand::parse(line).unwrap(), None);
    }

    #[rstest]
    #[case("issue")]
    #[case("issue RC-103-000123 extra")]
    #[case("toggle printer_color")]
    #[case("recent ten")]
    #[case("reboot")]
    fn test_parse_rejects(#[case] line: &str) {
        assert!(SessionCommand::parse(line).is_err());
    }
}
