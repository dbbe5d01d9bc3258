//! Interactive map session driven from stdin.
//!
//! Each command is applied to a [`MapSession`] and its updates are drained
//! before the next prompt, so chat answers stream in place.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use outletmap_client::OutletClient;
use outletmap_core::OutletId;
use outletmap_ui::chat::LOADING_TEXT;
use outletmap_ui::{MapSession, Update};

use crate::render;

const HELP: &str = "commands: list | select <id> | ask <question> | remount | help | quit";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    List,
    Select(String),
    Ask(String),
    Remount,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub(crate) fn parse_command(line: &str) -> Option<Result<Command, String>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(v, r)| (v, r.trim()));

    let command = match (verb, rest) {
        ("list", _) => Ok(Command::List),
        ("select", "") => Err("usage: select <id>".to_owned()),
        ("select", id) => Ok(Command::Select(id.to_owned())),
        ("ask", question) => Ok(Command::Ask(question.to_owned())),
        ("remount", _) => Ok(Command::Remount),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit", _) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command '{other}'")),
    };
    Some(command)
}

pub(crate) async fn run(client: OutletClient) -> anyhow::Result<()> {
    let mut session = MapSession::new(client);
    session.mount();
    drain(&mut session).await?;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            None => {}
            Some(Err(msg)) => println!("{msg}"),
            Some(Ok(Command::Quit)) => break,
            Some(Ok(command)) => execute(&mut session, command).await?,
        }
        prompt()?;
    }

    session.unmount();
    Ok(())
}

async fn execute(session: &mut MapSession, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            for outlet in session.host().map().outlets() {
                println!("{}", render::outlet_line(outlet));
            }
        }
        Command::Select(id) => {
            if session.select_outlet(&OutletId::new(id.clone())) {
                drain(session).await?;
                println!("{}", render::selection_summary(session.host().map()));
            } else {
                println!("outlet '{id}' has no marker");
            }
        }
        Command::Ask(question) => {
            if session.ask(&question) {
                println!("{LOADING_TEXT}");
                drain(session).await?;
            }
        }
        Command::Remount => {
            session.unmount();
            session.mount();
            drain(session).await?;
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

/// Applies updates until the session is idle, streaming chat text as it grows.
async fn drain(session: &mut MapSession) -> anyhow::Result<()> {
    let mut printed = 0usize;
    let mut stdout = std::io::stdout();

    while let Some(update) = session.next_update().await {
        match &update {
            Update::ChatRendered { .. } => {
                let raw = session.host().chat().map_or("", |c| c.raw_answer());
                if let Some(delta) = raw.get(printed..) {
                    stdout.write_all(delta.as_bytes())?;
                    stdout.flush()?;
                }
                printed = raw.len();
            }
            Update::ChatFinished => {
                println!();
                printed = 0;
            }
            other => {
                if printed > 0 {
                    println!();
                    printed = 0;
                }
                if let Some(line) = render::update_line(other) {
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(b"> ")?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_with_id() {
        assert_eq!(
            parse_command("select  42 "),
            Some(Ok(Command::Select("42".to_owned())))
        );
    }

    #[test]
    fn select_without_id_is_usage_error() {
        assert!(matches!(parse_command("select"), Some(Err(_))));
    }

    #[test]
    fn ask_keeps_the_whole_question() {
        assert_eq!(
            parse_command("ask which outlets have a Surau?"),
            Some(Ok(Command::Ask("which outlets have a Surau?".to_owned())))
        );
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn unknown_verb_is_rejected() {
        assert_eq!(
            parse_command("zoom 3"),
            Some(Err("unknown command 'zoom'".to_owned()))
        );
        assert_eq!(parse_command("exit"), Some(Ok(Command::Quit)));
    }
}
