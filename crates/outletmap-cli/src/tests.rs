use clap::Parser;

use super::*;

#[test]
fn parses_outlets_command() {
    let cli = Cli::try_parse_from(["outletmap", "outlets"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Outlets { json: false }));
    assert!(cli.base_url.is_none());
}

#[test]
fn parses_catchment_with_json_flag() {
    let cli = Cli::try_parse_from(["outletmap", "catchment", "42", "--json"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Catchment { ref id, json: true } if id == "42"
    ));
}

#[test]
fn chat_joins_message_words() {
    let cli = Cli::try_parse_from(["outletmap", "chat", "where", "is", "breakfast?"])
        .expect("expected valid cli args");
    match cli.command {
        Commands::Chat { markup, message } => {
            assert!(!markup);
            assert_eq!(message.join(" "), "where is breakfast?");
        }
        other => panic!("expected chat, got {other:?}"),
    }
}

#[test]
fn chat_requires_a_message() {
    assert!(Cli::try_parse_from(["outletmap", "chat"]).is_err());
}

#[test]
fn base_url_is_global() {
    let cli = Cli::try_parse_from(["outletmap", "explore", "--base-url", "http://localhost:8000"])
        .expect("expected valid cli args");
    assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8000"));
    assert!(matches!(cli.command, Commands::Explore));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["outletmap"]).is_err());
}
