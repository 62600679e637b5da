use clap::{CommandFactory, Parser};
use streamtree::tooling::cli::{Cli, Commands};

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn every_subcommand_has_help() {
    let command = Cli::command();
    for name in ["shell", "play", "ls", "history", "describe", "providers"] {
        let sub = command
            .find_subcommand(name)
            .unwrap_or_else(|| panic!("missing subcommand {name}"));
        assert!(sub.get_about().is_some(), "{name} has no help text");
    }
}

#[test]
fn global_logging_flags_parse() {
    let cli = Cli::parse_from([
        "streamtree",
        "--log-level",
        "debug",
        "--log-output",
        "stderr",
        "history",
        "--format",
        "json",
    ]);
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    assert_eq!(cli.log_output.as_deref(), Some("stderr"));
    assert!(matches!(cli.command, Commands::History { ref format, clear: false } if format == "json"));
}
