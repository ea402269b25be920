//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::{Path, PathBuf};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_export_defaults() {
    let cli = parse(&["zipstream", "export", "https://example.com/export.json"]);
    assert!(cli.config.is_none());
    match cli.command {
        CliCommand::Export {
            descriptor,
            output,
            name,
        } => {
            assert_eq!(descriptor, "https://example.com/export.json");
            assert!(output.is_none());
            assert!(name.is_none());
        }
        _ => panic!("expected Export"),
    }
}

#[test]
fn cli_parse_export_all_flags() {
    let cli = parse(&[
        "zipstream",
        "export",
        "-",
        "-o",
        "/tmp/out.zip",
        "--name",
        "Q3 report",
        "--config",
        "/etc/zipstream.toml",
    ]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/zipstream.toml")));
    match cli.command {
        CliCommand::Export {
            descriptor,
            output,
            name,
        } => {
            assert_eq!(descriptor, "-");
            assert_eq!(output, Some(PathBuf::from("/tmp/out.zip")));
            assert_eq!(name.as_deref(), Some("Q3 report"));
        }
        _ => panic!("expected Export with flags"),
    }
}

#[test]
fn cli_parse_list() {
    match parse(&["zipstream", "list", "descriptor.json"]).command {
        CliCommand::List { descriptor } => assert_eq!(descriptor, "descriptor.json"),
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_filename() {
    match parse(&["zipstream", "filename", "My \"Report\""]).command {
        CliCommand::Filename { raw } => assert_eq!(raw, "My \"Report\""),
        _ => panic!("expected Filename"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["zipstream", "completions", "bash"]).command {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_missing_descriptor() {
    assert!(Cli::try_parse_from(["zipstream", "export"]).is_err());
}

#[test]
fn cli_parse_man() {
    assert!(matches!(parse(&["zipstream", "man"]).command, CliCommand::Man));
}
