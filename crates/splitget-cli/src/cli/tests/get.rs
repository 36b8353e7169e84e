//! Tests for `get` argument parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_get_url_only() {
    match parse(&["splitget", "get", "https://example.org/a.iso"]) {
        CliCommand::Get {
            url,
            output,
            threads,
            quiet,
        } => {
            assert_eq!(url.as_deref(), Some("https://example.org/a.iso"));
            assert!(output.is_none());
            assert!(threads.is_none());
            assert!(!quiet);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_all_flags() {
    match parse(&[
        "splitget",
        "get",
        "https://example.org/a.iso",
        "-o",
        "/tmp/a.iso",
        "--threads",
        "6",
        "--quiet",
    ]) {
        CliCommand::Get {
            url,
            output,
            threads,
            quiet,
        } => {
            assert_eq!(url.as_deref(), Some("https://example.org/a.iso"));
            assert_eq!(output, Some(PathBuf::from("/tmp/a.iso")));
            assert_eq!(threads, Some(6));
            assert!(quiet);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_without_url_is_interactive() {
    match parse(&["splitget", "get", "-t", "2"]) {
        CliCommand::Get { url, threads, .. } => {
            assert!(url.is_none());
            assert_eq!(threads, Some(2));
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_rejects_non_numeric_threads() {
    assert!(Cli::try_parse_from(["splitget", "get", "-t", "many"]).is_err());
}
