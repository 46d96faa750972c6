use assert_cmd::Command;
use clap::Parser;

use riskcards::cli::{Cli, Commands};

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("riskcards").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn run_defaults() {
    let cli = Cli::parse_from(["riskcards", "run"]);
    let Commands::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.sources.signals.to_str().unwrap(), "signals.json");
    assert_eq!(args.out.to_str().unwrap(), "outputs");
    assert!(args.sources.config.is_none());
    assert!(args.sources.traffic.is_none());
    assert!(!args.tsv);
    assert!(!args.no_write);
    assert_eq!(args.sources.sources().len(), 1);
}

#[test]
fn run_with_all_sources() {
    let cli = Cli::parse_from([
        "riskcards",
        "run",
        "--traffic",
        "t.json.gz",
        "--weather",
        "w.json",
        "--bcrp-dir",
        "bcrp",
        "--tsv",
        "--no-write",
    ]);
    let Commands::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert!(args.tsv);
    assert!(args.no_write);
    let names: Vec<&str> = args.sources.sources().iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec!["bcrp_series", "weather_payload", "traffic_snapshots", "signals_file"]
    );
}

#[test]
fn validate_default_feed_path() {
    let cli = Cli::parse_from(["riskcards", "validate"]);
    let Commands::Validate(args) = cli.command else {
        panic!("expected validate");
    };
    assert_eq!(args.feed.to_str().unwrap(), "outputs/feed.json");
}
