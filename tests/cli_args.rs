// tests/cli_args.rs

use bootdag::cli::{CliArgs, LogLevel};
use bootdag::config::default_config_path;
use bootdag::logging::parse_level_str;
use clap::Parser;

#[test]
fn defaults_point_at_bootdag_toml() {
    let args = CliArgs::try_parse_from(["bootdag"]).expect("no flags is valid");

    assert_eq!(args.config, "Bootdag.toml");
    assert_eq!(default_config_path().to_str(), Some(args.config.as_str()));
    assert!(args.log_level.is_none());
    assert!(!args.dry_run);
    assert!(!args.diagnostics);
}

#[test]
fn all_flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "bootdag",
        "--config",
        "demos/startup.toml",
        "--log-level",
        "debug",
        "--dry-run",
        "--diagnostics",
    ])
    .expect("valid flags");

    assert_eq!(args.config, "demos/startup.toml");
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.dry_run);
    assert!(args.diagnostics);
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(CliArgs::try_parse_from(["bootdag", "--log-level", "loud"]).is_err());
}

#[test]
fn env_log_levels_are_case_insensitive() {
    assert_eq!(parse_level_str("INFO"), Some(tracing::Level::INFO));
    assert_eq!(parse_level_str(" warning "), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str("trace"), Some(tracing::Level::TRACE));
    assert_eq!(parse_level_str("verbose"), None);
}
