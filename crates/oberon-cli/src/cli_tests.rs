use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn check_requires_a_file_argument() {
    let result = Cli::try_parse_from(["oberon", "check"]);
    assert!(result.is_err());
}

#[test]
fn check_parses_file_and_defaults() {
    let cli = Cli::try_parse_from(["oberon", "check", "Main.Mod"]).unwrap();
    let Command::Check(args) = cli.command;
    assert_eq!(args.file, PathBuf::from("Main.Mod"));
    assert!(args.include.is_empty());
    assert!(!args.verbose);
    assert!(matches!(args.color, ColorChoice::Auto));
}

#[test]
fn check_accepts_repeated_include_flags() {
    let cli = Cli::try_parse_from(["oberon", "check", "Main.Mod", "-I", "lib", "-I", "/usr/share/oberon"]).unwrap();
    let Command::Check(args) = cli.command;
    assert_eq!(args.include, vec![PathBuf::from("lib"), PathBuf::from("/usr/share/oberon")]);
}

#[test]
fn check_rejects_unknown_color_choice() {
    let result = Cli::try_parse_from(["oberon", "check", "Main.Mod", "--color", "sometimes"]);
    assert!(result.is_err());
}

#[test]
fn color_never_does_not_colorize() {
    assert!(!ColorChoice::Never.should_colorize());
}

#[test]
fn color_always_colorizes() {
    assert!(ColorChoice::Always.should_colorize());
}
