use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

#[derive(Parser)]
#[command(name = "oberon", bin_name = "oberon")]
#[command(about = "Oberon-07 compiler front-end: parse and semantically check a module")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse and semantically check a module, recursively loading its imports
    #[command(after_help = r#"EXAMPLES:
  oberon check Main.Mod
  oberon check Main.Mod -I lib -I /usr/share/oberon
  oberon check Main.Mod --color never
  oberon check Main.Mod -v"#)]
    Check(CheckArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Module source file to check
    pub file: PathBuf,

    /// Additional directory to search when resolving imports (repeatable)
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Colorize diagnostics (auto-detected by default)
    #[arg(long, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,

    /// Verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
