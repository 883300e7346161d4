mod cli;
mod error;

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use oberon_compiler::diagnostics::Diagnostics;
use oberon_compiler::{Diagnostic, LoaderError, ModuleLoader};
use oberon_core::{Colors, Interner};

use cli::{Cli, Command};
use error::Error;

/// Directory searched after the current working directory and any
/// `-I`/`--include` flags (§6: "the current working directory and a
/// fixed system path").
const SYSTEM_INCLUDE_DIR: &str = "/usr/share/oberon";

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Command::Check(args) = cli.command;

    if args.verbose && std::env::var("RUST_LOG").is_err() {
        // SAFETY: single-threaded at this point, before any other code
        // reads the environment.
        unsafe { std::env::set_var("RUST_LOG", "debug") };
    }
    env_logger::init();

    run_check(args)
}

fn run_check(args: cli::CheckArgs) -> ExitCode {
    let mut search_dirs: Vec<PathBuf> = Vec::new();
    if let Some(parent) = args.file.parent() {
        search_dirs.push(parent.to_path_buf());
    }
    search_dirs.extend(args.include);
    if let Ok(cwd) = std::env::current_dir() {
        search_dirs.push(cwd);
    }
    search_dirs.push(PathBuf::from(SYSTEM_INCLUDE_DIR));

    let module_name = args.file.file_stem().and_then(|s| s.to_str()).unwrap_or("Main").to_string();
    log::debug!("checking '{module_name}' from {}", args.file.display());

    let interner = Rc::new(RefCell::new(Interner::new()));
    let loader = ModuleLoader::new(search_dirs, interner);

    let mut top_level_errors: Vec<String> = Vec::new();
    let mut parse_error: Option<Diagnostic> = None;

    match loader.load_file(&args.file, &module_name) {
        Ok(_) => {}
        Err(LoaderError::Parse(name, diag)) => {
            log::debug!("'{name}' failed to parse");
            parse_error = Some(diag);
        }
        Err(err @ (LoaderError::NotFound(_) | LoaderError::Io { .. } | LoaderError::Cycle(_))) => {
            top_level_errors.push(Error::from(err).to_string());
        }
    }

    if !top_level_errors.is_empty() {
        for err in &top_level_errors {
            eprintln!("{err}");
        }
        return ExitCode::from(2);
    }

    let colors = if args.color.should_colorize() { Colors::ON } else { Colors::OFF };
    let positions = loader.positions();

    if let Some(diag) = parse_error {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(diag);
        eprint!("{}", diagnostics.printer(&positions).colored(colors).render());
        return ExitCode::from(1);
    }

    let diagnostics = loader.diagnostics();
    eprint!("{}", diagnostics.printer(&positions).colored(colors).render());
    if diagnostics.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
