//! Oberon-07 compiler front-end: a hand-rolled parser-combinator grammar,
//! a typed AST, and a semantic analyzer producing bound names and
//! checked procedure bodies. No code generation.
//!
//! - `parser` - cursor, backtracking, and the combinator algebra
//! - `grammar` - the Oberon-07 grammar built from those combinators
//! - `ast` - the typed syntax tree the grammar produces
//! - `sema` - symbol tables, type operations, and structural checks
//! - `diagnostics` - error reporting
//! - `parse` - the single entry point from source text to a parsed `Section`
//! - `loader` - resolves and caches a module's import graph

pub mod ast;
pub mod diagnostics;
pub mod grammar;
pub mod loader;
pub mod parse;
pub mod parser;
pub mod sema;

pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsPrinter};
pub use loader::{LoaderError, ModuleLoader};
pub use parse::parse_source;
pub use sema::ModuleTable;

/// Errors from analyzing a single already-loaded file, for callers that
/// don't need the module loader's import graph.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("parse error")]
    Parse(#[from] Diagnostic),

    #[error("analysis failed with {} error(s)", .0.error_count())]
    Analysis(Diagnostics),
}

/// Result type for front-end operations.
pub type Result<T> = std::result::Result<T, Error>;
