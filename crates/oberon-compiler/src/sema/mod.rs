//! Semantic analysis: symbol tables, type operations, and the checks
//! that turn a parsed [`crate::ast::Section`] into bound names plus a
//! verified set of procedure bodies.

pub mod expr;
pub mod module;
pub mod procs;
pub mod scope;
pub mod stmt;
pub mod symbols;
pub mod types;

pub use module::{declare_module, ModuleTable};
pub use scope::{Binding, ProcSignature, Scope};
