//! The grammar: a set of composable parser-combinator functions building
//! up from lexical tokens through expressions, types, and statements to
//! the single top-level entry point, [`build_section`].

mod context;
pub(crate) mod decl;
pub(crate) mod expr;
mod lexical;
mod module;
pub(crate) mod stmt;
pub(crate) mod ty;

pub use context::GrammarContext;
pub use module::build_section;

use std::cell::RefCell;
use std::rc::Rc;

use oberon_core::Interner;

use crate::ast::Section;
use crate::parser::{chain, map, Parser};

/// Builds the complete Oberon grammar over a shared interner, returning a
/// single parser from "start of file" to a parsed [`Section`]. Leading
/// whitespace and comments (a file may start with a blank line or a
/// comment before `MODULE`/`DEFINITION`) are consumed up front, since
/// every other lexical rule only trims its own trailing whitespace.
pub fn build_parser(interner: Rc<RefCell<Interner>>) -> Parser<Section> {
    let ctx = GrammarContext::new(interner);
    let expr = expr::build_expr(&ctx).handle();
    let ty = ty::build_type(&ctx, Rc::clone(&expr)).handle();
    let stmts = stmt::build_stmt_sequence(&ctx, expr.clone()).handle();
    let section = build_section(&ctx, expr, ty, stmts);
    map(chain(lexical::ws(), section), |(_, section)| section)
}
