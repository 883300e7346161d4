//! The top-level grammar: a source file parses into either a full
//! `MODULE` or a restricted `DEFINITION`.

use std::rc::Rc;

use crate::ast::{Definition, Expression, Identifier, Import, Module, Section, Statement, Type};
use crate::parser::{any_of, chain, delim_sequence, map, maybe, no_return, option, try_map, Parser};

use super::context::GrammarContext;
use super::decl::build_decl_sequence;
use super::lexical::{here, identifier, keyword, op};

fn import_decl(ctx: &GrammarContext) -> Parser<Import> {
    let p = chain(here(), chain(identifier(ctx), maybe(chain(op(":="), identifier(ctx)))));
    map(p, |(place, (first, rest))| match rest {
        Some((_, name)) => Import { alias: first, name, place },
        None => Import { alias: first, name: first, place },
    })
}

fn import_list(ctx: &GrammarContext) -> Parser<Vec<Import>> {
    let p = chain(keyword("IMPORT"), chain(delim_sequence(import_decl(ctx), op(",")), op(";")));
    option(map(p, |(_, (items, _))| items), Vec::new())
}

fn names_match(grammar: &GrammarContext, a: Identifier, b: Identifier) -> bool {
    let interner = grammar.interner.borrow();
    interner.resolve(a.name) == interner.resolve(b.name)
}

/// `MODULE ident ";" [ImportList] DeclSeq [BEGIN StatementSequence] END ident "."`
fn module(ctx: &GrammarContext, expr: Parser<Rc<Expression>>, ty: Parser<Rc<Type>>, stmts: Parser<Vec<Statement>>) -> Parser<Module> {
    let grammar = ctx.clone();
    let heading = chain(no_return(keyword("MODULE")), chain(identifier(ctx), op(";")));
    let imports = import_list(ctx);
    let decls = build_decl_sequence(ctx, ty, Rc::clone(&expr), Rc::clone(&stmts)).handle();
    let body = option(map(chain(keyword("BEGIN"), stmts), |(_, body)| body), Vec::new());
    let closing = chain(keyword("END"), chain(identifier(ctx), op(".")));
    let p = chain(here(), chain(heading, chain(imports, chain(decls, chain(body, closing)))));
    try_map(p, move |(place, ((_, (name, _)), (imports, (decls, (body, (_, (end_name, _)))))))| {
        if !names_match(&grammar, name, end_name) {
            return None;
        }
        Some(Module {
            name,
            imports,
            decls,
            body,
            end_name,
            place,
        })
    })
}

/// `DEFINITION ident ";" [ImportList] DeclSeq END ident "."`
fn definition(ctx: &GrammarContext, expr: Parser<Rc<Expression>>, ty: Parser<Rc<Type>>, stmts: Parser<Vec<Statement>>) -> Parser<Definition> {
    let grammar = ctx.clone();
    let heading = chain(no_return(keyword("DEFINITION")), chain(identifier(ctx), op(";")));
    let imports = import_list(ctx);
    let decls = build_decl_sequence(ctx, ty, expr, stmts).handle();
    let closing = chain(keyword("END"), chain(identifier(ctx), op(".")));
    let p = chain(here(), chain(heading, chain(imports, chain(decls, closing))));
    try_map(p, move |(place, ((_, (name, _)), (imports, (decls, (_, (end_name, _))))))| {
        if !names_match(&grammar, name, end_name) {
            return None;
        }
        Some(Definition {
            name,
            imports,
            decls,
            end_name,
            place,
        })
    })
}

/// Builds the whole top-level grammar: a file parses as either a module
/// or a definition, tried in that order.
pub fn build_section(ctx: &GrammarContext, expr: Parser<Rc<Expression>>, ty: Parser<Rc<Type>>, stmts: Parser<Vec<Statement>>) -> Parser<Section> {
    let as_module = map(module(ctx, Rc::clone(&expr), Rc::clone(&ty), stmts.clone()), Section::Module);
    let as_definition = map(definition(ctx, expr, ty, stmts), Section::Definition);
    any_of(vec![as_module, as_definition])
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod module_tests;
