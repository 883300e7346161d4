//! Declaration sequences and procedure declarations. A procedure body
//! nests its own declaration sequence (locals, including further nested
//! procedures), so the whole thing is built behind a `Linker`.

use std::rc::Rc;

use crate::ast::{ConstDecl, DeclarationSequence, Expression, ProcedureBody, ProcedureDeclaration, Statement, Type, TypeDecl, VarDecl};
use crate::parser::{any_of, chain, many, map, maybe, no_return, option, parser, try_map, BreakPoint, Linker, Parser};

use super::context::GrammarContext;
use super::lexical::{here, identifier, keyword, op};
use super::ty::{formal_params, ident_def, ident_def_list};

fn const_decl(ctx: &GrammarContext, expr: Parser<Rc<Expression>>) -> Parser<ConstDecl> {
    let p = chain(here(), chain(ident_def(ctx), chain(op("="), chain(expr, op(";")))));
    map(p, |(place, (ident, (_, (expr, _))))| ConstDecl { ident, expr, place })
}

fn type_decl(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<TypeDecl> {
    let p = chain(here(), chain(ident_def(ctx), chain(op("="), chain(ty, op(";")))));
    map(p, |(place, (ident, (_, (ty, _))))| TypeDecl { ident, ty, place })
}

fn var_decl(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<VarDecl> {
    let p = chain(here(), chain(ident_def_list(ctx), chain(op(":"), chain(ty, op(";")))));
    map(p, |(place, (idents, (_, (ty, _))))| VarDecl { idents, ty, place })
}

/// Zero-width lookahead: succeeds without consuming anything iff `word`
/// would match here. Used to tell a header-only procedure declaration
/// (no body at all) apart from one with an empty-but-present body.
fn at_keyword(word: &'static str) -> Parser<()> {
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        if keyword(word)(bp.cursor()).is_some() {
            Some(())
        } else {
            None
        }
    })
}

fn procedure_heading(ctx: &GrammarContext, ty: Parser<Rc<Type>>) -> Parser<(crate::ast::IdentDef, Vec<crate::ast::FormalSection>, Option<crate::ast::QualIdent>)> {
    let params = maybe(formal_params(ctx, ty));
    let p = chain(no_return(keyword("PROCEDURE")), chain(ident_def(ctx), params));
    map(p, |(_, (ident, params))| {
        let (params, return_type) = params.unwrap_or_default();
        (ident, params, return_type)
    })
}

fn procedure_decl(
    ctx: &GrammarContext,
    ty: Parser<Rc<Type>>,
    expr: Parser<Rc<Expression>>,
    stmts: Parser<Vec<Statement>>,
    decls: Parser<DeclarationSequence>,
) -> Parser<ProcedureDeclaration> {
    let body = {
        let p = chain(decls, chain(maybe(chain(keyword("BEGIN"), stmts)), maybe(chain(keyword("RETURN"), expr))));
        map(p, |(decls, (body, return_expr))| ProcedureBody {
            decls,
            statements: body.map(|(_, stmts)| stmts).unwrap_or_default(),
            return_expr: return_expr.map(|(_, expr)| expr),
        })
    };
    let body_opt = any_of(vec![map(at_keyword("END"), |_| None), map(body, Some)]);
    let grammar = ctx.clone();
    let p = chain(
        here(),
        chain(procedure_heading(ctx, ty), chain(op(";"), chain(body_opt, chain(keyword("END"), identifier(ctx))))),
    );
    try_map(p, move |(place, ((ident, params, return_type), (_, (body, (_, end_ident)))))| {
        let interner = grammar.interner.borrow();
        if interner.resolve(ident.ident.name) != interner.resolve(end_ident.name) {
            return None;
        }
        drop(interner);
        Some(ProcedureDeclaration {
            ident,
            params,
            return_type,
            body,
            end_ident,
            place,
        })
    })
}

/// Builds the cyclic declaration-sequence grammar: `CONST`/`TYPE`/`VAR`
/// sections in that fixed order, then procedure declarations, each of
/// which may nest a further declaration sequence of its own.
pub fn build_decl_sequence(
    ctx: &GrammarContext,
    ty: Parser<Rc<Type>>,
    expr: Parser<Rc<Expression>>,
    stmts: Parser<Vec<Statement>>,
) -> Linker<DeclarationSequence> {
    let decls_linker: Linker<DeclarationSequence> = Linker::new();
    let decls_handle = decls_linker.handle();

    let consts = option(
        map(chain(keyword("CONST"), many(const_decl(ctx, Rc::clone(&expr)))), |(_, items)| items),
        Vec::new(),
    );
    let types = option(
        map(chain(keyword("TYPE"), many(type_decl(ctx, Rc::clone(&ty)))), |(_, items)| items),
        Vec::new(),
    );
    let vars = option(
        map(chain(keyword("VAR"), many(var_decl(ctx, Rc::clone(&ty)))), |(_, items)| items),
        Vec::new(),
    );
    let procedures = many(map(
        chain(procedure_decl(ctx, ty, expr, stmts, decls_handle), op(";")),
        |(decl, _)| decl,
    ));

    let p = chain(consts, chain(types, chain(vars, procedures)));
    let sequence = map(p, |(consts, (types, (vars, procedures)))| DeclarationSequence {
        consts,
        types,
        vars,
        procedures,
    });
    decls_linker.link(sequence);
    decls_linker
}

#[cfg(test)]
#[path = "decl_tests.rs"]
mod decl_tests;
