use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::grammar::expr::build_expr;
use crate::grammar::stmt::build_stmt_sequence;
use crate::grammar::ty::build_type;
use crate::parser::Cursor;
use oberon_core::{Interner, PositionTable};

fn ctx() -> GrammarContext {
    GrammarContext::new(Rc::new(RefCell::new(Interner::new())))
}

fn cursor(text: &str) -> Cursor<'_> {
    let mut table = PositionTable::new();
    let source = table.add_file("test.Mod", text);
    Cursor::new(source, text)
}

fn handle(grammar: &GrammarContext) -> Linker<crate::ast::DeclarationSequence> {
    let expr = build_expr(grammar).handle();
    let ty = build_type(grammar, Rc::clone(&expr)).handle();
    let stmts = build_stmt_sequence(grammar, expr.clone()).handle();
    build_decl_sequence(grammar, ty, expr, stmts)
}

#[test]
fn empty_sequence() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("");
    let decls = seq.handle()(&mut c).unwrap();
    assert!(decls.consts.is_empty());
    assert!(decls.types.is_empty());
    assert!(decls.vars.is_empty());
    assert!(decls.procedures.is_empty());
}

#[test]
fn const_type_var_sections() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("CONST n = 10; TYPE T = INTEGER; VAR x, y: T;");
    let decls = seq.handle()(&mut c).unwrap();
    assert_eq!(decls.consts.len(), 1);
    assert_eq!(decls.types.len(), 1);
    assert_eq!(decls.vars.len(), 1);
    assert_eq!(decls.vars[0].idents.len(), 2);
}

#[test]
fn procedure_with_body() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("PROCEDURE P; VAR x: INTEGER; BEGIN x := 1 END P;");
    let decls = seq.handle()(&mut c).unwrap();
    assert_eq!(decls.procedures.len(), 1);
    let p = &decls.procedures[0];
    assert!(p.has_body());
    assert_eq!(p.body.as_ref().unwrap().statements.len(), 1);
}

#[test]
fn procedure_without_body() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("PROCEDURE P(x: INTEGER): BOOLEAN; END P;");
    let decls = seq.handle()(&mut c).unwrap();
    assert_eq!(decls.procedures.len(), 1);
    assert!(!decls.procedures[0].has_body());
}

#[test]
fn procedure_with_return_clause() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("PROCEDURE F(): INTEGER; BEGIN RETURN 1 END F;");
    let decls = seq.handle()(&mut c).unwrap();
    let body = decls.procedures[0].body.as_ref().unwrap();
    assert!(body.return_expr.is_some());
}

#[test]
fn return_clause_without_a_preceding_begin_block() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("PROCEDURE F(): INTEGER; RETURN 1 END F;");
    let decls = seq.handle()(&mut c).unwrap();
    let body = decls.procedures[0].body.as_ref().unwrap();
    assert!(body.statements.is_empty());
    assert!(body.return_expr.is_some());
}

#[test]
fn procedure_mismatched_end_name_is_rejected() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("PROCEDURE P; END Q;");
    let decls = seq.handle()(&mut c).unwrap();
    // The mismatched declaration is never absorbed, so it is left
    // unconsumed rather than rejecting the whole (possibly-empty) sequence.
    assert!(decls.procedures.is_empty());
    assert!(!c.is_at_end());
}

#[test]
fn nested_procedure_declaration() {
    let grammar = ctx();
    let seq = handle(&grammar);
    let mut c = cursor("PROCEDURE Outer; PROCEDURE Inner; BEGIN END Inner; BEGIN Inner END Outer;");
    let decls = seq.handle()(&mut c).unwrap();
    let outer = &decls.procedures[0];
    let inner_decls = &outer.body.as_ref().unwrap().decls;
    assert_eq!(inner_decls.procedures.len(), 1);
}
