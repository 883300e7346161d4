use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::ast::{Expression, NumberLit, Operator, Sign};
use oberon_core::{Interner, PositionTable};

fn ctx() -> GrammarContext {
    GrammarContext::new(Rc::new(RefCell::new(Interner::new())))
}

fn cursor(text: &str) -> Cursor<'_> {
    let mut table = PositionTable::new();
    let source = table.add_file("test.Mod", text);
    Cursor::new(source, text)
}

use crate::parser::Cursor;

#[test]
fn parses_plain_number_literal() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("42");
    let result = handle.handle()(&mut c).unwrap();
    assert!(matches!(*result, Expression::Number(NumberLit::Int(42), _)));
}

#[test]
fn parses_additive_chain_left_associatively() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("1 + 2 - 3");
    let result = handle.handle()(&mut c).unwrap();
    match &*result {
        Expression::Binary { rest: Some((Operator::Sub, _)), first, .. } => {
            assert!(matches!(**first, Expression::Binary { rest: Some((Operator::Add, _)), .. }));
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn unary_minus_applies_to_leading_term() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("-5");
    let result = handle.handle()(&mut c).unwrap();
    assert!(matches!(*result, Expression::Binary { sign: Some(Sign::Minus), rest: None, .. }));
}

#[test]
fn relation_is_not_chainable() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("1 < 2");
    let result = handle.handle()(&mut c).unwrap();
    assert!(matches!(*result, Expression::Binary { rest: Some((Operator::Lt, _)), .. }));
    assert_eq!(c.peek(), None);
}

#[test]
fn designator_with_selectors_and_call() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("a.b[1](c)");
    let result = handle.handle()(&mut c).unwrap();
    match &*result {
        Expression::Design { designator, args, .. } => {
            assert_eq!(designator.selectors.len(), 2);
            assert!(args.is_some());
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn parenthesized_expression_overrides_precedence() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("(1 + 2) * 3");
    let result = handle.handle()(&mut c).unwrap();
    match &*result {
        Expression::Binary { first, rest: Some((Operator::Mul, _)), .. } => {
            assert!(matches!(**first, Expression::Binary { rest: Some((Operator::Add, _)), .. }));
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn tilde_binds_only_as_tight_as_a_factor() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    // ~a & b should parse ~a as the factor, then & b at the term level,
    // not ~(a & b).
    let mut c = cursor("~a & b");
    let result = handle.handle()(&mut c).unwrap();
    match &*result {
        Expression::Binary { first, rest: Some((Operator::And, _)), .. } => {
            assert!(matches!(**first, Expression::Not(_, _)));
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn set_literal_with_range_element() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("{1, 3..5}");
    let result = handle.handle()(&mut c).unwrap();
    match &*result {
        Expression::Set(elements, _) => assert_eq!(elements.len(), 2),
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn qualified_designator_parses_module_dot_ident() {
    let grammar = ctx();
    let handle = build_expr(&grammar);
    let mut c = cursor("Files.Open");
    let result = handle.handle()(&mut c).unwrap();
    match &*result {
        Expression::Design { designator, .. } => {
            assert!(!designator.qualident.is_simple());
            assert!(designator.selectors.is_empty());
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}
