//! Designators and the layered expression grammar: factor → term →
//! simple-expression → expression.

use std::rc::Rc;

use crate::ast::{Designator, Expression, Operator, QualIdent, Selector, SetElement, Sign};
use crate::parser::{any_of, chain, delim_sequence, many, map, maybe, Linker, Parser};

use super::context::GrammarContext;
use super::lexical::{char_literal, here, identifier, keyword, number, op, string_literal};

/// `[ident "."] ident`. The first dot (if any) is consumed here; further
/// dots are ordinary field selectors parsed by `designator`. Whether the
/// leading qualifier actually names a module is a semantic question
/// (qualifier repair, §4.8), not a grammar one.
pub fn qualident(ctx: &GrammarContext) -> Parser<QualIdent> {
    let first = identifier(ctx);
    let second = identifier(ctx);
    let p = chain(first, maybe(chain(op("."), second)));
    map(p, |(first, rest)| match rest {
        Some((_, second)) => QualIdent::qualified(first, second),
        None => QualIdent::simple(first),
    })
}

fn selector(ctx: &GrammarContext, expr: Parser<Rc<Expression>>) -> Parser<Selector> {
    let field = map(chain(op("."), identifier(ctx)), |(_, id)| Selector::Field(id));
    let index = map(
        chain(op("["), chain(delim_sequence(Rc::clone(&expr), op(",")), op("]"))),
        |(_, (list, _))| Selector::Index(list),
    );
    let deref = map(op("^"), |_| Selector::Deref);
    let guard = map(chain(op("("), chain(qualident(ctx), op(")"))), |(_, (q, _))| {
        Selector::TypeGuard(q)
    });
    any_of(vec![field, index, deref, guard])
}

pub fn designator(ctx: &GrammarContext, expr: Parser<Rc<Expression>>) -> Parser<Designator> {
    let q = qualident(ctx);
    let sels = many(selector(ctx, expr));
    let p = chain(q, sels);
    map(p, |(qualident, selectors)| Designator {
        place: qualident.place,
        qualident,
        selectors,
    })
}

pub(crate) fn actual_params(expr: Parser<Rc<Expression>>) -> Parser<Vec<Rc<Expression>>> {
    let list = maybe(delim_sequence(expr, op(",")));
    let p = chain(op("("), chain(list, op(")")));
    map(p, |(_, (list, _))| list.unwrap_or_default())
}

fn set_element(expr: Parser<Rc<Expression>>) -> Parser<SetElement> {
    let p = chain(Rc::clone(&expr), maybe(chain(op(".."), expr)));
    map(p, |(first, rest)| match rest {
        Some((_, second)) => SetElement::Range(first, second),
        None => SetElement::Single(first),
    })
}

fn set_literal(expr: Parser<Rc<Expression>>) -> Parser<Rc<Expression>> {
    let list = maybe(delim_sequence(set_element(expr), op(",")));
    let p = chain(here(), chain(op("{"), chain(list, op("}"))));
    map(p, |(place, (_, (list, _)))| {
        Rc::new(Expression::Set(list.unwrap_or_default(), place))
    })
}

/// `number | string | NIL | TRUE | FALSE | set | designator [actualParameters] | "(" expr ")" | "~" factor`.
///
/// `factor_handle` is used for the `"~" factor` recursion (so `~` binds
/// only as tightly as a factor); `expr_handle` is used everywhere a full
/// expression is legal (parenthesized sub-expressions, index lists,
/// actual parameters, set range bounds).
fn factor(ctx: &GrammarContext, factor_handle: Parser<Rc<Expression>>, expr_handle: Parser<Rc<Expression>>) -> Parser<Rc<Expression>> {
    let number_lit = map(number(), |(lit, place)| Rc::new(Expression::Number(lit, place)));
    let char_lit = map(char_literal(), |(ch, place)| Rc::new(Expression::Char(ch, place)));
    let str_lit = map(string_literal(), |(bytes, place)| Rc::new(Expression::Str(bytes, place)));
    let nil_lit = map(chain(here(), keyword("NIL")), |(place, _)| Rc::new(Expression::Nil(place)));
    let true_lit = map(chain(here(), keyword("TRUE")), |(place, _)| Rc::new(Expression::Bool(true, place)));
    let false_lit = map(chain(here(), keyword("FALSE")), |(place, _)| Rc::new(Expression::Bool(false, place)));
    let set_lit = set_literal(Rc::clone(&expr_handle));
    let designed = {
        let designator_p = designator(ctx, Rc::clone(&expr_handle));
        let args = maybe(actual_params(Rc::clone(&expr_handle)));
        map(chain(here(), chain(designator_p, args)), |(place, (designator, args))| {
            Rc::new(Expression::Design { designator, args, place })
        })
    };
    let parens = {
        let p = chain(op("("), chain(expr_handle, op(")")));
        map(p, |(_, (inner, _))| inner)
    };
    let negated = {
        let p = chain(here(), chain(op("~"), factor_handle));
        map(p, |(place, (_, inner))| Rc::new(Expression::Not(inner, place)))
    };
    any_of(vec![
        number_lit, char_lit, str_lit, nil_lit, true_lit, false_lit, set_lit, designed, parens, negated,
    ])
}

fn binary_op(text_ops: &[(&'static str, Operator)], keyword_ops: &[(&'static str, Operator)]) -> Parser<Operator> {
    let mut alts: Vec<Parser<Operator>> = Vec::new();
    for &(text, operator) in text_ops {
        alts.push(map(op(text), move |_| operator));
    }
    for &(text, operator) in keyword_ops {
        alts.push(map(keyword(text), move |_| operator));
    }
    any_of(alts)
}

/// Left-fold a chain of `(operator, operand)` pairs onto `first`, with an
/// optional leading sign attached to the very first node. Each node keeps
/// exactly one trailing `(operator, operand)` slot, matching the shape
/// every precedence level in the AST shares.
fn fold_binary(first: Rc<Expression>, sign: Option<Sign>, pairs: Vec<(Operator, Rc<Expression>)>) -> Rc<Expression> {
    let place = first.place();
    if pairs.is_empty() {
        return match sign {
            Some(sign) => Rc::new(Expression::Binary {
                sign: Some(sign),
                first,
                rest: None,
                place,
            }),
            None => first,
        };
    }
    let mut iter = pairs.into_iter();
    let (op0, rhs0) = iter.next().expect("checked non-empty above");
    let mut node = Rc::new(Expression::Binary {
        sign,
        first,
        rest: Some((op0, rhs0)),
        place,
    });
    for (op, rhs) in iter {
        node = Rc::new(Expression::Binary {
            sign: None,
            first: node,
            rest: Some((op, rhs)),
            place,
        });
    }
    node
}

/// `factor {MulOp factor}`, `MulOp = "*" | "/" | DIV | MOD | "&"`.
fn term(factor: Parser<Rc<Expression>>) -> Parser<Rc<Expression>> {
    let mul_op = binary_op(&[("*", Operator::Mul), ("/", Operator::Div), ("&", Operator::And)], &[
        ("DIV", Operator::IntDiv),
        ("MOD", Operator::Mod),
    ]);
    let pairs = many(chain(mul_op, Rc::clone(&factor)));
    let p = chain(factor, pairs);
    map(p, |(first, pairs)| fold_binary(first, None, pairs))
}

/// `["+"|"-"] term {AddOp term}`, `AddOp = "+" | "-" | OR`.
fn simple_expr(term: Parser<Rc<Expression>>) -> Parser<Rc<Expression>> {
    let sign = maybe(any_of(vec![map(op("+"), |_| Sign::Plus), map(op("-"), |_| Sign::Minus)]));
    let add_op = binary_op(&[("+", Operator::Add), ("-", Operator::Sub)], &[("OR", Operator::Or)]);
    let pairs = many(chain(add_op, Rc::clone(&term)));
    let p = chain(sign, chain(term, pairs));
    map(p, |(sign, (first, pairs))| fold_binary(first, sign, pairs))
}

/// `SimpleExpr [relation SimpleExpr]`, a single optional relation (not a
/// chain — Oberon does not let relational operators associate).
fn expr(simple: Parser<Rc<Expression>>) -> Parser<Rc<Expression>> {
    let relation = binary_op(
        &[
            ("=", Operator::Eq),
            ("#", Operator::NotEq),
            ("<=", Operator::Le),
            ("<", Operator::Lt),
            (">=", Operator::Ge),
            (">", Operator::Gt),
        ],
        &[("IN", Operator::In), ("IS", Operator::Is)],
    );
    let pair = maybe(chain(relation, simple.clone()));
    let p = chain(simple, pair);
    map(p, |(first, pair)| match pair {
        Some((op, second)) => fold_binary(first, None, vec![(op, second)]),
        None => first,
    })
}

/// Builds the whole cyclic expression grammar and links it. Returns the
/// handle everything else (statements, types, declarations) should call
/// into for "parse a full expression here".
pub fn build_expr(ctx: &GrammarContext) -> Linker<Rc<Expression>> {
    let expr_linker: Linker<Rc<Expression>> = Linker::new();
    let factor_linker: Linker<Rc<Expression>> = Linker::new();

    let factor_p = factor(ctx, factor_linker.handle(), expr_linker.handle());
    factor_linker.link(factor_p.clone());

    let term_p = term(factor_p);
    let simple_p = simple_expr(term_p);
    let expr_p = expr(simple_p);
    expr_linker.link(expr_p);

    expr_linker
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod expr_tests;
