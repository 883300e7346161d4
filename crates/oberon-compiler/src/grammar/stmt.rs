//! Statements. The statement sequence is itself cyclic (`IF`/`WHILE`/
//! `CASE`/`FOR`/`REPEAT` all nest statement sequences), so the whole
//! grammar is built behind a `Linker` like expressions and types.

use std::rc::Rc;

use crate::ast::{CaseArm, CaseLabel, Expression, GuardedBlock, Statement};
use crate::parser::{any_of, chain, delim_sequence, many, map, maybe, no_return, option, Linker, Parser};

use super::context::GrammarContext;
use super::expr::{actual_params, designator};
use super::lexical::{here, identifier, keyword, op};

enum Tail {
    Assign(Rc<Expression>),
    Call(Vec<Rc<Expression>>),
}

/// `designator ":=" expr | designator [actualParameters]`. Both
/// alternatives share the same leading designator, so it is parsed once
/// and the tail decides which statement shape results.
fn assign_or_call(ctx: &GrammarContext, expr: Parser<Rc<Expression>>) -> Parser<Statement> {
    let lhs = designator(ctx, Rc::clone(&expr));
    let assign_tail = map(chain(op(":="), Rc::clone(&expr)), |(_, rhs)| Tail::Assign(rhs));
    let call_tail = map(maybe(actual_params(expr)), |args| Tail::Call(args.unwrap_or_default()));
    let tail = any_of(vec![assign_tail, call_tail]);
    let p = chain(here(), chain(lhs, tail));
    map(p, |(place, (designator, tail))| match tail {
        Tail::Assign(rhs) => Statement::Assign { lhs: designator, rhs, place },
        Tail::Call(args) => Statement::ProcCall { designator, args, place },
    })
}

fn if_stmt(expr: Parser<Rc<Expression>>, stmts: Parser<Vec<Statement>>) -> Parser<Statement> {
    let first = {
        let p = chain(no_return(keyword("IF")), chain(Rc::clone(&expr), chain(keyword("THEN"), stmts.clone())));
        map(p, |(_, (condition, (_, body)))| GuardedBlock { condition, body })
    };
    let elsif = {
        let p = chain(keyword("ELSIF"), chain(Rc::clone(&expr), chain(keyword("THEN"), stmts.clone())));
        map(p, |(_, (condition, (_, body)))| GuardedBlock { condition, body })
    };
    let elsifs = many(elsif);
    let else_branch = maybe(chain(keyword("ELSE"), stmts));
    let p = chain(here(), chain(first, chain(elsifs, chain(else_branch, keyword("END")))));
    map(p, |(place, (first, (elsifs, (else_branch, _))))| {
        let mut branches = vec![first];
        branches.extend(elsifs);
        Statement::If {
            branches,
            else_branch: else_branch.map(|(_, body)| body),
            place,
        }
    })
}

fn case_label(expr: Parser<Rc<Expression>>) -> Parser<CaseLabel> {
    let p = chain(Rc::clone(&expr), maybe(chain(op(".."), expr)));
    map(p, |(first, rest)| match rest {
        Some((_, second)) => CaseLabel::Range(first, second),
        None => CaseLabel::Single(first),
    })
}

fn case_arm(expr: Parser<Rc<Expression>>, stmts: Parser<Vec<Statement>>) -> Parser<CaseArm> {
    let labels = delim_sequence(case_label(expr), op(","));
    let p = chain(here(), chain(labels, chain(op(":"), stmts)));
    map(p, |(place, (labels, (_, body)))| CaseArm { labels, body, place })
}

fn case_stmt(expr: Parser<Rc<Expression>>, stmts: Parser<Vec<Statement>>) -> Parser<Statement> {
    let arms = delim_sequence(case_arm(Rc::clone(&expr), stmts), op("|"));
    let p = chain(here(), chain(no_return(keyword("CASE")), chain(Rc::clone(&expr), chain(keyword("OF"), chain(arms, keyword("END"))))));
    map(p, |(place, (_, (selector, (_, (arms, _)))))| Statement::Case { selector, arms, place })
}

fn while_stmt(expr: Parser<Rc<Expression>>, stmts: Parser<Vec<Statement>>) -> Parser<Statement> {
    let first = {
        let p = chain(no_return(keyword("WHILE")), chain(Rc::clone(&expr), chain(keyword("DO"), stmts.clone())));
        map(p, |(_, (condition, (_, body)))| GuardedBlock { condition, body })
    };
    let elsif = {
        let p = chain(keyword("ELSIF"), chain(expr, chain(keyword("DO"), stmts)));
        map(p, |(_, (condition, (_, body)))| GuardedBlock { condition, body })
    };
    let elsifs = many(elsif);
    let p = chain(here(), chain(first, chain(elsifs, keyword("END"))));
    map(p, |(place, (first, (elsifs, _)))| {
        let mut branches = vec![first];
        branches.extend(elsifs);
        Statement::While { branches, place }
    })
}

fn repeat_stmt(expr: Parser<Rc<Expression>>, stmts: Parser<Vec<Statement>>) -> Parser<Statement> {
    let p = chain(here(), chain(no_return(keyword("REPEAT")), chain(stmts, chain(keyword("UNTIL"), expr))));
    map(p, |(place, (_, (body, (_, condition))))| Statement::Repeat { body, condition, place })
}

fn for_stmt(ctx: &GrammarContext, expr: Parser<Rc<Expression>>, stmts: Parser<Vec<Statement>>) -> Parser<Statement> {
    let head = chain(no_return(keyword("FOR")), identifier(ctx));
    let from_part = chain(op(":="), Rc::clone(&expr));
    let to_part = chain(keyword("TO"), Rc::clone(&expr));
    let by_part = maybe(chain(keyword("BY"), expr));
    let do_part = chain(keyword("DO"), stmts);
    let p = chain(here(), chain(head, chain(from_part, chain(to_part, chain(by_part, chain(do_part, keyword("END")))))));
    map(p, |(place, ((_, var), ((_, from), ((_, to), (by, ((_, body), _))))))| Statement::For {
        var,
        from,
        to,
        by: by.map(|(_, e)| e),
        body,
        place,
    })
}

/// Builds the cyclic statement grammar and links it. Returns the handle
/// for "parse a statement sequence here" — declarations and module bodies
/// call into this for procedure and module bodies.
pub fn build_stmt_sequence(ctx: &GrammarContext, expr: Parser<Rc<Expression>>) -> Linker<Vec<Statement>> {
    let seq_linker: Linker<Vec<Statement>> = Linker::new();
    let stmts = seq_linker.handle();

    let stmt = {
        let simple = assign_or_call(ctx, Rc::clone(&expr));
        let if_p = if_stmt(Rc::clone(&expr), stmts.clone());
        let case_p = case_stmt(Rc::clone(&expr), stmts.clone());
        let while_p = while_stmt(Rc::clone(&expr), stmts.clone());
        let repeat_p = repeat_stmt(Rc::clone(&expr), stmts.clone());
        let for_p = for_stmt(ctx, expr, stmts);
        any_of(vec![if_p, case_p, while_p, repeat_p, for_p, simple])
    };
    let sequence = delim_sequence(stmt, op(";"));
    let sequence = option(sequence, Vec::new());
    seq_linker.link(sequence);
    seq_linker
}

#[cfg(test)]
#[path = "stmt_tests.rs"]
mod stmt_tests;
