//! Statement checks: condition/label typing for every control-flow form,
//! plus `CASE` arm overlap detection across the whole statement.

use std::cell::RefCell;

use oberon_core::{CodePlace, Interner};

use crate::ast::{BuiltInType, CaseArm, CaseLabel, GuardedBlock, Statement};
use crate::diagnostics::{Diagnostics, WarningKind};

use super::expr::{eval, get_type, is_assignable, is_builtin, ConstFold};
use super::scope::{AsTypeLookup, Scope};

fn check_boolean_condition(expr: &crate::ast::Expression, scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    let lookup = AsTypeLookup(scope);
    if let Some(ty) = get_type(expr, scope, interner, diagnostics) {
        if !is_builtin(&ty, &lookup, BuiltInType::Boolean) {
            diagnostics.error(expr.place(), "condition must be a BOOLEAN expression");
        }
    }
}

fn check_guarded_blocks(branches: &[GuardedBlock], scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    for branch in branches {
        check_boolean_condition(&branch.condition, scope, interner, diagnostics);
        check_sequence(&branch.body, scope, interner, diagnostics);
    }
}

/// A flattened `CASE` label, as an inclusive `i64` range, for pairwise
/// overlap detection regardless of whether the source wrote a single
/// value or an explicit range.
#[derive(Clone, Copy)]
struct LabelRange {
    low: i64,
    high: i64,
    place: CodePlace,
}

fn label_range(label: &CaseLabel, scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) -> Option<LabelRange> {
    let (lo_expr, hi_expr) = match label {
        CaseLabel::Single(e) => (e, e),
        CaseLabel::Range(a, b) => (a, b),
    };
    let place = lo_expr.place();
    let lo = fold_to_i64(lo_expr, scope, interner, diagnostics)?;
    let hi = fold_to_i64(hi_expr, scope, interner, diagnostics)?;
    if lo > hi {
        diagnostics.error(place, "case label range is empty (lower bound exceeds upper bound)");
        return None;
    }
    Some(LabelRange { low: lo, high: hi, place })
}

fn fold_to_i64(expr: &crate::ast::Expression, scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) -> Option<i64> {
    match eval(expr, scope, interner, diagnostics)? {
        ConstFold::Int(v) => Some(v),
        ConstFold::Char(c) => Some(c as i64),
        _ => {
            diagnostics.error(expr.place(), "case label must be an INTEGER or CHAR compile-time constant");
            None
        }
    }
}

fn ranges_overlap(a: &LabelRange, b: &LabelRange) -> bool {
    a.low <= b.high && b.low <= a.high
}

fn check_case(selector: &crate::ast::Expression, arms: &[CaseArm], scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    let lookup = AsTypeLookup(scope);
    if let Some(ty) = get_type(selector, scope, interner, diagnostics) {
        if !is_builtin(&ty, &lookup, BuiltInType::Integer) && !is_builtin(&ty, &lookup, BuiltInType::Char) {
            diagnostics.error(selector.place(), "CASE selector must be INTEGER or CHAR");
        }
    }

    let mut seen: Vec<LabelRange> = Vec::new();
    for arm in arms {
        let mut arm_is_covered = false;
        for label in &arm.labels {
            let Some(range) = label_range(label, scope, interner, diagnostics) else { continue };
            if seen.iter().any(|prior| ranges_overlap(prior, &range)) {
                arm_is_covered = true;
            }
            seen.push(range);
        }
        if arm_is_covered {
            diagnostics.warning(arm.place, WarningKind::UnreachableCaseArm, "this CASE arm's labels are already fully covered by an earlier arm");
        }
        check_sequence(&arm.body, scope, interner, diagnostics);
    }
}

/// Checks one statement sequence, recursing into every nested block.
pub fn check_sequence(statements: &[Statement], scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    for statement in statements {
        check_statement(statement, scope, interner, diagnostics);
    }
}

fn check_statement(statement: &Statement, scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    let lookup = AsTypeLookup(scope);
    match statement {
        Statement::Assign { lhs, rhs, place } => {
            let lhs_expr = crate::ast::Expression::Design {
                designator: lhs.clone(),
                args: None,
                place: lhs.place,
            };
            let lhs_ty = get_type(&lhs_expr, scope, interner, diagnostics);
            let rhs_ty = get_type(rhs, scope, interner, diagnostics);
            if lhs_ty.is_some() && !is_assignable(lhs, scope) {
                diagnostics.error(*place, "left-hand side of an assignment must be a variable");
            }
            if let (Some(lhs_ty), Some(rhs_ty)) = (lhs_ty, rhs_ty) {
                let assignable = super::types::types_equal(&lhs_ty, &rhs_ty)
                    || matches!(lhs_ty.as_ref(), crate::ast::Type::Name(base) if super::types::type_extends_base(&rhs_ty, base, &lookup))
                    || matches!(rhs_ty.as_ref(), crate::ast::Type::BuiltIn(BuiltInType::Nil, _));
                if !assignable {
                    diagnostics.error(*place, "right-hand side type is not assignable to the left-hand side");
                }
            }
        }
        Statement::ProcCall { designator, args, place } => {
            let call = crate::ast::Expression::Design {
                designator: designator.clone(),
                args: Some(args.clone()),
                place: *place,
            };
            get_type(&call, scope, interner, diagnostics);
        }
        Statement::If { branches, else_branch, .. } => {
            check_guarded_blocks(branches, scope, interner, diagnostics);
            if let Some(body) = else_branch {
                check_sequence(body, scope, interner, diagnostics);
            }
        }
        Statement::Case { selector, arms, .. } => check_case(selector, arms, scope, interner, diagnostics),
        Statement::While { branches, .. } => check_guarded_blocks(branches, scope, interner, diagnostics),
        Statement::Repeat { body, condition, .. } => {
            check_sequence(body, scope, interner, diagnostics);
            check_boolean_condition(condition, scope, interner, diagnostics);
        }
        Statement::For { var, from, to, by, body, place } => {
            let var_expr = crate::ast::Expression::Design {
                designator: crate::ast::Designator::simple(crate::ast::QualIdent::simple(*var)),
                args: None,
                place: *place,
            };
            if let Some(ty) = get_type(&var_expr, scope, interner, diagnostics) {
                if !is_builtin(&ty, &lookup, BuiltInType::Integer) {
                    diagnostics.error(*place, "FOR loop variable must be INTEGER");
                }
            }
            for bound in [from, to] {
                if let Some(ty) = get_type(bound, scope, interner, diagnostics) {
                    if !is_builtin(&ty, &lookup, BuiltInType::Integer) {
                        diagnostics.error(bound.place(), "FOR loop bound must be INTEGER");
                    }
                }
            }
            if let Some(step) = by {
                match eval(step, scope, interner, diagnostics) {
                    Some(ConstFold::Int(0)) => diagnostics.error(step.place(), "FOR loop step must not be zero"),
                    Some(ConstFold::Int(_)) => {}
                    Some(_) => diagnostics.error(step.place(), "FOR loop step must be an INTEGER compile-time constant"),
                    None => {}
                }
            }
            check_sequence(body, scope, interner, diagnostics);
        }
    }
}

#[cfg(test)]
#[path = "stmt_tests.rs"]
mod stmt_tests;
