//! Expression typing, designator resolution, and constant folding.
//!
//! Designator resolution handles two ambiguities the grammar leaves for
//! semantic analysis to repair (§4.8): a leading qualifier that turns
//! out to name a variable rather than an imported module, and a trailing
//! `(ident)` that the grammar always parses as a type guard even when it
//! is really a single-argument call the guard syntax happens to match.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use oberon_core::{CodePlace, Interner, Symbol};

use crate::ast::{
    BuiltInType, Designator, Expression, FormalSection, NumberLit, Operator, ParamMode, QualIdent, Selector, SetElement, Sign,
    Type,
};
use crate::diagnostics::Diagnostics;

use super::scope::{AsTypeLookup, Binding, ProcSignature, Scope};
use super::symbols::ConstValue;
use super::types::{drop_dimensions, find_field, normalize, type_extends_base, types_equal, DropError, FieldLookup, TypeLookup};

/// A compile-time constant value, folded from a literal or a named
/// constant's defining expression.
#[derive(Clone, Debug)]
pub enum ConstFold {
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(u8),
    Str(Vec<u8>),
    Set(BTreeSet<u32>),
    Nil,
}

fn resolve_name(interner: &RefCell<Interner>, name: Symbol) -> String {
    interner.borrow().resolve(name).to_string()
}

pub(super) fn builtin(kind: BuiltInType, place: CodePlace) -> Rc<Type> {
    Rc::new(Type::BuiltIn(kind, place))
}

pub(super) fn is_builtin(ty: &Type, lookup: &dyn TypeLookup, kind: BuiltInType) -> bool {
    match normalize(&Rc::new(ty.clone()), lookup, false).as_ref() {
        Type::BuiltIn(k, _) => *k == kind,
        _ => false,
    }
}

pub(super) fn is_numeric(ty: &Type, lookup: &dyn TypeLookup) -> bool {
    matches!(
        normalize(&Rc::new(ty.clone()), lookup, false).as_ref(),
        Type::BuiltIn(BuiltInType::Integer | BuiltInType::Real | BuiltInType::Byte, _)
    )
}

/// A procedure's return type is stored as a bare `QualIdent` (it is parsed
/// the same way a `VAR`'s type name would be, but without going through
/// `grammar::ty::type_name`'s builtin reinterpretation). Apply the same
/// reinterpretation here so `PROCEDURE F(): INTEGER` resolves to the
/// built-in type rather than an unresolvable name lookup.
pub(super) fn resolve_return_type(q: QualIdent, interner: &RefCell<Interner>) -> Rc<Type> {
    if q.is_simple() {
        let text = interner.borrow().resolve(q.name.name).to_string();
        let as_builtin = match text.as_str() {
            "BOOLEAN" => Some(BuiltInType::Boolean),
            "CHAR" => Some(BuiltInType::Char),
            "INTEGER" => Some(BuiltInType::Integer),
            "REAL" => Some(BuiltInType::Real),
            "BYTE" => Some(BuiltInType::Byte),
            "SET" => Some(BuiltInType::Set),
            _ => None,
        };
        if let Some(kind) = as_builtin {
            return builtin(kind, q.place);
        }
    }
    Rc::new(Type::Name(q))
}

fn procedure_signature_type(sig: &ProcSignature, place: CodePlace) -> Rc<Type> {
    Rc::new(Type::Procedure { params: sig.params.clone(), return_type: sig.return_type, place })
}

fn binding_type(binding: &Binding, place: CodePlace) -> Rc<Type> {
    match binding {
        Binding::Symbol(tok) => Rc::clone(&tok.ty),
        Binding::Value(val) => Rc::clone(&val.ty),
        Binding::Procedure(sig) => procedure_signature_type(sig, place),
        Binding::Import => unreachable!("callers check for Binding::Import before calling binding_type"),
    }
}

/// The result of resolving a designator: its type, plus a repaired
/// argument list when a trailing type-guard selector turned out to be a
/// single-argument call (the grammar cannot tell the two apart; see the
/// module doc comment).
struct Resolved {
    ty: Rc<Type>,
    repaired_args: Option<Vec<Rc<Expression>>>,
}

fn resolve_designator(designator: &Designator, scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) -> Option<Resolved> {
    let lookup = AsTypeLookup(scope);
    let base_ty;

    match designator.qualident.qualifier {
        None => {
            let binding = scope.resolve(designator.qualident.name.name).or_else(|| {
                diagnostics.error(
                    designator.qualident.place,
                    format!("undeclared identifier '{}'", resolve_name(interner, designator.qualident.name.name)),
                );
                None
            })?;
            if matches!(binding, Binding::Import) {
                diagnostics.error(designator.qualident.place, "an import cannot be used as a value");
                return None;
            }
            base_ty = binding_type(&binding, designator.qualident.place);
        }
        Some(qualifier) => {
            let qualifier_binding = scope.resolve(qualifier.name).or_else(|| {
                diagnostics.error(qualifier.place, format!("undeclared identifier '{}'", resolve_name(interner, qualifier.name)));
                None
            })?;
            match qualifier_binding {
                Binding::Import => {
                    let imported = scope.resolve_in_import(qualifier.name, designator.qualident.name.name).or_else(|| {
                        diagnostics.error(
                            designator.qualident.place,
                            format!("'{}' is not exported by '{}'", resolve_name(interner, designator.qualident.name.name), resolve_name(interner, qualifier.name)),
                        );
                        None
                    })?;
                    if matches!(imported, Binding::Import) {
                        diagnostics.error(designator.qualident.place, "an import cannot be used as a value");
                        return None;
                    }
                    base_ty = binding_type(&imported, designator.qualident.place);
                }
                other => {
                    // Qualifier repair: `a.b` where `a` is not an import is
                    // really a field selector on `a`, not a qualified name.
                    base_ty = binding_type(&other, qualifier.place);
                    let repaired = find_field(&base_ty, designator.qualident.name.name, &lookup);
                    let field_ty = match repaired {
                        FieldLookup::Found(ty) => ty,
                        FieldLookup::NotARecord => {
                            diagnostics.error(designator.qualident.place, "field selector on a non-record type");
                            return None;
                        }
                        FieldLookup::NoSuchField => {
                            diagnostics.error(
                                designator.qualident.place,
                                format!("no such field '{}'", resolve_name(interner, designator.qualident.name.name)),
                            );
                            return None;
                        }
                    };
                    return apply_selectors(field_ty, &designator.selectors, scope, interner, diagnostics);
                }
            }
        }
    }
    apply_selectors(base_ty, &designator.selectors, scope, interner, diagnostics)
}

fn apply_selectors(mut ty: Rc<Type>, selectors: &[Selector], scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) -> Option<Resolved> {
    let lookup = AsTypeLookup(scope);
    for (i, selector) in selectors.iter().enumerate() {
        match selector {
            Selector::Field(id) => match find_field(&ty, id.name, &lookup) {
                FieldLookup::Found(field_ty) => ty = field_ty,
                FieldLookup::NotARecord => {
                    diagnostics.error(id.place, "field selector on a non-record type");
                    return None;
                }
                FieldLookup::NoSuchField => {
                    diagnostics.error(id.place, format!("no such field '{}'", resolve_name(interner, id.name)));
                    return None;
                }
            },
            Selector::Index(indices) => {
                for idx in indices {
                    if let Some(idx_ty) = get_type(idx, scope, interner, diagnostics) {
                        if !is_builtin(&idx_ty, &lookup, BuiltInType::Integer) {
                            diagnostics.error(idx.place(), "index expression must be INTEGER");
                        }
                    }
                }
                ty = match drop_dimensions(&ty, indices.len(), &lookup) {
                    Ok(t) => t,
                    Err(DropError::NotAnArray) => {
                        diagnostics.error(ty.place(), "index applied to a non-array type");
                        return None;
                    }
                    Err(DropError::TooManyDimensions) => {
                        diagnostics.error(ty.place(), "too many index expressions for this array's rank");
                        return None;
                    }
                };
            }
            Selector::Deref => match normalize(&ty, &lookup, true).as_ref() {
                Type::Pointer { referent, .. } => ty = Rc::clone(referent),
                _ => {
                    diagnostics.error(ty.place(), "'^' applied to a non-pointer type");
                    return None;
                }
            },
            Selector::TypeGuard(guard) => {
                if lookup.lookup_type(guard).is_some() {
                    if !type_extends_base(&normalize(&ty, &lookup, false), guard, &lookup) {
                        diagnostics.error(guard.place, "type guard names a type that does not extend the designator's type");
                    }
                    ty = Rc::new(Type::Name(*guard));
                } else if i == selectors.len() - 1 {
                    // Proc-call repair: `P(x)` parses as `P` with a
                    // trailing `TypeGuard(x)` selector, since the grammar
                    // cannot distinguish a single bare-identifier argument
                    // from a type-guard argument until names are resolved.
                    let arg = Rc::new(Expression::Design {
                        designator: Designator::simple(*guard),
                        args: None,
                        place: guard.place,
                    });
                    return Some(Resolved { ty, repaired_args: Some(vec![arg]) });
                } else {
                    diagnostics.error(guard.place, format!("undeclared type '{}'", resolve_name(interner, guard.name.name)));
                    return None;
                }
            }
        }
    }
    Some(Resolved { ty, repaired_args: None })
}

fn check_call(callee: &Rc<Type>, args: &[Rc<Expression>], scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics, place: CodePlace) -> Option<Rc<Type>> {
    let lookup = AsTypeLookup(scope);
    let Type::Procedure { params, return_type, .. } = normalize(callee, &lookup, false).as_ref().clone() else {
        diagnostics.error(place, "called value is not a procedure");
        return None;
    };
    let flat: Vec<(ParamMode, Rc<Type>)> = params.iter().flat_map(flatten_section).collect();
    if flat.len() != args.len() {
        diagnostics.error(place, format!("expected {} argument(s), found {}", flat.len(), args.len()));
    }
    for ((mode, param_ty), arg) in flat.iter().zip(args) {
        let Some(arg_ty) = get_type(arg, scope, interner, diagnostics) else { continue };
        if *mode == ParamMode::Var && !is_variable_designator(arg) {
            diagnostics.error(arg.place(), "VAR parameter requires a variable");
        }
        let assignable = types_equal(param_ty, &arg_ty)
            || matches!(param_ty.as_ref(), Type::Name(base) if type_extends_base(&arg_ty, base, &lookup))
            || pointer_extends(param_ty, &arg_ty, &lookup);
        if !assignable {
            diagnostics.error(arg.place(), "argument type does not match the parameter type");
        }
    }
    return_type.map(|q| resolve_return_type(q, interner))
}

/// A `POINTER TO Base` formal accepts a `POINTER TO Derived` argument when
/// `Derived` extends `Base`, mirroring `type_extends_base` one level down
/// through the pointer.
fn pointer_extends(param_ty: &Rc<Type>, arg_ty: &Rc<Type>, lookup: &dyn TypeLookup) -> bool {
    let (Type::Pointer { referent: param_referent, .. }, Type::Pointer { referent: arg_referent, .. }) = (param_ty.as_ref(), arg_ty.as_ref()) else {
        return false;
    };
    match param_referent.as_ref() {
        Type::Name(base) => type_extends_base(arg_referent, base, lookup),
        _ => false,
    }
}

fn flatten_section(section: &FormalSection) -> Vec<(ParamMode, Rc<Type>)> {
    section.idents.iter().map(|_| (section.mode, Rc::clone(&section.ty))).collect()
}

fn is_variable_designator(expr: &Expression) -> bool {
    matches!(expr, Expression::Design { args: None, .. })
}

/// Resolves only `designator`'s base name, applying the same
/// qualifier-vs-field repair `resolve_designator` does, without walking
/// its selector chain or recording diagnostics — callers already have a
/// type for the full designator and just need to classify its root.
fn resolve_base_binding(designator: &Designator, scope: &dyn Scope) -> Option<Binding> {
    match designator.qualident.qualifier {
        None => scope.resolve(designator.qualident.name.name),
        Some(qualifier) => match scope.resolve(qualifier.name)? {
            Binding::Import => scope.resolve_in_import(qualifier.name, designator.qualident.name.name),
            other => Some(other),
        },
    }
}

/// Whether `designator` ultimately names a variable (a parameter or a
/// `VAR` declaration) rather than a constant or procedure — required of
/// an assignment statement's left-hand side.
pub fn is_assignable(designator: &Designator, scope: &dyn Scope) -> bool {
    matches!(resolve_base_binding(designator, scope), Some(Binding::Symbol(_)))
}

/// Computes `expr`'s static type, recording any diagnostics along the
/// way. Returns `None` once a sub-expression's type could not be
/// determined, so callers only need to check the top-level result.
pub fn get_type(expr: &Expression, scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) -> Option<Rc<Type>> {
    let lookup = AsTypeLookup(scope);
    match expr {
        Expression::Number(NumberLit::Int(_), place) => Some(builtin(BuiltInType::Integer, *place)),
        Expression::Number(NumberLit::Real(_), place) => Some(builtin(BuiltInType::Real, *place)),
        Expression::Char(_, place) => Some(builtin(BuiltInType::Char, *place)),
        Expression::Str(bytes, place) => Some(Rc::new(Type::Array {
            lengths: vec![Rc::new(Expression::Number(NumberLit::Int(bytes.len() as i64 + 1), *place))],
            element: builtin(BuiltInType::Char, *place),
            open: false,
            place: *place,
        })),
        Expression::Nil(place) => Some(builtin(BuiltInType::Nil, *place)),
        Expression::Bool(_, place) => Some(builtin(BuiltInType::Boolean, *place)),
        Expression::Set(elements, place) => {
            for el in elements {
                let (a, b) = match el {
                    SetElement::Single(e) => (e, None),
                    SetElement::Range(a, b) => (a, Some(b)),
                };
                if let Some(ty) = get_type(a, scope, interner, diagnostics) {
                    if !is_builtin(&ty, &lookup, BuiltInType::Integer) {
                        diagnostics.error(a.place(), "set element must be INTEGER");
                    }
                }
                if let Some(b) = b {
                    if let Some(ty) = get_type(b, scope, interner, diagnostics) {
                        if !is_builtin(&ty, &lookup, BuiltInType::Integer) {
                            diagnostics.error(b.place(), "set element must be INTEGER");
                        }
                    }
                }
            }
            Some(builtin(BuiltInType::Set, *place))
        }
        Expression::Not(inner, place) => {
            if let Some(ty) = get_type(inner, scope, interner, diagnostics) {
                if !is_builtin(&ty, &lookup, BuiltInType::Boolean) {
                    diagnostics.error(*place, "'~' requires a BOOLEAN operand");
                }
            }
            Some(builtin(BuiltInType::Boolean, *place))
        }
        Expression::Design { designator, args, place } => {
            let resolved = resolve_designator(designator, scope, interner, diagnostics)?;
            let effective_args = resolved.repaired_args.as_deref().or(args.as_deref());
            match effective_args {
                Some(call_args) => check_call(&resolved.ty, call_args, scope, interner, diagnostics, *place),
                None => Some(resolved.ty),
            }
        }
        Expression::Binary { sign, first, rest, place } => {
            let first_ty = get_type(first, scope, interner, diagnostics)?;
            if sign.is_some() && !is_numeric(&first_ty, &lookup) {
                diagnostics.error(*place, "unary sign requires a numeric operand");
            }
            let Some((operator, second)) = rest else {
                return Some(first_ty);
            };
            let second_ty = get_type(second, scope, interner, diagnostics)?;
            binary_result_type(*operator, &first_ty, &second_ty, &lookup, diagnostics, *place)
        }
    }
}

fn binary_result_type(op: Operator, lhs: &Rc<Type>, rhs: &Rc<Type>, lookup: &dyn TypeLookup, diagnostics: &mut Diagnostics, place: CodePlace) -> Option<Rc<Type>> {
    match op {
        Operator::Mul | Operator::Div | Operator::Add | Operator::Sub => {
            if is_builtin(lhs, lookup, BuiltInType::Set) && is_builtin(rhs, lookup, BuiltInType::Set) {
                Some(builtin(BuiltInType::Set, place))
            } else if is_numeric(lhs, lookup) && is_numeric(rhs, lookup) {
                if matches!(normalize(lhs, lookup, false).as_ref(), Type::BuiltIn(BuiltInType::Real, _))
                    || matches!(normalize(rhs, lookup, false).as_ref(), Type::BuiltIn(BuiltInType::Real, _))
                {
                    Some(builtin(BuiltInType::Real, place))
                } else {
                    Some(builtin(BuiltInType::Integer, place))
                }
            } else {
                diagnostics.error(place, "operand types are not compatible with this operator");
                None
            }
        }
        Operator::IntDiv | Operator::Mod => {
            if !is_builtin(lhs, lookup, BuiltInType::Integer) || !is_builtin(rhs, lookup, BuiltInType::Integer) {
                diagnostics.error(place, "DIV/MOD require INTEGER operands");
            }
            Some(builtin(BuiltInType::Integer, place))
        }
        Operator::And | Operator::Or => {
            if !is_builtin(lhs, lookup, BuiltInType::Boolean) || !is_builtin(rhs, lookup, BuiltInType::Boolean) {
                diagnostics.error(place, "AND/OR require BOOLEAN operands");
            }
            Some(builtin(BuiltInType::Boolean, place))
        }
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge | Operator::Eq | Operator::NotEq => {
            Some(builtin(BuiltInType::Boolean, place))
        }
        Operator::In => {
            if !is_builtin(lhs, lookup, BuiltInType::Integer) || !is_builtin(rhs, lookup, BuiltInType::Set) {
                diagnostics.error(place, "IN requires an INTEGER left operand and a SET right operand");
            }
            Some(builtin(BuiltInType::Boolean, place))
        }
        Operator::Is => Some(builtin(BuiltInType::Boolean, place)),
    }
}

/// Folds `expr` to a compile-time constant, or records a diagnostic and
/// returns `None` when it is not one.
pub fn eval(expr: &Expression, scope: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) -> Option<ConstFold> {
    match expr {
        Expression::Number(NumberLit::Int(v), _) => Some(ConstFold::Int(*v)),
        Expression::Number(NumberLit::Real(v), _) => Some(ConstFold::Real(*v)),
        Expression::Char(c, _) => Some(ConstFold::Char(*c)),
        Expression::Str(bytes, _) => Some(ConstFold::Str(bytes.clone())),
        Expression::Nil(_) => Some(ConstFold::Nil),
        Expression::Bool(b, _) => Some(ConstFold::Bool(*b)),
        Expression::Set(elements, place) => {
            let mut set = BTreeSet::new();
            for el in elements {
                match el {
                    SetElement::Single(e) => match eval(e, scope, interner, diagnostics)? {
                        ConstFold::Int(v) => {
                            set.insert(v as u32);
                        }
                        _ => {
                            diagnostics.error(e.place(), "set element is not a compile-time INTEGER constant");
                            return None;
                        }
                    },
                    SetElement::Range(a, b) => {
                        let (ConstFold::Int(lo), ConstFold::Int(hi)) = (eval(a, scope, interner, diagnostics)?, eval(b, scope, interner, diagnostics)?) else {
                            diagnostics.error(*place, "set range bounds must be compile-time INTEGER constants");
                            return None;
                        };
                        for v in lo..=hi {
                            set.insert(v as u32);
                        }
                    }
                }
            }
            Some(ConstFold::Set(set))
        }
        Expression::Not(inner, place) => match eval(inner, scope, interner, diagnostics)? {
            ConstFold::Bool(b) => Some(ConstFold::Bool(!b)),
            _ => {
                diagnostics.error(*place, "expression is not a compile-time constant");
                None
            }
        },
        Expression::Design { designator, args: None, place } if designator.selectors.is_empty() && designator.qualident.qualifier.is_none() => {
            match scope.resolve(designator.qualident.name.name) {
                Some(Binding::Value(ConstValue { expr, .. })) => eval(&expr, scope, interner, diagnostics),
                _ => {
                    diagnostics.error(*place, "expression is not a compile-time constant");
                    None
                }
            }
        }
        Expression::Design { place, .. } => {
            diagnostics.error(*place, "expression is not a compile-time constant");
            None
        }
        Expression::Binary { sign, first, rest, place } => {
            let first = eval(first, scope, interner, diagnostics)?;
            let first = apply_sign(*sign, first, *place, diagnostics)?;
            match rest {
                None => Some(first),
                Some((operator, second)) => {
                    let second = eval(second, scope, interner, diagnostics)?;
                    eval_binary(*operator, first, second, *place, diagnostics)
                }
            }
        }
    }
}

fn apply_sign(sign: Option<Sign>, value: ConstFold, place: CodePlace, diagnostics: &mut Diagnostics) -> Option<ConstFold> {
    match (sign, value) {
        (None, v) => Some(v),
        (Some(Sign::Plus), v) => Some(v),
        (Some(Sign::Minus), ConstFold::Int(v)) => Some(ConstFold::Int(-v)),
        (Some(Sign::Minus), ConstFold::Real(v)) => Some(ConstFold::Real(-v)),
        (Some(Sign::Minus), _) => {
            diagnostics.error(place, "unary '-' requires a numeric constant");
            None
        }
    }
}

fn eval_binary(op: Operator, lhs: ConstFold, rhs: ConstFold, place: CodePlace, diagnostics: &mut Diagnostics) -> Option<ConstFold> {
    use ConstFold::*;
    match (op, lhs, rhs) {
        (Operator::Add, Int(a), Int(b)) => Some(Int(a + b)),
        (Operator::Add, Real(a), Real(b)) => Some(Real(a + b)),
        (Operator::Add, Set(a), Set(b)) => Some(Set(a.union(&b).copied().collect())),
        (Operator::Sub, Int(a), Int(b)) => Some(Int(a - b)),
        (Operator::Sub, Real(a), Real(b)) => Some(Real(a - b)),
        (Operator::Sub, Set(a), Set(b)) => Some(Set(a.difference(&b).copied().collect())),
        (Operator::Mul, Int(a), Int(b)) => Some(Int(a * b)),
        (Operator::Mul, Real(a), Real(b)) => Some(Real(a * b)),
        (Operator::Mul, Set(a), Set(b)) => Some(Set(a.intersection(&b).copied().collect())),
        (Operator::Div, Real(a), Real(b)) => Some(Real(a / b)),
        (Operator::Div, Set(a), Set(b)) => Some(Set(a.symmetric_difference(&b).copied().collect())),
        (Operator::IntDiv, Int(a), Int(b)) if b != 0 => Some(Int(a.div_euclid(b))),
        (Operator::Mod, Int(a), Int(b)) if b != 0 => Some(Int(a.rem_euclid(b))),
        (Operator::And, Bool(a), Bool(b)) => Some(Bool(a && b)),
        (Operator::Or, Bool(a), Bool(b)) => Some(Bool(a || b)),
        (Operator::In, Int(a), Set(b)) => Some(Bool(b.contains(&(a as u32)))),
        (Operator::Lt, Int(a), Int(b)) => Some(Bool(a < b)),
        (Operator::Le, Int(a), Int(b)) => Some(Bool(a <= b)),
        (Operator::Gt, Int(a), Int(b)) => Some(Bool(a > b)),
        (Operator::Ge, Int(a), Int(b)) => Some(Bool(a >= b)),
        (Operator::Eq, Int(a), Int(b)) => Some(Bool(a == b)),
        (Operator::NotEq, Int(a), Int(b)) => Some(Bool(a != b)),
        (Operator::Eq, Char(a), Char(b)) => Some(Bool(a == b)),
        (Operator::NotEq, Char(a), Char(b)) => Some(Bool(a != b)),
        (Operator::Eq, Bool(a), Bool(b)) => Some(Bool(a == b)),
        (Operator::NotEq, Bool(a), Bool(b)) => Some(Bool(a != b)),
        (Operator::Is, ..) => {
            diagnostics.error(place, "'IS' is not a compile-time constant expression");
            None
        }
        _ => {
            diagnostics.error(place, "operand types are not compatible with this operator");
            None
        }
    }
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod expr_tests;
