//! Procedure tables and the overload rules that classify a new
//! declaration against whatever table (if any) already holds its name.
//!
//! A multimethod base is a headerless procedure declaring at least one
//! formal parameter typed `COMMON` (see [`crate::ast::BuiltInType::Common`]);
//! later declarations sharing its name are accepted as instances when
//! their concrete parameter types line up with the base's non-common
//! formal sections.

use std::cell::RefCell;

use crate::ast::{BuiltInType, ProcedureDeclaration, Type};

use super::symbols::SymbolContainer;
use super::types::{normalize, types_equal, TypeLookup};

/// A procedure declaration paired with the scope holding its own locals
/// (parameters, `VAR`/`CONST`/`TYPE` declarations, nested procedures).
/// Populated by the declaration pass before the body is checked; a
/// header-only multimethod base carries an empty scope.
///
/// The scope is a `RefCell` so that resolving a name from a *nested*
/// procedure can walk up through enclosing scopes and bump `use_count`
/// along the way without needing `&mut` access to every ancestor frame
/// at once — the same reason [`super::module::ModuleTable`] wraps its
/// own top-level scope the same way.
pub struct ProcedureScope {
    pub decl: ProcedureDeclaration,
    pub scope: RefCell<SymbolContainer>,
}

impl ProcedureScope {
    pub fn new(decl: ProcedureDeclaration) -> Self {
        Self { decl, scope: RefCell::new(SymbolContainer::new()) }
    }
}

/// A procedure name's binding: exactly one declaration, or a multimethod
/// family with a headerless base and zero or more concrete instances.
pub enum ProcedureTable {
    Simple(ProcedureScope),
    MultimethodBase { base: ProcedureScope, instances: Vec<ProcedureScope> },
    /// Never constructed standalone — instances live inside their base's
    /// `instances` list. Kept so callers that pattern-match exhaustively
    /// on "what is bound to this name" see a name for the third variant
    /// `§4.6` describes, even though it is never the container's entry.
    MultimethodInstance(ProcedureScope),
}

impl ProcedureTable {
    pub fn name_place(&self) -> oberon_core::CodePlace {
        match self {
            ProcedureTable::Simple(s) => s.decl.place,
            ProcedureTable::MultimethodBase { base, .. } => base.decl.place,
            ProcedureTable::MultimethodInstance(s) => s.decl.place,
        }
    }
}

#[derive(Debug)]
pub enum OverloadError {
    /// "Attempt to overload procedure" — existing binding is a simple,
    /// non-overloadable table.
    CannotOverloadSimple,
    /// The new declaration doesn't satisfy `instance_compatible` against
    /// the existing multimethod base.
    IncompatibleInstance,
}

fn has_common_param(decl: &ProcedureDeclaration, lookup: &dyn TypeLookup) -> bool {
    decl.params.iter().any(|section| is_common_type(&section.ty, lookup))
}

fn is_common_type(ty: &std::rc::Rc<Type>, lookup: &dyn TypeLookup) -> bool {
    matches!(normalize(ty, lookup, false).as_ref(), Type::BuiltIn(BuiltInType::Common, _))
}

/// `instance_compatible(base, candidate)`: same section count and modes;
/// every common-marked base position must be answered by a concrete
/// (non-`COMMON`) candidate type; every other position's type must be
/// equal under the context's type equivalence; return types must match.
pub fn instance_compatible(base: &ProcedureDeclaration, candidate: &ProcedureDeclaration, lookup: &dyn TypeLookup) -> bool {
    if base.params.len() != candidate.params.len() {
        return false;
    }
    for (b, c) in base.params.iter().zip(&candidate.params) {
        if b.mode != c.mode || b.idents.len() != c.idents.len() {
            return false;
        }
        if is_common_type(&b.ty, lookup) {
            if is_common_type(&c.ty, lookup) {
                return false;
            }
        } else if !types_equal(&b.ty, &c.ty) {
            return false;
        }
    }
    super::types::return_types_match(&base.return_type, &candidate.return_type)
}

/// Classifies a freshly-parsed declaration against whatever is already
/// bound to its name in `scope` (`None` if this is the first sighting).
pub fn classify(existing: Option<&ProcedureTable>, decl: ProcedureDeclaration, lookup: &dyn TypeLookup) -> Result<ProcedureTable, OverloadError> {
    match existing {
        None => {
            if decl.body.is_none() && has_common_param(&decl, lookup) {
                Ok(ProcedureTable::MultimethodBase { base: ProcedureScope::new(decl), instances: Vec::new() })
            } else {
                Ok(ProcedureTable::Simple(ProcedureScope::new(decl)))
            }
        }
        Some(ProcedureTable::Simple(_)) => Err(OverloadError::CannotOverloadSimple),
        Some(ProcedureTable::MultimethodInstance(_)) => Err(OverloadError::CannotOverloadSimple),
        Some(ProcedureTable::MultimethodBase { base, .. }) => {
            if decl.body.is_some() && instance_compatible(&base.decl, &decl, lookup) {
                Ok(ProcedureTable::MultimethodInstance(ProcedureScope::new(decl)))
            } else {
                Err(OverloadError::IncompatibleInstance)
            }
        }
    }
}

/// Folds a freshly-classified instance into an existing base table,
/// replacing it in place. Panics if `table` is not a `MultimethodBase` —
/// callers only reach here after `classify` returned `MultimethodInstance`
/// against that same table.
pub fn add_instance(table: &mut ProcedureTable, instance: ProcedureScope) {
    match table {
        ProcedureTable::MultimethodBase { instances, .. } => instances.push(instance),
        _ => unreachable!("add_instance called against a non-base table"),
    }
}

#[cfg(test)]
#[path = "procs_tests.rs"]
mod procs_tests;
