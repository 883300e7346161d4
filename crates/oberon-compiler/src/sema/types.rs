//! Normalization, equivalence, and structural operations over resolved
//! `ast::Type` trees — the semantic layer's view of types, once names
//! have been bound to declarations.

use std::rc::Rc;

use oberon_core::Symbol;

use crate::ast::{FieldList, FormalSection, ParamMode, QualIdent, Type};

/// Anything that can resolve a type name to its declared type and answer
/// extension queries. Implemented by the symbol container / module table
/// that owns the scope a type name is looked up in.
pub trait TypeLookup {
    fn lookup_type(&self, name: &QualIdent) -> Option<Rc<Type>>;
    fn type_extends(&self, sub: &QualIdent, base: &QualIdent) -> bool;
}

/// A directed `extension -> base` mapping on record type names, consulted
/// transitively by [`TypeLookup::type_extends`] implementations.
#[derive(Default, Debug, Clone)]
pub struct TypeHierarchy {
    edges: indexmap::IndexMap<Symbol, QualIdent>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_extension(&mut self, sub: QualIdent, base: QualIdent) {
        self.edges.insert(sub.name.name, base);
    }

    /// Reflexive on the same qualified name, transitive through the base
    /// chain otherwise.
    pub fn extends(&self, sub: &QualIdent, base: &QualIdent) -> bool {
        let mut current = *sub;
        loop {
            if current.same_name(base) {
                return true;
            }
            match self.edges.get(&current.name.name) {
                Some(next) => current = *next,
                None => return false,
            }
        }
    }
}

/// Reduces `Type::Name` chains to their target. When `normalize_pointers`
/// is `false`, normalization stops at a `Type::Pointer` boundary instead
/// of recursing into its referent — required to terminate on
/// self-referential pointer-to-record types.
pub fn normalize(ty: &Rc<Type>, lookup: &dyn TypeLookup, normalize_pointers: bool) -> Rc<Type> {
    match ty.as_ref() {
        Type::Name(name) => match lookup.lookup_type(name) {
            Some(target) => normalize(&target, lookup, normalize_pointers),
            None => Rc::clone(ty),
        },
        Type::Pointer { referent, place } if normalize_pointers => Rc::new(Type::Pointer {
            referent: normalize(referent, lookup, true),
            place: *place,
        }),
        _ => Rc::clone(ty),
    }
}

/// Resolves a single `Type::Name` to its underlying type, chasing nested
/// names but never crossing a pointer boundary.
pub fn dereference_name(ty: &Rc<Type>, lookup: &dyn TypeLookup) -> Rc<Type> {
    normalize(ty, lookup, false)
}

/// Two types are equal iff the same variant and `is_equal` holds in both
/// directions. The double-dispatch exists so a future subtype-aware
/// override on one side (e.g. a record considering its base) can't make
/// equality asymmetric by accident.
pub fn types_equal(a: &Type, b: &Type) -> bool {
    is_equal(a, b) && is_equal(b, a)
}

fn is_equal(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::BuiltIn(x, _), Type::BuiltIn(y, _)) => x == y,
        (Type::Name(x), Type::Name(y)) => x.same_name(y),
        (Type::Record { base: ba, fields: fa, .. }, Type::Record { base: bb, fields: fb, .. }) => {
            opt_qualident_eq(ba, bb) && field_lists_eq(fa, fb)
        }
        (Type::Pointer { referent: ra, .. }, Type::Pointer { referent: rb, .. }) => is_equal(ra, rb),
        (Type::Array { element: ea, lengths: la, .. }, Type::Array { element: eb, lengths: lb, .. }) => {
            la.len() == lb.len() && is_equal(ea, eb)
        }
        (Type::Procedure { params: pa, return_type: rta, .. }, Type::Procedure { params: pb, return_type: rtb, .. }) => {
            params_eq(pa, pb) && opt_qualident_eq(rta, rtb)
        }
        _ => false,
    }
}

/// Whether two optional return-type names match, by name (ignoring
/// source position). Exposed for the overload-compatibility check in
/// `sema::procs`, which compares bare `Option<QualIdent>` return types
/// rather than full `Type`s.
pub fn return_types_match(a: &Option<QualIdent>, b: &Option<QualIdent>) -> bool {
    opt_qualident_eq(a, b)
}

fn opt_qualident_eq(a: &Option<QualIdent>, b: &Option<QualIdent>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x.same_name(y),
        (None, None) => true,
        _ => false,
    }
}

fn field_lists_eq(a: &[FieldList], b: &[FieldList]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(fa, fb)| {
            fa.idents.len() == fb.idents.len()
                && fa.idents.iter().zip(&fb.idents).all(|(x, y)| x.ident.same_name(&y.ident))
                && is_equal(&fa.ty, &fb.ty)
        })
}

fn flatten_params(params: &[FormalSection]) -> Vec<(ParamMode, Rc<Type>)> {
    params.iter().flat_map(|s| s.idents.iter().map(move |_| (s.mode, Rc::clone(&s.ty)))).collect()
}

fn params_eq(a: &[FormalSection], b: &[FormalSection]) -> bool {
    let fa = flatten_params(a);
    let fb = flatten_params(b);
    fa.len() == fb.len() && fa.iter().zip(&fb).all(|((ma, ta), (mb, tb))| ma == mb && is_equal(ta, tb))
}

/// `type_extends_base(t, base)`: if `t` is a record with a base, check the
/// hierarchy from that base; if `t` is a `Name`, check from its name;
/// otherwise false.
pub fn type_extends_base(ty: &Type, base: &QualIdent, lookup: &dyn TypeLookup) -> bool {
    match ty {
        Type::Record { base: Some(b), .. } => lookup.type_extends(b, base),
        Type::Name(name) => lookup.type_extends(name, base),
        _ => false,
    }
}

/// Errors from [`find_field`] are reported by callers as "not a record"
/// or "field not found", so the function itself just signals which.
pub enum FieldLookup {
    Found(Rc<Type>),
    NotARecord,
    NoSuchField,
}

/// Walks a record's own field lists first, then recurses through its base.
pub fn find_field(ty: &Rc<Type>, field: Symbol, lookup: &dyn TypeLookup) -> FieldLookup {
    let normalized = normalize(ty, lookup, false);
    match normalized.as_ref() {
        Type::Record { base, fields, .. } => {
            for list in fields {
                if list.idents.iter().any(|id| id.ident.name.name == field) {
                    return FieldLookup::Found(Rc::clone(&list.ty));
                }
            }
            match base {
                Some(base_name) => match lookup.lookup_type(base_name) {
                    Some(base_ty) => find_field(&base_ty, field, lookup),
                    None => FieldLookup::NoSuchField,
                },
                None => FieldLookup::NoSuchField,
            }
        }
        _ => FieldLookup::NotARecord,
    }
}

pub enum DropError {
    NotAnArray,
    TooManyDimensions,
}

/// `drop_dimensions(k)`: errors if `k` exceeds rank; returns the element
/// type if `k` equals the rank; otherwise an array type over the
/// remaining length expressions.
pub fn drop_dimensions(ty: &Rc<Type>, count: usize, lookup: &dyn TypeLookup) -> Result<Rc<Type>, DropError> {
    let normalized = normalize(ty, lookup, false);
    match normalized.as_ref() {
        Type::Array { lengths, element, open, place } => match count.cmp(&lengths.len()) {
            std::cmp::Ordering::Greater => Err(DropError::TooManyDimensions),
            std::cmp::Ordering::Equal => Ok(Rc::clone(element)),
            std::cmp::Ordering::Less => Ok(Rc::new(Type::Array {
                lengths: lengths[count..].to_vec(),
                element: Rc::clone(element),
                open: *open,
                place: *place,
            })),
        },
        _ => Err(DropError::NotAnArray),
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
