//! The `Scope` seam: resolving a bare or qualified name against a chain
//! of nested scopes (procedure locals over their enclosing procedure or
//! module), with `use_count` bumped the same way a direct
//! [`SymbolContainer`] lookup would.

use std::rc::Rc;

use oberon_core::Symbol;

use crate::ast::{FormalSection, QualIdent, Type};

use super::symbols::{ConstValue, SymbolToken};
use super::types::TypeLookup;

/// A procedure's call signature, detached from its body and scope so it
/// can be handed across a module boundary without exposing either.
#[derive(Clone)]
pub struct ProcSignature {
    pub params: Vec<FormalSection>,
    pub return_type: Option<QualIdent>,
    /// A multimethod base has no body and cannot be called directly —
    /// only its instances can.
    pub callable: bool,
}

/// What a bare name resolves to in some scope.
pub enum Binding {
    Symbol(SymbolToken),
    Value(ConstValue),
    Procedure(ProcSignature),
    /// The name is bound to an imported module, not a value — the
    /// qualifier case designators check for before repairing.
    Import,
}

/// A lexical scope: a module's top-level table, or a procedure's locals
/// sitting in front of its enclosing scope. Every implementor is also a
/// [`TypeLookup`], since type names resolve through the same chain.
pub trait Scope: TypeLookup {
    /// Resolves a bare name, walking outward through enclosing scopes.
    /// Bumps `use_count` on whichever scope level actually binds it.
    fn resolve(&self, name: Symbol) -> Option<Binding>;

    /// Resolves `name` inside the module bound to `import_alias` in this
    /// scope (or an enclosing one). `None` if `import_alias` is not a
    /// known import here.
    fn resolve_in_import(&self, import_alias: Symbol, name: Symbol) -> Option<Binding>;
}

pub(super) fn builtin_type(kind: crate::ast::BuiltInType, place: oberon_core::CodePlace) -> Rc<Type> {
    Rc::new(Type::BuiltIn(kind, place))
}

/// Views an already-erased `&dyn Scope` as a `&dyn TypeLookup`. A plain
/// `&dyn Scope` cannot be passed where `&dyn TypeLookup` is expected —
/// that is a trait-object-to-trait-object coercion, not supertrait method
/// access — so callers route through this instead of relying on it.
pub struct AsTypeLookup<'a>(pub &'a dyn Scope);

impl TypeLookup for AsTypeLookup<'_> {
    fn lookup_type(&self, name: &QualIdent) -> Option<Rc<Type>> {
        self.0.lookup_type(name)
    }

    fn type_extends(&self, sub: &QualIdent, base: &QualIdent) -> bool {
        self.0.type_extends(sub, base)
    }
}
