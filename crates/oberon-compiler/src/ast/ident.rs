//! Identifiers, qualified identifiers, and the export-marked identifiers
//! that appear on the left of a declaration.

use oberon_core::{CodePlace, Symbol};

/// A bare identifier: letters/digits starting with a letter, not a
/// reserved word. Equality is by interned symbol, which is byte-wise
/// equality on the original spelling.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Identifier {
    pub name: Symbol,
    pub place: CodePlace,
}

impl Identifier {
    pub fn new(name: Symbol, place: CodePlace) -> Self {
        Self { name, place }
    }

    /// Name equality ignoring source position, see [`QualIdent::same_name`].
    pub fn same_name(&self, other: &Identifier) -> bool {
        self.name == other.name
    }
}

/// An identifier optionally qualified by a module name (`Module.ident`).
/// "Simple" (unqualified) when `qualifier` is `None`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct QualIdent {
    pub qualifier: Option<Identifier>,
    pub name: Identifier,
    pub place: CodePlace,
}

impl QualIdent {
    pub fn simple(name: Identifier) -> Self {
        Self {
            qualifier: None,
            name,
            place: name.place,
        }
    }

    pub fn qualified(qualifier: Identifier, name: Identifier) -> Self {
        Self {
            qualifier: Some(qualifier),
            name,
            place: qualifier.place,
        }
    }

    pub fn is_simple(&self) -> bool {
        self.qualifier.is_none()
    }

    /// Name equality ignoring source position. The derived `PartialEq`
    /// compares `place` too, which is almost never what callers comparing
    /// two identifiers from different occurrences in source want.
    pub fn same_name(&self, other: &QualIdent) -> bool {
        self.qualifier.map(|q| q.name) == other.qualifier.map(|q| q.name) && self.name.name == other.name.name
    }
}

/// An identifier as it appears on the left of a declaration, with its
/// export marker (`Ident*`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IdentDef {
    pub ident: Identifier,
    pub exported: bool,
}

impl IdentDef {
    pub fn new(ident: Identifier, exported: bool) -> Self {
        Self { ident, exported }
    }

    pub fn place(&self) -> CodePlace {
        self.ident.place
    }
}
