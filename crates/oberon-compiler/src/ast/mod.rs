//! The abstract syntax tree: identifiers, types, expressions, statements,
//! declarations, and the two top-level shapes (`Module`, `Definition`) a
//! source file parses into.
//!
//! Every node kind implements [`Spanned`] so diagnostics can always point
//! at "the source position of its starting token" regardless of which
//! polymorphic category (expression, statement, type, section) they are
//! looking at.

pub mod expr;
pub mod ident;
pub mod section;
pub mod stmt;
pub mod ty;

pub use expr::{Designator, Expression, NumberLit, Operator, Selector, SetElement, Sign};
pub use ident::{Identifier, IdentDef, QualIdent};
pub use section::{
    ConstDecl, DeclarationSequence, Definition, Import, Module, ProcedureBody, ProcedureDeclaration, Section,
    TypeDecl, VarDecl,
};
pub use stmt::{CaseArm, CaseLabel, GuardedBlock, Statement};
pub use ty::{BuiltInType, FieldList, FormalSection, ParamMode, Type};

use oberon_core::CodePlace;

/// A node that carries the source position of its starting token.
pub trait Spanned {
    fn place(&self) -> CodePlace;
}

impl Spanned for Expression {
    fn place(&self) -> CodePlace {
        Expression::place(self)
    }
}

impl Spanned for Statement {
    fn place(&self) -> CodePlace {
        Statement::place(self)
    }
}

impl Spanned for Type {
    fn place(&self) -> CodePlace {
        Type::place(self)
    }
}

impl Spanned for Section {
    fn place(&self) -> CodePlace {
        match self {
            Section::Module(m) => m.place,
            Section::Definition(d) => d.place,
        }
    }
}
