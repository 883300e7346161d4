//! Declaration sequences, procedure declarations, and the two top-level
//! shapes a file can parse into: a full `Module` or a restricted
//! `Definition` (`.def`).

use std::rc::Rc;

use oberon_core::CodePlace;

use super::expr::Expression;
use super::ident::{Identifier, IdentDef, QualIdent};
use super::stmt::Statement;
use super::ty::{FormalSection, Type};

#[derive(Clone, Debug)]
pub struct ConstDecl {
    pub ident: IdentDef,
    pub expr: Rc<Expression>,
    pub place: CodePlace,
}

#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub ident: IdentDef,
    pub ty: Rc<Type>,
    pub place: CodePlace,
}

#[derive(Clone, Debug)]
pub struct VarDecl {
    pub idents: Vec<IdentDef>,
    pub ty: Rc<Type>,
    pub place: CodePlace,
}

/// A procedure body: its own declaration sequence, its statement
/// sequence, and an optional `RETURN` expression. Absent on a
/// multimethod base declaration.
#[derive(Clone, Debug)]
pub struct ProcedureBody {
    pub decls: DeclarationSequence,
    pub statements: Vec<Statement>,
    /// The value a function procedure yields. `None` for a proper
    /// procedure; for a function procedure this is what `sema` checks
    /// against `ProcedureDeclaration::return_type`.
    pub return_expr: Option<Rc<Expression>>,
}

#[derive(Clone, Debug)]
pub struct ProcedureDeclaration {
    pub ident: IdentDef,
    pub params: Vec<FormalSection>,
    pub return_type: Option<QualIdent>,
    pub body: Option<ProcedureBody>,
    /// The identifier after `END` closing the procedure. The grammar
    /// rejects the declaration outright when this does not match `ident`.
    pub end_ident: Identifier,
    pub place: CodePlace,
}

impl ProcedureDeclaration {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// `CONST`/`TYPE`/`VAR`/procedure declarations, in the fixed order the
/// grammar requires.
#[derive(Clone, Debug, Default)]
pub struct DeclarationSequence {
    pub consts: Vec<ConstDecl>,
    pub types: Vec<TypeDecl>,
    pub vars: Vec<VarDecl>,
    pub procedures: Vec<ProcedureDeclaration>,
}

#[derive(Clone, Debug)]
pub struct Import {
    /// The local alias (`IMPORT A := B` binds `A`); equal to `name` when
    /// no alias is given.
    pub alias: Identifier,
    pub name: Identifier,
    pub place: CodePlace,
}

#[derive(Clone, Debug)]
pub struct Module {
    pub name: Identifier,
    pub imports: Vec<Import>,
    pub decls: DeclarationSequence,
    pub body: Vec<Statement>,
    pub end_name: Identifier,
    pub place: CodePlace,
}

/// A restricted module containing only declarations (`.def` file). Every
/// symbol it declares is exported regardless of the source `*` marker,
/// and a procedure declaration here has no body — it becomes a variable
/// of procedure type in the resulting module table.
#[derive(Clone, Debug)]
pub struct Definition {
    pub name: Identifier,
    pub imports: Vec<Import>,
    pub decls: DeclarationSequence,
    pub end_name: Identifier,
    pub place: CodePlace,
}

/// The two shapes a loaded file can parse into.
#[derive(Clone, Debug)]
pub enum Section {
    Module(Module),
    Definition(Definition),
}

impl Section {
    pub fn name(&self) -> Identifier {
        match self {
            Section::Module(m) => m.name,
            Section::Definition(d) => d.name,
        }
    }

    pub fn imports(&self) -> &[Import] {
        match self {
            Section::Module(m) => &m.imports,
            Section::Definition(d) => &d.imports,
        }
    }

    pub fn decls(&self) -> &DeclarationSequence {
        match self {
            Section::Module(m) => &m.decls,
            Section::Definition(d) => &d.decls,
        }
    }
}
