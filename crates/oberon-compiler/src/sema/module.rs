//! Module tables: the declaration pass that turns a parsed [`Section`]
//! into a scope of bound names, and the code-analysis pass that checks
//! every procedure body against it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use oberon_core::{Interner, Symbol};

use crate::ast::{DeclarationSequence, QualIdent, Section, Type, TypeDecl};
use crate::diagnostics::Diagnostics;

use super::expr;
use super::procs::{self, OverloadError, ProcedureScope, ProcedureTable};
use super::scope::{AsTypeLookup, Binding, ProcSignature, Scope};
use super::stmt;
use super::symbols::{ConstValue, SymbolContainer, SymbolGroup, SymbolToken};
use super::types::{normalize, TypeHierarchy, TypeLookup};

fn signature_of(table: &ProcedureTable) -> ProcSignature {
    match table {
        ProcedureTable::Simple(s) => ProcSignature { params: s.decl.params.clone(), return_type: s.decl.return_type, callable: true },
        ProcedureTable::MultimethodBase { base, .. } => {
            ProcSignature { params: base.decl.params.clone(), return_type: base.decl.return_type, callable: false }
        }
        ProcedureTable::MultimethodInstance(s) => ProcSignature { params: s.decl.params.clone(), return_type: s.decl.return_type, callable: true },
    }
}

fn resolve_qualified_type(name: &QualIdent, local_lookup: impl FnOnce(Symbol) -> Option<Rc<Type>>, imports: &IndexMap<Symbol, Weak<ModuleTable>>) -> Option<Rc<Type>> {
    match name.qualifier {
        None => local_lookup(name.name.name),
        Some(q) => imports.get(&q.name.name)?.upgrade()?.lookup_type(&QualIdent::simple(name.name)),
    }
}

fn resolve_qualified_extends(sub: &QualIdent, base: &QualIdent, local_extends: impl FnOnce(&QualIdent, &QualIdent) -> bool, imports: &IndexMap<Symbol, Weak<ModuleTable>>) -> bool {
    match sub.qualifier {
        None => local_extends(sub, base),
        Some(q) => imports.get(&q.name.name).and_then(Weak::upgrade).is_some_and(|m| m.type_extends(&QualIdent::simple(sub.name), base)),
    }
}

fn resolve_name(interner: &RefCell<Interner>, name: Symbol) -> String {
    interner.borrow().resolve(name).to_string()
}

/// A `TypeLookup`/`Scope` over state still being built — plain borrowed
/// references, not yet behind the `Rc`/`RefCell` a finished, shareable
/// [`ModuleTable`] needs. Falls through to `parent` (the enclosing
/// procedure or module scope) for anything not bound here yet, so a
/// local declaration sequence can still see outer names while it is
/// mid-declaration.
struct BuildingLookup<'a> {
    scope: &'a SymbolContainer,
    hierarchy: &'a TypeHierarchy,
    imports: &'a IndexMap<Symbol, Weak<ModuleTable>>,
    parent: Option<&'a dyn Scope>,
}

impl TypeLookup for BuildingLookup<'_> {
    fn lookup_type(&self, name: &QualIdent) -> Option<Rc<Type>> {
        let found = resolve_qualified_type(
            name,
            |n| {
                let tok = self.scope.get_symbol_secretly(n)?;
                (tok.group == SymbolGroup::Type).then(|| Rc::clone(&tok.ty))
            },
            self.imports,
        );
        found.or_else(|| if name.is_simple() { self.parent?.lookup_type(name) } else { None })
    }

    fn type_extends(&self, sub: &QualIdent, base: &QualIdent) -> bool {
        resolve_qualified_extends(sub, base, |sub, base| self.hierarchy.extends(sub, base), self.imports)
            || self.parent.is_some_and(|p| p.type_extends(sub, base))
    }
}

impl Scope for BuildingLookup<'_> {
    fn resolve(&self, name: Symbol) -> Option<Binding> {
        if let Some(val) = self.scope.get_value(name) {
            return Some(Binding::Value(val.clone()));
        }
        if let Some(tok) = self.scope.get_symbol_secretly(name) {
            return Some(Binding::Symbol(tok.clone()));
        }
        if let Some(table) = self.scope.get_table(name) {
            return Some(Binding::Procedure(signature_of(table)));
        }
        if self.imports.contains_key(&name) {
            return Some(Binding::Import);
        }
        self.parent.and_then(|p| p.resolve(name))
    }

    fn resolve_in_import(&self, import_alias: Symbol, name: Symbol) -> Option<Binding> {
        if let Some(found) = self.imports.get(&import_alias).and_then(Weak::upgrade).and_then(|m| m.resolve(name)) {
            return Some(found);
        }
        self.parent.and_then(|p| p.resolve_in_import(import_alias, name))
    }
}

/// A finished module's (or `.def` definition's) bound names: its own
/// top-level scope, its record-extension hierarchy, and the modules it
/// imports, held weakly since importers never own what they import.
pub struct ModuleTable {
    pub name: Symbol,
    scope: RefCell<SymbolContainer>,
    hierarchy: TypeHierarchy,
    imports: IndexMap<Symbol, Weak<ModuleTable>>,
    exported: IndexSet<Symbol>,
}

impl ModuleTable {
    pub fn is_exported(&self, name: Symbol) -> bool {
        self.exported.contains(&name)
    }

    /// Emits `W1` for every unused top-level symbol.
    pub fn report_unused(&self, diagnostics: &mut Diagnostics, resolve: impl Fn(Symbol) -> String) {
        self.scope.borrow().report_unused(diagnostics, resolve);
    }
}

impl TypeLookup for ModuleTable {
    fn lookup_type(&self, name: &QualIdent) -> Option<Rc<Type>> {
        resolve_qualified_type(
            name,
            |n| {
                let scope = self.scope.borrow();
                let tok = scope.get_symbol_secretly(n)?;
                (tok.group == SymbolGroup::Type).then(|| Rc::clone(&tok.ty))
            },
            &self.imports,
        )
    }

    fn type_extends(&self, sub: &QualIdent, base: &QualIdent) -> bool {
        resolve_qualified_extends(sub, base, |sub, base| self.hierarchy.extends(sub, base), &self.imports)
    }
}

impl Scope for ModuleTable {
    fn resolve(&self, name: Symbol) -> Option<Binding> {
        let mut scope = self.scope.borrow_mut();
        if let Some(tok) = scope.get_symbol(name) {
            return Some(Binding::Symbol(tok.clone()));
        }
        if let Some(val) = scope.get_value(name) {
            return Some(Binding::Value(val.clone()));
        }
        if let Some(table) = scope.get_table(name) {
            return Some(Binding::Procedure(signature_of(table)));
        }
        drop(scope);
        self.imports.contains_key(&name).then_some(Binding::Import)
    }

    fn resolve_in_import(&self, import_alias: Symbol, name: Symbol) -> Option<Binding> {
        self.imports.get(&import_alias)?.upgrade()?.resolve(name)
    }
}

/// A procedure's local scope sitting in front of its enclosing scope.
/// Neither imports nor a record-extension hierarchy are tracked here:
/// qualified access and extension tests always fall through to `parent`,
/// which owns both — a local `TYPE` declaration can still be looked up
/// by name locally, but it never becomes the base of a recorded
/// extension edge.
struct LocalScope<'a> {
    parent: &'a dyn Scope,
    locals: &'a RefCell<SymbolContainer>,
}

impl TypeLookup for LocalScope<'_> {
    fn lookup_type(&self, name: &QualIdent) -> Option<Rc<Type>> {
        if name.is_simple() {
            let scope = self.locals.borrow();
            if let Some(tok) = scope.get_symbol_secretly(name.name.name) {
                if tok.group == SymbolGroup::Type {
                    return Some(Rc::clone(&tok.ty));
                }
            }
        }
        self.parent.lookup_type(name)
    }

    fn type_extends(&self, sub: &QualIdent, base: &QualIdent) -> bool {
        self.parent.type_extends(sub, base)
    }
}

impl Scope for LocalScope<'_> {
    fn resolve(&self, name: Symbol) -> Option<Binding> {
        {
            let mut scope = self.locals.borrow_mut();
            if let Some(tok) = scope.get_symbol(name) {
                return Some(Binding::Symbol(tok.clone()));
            }
            if let Some(val) = scope.get_value(name) {
                return Some(Binding::Value(val.clone()));
            }
            if let Some(table) = scope.get_table(name) {
                return Some(Binding::Procedure(signature_of(table)));
            }
        }
        self.parent.resolve(name)
    }

    fn resolve_in_import(&self, import_alias: Symbol, name: Symbol) -> Option<Binding> {
        self.parent.resolve_in_import(import_alias, name)
    }
}

/// Runs the scope-level declaration pass over `seq` (§4.5: constants,
/// then types in two passes, then variables, then procedures) into
/// `scope`/`hierarchy`. `parent` is consulted for any name this pass
/// doesn't bind itself — `None` at module level, `Some` for a
/// procedure's own declaration sequence.
#[allow(clippy::too_many_arguments)]
fn declare_sequence(
    seq: &DeclarationSequence,
    scope: &mut SymbolContainer,
    hierarchy: &mut TypeHierarchy,
    imports: &IndexMap<Symbol, Weak<ModuleTable>>,
    parent: Option<&dyn Scope>,
    interner: &RefCell<Interner>,
    diagnostics: &mut Diagnostics,
    mut on_declared: impl FnMut(Symbol, bool),
) {
    // 1. Constants.
    for c in &seq.consts {
        let lookup = BuildingLookup { scope, hierarchy, imports, parent };
        let Some(ty) = expr::get_type(&c.expr, &lookup, interner, diagnostics) else {
            continue;
        };
        if expr::eval(&c.expr, &lookup, interner, diagnostics).is_none() {
            continue;
        }
        let name = c.ident.ident.name;
        if scope.insert_value(name, ConstValue { expr: Rc::clone(&c.expr), ty }).is_err() {
            diagnostics.error(c.place, format!("redefinition of '{}'", resolve_name(interner, name)));
            continue;
        }
        on_declared(name, c.ident.exported);
    }

    // 2. Types, pass one: insert every declared name (pointer referents
    //    deferred) so forward references — including self-referential
    //    pointer-to-record types — resolve in pass two.
    let mut deferred_pointers: Vec<&TypeDecl> = Vec::new();
    for t in &seq.types {
        let lookup = BuildingLookup { scope, hierarchy, imports, parent };
        let normalized = normalize(&t.ty, &lookup, false);
        let name = t.ident.ident.name;
        if scope.insert_symbol(SymbolToken::new(name, SymbolGroup::Type, Rc::clone(&normalized), t.place)).is_err() {
            diagnostics.error(t.place, format!("redefinition of '{}'", resolve_name(interner, name)));
            continue;
        }
        on_declared(name, t.ident.exported);
        if let Type::Record { base: Some(base), .. } = normalized.as_ref() {
            hierarchy.record_extension(QualIdent::simple(t.ident.ident), *base);
        }
        if matches!(t.ty.as_ref(), Type::Pointer { .. }) {
            deferred_pointers.push(t);
        }
    }

    // 3. Types, pass two: now that every name exists, resolve deferred
    //    pointer referents and record any extension their target carries,
    //    keyed by the pointer type's own name (Oberon idiom refers to the
    //    pointer type itself for type guards and dispatch, not its
    //    anonymous referent).
    for t in deferred_pointers {
        let Type::Pointer { referent, .. } = t.ty.as_ref() else { unreachable!() };
        let lookup = BuildingLookup { scope, hierarchy, imports, parent };
        let resolved_referent = normalize(referent, &lookup, false);
        if let Type::Record { base: Some(base), .. } = resolved_referent.as_ref() {
            hierarchy.record_extension(QualIdent::simple(t.ident.ident), *base);
        }
    }

    // 4. Variables.
    for v in &seq.vars {
        let lookup = BuildingLookup { scope, hierarchy, imports, parent };
        let normalized = normalize(&v.ty, &lookup, false);
        for ident in &v.idents {
            let name = ident.ident.name;
            if scope.insert_symbol(SymbolToken::new(name, SymbolGroup::Var, Rc::clone(&normalized), v.place)).is_err() {
                diagnostics.error(v.place, format!("redefinition of '{}'", resolve_name(interner, name)));
                continue;
            }
            on_declared(name, ident.exported);
        }
    }

    // 5. Procedures, with overload classification against whatever (if
    //    anything) the name is already bound to in this same scope.
    for decl in &seq.procedures {
        let lookup = BuildingLookup { scope, hierarchy, imports, parent };
        let name = decl.ident.ident.name;
        let existing = scope.get_table(name);
        match procs::classify(existing, decl.clone(), &lookup) {
            Ok(ProcedureTable::MultimethodInstance(instance)) => {
                let table = scope.table_mut(name).expect("classify matched an existing base table");
                procs::add_instance(table, instance);
            }
            Ok(table) => {
                if scope.insert_table(name, table).is_err() {
                    diagnostics.error(decl.place, format!("redefinition of '{}'", resolve_name(interner, name)));
                    continue;
                }
                on_declared(name, decl.ident.exported);
            }
            Err(OverloadError::CannotOverloadSimple) => {
                diagnostics.error(decl.place, format!("attempt to overload procedure '{}'", resolve_name(interner, name)));
            }
            Err(OverloadError::IncompatibleInstance) => {
                diagnostics.error(decl.place, format!("'{}' does not match the common-parameter instance it overloads", resolve_name(interner, name)));
            }
        }
    }
}

/// Builds a module's table from its parsed section and already-loaded
/// imports (keyed by local alias), then recursively checks every
/// procedure body.
pub fn declare_module(section: &Section, imports: IndexMap<Symbol, Rc<ModuleTable>>, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) -> Rc<ModuleTable> {
    let weak_imports: IndexMap<Symbol, Weak<ModuleTable>> = imports.iter().map(|(k, v)| (*k, Rc::downgrade(v))).collect();
    let mut scope = SymbolContainer::new();
    let mut hierarchy = TypeHierarchy::new();
    let mut exported = IndexSet::new();
    let all_exported = matches!(section, Section::Definition(_));

    declare_sequence(section.decls(), &mut scope, &mut hierarchy, &weak_imports, None, interner, diagnostics, |name, is_exported| {
        if all_exported || is_exported {
            exported.insert(name);
        }
    });

    let table = Rc::new(ModuleTable {
        name: section.name().name,
        scope: RefCell::new(scope),
        hierarchy,
        imports: weak_imports,
        exported,
    });

    check_all_procedures(&table.scope, table.as_ref(), interner, diagnostics);
    table
}

fn check_procedure_table(entry: &ProcedureTable, parent: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    match entry {
        ProcedureTable::Simple(p) => declare_and_check_procedure(p, parent, interner, diagnostics),
        ProcedureTable::MultimethodBase { instances, .. } => {
            for instance in instances {
                declare_and_check_procedure(instance, parent, interner, diagnostics);
            }
        }
        ProcedureTable::MultimethodInstance(p) => declare_and_check_procedure(p, parent, interner, diagnostics),
    }
}

/// Checks every procedure table entry in `container` against `parent`.
/// Each entry is removed from `container` for the duration of its own
/// check and put back afterward, since resolving a name from inside a
/// nested body walks back up through `parent` — which, for a procedure's
/// own locals, may be this very container.
fn check_all_procedures(container: &RefCell<SymbolContainer>, parent: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    let names: Vec<Symbol> = container.borrow().tables().map(|(name, _)| *name).collect();
    for name in names {
        let entry = container.borrow_mut().take_table(name).expect("name came from this container's own tables()");
        check_procedure_table(&entry, parent, interner, diagnostics);
        container.borrow_mut().put_table_back(name, entry);
    }
}

/// Declares a procedure's own locals (parameters, then its nested
/// declaration sequence) against `parent`, checks its nested procedures
/// the same way, then checks its statements.
fn declare_and_check_procedure(proc_scope: &ProcedureScope, parent: &dyn Scope, interner: &RefCell<Interner>, diagnostics: &mut Diagnostics) {
    let Some(body) = &proc_scope.decl.body else {
        return;
    };
    let local_scope = LocalScope { parent, locals: &proc_scope.scope };

    for section in &proc_scope.decl.params {
        let normalized = normalize(&section.ty, &AsTypeLookup(&local_scope), false);
        let mut locals = local_scope.locals.borrow_mut();
        for ident in &section.idents {
            if locals.insert_symbol(SymbolToken::new(ident.name, SymbolGroup::Var, Rc::clone(&normalized), section.place)).is_err() {
                diagnostics.error(section.place, format!("redefinition of '{}'", resolve_name(interner, ident.name)));
            }
        }
    }

    let mut local_hierarchy = TypeHierarchy::new();
    let no_imports = IndexMap::new();
    {
        let mut locals = local_scope.locals.borrow_mut();
        // `parent` here, not `&local_scope` — the latter's `locals` is this
        // same `RefCell`, already mutably borrowed above; falling through
        // to it would both double-borrow and incorrectly treat the body's
        // own container as its own enclosing scope.
        declare_sequence(&body.decls, &mut locals, &mut local_hierarchy, &no_imports, Some(parent), interner, diagnostics, |_, _| {});
    }

    check_all_procedures(local_scope.locals, &local_scope, interner, diagnostics);
    stmt::check_sequence(&body.statements, &local_scope, interner, diagnostics);
    check_return(body, proc_scope.decl.return_type, proc_scope.decl.place, &local_scope, interner, diagnostics);
    local_scope.locals.borrow().report_unused(diagnostics, |sym| resolve_name(interner, sym));
}

/// Checks a procedure body's `RETURN` clause, if any, against its
/// declared return type: a function procedure must return a value
/// assignable to that type; a proper procedure must not return one.
fn check_return(
    body: &crate::ast::ProcedureBody,
    return_type: Option<QualIdent>,
    place: oberon_core::CodePlace,
    scope: &dyn Scope,
    interner: &RefCell<Interner>,
    diagnostics: &mut Diagnostics,
) {
    match (&body.return_expr, return_type) {
        (Some(return_expr), Some(declared)) => {
            let Some(actual) = expr::get_type(return_expr, scope, interner, diagnostics) else {
                return;
            };
            let expected = expr::resolve_return_type(declared, interner);
            let lookup = AsTypeLookup(scope);
            let assignable = super::types::types_equal(&expected, &actual)
                || matches!(expected.as_ref(), Type::Name(base) if super::types::type_extends_base(&actual, base, &lookup));
            if !assignable {
                diagnostics.error(return_expr.place(), "RETURN expression type does not match the procedure's declared return type");
            }
        }
        (Some(return_expr), None) => {
            diagnostics.error(return_expr.place(), "RETURN with a value is only allowed in a function procedure");
        }
        (None, Some(_)) => {
            diagnostics.error(place, "function procedure must RETURN a value");
        }
        (None, None) => {}
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod module_tests;
