use std::rc::Rc;

use oberon_core::{CodePlace, Interner, PositionTable};

use super::*;
use crate::ast::BuiltInType;

fn place() -> CodePlace {
    let mut table = PositionTable::new();
    let source = table.add_file("t.Mod", "");
    CodePlace::new(source, 0)
}

fn int_type() -> Rc<Type> {
    Rc::new(Type::BuiltIn(BuiltInType::Integer, place()))
}

#[test]
fn insert_and_lookup_symbol_round_trips() {
    let mut interner = Interner::new();
    let name = interner.intern("x");
    let mut container = SymbolContainer::new();
    container.insert_symbol(SymbolToken::new(name, SymbolGroup::Var, int_type(), place())).unwrap();

    assert!(container.contains(name));
    let token = container.get_symbol_secretly(name).unwrap();
    assert_eq!(token.use_count, 0);
}

#[test]
fn get_symbol_increments_use_count_but_secretly_does_not() {
    let mut interner = Interner::new();
    let name = interner.intern("x");
    let mut container = SymbolContainer::new();
    container.insert_symbol(SymbolToken::new(name, SymbolGroup::Var, int_type(), place())).unwrap();

    container.get_symbol_secretly(name);
    assert_eq!(container.get_symbol_secretly(name).unwrap().use_count, 0);

    container.get_symbol(name);
    container.get_symbol(name);
    assert_eq!(container.get_symbol_secretly(name).unwrap().use_count, 2);
}

#[test]
fn redefinition_across_any_of_the_three_maps_is_rejected() {
    let mut interner = Interner::new();
    let name = interner.intern("x");
    let mut container = SymbolContainer::new();
    container.insert_symbol(SymbolToken::new(name, SymbolGroup::Var, int_type(), place())).unwrap();

    let err = container.insert_value(name, ConstValue { expr: dummy_expr(), ty: int_type() }).unwrap_err();
    assert!(matches!(err, InsertError::Redefinition(_)));

    let err = container.insert_table(name, crate::sema::procs::ProcedureTable::Simple(dummy_proc_scope(&mut interner))).unwrap_err();
    assert!(matches!(err, InsertError::Redefinition(_)));
}

#[test]
fn report_unused_emits_w1_only_for_zero_use_symbols() {
    let mut interner = Interner::new();
    let used = interner.intern("used");
    let unused = interner.intern("unused");
    let mut container = SymbolContainer::new();
    container.insert_symbol(SymbolToken::new(used, SymbolGroup::Var, int_type(), place())).unwrap();
    container.insert_symbol(SymbolToken::new(unused, SymbolGroup::Var, int_type(), place())).unwrap();
    container.get_symbol(used);

    let mut diagnostics = Diagnostics::new();
    container.report_unused(&mut diagnostics, |sym| interner.resolve(sym).to_string());

    assert_eq!(diagnostics.warning_count(), 1);
}

#[test]
fn len_counts_across_all_three_maps() {
    let mut interner = Interner::new();
    let mut container = SymbolContainer::new();
    assert!(container.is_empty());

    let a = interner.intern("a");
    let b = interner.intern("b");
    container.insert_symbol(SymbolToken::new(a, SymbolGroup::Var, int_type(), place())).unwrap();
    container.insert_value(b, ConstValue { expr: dummy_expr(), ty: int_type() }).unwrap();
    assert_eq!(container.len(), 2);
}

fn dummy_expr() -> Rc<Expression> {
    Rc::new(Expression::Nil(place()))
}

fn dummy_proc_scope(interner: &mut Interner) -> crate::sema::procs::ProcedureScope {
    use crate::ast::{Identifier, IdentDef, ProcedureDeclaration};
    let name = interner.intern("P");
    let id = Identifier::new(name, place());
    crate::sema::procs::ProcedureScope::new(ProcedureDeclaration {
        ident: IdentDef::new(id, false),
        params: Vec::new(),
        return_type: None,
        body: None,
        end_ident: id,
        place: place(),
    })
}
