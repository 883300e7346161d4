use std::rc::Rc;

use oberon_core::{CodePlace, Interner, PositionTable};

use super::*;
use crate::ast::{BuiltInType, FormalSection, Identifier, IdentDef, ParamMode, QualIdent, Type};

struct EmptyLookup;

impl TypeLookup for EmptyLookup {
    fn lookup_type(&self, _name: &QualIdent) -> Option<Rc<Type>> {
        None
    }

    fn type_extends(&self, _sub: &QualIdent, _base: &QualIdent) -> bool {
        false
    }
}

fn place() -> CodePlace {
    let mut table = PositionTable::new();
    let source = table.add_file("t.Mod", "");
    CodePlace::new(source, 0)
}

fn ident(interner: &mut Interner, name: &str) -> Identifier {
    Identifier::new(interner.intern(name), place())
}

fn int_type() -> Rc<Type> {
    Rc::new(Type::BuiltIn(BuiltInType::Integer, place()))
}

fn common_type() -> Rc<Type> {
    Rc::new(Type::BuiltIn(BuiltInType::Common, place()))
}

fn decl(interner: &mut Interner, name: &str, params: Vec<FormalSection>, has_body: bool) -> ProcedureDeclaration {
    let id = ident(interner, name);
    ProcedureDeclaration {
        ident: IdentDef::new(id, false),
        params,
        return_type: None,
        body: if has_body {
            Some(crate::ast::ProcedureBody { decls: Default::default(), statements: Vec::new(), return_expr: None })
        } else {
            None
        },
        end_ident: id,
        place: place(),
    }
}

fn section(mode: ParamMode, ty: Rc<Type>) -> FormalSection {
    FormalSection { mode, idents: Vec::new(), ty, place: place() }
}

#[test]
fn first_sighting_without_common_param_is_simple() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let d = decl(&mut interner, "P", vec![section(ParamMode::Value, int_type())], true);
    let table = classify(None, d, &lookup).unwrap();
    assert!(matches!(table, ProcedureTable::Simple(_)));
}

#[test]
fn headerless_common_param_declaration_becomes_base() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let d = decl(&mut interner, "P", vec![section(ParamMode::Value, common_type())], false);
    let table = classify(None, d, &lookup).unwrap();
    match table {
        ProcedureTable::MultimethodBase { instances, .. } => assert!(instances.is_empty()),
        _ => panic!("expected a multimethod base"),
    }
}

#[test]
fn compatible_instance_is_accepted_against_base() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let base_decl = decl(&mut interner, "P", vec![section(ParamMode::Value, common_type())], false);
    let base_table = classify(None, base_decl, &lookup).unwrap();

    let instance_decl = decl(&mut interner, "P", vec![section(ParamMode::Value, int_type())], true);
    let classified = classify(Some(&base_table), instance_decl, &lookup).unwrap();
    assert!(matches!(classified, ProcedureTable::MultimethodInstance(_)));
}

#[test]
fn instance_with_mismatched_mode_is_rejected() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let base_decl = decl(&mut interner, "P", vec![section(ParamMode::Value, common_type())], false);
    let base_table = classify(None, base_decl, &lookup).unwrap();

    let instance_decl = decl(&mut interner, "P", vec![section(ParamMode::Var, int_type())], true);
    let err = classify(Some(&base_table), instance_decl, &lookup).unwrap_err();
    assert!(matches!(err, OverloadError::IncompatibleInstance));
}

#[test]
fn instance_without_body_is_rejected() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let base_decl = decl(&mut interner, "P", vec![section(ParamMode::Value, common_type())], false);
    let base_table = classify(None, base_decl, &lookup).unwrap();

    let instance_decl = decl(&mut interner, "P", vec![section(ParamMode::Value, int_type())], false);
    let err = classify(Some(&base_table), instance_decl, &lookup).unwrap_err();
    assert!(matches!(err, OverloadError::IncompatibleInstance));
}

#[test]
fn overloading_a_simple_table_is_rejected() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let first = decl(&mut interner, "P", Vec::new(), true);
    let simple_table = classify(None, first, &lookup).unwrap();

    let second = decl(&mut interner, "P", Vec::new(), true);
    let err = classify(Some(&simple_table), second, &lookup).unwrap_err();
    assert!(matches!(err, OverloadError::CannotOverloadSimple));
}

#[test]
fn add_instance_appends_to_base() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let base_decl = decl(&mut interner, "P", vec![section(ParamMode::Value, common_type())], false);
    let mut base_table = classify(None, base_decl, &lookup).unwrap();

    let instance_decl = decl(&mut interner, "P", vec![section(ParamMode::Value, int_type())], true);
    let classified = classify(Some(&base_table), instance_decl, &lookup).unwrap();
    let ProcedureTable::MultimethodInstance(instance) = classified else {
        panic!("expected a multimethod instance");
    };
    add_instance(&mut base_table, instance);

    match base_table {
        ProcedureTable::MultimethodBase { instances, .. } => assert_eq!(instances.len(), 1),
        _ => panic!("expected a multimethod base"),
    }
}

#[test]
#[should_panic]
fn add_instance_panics_against_simple_table() {
    let mut interner = Interner::new();
    let lookup = EmptyLookup;
    let first = decl(&mut interner, "P", Vec::new(), true);
    let mut simple_table = classify(None, first, &lookup).unwrap();
    let bogus = ProcedureScope::new(decl(&mut interner, "Q", Vec::new(), true));
    add_instance(&mut simple_table, bogus);
}
