use std::collections::HashMap;
use std::rc::Rc;

use oberon_core::{CodePlace, Interner, PositionTable, Symbol};

use super::*;
use crate::ast::{BuiltInType, FieldList, Identifier, IdentDef, ParamMode};

fn place() -> CodePlace {
    let mut table = PositionTable::new();
    let source = table.add_file("t.Mod", "");
    CodePlace::new(source, 0)
}

fn ident(interner: &mut Interner, name: &str) -> Identifier {
    Identifier::new(interner.intern(name), place())
}

fn qual(interner: &mut Interner, name: &str) -> QualIdent {
    QualIdent::simple(ident(interner, name))
}

struct TestLookup {
    types: HashMap<Symbol, Rc<Type>>,
    hierarchy: TypeHierarchy,
}

impl TypeLookup for TestLookup {
    fn lookup_type(&self, name: &QualIdent) -> Option<Rc<Type>> {
        self.types.get(&name.name.name).cloned()
    }

    fn type_extends(&self, sub: &QualIdent, base: &QualIdent) -> bool {
        self.hierarchy.extends(sub, base)
    }
}

#[test]
fn normalize_chases_name_chain() {
    let mut interner = Interner::new();
    let inner = Rc::new(Type::BuiltIn(BuiltInType::Integer, place()));
    let mut types = HashMap::new();
    let alias_a = qual(&mut interner, "A");
    let alias_b = qual(&mut interner, "B");
    types.insert(alias_a.name.name, Rc::new(Type::Name(alias_b)));
    types.insert(alias_b.name.name, Rc::clone(&inner));
    let lookup = TestLookup { types, hierarchy: TypeHierarchy::new() };

    let named = Rc::new(Type::Name(alias_a));
    let resolved = normalize(&named, &lookup, false);
    assert!(matches!(resolved.as_ref(), Type::BuiltIn(BuiltInType::Integer, _)));
}

#[test]
fn normalize_stops_at_pointer_unless_requested() {
    let mut interner = Interner::new();
    let record_name = qual(&mut interner, "Node");
    let record = Rc::new(Type::Record { base: None, fields: Vec::new(), place: place() });
    let mut types = HashMap::new();
    types.insert(record_name.name.name, Rc::clone(&record));
    let lookup = TestLookup { types, hierarchy: TypeHierarchy::new() };

    let pointer = Rc::new(Type::Pointer { referent: Rc::new(Type::Name(record_name)), place: place() });
    let stopped = normalize(&pointer, &lookup, false);
    match stopped.as_ref() {
        Type::Pointer { referent, .. } => assert!(matches!(referent.as_ref(), Type::Name(_))),
        other => panic!("expected pointer, got {other:?}"),
    }

    let crossed = normalize(&pointer, &lookup, true);
    match crossed.as_ref() {
        Type::Pointer { referent, .. } => assert!(matches!(referent.as_ref(), Type::Record { .. })),
        other => panic!("expected pointer, got {other:?}"),
    }
}

#[test]
fn record_equality_compares_base_and_fields() {
    let mut interner = Interner::new();
    let lookup = TestLookup { types: HashMap::new(), hierarchy: TypeHierarchy::new() };
    let int_ty = Rc::new(Type::BuiltIn(BuiltInType::Integer, place()));
    let field = |interner: &mut Interner, name: &str| FieldList {
        idents: vec![IdentDef::new(ident(interner, name), false)],
        ty: Rc::clone(&int_ty),
        place: place(),
    };
    let a = Type::Record { base: None, fields: vec![field(&mut interner, "x")], place: place() };
    let b = Type::Record { base: None, fields: vec![field(&mut interner, "x")], place: place() };
    let c = Type::Record { base: None, fields: vec![field(&mut interner, "y")], place: place() };
    assert!(types_equal(&a, &b));
    assert!(!types_equal(&a, &c));
    let _ = &lookup;
}

#[test]
fn array_equality_ignores_length_expressions_compares_rank() {
    let int_ty = Rc::new(Type::BuiltIn(BuiltInType::Integer, place()));
    let a = Type::Array { lengths: Vec::new(), element: Rc::clone(&int_ty), open: true, place: place() };
    let b = Type::Array { lengths: Vec::new(), element: Rc::clone(&int_ty), open: false, place: place() };
    assert!(types_equal(&a, &b));
}

#[test]
fn extension_is_reflexive_and_transitive() {
    let mut interner = Interner::new();
    let mut hierarchy = TypeHierarchy::new();
    let base = qual(&mut interner, "Base");
    let middle = qual(&mut interner, "Middle");
    let leaf = qual(&mut interner, "Leaf");
    hierarchy.record_extension(middle, base);
    hierarchy.record_extension(leaf, middle);

    assert!(hierarchy.extends(&base, &base));
    assert!(hierarchy.extends(&leaf, &base));
    assert!(!hierarchy.extends(&base, &leaf));
}

#[test]
fn find_field_walks_base_chain() {
    let mut interner = Interner::new();
    let int_ty = Rc::new(Type::BuiltIn(BuiltInType::Integer, place()));
    let base_name = qual(&mut interner, "Base");
    let base_record = Rc::new(Type::Record {
        base: None,
        fields: vec![FieldList {
            idents: vec![IdentDef::new(ident(&mut interner, "x"), false)],
            ty: Rc::clone(&int_ty),
            place: place(),
        }],
        place: place(),
    });
    let mut types = HashMap::new();
    types.insert(base_name.name.name, Rc::clone(&base_record));
    let lookup = TestLookup { types, hierarchy: TypeHierarchy::new() };

    let derived = Rc::new(Type::Record { base: Some(base_name), fields: Vec::new(), place: place() });
    let field_symbol = interner.intern("x");
    match find_field(&derived, field_symbol, &lookup) {
        FieldLookup::Found(ty) => assert!(matches!(ty.as_ref(), Type::BuiltIn(BuiltInType::Integer, _))),
        _ => panic!("expected field to resolve through base"),
    }

    let missing = interner.intern("z");
    assert!(matches!(find_field(&derived, missing, &lookup), FieldLookup::NoSuchField));
}

#[test]
fn drop_dimensions_errors_when_over_rank_else_slices() {
    let int_ty = Rc::new(Type::BuiltIn(BuiltInType::Integer, place()));
    let lengths: Vec<Rc<crate::ast::Expression>> =
        vec![Rc::new(crate::ast::Expression::Number(crate::ast::NumberLit::Int(3), place())); 2];
    let array = Rc::new(Type::Array { lengths, element: Rc::clone(&int_ty), open: false, place: place() });
    let lookup = TestLookup { types: HashMap::new(), hierarchy: TypeHierarchy::new() };

    match drop_dimensions(&array, 1, &lookup) {
        Ok(remaining) => assert!(matches!(remaining.as_ref(), Type::Array { .. })),
        Err(_) => panic!("dropping one of two dimensions should succeed"),
    }
    match drop_dimensions(&array, 2, &lookup) {
        Ok(elem) => assert!(matches!(elem.as_ref(), Type::BuiltIn(BuiltInType::Integer, _))),
        Err(_) => panic!("dropping exactly the rank should yield the element type"),
    }
    assert!(matches!(drop_dimensions(&array, 3, &lookup), Err(DropError::TooManyDimensions)));
    assert!(matches!(drop_dimensions(&int_ty, 1, &lookup), Err(DropError::NotAnArray)));
}

#[test]
fn param_mode_distinguishes_value_and_var() {
    assert_ne!(ParamMode::Value, ParamMode::Var);
}
