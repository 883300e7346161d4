use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use oberon_core::{Interner, PositionTable};

use crate::ast::Section;
use crate::diagnostics::Diagnostics;
use crate::grammar::build_parser;
use crate::parser::Cursor;
use crate::sema::module::declare_module;

fn analyze(text: &str) -> Diagnostics {
    let interner = Rc::new(RefCell::new(Interner::new()));
    let mut table = PositionTable::new();
    let source = table.add_file("test.Mod", text);
    let mut cursor = Cursor::new(source, text);
    let parse = build_parser(Rc::clone(&interner));
    let section: Section = parse(&mut cursor).expect("test module must parse");
    let mut diagnostics = Diagnostics::new();
    declare_module(&section, IndexMap::new(), &interner, &mut diagnostics);
    diagnostics
}

#[test]
fn if_condition_must_be_boolean() {
    let diagnostics = analyze("MODULE M; VAR x: INTEGER; BEGIN IF x THEN x := 1 END END M.");
    assert!(diagnostics.has_errors());
}

#[test]
fn if_condition_boolean_is_accepted() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR x: INTEGER; b: BOOLEAN;\n\
         BEGIN IF b THEN x := 1 ELSIF ~b THEN x := 2 ELSE x := 3 END\n\
         END M.",
    );
    assert!(!diagnostics.has_errors(), "{diagnostics:?}");
}

#[test]
fn assignment_to_a_const_is_an_error() {
    let diagnostics = analyze("MODULE M; CONST Max = 10; BEGIN Max := 1 END M.");
    assert!(diagnostics.has_errors());
}

#[test]
fn assignment_to_a_procedure_name_is_an_error() {
    let diagnostics = analyze("MODULE M; PROCEDURE P; BEGIN END P; BEGIN P := 1 END M.");
    assert!(diagnostics.has_errors());
}

#[test]
fn while_condition_must_be_boolean() {
    let diagnostics = analyze("MODULE M; VAR x: INTEGER; BEGIN WHILE x DO x := x - 1 END END M.");
    assert!(diagnostics.has_errors());
}

#[test]
fn repeat_condition_must_be_boolean() {
    let diagnostics = analyze("MODULE M; VAR x: INTEGER; BEGIN REPEAT x := x - 1 UNTIL x END M.");
    assert!(diagnostics.has_errors());
}

#[test]
fn for_loop_over_integer_bounds_is_accepted() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR i, total: INTEGER;\n\
         BEGIN FOR i := 0 TO 9 DO total := total + i END\n\
         END M.",
    );
    assert!(!diagnostics.has_errors(), "{diagnostics:?}");
}

#[test]
fn for_loop_with_zero_step_is_an_error() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR i: INTEGER;\n\
         BEGIN FOR i := 0 TO 9 BY 0 DO i := i END\n\
         END M.",
    );
    assert!(diagnostics.has_errors());
}

#[test]
fn for_loop_over_boolean_variable_is_an_error() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR b: BOOLEAN;\n\
         BEGIN FOR b := 0 TO 9 DO END\n\
         END M.",
    );
    assert!(diagnostics.has_errors());
}

#[test]
fn case_selector_must_be_integer_or_char() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR b: BOOLEAN; x: INTEGER;\n\
         BEGIN CASE b OF 0: x := 1 | 1: x := 2 END\n\
         END M.",
    );
    assert!(diagnostics.has_errors());
}

#[test]
fn case_with_non_overlapping_labels_has_no_warning() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR x, y: INTEGER;\n\
         BEGIN CASE x OF 0: y := 1 | 1..3: y := 2 | 4: y := 3 END\n\
         END M.",
    );
    assert!(!diagnostics.has_errors(), "{diagnostics:?}");
    assert!(!diagnostics.has_warnings(), "{diagnostics:?}");
}

#[test]
fn case_with_overlapping_labels_warns() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR x, y: INTEGER;\n\
         BEGIN CASE x OF 0..5: y := 1 | 3: y := 2 END\n\
         END M.",
    );
    assert!(!diagnostics.has_errors(), "{diagnostics:?}");
    assert!(diagnostics.has_warnings());
}

#[test]
fn case_label_range_with_lower_exceeding_upper_is_an_error() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR x, y: INTEGER;\n\
         BEGIN CASE x OF 5..1: y := 1 END\n\
         END M.",
    );
    assert!(diagnostics.has_errors());
}

#[test]
fn assignment_of_nil_to_pointer_is_accepted() {
    let diagnostics = analyze(
        "MODULE M;\n\
         TYPE Node = RECORD END;\n\
         VAR p: POINTER TO Node;\n\
         BEGIN p := NIL\n\
         END M.",
    );
    assert!(!diagnostics.has_errors(), "{diagnostics:?}");
}

#[test]
fn assignment_of_mismatched_types_is_an_error() {
    let diagnostics = analyze(
        "MODULE M;\n\
         VAR x: INTEGER; b: BOOLEAN;\n\
         BEGIN x := b\n\
         END M.",
    );
    assert!(diagnostics.has_errors());
}

#[test]
fn plain_assignment_between_distinct_pointer_types_is_an_error() {
    // Assignment requires exact type equality plus the `NIL` special
    // case; the pointer-extension leniency below is specific to call
    // arguments, not ordinary assignment.
    let diagnostics = analyze(
        "MODULE M;\n\
         TYPE\n\
         Base = RECORD END;\n\
         Derived = RECORD (Base) END;\n\
         VAR b: POINTER TO Base; d: POINTER TO Derived;\n\
         BEGIN b := d\n\
         END M.",
    );
    assert!(diagnostics.has_errors());
}

#[test]
fn extended_record_pointer_is_accepted_as_call_argument() {
    let diagnostics = analyze(
        "MODULE M;\n\
         TYPE\n\
         Base = RECORD END;\n\
         Derived = RECORD (Base) END;\n\
         PROCEDURE Use(b: POINTER TO Base);\n\
         BEGIN END Use;\n\
         VAR d: POINTER TO Derived;\n\
         BEGIN Use(d)\n\
         END M.",
    );
    assert!(!diagnostics.has_errors(), "{diagnostics:?}");
}
