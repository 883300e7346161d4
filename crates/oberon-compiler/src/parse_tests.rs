use std::cell::RefCell;
use std::rc::Rc;

use oberon_core::{Interner, PositionTable};

use super::parse_source;

#[test]
fn well_formed_module_parses() {
    let interner = Rc::new(RefCell::new(Interner::new()));
    let mut positions = PositionTable::new();
    let source = positions.add_file("test.Mod", "MODULE M; VAR x: INTEGER; BEGIN x := 1 END M.");
    let result = parse_source(source, &positions, interner);
    assert!(result.is_ok());
}

#[test]
fn missing_end_identifier_is_a_rendered_parse_error() {
    let interner = Rc::new(RefCell::new(Interner::new()));
    let mut positions = PositionTable::new();
    let source = positions.add_file("test.Mod", "MODULE M; VAR x: INTEGER; BEGIN x := 1 END N.");
    let err = parse_source(source, &positions, interner).expect_err("end identifier mismatch must fail");
    assert!(err.is_parse_error());
}

#[test]
fn truncated_module_reports_end_of_input() {
    let interner = Rc::new(RefCell::new(Interner::new()));
    let mut positions = PositionTable::new();
    let source = positions.add_file("test.Mod", "MODULE M; VAR x: INTEGER; BEGIN x := 1");
    let err = parse_source(source, &positions, interner).expect_err("truncated module must fail");
    assert!(err.is_parse_error());
    assert_eq!(err.message, "end of input");
}
