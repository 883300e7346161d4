use super::*;
use oberon_core::PositionTable;

fn cursor(text: &str) -> Cursor<'_> {
    let mut table = PositionTable::new();
    let source = table.add_file("test.Mod", text);
    Cursor::new(source, text)
}

#[test]
fn peek_and_bump_advance_one_byte() {
    let mut c = cursor("ab");
    assert_eq!(c.peek(), Some(b'a'));
    assert_eq!(c.peek_at(1), Some(b'b'));
    assert_eq!(c.bump(), Some(b'a'));
    assert_eq!(c.peek(), Some(b'b'));
    assert_eq!(c.bump(), Some(b'b'));
    assert_eq!(c.bump(), None);
    assert!(c.is_at_end());
}

#[test]
fn move_to_rewinds_position() {
    let mut c = cursor("abc");
    c.bump();
    c.bump();
    let mark = c.place();
    c.bump();
    assert!(c.is_at_end());
    c.move_to(mark);
    assert_eq!(c.peek(), Some(b'c'));
}

#[test]
fn no_return_point_blocks_earlier_rewinds() {
    let mut c = cursor("abcd");
    c.bump();
    let before = c.place();
    c.bump();
    c.set_no_return_point();
    c.bump();
    assert!(!c.can_move_to(before));
    assert!(c.can_move_to(c.place()));
}

#[test]
fn record_expected_keeps_deepest_failure() {
    let mut c = cursor("abc");
    c.record_expected("digit");
    c.bump();
    c.record_expected("letter");
    assert_eq!(c.expected_slot().expected(), &["letter"]);
    assert_eq!(c.expected_slot().index(), 1);
}

#[test]
fn record_expected_accumulates_at_same_depth() {
    let mut c = cursor("abc");
    c.record_expected("digit");
    c.record_expected("letter");
    assert_eq!(c.expected_slot().expected(), &["digit", "letter"]);
}

#[test]
fn set_undroppable_error_upgrades_existing_slot() {
    let mut c = cursor("abc");
    c.record_expected("identifier");
    assert_eq!(c.expected_slot().kind(), ExpectedKind::Droppable);
    c.set_undroppable_error();
    assert_eq!(c.expected_slot().kind(), ExpectedKind::Undroppable);
    assert!(c.has_undroppable_error());
}
