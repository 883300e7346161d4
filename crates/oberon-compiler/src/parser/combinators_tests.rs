use super::*;
use oberon_core::PositionTable;

fn cursor(text: &str) -> Cursor<'_> {
    let mut table = PositionTable::new();
    let source = table.add_file("test.Mod", text);
    Cursor::new(source, text)
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[test]
fn symbol_matches_and_consumes() {
    let mut c = cursor("x");
    let p = symbol(b'x');
    assert_eq!(p(&mut c), Some(b'x'));
    assert!(c.is_at_end());
}

#[test]
fn symbol_fails_without_consuming() {
    let mut c = cursor("y");
    let p = symbol(b'x');
    assert_eq!(p(&mut c), None);
    assert_eq!(c.peek(), Some(b'y'));
}

#[test]
fn symbols_matches_keyword() {
    let mut c = cursor("MODULE x");
    let p = symbols("MODULE");
    assert_eq!(p(&mut c), Some("MODULE"));
    assert_eq!(c.peek(), Some(b' '));
}

#[test]
fn many_collects_zero_or_more_without_consuming_the_rest() {
    let mut c = cursor("111a");
    let p = many(predicate("digit", is_digit));
    let result = p(&mut c).unwrap();
    assert_eq!(result, vec![b'1', b'1', b'1']);
    assert_eq!(c.peek(), Some(b'a'));
}

#[test]
fn some_requires_at_least_one() {
    let mut c = cursor("abc");
    let p = some(predicate("digit", is_digit));
    assert_eq!(p(&mut c), None);
    assert_eq!(c.peek(), Some(b'a'));
}

#[test]
fn chain_rewinds_fully_on_second_failure() {
    let mut c = cursor("ab");
    let p = chain(symbol(b'a'), symbol(b'z'));
    assert_eq!(p(&mut c), None);
    assert_eq!(c.peek(), Some(b'a'));
}

#[test]
fn any_of_tries_alternatives_in_order() {
    let mut c = cursor("BEGIN");
    let p = any_of(vec![symbols("IF"), symbols("BEGIN"), symbols("END")]);
    assert_eq!(p(&mut c), Some("BEGIN"));
}

#[test]
fn maybe_never_fails() {
    let mut c = cursor("x");
    let p = maybe(symbol(b'z'));
    assert_eq!(p(&mut c), Some(None));
    assert_eq!(c.peek(), Some(b'x'));
}

#[test]
fn option_falls_back_to_default() {
    let mut c = cursor("x");
    let p = option(symbol(b'z'), b'-');
    assert_eq!(p(&mut c), Some(b'-'));
}

#[test]
fn delim_sequence_parses_comma_separated_idents() {
    let mut c = cursor("a,b,c ");
    let p = delim_sequence(predicate("letter", |b| b.is_ascii_alphabetic()), symbol(b','));
    assert_eq!(p(&mut c), Some(vec![b'a', b'b', b'c']));
    assert_eq!(c.peek(), Some(b' '));
}

#[test]
fn delim_sequence_trailing_accepts_final_delimiter() {
    let mut c = cursor("a;b; ");
    let p = delim_sequence_trailing(predicate("letter", |b| b.is_ascii_alphabetic()), symbol(b';'));
    assert_eq!(p(&mut c), Some(vec![b'a', b'b']));
    assert_eq!(c.peek(), Some(b' '));
}

#[test]
fn no_return_makes_subsequent_failure_fatal() {
    let mut c = cursor("IF x");
    let p = chain(symbols("IF"), no_return(symbols("THEN")));
    assert_eq!(p(&mut c), None);
    // `THEN` never matched, so nothing committed: the no-return point is
    // untouched, but the failure is still marked undroppable, which is
    // what actually keeps an enclosing guard from rewinding over it.
    assert!(c.has_undroppable_error());
    assert!(c.can_move_to(oberon_core::CodePlace::new(c.source(), 0)));
}

#[test]
fn no_return_commits_to_the_position_after_success() {
    let mut c = cursor("THENx");
    let p = no_return(symbols("THEN"));
    assert_eq!(p(&mut c), Some("THEN"));
    assert!(!c.has_undroppable_error());
    assert!(!c.can_move_to(oberon_core::CodePlace::new(c.source(), 0)));
    assert!(c.can_move_to(oberon_core::CodePlace::new(c.source(), 4)));
}

#[test]
fn except_blocks_the_base_when_lookahead_matches() {
    let mut c = cursor("END");
    let p = except(predicate("letter", |b| b.is_ascii_alphabetic()), symbols("END"));
    assert_eq!(p(&mut c), None);
}

#[test]
fn not_from_excludes_listed_bytes() {
    let mut c = cursor("\"quote");
    let p = not_from("string char", b"\"\n");
    assert_eq!(p(&mut c), None);
    let mut c2 = cursor("q");
    assert_eq!(p(&mut c2), Some(b'q'));
}
