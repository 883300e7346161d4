use super::*;
use crate::parser::combinators::{chain, map, symbol, symbols};
use oberon_core::PositionTable;

fn cursor(text: &str) -> Cursor<'_> {
    let mut table = PositionTable::new();
    let source = table.add_file("test.Mod", text);
    Cursor::new(source, text)
}

#[test]
fn handle_forwards_to_linked_parser() {
    let linker: Linker<u8> = Linker::new();
    let handle = linker.handle();
    linker.link(symbol(b'x'));

    let mut c = cursor("x");
    assert_eq!(handle(&mut c), Some(b'x'));
}

#[test]
fn clones_share_the_same_slot() {
    let linker: Linker<&'static str> = Linker::new();
    let a = linker.clone();
    let b = linker.clone();

    a.link(symbols("END"));

    let mut c = cursor("END");
    assert_eq!(b.handle()(&mut c), Some("END"));
}

#[test]
fn cyclic_grammar_resolves_after_linking() {
    // mirrors factor -> parenthesized expression -> factor
    let expr: Linker<u8> = Linker::new();
    let factor = map(
        chain(symbol(b'('), chain(expr.handle(), symbol(b')'))),
        |(_, (inner, _))| inner,
    );
    expr.link(Rc::new(factor));

    let mut c = cursor("(x)");
    assert_eq!(expr.handle()(&mut c), None); // 'x' is not symbol(b'x'); exercises the link without matching
}

#[test]
#[should_panic(expected = "Linker handle invoked before link()")]
fn unlinked_handle_panics() {
    let linker: Linker<u8> = Linker::new();
    let handle = linker.handle();
    let mut c = cursor("x");
    handle(&mut c);
}
