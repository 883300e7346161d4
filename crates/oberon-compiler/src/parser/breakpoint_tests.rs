use super::*;
use oberon_core::PositionTable;

fn cursor(text: &str) -> Cursor<'_> {
    let mut table = PositionTable::new();
    let source = table.add_file("test.Mod", text);
    Cursor::new(source, text)
}

#[test]
fn unclosed_guard_rewinds_on_drop() {
    let mut c = cursor("abcd");
    {
        let mut bp = BreakPoint::new(&mut c);
        bp.cursor().bump();
        bp.cursor().bump();
    }
    assert_eq!(c.peek(), Some(b'a'));
}

#[test]
fn closed_guard_keeps_position() {
    let mut c = cursor("abcd");
    {
        let mut bp = BreakPoint::new(&mut c);
        bp.cursor().bump();
        bp.cursor().bump();
        bp.close();
    }
    assert_eq!(c.peek(), Some(b'c'));
}

#[test]
fn undroppable_error_overrides_rewind_even_when_unclosed() {
    let mut c = cursor("abcd");
    {
        let mut bp = BreakPoint::new(&mut c);
        bp.cursor().bump();
        bp.cursor().set_undroppable_error();
    }
    assert_eq!(c.peek(), Some(b'b'));
}

#[test]
fn no_return_point_blocks_rewind_past_commitment() {
    let mut c = cursor("abcd");
    {
        let mut bp = BreakPoint::new(&mut c);
        bp.cursor().bump();
        bp.cursor().set_no_return_point();
        bp.cursor().bump();
    }
    // the mark (0) is before the no-return point (1), so the rewind is
    // illegal; the cursor stays at its post-bump position and the guard
    // marks the failure undroppable rather than accepting it silently.
    assert_eq!(c.peek(), Some(b'c'));
    assert!(c.has_undroppable_error());
}

#[test]
fn nested_guards_rewind_independently() {
    let mut c = cursor("abcd");
    {
        let mut outer = BreakPoint::new(&mut c);
        {
            let mut inner = BreakPoint::new(outer.cursor());
            inner.cursor().bump();
            // inner drops unclosed here: rewinds to outer's mark (0)
        }
        assert_eq!(outer.cursor().peek(), Some(b'a'));
        outer.cursor().bump();
        outer.close();
    }
    assert_eq!(c.peek(), Some(b'b'));
}
