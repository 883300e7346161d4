//! RAII guard for speculative parsing: save a cursor position on creation,
//! then on drop either rewind to it (the attempt failed and may be retried
//! elsewhere) or leave the cursor where it is (the attempt succeeded, or a
//! no-return point makes rewinding illegal).

use super::cursor::Cursor;

/// Marks a point the cursor can speculatively return to.
///
/// Holds the cursor mutably for its whole lifetime, so only one guard can
/// be open on a given cursor at a time — which matches the combinator
/// discipline of "try one alternative fully before trying the next".
///
/// Call [`BreakPoint::close`] when the speculative attempt succeeds, so
/// `Drop` leaves the cursor at its current position instead of rewinding.
/// Dropping without calling `close` rewinds the cursor back to where the
/// guard was created, unless rewinding there is no longer legal.
pub struct BreakPoint<'c, 'src> {
    cursor: &'c mut Cursor<'src>,
    mark: u32,
    closed: bool,
}

impl<'c, 'src> BreakPoint<'c, 'src> {
    pub fn new(cursor: &'c mut Cursor<'src>) -> Self {
        let mark = cursor.raw_pos();
        Self {
            cursor,
            mark,
            closed: false,
        }
    }

    /// Keep whatever position the cursor is at when this guard drops,
    /// instead of rewinding to the mark.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// The wrapped cursor, for the speculative attempt to drive.
    pub fn cursor(&mut self) -> &mut Cursor<'src> {
        self.cursor
    }

    pub fn mark(&self) -> u32 {
        self.mark
    }
}

impl Drop for BreakPoint<'_, '_> {
    /// Precedence, in order:
    ///
    /// 1. An undroppable error already on the cursor always wins: the
    ///    guard never rewinds over a fatal failure, closed or not.
    /// 2. A closed guard otherwise leaves the cursor exactly where it is.
    /// 3. Otherwise, rewind to the mark if the no-return point still
    ///    permits it. If a later `no_return` moved past the mark, the
    ///    rewind is illegal: the guard's failure is past a committed
    ///    point, so it marks the cursor undroppable instead of silently
    ///    accepting whatever partial progress is there.
    fn drop(&mut self) {
        if self.cursor.has_undroppable_error() {
            return;
        }
        if self.closed {
            return;
        }
        if self.cursor.can_move_to_raw(self.mark) {
            self.cursor.move_to_raw(self.mark);
        } else {
            self.cursor.set_undroppable_error();
        }
    }
}

#[cfg(test)]
#[path = "breakpoint_tests.rs"]
mod breakpoint_tests;
