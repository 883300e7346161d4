//! Handle-and-link indirection for mutually recursive grammar rules.
//!
//! Oberon's expression grammar is cyclic (an expression contains terms,
//! terms contain factors, factors contain designators, designators contain
//! expressions again for array indices), so some rule has to be built
//! before the rule it calls exists yet. A [`Linker`] is an empty slot a
//! combinator can close over immediately; [`Linker::link`] fills the slot
//! once the real parser is built, and every handle created before that
//! point starts working from then on.

use std::cell::RefCell;
use std::rc::Rc;

use super::combinators::Parser;
use super::cursor::Cursor;

/// An unlinked (or since-linked) reference to a parser of type `T`.
///
/// Cloning a `Linker` shares the same underlying slot — all clones observe
/// the same link once `link` is called on any of them.
pub struct Linker<T> {
    slot: Rc<RefCell<Option<Parser<T>>>>,
}

impl<T> Clone for Linker<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: 'static> Linker<T> {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Fill the slot with the real parser. Calling this a second time
    /// replaces the previous parser; grammar construction only ever calls
    /// it once per rule, but nothing here enforces that.
    pub fn link(&self, parser: Parser<T>) {
        *self.slot.borrow_mut() = Some(parser);
    }

    /// A parser that forwards to whatever this linker is bound to.
    ///
    /// # Panics
    /// Panics if called before [`Linker::link`] — using an unlinked handle
    /// is a grammar construction bug, not a recoverable parse failure.
    pub fn handle(&self) -> Parser<T> {
        let slot = Rc::clone(&self.slot);
        Rc::new(move |cursor: &mut Cursor| -> Option<T> {
            let parser = slot
                .borrow()
                .clone()
                .expect("Linker handle invoked before link()");
            parser(cursor)
        })
    }
}

impl<T: 'static> Default for Linker<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod link_tests;
