//! Shared construction-time state for the grammar-building functions:
//! just the string interner, since every identifier the grammar matches
//! needs to go through it.

use std::cell::RefCell;
use std::rc::Rc;

use oberon_core::Interner;

#[derive(Clone)]
pub struct GrammarContext {
    pub interner: Rc<RefCell<Interner>>,
}

impl GrammarContext {
    pub fn new(interner: Rc<RefCell<Interner>>) -> Self {
        Self { interner }
    }
}
