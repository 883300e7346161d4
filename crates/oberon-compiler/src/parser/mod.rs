//! Hand-rolled parser combinator runtime: a byte cursor with backtracking
//! and a commitment mechanism ([`cursor`]), a scope guard that implements
//! backtracking on top of it ([`breakpoint`]), the combinator algebra
//! grammar rules are built from ([`combinators`]), and the handle-and-link
//! indirection that lets rules refer to each other cyclically ([`link`]).

pub mod breakpoint;
pub mod combinators;
pub mod cursor;
pub mod link;

pub use breakpoint::BreakPoint;
pub use combinators::{
    any_of, chain, count, delim_sequence, delim_sequence_trailing, except, many, map, maybe, no_return, not_from,
    option, parser, predicate, seq2, seq3, seq4, seq5, some, symbol, symbols, try_map, Parser,
};
pub use cursor::{Cursor, ExpectedKind, ExpectedSlot};
pub use link::Linker;
