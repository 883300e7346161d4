//! The combinator algebra the grammar is built from.
//!
//! A [`Parser<T>`] is a shared, clonable function from a [`Cursor`] to
//! `Option<T>`: `None` is a parse failure, and every combinator here
//! restores the cursor's position on failure unless a [`no_return`] point
//! has already been crossed (in which case failure is fatal and the
//! cursor is left wherever it stopped, for diagnostics to point at).

use std::rc::Rc;

use super::breakpoint::BreakPoint;
use super::cursor::Cursor;

/// A parse rule: cheap to clone (an `Rc`), callable any number of times,
/// and usable from either side of a [`super::link::Linker`] cycle.
pub type Parser<T> = Rc<dyn for<'c, 'src> Fn(&'c mut Cursor<'src>) -> Option<T>>;

/// Lift a plain function into a [`Parser`].
pub fn parser<T: 'static>(f: impl for<'c, 'src> Fn(&'c mut Cursor<'src>) -> Option<T> + 'static) -> Parser<T> {
    Rc::new(f)
}

/// Match a single byte equal to `b`.
pub fn symbol(b: u8) -> Parser<u8> {
    parser(move |cursor| {
        if cursor.peek() == Some(b) {
            cursor.bump();
            Some(b)
        } else {
            None
        }
    })
}

/// Match the exact literal byte string `lit` (used for keywords and
/// multi-character operators).
pub fn symbols(lit: &'static str) -> Parser<&'static str> {
    parser(move |cursor| {
        let bytes = lit.as_bytes();
        if cursor.peek_slice(bytes.len()) == Some(bytes) {
            for _ in 0..bytes.len() {
                cursor.bump();
            }
            Some(lit)
        } else {
            None
        }
    })
}

/// Match a single byte satisfying `f`, recording `name` as the expected
/// token class on failure.
pub fn predicate(name: &'static str, f: fn(u8) -> bool) -> Parser<u8> {
    parser(move |cursor| match cursor.peek() {
        Some(b) if f(b) => {
            cursor.bump();
            Some(b)
        }
        _ => {
            cursor.record_expected(name);
            None
        }
    })
}

/// Match a byte that is none of `excluded`.
pub fn not_from(name: &'static str, excluded: &'static [u8]) -> Parser<u8> {
    parser(move |cursor| match cursor.peek() {
        Some(b) if !excluded.contains(&b) => {
            cursor.bump();
            Some(b)
        }
        _ => {
            cursor.record_expected(name);
            None
        }
    })
}

/// Match `base` provided `excluded` does not also match at this position
/// (negative lookahead). `excluded` never consumes input either way.
pub fn except<T: 'static, U: 'static>(base: Parser<T>, excluded: Parser<U>) -> Parser<T> {
    parser(move |cursor| {
        let lookahead_matches = {
            let mut bp = BreakPoint::new(cursor);
            excluded(bp.cursor()).is_some()
        };
        if lookahead_matches {
            None
        } else {
            base(cursor)
        }
    })
}

/// Zero or more repetitions. Stops (without consuming) at the first
/// position the inner parser fails to match, unless that failure is fatal.
pub fn many<T: 'static>(inner: Parser<T>) -> Parser<Vec<T>> {
    parser(move |cursor| {
        let mut out = Vec::new();
        loop {
            if cursor.has_undroppable_error() {
                return None;
            }
            let mut bp = BreakPoint::new(cursor);
            match inner(bp.cursor()) {
                Some(value) => {
                    bp.close();
                    out.push(value);
                }
                None => break,
            }
        }
        Some(out)
    })
}

/// One or more repetitions: `many` that additionally requires a first hit.
pub fn some<T: 'static>(inner: Parser<T>) -> Parser<Vec<T>> {
    let many_inner = many(Rc::clone(&inner));
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let first = inner(bp.cursor())?;
        bp.close();
        drop(bp);
        let mut rest = many_inner(cursor)?;
        rest.insert(0, first);
        Some(rest)
    })
}

/// Count how many times `inner` matches in a row, without keeping the
/// matched values (used for lookahead-style lexical checks, e.g. "is this
/// run of digits followed by a radix letter").
pub fn count<T: 'static>(inner: Parser<T>) -> Parser<usize> {
    let many_inner = many(inner);
    parser(move |cursor| many_inner(cursor).map(|v| v.len()))
}

/// Sequence two parsers, yielding both results. Rewinds fully on failure
/// of either, unless a no-return point makes that illegal.
pub fn chain<A: 'static, B: 'static>(a: Parser<A>, b: Parser<B>) -> Parser<(A, B)> {
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let va = a(bp.cursor())?;
        let vb = b(bp.cursor())?;
        bp.close();
        Some((va, vb))
    })
}

pub fn seq2<A: 'static, B: 'static>(a: Parser<A>, b: Parser<B>) -> Parser<(A, B)> {
    chain(a, b)
}

pub fn seq3<A: 'static, B: 'static, C: 'static>(a: Parser<A>, b: Parser<B>, c: Parser<C>) -> Parser<(A, B, C)> {
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let va = a(bp.cursor())?;
        let vb = b(bp.cursor())?;
        let vc = c(bp.cursor())?;
        bp.close();
        Some((va, vb, vc))
    })
}

pub fn seq4<A: 'static, B: 'static, C: 'static, D: 'static>(
    a: Parser<A>,
    b: Parser<B>,
    c: Parser<C>,
    d: Parser<D>,
) -> Parser<(A, B, C, D)> {
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let va = a(bp.cursor())?;
        let vb = b(bp.cursor())?;
        let vc = c(bp.cursor())?;
        let vd = d(bp.cursor())?;
        bp.close();
        Some((va, vb, vc, vd))
    })
}

pub fn seq5<A: 'static, B: 'static, C: 'static, D: 'static, E: 'static>(
    a: Parser<A>,
    b: Parser<B>,
    c: Parser<C>,
    d: Parser<D>,
    e: Parser<E>,
) -> Parser<(A, B, C, D, E)> {
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let va = a(bp.cursor())?;
        let vb = b(bp.cursor())?;
        let vc = c(bp.cursor())?;
        let vd = d(bp.cursor())?;
        let ve = e(bp.cursor())?;
        bp.close();
        Some((va, vb, vc, vd, ve))
    })
}

/// Try each alternative in order; the first to succeed wins. Each attempt
/// is isolated by its own breakpoint, so a partial match by one
/// alternative never leaks into the next.
pub fn any_of<T: 'static>(alternatives: Vec<Parser<T>>) -> Parser<T> {
    parser(move |cursor| {
        for alt in &alternatives {
            if cursor.has_undroppable_error() {
                return None;
            }
            let mut bp = BreakPoint::new(cursor);
            if let Some(value) = alt(bp.cursor()) {
                bp.close();
                return Some(value);
            }
        }
        None
    })
}

/// Optional match: `Some(value)` if `inner` matches, `None` (with the
/// cursor rewound) otherwise. Never itself fails.
pub fn maybe<T: 'static>(inner: Parser<T>) -> Parser<Option<T>> {
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        match inner(bp.cursor()) {
            Some(value) => {
                bp.close();
                Some(Some(value))
            }
            None if cursor.has_undroppable_error() => None,
            None => Some(None),
        }
    })
}

/// Optional match with a default value in place of `None`.
pub fn option<T: Clone + 'static>(inner: Parser<T>, default: T) -> Parser<T> {
    let maybe_inner = maybe(inner);
    parser(move |cursor| maybe_inner(cursor).map(|v| v.unwrap_or_else(|| default.clone())))
}

/// Transform a successful match's value. The dominant way AST nodes get
/// built: parse a grammar shape, then `map` it into the node type.
pub fn map<T: 'static, U: 'static>(inner: Parser<T>, f: impl Fn(T) -> U + 'static) -> Parser<U> {
    parser(move |cursor| inner(cursor).map(&f))
}

/// Like [`map`], but `f` can itself reject the match (returns `None`) after
/// inspecting the parsed value — used for checks that are easiest to
/// express once the shape is already parsed (e.g. matching a closing
/// identifier against an opening one).
pub fn try_map<T: 'static, U: 'static>(inner: Parser<T>, f: impl Fn(T) -> Option<U> + 'static) -> Parser<U> {
    parser(move |cursor| inner(cursor).and_then(&f))
}

/// Commit: once `inner` has matched, nothing may ever rewind the cursor to
/// before this point again, and a subsequent failure anywhere up to the
/// next commitment is fatal rather than recoverable.
///
/// The commit happens on success, to the cursor position `inner` leaves
/// behind — so everything `inner` consumed becomes unreachable to any
/// enclosing backtracking, not just the position `no_return` started at.
/// `inner` failing is left alone: nothing was consumed into a no-return
/// point to defend, but the failure is still marked undroppable, so an
/// enclosing `BreakPoint` cannot quietly rewind past it either.
pub fn no_return<T: 'static>(inner: Parser<T>) -> Parser<T> {
    parser(move |cursor| match inner(cursor) {
        Some(value) => {
            cursor.set_no_return_point();
            Some(value)
        }
        None => {
            cursor.set_undroppable_error();
            None
        }
    })
}

/// One or more `item`s separated by `delim`, with no trailing delimiter
/// permitted (the common case: `IdentList = ident {"," ident}`).
pub fn delim_sequence<T: 'static, D: 'static>(item: Parser<T>, delim: Parser<D>) -> Parser<Vec<T>> {
    let rest = many(map(chain(delim, Rc::clone(&item)), |(_, v)| v));
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let first = item(bp.cursor())?;
        let mut out = rest(bp.cursor())?;
        bp.close();
        out.insert(0, first);
        Some(out)
    })
}

/// Like [`delim_sequence`], but a trailing delimiter (with nothing after
/// it) is also accepted; used for declaration lists that Oberon lets end
/// with a stray `;`.
pub fn delim_sequence_trailing<T: 'static, D: Clone + 'static>(item: Parser<T>, delim: Parser<D>) -> Parser<Vec<T>> {
    let body = delim_sequence(item, Rc::clone(&delim));
    let trailing = maybe(delim);
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let items = body(bp.cursor())?;
        trailing(bp.cursor());
        bp.close();
        Some(items)
    })
}

#[cfg(test)]
#[path = "combinators_tests.rs"]
mod combinators_tests;
