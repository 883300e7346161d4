//! Lexical-level rules: whitespace and comments (treated as the same
//! thing), identifiers, reserved words, numbers, characters, strings.
//!
//! There is no separate lexer stage — every rule here is a regular
//! combinator parser over the byte cursor, the same as the grammar rules
//! built on top of them. Each one consumes its own trailing whitespace so
//! higher layers never have to think about it.

use std::rc::Rc;

use oberon_core::CodePlace;

use crate::ast::{Identifier, NumberLit};
use crate::parser::{any_of, many, map, parser, predicate, BreakPoint, Cursor, Parser};

use super::context::GrammarContext;

pub const RESERVED_WORDS: &[&str] = &[
    "ARRAY", "BEGIN", "BY", "CASE", "CONST", "DIV", "DO", "ELSE", "ELSIF", "END", "FALSE", "FOR", "IF", "IMPORT",
    "IN", "IS", "MOD", "MODULE", "NIL", "OF", "OR", "POINTER", "PROCEDURE", "RECORD", "REPEAT", "RETURN", "THEN",
    "TO", "TRUE", "TYPE", "UNTIL", "VAR", "WHILE",
];

pub fn is_letter(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

pub fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

pub fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// `(* ... *)`, nestable.
fn comment() -> Parser<()> {
    parser(|cursor: &mut Cursor| -> Option<()> {
        match cursor.peek_slice(2) {
            Some([b'(', b'*']) => {}
            _ => return None,
        }
        cursor.bump();
        cursor.bump();
        let mut depth = 1u32;
        while depth > 0 {
            match cursor.peek_slice(2) {
                Some([b'(', b'*']) => {
                    cursor.bump();
                    cursor.bump();
                    depth += 1;
                }
                Some([b'*', b')']) => {
                    cursor.bump();
                    cursor.bump();
                    depth -= 1;
                }
                _ => {
                    if cursor.bump().is_none() {
                        cursor.record_expected("closing '*)'");
                        return None;
                    }
                }
            }
        }
        Some(())
    })
}

/// Any run of whitespace and comments. Always succeeds, possibly
/// consuming nothing.
pub fn ws() -> Parser<()> {
    let space = predicate("whitespace", is_space);
    let item = any_of(vec![map(space, |_| ()), comment()]);
    map(many(item), |_| ())
}

/// Consume `inner`, then any trailing whitespace/comments.
pub fn lexeme<T: 'static>(inner: Parser<T>) -> Parser<T> {
    let ws_after = ws();
    parser(move |cursor| {
        let mut bp = BreakPoint::new(cursor);
        let value = inner(bp.cursor())?;
        ws_after(bp.cursor());
        bp.close();
        Some(value)
    })
}

/// An exact literal word, rejected if immediately followed by another
/// identifier character (so `keyword("END")` does not match a prefix of
/// `ENDOFTIME`).
pub fn keyword(word: &'static str) -> Parser<&'static str> {
    let bytes = word.as_bytes();
    let raw = parser(move |cursor: &mut Cursor| -> Option<&'static str> {
        if cursor.peek_slice(bytes.len()) != Some(bytes) {
            cursor.record_expected(word);
            return None;
        }
        let mut bp = BreakPoint::new(cursor);
        for _ in 0..bytes.len() {
            bp.cursor().bump();
        }
        if bp.cursor().peek().map(is_ident_char).unwrap_or(false) {
            bp.cursor().record_expected(word);
            return None;
        }
        bp.close();
        Some(word)
    });
    lexeme(raw)
}

/// An exact operator/punctuation literal (no identifier-continuation
/// check — `"#"`, `":="`, `".."`, and the like).
pub fn op(text: &'static str) -> Parser<&'static str> {
    use crate::parser::symbols;
    lexeme(symbols(text))
}

/// Letter followed by letters/digits, rejected outright if the spelling
/// matches a reserved word.
pub fn identifier(ctx: &GrammarContext) -> Parser<Identifier> {
    let interner = Rc::clone(&ctx.interner);
    let raw = parser(|cursor: &mut Cursor| -> Option<(u32, u32)> {
        let start = cursor.raw_pos();
        match cursor.peek() {
            Some(b) if is_letter(b) => {
                cursor.bump();
            }
            _ => {
                cursor.record_expected("identifier");
                return None;
            }
        }
        while cursor.peek().is_some_and(is_ident_char) {
            cursor.bump();
        }
        Some((start, cursor.raw_pos()))
    });
    let checked = parser(move |cursor: &mut Cursor| -> Option<Identifier> {
        let mut bp = BreakPoint::new(cursor);
        let (start, end) = raw(bp.cursor())?;
        let source = bp.cursor().source();
        let text = std::str::from_utf8(bp.cursor().slice(start, end)).expect("identifier bytes are ASCII");
        if RESERVED_WORDS.contains(&text) {
            bp.cursor().record_expected("identifier");
            return None;
        }
        let sym = interner.borrow_mut().intern(text);
        bp.close();
        Some(Identifier::new(sym, CodePlace::new(source, start)))
    });
    lexeme(checked)
}

/// Decimal integer, hex integer (`...H`), or real (`digits.digits[E|D[+|-]digits]`).
pub fn number() -> Parser<(NumberLit, CodePlace)> {
    let raw = parser(|cursor: &mut Cursor| -> Option<(NumberLit, u32, u32)> {
        let start = cursor.raw_pos();
        if !cursor.peek().is_some_and(is_digit) {
            cursor.record_expected("number");
            return None;
        }
        while cursor.peek().is_some_and(is_digit) {
            cursor.bump();
        }
        let digits_end = cursor.raw_pos();

        // hex integer: optional further hex digits, then a mandatory 'H'.
        {
            let mut bp = BreakPoint::new(cursor);
            while bp.cursor().peek().is_some_and(is_hex_digit) {
                bp.cursor().bump();
            }
            if bp.cursor().peek() == Some(b'H') {
                bp.cursor().bump();
                bp.close();
                let end = bp.cursor().raw_pos();
                let text = std::str::from_utf8(cursor.slice(start, end - 1)).unwrap();
                let value = i64::from_str_radix(text, 16).ok()?;
                return Some((NumberLit::Int(value), start, end));
            }
        }

        // real: '.' not followed by a second '.' (which is the case-label
        // range operator), then a fractional digit run and optional exponent.
        let is_real = cursor.peek() == Some(b'.') && cursor.peek_at(1).is_some_and(is_digit);
        if is_real {
            cursor.bump();
            while cursor.peek().is_some_and(is_digit) {
                cursor.bump();
            }
            if matches!(cursor.peek(), Some(b'E') | Some(b'D')) {
                cursor.bump();
                if matches!(cursor.peek(), Some(b'+') | Some(b'-')) {
                    cursor.bump();
                }
                if !cursor.peek().is_some_and(is_digit) {
                    cursor.record_expected("exponent digits");
                    return None;
                }
                while cursor.peek().is_some_and(is_digit) {
                    cursor.bump();
                }
            }
            let end = cursor.raw_pos();
            let text = std::str::from_utf8(cursor.slice(start, end)).unwrap();
            let value: f64 = text.parse().ok()?;
            return Some((NumberLit::Real(value), start, end));
        }

        let text = std::str::from_utf8(cursor.slice(start, digits_end)).unwrap();
        let value: i64 = text.parse().ok()?;
        Some((NumberLit::Int(value), start, digits_end))
    });
    let placed = parser(move |cursor: &mut Cursor| {
        let (lit, start, _end) = raw(cursor)?;
        Some((lit, CodePlace::new(cursor.source(), start)))
    });
    lexeme(placed)
}

/// `'X'`, one byte between single quotes, or a hex-integer literal
/// suffixed with `X` instead of `H`.
pub fn char_literal() -> Parser<(u8, CodePlace)> {
    let quoted = parser(|cursor: &mut Cursor| -> Option<(u8, u32, u32)> {
        let start = cursor.raw_pos();
        if cursor.peek() != Some(b'\'') {
            cursor.record_expected("character literal");
            return None;
        }
        cursor.bump();
        let ch = cursor.bump()?;
        if cursor.peek() != Some(b'\'') {
            cursor.record_expected("closing \"'\"");
            return None;
        }
        cursor.bump();
        Some((ch, start, cursor.raw_pos()))
    });
    let hex_suffixed = parser(|cursor: &mut Cursor| -> Option<(u8, u32, u32)> {
        let start = cursor.raw_pos();
        if !cursor.peek().is_some_and(is_digit) {
            cursor.record_expected("character literal");
            return None;
        }
        while cursor.peek().is_some_and(is_hex_digit) {
            cursor.bump();
        }
        if cursor.peek() != Some(b'X') {
            cursor.record_expected("'X' suffix");
            return None;
        }
        let end_digits = cursor.raw_pos();
        cursor.bump();
        let text = std::str::from_utf8(cursor.slice(start, end_digits)).unwrap();
        let value = u8::try_from(u32::from_str_radix(text, 16).ok()?).ok()?;
        Some((value, start, cursor.raw_pos()))
    });
    let alt = any_of(vec![quoted, hex_suffixed]);
    let placed = parser(move |cursor: &mut Cursor| {
        let (ch, start, _end) = alt(cursor)?;
        Some((ch, CodePlace::new(cursor.source(), start)))
    });
    lexeme(placed)
}

/// Single- or double-quoted string, no escapes.
pub fn string_literal() -> Parser<(Vec<u8>, CodePlace)> {
    let raw = parser(|cursor: &mut Cursor| -> Option<(Vec<u8>, u32)> {
        let start = cursor.raw_pos();
        let quote = match cursor.peek() {
            Some(b @ (b'"' | b'\'')) => b,
            _ => {
                cursor.record_expected("string literal");
                return None;
            }
        };
        cursor.bump();
        let mut bytes = Vec::new();
        loop {
            match cursor.peek() {
                Some(b) if b == quote => {
                    cursor.bump();
                    break;
                }
                Some(b'\n') | None => {
                    cursor.record_expected("closing quote");
                    return None;
                }
                Some(b) => {
                    bytes.push(b);
                    cursor.bump();
                }
            }
        }
        Some((bytes, start))
    });
    let placed = parser(move |cursor: &mut Cursor| {
        let (bytes, start) = raw(cursor)?;
        Some((bytes, CodePlace::new(cursor.source(), start)))
    });
    lexeme(placed)
}

/// The cursor's current position, without consuming anything. Every
/// grammar node wrapper starts with this, per the rule that a node's
/// position is the position of its starting token.
pub fn here() -> Parser<CodePlace> {
    parser(|cursor: &mut Cursor| Some(cursor.place()))
}

#[cfg(test)]
#[path = "lexical_tests.rs"]
mod lexical_tests;
