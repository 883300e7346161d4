//! The single entry point from source text to a parsed [`Section`]: builds
//! the grammar, runs it over one registered file, and turns a parse
//! failure into the single best (deepest) [`Diagnostic`] per §4.2's
//! single-slot "best failure" rule.

use std::cell::RefCell;
use std::rc::Rc;

use oberon_core::{CodePlace, Interner, PositionTable, SourceId};

use crate::ast::Section;
use crate::diagnostics::Diagnostic;
use crate::grammar::build_parser;
use crate::parser::Cursor;

/// Parses the file already registered as `source` in `positions`, using
/// `interner` for identifier symbols.
///
/// On success returns the parsed [`Section`]; on failure returns the
/// single rendered parse error built from the cursor's best-failure slot.
/// Parse does not accumulate multiple independent errors (§7).
pub fn parse_source(source: SourceId, positions: &PositionTable, interner: Rc<RefCell<Interner>>) -> Result<Section, Diagnostic> {
    let text = positions.contents(source);
    let mut cursor = Cursor::new(source, text);
    let parse = build_parser(interner);
    match parse(&mut cursor) {
        Some(section) => Ok(section),
        None => Err(render_failure(&cursor, source, text)),
    }
}

fn render_failure(cursor: &Cursor, source: SourceId, text: &str) -> Diagnostic {
    let slot = cursor.expected_slot();
    let place = CodePlace::new(source, slot.index());
    let expected = slot.expected().iter().map(|s| s.to_string()).collect();
    Diagnostic::parse_error(place, expected, found_at(text, slot.index()))
}

/// A short human-readable description of what stands at `index`, for the
/// "found X" half of a rendered parse error.
fn found_at(text: &str, index: u32) -> String {
    let remaining = &text.as_bytes()[(index as usize).min(text.len())..];
    if remaining.is_empty() {
        return "end of input".to_string();
    }
    let end = remaining.iter().position(|b| b.is_ascii_whitespace()).unwrap_or(remaining.len()).max(1);
    String::from_utf8_lossy(&remaining[..end]).into_owned()
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod parse_tests;
