//! Plain-text and ANSI-colored rendering of a [`Diagnostics`] collection.
//!
//! Format, per the external interface contract:
//! - Parse error: `file:line:col: Expected ( alt1 or alt2 ) , found X`
//! - Semantic diagnostic: `Error on file:line:col: <text>` (or `W1`..`W4`
//!   in place of `Error`), followed by the offending source line and a
//!   caret aligned to the column.

use std::fmt::Write;

use oberon_core::{Colors, PositionTable};

use super::collection::Diagnostics;
use super::message::Diagnostic;

pub struct DiagnosticsPrinter<'d, 'p> {
    diagnostics: &'d Diagnostics,
    positions: &'p PositionTable,
    colors: Colors,
}

impl<'d, 'p> DiagnosticsPrinter<'d, 'p> {
    pub fn new(diagnostics: &'d Diagnostics, positions: &'p PositionTable) -> Self {
        Self {
            diagnostics,
            positions,
            colors: Colors::OFF,
        }
    }

    pub fn colored(mut self, colors: Colors) -> Self {
        self.colors = colors;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for diag in self.diagnostics.iter() {
            self.format_one(w, diag)?;
        }
        Ok(())
    }

    fn format_one(&self, w: &mut impl Write, diag: &Diagnostic) -> std::fmt::Result {
        let file = self.positions.file_name(diag.place.source());
        let lc = self.positions.line_col(diag.place);
        let color = if diag.severity.is_error() { self.colors.red } else { self.colors.yellow };
        let reset = self.colors.reset;

        match &diag.expected {
            Some(alts) => {
                let alt_str = match alts.as_slice() {
                    [one] => one.clone(),
                    many => format!("( {} )", many.join(" or ")),
                };
                writeln!(
                    w,
                    "{color}{file}:{line}:{col}:{reset} Expected {alt_str} , found {found}",
                    line = lc.line,
                    col = lc.column,
                    found = diag.message,
                )
            }
            None => {
                let line_text = self.positions.get_line(diag.place);
                let caret = " ".repeat(lc.column.saturating_sub(1) as usize) + "^";
                writeln!(
                    w,
                    "{color}{tag} on {file}:{line}:{col}:{reset} {msg}\n{src}\n{caret}",
                    tag = diag.severity.tag(),
                    line = lc.line,
                    col = lc.column,
                    msg = diag.message,
                    src = line_text,
                )
            }
        }
    }
}

impl Diagnostics {
    pub fn printer<'d, 'p>(&'d self, positions: &'p PositionTable) -> DiagnosticsPrinter<'d, 'p> {
        DiagnosticsPrinter::new(self, positions)
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod printer_tests;
