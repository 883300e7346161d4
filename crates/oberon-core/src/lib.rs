#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared primitives for the Oberon-07 compiler front-end.
//!
//! - `position` — byte-offset source positions (`CodePlace`) and the
//!   per-file line index used to render them as `line:column`.
//! - `interner` — string interning (`Symbol`), used for identifiers and
//!   source file names so comparisons stay O(1).
//! - `colors` — the ANSI palette diagnostics rendering is colorized with.

pub mod colors;
pub mod interner;
pub mod position;

pub use colors::Colors;
pub use interner::{Interner, Symbol};
pub use position::{CodePlace, LineCol, PositionTable, SourceId};
