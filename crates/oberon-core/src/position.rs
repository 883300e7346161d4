//! Source positions and the line index used to render them.
//!
//! A [`CodePlace`] is a byte offset into a loaded file plus the identity of
//! that file (a [`SourceId`]). The [`PositionTable`] is the only place that
//! knows how to turn such an offset into a human `line:column` pair, or back
//! into the source line it falls on; everything else treats `CodePlace` as
//! opaque.

/// Identifies a loaded source file. Cheap to copy and compare; the table
/// that issued it is the only thing that can resolve it back to a name or
/// contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SourceId(u32);

impl SourceId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// An opaque byte index into a file's contents plus that file's identity.
///
/// Equality and ordering are by `(source, index)`; two places from different
/// files never compare equal even at the same index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CodePlace {
    source: SourceId,
    index: u32,
}

impl CodePlace {
    pub fn new(source: SourceId, index: u32) -> Self {
        Self { source, index }
    }

    #[inline]
    pub fn source(self) -> SourceId {
        self.source
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// A place at the same index but clamped to be within `len` (used when a
    /// combinator needs a one-past-the-end place for an empty match).
    pub fn with_index(self, index: u32) -> Self {
        Self {
            source: self.source,
            index,
        }
    }
}

/// 1-based line and column, as rendered in diagnostics (`file:line:col:`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

struct FileEntry {
    name: String,
    contents: String,
    /// `line_lengths[i]` is the number of bytes in line `i`, including its
    /// terminating `\n` (the last line may lack one).
    line_lengths: Vec<u32>,
}

fn compute_line_lengths(contents: &str) -> Vec<u32> {
    let mut lengths = Vec::new();
    let mut start = 0usize;
    for (i, b) in contents.bytes().enumerate() {
        if b == b'\n' {
            lengths.push((i + 1 - start) as u32);
            start = i + 1;
        }
    }
    if start < contents.len() || contents.is_empty() {
        lengths.push((contents.len() - start) as u32);
    }
    lengths
}

/// Owns the loaded contents of every file registered with it, and answers
/// byte-offset-to-`line:column` and offset-to-containing-line queries.
///
/// Purely functional once a file is loaded: nothing here mutates a file's
/// line index after [`PositionTable::add_file`] returns.
#[derive(Default)]
pub struct PositionTable {
    files: Vec<FileEntry>,
}

impl PositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded file, returning the `SourceId` later `CodePlace`s
    /// into it should use.
    pub fn add_file(&mut self, name: impl Into<String>, contents: impl Into<String>) -> SourceId {
        let contents = contents.into();
        let line_lengths = compute_line_lengths(&contents);
        self.files.push(FileEntry {
            name: name.into(),
            contents,
            line_lengths,
        });
        SourceId((self.files.len() - 1) as u32)
    }

    fn file(&self, id: SourceId) -> &FileEntry {
        &self.files[id.as_u32() as usize]
    }

    pub fn file_name(&self, id: SourceId) -> &str {
        &self.file(id).name
    }

    pub fn contents(&self, id: SourceId) -> &str {
        &self.file(id).contents
    }

    /// Convert a byte offset to a 1-based `(line, column)`.
    pub fn line_col(&self, place: CodePlace) -> LineCol {
        let file = self.file(place.source());
        let index = place.index() as u64;
        let mut running = 0u64;
        for (i, &len) in file.line_lengths.iter().enumerate() {
            let next = running + len as u64;
            if index < next || i == file.line_lengths.len() - 1 {
                let column = index.saturating_sub(running);
                return LineCol {
                    line: (i + 1) as u32,
                    column: (column + 1) as u32,
                };
            }
            running = next;
        }
        LineCol { line: 1, column: 1 }
    }

    /// Return the full source line that `place` falls on, without its
    /// trailing newline.
    pub fn get_line(&self, place: CodePlace) -> &str {
        let file = self.file(place.source());
        let index = place.index() as u64;
        let mut running = 0u64;
        let last = file.line_lengths.len().saturating_sub(1);
        for (i, &len) in file.line_lengths.iter().enumerate() {
            let next = running + len as u64;
            if index < next || i == last {
                let start = running as usize;
                let end = (next as usize).min(file.contents.len());
                let line = &file.contents[start..end];
                return line.strip_suffix('\n').unwrap_or(line);
            }
            running = next;
        }
        ""
    }
}

#[cfg(test)]
mod position_tests {
    use super::*;

    #[test]
    fn single_line_offsets() {
        let mut table = PositionTable::new();
        let id = table.add_file("a.Mod", "MODULE M; END M.");
        let place = CodePlace::new(id, 7);
        let lc = table.line_col(place);
        assert_eq!(lc, LineCol { line: 1, column: 8 });
        assert_eq!(table.get_line(place), "MODULE M; END M.");
    }

    #[test]
    fn multi_line_offsets() {
        let mut table = PositionTable::new();
        let src = "MODULE M;\nVAR x: INTEGER;\nBEGIN x := 1 END M.";
        let id = table.add_file("a.Mod", src);
        let x_offset = src.find("x := 1").unwrap() as u32;
        let place = CodePlace::new(id, x_offset);
        let lc = table.line_col(place);
        assert_eq!(lc.line, 3);
        assert_eq!(table.get_line(place), "BEGIN x := 1 END M.");
    }

    #[test]
    fn last_line_without_trailing_newline() {
        let mut table = PositionTable::new();
        let id = table.add_file("a.Mod", "MODULE M;\nEND M.");
        let place = CodePlace::new(id, 12);
        assert_eq!(table.get_line(place), "END M.");
        assert_eq!(table.line_col(place).line, 2);
    }
}
