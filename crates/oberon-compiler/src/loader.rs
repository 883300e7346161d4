//! The module loader (§4.4): resolves an import graph on demand, parsing
//! and declaring each referenced module at most once and caching the
//! result by module name. Owned by the caller of one analysis session —
//! never process-global — so tests and repeated CLI invocations stay
//! hermetic.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use oberon_core::{Interner, PositionTable, Symbol};

use crate::ast::Section;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::parse::parse_source;
use crate::sema::{declare_module, ModuleTable};

const EXTENSIONS: [&str; 3] = ["Mod", "mod", "def"];

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("module '{0}' not found in any search directory")]
    NotFound(String),
    #[error("could not read '{path}': {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("module '{0}' imports itself, directly or indirectly")]
    Cycle(String),
    #[error("module '{0}' failed to parse")]
    Parse(String, Diagnostic),
}

/// Caches loaded [`ModuleTable`]s by module name for one analysis
/// session. Grows only — entries are never evicted — matching the
/// single-threaded, no-locking discipline described in §5.
pub struct ModuleLoader {
    search_dirs: Vec<PathBuf>,
    interner: Rc<RefCell<Interner>>,
    positions: RefCell<PositionTable>,
    cache: RefCell<IndexMap<String, Rc<ModuleTable>>>,
    diagnostics: RefCell<Diagnostics>,
    loading: RefCell<HashSet<String>>,
}

impl ModuleLoader {
    pub fn new(search_dirs: Vec<PathBuf>, interner: Rc<RefCell<Interner>>) -> Self {
        Self {
            search_dirs,
            interner,
            positions: RefCell::new(PositionTable::new()),
            cache: RefCell::new(IndexMap::new()),
            diagnostics: RefCell::new(Diagnostics::new()),
            loading: RefCell::new(HashSet::new()),
        }
    }

    pub fn positions(&self) -> Ref<'_, PositionTable> {
        self.positions.borrow()
    }

    /// Diagnostics accumulated across every module declared this session,
    /// in load order. Does not include the `LoaderError::Parse` of a
    /// module that never finished parsing — that failure is returned
    /// directly from `load` instead.
    pub fn diagnostics(&self) -> Ref<'_, Diagnostics> {
        self.diagnostics.borrow()
    }

    /// Loads a named module and everything it imports, returning the
    /// cached table on a repeat request.
    pub fn load(&self, name: &str) -> Result<Rc<ModuleTable>, LoaderError> {
        if let Some(table) = self.cache.borrow().get(name) {
            log::debug!("module loader: cache hit for '{name}'");
            return Ok(Rc::clone(table));
        }
        if !self.loading.borrow_mut().insert(name.to_string()) {
            return Err(LoaderError::Cycle(name.to_string()));
        }
        let result = self.load_uncached(name);
        self.loading.borrow_mut().remove(name);
        result
    }

    fn load_uncached(&self, name: &str) -> Result<Rc<ModuleTable>, LoaderError> {
        let path = self.resolve_file(name)?;
        log::debug!("module loader: resolved '{name}' to {}", path.display());
        self.load_path(&path, name)
    }

    fn resolve_file(&self, name: &str) -> Result<PathBuf, LoaderError> {
        for dir in &self.search_dirs {
            for ext in EXTENSIONS {
                let candidate = dir.join(format!("{name}.{ext}"));
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }
        Err(LoaderError::NotFound(name.to_string()))
    }

    /// Loads the file at `path` directly, under `module_name` (its own
    /// declared name need not match the file stem). Used for the file
    /// named on the command line, which is identified by path rather
    /// than by search-directory resolution.
    pub fn load_file(&self, path: &Path, module_name: &str) -> Result<Rc<ModuleTable>, LoaderError> {
        if let Some(table) = self.cache.borrow().get(module_name) {
            return Ok(Rc::clone(table));
        }
        self.load_path(path, module_name)
    }

    fn load_path(&self, path: &Path, name: &str) -> Result<Rc<ModuleTable>, LoaderError> {
        let text = fs::read_to_string(path).map_err(|source| LoaderError::Io { path: path.to_path_buf(), source })?;
        let source_id = {
            let mut positions = self.positions.borrow_mut();
            positions.add_file(path.display().to_string(), text)
        };
        let section: Section = {
            let positions = self.positions.borrow();
            parse_source(source_id, &positions, Rc::clone(&self.interner)).map_err(|diag| LoaderError::Parse(name.to_string(), diag))?
        };

        let mut imports: IndexMap<Symbol, Rc<ModuleTable>> = IndexMap::new();
        for import in section.imports() {
            let imported_name = self.interner.borrow().resolve(import.name.name).to_string();
            let imported_table = self.load(&imported_name)?;
            imports.insert(import.alias.name, imported_table);
        }

        let mut diagnostics = Diagnostics::new();
        let table = declare_module(&section, imports, &self.interner, &mut diagnostics);
        log::info!("module loader: declared '{name}' ({} diagnostics)", diagnostics.len());
        self.diagnostics.borrow_mut().extend(diagnostics);

        self.cache.borrow_mut().insert(name.to_string(), Rc::clone(&table));
        Ok(table)
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod loader_tests;
