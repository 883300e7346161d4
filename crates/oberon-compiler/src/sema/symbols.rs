//! Per-scope symbol containers: three insertion-ordered maps from
//! identifier to symbol token, constant value, and nested procedure
//! table, per the scope-level declaration discipline.

use std::rc::Rc;

use indexmap::IndexMap;
use oberon_core::{CodePlace, Symbol};

use crate::ast::Expression;
use crate::ast::Type;
use crate::diagnostics::{Diagnostics, WarningKind};

use super::procs::ProcedureTable;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolGroup {
    Type,
    Var,
    Const,
    Module,
}

/// One bound name's resolved type, tracked for "unused symbol" reporting.
#[derive(Clone)]
pub struct SymbolToken {
    pub name: Symbol,
    pub group: SymbolGroup,
    pub ty: Rc<Type>,
    pub use_count: u32,
    pub place: CodePlace,
}

impl SymbolToken {
    pub fn new(name: Symbol, group: SymbolGroup, ty: Rc<Type>, place: CodePlace) -> Self {
        Self { name, group, ty, use_count: 0, place }
    }
}

/// A constant's folded value alongside its declaring expression and type,
/// so `eval` can be re-derived without re-parsing.
#[derive(Clone)]
pub struct ConstValue {
    pub expr: Rc<Expression>,
    pub ty: Rc<Type>,
}

#[derive(Debug)]
pub enum InsertError {
    Redefinition(Symbol),
}

/// A scope's bindings. Every name lives in exactly one of the three maps;
/// insertion order is preserved so diagnostics (redefinition, unused
/// symbol) are emitted in declaration order.
#[derive(Default)]
pub struct SymbolContainer {
    symbols: IndexMap<Symbol, SymbolToken>,
    values: IndexMap<Symbol, ConstValue>,
    tables: IndexMap<Symbol, ProcedureTable>,
}

impl SymbolContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.symbols.contains_key(&name) || self.values.contains_key(&name) || self.tables.contains_key(&name)
    }

    pub fn insert_symbol(&mut self, token: SymbolToken) -> Result<(), InsertError> {
        if self.contains(token.name) {
            return Err(InsertError::Redefinition(token.name));
        }
        self.symbols.insert(token.name, token);
        Ok(())
    }

    pub fn insert_value(&mut self, name: Symbol, value: ConstValue) -> Result<(), InsertError> {
        if self.contains(name) {
            return Err(InsertError::Redefinition(name));
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Inserts a brand-new table entry. Overload-aware replacement of an
    /// existing entry is handled by callers via [`Self::table_mut`], since
    /// the overload rules live in `procs`.
    pub fn insert_table(&mut self, name: Symbol, table: ProcedureTable) -> Result<(), InsertError> {
        if self.symbols.contains_key(&name) || self.values.contains_key(&name) {
            return Err(InsertError::Redefinition(name));
        }
        self.tables.insert(name, table);
        Ok(())
    }

    /// Lookup that does not count as a use — for probing without
    /// affecting "unused symbol" accounting.
    pub fn get_symbol_secretly(&self, name: Symbol) -> Option<&SymbolToken> {
        self.symbols.get(&name)
    }

    pub fn get_symbol(&mut self, name: Symbol) -> Option<&SymbolToken> {
        let token = self.symbols.get_mut(&name)?;
        token.use_count += 1;
        Some(&*token)
    }

    pub fn get_value(&self, name: Symbol) -> Option<&ConstValue> {
        self.values.get(&name)
    }

    pub fn get_table(&self, name: Symbol) -> Option<&ProcedureTable> {
        self.tables.get(&name)
    }

    pub fn table_mut(&mut self, name: Symbol) -> Option<&mut ProcedureTable> {
        self.tables.get_mut(&name)
    }

    /// Removes and returns a table entry, so its body can be checked
    /// without holding this container's `RefCell` borrow across the
    /// recursive call — every name it resolves may walk back up through
    /// this same scope. Paired with [`Self::put_table_back`].
    pub fn take_table(&mut self, name: Symbol) -> Option<ProcedureTable> {
        self.tables.shift_remove(&name)
    }

    pub fn put_table_back(&mut self, name: Symbol, table: ProcedureTable) {
        self.tables.insert(name, table);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolToken> {
        self.symbols.values()
    }

    pub fn tables(&self) -> impl Iterator<Item = (&Symbol, &ProcedureTable)> {
        self.tables.iter()
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = (&Symbol, &mut ProcedureTable)> {
        self.tables.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.symbols.len() + self.values.len() + self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Emits `W1` for every symbol (not constant or table) declared in
    /// this scope with zero recorded uses.
    pub fn report_unused(&self, diagnostics: &mut Diagnostics, resolve: impl Fn(Symbol) -> String) {
        for token in self.symbols.values() {
            if token.use_count == 0 {
                diagnostics.warning(token.place, WarningKind::UnusedSymbol, format!("unused symbol '{}'", resolve(token.name)));
            }
        }
    }
}

#[cfg(test)]
#[path = "symbols_tests.rs"]
mod symbols_tests;
