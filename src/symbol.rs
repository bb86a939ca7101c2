//! The symbol table: a lexically scoped name environment with shadowing.
//!
//! A stack of scopes plus a per-identifier stack of active entries ordered
//! by nesting depth. A scope can be hidden from lookup without removing its
//! entries, which is how recursive `let` groups are staged: pre-insert the
//! names with the scope invisible, process the right-hand sides, then flip
//! the scope visible.

use std::collections::HashMap;
use std::{error::Error, fmt::Display};

use crate::ast::Named;
use crate::lexer::Pos;

/// Redefinition of an identifier within the same scope. Raised to the
/// caller; the symbol table never logs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RedefIdentifierError {
    pub name: String,
    pub pos: Pos,
    pub prev: Pos,
}

impl Display for RedefIdentifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Redefinition of identifier '{}' in the same scope; previous definition at {}",
            self.name, self.prev
        )
    }
}

impl Error for RedefIdentifierError {}

/// One scope: its entries' names, a visibility flag and its nesting depth.
#[derive(Debug, Clone)]
pub struct Scope {
    pub visible: bool,
    pub nesting: usize,
    entries: Vec<String>,
}

struct Entry<'a, N: ?Sized> {
    node: &'a N,
    nesting: usize,
}

/// A symbol table over name-bearing AST nodes. Entries borrow the nodes;
/// the tree outlives the table.
pub struct SymbolTable<'a, N: Named + ?Sized> {
    scopes: Vec<Scope>,
    /// Active entries per identifier, innermost last.
    names: HashMap<String, Vec<Entry<'a, N>>>,
}

impl<'a, N: Named + ?Sized> SymbolTable<'a, N> {
    /// Make a new symbol table with the library namespace as its outermost
    /// scope.
    pub fn new() -> Self {
        let mut table = SymbolTable {
            scopes: vec![],
            names: HashMap::new(),
        };
        table.open_scope();
        table
    }

    /// Invariant: `nesting == scopes.len()`.
    pub fn nesting(&self) -> usize {
        self.scopes.len()
    }

    /// Open a new visible scope; returns its nesting depth.
    pub fn open_scope(&mut self) -> usize {
        let nesting = self.scopes.len() + 1;
        self.scopes.push(Scope {
            visible: true,
            nesting,
            entries: vec![],
        });
        nesting
    }

    /// Close the current scope and drop its entries from the identifier
    /// stacks.
    pub fn close_scope(&mut self) {
        let scope = self.scopes.pop().expect("No scope to pop.");
        for name in scope.entries {
            let stack = self
                .names
                .get_mut(&name)
                .expect("entry name is tracked in the identifier map");
            stack.pop();
            if stack.is_empty() {
                self.names.remove(&name);
            }
        }
    }

    /// Flip the visibility of the current scope. Hidden scopes keep their
    /// entries but are skipped by [`SymbolTable::find_live_def`].
    pub fn set_current_scope_visible(&mut self, visible: bool) {
        self.scopes
            .last_mut()
            .expect("No scope to adjust.")
            .visible = visible;
    }

    pub fn current_scope_visible(&self) -> bool {
        self.scopes.last().map(|s| s.visible).unwrap_or(false)
    }

    /// Insert a name-bearing node into the current scope. Fails if the name
    /// is already bound at the current nesting depth.
    pub fn insert_symbol(&mut self, node: &'a N) -> Result<(), RedefIdentifierError> {
        let nesting = self.scopes.len();
        let scope = self.scopes.last_mut().expect("No scope to insert into.");
        let name = node.name().to_string();

        if let Some(prev) = self.names.get(&name).and_then(|stack| stack.last()) {
            if prev.nesting == nesting {
                return Err(RedefIdentifierError {
                    name,
                    pos: node.pos(),
                    prev: prev.node.pos(),
                });
            }
        }

        scope.entries.push(name.clone());
        self.names
            .entry(name)
            .or_default()
            .push(Entry { node, nesting });
        Ok(())
    }

    /// The binding for the node's name in the current scope, ignoring
    /// visibility. Returns the stored node.
    pub fn find_symbol_in_current_scope(&self, node: &dyn Named) -> Option<&'a N> {
        let entry = self.names.get(node.name())?.last()?;
        (entry.nesting == self.scopes.len()).then_some(entry.node)
    }

    /// The innermost binding for the node's name whose owning scope is
    /// visible. Returns the stored node.
    pub fn find_live_def(&self, node: &dyn Named) -> Option<&'a N> {
        for entry in self.names.get(node.name())?.iter().rev() {
            if self.scopes[entry.nesting - 1].visible {
                return Some(entry.node);
            }
        }
        None
    }
}

impl<'a, N: Named + ?Sized> Default for SymbolTable<'a, N> {
    fn default() -> Self {
        SymbolTable::new()
    }
}
