//
//  table.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::types::*;

/// FQN-keyed symbol table.
///
/// A flat arena of [`SymbolEntry`] values in insertion order with an
/// FQN → slot index. The table owns every entry; parent/child links are
/// FQN references, so there are no cyclic object graphs.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}

/// Result of merging one file's fragment into the global table.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// False when the file's module itself collided and nothing was merged.
    pub accepted: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fqn: &str) -> Option<&SymbolEntry> {
        self.index.get(fqn).map(|&slot| &self.entries[slot])
    }

    pub(crate) fn get_mut(&mut self, fqn: &str) -> Option<&mut SymbolEntry> {
        match self.index.get(fqn) {
            Some(&slot) => self.entries.get_mut(slot),
            None => None,
        }
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.index.contains_key(fqn)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    /// Entries without a parent (top-level packages and modules).
    pub fn roots(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter().filter(|e| e.parent.is_none())
    }

    /// Top-level identifiers, used to recognise module boundaries.
    pub fn top_level_names(&self) -> HashSet<&str> {
        self.roots().map(|e| e.fqn.as_str()).collect()
    }

    /// Insert a new entry. Returns false (and leaves the table untouched)
    /// if the FQN is already registered: entries are write-once.
    #[must_use]
    pub fn insert(&mut self, entry: SymbolEntry) -> bool {
        if self.index.contains_key(&entry.fqn) {
            return false;
        }
        self.index.insert(entry.fqn.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Make sure `fqn` and all of its prefixes exist, synthesizing package
    /// entries for missing segments and linking each to its parent.
    pub fn ensure_package(&mut self, fqn: &str) {
        if self.contains(fqn) {
            return;
        }
        let (parent, name) = split_fqn(fqn);
        if let Some(parent) = parent {
            self.ensure_package(parent);
            if let Some(parent_entry) = self.get_mut(parent) {
                parent_entry.add_child(name, fqn);
            }
        }
        let inserted = self.insert(SymbolEntry::package(fqn));
        debug_assert!(inserted, "package {fqn} checked absent above");
    }

    /// Merge one file's local fragment (module first, then nested entries
    /// in traversal order) under a single writer.
    ///
    /// - A module landing on a synthesized package upgrades it in place.
    /// - A module colliding with any other entry rejects the whole fragment.
    /// - Any other collision skips that entry and its descendants.
    pub fn merge_fragment(&mut self, fragment: SymbolTable, path: &str) -> MergeOutcome {
        let mut outcome = MergeOutcome {
            accepted: true,
            diagnostics: Vec::new(),
        };
        let mut skipped: HashSet<String> = HashSet::new();

        for entry in fragment.entries {
            if let Some(parent) = &entry.parent {
                if skipped.contains(parent) {
                    skipped.insert(entry.fqn.clone());
                    continue;
                }
            }

            let is_module = entry.kind() == SymbolKind::Module;

            if let Some(existing) = self.get_mut(&entry.fqn) {
                if is_module && existing.is_package() {
                    let inherited = std::mem::take(&mut existing.children);
                    let fresh = entry.children.clone();
                    *existing = entry;
                    existing.children = inherited;
                    for child in fresh {
                        existing.add_child(&child.name, &child.fqn);
                    }
                    continue;
                }

                let message = format!(
                    "{} `{}` already registered as {}",
                    entry.kind(),
                    entry.fqn,
                    existing.kind()
                );
                debug!(file = path, fqn = %entry.fqn, "duplicate symbol skipped");
                outcome
                    .diagnostics
                    .push(Diagnostic::structural(path, Phase::Hierarchy, message));
                if is_module {
                    outcome.accepted = false;
                    return outcome;
                }
                skipped.insert(entry.fqn.clone());
                continue;
            }

            if let Some(parent) = entry.parent.clone() {
                if !self.contains(&parent) {
                    if is_module {
                        self.ensure_package(&parent);
                    } else {
                        debug!(file = path, fqn = %entry.fqn, "parent not registered");
                        outcome.diagnostics.push(Diagnostic::structural(
                            path,
                            Phase::Hierarchy,
                            format!("parent `{}` of `{}` is not registered", parent, entry.fqn),
                        ));
                        skipped.insert(entry.fqn.clone());
                        continue;
                    }
                }
                if let Some(parent_entry) = self.get_mut(&parent) {
                    parent_entry.add_child(&entry.name, &entry.fqn);
                }
            }

            let inserted = self.insert(entry);
            debug_assert!(inserted, "collision handled above");
        }

        outcome
    }

    /// Every place the prefix-tree invariant does not hold.
    /// Empty for a well-formed table.
    pub fn tree_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for entry in &self.entries {
            match &entry.parent {
                Some(parent) => {
                    if entry.fqn != format!("{}.{}", parent, entry.name) {
                        violations.push(format!(
                            "`{}` is not `{}` + `.` + `{}`",
                            entry.fqn, parent, entry.name
                        ));
                    }
                    match self.get(parent) {
                        Some(parent_entry) => {
                            let linked = parent_entry
                                .children
                                .iter()
                                .any(|c| c.name == entry.name && c.fqn == entry.fqn);
                            if !linked {
                                violations.push(format!(
                                    "`{}` missing from children of `{}`",
                                    entry.fqn, parent
                                ));
                            }
                        }
                        None => violations.push(format!(
                            "parent `{}` of `{}` is not registered",
                            parent, entry.fqn
                        )),
                    }
                }
                None => {
                    if entry.fqn != entry.name || entry.fqn.contains('.') {
                        violations.push(format!("root `{}` is not a single segment", entry.fqn));
                    }
                }
            }

            for child in &entry.children {
                if child.fqn != format!("{}.{}", entry.fqn, child.name) {
                    violations.push(format!(
                        "child `{}` of `{}` does not extend its FQN",
                        child.fqn, entry.fqn
                    ));
                }
            }
        }

        violations
    }
}

impl PartialEq for SymbolTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for SymbolTable {}
