//! Ordered entity store for one section.
//!
//! Items keep arrival order across all merged pages and are never resorted.
//! Numbers are unique: a page that carries a number already held replaces
//! that record in place instead of adding a second copy.

use std::collections::HashMap;

use prdash_proto::pr::{PrNumber, PullRequest};

/// Pull requests of a section in fetch order, indexed by number.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    items: Vec<PullRequest>,
    index: HashMap<PrNumber, usize>,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole content with `prs`, as for a first page.
    pub fn replace_all(&mut self, prs: Vec<PullRequest>) {
        self.clear();
        self.append(prs);
    }

    /// Appends `prs` after the current items.
    ///
    /// A record whose number is already present overwrites the held record
    /// at its original position.
    pub fn append(&mut self, prs: Vec<PullRequest>) {
        for pr in prs {
            if let Some(&pos) = self.index.get(&pr.number) {
                self.items[pos] = pr;
            } else {
                self.index.insert(pr.number, self.items.len());
                self.items.push(pr);
            }
        }
    }

    /// Mutable access to the record with `number`, if held.
    pub fn get_mut(&mut self, number: PrNumber) -> Option<&mut PullRequest> {
        let pos = *self.index.get(&number)?;
        self.items.get_mut(pos)
    }

    /// The record with `number`, if held.
    #[must_use]
    pub fn get(&self, number: PrNumber) -> Option<&PullRequest> {
        self.index.get(&number).and_then(|&pos| self.items.get(pos))
    }

    /// Record at display position `pos`.
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<&PullRequest> {
        self.items.get(pos)
    }

    /// All records in store order.
    #[must_use]
    pub fn as_slice(&self) -> &[PullRequest] {
        &self.items
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}
