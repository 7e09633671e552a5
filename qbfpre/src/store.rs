//! The clause database: a chronological arena, a content-addressed hash index used to detect
//! duplicate/tautological additions, and per-literal occurrence lists.
//!
//! This plays the role `varisat::clause::ClauseAlloc` and `varisat::prop::Watchlists` play for the
//! CDCL solver, but uses plain indices into a `Vec` instead of an unsafe bump allocator, since
//! clauses here are short-lived and frequently resized by simplification rather than pinned for
//! the duration of a search.
use rustc_hash::FxHashMap;

use qbfpre_formula::Lit;
use qbfpre_proof::{clause_hash, ClauseHash};

use crate::clause::{Clause, ClauseId};

#[derive(Default)]
pub struct ClauseStore {
    clauses: Vec<Clause>,
    occ: Vec<Vec<ClauseId>>,
    by_hash: FxHashMap<ClauseHash, Vec<ClauseId>>,
    subsumption_queue: Vec<ClauseId>,
    live_count: usize,
}

impl ClauseStore {
    pub fn new() -> Self {
        ClauseStore::default()
    }

    fn ensure_occ_len(&mut self, code: usize) {
        if self.occ.len() <= code {
            self.occ.resize_with(code + 1, Vec::new);
        }
    }

    /// Adds a new clause to the store and returns its id.
    ///
    /// Does not check for duplicates or tautologies; callers run those checks first (see
    /// `crate::add`) since the decision of what to do with a duplicate/tautology is
    /// operation-specific.
    pub fn alloc(&mut self, lits: Vec<Lit>) -> ClauseId {
        let hash = clause_hash(&lits);
        let id = ClauseId(self.clauses.len() as u32);
        for &lit in &lits {
            self.ensure_occ_len(lit.code());
            self.occ[lit.code()].push(id);
        }
        self.clauses.push(Clause {
            lits,
            hash,
            deleted: false,
            in_subsumption_queue: false,
        });
        self.by_hash.entry(hash).or_default().push(id);
        self.live_count += 1;
        id
    }

    pub fn get(&self, id: ClauseId) -> &Clause {
        &self.clauses[id.index()]
    }

    pub fn get_mut(&mut self, id: ClauseId) -> &mut Clause {
        &mut self.clauses[id.index()]
    }

    pub fn is_deleted(&self, id: ClauseId) -> bool {
        self.clauses[id.index()].deleted
    }

    pub fn delete(&mut self, id: ClauseId) {
        let clause = &mut self.clauses[id.index()];
        if clause.deleted {
            return;
        }
        clause.deleted = true;
        self.live_count -= 1;
    }

    /// Replaces a clause's literals in place, e.g. after self-subsuming resolution or universal
    /// reduction shortens it. Updates the occurrence lists and hash.
    pub fn set_lits(&mut self, id: ClauseId, lits: Vec<Lit>) {
        let old_lits = std::mem::replace(&mut self.clauses[id.index()].lits, lits.clone());
        for lit in old_lits {
            if let Some(pos) = self.occ[lit.code()].iter().position(|&c| c == id) {
                self.occ[lit.code()].swap_remove(pos);
            }
        }
        for &lit in &lits {
            self.ensure_occ_len(lit.code());
            self.occ[lit.code()].push(id);
        }
        self.clauses[id.index()].hash = clause_hash(&lits);
    }

    /// Iterator over the (possibly stale) occurrence list of a literal. Callers must filter with
    /// [`ClauseStore::is_deleted`].
    pub fn occurrences(&self, lit: Lit) -> impl Iterator<Item = ClauseId> + '_ {
        self.occ
            .get(lit.code())
            .into_iter()
            .flatten()
            .copied()
            .filter(move |&id| !self.is_deleted(id))
    }

    pub fn occurrence_count(&self, lit: Lit) -> usize {
        self.occurrences(lit).count()
    }

    /// All ids of clauses that have never been deleted, in allocation order.
    pub fn iter_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        (0..self.clauses.len())
            .map(|index| ClauseId(index as u32))
            .filter(move |&id| !self.is_deleted(id))
    }

    pub fn len(&self) -> usize {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    pub fn candidates_with_hash(&self, hash: ClauseHash) -> impl Iterator<Item = ClauseId> + '_ {
        self.by_hash
            .get(&hash)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |&id| !self.is_deleted(id))
    }

    pub fn enqueue_subsumption(&mut self, id: ClauseId) {
        let clause = &mut self.clauses[id.index()];
        if clause.deleted || clause.in_subsumption_queue {
            return;
        }
        clause.in_subsumption_queue = true;
        self.subsumption_queue.push(id);
    }

    pub fn dequeue_subsumption(&mut self) -> Option<ClauseId> {
        while let Some(id) = self.subsumption_queue.pop() {
            let clause = &mut self.clauses[id.index()];
            clause.in_subsumption_queue = false;
            if !clause.deleted {
                return Some(id);
            }
        }
        None
    }

    /// Rebuilds the arena without deleted clauses, compacting ids and occurrence lists.
    ///
    /// Invalidates any previously returned [`ClauseId`] that is not re-derived from the returned
    /// remapping.
    pub fn compact(&mut self) -> Vec<Option<ClauseId>> {
        let mut remap = vec![None; self.clauses.len()];
        let mut new_clauses = Vec::with_capacity(self.live_count);
        for (old_index, clause) in self.clauses.iter().enumerate() {
            if clause.deleted {
                continue;
            }
            let new_id = ClauseId(new_clauses.len() as u32);
            remap[old_index] = Some(new_id);
            new_clauses.push(clause.clone());
        }
        self.clauses = new_clauses;
        for occ in &mut self.occ {
            occ.retain(|id| remap[id.index()].is_some());
            for id in occ.iter_mut() {
                *id = remap[id.index()].unwrap();
            }
        }
        for ids in self.by_hash.values_mut() {
            ids.retain(|id| remap[id.index()].is_some());
            for id in ids.iter_mut() {
                *id = remap[id.index()].unwrap();
            }
        }
        self.by_hash.retain(|_, ids| !ids.is_empty());
        self.subsumption_queue.clear();
        remap
    }
}
