//! Forward and backward subsumption, and self-subsuming resolution.
//!
//! All clauses in the store are kept sorted by [`Lit`]'s derived `Ord`, which lets subset checks
//! between two clauses run as a linear merge instead of a nested scan. Candidates are prefiltered
//! by clause signature (see `crate::sig`) before the literal-level check.
use qbfpre_formula::Lit;
use qbfpre_proof::Justification;

use crate::clause::ClauseId;
use crate::engine::Engine;
use crate::sig::{clause_signature, may_be_subset};

/// Is `sub` (sorted) a subset of `sup` (sorted)?
pub(crate) fn is_subset(sub: &[Lit], sup: &[Lit]) -> bool {
    if sub.len() > sup.len() {
        return false;
    }
    let mut sup_iter = sup.iter();
    'outer: for &lit in sub {
        for &other in sup_iter.by_ref() {
            if other == lit {
                continue 'outer;
            }
            if other > lit {
                return false;
            }
        }
        return false;
    }
    true
}

impl Engine {
    /// Runs forward/backward subsumption and self-subsuming resolution to a fixpoint over the
    /// current subsumption queue. Returns the number of clauses removed or strengthened.
    pub(crate) fn run_subsumption(&mut self) -> usize {
        let mut progress = 0;
        while let Some(id) = self.store.dequeue_subsumption() {
            if self.store.is_deleted(id) {
                continue;
            }
            if self.backward_subsume(id) {
                progress += 1;
                continue;
            }
            progress += self.forward_subsume(id);
            progress += self.self_subsuming_resolve(id);
        }
        progress
    }

    /// Checks whether an existing, shorter-or-equal clause already subsumes `id`. If so, deletes
    /// `id` and returns `true`.
    fn backward_subsume(&mut self, id: ClauseId) -> bool {
        let lits = self.store.get(id).lits.clone();
        if lits.is_empty() {
            return false;
        }
        let sig = clause_signature(&lits);
        let pivot = lits[0];
        let candidates: Vec<_> = self.store.occurrences(pivot).collect();
        for other in candidates {
            if other == id || self.store.is_deleted(other) {
                continue;
            }
            let other_lits = &self.store.get(other).lits;
            if other_lits.len() > lits.len() {
                continue;
            }
            if !may_be_subset(clause_signature(other_lits), sig) {
                continue;
            }
            if is_subset(other_lits, &lits) {
                self.emit_delete(id, Justification::Rate, Some("subsumed"));
                self.store.delete(id);
                self.stats.clauses_subsumed += 1;
                return true;
            }
        }
        false
    }

    /// Checks whether `id` subsumes any existing, longer-or-equal clauses, deleting them.
    fn forward_subsume(&mut self, id: ClauseId) -> usize {
        let lits = self.store.get(id).lits.clone();
        if lits.is_empty() {
            return 0;
        }
        let sig = clause_signature(&lits);
        let pivot = lits[0];
        let candidates: Vec<_> = self.store.occurrences(pivot).collect();
        let mut removed = 0;
        for other in candidates {
            if other == id || self.store.is_deleted(other) {
                continue;
            }
            let other_lits = self.store.get(other).lits.clone();
            if other_lits.len() < lits.len() {
                continue;
            }
            if !may_be_subset(sig, clause_signature(&other_lits)) {
                continue;
            }
            if is_subset(&lits, &other_lits) {
                self.emit_delete(other, Justification::Rate, Some("subsumed"));
                self.store.delete(other);
                self.stats.clauses_subsumed += 1;
                removed += 1;
            }
        }
        removed
    }

    /// For each literal `l` of `id`, looks for a clause containing `!l` whose remaining literals
    /// are a subset of `id`'s remaining literals; such a clause can be strengthened by dropping
    /// `!l` (self-subsuming resolution).
    fn self_subsuming_resolve(&mut self, id: ClauseId) -> usize {
        let lits = self.store.get(id).lits.clone();
        let mut strengthened = 0;
        for &lit in &lits {
            let rest: Vec<Lit> = lits.iter().copied().filter(|&l| l != lit).collect();
            let candidates: Vec<_> = self.store.occurrences(!lit).collect();
            for other in candidates {
                if other == id || self.store.is_deleted(other) {
                    continue;
                }
                let other_lits = self.store.get(other).lits.clone();
                let other_rest: Vec<Lit> =
                    other_lits.iter().copied().filter(|&l| l != !lit).collect();
                if other_rest.len() < rest.len() {
                    continue;
                }
                if is_subset(&rest, &other_rest) {
                    let new_lits: Vec<Lit> =
                        other_lits.iter().copied().filter(|&l| l != !lit).collect();
                    self.emit_add(
                        None,
                        &new_lits,
                        Justification::Rata,
                        Some("self-subsuming resolution"),
                    );
                    self.emit_delete(other, Justification::Rata, None);
                    self.store.set_lits(other, new_lits.clone());
                    self.store.enqueue_subsumption(other);
                    self.stats.self_subsuming_resolutions += 1;
                    strengthened += 1;
                    if new_lits.len() == 1 {
                        self.trail_unit_from_strengthening(new_lits[0]);
                    }
                }
            }
        }
        strengthened
    }

    fn trail_unit_from_strengthening(&mut self, lit: Lit) {
        let _ = self.assign_and_simplify(lit);
        let _ = self.run_propagation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_check_matches_sorted_slices() {
        let sub = [Lit::from_dimacs(1), Lit::from_dimacs(3)];
        let sup = [Lit::from_dimacs(1), Lit::from_dimacs(2), Lit::from_dimacs(3)];
        assert!(is_subset(&sub, &sup));
        assert!(!is_subset(&sup, &sub));
    }

    #[test]
    fn backward_subsumption_removes_longer_duplicate() {
        use crate::config::Options;
        let mut engine = Engine::new(Options::default());
        engine.vars.resize_with(3, || {
            crate::var::VarRecord::new(qbfpre_formula::Polarity::Existential, 0)
        });
        engine
            .add_original_clause(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)])
            .unwrap();
        engine
            .add_original_clause(vec![
                Lit::from_dimacs(1),
                Lit::from_dimacs(2),
                Lit::from_dimacs(3),
            ])
            .unwrap();
        engine.run_subsumption();
        assert_eq!(engine.store.len(), 1);
    }
}
