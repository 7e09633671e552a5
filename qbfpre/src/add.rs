//! Clause addition pipeline: literal deduplication, tautology detection, trail-aware
//! simplification and handing the surviving clause to the store and subsumption queue.
//!
//! Ordering follows spec.md §4.1: triviality/duplicate check, forward subsumption, forward
//! strengthening, universal reduction, then allocate (or special-case the empty/unit result of
//! the earlier steps) — matching bloqqer's `add_clause`, which runs `forall_reduce_clause()`
//! unconditionally before its own size-0/size-1 special case.
use qbfpre_formula::Lit;
use qbfpre_proof::Justification;

use crate::engine::Engine;
use crate::sig::{clause_signature, may_be_subset};
use crate::subsumption::is_subset;

impl Engine {
    /// Adds a clause of the original formula (or a clause produced by a simplification rewrite
    /// that should re-enter the same pipeline, e.g. a resolvent). Returns `true` if this derives
    /// that the formula is false.
    pub(crate) fn add_original_clause(&mut self, mut lits: Vec<Lit>) -> Result<bool, crate::error::EngineError> {
        lits.sort_unstable();
        lits.dedup();

        for &lit in &lits {
            if lits.contains(&!lit) {
                // Tautological clause: always satisfied, contributes nothing.
                return Ok(false);
            }
        }

        lits.retain(|&lit| !self.trail.is_false(lit));
        if lits.iter().any(|&lit| self.trail.is_true(lit)) {
            return Ok(false);
        }

        if self.duplicate_exists(&lits) || self.forward_subsumed(&lits) {
            return Ok(false);
        }
        self.forward_strengthen(&mut lits);
        lits = self.universal_reduce_vec(&lits);

        if lits.is_empty() {
            return Ok(true);
        }

        if lits.len() == 1 {
            self.set_tag(lits[0].var(), crate::var::Tag::Unit, Some(lits[0].is_positive()));
            let conflict = self.assign_and_simplify(lits[0]);
            let ran_out = self.run_propagation();
            return Ok(conflict || ran_out);
        }

        self.store_simplified_clause(lits);
        Ok(false)
    }

    /// True if an already-stored clause has exactly the same (sorted, deduped) literals.
    fn duplicate_exists(&self, lits: &[Lit]) -> bool {
        let hash = qbfpre_proof::clause_hash(lits);
        self.store
            .candidates_with_hash(hash)
            .any(|id| self.store.get(id).lits == lits)
    }

    /// True if some already-stored clause is a subset of `lits`, which makes `lits` redundant
    /// before it is ever allocated.
    fn forward_subsumed(&self, lits: &[Lit]) -> bool {
        if lits.is_empty() {
            return false;
        }
        let sig = clause_signature(lits);
        let candidates: Vec<_> = self.store.occurrences(lits[0]).collect();
        candidates.into_iter().any(|other| {
            let other_lits = &self.store.get(other).lits;
            other_lits.len() <= lits.len()
                && may_be_subset(clause_signature(other_lits), sig)
                && is_subset(other_lits, lits)
        })
    }

    /// Strengthens `lits` in place by self-subsuming resolution against already-stored clauses:
    /// for each literal `x`, a stored clause containing `!x` whose remaining literals are a
    /// subset of `lits`'s remaining literals lets `x` be dropped. Repeats to a fixpoint.
    fn forward_strengthen(&mut self, lits: &mut Vec<Lit>) {
        loop {
            let mut stripped = None;
            'search: for (pos, &x) in lits.iter().enumerate() {
                let rest: Vec<Lit> = lits.iter().copied().filter(|&l| l != x).collect();
                for other in self.store.occurrences(!x) {
                    let other_lits = &self.store.get(other).lits;
                    let other_rest: Vec<Lit> = other_lits.iter().copied().filter(|&l| l != !x).collect();
                    if other_rest.len() <= rest.len() && is_subset(&other_rest, &rest) {
                        stripped = Some(pos);
                        break 'search;
                    }
                }
            }
            match stripped {
                Some(pos) => {
                    lits.remove(pos);
                }
                None => break,
            }
        }
    }

    fn store_simplified_clause(&mut self, lits: Vec<Lit>) {
        self.record_clause_length(lits.len());
        let id = self.store.alloc(lits.clone());
        self.store.enqueue_subsumption(id);
        self.emit_add(None, &lits, Justification::Rata, None);
        for lit in lits {
            self.bump_elim_score(lit.var());
        }
    }

    pub(crate) fn bump_elim_score(&mut self, var: qbfpre_formula::Var) {
        if !self.is_existential(var.positive()) {
            return;
        }
        let pos = self.store.occurrence_count(var.positive()) as u32;
        let neg = self.store.occurrence_count(var.negative()) as u32;
        self.heap.set_score(var, pos.saturating_add(neg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    #[test]
    fn tautological_clause_is_dropped() {
        let mut engine = Engine::new(Options::default());
        engine.vars.resize_with(2, || {
            crate::var::VarRecord::new(qbfpre_formula::Polarity::Existential, 0)
        });
        let lits = vec![Lit::from_dimacs(1), Lit::from_dimacs(-1)];
        assert_eq!(engine.add_original_clause(lits).unwrap(), false);
        assert_eq!(engine.store.len(), 0);
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut engine = Engine::new(Options::default());
        assert_eq!(engine.add_original_clause(vec![]).unwrap(), true);
    }

    #[test]
    fn unit_clause_propagates() {
        let mut engine = Engine::new(Options::default());
        engine.vars.resize_with(2, || {
            crate::var::VarRecord::new(qbfpre_formula::Polarity::Existential, 0)
        });
        engine
            .add_original_clause(vec![Lit::from_dimacs(1)])
            .unwrap();
        assert!(engine.trail.is_true(Lit::from_dimacs(1)));
    }
}
