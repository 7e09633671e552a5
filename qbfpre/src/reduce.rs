//! Universal reduction.
//!
//! A universal literal can be dropped from a clause once no existential literal still present in
//! that clause is quantified inside its scope: once nothing existential "after" it remains, the
//! universal no longer constrains which values the existentials can react with. Grounded on
//! bloqqer's `forall_reduce_clause`, which computes the same "largest existential scope order
//! still present" bound before stripping every universal literal past it in one pass.
use std::borrow::Cow;

use qbfpre_formula::Lit;
use qbfpre_proof::ProofStep;

use crate::clause::ClauseId;
use crate::engine::Engine;
use crate::var::Tag;

impl Engine {
    /// Strips every universal literal that is no longer bounded by a remaining existential
    /// literal. Returns `true` if the clause was changed.
    pub(crate) fn universal_reduce_clause(&mut self, id: ClauseId) -> bool {
        let mut lits = self.store.get(id).lits.clone();

        let max_existential_order = lits
            .iter()
            .filter(|&&lit| self.is_existential(lit))
            .map(|&lit| self.var_record(lit.var()).scope_order)
            .max();

        let mut changed = false;
        let mut stripped_vars = vec![];
        loop {
            let reducible_pos = lits.iter().position(|&lit| {
                self.is_universal(lit)
                    && match max_existential_order {
                        Some(max) => self.var_record(lit.var()).scope_order > max,
                        None => true,
                    }
            });
            let pos = match reducible_pos {
                Some(pos) => pos,
                None => break,
            };
            let pivot = lits[pos];
            if let Some(proof) = &mut self.proof {
                let _ = proof.write_step(&ProofStep::UniversalReduction {
                    pivot,
                    clause: Cow::Owned(lits.clone()),
                    message: None,
                });
            }
            lits.remove(pos);
            stripped_vars.push(pivot.var());
            self.stats.universal_reductions += 1;
            changed = true;
        }

        if changed {
            self.store.set_lits(id, lits.clone());
            self.store.enqueue_subsumption(id);
            // A stripped universal that no longer occurs anywhere was only ever constraining
            // clauses that have now all had it reduced away; it contributes nothing further.
            for var in stripped_vars {
                if self.store.occurrence_count(var.positive()) == 0
                    && self.store.occurrence_count(var.negative()) == 0
                {
                    self.set_tag(var, Tag::ForallReduced, None);
                }
            }
            if lits.len() == 1 {
                let _ = self.assign_and_simplify(lits[0]);
                let _ = self.run_propagation();
            }
        }
        changed
    }

    /// Strips trailing universal literals from a literal vector that isn't (yet) stored in the
    /// clause database, e.g. a freshly computed resolvent. Does not emit a proof step; callers
    /// that need one should reduce a stored clause with [`Engine::universal_reduce_clause`]
    /// instead.
    pub(crate) fn universal_reduce_vec(&self, lits: &[Lit]) -> Vec<Lit> {
        let mut lits = lits.to_vec();
        let max_existential_order = lits
            .iter()
            .filter(|&&lit| self.is_existential(lit))
            .map(|&lit| self.var_record(lit.var()).scope_order)
            .max();
        lits.retain(|&lit| {
            !self.is_universal(lit)
                || match max_existential_order {
                    Some(max) => self.var_record(lit.var()).scope_order <= max,
                    None => false,
                }
        });
        lits
    }

    /// Runs universal reduction over every live clause. Returns the number of clauses changed.
    pub(crate) fn run_universal_reduction(&mut self) -> usize {
        let ids: Vec<_> = self.store.iter_ids().collect();
        let mut changed = 0;
        for id in ids {
            if self.store.is_deleted(id) {
                continue;
            }
            if self.universal_reduce_clause(id) {
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use qbfpre_formula::{Lit, Polarity};

    #[test]
    fn strips_trailing_universal_literal() {
        let mut engine = Engine::new(Options::default());
        engine.vars.resize_with(2, || {
            crate::var::VarRecord::new(Polarity::Existential, 0)
        });
        engine.vars[1] = crate::var::VarRecord::new(Polarity::Universal, 1);
        let id = engine.store.alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        assert!(engine.universal_reduce_clause(id));
        assert_eq!(engine.store.get(id).lits, vec![Lit::from_dimacs(1)]);
    }

    #[test]
    fn keeps_universal_literal_bounding_an_existential() {
        let mut engine = Engine::new(Options::default());
        engine.vars.resize_with(2, || {
            crate::var::VarRecord::new(Polarity::Universal, 0)
        });
        engine.vars[1] = crate::var::VarRecord::new(Polarity::Existential, 1);
        let id = engine.store.alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        assert!(!engine.universal_reduce_clause(id));
    }
}
