//! Blocked clause elimination and blocked universal literal elimination.
//!
//! A literal `l` in clause `C` is blocking if every clause containing `!l` resolves with `C` on
//! `l` to a tautology. For an existential blocking literal the whole clause is redundant (nothing
//! can ever need `C` once `l` is fixed to satisfy it, since every clause that could force the
//! opposite is already satisfied some other way); for a universal blocking literal, only that
//! literal can be dropped, since the clause can't be deleted outright without risking the
//! universal's other values.
//!
//! Only outer-or-equal-scope witnesses count towards a tautology: resolving away a literal whose
//! variable is quantified inside the pivot does not actually prove the resolvent unsatisfiable
//! under every universal assignment, since that inner variable's value isn't fixed yet when the
//! pivot's clause is evaluated. Grounded on bloqqer.c's `block_clause_aux`, which computes
//! `porder = lit2scope(pivot)->order` and skips any witness literal with `lorder > porder`.
use qbfpre_formula::Lit;
use qbfpre_proof::Justification;

use crate::clause::ClauseId;
use crate::engine::Engine;

impl Engine {
    /// True if resolving `clause` and `other` on `lit` (`clause` has `lit`, `other` has `!lit`)
    /// yields a tautology, counting only witnesses quantified no later than `lit` itself.
    pub(crate) fn resolvent_is_tautological(&self, clause: &[Lit], lit: Lit, other: &[Lit]) -> bool {
        let pivot_order = self.var_record(lit.var()).scope_order;
        clause.iter().any(|&l| {
            l != lit
                && other.contains(&!l)
                && self.var_record(l.var()).scope_order <= pivot_order
        })
    }

    /// Checks whether `lit` (present in `id`) blocks the clause.
    pub(crate) fn is_blocking_literal(&self, id: ClauseId, lit: Lit) -> bool {
        let clause = &self.store.get(id).lits;
        for other_id in self.store.occurrences(!lit) {
            if other_id == id {
                continue;
            }
            let other = &self.store.get(other_id).lits;
            if !self.resolvent_is_tautological(clause, lit, other) {
                return false;
            }
        }
        true
    }

    /// Tries to eliminate `id` as a blocked clause, or strike a blocked universal literal from
    /// it. Returns `true` if the clause was deleted or changed.
    pub(crate) fn try_block_clause(&mut self, id: ClauseId) -> bool {
        let lits = self.store.get(id).lits.clone();
        for &lit in &lits {
            if !self.is_blocking_literal(id, lit) {
                continue;
            }
            if self.is_existential(lit) {
                self.emit_delete(id, Justification::Rate, Some("blocked clause"));
                self.store.delete(id);
                self.stats.blocked_clauses += 1;
            } else {
                let new_lits: Vec<Lit> = lits.iter().copied().filter(|&l| l != lit).collect();
                self.emit_add(None, &new_lits, Justification::Ble, Some("blocked literal"));
                self.emit_delete(id, Justification::Ble, None);
                self.store.set_lits(id, new_lits.clone());
                self.store.enqueue_subsumption(id);
                self.stats.blocked_literals += 1;
                if new_lits.len() == 1 {
                    let _ = self.assign_and_simplify(new_lits[0]);
                    let _ = self.run_propagation();
                }
            }
            return true;
        }
        false
    }

    /// Runs blocked clause/literal elimination over every live clause. Returns the number of
    /// clauses changed or removed.
    pub(crate) fn run_blocked_clause_elimination(&mut self) -> usize {
        let ids: Vec<_> = self.store.iter_ids().collect();
        let mut changed = 0;
        for id in ids {
            if self.store.is_deleted(id) {
                continue;
            }
            if self.try_block_clause(id) {
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
    use qbfpre_formula::Polarity;

    #[test]
    fn clause_blocked_by_unopposed_literal_is_removed() {
        // (1 v 2) is blocked on 1 since no other clause contains -1.
        let mut engine = Engine::new(Options::default());
        engine
            .vars
            .resize_with(2, || crate::var::VarRecord::new(Polarity::Existential, 0));
        let id = engine.store.alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        assert!(engine.try_block_clause(id));
        assert!(engine.store.is_deleted(id));
    }

    #[test]
    fn clause_with_opposing_unsatisfiable_resolvent_is_not_blocked() {
        let mut engine = Engine::new(Options::default());
        engine
            .vars
            .resize_with(2, || crate::var::VarRecord::new(Polarity::Existential, 0));
        let id = engine.store.alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        engine.store.alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(-2)]);
        assert!(!engine.try_block_clause(id));
    }
}
