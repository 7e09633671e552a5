//! Existential variable elimination by resolution.
//!
//! Grounded on the cost-driven elimination loop in `minisat-rust`'s `simp.rs`
//! (`Solver::eliminate_var`, cost estimated as `n_occ(+x) * n_occ(-x)` via its `ElimQueue`): a
//! variable is only eliminated if resolving away every clause it occurs in does not grow the
//! formula by more than `Options::elim_excess` literals. Universal variables are never eliminated
//! this way; they are handled by `crate::expand` instead.
use qbfpre_formula::{Lit, Var};
use qbfpre_proof::Justification;

use crate::clause::ClauseId;
use crate::engine::Engine;
use crate::var::Tag;

impl Engine {
    fn resolve_on(&self, pos_id: ClauseId, pivot: Var, neg_id: ClauseId) -> Option<Vec<Lit>> {
        let pos_lits = &self.store.get(pos_id).lits;
        let neg_lits = &self.store.get(neg_id).lits;
        let mut result: Vec<Lit> = pos_lits
            .iter()
            .copied()
            .filter(|&l| l.var() != pivot)
            .collect();
        for &lit in neg_lits {
            if lit.var() == pivot {
                continue;
            }
            if result.contains(&!lit) {
                return None;
            }
            if !result.contains(&lit) {
                result.push(lit);
            }
        }
        result.sort_unstable();
        Some(self.universal_reduce_vec(&result))
    }

    /// Attempts to eliminate `var` by resolution. Returns `true` if it was eliminated.
    pub(crate) fn try_eliminate_variable(&mut self, var: Var) -> bool {
        if self.vars[var.index()].tag != Tag::Free || !self.is_existential(var.positive()) {
            return false;
        }

        let pos_ids: Vec<_> = self.store.occurrences(var.positive()).collect();
        let neg_ids: Vec<_> = self.store.occurrences(var.negative()).collect();
        if pos_ids.is_empty() || neg_ids.is_empty() {
            // A unary-polarity variable should already have been handled by pure literal
            // propagation; nothing to resolve away here.
            return false;
        }

        let old_lit_count: i64 = pos_ids
            .iter()
            .chain(neg_ids.iter())
            .map(|&id| self.store.get(id).lits.len() as i64)
            .sum();

        let mut resolvents = Vec::with_capacity(pos_ids.len() * neg_ids.len());
        for &p in &pos_ids {
            for &n in &neg_ids {
                if let Some(resolvent) = self.resolve_on(p, var, n) {
                    resolvents.push(resolvent);
                }
            }
        }

        let new_lit_count: i64 = resolvents.iter().map(|r| r.len() as i64).sum();
        if new_lit_count - old_lit_count > self.options.elim_excess {
            return false;
        }

        for id in pos_ids.iter().chain(neg_ids.iter()) {
            self.emit_delete(*id, Justification::Rate, Some("variable elimination"));
            self.store.delete(*id);
        }
        self.set_tag(var, Tag::Eliminated, None);
        self.stats.variables_eliminated += 1;

        for resolvent in resolvents {
            let _ = self.add_original_clause(resolvent);
        }
        true
    }

    /// Runs variable elimination over every eligible existential variable currently on the
    /// elimination heap, picking the cheapest-looking candidate first. Returns the number of
    /// variables eliminated.
    pub(crate) fn run_variable_elimination(&mut self) -> usize {
        let mut eliminated = 0;
        while let Some(var) = self.heap.pop() {
            if self.try_eliminate_variable(var) {
                eliminated += 1;
            }
        }
        eliminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use qbfpre_formula::Polarity;

    #[test]
    fn eliminates_variable_without_growing_the_formula() {
        // (1 v 2) & (-1 v 3) resolve away 1 into (2 v 3), 1 clause for 2 clauses: no growth.
        let mut engine = Engine::new(Options::default());
        engine
            .vars
            .resize_with(3, || crate::var::VarRecord::new(Polarity::Existential, 0));
        engine
            .store
            .alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(3)]);
        assert!(engine.try_eliminate_variable(Var::from_dimacs(1)));
        assert_eq!(engine.store.len(), 1);
        assert_eq!(
            engine.store.get(engine.store.iter_ids().next().unwrap()).lits,
            vec![Lit::from_dimacs(2), Lit::from_dimacs(3)]
        );
    }

    #[test]
    fn refuses_elimination_that_grows_the_formula_too_much() {
        // 2 positive clauses x 3 negative clauses = 6 resolvents (12 literals) from 5 original
        // clauses (10 literals): exceeds the default zero-excess budget.
        let mut engine = Engine::new(Options::default());
        engine
            .vars
            .resize_with(7, || crate::var::VarRecord::new(Polarity::Existential, 0));
        engine
            .store
            .alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(3)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(4)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(5)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(6)]);
        assert!(!engine.try_eliminate_variable(Var::from_dimacs(1)));
    }
}
