//! Hidden tautology addition, hidden blocked clause elimination and covered literal addition.
//!
//! Extends plain blocked clause elimination (`crate::blocked`) with two closure steps before the
//! tautology/blocking check, both per spec.md §4.11:
//! - **Hidden literal addition**: for `l` in the extended set `L`, if `!l` occurs in exactly one
//!   other clause and that clause is binary (`!l v m`), falsifying `l` forces `m`, so `m` behaves
//!   as if it were already in `L` for the purpose of the blocking/tautology check (though it is
//!   never written back into the stored clause).
//! - **Covered literal addition** (existential pivots only): if every clause containing `-l`
//!   shares a common literal `q` quantified no later than `l`, falsifying `l` forces `q` by
//!   resolution regardless of which of those clauses is the "real" reason, so `q` joins `L` too.
//!
//! The two closures run to a shared fixpoint: each may unlock further additions of the other kind
//! (e.g. a covered literal can itself have a unique binary partner). Once neither finds anything,
//! `L`'s tautology/blocking status is checked exactly as plain BCE checks the literal clause.
use qbfpre_formula::Lit;
use qbfpre_proof::Justification;

use crate::clause::ClauseId;
use crate::engine::Engine;

impl Engine {
    fn hidden_literal_addition(&self, extended: &[Lit]) -> Option<Lit> {
        for &lit in extended {
            if self.store.occurrence_count(!lit) != 1 {
                continue;
            }
            let only_id = self.store.occurrences(!lit).next().unwrap();
            let only_clause = &self.store.get(only_id).lits;
            if only_clause.len() != 2 {
                continue;
            }
            let m = if only_clause[0] == !lit {
                only_clause[1]
            } else {
                only_clause[0]
            };
            if !extended.contains(&m) && !extended.contains(&!m) {
                return Some(m);
            }
        }
        None
    }

    /// For an existential `l` in `extended`, finds a literal common to every clause containing
    /// `-l` that is quantified no later than `l`, if one exists and isn't already in `extended`.
    fn covered_literal_addition(&self, extended: &[Lit]) -> Option<Lit> {
        for &lit in extended {
            if !self.is_existential(lit) || extended.contains(&!lit) {
                continue;
            }
            let clause_ids: Vec<_> = self.store.occurrences(!lit).collect();
            if clause_ids.is_empty() {
                continue;
            }
            let lit_order = self.var_record(lit.var()).scope_order;
            let mut common: Option<Vec<Lit>> = None;
            for &id in &clause_ids {
                let other_lits: Vec<Lit> = self
                    .store
                    .get(id)
                    .lits
                    .iter()
                    .copied()
                    .filter(|&q| q != !lit)
                    .collect();
                common = Some(match common {
                    None => other_lits,
                    Some(prev) => prev.into_iter().filter(|q| other_lits.contains(q)).collect(),
                });
                if common.as_ref().map_or(false, |c| c.is_empty()) {
                    break;
                }
            }
            if let Some(candidates) = common {
                for q in candidates {
                    if !extended.contains(&q) && self.var_record(q.var()).scope_order <= lit_order {
                        return Some(q);
                    }
                }
            }
        }
        None
    }

    /// Computes the hidden/covered literal closure of `base`, without touching the stored clause.
    fn hidden_extension(&self, base: &[Lit]) -> Vec<Lit> {
        let mut extended = base.to_vec();
        loop {
            if let Some(m) = self.hidden_literal_addition(&extended) {
                extended.push(m);
                continue;
            }
            if let Some(q) = self.covered_literal_addition(&extended) {
                extended.push(q);
                continue;
            }
            return extended;
        }
    }

    fn is_blocking_literal_in(&self, id: ClauseId, extended: &[Lit], lit: Lit) -> bool {
        for other_id in self.store.occurrences(!lit) {
            if other_id == id {
                continue;
            }
            let other = &self.store.get(other_id).lits;
            if !self.resolvent_is_tautological(extended, lit, other) {
                return false;
            }
        }
        true
    }

    /// Tries hidden blocked clause elimination on `id`: compute the hidden extension, then run
    /// the ordinary blocking check against the extension instead of the literal clause.
    pub(crate) fn try_hidden_block_clause(&mut self, id: ClauseId) -> bool {
        let lits = self.store.get(id).lits.clone();
        let extended = self.hidden_extension(&lits);
        if extended.len() == lits.len() {
            return false; // no hidden literals found, plain BCE already covers this case.
        }
        for &lit in &lits {
            if !self.is_blocking_literal_in(id, &extended, lit) {
                continue;
            }
            if self.is_existential(lit) {
                self.emit_delete(id, Justification::Rate, Some("hidden blocked clause"));
                self.store.delete(id);
                self.stats.blocked_clauses += 1;
            } else {
                let new_lits: Vec<Lit> = lits.iter().copied().filter(|&l| l != lit).collect();
                self.emit_add(
                    None,
                    &new_lits,
                    Justification::Ble,
                    Some("hidden blocked literal"),
                );
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

    /// True if the hidden extension of `lits` contains a literal and its negation (a hidden
    /// tautology): the clause is always satisfied and can be deleted outright.
    pub(crate) fn is_hidden_tautology(&self, lits: &[Lit]) -> bool {
        let extended = self.hidden_extension(lits);
        extended
            .iter()
            .any(|&lit| extended.iter().any(|&other| other == !lit))
    }

    pub(crate) fn run_hidden_elimination(&mut self) -> usize {
        let ids: Vec<_> = self.store.iter_ids().collect();
        let mut changed = 0;
        for id in ids {
            if self.store.is_deleted(id) {
                continue;
            }
            let lits = self.store.get(id).lits.clone();
            if self.is_hidden_tautology(&lits) {
                self.emit_delete(id, Justification::Rate, Some("hidden tautology"));
                self.store.delete(id);
                self.stats.hidden_tautologies += 1;
                changed += 1;
                continue;
            }
            if self.try_hidden_block_clause(id) {
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
    fn hidden_literal_reveals_a_tautology() {
        // -1 occurs only in (−1 v 2), so 1's clause (1 v −2) hides a tautology once 2 is added.
        let mut engine = Engine::new(Options::default());
        engine
            .vars
            .resize_with(2, || crate::var::VarRecord::new(Polarity::Existential, 0));
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(2)]);
        let lits = vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)];
        assert!(engine.is_hidden_tautology(&lits));
    }
}
