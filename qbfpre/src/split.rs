//! Long clause splitting.
//!
//! Rewrites a clause longer than `Options::split_limit` into a chain of clauses of at most
//! `split_limit` literals each, linked by fresh existential variables, the reverse of the growth
//! resolution-based simplification can cause. Each fresh variable is placed in the innermost
//! existential scope at or after every literal used to define it, which is always sound (an
//! existential can be pushed inward without changing what it's allowed to depend on) even if not
//! always the tightest possible placement.
//!
//! Grounded directly on `bloqqer.c`'s `split_clause`: the first output clause takes
//! `split_limit - 1` original literals plus one fresh literal closing it off; each following
//! clause (while more than `split_limit - 1` literals remain) takes the previous fresh literal,
//! `split_limit - 2` more original literals, and a new fresh literal; the final clause takes the
//! last fresh literal plus whatever's left (between 2 and `split_limit - 1` literals).
use qbfpre_formula::Lit;
use qbfpre_proof::Justification;

use crate::clause::ClauseId;
use crate::engine::Engine;

impl Engine {
    fn existential_scope_at_or_after(&self, order: usize) -> usize {
        self.prefix
            .scopes()
            .iter()
            .find(|scope| scope.order >= order && scope.polarity.is_existential())
            .map(|scope| scope.order)
            .unwrap_or_else(|| {
                self.prefix
                    .scopes()
                    .iter()
                    .rev()
                    .find(|scope| scope.polarity.is_existential())
                    .map(|scope| scope.order)
                    .unwrap_or(0)
            })
    }

    fn split_clause(&mut self, id: ClauseId) -> bool {
        let lits = self.store.get(id).lits.clone();
        let limit = self.options.split_limit.max(3);
        if lits.len() <= limit {
            return false;
        }

        let max_order = lits
            .iter()
            .map(|&lit| self.var_record(lit.var()).scope_order)
            .max()
            .unwrap_or(0);
        let scope_order = self.existential_scope_at_or_after(max_order);

        let mut chain = Vec::new();
        let mut pos = limit - 1;
        let fresh = self.fresh_existential_var(scope_order).positive();
        let mut clause = lits[..pos].to_vec();
        clause.push(!fresh);
        chain.push(clause);
        let mut incoming = fresh;

        while lits.len() - pos > limit - 1 {
            let take = limit - 2;
            let next_fresh = self.fresh_existential_var(scope_order).positive();
            let mut clause = vec![incoming];
            clause.extend_from_slice(&lits[pos..pos + take]);
            clause.push(!next_fresh);
            chain.push(clause);
            pos += take;
            incoming = next_fresh;
        }

        let mut last_clause = vec![incoming];
        last_clause.extend_from_slice(&lits[pos..]);
        chain.push(last_clause);

        for new_clause in chain {
            self.emit_add(None, &new_clause, Justification::Rata, Some("clause split"));
            let _ = self.add_original_clause(new_clause);
        }

        self.emit_delete(id, Justification::Rate, Some("clause split"));
        self.store.delete(id);
        self.stats.clauses_split += 1;
        true
    }

    pub(crate) fn run_clause_splitting(&mut self) -> usize {
        if self.options.split_limit == 0 {
            return 0;
        }
        let ids: Vec<_> = self.store.iter_ids().collect();
        let mut changed = 0;
        for id in ids {
            if self.store.is_deleted(id) {
                continue;
            }
            if self.split_clause(id) {
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
    fn splits_long_clause_into_ternary_chain() {
        let mut options = Options::default();
        options.split_limit = 3;
        let mut engine = Engine::new(options);
        engine
            .vars
            .resize_with(5, || crate::var::VarRecord::new(Polarity::Existential, 0));
        let id = engine.store.alloc(vec![
            Lit::from_dimacs(1),
            Lit::from_dimacs(2),
            Lit::from_dimacs(3),
            Lit::from_dimacs(4),
            Lit::from_dimacs(5),
        ]);
        assert!(engine.split_clause(id));
        assert!(engine.store.is_deleted(id));
        // 5 literals split into ternary links produces 3 new clauses (n - 2).
        assert_eq!(engine.store.len(), 3);
        assert!(engine.store.iter_ids().all(|id| engine.store.get(id).lits.len() == 3));
    }

    #[test]
    fn split_limit_parameterizes_the_chain_width() {
        // a 5-literal clause at limit 4 only needs two 4-literal clauses: (1 2 3 -a)(a 4 5).
        let mut options = Options::default();
        options.split_limit = 4;
        let mut engine = Engine::new(options);
        engine
            .vars
            .resize_with(5, || crate::var::VarRecord::new(Polarity::Existential, 0));
        let id = engine.store.alloc(vec![
            Lit::from_dimacs(1),
            Lit::from_dimacs(2),
            Lit::from_dimacs(3),
            Lit::from_dimacs(4),
            Lit::from_dimacs(5),
        ]);
        assert!(engine.split_clause(id));
        assert_eq!(engine.store.len(), 2);
        assert!(engine.store.iter_ids().all(|id| engine.store.get(id).lits.len() <= 4));
    }
}
