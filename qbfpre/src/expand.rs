//! Universal variable expansion.
//!
//! Grounded on the structure of bloqqer's `expand_cost`/`expand_clause`/`expand` family: compute a
//! universal variable's dependency cone, price it with the same `axcess` metric bloqqer uses, then
//! case-split on the universal. Bloqqer's case split is asymmetric: the branch where `u` is false
//! keeps every cone existential's original variable, and only the branch where `u` is true renames
//! the cone's existentials to fresh copies (`in_innermost_ublock`/`univ_mini` gate whether a second
//! live universal is tolerated inside the cone). A single fresh copy per cone existential is enough
//! because the false branch's copy is exactly the variable the rest of the formula already uses.
//!
//! This implementation handles the case where a universal's cone is "closed": every existential
//! variable that shares a clause with `u` appears in *no* clause that doesn't also mention `u`.
//! That is enough to expand by rewriting only the clauses that mention `u`, which keeps the
//! rewrite local and easy to verify sound; a cone that reaches outside `u`'s own clauses is left
//! alone rather than attempting the more general cross-cutting expansion bloqqer supports. See
//! DESIGN.md.
use std::collections::HashMap;

use qbfpre_formula::{Lit, Var};
use qbfpre_proof::Justification;

use crate::engine::Engine;
use crate::var::Tag;

impl Engine {
    /// True if no universal scope lies further in than `order` — i.e. a universal at `order` has
    /// no universal quantified inside it.
    fn universal_scope_is_innermost(&self, order: usize) -> bool {
        !self
            .prefix
            .scopes()
            .iter()
            .any(|scope| scope.polarity.is_universal() && scope.order > order)
    }

    /// Collects `u`'s cone: the existential variables that co-occur with `u` and depend on it
    /// (quantified inside it, or reaching past it via a same-polarity scope's `stretch`), provided
    /// every such existential's occurrences are confined to clauses that also mention `u`. Bails
    /// out if another live universal shares a clause with `u` and `u` is neither in the innermost
    /// universal block nor covered by `Options::miniscoping`.
    fn expansion_cone(&self, u: Var) -> Option<(Vec<crate::clause::ClauseId>, Vec<Var>)> {
        let u_order = self.var_record(u).scope_order;
        let clauses: Vec<_> = self
            .store
            .occurrences(u.positive())
            .chain(self.store.occurrences(u.negative()))
            .collect();
        if clauses.is_empty() {
            return None;
        }
        let innermost = self.universal_scope_is_innermost(u_order);

        let mut cone = vec![];
        for &id in &clauses {
            for &lit in &self.store.get(id).lits {
                let v = lit.var();
                if v == u || self.vars[v.index()].tag != Tag::Free {
                    continue;
                }
                if self.is_universal(lit) {
                    if !(innermost || self.options.miniscoping) {
                        return None;
                    }
                    continue;
                }
                let scope_order = self.var_record(v).scope_order;
                let stretches_past_u = self
                    .prefix
                    .scopes()
                    .iter()
                    .find(|scope| scope.order == scope_order)
                    .map(|scope| scope.stretch >= u_order)
                    .unwrap_or(false);
                if (scope_order > u_order || stretches_past_u) && !cone.contains(&v) {
                    cone.push(v);
                }
            }
        }

        for &e in &cone {
            let all_occurrences: Vec<_> = self
                .store
                .occurrences(e.positive())
                .chain(self.store.occurrences(e.negative()))
                .collect();
            if all_occurrences.iter().any(|id| !clauses.contains(id)) {
                return None;
            }
        }

        Some((clauses, cone))
    }

    /// The `axcess` cost of expanding around `cone`: the total occurrences of the cone's
    /// existentials (the part of the blow-up that isn't `u` itself, which cancels out of bloqqer's
    /// "clauses touched by the cone minus the occurrences of `u`" formula exactly).
    fn expansion_cost(&self, cone: &[Var]) -> usize {
        cone.iter()
            .map(|&e| self.store.occurrence_count(e.positive()) + self.store.occurrence_count(e.negative()))
            .sum()
    }

    /// Expands `u` if its cone is closed and within the `axcess` budget. Returns `true` if
    /// expanded.
    pub(crate) fn try_expand_variable(&mut self, u: Var) -> bool {
        let (clauses, cone) = match self.expansion_cone(u) {
            Some(result) => result,
            None => return false,
        };
        if self.expansion_cost(&cone) > self.options.axcess {
            return false;
        }

        let mut positive_copy = HashMap::new();
        for &e in &cone {
            let order = self.var_record(e).scope_order;
            positive_copy.insert(e, self.fresh_existential_var(order));
        }

        for &id in &clauses {
            let lits = self.store.get(id).lits.clone();
            let has_u = lits.contains(&u.positive());
            let has_not_u = lits.contains(&u.negative());

            // u := false, cone existentials keep their original variables.
            if !has_not_u {
                let new_lits: Vec<Lit> = lits.iter().copied().filter(|&l| l.var() != u).collect();
                self.emit_add(None, &new_lits, Justification::Rata, Some("universal expansion, false branch"));
                let _ = self.add_original_clause(new_lits);
            }
            // u := true, cone existentials renamed to their fresh positive-branch copy.
            if !has_u {
                let new_lits: Vec<Lit> = lits
                    .iter()
                    .copied()
                    .filter(|&l| l.var() != u)
                    .map(|l| match positive_copy.get(&l.var()) {
                        Some(&copy) => Lit::from_var(copy, l.is_positive()),
                        None => l,
                    })
                    .collect();
                self.emit_add(None, &new_lits, Justification::Rata, Some("universal expansion, true branch"));
                let _ = self.add_original_clause(new_lits);
            }
            self.emit_delete(id, Justification::Rate, Some("universal expansion"));
            self.store.delete(id);
        }

        // Every occurrence of a cone variable was in one of u's clauses (the closed-cone
        // invariant), all of which were just rewritten above; the original variable now only
        // stands for the false branch and the fresh copy only for the true branch, so both are
        // retired from the prefix under their own name.
        for &e in &cone {
            self.set_tag(e, Tag::Expanded, None);
        }
        self.set_tag(u, Tag::Expanded, Some(false));
        self.stats.variables_expanded += 1;
        true
    }

    pub(crate) fn run_universal_expansion(&mut self) -> usize {
        let universal_vars: Vec<_> = (0..self.vars.len())
            .map(Var::from_index)
            .filter(|&v| self.vars[v.index()].tag == Tag::Free && self.is_universal(v.positive()))
            .collect();
        let mut expanded = 0;
        for var in universal_vars {
            if self.vars[var.index()].tag != Tag::Free {
                continue;
            }
            if self.try_expand_variable(var) {
                expanded += 1;
            }
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use qbfpre_formula::Polarity;

    #[test]
    fn expands_closed_cone() {
        // forall u exists e: (u v e) & (-u v -e). e's cone is closed around u.
        let mut engine = Engine::new(Options::default());
        engine
            .vars
            .resize_with(2, || crate::var::VarRecord::new(Polarity::Universal, 0));
        engine.vars[1] = crate::var::VarRecord::new(Polarity::Existential, 1);
        engine.prefix.push_block(Polarity::Universal, vec![Var::from_dimacs(1)]);
        engine.prefix.push_block(Polarity::Existential, vec![Var::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(-2)]);
        assert!(engine.try_expand_variable(Var::from_dimacs(1)));
        assert_eq!(engine.vars[0].tag, Tag::Expanded);
        assert_eq!(engine.vars[1].tag, Tag::Expanded);
        assert_eq!(engine.store.len(), 2);
    }

    #[test]
    fn refuses_expansion_over_axcess_budget() {
        let mut engine = Engine::new(Options {
            axcess: 0,
            ..Options::default()
        });
        engine
            .vars
            .resize_with(2, || crate::var::VarRecord::new(Polarity::Universal, 0));
        engine.vars[1] = crate::var::VarRecord::new(Polarity::Existential, 1);
        engine.prefix.push_block(Polarity::Universal, vec![Var::from_dimacs(1)]);
        engine.prefix.push_block(Polarity::Existential, vec![Var::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(-2)]);
        assert!(!engine.try_expand_variable(Var::from_dimacs(1)));
    }
}
