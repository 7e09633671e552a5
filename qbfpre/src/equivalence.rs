//! Equivalence reasoning over the binary clause implication graph.
//!
//! Every binary clause `(a v b)` contributes two implication edges, `!a -> b` and `!b -> a`, to a
//! graph over literals (mirroring how `varisat::binary::BinaryClauses` keeps a `by_lit` adjacency
//! list for the same edges, though that crate uses it for failed literal probing rather than
//! equivalence detection). Literals in the same strongly connected component are equivalent;
//! Tarjan's algorithm finds those components in one linear pass.
//!
//! Two conflict conditions make the formula false outright, checked before any substitution is
//! performed:
//! - an SCC contains both `l` and `-l` (the class is forced both true and false), or
//! - an SCC contains a universal literal quantified at a scope equal to or outer than some
//!   existential literal in the same class (the existential would have to be fixed before the
//!   universal's adversarial choice that it is equivalent to is even made).
//!
//! Once those are ruled out, the only way a class can still mix polarities is a universal
//! quantified strictly *inside* every existential in its class. Substitution is restricted to
//! picking an existential representative (smallest by outer-scope order, per spec.md §4.9) for
//! each class: an all-universal class is left untouched, and a mixed class's universal member
//! is never chosen as representative, since replacing an outer existential throughout the formula
//! with a literal whose value is only fixed later (and adversarially) is not a substitution at
//! all — it would need the same dependency-tracking machinery as universal expansion, not a
//! plain equivalence rewrite. See DESIGN.md's "Equivalence substitution stays existential-only"
//! entry.
use qbfpre_formula::{Lit, Var};
use qbfpre_proof::Justification;

use crate::engine::Engine;
use crate::var::Tag;

struct Tarjan {
    index_counter: usize,
    indices: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    component: Vec<Option<usize>>,
    component_counter: usize,
}

impl Tarjan {
    fn new(node_count: usize) -> Self {
        Tarjan {
            index_counter: 0,
            indices: vec![None; node_count],
            lowlink: vec![0; node_count],
            on_stack: vec![false; node_count],
            stack: vec![],
            component: vec![None; node_count],
            component_counter: 0,
        }
    }

    /// Iterative Tarjan SCC, to avoid blowing the stack on long implication chains.
    fn run(&mut self, graph: &[Vec<usize>]) {
        for start in 0..graph.len() {
            if self.indices[start].is_some() {
                continue;
            }
            let mut work: Vec<(usize, usize)> = vec![(start, 0)];
            self.indices[start] = Some(self.index_counter);
            self.lowlink[start] = self.index_counter;
            self.index_counter += 1;
            self.stack.push(start);
            self.on_stack[start] = true;

            while let Some(&mut (node, ref mut next_edge)) = work.last_mut() {
                if *next_edge < graph[node].len() {
                    let succ = graph[node][*next_edge];
                    *next_edge += 1;
                    if self.indices[succ].is_none() {
                        self.indices[succ] = Some(self.index_counter);
                        self.lowlink[succ] = self.index_counter;
                        self.index_counter += 1;
                        self.stack.push(succ);
                        self.on_stack[succ] = true;
                        work.push((succ, 0));
                    } else if self.on_stack[succ] {
                        self.lowlink[node] = self.lowlink[node].min(self.indices[succ].unwrap());
                    }
                } else {
                    work.pop();
                    if let Some(&(parent, _)) = work.last() {
                        self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[node]);
                    }
                    if self.lowlink[node] == self.indices[node].unwrap() {
                        let id = self.component_counter;
                        self.component_counter += 1;
                        loop {
                            let member = self.stack.pop().unwrap();
                            self.on_stack[member] = false;
                            self.component[member] = Some(id);
                            if member == node {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Engine {
    fn build_implication_graph(&self) -> Vec<Vec<usize>> {
        let node_count = self.vars.len() * 2;
        let mut graph = vec![vec![]; node_count];
        for id in self.store.iter_ids() {
            let lits = &self.store.get(id).lits;
            if lits.len() != 2 {
                continue;
            }
            let (a, b) = (lits[0], lits[1]);
            graph[(!a).code()].push(b.code());
            graph[(!b).code()].push(a.code());
        }
        graph
    }

    /// Finds equivalent existential literals via the binary implication graph and substitutes
    /// each non-representative variable with the representative literal throughout the formula.
    /// Returns the number of variables collapsed.
    pub(crate) fn run_equivalence_reasoning(&mut self) -> usize {
        if self.vars.is_empty() {
            return 0;
        }
        let graph = self.build_implication_graph();
        let mut tarjan = Tarjan::new(graph.len());
        tarjan.run(&graph);
        let component = tarjan.component;

        for var_index in 0..self.vars.len() {
            let var = Var::from_index(var_index);
            if self.vars[var_index].tag != Tag::Free {
                continue;
            }
            let pos_comp = component[var.positive().code()];
            let neg_comp = component[var.negative().code()];
            if pos_comp.is_some() && pos_comp == neg_comp {
                self.unsat = true;
                return 0;
            }
        }

        let component_count = tarjan.component_counter;
        let mut groups_by_component: Vec<Vec<usize>> = vec![vec![]; component_count];
        for (code, comp) in component.iter().enumerate() {
            if let Some(comp) = comp {
                groups_by_component[*comp].push(code);
            }
        }
        for group in &groups_by_component {
            let mut max_existential_order: Option<usize> = None;
            let mut min_universal_order: Option<usize> = None;
            for &code in group {
                let lit = Lit::from_code(code);
                let order = self.var_record(lit.var()).scope_order;
                if self.is_existential(lit) {
                    max_existential_order = Some(max_existential_order.map_or(order, |m| m.max(order)));
                } else {
                    min_universal_order = Some(min_universal_order.map_or(order, |m| m.min(order)));
                }
            }
            // A universal quantified strictly inside the existential it's equivalent to is a
            // dependency violation: the existential's Skolem function is fixed before the
            // universal's later, adversarial pick it would have to mirror. A universal outer than
            // or at the same depth as the existential is fine (the existential can depend on it).
            if let (Some(e), Some(u)) = (max_existential_order, min_universal_order) {
                if u > e {
                    self.unsat = true;
                    return 0;
                }
            }
        }
        let members = groups_by_component;
        let mut representative: Vec<Option<Lit>> = vec![None; self.vars.len() * 2];
        for group in &members {
            if group.len() < 2 {
                continue;
            }
            let mut best: Option<usize> = None;
            for &code in group {
                let lit = Lit::from_code(code);
                let var = lit.var();
                if !self.is_existential(lit) || self.vars[var.index()].tag != Tag::Free {
                    continue;
                }
                let order = self.var_record(var).scope_order;
                let is_better = match best {
                    None => true,
                    Some(best_code) => {
                        let best_var = Lit::from_code(best_code).var();
                        let best_order = self.var_record(best_var).scope_order;
                        (order, var.index()) < (best_order, best_var.index())
                    }
                };
                if is_better {
                    best = Some(code);
                }
            }
            if let Some(best_code) = best {
                for &code in group {
                    representative[code] = Some(Lit::from_code(best_code));
                }
            }
        }

        let mut collapsed = 0;
        for var_index in 0..self.vars.len() {
            let var = Var::from_index(var_index);
            if self.vars[var_index].tag != Tag::Free || !self.is_existential(var.positive()) {
                continue;
            }
            let pos = var.positive();
            let rep = match representative[pos.code()] {
                Some(rep) if rep.var() != var => rep,
                _ => continue,
            };
            self.substitute_variable(var, rep);
            collapsed += 1;
            self.stats.equivalences_found += 1;
        }
        collapsed
    }

    fn substitute_variable(&mut self, var: Var, representative: Lit) {
        let pos = var.positive();
        let occurrences: Vec<_> = self
            .store
            .occurrences(pos)
            .chain(self.store.occurrences(!pos))
            .collect();
        self.set_tag(var, Tag::Substituted, None);

        for id in occurrences {
            if self.store.is_deleted(id) {
                continue;
            }
            let old_lits = self.store.get(id).lits.clone();
            let mut new_lits: Vec<Lit> = old_lits
                .iter()
                .map(|&l| {
                    if l.var() == var {
                        if l == pos {
                            representative
                        } else {
                            !representative
                        }
                    } else {
                        l
                    }
                })
                .collect();
            new_lits.sort_unstable();
            new_lits.dedup();
            if new_lits
                .iter()
                .any(|&l| new_lits.contains(&!l))
            {
                self.emit_delete(id, Justification::Rata, Some("tautological after substitution"));
                self.store.delete(id);
                continue;
            }
            self.emit_add(
                None,
                &new_lits,
                Justification::Rata,
                Some("equivalence substitution"),
            );
            self.emit_delete(id, Justification::Rata, None);
            self.store.delete(id);
            let _ = self.add_original_clause(new_lits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use qbfpre_formula::Polarity;

    #[test]
    fn collapses_equivalent_literals() {
        // (-1 v 2) & (1 v -2) makes 1 and 2 equivalent.
        let mut engine = Engine::new(Options::default());
        engine
            .vars
            .resize_with(2, || crate::var::VarRecord::new(Polarity::Existential, 0));
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)]);
        let collapsed = engine.run_equivalence_reasoning();
        assert_eq!(collapsed, 1);
        assert_eq!(engine.vars[0].tag, Tag::Substituted);
    }

    #[test]
    fn inner_universal_equivalent_to_outer_existential_is_unsat() {
        // 1 is existential at the outermost scope, 2 is universal one scope further in; (-1 v 2)
        // & (1 v -2) forces 1 <-> 2, but 1 is fixed before 2's adversarial choice is even made.
        let mut engine = Engine::new(Options::default());
        engine.vars.push(crate::var::VarRecord::new(Polarity::Existential, 0));
        engine.vars.push(crate::var::VarRecord::new(Polarity::Universal, 1));
        engine
            .store
            .alloc(vec![Lit::from_dimacs(-1), Lit::from_dimacs(2)]);
        engine
            .store
            .alloc(vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)]);
        engine.run_equivalence_reasoning();
        assert!(engine.unsat);
    }
}
