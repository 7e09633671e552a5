//! Unit and pure literal propagation.
//!
//! Grounded on the simplification half of `varisat::simplify`: clauses satisfied by a fixed
//! literal are deleted outright, clauses containing its negation have that literal struck, and a
//! clause shortened to a single literal feeds back into the trail for further propagation.
use std::borrow::Cow;

use qbfpre_formula::Lit;
use qbfpre_proof::{Justification, ProofStep};

use crate::engine::Engine;
use crate::var::Tag;

impl Engine {
    /// Adds `lit` to the trail (if not already fixed) and eagerly applies it to the clause store.
    /// Returns `true` if this derives a conflict (the formula is false).
    pub(crate) fn assign_and_simplify(&mut self, lit: Lit) -> bool {
        match self.trail.assign(lit) {
            Err(()) => return true,
            Ok(false) => return false,
            Ok(true) => {}
        }
        self.set_tag(lit.var(), Tag::Fixed, Some(lit.is_positive()));

        let mut conflict = false;
        let satisfied: Vec<_> = self.store.occurrences(lit).collect();
        for id in satisfied {
            if self.store.is_deleted(id) {
                continue;
            }
            self.emit_delete(id, Justification::Rata, Some("satisfied by unit literal"));
            self.store.delete(id);
        }

        let falsified: Vec<_> = self.store.occurrences(!lit).collect();
        for id in falsified {
            if self.store.is_deleted(id) {
                continue;
            }
            let old_lits = self.store.get(id).lits.clone();
            let new_lits: Vec<Lit> = old_lits.iter().copied().filter(|&l| l != !lit).collect();
            if new_lits.is_empty() {
                self.emit_delete(id, Justification::Rata, Some("falsified unit clause"));
                self.store.delete(id);
                conflict = true;
                continue;
            }
            self.emit_add(
                None,
                &new_lits,
                Justification::Rata,
                Some("unit propagation"),
            );
            self.emit_delete(id, Justification::Rata, None);
            self.store.set_lits(id, new_lits.clone());
            self.stats.units_propagated += 1;
            if new_lits.len() == 1 && self.assign_and_simplify(new_lits[0]) {
                conflict = true;
            }
        }
        conflict
    }

    /// Drains the trail's pending work, applying it to the clause store. Returns `true` on
    /// conflict.
    pub(crate) fn run_propagation(&mut self) -> bool {
        let mut conflict = false;
        while let Some(lit) = self.trail.next_to_propagate() {
            if self.assign_and_simplify(lit) {
                conflict = true;
            }
        }
        conflict
    }

    /// Finds existential variables that occur with only one polarity and fixes them to satisfy
    /// every remaining clause, and universal variables that occur with only one polarity and
    /// strikes that (non-constraining) literal from every clause. Returns the number of variables
    /// affected.
    pub(crate) fn propagate_pure_literals(&mut self) -> usize {
        let mut affected = 0;
        for index in 0..self.vars.len() {
            let var = qbfpre_formula::Var::from_index(index);
            if self.vars[index].tag != Tag::Free {
                continue;
            }
            let pos = var.positive();
            let neg = var.negative();
            let pos_count = self.store.occurrence_count(pos);
            let neg_count = self.store.occurrence_count(neg);
            if pos_count == 0 && neg_count == 0 {
                continue;
            }
            if pos_count > 0 && neg_count > 0 {
                continue;
            }
            let pure_lit = if neg_count == 0 { pos } else { neg };

            if self.is_existential(pure_lit) {
                self.stats.pure_literals += 1;
                affected += 1;
                self.set_tag(var, Tag::PureExistential, Some(pure_lit.is_positive()));
                let clauses: Vec<_> = self.store.occurrences(pure_lit).collect();
                for id in clauses {
                    self.emit_delete(id, Justification::Rata, Some("pure literal"));
                    self.store.delete(id);
                }
            } else {
                // A universal literal that never occurs negated cannot ever help the adversary,
                // so it can be stricken wherever it occurs without changing truth.
                self.stats.pure_literals += 1;
                affected += 1;
                self.set_tag(var, Tag::PureUniversal, None);
                let clauses: Vec<_> = self.store.occurrences(pure_lit).collect();
                for id in clauses {
                    let old_lits = self.store.get(id).lits.clone();
                    let new_lits: Vec<Lit> =
                        old_lits.iter().copied().filter(|&l| l != pure_lit).collect();
                    self.emit_add(None, &new_lits, Justification::Ble, Some("pure universal literal"));
                    self.emit_delete(id, Justification::Ble, None);
                    self.store.set_lits(id, new_lits);
                }
            }
        }
        affected
    }

    pub(crate) fn emit_add(
        &mut self,
        pivot: Option<Lit>,
        clause: &[Lit],
        justification: Justification,
        message: Option<&str>,
    ) {
        if let Some(proof) = &mut self.proof {
            let _ = proof.write_step(&ProofStep::Add {
                pivot,
                clause: Cow::Owned(clause.to_vec()),
                justification,
                message: message.map(|m| Cow::Owned(m.to_string())),
            });
        }
    }

    pub(crate) fn emit_delete(
        &mut self,
        id: crate::clause::ClauseId,
        justification: Justification,
        message: Option<&str>,
    ) {
        if let Some(proof) = &mut self.proof {
            let clause = self.store.get(id).lits.clone();
            let _ = proof.write_step(&ProofStep::Delete {
                clause: Cow::Owned(clause),
                justification,
                message: message.map(|m| Cow::Owned(m.to_string())),
            });
        }
    }
}
