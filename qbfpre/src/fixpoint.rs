//! The outer simplification driver.
//!
//! Runs every enabled technique in a fixed order once per round, repeating rounds until none of
//! them make further progress, the formula is decided, or `Options::max_rounds` is hit. Clause
//! splitting runs every round (spec.md §4.13's `flush → split → eqres → elim → ...` ordering),
//! right after the propagation/subsumption/hidden-tautology flush step and before equivalence
//! reasoning, so newly split clauses still get a chance to be re-split, subsumed or fed into
//! elimination within the same fixpoint instead of only once at the very end.
use log::debug;

use crate::engine::{Engine, PreprocessResult};

impl Engine {
    pub(crate) fn run_fixpoint(&mut self) -> PreprocessResult {
        let mut round = 0u64;
        loop {
            round += 1;
            self.stats.fixpoint_rounds = round;
            let mut progress = false;

            if self.options.propagation {
                if self.run_propagation() {
                    self.unsat = true;
                }
                if self.propagate_pure_literals() > 0 {
                    progress = true;
                }
            }
            if self.unsat {
                debug!("formula false after propagation in round {}", round);
                return PreprocessResult::False;
            }

            if self.options.universal_reduction && self.run_universal_reduction() > 0 {
                progress = true;
            }
            if self.options.subsumption && self.run_subsumption() > 0 {
                progress = true;
            }
            if self.options.hidden_and_covered && self.run_hidden_elimination() > 0 {
                progress = true;
            }
            if self.unsat {
                return PreprocessResult::False;
            }

            if self.options.split_limit != 0 && self.run_clause_splitting() > 0 {
                progress = true;
            }

            if self.options.blocked_clause_elimination && self.run_blocked_clause_elimination() > 0
            {
                progress = true;
            }
            if self.options.equivalence_reasoning {
                let collapsed = self.run_equivalence_reasoning();
                if collapsed > 0 {
                    progress = true;
                    if self.options.propagation && self.run_propagation() {
                        self.unsat = true;
                    }
                    if self.options.subsumption {
                        self.run_subsumption();
                    }
                }
            }
            if self.unsat {
                return PreprocessResult::False;
            }

            if self.store.is_empty() {
                debug!("formula true: every clause removed by round {}", round);
                return PreprocessResult::True;
            }

            if self.options.variable_elimination && self.run_variable_elimination() > 0 {
                progress = true;
            }
            if self.options.universal_expansion {
                self.refresh_prefix_stretch();
                if self.run_universal_expansion() > 0 {
                    progress = true;
                }
            }
            if self.unsat {
                return PreprocessResult::False;
            }
            if self.store.is_empty() {
                return PreprocessResult::True;
            }

            if !progress {
                break;
            }
            if self.options.max_rounds != 0 && round >= self.options.max_rounds as u64 {
                debug!("stopping at configured round limit {}", self.options.max_rounds);
                break;
            }
        }

        if self.store.is_empty() {
            PreprocessResult::True
        } else {
            PreprocessResult::Simplified
        }
    }
}
