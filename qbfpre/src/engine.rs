//! The preprocessing engine: ties together the variable table, clause store, trail, elimination
//! heap and proof sink behind a single `&mut self` API.
//!
//! A `part!`-style generated partial-borrow struct (splitting independent borrows of e.g. the
//! clause database and the trail so they can be taken at once without a single giant `&mut self`)
//! is not worth carrying in here (see DESIGN.md): preprocessing is not on as hot a path as CDCL
//! search, so plain `&mut self` methods taking the whole `Engine` are simple enough and don't need
//! a macro to stay sound.
use std::io::Write;

use log::debug;

use qbfpre_formula::{Lit, Polarity, Prefix, QbfFormula, Var};

use crate::config::Options;
use crate::error::EngineError;
use crate::heap::VarHeap;
use crate::qrat::QratWriter;
use crate::stats::Stats;
use crate::store::ClauseStore;
use crate::trail::Trail;
use crate::var::{Tag, VarRecord};

/// Outcome of a call to [`Engine::preprocess`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PreprocessResult {
    /// The formula was reduced to an empty clause (or the trail otherwise shows it false under
    /// every universal assignment): the QBF is false.
    False,
    /// Every clause was removed without ever deriving an empty clause: the QBF is true.
    True,
    /// Simplification reached a fixpoint without deciding the formula outright.
    Simplified,
}

pub struct Engine {
    pub(crate) options: Options,
    pub(crate) vars: Vec<VarRecord>,
    pub(crate) prefix: Prefix,
    pub(crate) store: ClauseStore,
    pub(crate) trail: Trail,
    pub(crate) heap: VarHeap,
    pub(crate) stats: Stats,
    pub(crate) proof: Option<QratWriter<Box<dyn Write>>>,
    pub(crate) unsat: bool,
}

impl Engine {
    pub fn new(options: Options) -> Self {
        Engine {
            options,
            vars: vec![],
            prefix: Prefix::new(),
            store: ClauseStore::new(),
            trail: Trail::new(),
            heap: VarHeap::new(),
            stats: Stats::default(),
            proof: None,
            unsat: false,
        }
    }

    /// Directs the QRAT trace of every subsequent rewrite to `target`.
    pub fn write_qrat_proof_to(&mut self, target: Box<dyn Write>) {
        self.proof = Some(QratWriter::new(target, self.options.qrat_messages));
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), EngineError> {
        macro_rules! set_bool {
            ($field:ident) => {{
                self.options.$field = match value {
                    None | Some("true") | Some("1") => true,
                    Some("false") | Some("0") => false,
                    Some(other) => {
                        return Err(EngineError::InvalidOptionValue {
                            name: name.to_string(),
                            value: other.to_string(),
                        })
                    }
                };
                Ok(())
            }};
        }
        macro_rules! set_num {
            ($field:ident, $ty:ty) => {{
                let raw = value.ok_or_else(|| EngineError::InvalidOptionValue {
                    name: name.to_string(),
                    value: "<missing>".to_string(),
                })?;
                self.options.$field = raw.parse::<$ty>().map_err(|_| EngineError::InvalidOptionValue {
                    name: name.to_string(),
                    value: raw.to_string(),
                })?;
                Ok(())
            }};
        }
        match name {
            "propagation" => set_bool!(propagation),
            "subsumption" => set_bool!(subsumption),
            "universal-reduction" => set_bool!(universal_reduction),
            "bce" => set_bool!(blocked_clause_elimination),
            "hte" => set_bool!(hidden_and_covered),
            "elim" => set_bool!(variable_elimination),
            "elim-excess" => set_num!(elim_excess, i64),
            "equivalence" => set_bool!(equivalence_reasoning),
            "expand" => set_bool!(universal_expansion),
            "expand-axcess" => set_num!(axcess, usize),
            "expand-mini" => set_bool!(miniscoping),
            "splitlim" => set_num!(split_limit, usize),
            "max-rounds" => set_num!(max_rounds, usize),
            "qrat" => set_bool!(qrat_proof),
            "qrat-msg" => set_bool!(qrat_messages),
            other => Err(EngineError::UnknownOption {
                name: other.to_string(),
            }),
        }
    }

    /// Loads a parsed formula, replacing any formula previously loaded.
    pub fn load(&mut self, formula: QbfFormula) -> Result<(), EngineError> {
        self.vars.clear();
        self.prefix = formula.prefix;
        self.store = ClauseStore::new();
        self.trail = Trail::new();
        self.heap = VarHeap::new();
        self.unsat = false;

        let var_count = formula.matrix.var_count().max(self.prefix_var_count());
        self.vars
            .resize_with(var_count, || VarRecord::new(Polarity::Existential, 0));
        for scope in self.prefix.scopes() {
            for &var in &scope.vars {
                self.vars[var.index()] = VarRecord::new(scope.polarity, scope.order);
            }
        }

        for clause in formula.matrix.iter() {
            if self.add_original_clause(clause.to_vec())? {
                self.unsat = true;
            }
        }
        Ok(())
    }

    fn prefix_var_count(&self) -> usize {
        self.prefix
            .scopes()
            .iter()
            .flat_map(|scope| scope.vars.iter())
            .map(|var| var.index() + 1)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn var_record(&self, var: Var) -> &VarRecord {
        &self.vars[var.index()]
    }

    pub(crate) fn var_record_mut(&mut self, var: Var) -> &mut VarRecord {
        &mut self.vars[var.index()]
    }

    pub(crate) fn literal_polarity(&self, lit: Lit) -> Polarity {
        self.vars[lit.var().index()].polarity
    }

    pub(crate) fn is_existential(&self, lit: Lit) -> bool {
        self.literal_polarity(lit).is_existential()
    }

    pub(crate) fn is_universal(&self, lit: Lit) -> bool {
        self.literal_polarity(lit).is_universal()
    }

    /// Recomputes every scope's `stretch`, picking up scopes that simplification has emptied out
    /// since the last recomputation (or since load). Called once per round right before universal
    /// expansion, whose cone computation is `stretch`'s only reader.
    pub(crate) fn refresh_prefix_stretch(&mut self) {
        let vars = &self.vars;
        self.prefix.recompute_stretch(|v| vars[v.index()].is_free());
    }

    /// Allocates a fresh existential variable in the innermost existential scope, used by
    /// universal expansion and clause splitting.
    pub(crate) fn fresh_existential_var(&mut self, scope_order: usize) -> Var {
        let var = Var::from_index(self.vars.len());
        self.vars.push(VarRecord::new(Polarity::Existential, scope_order));
        self.prefix.push_var_to_scope(scope_order, var);
        var
    }

    /// Transitions `var` away from `Tag::Free` to `tag`, recording the forced value (if any) and
    /// dropping it from the elimination heap and its scope's `remaining_free` count. A no-op if
    /// the variable isn't currently `Free` (e.g. a cascading propagation on an already-fixed
    /// variable): the first transition away from `Free` owns the tag.
    pub(crate) fn set_tag(&mut self, var: Var, tag: Tag, fixed: Option<bool>) {
        let record = &mut self.vars[var.index()];
        if !record.tag.is_free() {
            return;
        }
        let scope_order = record.scope_order;
        record.tag = tag;
        record.fixed = fixed;
        self.heap.remove(var);
        self.prefix.remove_free_var(scope_order);
    }

    /// Tags every still-free variable `Zombie`: the formula has been decided false, so no
    /// variable's value matters any further.
    pub(crate) fn zombify_remaining(&mut self) {
        for index in 0..self.vars.len() {
            self.set_tag(Var::from_index(index), Tag::Zombie, None);
        }
    }

    pub(crate) fn record_clause_length(&mut self, len: usize) {
        self.stats.max_clause_len = self.stats.max_clause_len.max(len);
    }

    /// Decides the formula by calling out to an external QBF solver on the simplified result.
    ///
    /// Always returns [`EngineError::Unsupported`]: the call-out itself is a named collaborator
    /// this crate does not implement. The method (and the CLI's `--solve` flag) exist so a caller
    /// gets a clear error instead of a missing-feature surprise.
    pub fn solve(&mut self) -> Result<bool, EngineError> {
        Err(EngineError::Unsupported {
            feature: "solving".to_string(),
        })
    }

    /// Runs the fixpoint simplification driver until no technique makes further progress or the
    /// formula is decided.
    pub fn preprocess(&mut self) -> PreprocessResult {
        if self.unsat {
            debug!("formula already false after initial unit propagation");
            self.zombify_remaining();
            return PreprocessResult::False;
        }
        let result = self.run_fixpoint();
        if result == PreprocessResult::False {
            self.zombify_remaining();
        }
        result
    }

    /// Reconstructs the simplified formula for output, renumbering surviving variables densely
    /// starting at 1 and dropping scopes that became empty.
    pub fn output_formula(&mut self) -> QbfFormula {
        let mut next_index = 0usize;
        for var_record in &mut self.vars {
            if var_record.tag == Tag::Free {
                var_record.mapped_index = Some(next_index);
                next_index += 1;
            } else {
                var_record.mapped_index = None;
            }
        }

        let mut out_prefix = Prefix::new();
        for scope in self.prefix.scopes() {
            let mapped_vars: Vec<Var> = scope
                .vars
                .iter()
                .filter_map(|&var| self.vars[var.index()].mapped_index)
                .map(Var::from_index)
                .collect();
            if !mapped_vars.is_empty() {
                out_prefix.push_block(scope.polarity, mapped_vars);
            }
        }
        out_prefix.ensure_outermost_existential();

        let mut matrix = qbfpre_formula::CnfMatrix::new();
        matrix.set_var_count(next_index);
        for id in self.store.iter_ids() {
            let clause = self.store.get(id);
            let remapped: Vec<Lit> = clause
                .lits
                .iter()
                .map(|&lit| {
                    let mapped = self.vars[lit.var().index()]
                        .mapped_index
                        .expect("output clause references a removed variable");
                    Lit::from_index(mapped, lit.is_positive())
                })
                .collect();
            matrix.add_clause(remapped);
        }

        QbfFormula {
            prefix: out_prefix,
            matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_reports_unsupported() {
        let mut engine = Engine::new(Options::default());
        assert!(matches!(engine.solve(), Err(EngineError::Unsupported { .. })));
    }
}
