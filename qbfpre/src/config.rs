//! Preprocessor configuration.
//!
//! A `DocDefault`-style derive that parses `(Default: ...)` out of each field's doc comment isn't
//! worth carrying in here (see DESIGN.md), so `Default` is implemented by hand below, but the
//! `(Default: ...)` / `(Min: ...)` / `(Max: ...)` doc convention is kept so the two stay in sync
//! by inspection.

/// Configurable parameters controlling which simplification techniques run and how aggressively.
#[derive(Clone, Debug)]
pub struct Options {
    /// Run unit and pure literal propagation. (Default: true)
    pub propagation: bool,

    /// Run forward and backward subsumption, including self-subsuming resolution. (Default: true)
    pub subsumption: bool,

    /// Run universal reduction on every clause reachable from the fixpoint driver. (Default: true)
    pub universal_reduction: bool,

    /// Detect and remove blocked clauses and blocked universal literals. (Default: true)
    pub blocked_clause_elimination: bool,

    /// Extend blocked clause elimination with hidden tautology addition, hidden blocked clause
    /// addition and covered literal addition before giving up on a clause. (Default: true)
    pub hidden_and_covered: bool,

    /// Eliminate existential variables by resolution when doing so does not increase the
    /// formula's size beyond `elim_excess`. (Default: true)
    pub variable_elimination: bool,

    /// Number of additional literals (summed over all resolvents minus the eliminated clauses)
    /// tolerated when eliminating a variable by resolution. (Default: 0) (Min: 0)
    pub elim_excess: i64,

    /// Detect equivalent literals via binary clauses and collapse them. (Default: true)
    pub equivalence_reasoning: bool,

    /// Eliminate universal variables by expansion when the expansion cost is acceptable.
    /// (Default: true)
    pub universal_expansion: bool,

    /// Maximum expansion cost (total occurrences of the cone's existentials, the `axcess`
    /// budget) tolerated when expanding a universal variable. (Default: 2000) (Min: 0)
    pub axcess: usize,

    /// Allow a universal variable's cone to contain another, still-live universal variable even
    /// when the one being expanded is not in the innermost universal block. Off by default:
    /// expanding a non-innermost universal while tolerating another live universal in its cone
    /// risks widening clauses the other universal still needs reduced away from. (Default: false)
    pub miniscoping: bool,

    /// Split clauses longer than this back into a chain of clauses of at most this many literals,
    /// linked by fresh existential variables, undoing the effect of earlier resolution-based
    /// simplifications that can blow up clause width. 0 disables splitting; values below 3 are
    /// treated as 3, the smallest limit a chain link can use. (Default: 0) (Min: 0)
    pub split_limit: usize,

    /// Maximum number of fixpoint driver rounds. 0 means unlimited. (Default: 0) (Min: 0)
    pub max_rounds: usize,

    /// Write a QRAT proof of every rewrite performed. (Default: false)
    pub qrat_proof: bool,

    /// Include a human-readable justification comment on each QRAT line. (Default: false)
    pub qrat_messages: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            propagation: true,
            subsumption: true,
            universal_reduction: true,
            blocked_clause_elimination: true,
            hidden_and_covered: true,
            variable_elimination: true,
            elim_excess: 0,
            equivalence_reasoning: true,
            universal_expansion: true,
            axcess: 2000,
            miniscoping: false,
            split_limit: 0,
            max_rounds: 0,
            qrat_proof: false,
            qrat_messages: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_full_simplification() {
        let options = Options::default();
        assert!(options.propagation);
        assert!(options.subsumption);
        assert!(options.variable_elimination);
        assert_eq!(options.elim_excess, 0);
        assert!(!options.qrat_proof);
    }
}
