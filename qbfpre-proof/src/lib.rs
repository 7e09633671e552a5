//! QRAT proof step vocabulary.
//!
//! This crate only defines the wire-independent representation of a proof step. The actual text
//! emission lives in `qbfpre::qrat`, mirroring how `varisat-internal-proof` is kept independent of
//! `varisat::proof`'s DRAT/binary writers.
use std::borrow::Cow;

use qbfpre_formula::Lit;

/// Integer type used to store a hash of a clause (or other set of literals).
pub type ClauseHash = u64;

/// Hash a single literal.
///
/// Multiple literals can be combined with xor, as done in [`clause_hash`].
pub fn lit_hash(lit: Lit) -> ClauseHash {
    // Constant based on the golden ratio provides good mixing for the resulting upper bits.
    (!(lit.code() as u64)).wrapping_mul(0x61c8_8646_80b5_83eb_u64)
}

/// A fast hash function for clauses (or other *sets* of literals).
///
/// Interprets the given slice as a set: the result does not change when the input is permuted.
/// Does not handle duplicated items, so callers must dedup clauses before hashing them for exact
/// lookup purposes.
pub fn clause_hash(lits: &[Lit]) -> ClauseHash {
    let mut hash = 0;
    for &lit in lits {
        hash ^= lit_hash(lit);
    }
    hash
}

/// The soundness justification named by each QRAT certificate step.
///
/// This only affects the optional human-readable message appended to a QRAT line (when
/// `qrat_msg` is enabled); the wire syntax itself (`p1 p2 ... 0` / `d p1 p2 ... 0` /
/// `u p p1 p2 ... 0`) is determined solely by the [`ProofStep`] variant.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Justification {
    /// Resolution Asymmetric Tautology Addition: a fresh clause/unit added because it is an
    /// asymmetric tautology with respect to the current formula.
    Rata,
    /// Resolution Asymmetric Tautology Elimination: a clause removed because every resolvent on
    /// some existential pivot is tautological (blocked clause elimination, variable elimination).
    Rate,
    /// Existential Universal Reduction: a trailing universal literal removed from a clause whose
    /// shortened form is not already present in the formula.
    Eur,
    /// Blocked Literal Elimination: a universal literal removed from a clause because the clause
    /// is blocked on that literal.
    Ble,
}

/// A single QRAT proof step.
///
/// Represents one structural mutation of the clause store together with the justification that
/// makes it sound.
#[derive(Clone, Debug)]
pub enum ProofStep<'a> {
    /// Add a clause or unit.
    ///
    /// `pivot`, when present, is written first on the QRAT line (QRAT addition lines list the
    /// pivot literal before the rest of the clause).
    Add {
        pivot: Option<Lit>,
        clause: Cow<'a, [Lit]>,
        justification: Justification,
        message: Option<Cow<'a, str>>,
    },
    /// Delete a clause.
    Delete {
        clause: Cow<'a, [Lit]>,
        justification: Justification,
        message: Option<Cow<'a, str>>,
    },
    /// Remove a trailing universal literal from a clause via universal reduction.
    ///
    /// `clause` is the clause *before* reduction; `pivot` is the removed universal literal.
    UniversalReduction {
        pivot: Lit,
        clause: Cow<'a, [Lit]>,
        message: Option<Cow<'a, str>>,
    },
}

impl<'a> ProofStep<'a> {
    /// The justification carried by this step, if any (universal reduction steps use a dedicated
    /// QRAT line kind instead of a justification tag).
    pub fn justification(&self) -> Option<Justification> {
        match self {
            ProofStep::Add { justification, .. } => Some(*justification),
            ProofStep::Delete { justification, .. } => Some(*justification),
            ProofStep::UniversalReduction { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_hash_is_order_independent() {
        let a = [Lit::from_dimacs(1), Lit::from_dimacs(-2), Lit::from_dimacs(3)];
        let mut b = a;
        b.reverse();
        assert_eq!(clause_hash(&a), clause_hash(&b));
    }

    #[test]
    fn clause_hash_differs_for_different_clauses() {
        let a = [Lit::from_dimacs(1), Lit::from_dimacs(2)];
        let b = [Lit::from_dimacs(1), Lit::from_dimacs(3)];
        assert_ne!(clause_hash(&a), clause_hash(&b));
    }
}
