//! Bloom-filter-style signatures used to cheaply rule out subsumption and duplicate-clause
//! lookups before committing to an O(n) literal scan.
//!
//! The hash and bit-selection scheme match bloqqer's `lit2sig`/`sig_subset` so that a signature
//! computed over a clause can be persisted and compared across runs with known behavior.
use qbfpre_formula::Lit;

pub type Signature = u64;

/// Selects a single bit of the signature for a literal's variable.
///
/// Negation does not change a literal's bit: the signature only tracks which *variables* occur,
/// which is sufficient for a necessary-condition prefilter on subset/superset checks.
pub fn lit_signature(lit: Lit) -> Signature {
    let var_number = (lit.var().index() as u64) + 1;
    1u64 << ((100_623_947u64.wrapping_mul(var_number)) & 63)
}

pub fn clause_signature(lits: &[Lit]) -> Signature {
    lits.iter().fold(0, |acc, &lit| acc | lit_signature(lit))
}

/// True if a clause with signature `sub` could possibly have its variable set be a subset of a
/// clause with signature `sup`. A `false` result is conclusive; `true` still requires the full
/// literal-by-literal check.
pub fn may_be_subset(sub: Signature, sup: Signature) -> bool {
    sub & !sup == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_permutation_invariant() {
        let a = [Lit::from_dimacs(1), Lit::from_dimacs(-2), Lit::from_dimacs(3)];
        let mut b = a;
        b.reverse();
        assert_eq!(clause_signature(&a), clause_signature(&b));
    }

    #[test]
    fn subset_signature_passes_prefilter() {
        let small = [Lit::from_dimacs(1)];
        let big = [Lit::from_dimacs(1), Lit::from_dimacs(2)];
        assert!(may_be_subset(
            clause_signature(&small),
            clause_signature(&big)
        ));
    }

    #[test]
    fn negation_does_not_change_the_bit() {
        assert_eq!(
            lit_signature(Lit::from_dimacs(5)),
            lit_signature(Lit::from_dimacs(-5))
        );
    }
}
