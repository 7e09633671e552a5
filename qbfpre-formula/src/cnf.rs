//! PCNF formulas: a quantifier prefix plus a CNF matrix.
use std::cmp::max;
use std::fmt;
use std::iter::Extend;
use std::ops::Range;

use crate::lit::Lit;
use crate::scope::Prefix;

/// A CNF matrix.
///
/// Equivalent to `Vec<Vec<Lit>>` but more efficient as it uses a single buffer for all literals.
#[derive(Default, Eq)]
pub struct CnfMatrix {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
}

impl CnfMatrix {
    /// Create an empty matrix.
    pub fn new() -> CnfMatrix {
        CnfMatrix::default()
    }

    /// Number of variables referenced by the matrix.
    ///
    /// This also counts missing variables if a variable with a higher index is present.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Increase the number of variables.
    ///
    /// If the parameter is less than the current variable count do nothing.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of clauses in the matrix.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Appends a clause to the matrix.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        let begin = self.literals.len();
        self.literals.extend(literals);
        let end = self.literals.len();

        for &lit in self.literals[begin..end].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.clause_ranges.push(begin..end);
    }

    /// Iterator over all clauses.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        let literals = &self.literals;
        self.clause_ranges
            .iter()
            .map(move |range| &literals[range.clone()])
    }
}

impl<F, I, L> From<F> for CnfMatrix
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(formula: F) -> CnfMatrix {
        let mut matrix = CnfMatrix::new();
        for clause in formula {
            matrix.add_clause(clause);
        }
        matrix
    }
}

impl fmt::Debug for CnfMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for CnfMatrix {
    fn eq(&self, other: &CnfMatrix) -> bool {
        self.var_count() == other.var_count()
            && self.clause_ranges.len() == other.clause_ranges.len()
            && self
                .clause_ranges
                .iter()
                .zip(other.clause_ranges.iter())
                .all(|(range_a, range_b)| {
                    self.literals[range_a.clone()] == other.literals[range_b.clone()]
                })
    }
}

/// A quantified boolean formula in prenex conjunctive normal form.
#[derive(Default, Debug)]
pub struct QbfFormula {
    pub prefix: Prefix,
    pub matrix: CnfMatrix,
}

impl QbfFormula {
    pub fn new() -> QbfFormula {
        QbfFormula::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Lit;

    #[test]
    fn roundtrip() {
        let input: Vec<Vec<Lit>> = vec![
            vec![Lit::from_dimacs(1), Lit::from_dimacs(2)],
            vec![Lit::from_dimacs(-1)],
        ];

        let matrix = CnfMatrix::from(input.iter().cloned());

        for (clause, ref_clause) in matrix.iter().zip(input.iter()) {
            assert_eq!(clause, &ref_clause[..]);
        }

        assert_eq!(matrix.var_count(), 2);
    }
}
