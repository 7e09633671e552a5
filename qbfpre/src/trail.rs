//! Records literals forced to a fixed truth value, together with a cursor marking how far
//! propagation has consumed the trail.
use qbfpre_formula::{Lit, Var};

#[derive(Default)]
pub struct Trail {
    lits: Vec<Lit>,
    assigned: Vec<Option<bool>>,
    cursor: usize,
}

impl Trail {
    pub fn new() -> Self {
        Trail::default()
    }

    fn ensure_len(&mut self, index: usize) {
        if self.assigned.len() <= index {
            self.assigned.resize(index + 1, None);
        }
    }

    /// The current truth value of a literal, if any variable on it has been fixed.
    pub fn value(&self, lit: Lit) -> Option<bool> {
        let var_value = self.assigned.get(lit.var().index()).copied().flatten()?;
        Some(var_value ^ lit.is_negative())
    }

    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit) == Some(true)
    }

    pub fn is_false(&self, lit: Lit) -> bool {
        self.value(lit) == Some(false)
    }

    pub fn is_assigned(&self, var: Var) -> bool {
        self.assigned.get(var.index()).copied().flatten().is_some()
    }

    /// Fixes `lit` to true. Returns `Ok(true)` if this is a new assignment, `Ok(false)` if `lit`
    /// was already true, and `Err(())` if the variable was already fixed to the opposite value.
    pub fn assign(&mut self, lit: Lit) -> Result<bool, ()> {
        self.ensure_len(lit.var().index());
        match self.assigned[lit.var().index()] {
            Some(value) if value ^ lit.is_negative() => Ok(false),
            Some(_) => Err(()),
            None => {
                self.assigned[lit.var().index()] = Some(lit.is_positive());
                self.lits.push(lit);
                Ok(true)
            }
        }
    }

    /// Returns the next not-yet-propagated literal, advancing the cursor.
    pub fn next_to_propagate(&mut self) -> Option<Lit> {
        let lit = *self.lits.get(self.cursor)?;
        self.cursor += 1;
        Some(lit)
    }

    pub fn has_pending(&self) -> bool {
        self.cursor < self.lits.len()
    }

    pub fn fixed_lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_and_reads_back() {
        let mut trail = Trail::new();
        assert_eq!(trail.assign(Lit::from_dimacs(3)), Ok(true));
        assert!(trail.is_true(Lit::from_dimacs(3)));
        assert!(trail.is_false(Lit::from_dimacs(-3)));
        assert_eq!(trail.value(Lit::from_dimacs(4)), None);
    }

    #[test]
    fn reassigning_same_value_is_a_noop() {
        let mut trail = Trail::new();
        trail.assign(Lit::from_dimacs(1)).unwrap();
        assert_eq!(trail.assign(Lit::from_dimacs(1)), Ok(false));
    }

    #[test]
    fn conflicting_assignment_errors() {
        let mut trail = Trail::new();
        trail.assign(Lit::from_dimacs(1)).unwrap();
        assert_eq!(trail.assign(Lit::from_dimacs(-1)), Err(()));
    }

    #[test]
    fn cursor_advances_once_per_literal() {
        let mut trail = Trail::new();
        trail.assign(Lit::from_dimacs(1)).unwrap();
        trail.assign(Lit::from_dimacs(2)).unwrap();
        assert_eq!(trail.next_to_propagate(), Some(Lit::from_dimacs(1)));
        assert_eq!(trail.next_to_propagate(), Some(Lit::from_dimacs(2)));
        assert_eq!(trail.next_to_propagate(), None);
    }
}
