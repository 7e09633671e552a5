//! Quantifier prefix scopes.
use crate::lit::Var;

/// The quantifier owning a [`Scope`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Polarity {
    Existential,
    Universal,
}

impl Polarity {
    /// The other polarity.
    pub fn flip(self) -> Polarity {
        match self {
            Polarity::Existential => Polarity::Universal,
            Polarity::Universal => Polarity::Existential,
        }
    }

    pub fn is_existential(self) -> bool {
        self == Polarity::Existential
    }

    pub fn is_universal(self) -> bool {
        self == Polarity::Universal
    }
}

/// A single block in a quantifier prefix.
///
/// Scopes are ordered outermost (order 0) to innermost. Adjacent blocks of the same polarity are
/// never produced by the parser (they get merged), so polarity alternates between consecutive
/// scopes.
#[derive(Clone, Debug)]
pub struct Scope {
    pub polarity: Polarity,
    pub order: usize,
    pub vars: Vec<Var>,
    /// Order of the deepest same-polarity scope this one reaches by hopping over intervening
    /// opposite-polarity scopes that have become fully empty. Computed once the whole prefix is
    /// known, by [`Prefix::recompute_stretch`]; stale after later tag changes empty out a scope.
    pub stretch: usize,
    /// Count of variables in this scope not yet tagged away from free. Decremented live as
    /// variables are fixed, eliminated, substituted, expanded or reduced away.
    pub remaining_free: usize,
}

impl Scope {
    pub fn new(polarity: Polarity, order: usize) -> Scope {
        Scope {
            polarity,
            order,
            vars: vec![],
            stretch: order,
            remaining_free: 0,
        }
    }
}

/// An ordered quantifier prefix.
///
/// Variables not explicitly quantified are existential and belong to the outermost scope, per
/// the QDIMACS convention (any variable not quantified becomes existential in the outermost
/// scope).
#[derive(Clone, Debug, Default)]
pub struct Prefix {
    scopes: Vec<Scope>,
}

impl Prefix {
    pub fn new() -> Prefix {
        Prefix::default()
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Ensures the outermost scope exists and is existential, as required by the QDIMACS
    /// convention for unquantified variables.
    pub fn ensure_outermost_existential(&mut self) {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::new(Polarity::Existential, 0));
        }
    }

    /// Appends a new block, merging with the previous block if the polarity matches.
    pub fn push_block(&mut self, polarity: Polarity, vars: impl IntoIterator<Item = Var>) {
        if let Some(last) = self.scopes.last_mut() {
            if last.polarity == polarity {
                let before = last.vars.len();
                last.vars.extend(vars);
                last.remaining_free += last.vars.len() - before;
                return;
            }
        }
        let order = self.scopes.len();
        let mut scope = Scope::new(polarity, order);
        scope.vars.extend(vars);
        scope.remaining_free = scope.vars.len();
        self.scopes.push(scope);
    }

    /// Appends a single variable to the outermost scope, creating it if necessary.
    ///
    /// Used for variables that appear in the matrix without being quantified.
    pub fn push_free_var(&mut self, var: Var) {
        self.ensure_outermost_existential();
        self.scopes[0].vars.push(var);
        self.scopes[0].remaining_free += 1;
    }

    /// Appends a variable to the scope with the given order, e.g. to place a universal
    /// expansion copy in the same scope as the variable it was copied from.
    ///
    /// Panics if no scope with that order exists.
    pub fn push_var_to_scope(&mut self, order: usize, var: Var) {
        let scope = self
            .scopes
            .iter_mut()
            .find(|scope| scope.order == order)
            .expect("scope order must exist");
        scope.vars.push(var);
        scope.remaining_free += 1;
    }

    /// Initializes every scope's `remaining_free` count by asking `is_free` about each of its
    /// variables, then recomputes `stretch` from the resulting emptiness pattern.
    ///
    /// Call once the whole prefix (including any fresh expansion/split variables already placed
    /// by `push_var_to_scope`) is known, before the cone computation in universal expansion reads
    /// `stretch` for the first time.
    pub fn recompute_stretch(&mut self, is_free: impl Fn(Var) -> bool) {
        let n = self.scopes.len();
        let remaining_free: Vec<usize> = self
            .scopes
            .iter()
            .map(|scope| scope.vars.iter().filter(|&&v| is_free(v)).count())
            .collect();
        for (scope, &count) in self.scopes.iter_mut().zip(&remaining_free) {
            scope.remaining_free = count;
        }

        let mut stretch = vec![0usize; n];
        for i in (0..n).rev() {
            let mut reach = self.scopes[i].order;
            let mut j = i + 2;
            while j < n
                && remaining_free[j - 1] == 0
                && self.scopes[j].polarity == self.scopes[i].polarity
            {
                reach = stretch[j];
                j += 2;
            }
            stretch[i] = reach;
        }
        for (scope, s) in self.scopes.iter_mut().zip(stretch) {
            scope.stretch = s;
        }
    }

    /// Decrements the `remaining_free` count of the scope at `scope_order`. Called from
    /// `Engine::set_tag` on every tag transition away from `Free`.
    pub fn remove_free_var(&mut self, scope_order: usize) {
        if let Some(scope) = self.scopes.iter_mut().find(|scope| scope.order == scope_order) {
            scope.remaining_free = scope.remaining_free.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Var;

    #[test]
    fn merges_adjacent_same_polarity_blocks() {
        let mut prefix = Prefix::new();
        prefix.push_block(Polarity::Existential, vec![Var::from_dimacs(1)]);
        prefix.push_block(Polarity::Existential, vec![Var::from_dimacs(2)]);
        assert_eq!(prefix.scopes().len(), 1);
        assert_eq!(prefix.scopes()[0].vars.len(), 2);
    }

    #[test]
    fn alternates_polarity() {
        let mut prefix = Prefix::new();
        prefix.push_block(Polarity::Existential, vec![Var::from_dimacs(1)]);
        prefix.push_block(Polarity::Universal, vec![Var::from_dimacs(2)]);
        assert_eq!(prefix.scopes().len(), 2);
        assert_eq!(prefix.scopes()[1].order, 1);
    }
}
