//! Per-variable state maintained while preprocessing a formula.
use qbfpre_formula::Polarity;

/// Why a variable's current status differs from "still a free variable of the formula".
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Tag {
    /// An ordinary variable, still part of the formula.
    Free,
    /// Fixed directly by an original or derived clause that was a unit clause at the moment it
    /// was added, rather than by a cascading propagation from some other literal.
    Unit,
    /// An existential literal occurring with only one polarity, fixed to satisfy every remaining
    /// clause that mentions it.
    PureExistential,
    /// A universal literal occurring with only one polarity, struck from every clause that
    /// mentions it rather than fixed (it never constrains anything, so removing it changes
    /// nothing).
    PureUniversal,
    /// Fixed by a cascading propagation that was not itself the variable's originating unit
    /// clause (e.g. a clause shortened to one literal by an earlier assignment).
    Fixed,
    /// Every still-free variable is tagged Zombie once the empty clause is derived: the formula
    /// is decided false and nothing further needs any particular value for it.
    Zombie,
    /// Eliminated by resolution (`qbfpre::elim`): every clause mentioning it was replaced by its
    /// resolvents.
    Eliminated,
    /// Replaced by its equivalence class's representative literal (`qbfpre::equivalence`).
    Substituted,
    /// Retired by universal expansion (`qbfpre::expand`): either the expanded universal pivot
    /// itself, or one of the cone's existentials whose occurrences were split across the
    /// negative and (fresh-copy) positive branches.
    Expanded,
    /// A universal variable whose last occurrence was stripped by universal reduction, leaving
    /// it with no occurrences anywhere in the formula.
    ForallReduced,
}

impl Tag {
    pub fn is_free(self) -> bool {
        matches!(self, Tag::Free)
    }
}

#[derive(Clone, Debug)]
pub struct VarRecord {
    pub polarity: Polarity,
    pub scope_order: usize,
    pub tag: Tag,
    pub fixed: Option<bool>,
    pub mapped_index: Option<usize>,
}

impl VarRecord {
    pub fn new(polarity: Polarity, scope_order: usize) -> Self {
        VarRecord {
            polarity,
            scope_order,
            tag: Tag::Free,
            fixed: None,
            mapped_index: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.tag == Tag::Free
    }
}
