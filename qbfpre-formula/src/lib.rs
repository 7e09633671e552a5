//! Basic literal, variable, quantifier prefix and formula types shared across qbfpre.

pub mod cnf;
pub mod lit;
pub mod scope;

pub use cnf::{CnfMatrix, QbfFormula};
pub use lit::{Lit, Var};
pub use scope::{Polarity, Prefix, Scope};
