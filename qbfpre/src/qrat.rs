//! Text QRAT proof writer.
//!
//! Grounded on `varisat::proof::drat::write_step`'s structure (dispatch on proof step kind, write
//! literals with `itoa` for speed), but emits QRAT's three line kinds instead of DRAT's two:
//!   * addition: `p1 p2 ... 0` with the pivot literal listed first
//!   * deletion: `d p1 p2 ... 0`
//!   * universal reduction: `u p p1 p2 ... 0`, `p` is the removed universal literal and the rest
//!     of the line lists the clause before reduction
use std::io::{self, Write};

use qbfpre_formula::Lit;
use qbfpre_proof::ProofStep;

/// Writes a sequence of proof steps as a text QRAT file.
pub struct QratWriter<W: Write> {
    target: W,
    include_messages: bool,
}

impl<W: Write> QratWriter<W> {
    pub fn new(target: W, include_messages: bool) -> Self {
        QratWriter {
            target,
            include_messages,
        }
    }

    pub fn write_step(&mut self, step: &ProofStep) -> io::Result<()> {
        match step {
            ProofStep::Add {
                pivot,
                clause,
                message,
                ..
            } => self.write_clause_line(None, *pivot, clause, message.as_deref()),
            ProofStep::Delete {
                clause, message, ..
            } => self.write_clause_line(Some("d"), None, clause, message.as_deref()),
            ProofStep::UniversalReduction {
                pivot,
                clause,
                message,
            } => self.write_universal_reduction(*pivot, clause, message.as_deref()),
        }
    }

    fn write_clause_line(
        &mut self,
        prefix: Option<&str>,
        pivot: Option<Lit>,
        clause: &[Lit],
        message: Option<&str>,
    ) -> io::Result<()> {
        if let Some(prefix) = prefix {
            write!(self.target, "{} ", prefix)?;
        }
        if let Some(pivot) = pivot {
            self.write_literal(pivot)?;
            for &lit in clause {
                if lit != pivot {
                    self.write_literal(lit)?;
                }
            }
        } else {
            for &lit in clause {
                self.write_literal(lit)?;
            }
        }
        self.target.write_all(b"0")?;
        self.write_message(message)?;
        self.target.write_all(b"\n")
    }

    fn write_universal_reduction(
        &mut self,
        pivot: Lit,
        clause: &[Lit],
        message: Option<&str>,
    ) -> io::Result<()> {
        self.target.write_all(b"u ")?;
        self.write_literal(pivot)?;
        for &lit in clause {
            self.write_literal(lit)?;
        }
        self.target.write_all(b"0")?;
        self.write_message(message)?;
        self.target.write_all(b"\n")
    }

    fn write_literal(&mut self, lit: Lit) -> io::Result<()> {
        itoa::write(&mut self.target, lit.to_dimacs())?;
        self.target.write_all(b" ")
    }

    fn write_message(&mut self, message: Option<&str>) -> io::Result<()> {
        if self.include_messages {
            if let Some(message) = message {
                write!(self.target, " c {}", message)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.target.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbfpre_proof::Justification;
    use std::borrow::Cow;

    #[test]
    fn addition_lists_pivot_first() {
        let mut buf = vec![];
        {
            let mut writer = QratWriter::new(&mut buf, false);
            let clause = [Lit::from_dimacs(2), Lit::from_dimacs(1), Lit::from_dimacs(-3)];
            writer
                .write_step(&ProofStep::Add {
                    pivot: Some(Lit::from_dimacs(1)),
                    clause: Cow::Borrowed(&clause),
                    justification: Justification::Rata,
                    message: None,
                })
                .unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "1 2 -3 0\n");
    }

    #[test]
    fn deletion_is_prefixed() {
        let mut buf = vec![];
        {
            let mut writer = QratWriter::new(&mut buf, false);
            let clause = [Lit::from_dimacs(1), Lit::from_dimacs(2)];
            writer
                .write_step(&ProofStep::Delete {
                    clause: Cow::Borrowed(&clause),
                    justification: Justification::Rate,
                    message: None,
                })
                .unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "d 1 2 0\n");
    }

    #[test]
    fn universal_reduction_lists_pivot_after_u() {
        let mut buf = vec![];
        {
            let mut writer = QratWriter::new(&mut buf, false);
            let clause = [Lit::from_dimacs(1), Lit::from_dimacs(2), Lit::from_dimacs(-3)];
            writer
                .write_step(&ProofStep::UniversalReduction {
                    pivot: Lit::from_dimacs(-3),
                    clause: Cow::Borrowed(&clause),
                    message: None,
                })
                .unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "u -3 1 2 -3 0\n");
    }

    #[test]
    fn message_appended_when_enabled() {
        let mut buf = vec![];
        {
            let mut writer = QratWriter::new(&mut buf, true);
            let clause = [Lit::from_dimacs(1)];
            writer
                .write_step(&ProofStep::Add {
                    pivot: Some(Lit::from_dimacs(1)),
                    clause: Cow::Borrowed(&clause),
                    justification: Justification::Rata,
                    message: Some(Cow::Borrowed("unit propagation")),
                })
                .unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "1 0 c unit propagation\n");
    }
}
