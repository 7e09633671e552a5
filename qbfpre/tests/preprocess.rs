//! End-to-end preprocessing scenarios driven through QDIMACS text, mirroring the scenarios a
//! hand-written QBF preprocessor test suite would exercise.
use std::io;
use std::sync::{Arc, Mutex};

use qbfpre::{Engine, Options, PreprocessResult};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn preprocess(qdimacs: &str) -> (PreprocessResult, Engine) {
    let parsed = qbfpre_dimacs::parse(qdimacs.as_bytes()).unwrap();
    let mut engine = Engine::new(Options::default());
    engine.load(parsed.formula).unwrap();
    let result = engine.preprocess();
    (result, engine)
}

#[test]
fn empty_clause_is_false() {
    let (result, _) = preprocess("p cnf 1 1\ne 1 0\n0\n");
    assert_eq!(result, PreprocessResult::False);
}

#[test]
fn single_satisfied_unit_is_true() {
    let (result, _) = preprocess("p cnf 1 1\ne 1 0\n1 0\n");
    assert_eq!(result, PreprocessResult::True);
}

#[test]
fn pure_existential_literal_satisfies_formula() {
    // 1 only ever occurs positively, so it can be fixed true, satisfying both clauses.
    let (result, _) = preprocess("p cnf 2 2\ne 1 2 0\n1 2 0\n1 -2 0\n");
    assert_eq!(result, PreprocessResult::True);
}

#[test]
fn trailing_universal_is_reduced_away() {
    // 2 is universal and not bounding any existential in this clause, so it's stripped, leaving
    // just (1), which then propagates to true.
    let (mut result, mut engine) = preprocess("p cnf 2 1\ne 1 0\na 2 0\n1 2 0\n");
    let _ = &mut result;
    let output = engine.output_formula();
    assert_eq!(result, PreprocessResult::True);
    assert!(output.matrix.is_empty());
}

#[test]
fn equivalent_literals_collapse() {
    let qdimacs = "p cnf 3 3\ne 1 2 3 0\n-1 2 0\n1 -2 0\n2 3 0\n";
    let (result, mut engine) = preprocess(qdimacs);
    assert_ne!(result, PreprocessResult::False);
    let output = engine.output_formula();
    // 1 and 2 collapse into one variable, so the matrix should reference fewer variables than
    // the original 3.
    assert!(output.matrix.var_count() <= 2);
}

#[test]
fn blocked_clause_is_removed() {
    // (1 v 2) is blocked on 1 since -1 never occurs.
    let qdimacs = "p cnf 2 2\ne 1 2 0\n1 2 0\n-2 1 0\n";
    let parsed = qbfpre_dimacs::parse(qdimacs.as_bytes()).unwrap();
    let mut engine = Engine::new(Options::default());
    engine.load(parsed.formula).unwrap();
    engine.preprocess();
    // Both clauses are blocked on variable 1 (which never occurs negated), or subsumed down to
    // the empty formula; either way the formula should simplify to trivially true.
    let output = engine.output_formula();
    assert!(output.matrix.is_empty());
}

#[test]
fn variable_elimination_shrinks_clause_count() {
    let qdimacs = "p cnf 3 2\ne 1 2 3 0\n1 2 0\n-1 3 0\n";
    let (result, mut engine) = preprocess(qdimacs);
    assert_ne!(result, PreprocessResult::False);
    let output = engine.output_formula();
    assert_eq!(output.matrix.len(), 1);
}

#[test]
fn qrat_proof_is_emitted_when_requested() {
    let qdimacs = "p cnf 1 1\ne 1 0\n1 0\n";
    let parsed = qbfpre_dimacs::parse(qdimacs.as_bytes()).unwrap();
    let mut engine = Engine::new(Options::default());
    let buf = SharedBuf::default();
    engine.options_mut().qrat_proof = true;
    engine.write_qrat_proof_to(Box::new(buf.clone()));
    engine.load(parsed.formula).unwrap();
    engine.preprocess();
    drop(engine);
    assert!(!buf.0.lock().unwrap().is_empty());
}
