//! QDIMACS parser and writer.
//!
//! QDIMACS extends plain DIMACS CNF with a quantifier prefix: zero or more `e v1 v2 ... 0` /
//! `a v1 v2 ... 0` blocks between the header and the clause matrix. Because that structure is
//! inherently line-oriented (quantifier blocks and the header are always whole lines, only
//! clauses may span several), this parser reads line by line rather than as a byte-at-a-time
//! incremental automaton; the error taxonomy and overflow checks follow the same conventions.
use std::io::{self, BufRead};

use anyhow::Error;
use thiserror::Error;

use qbfpre_formula::{CnfMatrix, Lit, Polarity, Prefix, QbfFormula, Var};

/// Possible errors while parsing a QDIMACS formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: unexpected input in QDIMACS file: '{unexpected}'")]
    UnexpectedInput { line: usize, unexpected: String },
    #[error("line {line}: literal index is too large: {index}")]
    LiteralTooLarge { line: usize, index: usize },
    #[error("line {line}: invalid header syntax: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: unterminated clause")]
    UnterminatedClause { line: usize },
    #[error("line {line}: comment at end of file")]
    CommentAtEof { line: usize },
    #[error("line {line}: quantified variable must be a positive, non-zero index: {value}")]
    InvalidQuantifiedLiteral { line: usize, value: isize },
    #[error("line {line}: quantifier block after the clause matrix has started")]
    QuantifierBlockAfterMatrix { line: usize },
    #[error(
        "formula has {var_count} variables while the header specifies {header_var_count} variables"
    )]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error(
        "formula has {clause_count} clauses while the header specifies {header_clause_count} clauses"
    )]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("no QDIMACS header found")]
    MissingHeader,
}

/// Variable and clause count present in a QDIMACS header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// An embedded option found in a `c --name[=value]` comment before the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedOption {
    pub name: String,
    pub value: Option<String>,
    pub line: usize,
}

/// The result of parsing a QDIMACS file.
#[derive(Debug)]
pub struct ParsedQdimacs {
    pub formula: QbfFormula,
    pub header: Option<DimacsHeader>,
    pub embedded_options: Vec<EmbeddedOption>,
}

enum ParseState {
    BeforeHeader,
    InPrefix,
    InMatrix,
}

/// Parses a complete QDIMACS input.
pub fn parse(input: impl io::Read) -> Result<ParsedQdimacs, Error> {
    let mut reader = io::BufReader::new(input);
    let mut line_buf = String::new();
    let mut line_number = 0usize;

    let mut state = ParseState::BeforeHeader;
    let mut header = None;
    let mut prefix = Prefix::new();
    let mut matrix = CnfMatrix::new();
    let mut embedded_options = vec![];

    let mut partial_clause: Vec<Lit> = vec![];
    let mut clause_count = 0usize;

    loop {
        line_buf.clear();
        let bytes_read = reader.read_line(&mut line_buf)?;
        if bytes_read == 0 {
            break;
        }
        line_number += 1;
        let line = line_buf.trim_end_matches(['\n', '\r'].as_ref());

        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('c') {
            if matches!(state, ParseState::BeforeHeader) {
                if let Some(option) = parse_embedded_option(line, line_number) {
                    embedded_options.push(option);
                }
            }
            continue;
        }

        if line.starts_with('p') {
            header = Some(parse_header_line(line, line_number)?);
            matrix.set_var_count(header.unwrap().var_count);
            state = ParseState::InPrefix;
            continue;
        }

        if line.starts_with('e') || line.starts_with('a') {
            if matches!(state, ParseState::InMatrix) {
                return Err(ParserError::QuantifierBlockAfterMatrix { line: line_number }.into());
            }
            state = ParseState::InPrefix;
            let polarity = if line.starts_with('e') {
                Polarity::Existential
            } else {
                Polarity::Universal
            };
            let vars = parse_quantifier_block(line, line_number)?;
            for &var in &vars {
                matrix.set_var_count(var.index() + 1);
            }
            prefix.push_block(polarity, vars);
            continue;
        }

        // Anything else is a clause line (possibly continuing a partial clause).
        state = ParseState::InMatrix;
        parse_clause_line(line, line_number, &mut partial_clause, &mut matrix, &mut clause_count)?;
    }

    if !partial_clause.is_empty() {
        return Err(ParserError::UnterminatedClause { line: line_number }.into());
    }

    if let Some(header) = header {
        if matrix.var_count() != header.var_count {
            return Err(ParserError::VarCount {
                var_count: matrix.var_count(),
                header_var_count: header.var_count,
            }
            .into());
        }
        if clause_count != header.clause_count {
            return Err(ParserError::ClauseCount {
                clause_count,
                header_clause_count: header.clause_count,
            }
            .into());
        }
    }

    prefix.ensure_outermost_existential();

    Ok(ParsedQdimacs {
        formula: QbfFormula { prefix, matrix },
        header,
        embedded_options,
    })
}

fn parse_embedded_option(line: &str, line_number: usize) -> Option<EmbeddedOption> {
    let rest = line[1..].trim_start();
    let rest = rest.strip_prefix("--")?;
    let (name, value) = match rest.find('=') {
        Some(pos) => (&rest[..pos], Some(rest[pos + 1..].trim().to_string())),
        None => (rest.trim(), None),
    };
    if name.is_empty() {
        return None;
    }
    Some(EmbeddedOption {
        name: name.to_string(),
        value,
        line: line_number,
    })
}

fn parse_header_line(line: &str, line_number: usize) -> Result<DimacsHeader, ParserError> {
    let invalid = || ParserError::InvalidHeader {
        line: line_number,
        header: line.to_string(),
    };

    let mut parts = line.split_whitespace();
    if parts.next() != Some("p") {
        return Err(invalid());
    }
    if parts.next() != Some("cnf") {
        return Err(invalid());
    }
    let var_count: usize = parts.next().and_then(|v| v.parse().ok()).ok_or_else(invalid)?;
    let clause_count: usize = parts.next().and_then(|v| v.parse().ok()).ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    if var_count > Var::max_count() {
        return Err(ParserError::LiteralTooLarge {
            line: line_number,
            index: var_count,
        });
    }

    Ok(DimacsHeader {
        var_count,
        clause_count,
    })
}

fn parse_quantifier_block(line: &str, line_number: usize) -> Result<Vec<Var>, ParserError> {
    let mut tokens = line.split_whitespace();
    tokens.next(); // 'e' or 'a'

    let mut vars = vec![];
    let mut terminated = false;
    for token in tokens {
        let value: isize = token.parse().map_err(|_| ParserError::UnexpectedInput {
            line: line_number,
            unexpected: token.to_string(),
        })?;
        if value == 0 {
            terminated = true;
            break;
        }
        if value < 0 {
            return Err(ParserError::InvalidQuantifiedLiteral {
                line: line_number,
                value,
            });
        }
        if value as usize > Var::max_count() {
            return Err(ParserError::LiteralTooLarge {
                line: line_number,
                index: value as usize,
            });
        }
        vars.push(Var::from_dimacs(value));
    }
    if !terminated {
        return Err(ParserError::UnterminatedClause { line: line_number });
    }
    Ok(vars)
}

fn parse_clause_line(
    line: &str,
    line_number: usize,
    partial_clause: &mut Vec<Lit>,
    matrix: &mut CnfMatrix,
    clause_count: &mut usize,
) -> Result<(), ParserError> {
    for token in line.split_whitespace() {
        let value: isize = token.parse().map_err(|_| ParserError::UnexpectedInput {
            line: line_number,
            unexpected: token.to_string(),
        })?;
        if value == 0 {
            matrix.add_clause(partial_clause.drain(..));
            *clause_count += 1;
            continue;
        }
        if value.unsigned_abs() > Var::max_count() {
            return Err(ParserError::LiteralTooLarge {
                line: line_number,
                index: value.unsigned_abs(),
            });
        }
        partial_clause.push(Lit::from_dimacs(value));
    }
    Ok(())
}

/// Writes a QDIMACS header.
pub fn write_header(
    target: &mut impl io::Write,
    var_count: usize,
    clause_count: usize,
) -> io::Result<()> {
    writeln!(target, "p cnf {} {}", var_count, clause_count)
}

/// Writes a quantifier prefix, one block per line.
pub fn write_prefix(target: &mut impl io::Write, prefix: &Prefix) -> io::Result<()> {
    for scope in prefix.scopes() {
        if scope.vars.is_empty() {
            continue;
        }
        target.write_all(if scope.polarity.is_existential() {
            b"e "
        } else {
            b"a "
        })?;
        for &var in &scope.vars {
            itoa::write(&mut *target, var.to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Writes clauses as headerless QDIMACS.
pub fn write_clauses<'a>(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = &'a [Lit]>,
) -> io::Result<()> {
    for clause in clauses {
        for lit in clause {
            itoa::write(&mut *target, lit.to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_qbf() {
        let input = b"p cnf 3 2\ne 1 0\na 2 0\ne 3 0\n1 2 0\n-2 3 0\n" as &[_];
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.formula.matrix.len(), 2);
        assert_eq!(parsed.formula.prefix.scopes().len(), 3);
        assert_eq!(parsed.formula.prefix.scopes()[0].vars, vec![Var::from_dimacs(1)]);
    }

    #[test]
    fn unquantified_vars_become_outer_existential() {
        let input = b"p cnf 2 1\n1 2 0\n" as &[_];
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.formula.prefix.scopes().len(), 1);
        assert!(parsed.formula.prefix.scopes()[0].polarity.is_existential());
    }

    #[test]
    fn clause_can_span_multiple_lines() {
        let input = b"p cnf 3 1\n1 2\n3 0\n" as &[_];
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.formula.matrix.len(), 1);
        assert_eq!(parsed.formula.matrix.iter().next().unwrap().len(), 3);
    }

    #[test]
    fn extracts_embedded_options() {
        let input = b"c --no-bce\nc --splitlim=20\np cnf 1 1\n1 0\n" as &[_];
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.embedded_options.len(), 2);
        assert_eq!(parsed.embedded_options[0].name, "no-bce");
        assert_eq!(parsed.embedded_options[0].value, None);
        assert_eq!(parsed.embedded_options[1].name, "splitlim");
        assert_eq!(parsed.embedded_options[1].value.as_deref(), Some("20"));
    }

    #[test]
    fn rejects_quantifier_block_after_matrix() {
        let input = b"p cnf 2 1\n1 0\ne 2 0\n" as &[_];
        let err = parse(input).unwrap_err();
        assert!(err
            .downcast_ref::<ParserError>()
            .map(|e| matches!(e, ParserError::QuantifierBlockAfterMatrix { .. }))
            .unwrap_or(false));
    }

    #[test]
    fn rejects_negative_quantified_literal() {
        let input = b"p cnf 1 1\ne -1 0\n1 0\n" as &[_];
        let err = parse(input).unwrap_err();
        assert!(err
            .downcast_ref::<ParserError>()
            .map(|e| matches!(e, ParserError::InvalidQuantifiedLiteral { .. }))
            .unwrap_or(false));
    }

    #[test]
    fn rejects_clause_count_mismatch() {
        let input = b"p cnf 1 2\n1 0\n" as &[_];
        let err = parse(input).unwrap_err();
        assert!(err
            .downcast_ref::<ParserError>()
            .map(|e| matches!(e, ParserError::ClauseCount { .. }))
            .unwrap_or(false));
    }

    #[test]
    fn header_writer_roundtrip() {
        let mut buf = vec![];
        write_header(&mut buf, 3, 2).unwrap();
        assert_eq!(buf, b"p cnf 3 2\n");
    }
}
