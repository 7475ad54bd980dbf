use std::borrow::BorrowMut;
use std::fmt;

use anyhow::{Context, Result};
use pest::Parser as _;
use pest_derive::Parser;

use crate::ast::{
    Attribute, BodyItem, Constraint, ContextDecl, ContextualPredicate, Fact, Identifier,
    Predicate, Query, Rule as ProgramRule, Statement, Term, Theta,
};

#[derive(Parser)]
#[grammar = "contelog.pest"]
struct Parser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;
type Pairs<'a> = pest::iterators::Pairs<'a, Rule>;

/// A statement that did not match the grammar. Parsing resumes after its
/// terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}, column {}: {:?}",
            self.line, self.column, self.text
        )
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Clone, Debug, Default)]
pub struct ParsedProgram {
    pub statements: Vec<Statement>,
    pub errors: Vec<SyntaxError>,
}

pub fn parse_program(code: &str) -> Result<ParsedProgram> {
    let program = Parser::parse(Rule::program, code)
        .context("Failed to parse input")?
        .next()
        .unwrap();

    let mut parsed = ParsedProgram::default();
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::statement => parsed.statements.push(Statement::from(pair)),
            Rule::invalid => {
                let (line, column) = pair.as_span().start_pos().line_col();
                let error = SyntaxError {
                    line,
                    column,
                    text: pair.as_str().trim().to_owned(),
                };
                tracing::debug!(%error, "skipping malformed statement");
                parsed.errors.push(error);
            }
            Rule::EOI => break,
            _ => unreachable!(),
        }
    }

    Ok(parsed)
}

fn expect_next_rule<'a, P: BorrowMut<Pairs<'a>>>(mut pairs: P, expected: Rule) -> Pair<'a> {
    let pair = pairs.borrow_mut().next().expect("missing pair");
    assert_eq!(pair.as_rule(), expected);
    pair
}

fn convert_identifier(pair: Pair) -> Identifier {
    assert!(matches!(
        pair.as_rule(),
        Rule::lower_name | Rule::upper_name
    ));
    pair.as_str().to_string()
}

fn expect_lower_name<'a, P: BorrowMut<Pairs<'a>>>(pairs: P) -> Identifier {
    convert_identifier(expect_next_rule(pairs, Rule::lower_name))
}

impl From<Pair<'_>> for Term {
    fn from(pair: Pair<'_>) -> Self {
        assert_eq!(pair.as_rule(), Rule::term);
        let name = pair.into_inner().next().unwrap();
        match name.as_rule() {
            Rule::upper_name => Term::Variable(convert_identifier(name)),
            Rule::lower_name => Term::Constant(convert_identifier(name)),
            _ => unreachable!(),
        }
    }
}

impl From<Pair<'_>> for Statement {
    fn from(pair: Pair<'_>) -> Self {
        let pair = pair.into_inner().next().unwrap();

        match pair.as_rule() {
            Rule::context => Statement::Context(ContextDecl::from(pair)),

            Rule::fact => Statement::Fact(Fact {
                predicate: Predicate::from(expect_next_rule(pair.into_inner(), Rule::predicate)),
            }),

            Rule::rule => Statement::Rule(ProgramRule::from(pair)),

            Rule::query => Statement::Query(Query {
                body: convert_body(expect_next_rule(pair.into_inner(), Rule::body)),
            }),

            _ => unreachable!(),
        }
    }
}

impl From<Pair<'_>> for ContextDecl {
    fn from(pair: Pair<'_>) -> Self {
        let mut pairs = pair.into_inner();
        let name = expect_lower_name(&mut pairs);
        let predicates = pairs.map(ContextualPredicate::from).collect();
        Self { name, predicates }
    }
}

impl From<Pair<'_>> for ContextualPredicate {
    fn from(pair: Pair<'_>) -> Self {
        assert_eq!(pair.as_rule(), Rule::dimension);
        let mut pairs = pair.into_inner();
        let name = expect_lower_name(&mut pairs);
        let attributes = pairs.map(Attribute::from).collect();
        Self { name, attributes }
    }
}

impl From<Pair<'_>> for Attribute {
    fn from(pair: Pair<'_>) -> Self {
        let pair = pair.into_inner().next().unwrap();
        match pair.as_rule() {
            Rule::term => Attribute::Single(Term::from(pair)),
            Rule::attribute_tuple => Attribute::Tuple(pair.into_inner().map(Term::from).collect()),
            _ => unreachable!(),
        }
    }
}

impl From<Pair<'_>> for ProgramRule {
    fn from(pair: Pair<'_>) -> Self {
        let mut pairs = pair.into_inner();
        let head = Predicate::from(expect_next_rule(&mut pairs, Rule::predicate));
        let body = convert_body(expect_next_rule(&mut pairs, Rule::body));
        Self { head, body }
    }
}

impl From<Pair<'_>> for Predicate {
    fn from(pair: Pair<'_>) -> Self {
        assert_eq!(pair.as_rule(), Rule::predicate);
        let mut pairs = pair.into_inner();
        let name = expect_lower_name(&mut pairs);
        let arguments = expect_next_rule(&mut pairs, Rule::term_list)
            .into_inner()
            .map(Term::from)
            .collect();

        let predicate = Predicate::new(name, arguments);
        match pairs.next() {
            Some(annotation) => {
                assert_eq!(annotation.as_rule(), Rule::annotation);
                let context = Term::from(expect_next_rule(annotation.into_inner(), Rule::term));
                predicate.with_context(context)
            }
            None => predicate,
        }
    }
}

impl From<Pair<'_>> for Constraint {
    fn from(pair: Pair<'_>) -> Self {
        let mut pairs = pair.into_inner();
        let lhs = Term::Variable(convert_identifier(expect_next_rule(
            &mut pairs,
            Rule::upper_name,
        )));
        let theta = expect_next_rule(&mut pairs, Rule::theta);
        let theta = Theta::parse(theta.as_str()).unwrap();
        let rhs = Term::from(expect_next_rule(&mut pairs, Rule::term));
        Self { lhs, theta, rhs }
    }
}

fn convert_body(pair: Pair) -> Vec<BodyItem> {
    assert_eq!(pair.as_rule(), Rule::body);
    pair.into_inner()
        .map(|item| {
            let item = item.into_inner().next().unwrap();
            match item.as_rule() {
                Rule::predicate => BodyItem::Atom(Predicate::from(item)),
                Rule::constraint => BodyItem::Constraint(Constraint::from(item)),
                _ => unreachable!(),
            }
        })
        .collect()
}
