//! Safety checks applied to every statement before it is loaded.
//!
//! A rule is safe when every head argument variable occurs among the
//! arguments of its body atoms, its head context variable (if any) occurs
//! somewhere in a body atom, and every constraint variable is bound by a
//! body atom. Facts must be ground and context attributes must be constants.

use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;

use crate::ast::{ContextDecl, Fact, Rule, Statement, Term};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SafetyViolation {
    /// Head variables that no body atom binds.
    UnsafeRule { rule: String, variables: Vec<Term> },
    /// Constraint variables that no body atom binds.
    UnboundConstraint { rule: String, variables: Vec<Term> },
    /// Variables found in a fact.
    NonGroundFact { fact: String, variables: Vec<Term> },
    /// Variables listed as context attributes.
    NonConstantContext { context: String, variables: Vec<Term> },
}

impl SafetyViolation {
    /// The terms that made the statement unsafe.
    pub fn terms(&self) -> &[Term] {
        match self {
            SafetyViolation::UnsafeRule { variables, .. }
            | SafetyViolation::UnboundConstraint { variables, .. }
            | SafetyViolation::NonGroundFact { variables, .. }
            | SafetyViolation::NonConstantContext { variables, .. } => variables,
        }
    }
}

impl fmt::Display for SafetyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyViolation::UnsafeRule { rule, variables } => write!(
                f,
                "Unsafe rule found: {} (head variables {} do not occur in the body)",
                rule,
                variables.iter().join(", ")
            ),
            SafetyViolation::UnboundConstraint { rule, variables } => write!(
                f,
                "Unsafe rule found: {} (constraint variables {} do not occur in a body atom)",
                rule,
                variables.iter().join(", ")
            ),
            SafetyViolation::NonGroundFact { fact, variables } => write!(
                f,
                "Facts must be ground. Variables {} found in fact: {}",
                variables.iter().join(", "),
                fact
            ),
            SafetyViolation::NonConstantContext { context, variables } => write!(
                f,
                "Context attributes must be constants. Variables {} found in context: {}",
                variables.iter().join(", "),
                context
            ),
        }
    }
}

impl std::error::Error for SafetyViolation {}

/// Checks one statement. Queries are always accepted.
pub fn check_statement(statement: &Statement) -> Result<(), SafetyViolation> {
    match statement {
        Statement::Context(context) => check_context(context),
        Statement::Fact(fact) => check_fact(fact),
        Statement::Rule(rule) => check_rule(rule),
        Statement::Query(_) => Ok(()),
    }
}

pub fn check_rule(rule: &Rule) -> Result<(), SafetyViolation> {
    let body_arguments: HashSet<&Term> = rule
        .atoms()
        .flat_map(|atom| atom.arguments.iter())
        .collect();
    let bound: HashSet<&str> = rule.atoms().flat_map(|atom| atom.variables()).collect();

    let mut unbound: Vec<Term> = rule
        .head
        .arguments
        .iter()
        .filter(|term| term.is_variable() && !body_arguments.contains(term))
        .unique()
        .cloned()
        .collect();
    if let Some(context) = rule.head.context.as_variable() {
        if !bound.contains(context) && !unbound.contains(&rule.head.context) {
            unbound.push(rule.head.context.clone());
        }
    }
    if !unbound.is_empty() {
        return Err(SafetyViolation::UnsafeRule {
            rule: rule.to_string(),
            variables: unbound,
        });
    }

    let unbound: Vec<Term> = rule
        .constraints()
        .flat_map(|constraint| constraint.variables())
        .filter(|variable| !bound.contains(variable))
        .unique()
        .map(|variable| Term::Variable(variable.to_owned()))
        .collect();
    if !unbound.is_empty() {
        return Err(SafetyViolation::UnboundConstraint {
            rule: rule.to_string(),
            variables: unbound,
        });
    }

    Ok(())
}

pub fn check_fact(fact: &Fact) -> Result<(), SafetyViolation> {
    let variables: Vec<Term> = fact
        .predicate
        .terms()
        .filter(|term| term.is_variable())
        .cloned()
        .collect();
    if variables.is_empty() {
        Ok(())
    } else {
        Err(SafetyViolation::NonGroundFact {
            fact: fact.to_string(),
            variables,
        })
    }
}

pub fn check_context(context: &ContextDecl) -> Result<(), SafetyViolation> {
    let variables: Vec<Term> = context
        .predicates
        .iter()
        .flat_map(|predicate| &predicate.attributes)
        .flat_map(|attribute| attribute.terms())
        .filter(|term| term.is_variable())
        .cloned()
        .collect();
    if variables.is_empty() {
        Ok(())
    } else {
        Err(SafetyViolation::NonConstantContext {
            context: context.to_string(),
            variables,
        })
    }
}
