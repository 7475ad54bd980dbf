use std::fmt;

use itertools::Itertools;

use crate::ast::{BodyItem, Predicate, PredicateKind, Query, RelationName, Rule, Statement};
use crate::relation::{ColumnName, Relation, RelationKind, RelationStore, Tuple};
use crate::safety::{check_statement, SafetyViolation};

/// A statement, or part of one, that was left out of evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    Unsafe(SafetyViolation),
    ArityMismatch {
        statement: String,
        relation: RelationName,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Unsafe(violation) => fmt::Display::fmt(violation, f),
            Diagnostic::ArityMismatch {
                statement,
                relation,
                expected,
                found,
            } => write!(
                f,
                "Arity mismatch for {:?} in {}: expected {} columns, found {}",
                relation, statement, expected, found
            ),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// A loaded program: the relation store, the rules with reordered bodies and
/// the queries, plus whatever was dropped on the way.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub store: RelationStore,
    pub rules: Vec<Rule>,
    pub queries: Vec<Query>,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<Vec<Statement>> for Program {
    fn from(statements: Vec<Statement>) -> Self {
        let mut program = Program::default();

        for statement in reorder_statements(statements, &mut program.diagnostics) {
            match statement {
                Statement::Context(context) => {
                    let source = context.to_string();
                    for atom in context.contextual_atoms() {
                        program.load_tuple(&source, &atom, RelationKind::Contextual);
                    }
                }
                Statement::Fact(fact) => program.load_tuple(
                    &fact.to_string(),
                    &fact.predicate,
                    RelationKind::Extensional,
                ),
                Statement::Rule(rule) => program.load_rule(rule),
                Statement::Query(query) => program.queries.push(query),
            }
        }

        program.resolve_collisions();
        program.reorder_rule_bodies();
        program
    }
}

impl Program {
    pub fn relation_kind(&self, name: &str) -> Option<RelationKind> {
        self.store.kind_of(name)
    }

    fn established_arity(&self, name: &str) -> Option<usize> {
        self.store.get(name).map(Relation::arity)
    }

    fn arity_mismatch(&mut self, statement: &str, atom: &Predicate, expected: usize) {
        let diagnostic = Diagnostic::ArityMismatch {
            statement: statement.to_owned(),
            relation: atom.name.clone(),
            expected,
            found: atom.arity(),
        };
        tracing::debug!(%diagnostic, "dropping statement");
        self.diagnostics.push(diagnostic);
    }

    /// Stores the ground `atom` as a tuple of a CDB or EDB relation. Facts
    /// named after a context dimension are added to that dimension.
    fn load_tuple(&mut self, statement: &str, atom: &Predicate, kind: RelationKind) {
        if let Some(expected) = self.established_arity(&atom.name) {
            if expected != atom.arity() {
                self.arity_mismatch(statement, atom, expected);
                return;
            }
        }

        let database = if kind == RelationKind::Contextual || self.store.cdb.contains(&atom.name) {
            &mut self.store.cdb
        } else {
            &mut self.store.edb
        };
        database
            .get_or_create(&atom.name, column_header(atom))
            .insert(ground_tuple(atom));
    }

    fn load_rule(&mut self, rule: Rule) {
        let mut arities: Vec<(&str, usize)> = Vec::new();
        for atom in std::iter::once(&rule.head).chain(rule.atoms()) {
            let expected = self.established_arity(&atom.name).or_else(|| {
                arities
                    .iter()
                    .find(|(name, _)| *name == atom.name)
                    .map(|&(_, arity)| arity)
            });
            match expected {
                Some(expected) if expected != atom.arity() => {
                    let statement = rule.to_string();
                    self.arity_mismatch(&statement, atom, expected);
                    return;
                }
                _ => arities.push((atom.name.as_str(), atom.arity())),
            }
        }

        self.store
            .idb
            .get_or_create(&rule.head.name, column_header(&rule.head));

        for atom in rule.atoms() {
            let known = self.store.cdb.contains(&atom.name)
                || self.store.edb.contains(&atom.name)
                || self.store.idb.contains(&atom.name);
            if !known {
                self.store
                    .idb
                    .get_or_create(&atom.name, column_header(atom));
            }
        }

        self.rules.push(rule);
    }

    /// Moves every stored relation that a rule also derives into the IDB.
    fn resolve_collisions(&mut self) {
        let derived: Vec<RelationName> = self.store.idb.names().map(str::to_owned).collect();
        for name in derived {
            for database in [&mut self.store.edb, &mut self.store.cdb] {
                if let Some(stored) = database.remove(&name) {
                    tracing::debug!(
                        relation = %name,
                        tuples = stored.len(),
                        "moving stored tuples into the IDB"
                    );
                    if let Some(relation) = self.store.idb.get_mut(&name) {
                        relation.extend(stored.iter().cloned());
                    }
                }
            }
        }
    }

    /// Orders every rule body as IDB atoms, CDB atoms, EDB atoms, then
    /// constraints, and marks the CDB atoms as contextual.
    fn reorder_rule_bodies(&mut self) {
        let store = &self.store;
        for rule in &mut self.rules {
            rule.body = std::mem::take(&mut rule.body)
                .into_iter()
                .sorted_by_key(|item| body_rank(store, item))
                .collect();

            for item in &mut rule.body {
                if let BodyItem::Atom(atom) = item {
                    atom.kind = match store.kind_of(&atom.name) {
                        Some(RelationKind::Contextual) => PredicateKind::Contextual,
                        _ => PredicateKind::Plain,
                    };
                }
            }
        }
    }
}

fn body_rank(store: &RelationStore, item: &BodyItem) -> u8 {
    match item {
        BodyItem::Atom(atom) => match store.kind_of(&atom.name) {
            Some(RelationKind::Intensional) => 0,
            Some(RelationKind::Contextual) => 1,
            Some(RelationKind::Extensional) => 2,
            None => 3,
        },
        BodyItem::Constraint(_) => 4,
    }
}

/// Safety-checks the statements and puts them in the order contexts, facts,
/// rules, queries. Unsafe statements are dropped with a diagnostic.
pub fn reorder_statements(
    statements: Vec<Statement>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Statement> {
    statements
        .into_iter()
        .filter(|statement| match check_statement(statement) {
            Ok(()) => true,
            Err(violation) => {
                tracing::debug!(%violation, "dropping unsafe statement");
                diagnostics.push(Diagnostic::Unsafe(violation));
                false
            }
        })
        .sorted_by_key(|statement| match statement {
            Statement::Context(_) => 0,
            Statement::Fact(_) => 1,
            Statement::Rule(_) => 2,
            Statement::Query(_) => 3,
        })
        .collect()
}

/// Column labels of the relation an atom defines: its argument names followed
/// by its context.
pub fn column_header(atom: &Predicate) -> Vec<ColumnName> {
    atom.terms().map(|term| term.name().to_owned()).collect()
}

fn ground_tuple(atom: &Predicate) -> Tuple {
    atom.terms().map(|term| term.name().to_owned()).collect()
}
