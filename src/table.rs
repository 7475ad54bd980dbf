//! Intermediate tables used while evaluating a rule body.
//!
//! A table's columns are labelled by the variables they bind. Binding an atom
//! to a relation renames the relation's columns to the atom's terms, keeps
//! only the rows that agree with the atom's constants, and drops the constant
//! columns, so joining two tables is a natural join on their shared variable
//! names.

use std::cmp::Ordering;
use std::collections::HashMap;

use num_bigint::BigInt;

use crate::ast::{Constraint, Predicate, Term, Theta, Variable, NO_CONTEXT};
use crate::relation::{Relation, Tuple, Value};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Variable>,
    rows: Vec<Tuple>,
}

impl Table {
    pub fn new(columns: Vec<Variable>, rows: Vec<Tuple>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Variable] {
        &self.columns
    }

    pub fn rows(&self) -> &[Tuple] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Binds `atom` against the tuples of `relation`.
    ///
    /// Constant terms select rows holding that constant, a repeated variable
    /// selects rows whose columns agree, and a variable context never binds
    /// to `none`.
    pub fn bind(atom: &Predicate, relation: &Relation) -> Table {
        let mut columns: Vec<Variable> = Vec::new();
        for variable in atom.variables() {
            if !columns.iter().any(|column| column == variable) {
                columns.push(variable.to_owned());
            }
        }

        if relation.arity() != atom.arity() {
            tracing::warn!(
                relation = %atom.name,
                expected = atom.arity(),
                found = relation.arity(),
                "binding atom to relation of different arity"
            );
            return Table::new(columns, Vec::new());
        }

        let context_position = atom.arity() - 1;
        let rows = relation
            .iter()
            .filter_map(|tuple| {
                let mut row: Vec<Option<&Value>> = vec![None; columns.len()];
                for (position, (term, value)) in atom.terms().zip(tuple).enumerate() {
                    match term {
                        Term::Constant(constant) => {
                            if value != constant {
                                return None;
                            }
                        }
                        Term::Variable(variable) => {
                            if position == context_position && value == NO_CONTEXT {
                                return None;
                            }
                            let index = columns.iter().position(|column| column == variable)?;
                            let slot = &mut row[index];
                            match slot {
                                Some(bound) if *bound != value => return None,
                                Some(_) => {}
                                None => *slot = Some(value),
                            }
                        }
                    }
                }
                row.into_iter()
                    .map(|value| value.cloned())
                    .collect::<Option<Tuple>>()
            })
            .collect();

        Table::new(columns, rows)
    }

    /// Natural join on the shared column names, or the cross product when
    /// there are none. The result keeps `self`'s columns followed by the
    /// columns only `other` has.
    pub fn join(&self, other: &Table) -> Table {
        let shared: Vec<(usize, usize)> = other
            .columns
            .iter()
            .enumerate()
            .filter_map(|(right, column)| Some((self.column_index(column)?, right)))
            .collect();
        let extra: Vec<usize> = (0..other.columns.len())
            .filter(|right| !shared.iter().any(|(_, column)| column == right))
            .collect();

        let mut columns = self.columns.clone();
        columns.extend(extra.iter().map(|&right| other.columns[right].clone()));

        let combine = |left: &Tuple, right: &Tuple| -> Tuple {
            let mut row = left.clone();
            row.extend(extra.iter().map(|&index| right[index].clone()));
            row
        };

        let rows = if shared.is_empty() {
            self.rows
                .iter()
                .flat_map(|left| other.rows.iter().map(move |right| combine(left, right)))
                .collect()
        } else {
            let mut index: HashMap<Vec<&Value>, Vec<&Tuple>> = HashMap::new();
            for right in &other.rows {
                let key = shared.iter().map(|&(_, column)| &right[column]).collect();
                index.entry(key).or_default().push(right);
            }

            let mut rows = Vec::new();
            for left in &self.rows {
                let key: Vec<&Value> = shared.iter().map(|&(column, _)| &left[column]).collect();
                if let Some(matches) = index.get(&key) {
                    rows.extend(matches.iter().map(|right| combine(left, right)));
                }
            }
            rows
        };

        Table::new(columns, rows)
    }

    /// Appends the rows of `other` without removing duplicates. Columns are
    /// matched by name.
    pub fn append(&mut self, other: Table) {
        if other.columns == self.columns {
            self.rows.extend(other.rows);
            return;
        }

        let mapping: Option<Vec<usize>> = self
            .columns
            .iter()
            .map(|column| other.column_index(column))
            .collect();
        match mapping {
            Some(mapping) if other.columns.len() == self.columns.len() => {
                self.rows.extend(
                    other
                        .rows
                        .into_iter()
                        .map(|row| mapping.iter().map(|&index| row[index].clone()).collect()),
                );
            }
            _ => tracing::warn!(
                left = ?self.columns,
                right = ?other.columns,
                "cannot append tables with different columns"
            ),
        }
    }

    /// Keeps the rows satisfying `constraint`. A constraint over a variable
    /// the table does not bind keeps nothing.
    pub fn filter(&mut self, constraint: &Constraint) {
        let lhs = match self.operand(&constraint.lhs) {
            Some(lhs) => lhs,
            None => {
                tracing::warn!(%constraint, "constraint variable is not bound by the body");
                self.rows.clear();
                return;
            }
        };
        let rhs = match self.operand(&constraint.rhs) {
            Some(rhs) => rhs,
            None => {
                tracing::warn!(%constraint, "constraint variable is not bound by the body");
                self.rows.clear();
                return;
            }
        };

        self.rows.retain(|row| {
            let lhs = lhs.resolve(row);
            let rhs = rhs.resolve(row);
            compare(constraint.theta, lhs, rhs)
        });
    }

    fn operand<'a>(&self, term: &'a Term) -> Option<Operand<'a>> {
        match term {
            Term::Variable(variable) => self.column_index(variable).map(Operand::Column),
            Term::Constant(constant) => Some(Operand::Constant(constant)),
        }
    }

    /// Instantiates `head` once per row: variables are read from their
    /// columns and constants are copied as they are. Returns `None` if the
    /// head names a variable the table does not bind.
    pub fn project(&self, head: &Predicate) -> Option<Vec<Tuple>> {
        let operands: Vec<Operand> = head
            .terms()
            .map(|term| self.operand(term))
            .collect::<Option<_>>()?;

        Some(
            self.rows
                .iter()
                .map(|row| {
                    operands
                        .iter()
                        .map(|operand| operand.resolve(row).to_owned())
                        .collect()
                })
                .collect(),
        )
    }
}

#[derive(Clone, Copy, Debug)]
enum Operand<'a> {
    Column(usize),
    Constant(&'a str),
}

impl<'a> Operand<'a> {
    fn resolve<'r>(&self, row: &'r [Value]) -> &'r str
    where
        'a: 'r,
    {
        match *self {
            Operand::Column(index) => &row[index],
            Operand::Constant(constant) => constant,
        }
    }
}

/// Compares two values under `theta`. Integers compare numerically, anything
/// else compares as text.
pub fn compare(theta: Theta, lhs: &str, rhs: &str) -> bool {
    let ordering = match (lhs.parse::<BigInt>(), rhs.parse::<BigInt>()) {
        (Ok(lhs), Ok(rhs)) => lhs.cmp(&rhs),
        _ => lhs.cmp(rhs),
    };

    match theta {
        Theta::Less => ordering == Ordering::Less,
        Theta::Greater => ordering == Ordering::Greater,
        Theta::LessEqual => ordering != Ordering::Greater,
        Theta::GreaterEqual => ordering != Ordering::Less,
        Theta::NotEqual => ordering != Ordering::Equal,
        Theta::Equal => ordering == Ordering::Equal,
    }
}
