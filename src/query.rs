use itertools::Itertools;

use crate::ast::{Predicate, Query, Term};
use crate::relation::{Database, Relation, RelationStore};
use crate::table::Table;

/// The distinct ways a query's atoms can be instantiated at the fixpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    pub query: Query,
    pub instances: Vec<Vec<Predicate>>,
}

/// Solves `query` once against the derived relations `idb` and the stored
/// relations of `store`. Atoms over unknown relations have no answers.
pub fn answer(query: &Query, store: &RelationStore, idb: &Database) -> Answer {
    let instances = solve(query, store, idb)
        .map(|table| {
            table
                .rows()
                .iter()
                .map(|row| {
                    query
                        .atoms()
                        .map(|atom| instantiate(atom, &table, row))
                        .collect::<Vec<_>>()
                })
                .unique()
                .collect()
        })
        .unwrap_or_default();

    Answer {
        query: query.clone(),
        instances,
    }
}

fn resolve<'a>(name: &str, store: &'a RelationStore, idb: &'a Database) -> Option<&'a Relation> {
    idb.get(name)
        .or_else(|| store.cdb.get(name))
        .or_else(|| store.edb.get(name))
}

fn solve(query: &Query, store: &RelationStore, idb: &Database) -> Option<Table> {
    let mut body: Option<Table> = None;
    for atom in query.atoms() {
        let relation = match resolve(&atom.name, store, idb) {
            Some(relation) => relation,
            None => {
                tracing::debug!(relation = %atom.name, "query reads an undefined relation");
                return None;
            }
        };
        let table = Table::bind(atom, relation);
        let joined = match body {
            Some(body) => body.join(&table),
            None => table,
        };
        if joined.is_empty() {
            return None;
        }
        body = Some(joined);
    }

    let mut body = body?;
    for constraint in query.body.iter().filter_map(|item| item.as_constraint()) {
        body.filter(constraint);
    }
    Some(body)
}

fn instantiate(atom: &Predicate, table: &Table, row: &[String]) -> Predicate {
    let ground = |term: &Term| match term {
        Term::Variable(variable) => match table.column_index(variable) {
            Some(index) => Term::Constant(row[index].clone()),
            None => term.clone(),
        },
        Term::Constant(_) => term.clone(),
    };

    Predicate {
        name: atom.name.clone(),
        arguments: atom.arguments.iter().map(ground).collect(),
        context: ground(&atom.context),
        kind: atom.kind,
    }
}
