//! Semi-naive bottom-up evaluation.
//!
//! Every IDB relation is tracked as three snapshots: `old` holds the facts
//! known before the previous round, `delta` the facts first confirmed in the
//! previous round and `new` the facts derived in the current round. A rule
//! with IDB atoms is only evaluated on combinations that read at least one
//! `delta` snapshot, since a combination of `old` snapshots alone can only
//! reproduce facts that are already known. Evaluation stops at the first round
//! whose `delta` is empty.

use itertools::Itertools;
use tracing::{debug, trace, warn};

use crate::ast::Rule;
use crate::relation::{Database, Relation, RelationKind, RelationStore, Tuple};
use crate::table::Table;

/// The fixpoint of a program's rules.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub idb: Database,
    pub rounds: usize,
}

/// Computes every fact derivable from `store` through `rules`.
///
/// The IDB relations of `store` seed the first round's `delta`; EDB and CDB
/// relations are read as they are. Every rule head must name an IDB relation.
pub fn evaluate(store: &RelationStore, rules: &[Rule]) -> Evaluation {
    SemiNaive::new(store).run(rules)
}

struct SemiNaive<'a> {
    store: &'a RelationStore,
    old: Database,
    delta: Database,
    new: Database,
}

impl<'a> SemiNaive<'a> {
    fn new(store: &'a RelationStore) -> Self {
        Self {
            store,
            old: store.idb.empty_like(),
            delta: store.idb.clone(),
            new: store.idb.empty_like(),
        }
    }

    fn run(mut self, rules: &[Rule]) -> Evaluation {
        let mut rounds = 0;

        loop {
            rounds += 1;

            for rule in rules {
                let derived = match self.fire(rule) {
                    Some(derived) => derived,
                    None => continue,
                };
                trace!(%rule, derived = derived.len(), "rule fired");

                match self.new.get_mut(&rule.head.name) {
                    Some(relation) => relation.extend(derived),
                    None => warn!(relation = %rule.head.name, "rule head is not an IDB relation"),
                }
            }

            self.old = self.old.zip_with(&self.delta, Relation::union);
            self.delta = self.new.zip_with(&self.old, Relation::difference);

            let delta = self.delta.total_len();
            debug!(round = rounds, delta, known = self.old.total_len(), "round finished");
            if delta == 0 {
                break;
            }

            self.new = self.new.empty_like();
        }

        debug!(rounds, facts = self.old.total_len(), "fixpoint reached");
        Evaluation {
            idb: self.old,
            rounds,
        }
    }

    /// Evaluates one rule against the current snapshots. Returns `None` when
    /// the rule cannot derive anything this round.
    fn fire(&self, rule: &Rule) -> Option<Vec<Tuple>> {
        let mut incremental: Vec<(Table, Table)> = Vec::new();
        let mut contextual: Vec<Table> = Vec::new();
        let mut extensional: Vec<Table> = Vec::new();

        for atom in rule.atoms() {
            match self.store.kind_of(&atom.name) {
                Some(RelationKind::Intensional) => {
                    let old = self.old.get(&atom.name)?;
                    let delta = self.delta.get(&atom.name)?;
                    if old.is_empty() && delta.is_empty() {
                        return None;
                    }
                    incremental.push((Table::bind(atom, old), Table::bind(atom, delta)));
                }
                Some(RelationKind::Contextual) => {
                    let relation = self.store.cdb.get(&atom.name)?;
                    if relation.is_empty() {
                        return None;
                    }
                    contextual.push(Table::bind(atom, relation));
                }
                Some(RelationKind::Extensional) => {
                    let relation = self.store.edb.get(&atom.name)?;
                    if relation.is_empty() {
                        return None;
                    }
                    extensional.push(Table::bind(atom, relation));
                }
                None => {
                    trace!(relation = %atom.name, "undefined relation reads as empty");
                    return None;
                }
            }
        }

        let mut body = if incremental.is_empty() {
            None
        } else {
            Some(join_incremental(&incremental)?)
        };

        for table in contextual.into_iter().chain(extensional) {
            let joined = match body {
                Some(body) => body.join(&table),
                None => table,
            };
            if joined.is_empty() {
                return None;
            }
            body = Some(joined);
        }

        let mut body = body.filter(|body| !body.is_empty())?;
        for constraint in rule.constraints() {
            body.filter(constraint);
        }

        let derived = body.project(&rule.head);
        if derived.is_none() {
            warn!(%rule, "rule head uses a variable its body does not bind");
        }
        derived
    }
}

/// Joins the IDB atoms of a rule once per combination of `old` and `delta`
/// snapshots that reads at least one `delta`, and appends the results.
fn join_incremental(atoms: &[(Table, Table)]) -> Option<Table> {
    let mut result: Option<Table> = None;

    for combination in delta_combinations(atoms.len()) {
        let selected: Vec<&Table> = atoms
            .iter()
            .enumerate()
            .map(|(index, (old, delta))| {
                if combination.contains(&index) {
                    delta
                } else {
                    old
                }
            })
            .collect();
        if selected.iter().any(|table| table.is_empty()) {
            continue;
        }

        let mut tables = selected.into_iter();
        let first = match tables.next() {
            Some(first) => first.clone(),
            None => continue,
        };
        let joined = tables.fold(first, |joined, table| joined.join(table));

        result = Some(match result.take() {
            Some(mut result) => {
                result.append(joined);
                result
            }
            None => joined,
        });
    }

    result.filter(|result| !result.is_empty())
}

/// Every non-empty subset of the positions `0..count`, smallest subsets
/// first. Each subset lists the positions that read their `delta` snapshot.
pub fn delta_combinations(count: usize) -> impl Iterator<Item = Vec<usize>> {
    (1..=count).flat_map(move |size| (0..count).combinations(size))
}
