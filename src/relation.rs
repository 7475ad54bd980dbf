//! Materialized relations and the three named stores they live in.
//!
//! Every relation carries its column labels and keeps set semantics: a tuple
//! is stored at most once, in the order it was first inserted.

use std::collections::{HashMap, HashSet};

use crate::ast::RelationName;

pub type Value = String;
pub type Tuple = Vec<Value>;
pub type ColumnName = String;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relation {
    columns: Vec<ColumnName>,
    tuples: Vec<Tuple>,
    seen: HashSet<Tuple>,
}

impl Relation {
    pub fn new(columns: Vec<ColumnName>) -> Self {
        Self {
            columns,
            tuples: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// An empty relation with the same columns.
    pub fn empty_like(&self) -> Self {
        Self::new(self.columns.clone())
    }

    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> + '_ {
        self.tuples.iter()
    }

    pub fn contains(&self, tuple: &[Value]) -> bool {
        self.seen.contains(tuple)
    }

    /// Inserts a tuple. Returns false when it was already present.
    pub fn insert(&mut self, tuple: Tuple) -> bool {
        debug_assert_eq!(tuple.len(), self.arity(), "tuple arity mismatch");

        if self.seen.contains(&tuple) {
            return false;
        }
        self.seen.insert(tuple.clone());
        self.tuples.push(tuple);
        true
    }

    /// Tuples of `self` that are not in `other`, under `self`'s columns.
    pub fn difference(&self, other: &Relation) -> Relation {
        let mut result = self.empty_like();
        result.extend(self.iter().filter(|tuple| !other.contains(tuple)).cloned());
        result
    }

    pub fn union(&self, other: &Relation) -> Relation {
        let mut result = self.clone();
        result.extend(other.iter().cloned());
        result
    }
}

impl Extend<Tuple> for Relation {
    fn extend<I: IntoIterator<Item = Tuple>>(&mut self, iter: I) {
        for tuple in iter {
            self.insert(tuple);
        }
    }
}

/// Named relations, iterated in the order the names were first added.
#[derive(Clone, Debug, Default)]
pub struct Database {
    names: Vec<RelationName>,
    relations: HashMap<RelationName, Relation>,
}

impl Database {
    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Relation> {
        self.relations.get_mut(name)
    }

    /// Returns the relation called `name`, creating it empty with `columns`
    /// if it does not exist yet.
    pub fn get_or_create(&mut self, name: &str, columns: Vec<ColumnName>) -> &mut Relation {
        if !self.relations.contains_key(name) {
            self.names.push(name.to_owned());
        }
        self.relations
            .entry(name.to_owned())
            .or_insert_with(|| Relation::new(columns))
    }

    pub fn insert(&mut self, name: RelationName, relation: Relation) {
        if !self.relations.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.relations.insert(name, relation);
    }

    pub fn remove(&mut self, name: &str) -> Option<Relation> {
        let relation = self.relations.remove(name)?;
        self.names.retain(|existing| existing != name);
        Some(relation)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relation)> + '_ {
        self.names
            .iter()
            .map(move |name| (name.as_str(), &self.relations[name]))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of tuples across all relations.
    pub fn total_len(&self) -> usize {
        self.relations.values().map(Relation::len).sum()
    }

    /// Same names and columns, no tuples.
    pub fn empty_like(&self) -> Self {
        Self {
            names: self.names.clone(),
            relations: self
                .relations
                .iter()
                .map(|(name, relation)| (name.clone(), relation.empty_like()))
                .collect(),
        }
    }

    /// Applies `op` to every pair of same-named relations. Names missing from
    /// `other` are paired with an empty relation.
    pub fn zip_with(
        &self,
        other: &Database,
        op: impl Fn(&Relation, &Relation) -> Relation,
    ) -> Database {
        let mut result = Database::default();
        for (name, relation) in self.iter() {
            let combined = match other.get(name) {
                Some(other) => op(relation, other),
                None => op(relation, &relation.empty_like()),
            };
            result.insert(name.to_owned(), combined);
        }
        result
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationKind {
    Extensional,
    Intensional,
    Contextual,
}

/// EDB, IDB and CDB. After classification a name lives in exactly one of
/// them.
#[derive(Clone, Debug, Default)]
pub struct RelationStore {
    pub edb: Database,
    pub idb: Database,
    pub cdb: Database,
}

impl RelationStore {
    pub fn kind_of(&self, name: &str) -> Option<RelationKind> {
        if self.idb.contains(name) {
            Some(RelationKind::Intensional)
        } else if self.cdb.contains(name) {
            Some(RelationKind::Contextual)
        } else if self.edb.contains(name) {
            Some(RelationKind::Extensional)
        } else {
            None
        }
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.idb
            .get(name)
            .or_else(|| self.cdb.get(name))
            .or_else(|| self.edb.get(name))
    }
}
