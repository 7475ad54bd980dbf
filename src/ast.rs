use std::fmt;

use itertools::Itertools;

pub type Identifier = String;
pub type RelationName = Identifier;
pub type Variable = Identifier;

/// Context value of a predicate that carries no context.
pub const NO_CONTEXT: &str = "none";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(Variable),
    Constant(Identifier),
}

impl Term {
    /// Classifies a name by its first character: uppercase names are
    /// variables, everything else is a constant.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if is_variable_name(&name) {
            Term::Variable(name)
        } else {
            Term::Constant(name)
        }
    }

    pub fn none() -> Self {
        Term::Constant(NO_CONTEXT.to_owned())
    }

    pub fn name(&self) -> &str {
        match self {
            Term::Variable(name) | Term::Constant(name) => name,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            Term::Constant(_) => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Term::Constant(name) if name == NO_CONTEXT)
    }
}

pub fn is_variable_name(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_uppercase)
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    Plain,
    Contextual,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub name: RelationName,
    pub arguments: Vec<Term>,
    pub context: Term,
    pub kind: PredicateKind,
}

impl Predicate {
    pub fn new(name: impl Into<String>, arguments: Vec<Term>) -> Self {
        Self {
            name: name.into(),
            arguments,
            context: Term::none(),
            kind: PredicateKind::Plain,
        }
    }

    pub fn with_context(mut self, context: Term) -> Self {
        self.context = context;
        self
    }

    /// Number of stored columns: the arguments plus the trailing context.
    pub fn arity(&self) -> usize {
        self.arguments.len() + 1
    }

    /// Arguments followed by the context, in column order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.arguments.iter().chain(std::iter::once(&self.context))
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms().filter_map(Term::as_variable)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.arguments.iter().join(", "))?;
        if !self.context.is_none() {
            write!(f, "@{}", self.context)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theta {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    NotEqual,
    Equal,
}

impl Theta {
    pub fn parse(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "<" => Theta::Less,
            ">" => Theta::Greater,
            "<=" => Theta::LessEqual,
            ">=" => Theta::GreaterEqual,
            "!=" => Theta::NotEqual,
            "=" => Theta::Equal,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Theta::Less => "<",
            Theta::Greater => ">",
            Theta::LessEqual => "<=",
            Theta::GreaterEqual => ">=",
            Theta::NotEqual => "!=",
            Theta::Equal => "=",
        }
    }
}

impl fmt::Display for Theta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub lhs: Term,
    pub theta: Theta,
    pub rhs: Term,
}

impl Constraint {
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.lhs, &self.rhs]
            .into_iter()
            .filter_map(Term::as_variable)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.theta, self.rhs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyItem {
    Atom(Predicate),
    Constraint(Constraint),
}

impl BodyItem {
    pub fn as_atom(&self) -> Option<&Predicate> {
        match self {
            BodyItem::Atom(atom) => Some(atom),
            BodyItem::Constraint(_) => None,
        }
    }

    pub fn as_constraint(&self) -> Option<&Constraint> {
        match self {
            BodyItem::Atom(_) => None,
            BodyItem::Constraint(constraint) => Some(constraint),
        }
    }
}

impl fmt::Display for BodyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyItem::Atom(atom) => fmt::Display::fmt(atom, f),
            BodyItem::Constraint(constraint) => fmt::Display::fmt(constraint, f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub head: Predicate,
    pub body: Vec<BodyItem>,
}

impl Rule {
    pub fn atoms(&self) -> impl Iterator<Item = &Predicate> + '_ {
        self.body.iter().filter_map(BodyItem::as_atom)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> + '_ {
        self.body.iter().filter_map(BodyItem::as_constraint)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- {}.", self.head, self.body.iter().join(", "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fact {
    pub predicate: Predicate,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.", self.predicate)
    }
}

/// One value listed for a context dimension: either a single constant or a
/// bracketed tuple of constants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    Single(Term),
    Tuple(Vec<Term>),
}

impl Attribute {
    pub fn terms(&self) -> &[Term] {
        match self {
            Attribute::Single(term) => std::slice::from_ref(term),
            Attribute::Tuple(terms) => terms,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Single(term) => fmt::Display::fmt(term, f),
            Attribute::Tuple(terms) => write!(f, "[{}]", terms.iter().join(", ")),
        }
    }
}

/// A dimension of a context declaration, e.g. `from : [east, west]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextualPredicate {
    pub name: RelationName,
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextDecl {
    pub name: Identifier,
    pub predicates: Vec<ContextualPredicate>,
}

impl ContextDecl {
    /// Views every dimension as a contextual predicate per listed attribute,
    /// with the context forced to the declaration name.
    pub fn contextual_atoms(&self) -> impl Iterator<Item = Predicate> + '_ {
        self.predicates.iter().flat_map(move |predicate| {
            predicate.attributes.iter().map(move |attribute| Predicate {
                name: predicate.name.clone(),
                arguments: attribute.terms().to_vec(),
                context: Term::Constant(self.name.clone()),
                kind: PredicateKind::Contextual,
            })
        })
    }
}

impl fmt::Display for ContextDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self
            .predicates
            .iter()
            .map(|predicate| {
                format!(
                    "{} : [{}]",
                    predicate.name,
                    predicate.attributes.iter().join(", ")
                )
            })
            .join(", ");
        write!(f, "{} = {{{}}}.", self.name, pairs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub body: Vec<BodyItem>,
}

impl Query {
    pub fn atoms(&self) -> impl Iterator<Item = &Predicate> + '_ {
        self.body.iter().filter_map(BodyItem::as_atom)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?", self.body.iter().join(", "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Context(ContextDecl),
    Fact(Fact),
    Rule(Rule),
    Query(Query),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Context(context) => fmt::Display::fmt(context, f),
            Statement::Fact(fact) => fmt::Display::fmt(fact, f),
            Statement::Rule(rule) => fmt::Display::fmt(rule, f),
            Statement::Query(query) => fmt::Display::fmt(query, f),
        }
    }
}
