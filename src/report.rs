use std::fmt;

use itertools::Itertools;

use crate::ast::NO_CONTEXT;
use crate::query::Answer;
use crate::relation::{Database, Value};

/// Renders one tuple of `name` as a fact: `name(a, b).` or, when the trailing
/// context is set, `name(a, b)@context.`.
pub fn render_tuple(name: &str, tuple: &[Value]) -> String {
    match tuple.split_last() {
        Some((context, arguments)) if context != NO_CONTEXT => {
            format!("{}({})@{}.", name, arguments.iter().join(", "), context)
        }
        Some((_, arguments)) => format!("{}({}).", name, arguments.iter().join(", ")),
        None => format!("{}().", name),
    }
}

/// Every tuple of every relation in `idb`, in relation order.
pub struct Inferences<'a>(pub &'a Database);

impl fmt::Display for Inferences<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">>> All inferences from the program:")?;
        for (name, relation) in self.0.iter() {
            for tuple in relation.iter() {
                writeln!(f, "    {}", render_tuple(name, tuple))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">>> Query: {}", self.query)?;
        if self.instances.is_empty() {
            return writeln!(f, "    No answers.");
        }
        for instance in &self.instances {
            writeln!(f, "    {}.", instance.iter().join(", "))?;
        }
        Ok(())
    }
}
