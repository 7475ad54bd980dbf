pub mod ast;
pub mod classify;
pub mod eval;
pub mod parser;
pub mod query;
pub mod relation;
pub mod report;
pub mod safety;
pub mod session;
pub mod table;

#[cfg(test)]
mod tests;

pub use classify::Program;
pub use eval::{evaluate, Evaluation};
pub use parser::parse_program;
pub use session::{Outcome, Session};
