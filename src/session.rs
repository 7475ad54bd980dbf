use std::fmt;

use anyhow::Result;

use crate::ast::Statement;
use crate::classify::{Diagnostic, Program};
use crate::eval::{evaluate, Evaluation};
use crate::parser::{parse_program, SyntaxError};
use crate::query::{answer, Answer};
use crate::report::Inferences;
use crate::safety::check_statement;

/// Statements collected from one or more pieces of source text.
#[derive(Clone, Debug, Default)]
pub struct Session {
    statements: Vec<Statement>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Parses `code` and keeps its statements. Malformed statements are
    /// skipped and returned.
    pub fn load(&mut self, code: &str) -> Result<Vec<SyntaxError>> {
        let parsed = parse_program(code)?;
        self.statements.extend(parsed.statements);
        Ok(parsed.errors)
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Evaluates the session as if `queries` had been loaded after it.
    pub fn ask(&self, queries: Vec<Statement>) -> Outcome {
        let mut statements = self.statements.clone();
        statements.extend(queries);
        evaluate_statements(statements)
    }

    pub fn evaluate(&self) -> Outcome {
        evaluate_statements(self.statements.clone())
    }

    /// What the classifier reports for the statements loaded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        Program::from(self.statements.clone()).diagnostics
    }

    /// Handles one piece of interactive input. Contexts, facts and rules are
    /// kept, queries are answered against everything kept so far. Returns the
    /// text to show: syntax errors, unsafe statements, diagnostics caused by
    /// this input, then the answers.
    pub fn execute(&mut self, code: &str) -> Result<String> {
        let parsed = parse_program(code)?;
        let mut output = String::new();

        for error in parsed.errors {
            output.push_str(&format!("{}\n", error));
        }

        let known = self.diagnostics();
        let mut queries = vec![];
        for statement in parsed.statements {
            if let Err(violation) = check_statement(&statement) {
                output.push_str(&format!("{}\n", violation));
                continue;
            }
            match statement {
                Statement::Query(_) => queries.push(statement),
                statement => self.push(statement),
            }
        }

        let (diagnostics, answers) = if queries.is_empty() {
            (self.diagnostics(), vec![])
        } else {
            let outcome = self.ask(queries);
            (outcome.program.diagnostics, outcome.answers)
        };
        for diagnostic in diagnostics.iter().filter(|diagnostic| !known.contains(diagnostic)) {
            output.push_str(&format!("{}\n", diagnostic));
        }
        for answer in answers {
            output.push_str(&answer.to_string());
        }

        Ok(output)
    }
}

fn evaluate_statements(statements: Vec<Statement>) -> Outcome {
    let program = Program::from(statements);
    let evaluation = evaluate(&program.store, &program.rules);
    tracing::debug!(
        rules = program.rules.len(),
        rounds = evaluation.rounds,
        "evaluated program"
    );

    let answers = program
        .queries
        .iter()
        .map(|query| answer(query, &program.store, &evaluation.idb))
        .collect();

    Outcome {
        program,
        evaluation,
        answers,
    }
}

/// A program together with its fixpoint and the answers to its queries.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub program: Program,
    pub evaluation: Evaluation,
    pub answers: Vec<Answer>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.program.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }

        if self.answers.is_empty() {
            fmt::Display::fmt(&Inferences(&self.evaluation.idb), f)
        } else {
            self.answers.iter().try_for_each(|answer| fmt::Display::fmt(answer, f))
        }
    }
}
