use hashbag::HashBag;
use itertools::Itertools;

use crate::ast::{Attribute, BodyItem, Predicate, PredicateKind, Statement, Term, Theta};
use crate::classify::{Diagnostic, Program};
use crate::eval::{delta_combinations, evaluate};
use crate::parser::parse_program;
use crate::relation::{Relation, RelationKind};
use crate::report::render_tuple;
use crate::safety::SafetyViolation;
use crate::table::{compare, Table};
use crate::{Outcome, Session};

const PATH_PROGRAM: &str = r#"
edge(a, b).
edge(b, c).
path(X, Y) :- edge(X, Y).
path(X, Z) :- path(X, Y), edge(Y, Z).
"#;

const DIRECTIONS_PROGRAM: &str = r#"
% Contexts
c1 = {from : [east], to : [right]}.
c2 = {from : [west], to : [left]}.
% Facts
p(john, east).
p(rose, west).
% Rules
p(X, Y)@C :- p(X, Y), from(Y)@C.
side(X, Z)@C :- p(X, Y)@C, to(Z)@C.
"#;

fn run(code: &str) -> Outcome {
    let mut session = Session::default();
    let errors = session.load(code).unwrap();
    assert!(errors.is_empty(), "unexpected syntax errors: {:?}", errors);
    let outcome = session.evaluate();
    println!("***** BEGIN OUTPUT *****");
    print!("{}", outcome);
    println!("***** END OUTPUT *****");
    outcome
}

fn bag(relation: &Relation) -> HashBag<Vec<&str>> {
    HashBag::from_iter(
        relation
            .iter()
            .map(|tuple| tuple.iter().map(String::as_str).collect::<Vec<_>>()),
    )
}

fn test_program(code: &str, relation: &str, expected: &[&[&str]]) {
    let outcome = run(code);
    let relation = outcome
        .evaluation
        .idb
        .get(relation)
        .unwrap_or_else(|| panic!("no derived relation {:?}", relation));
    let expected = HashBag::from_iter(expected.iter().map(|tuple| tuple.to_vec()));
    assert_eq!(bag(relation), expected);
}

fn program(code: &str) -> Program {
    let parsed = parse_program(code).unwrap();
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    Program::from(parsed.statements)
}

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    Table::new(
        columns.iter().map(|column| column.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect(),
    )
}

fn table_bag(table: &Table) -> HashBag<Vec<&str>> {
    HashBag::from_iter(
        table
            .rows()
            .iter()
            .map(|row| row.iter().map(String::as_str).collect::<Vec<_>>()),
    )
}

// Parsing

#[test]
fn test_parse_statement_kinds() {
    let parsed = parse_program(
        "c1 = {loc : [east, [a, b]]}.
        p(john)@c1.
        q(X)@C :- p(X)@C, loc(east)@C, X != rose.
        q(X), X > 1 ?",
    )
    .unwrap();
    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.statements.len(), 4);

    match &parsed.statements[0] {
        Statement::Context(context) => {
            assert_eq!(context.name, "c1");
            assert_eq!(context.predicates[0].name, "loc");
            assert_eq!(
                context.predicates[0].attributes,
                vec![
                    Attribute::Single(Term::new("east")),
                    Attribute::Tuple(vec![Term::new("a"), Term::new("b")]),
                ]
            );
        }
        statement => panic!("expected a context, got {:?}", statement),
    }

    match &parsed.statements[1] {
        Statement::Fact(fact) => {
            assert_eq!(fact.predicate.context, Term::Constant("c1".to_owned()));
        }
        statement => panic!("expected a fact, got {:?}", statement),
    }

    match &parsed.statements[2] {
        Statement::Rule(rule) => {
            assert_eq!(rule.head.context, Term::Variable("C".to_owned()));
            assert_eq!(rule.atoms().count(), 2);
            let constraint = rule.constraints().next().unwrap();
            assert_eq!(constraint.theta, Theta::NotEqual);
            assert_eq!(constraint.rhs, Term::Constant("rose".to_owned()));
        }
        statement => panic!("expected a rule, got {:?}", statement),
    }

    match &parsed.statements[3] {
        Statement::Query(query) => {
            assert_eq!(query.atoms().count(), 1);
            assert!(matches!(query.body[1], BodyItem::Constraint(_)));
        }
        statement => panic!("expected a query, got {:?}", statement),
    }
}

#[test]
fn test_parse_terms_by_case() {
    assert_eq!(Term::new("X1"), Term::Variable("X1".to_owned()));
    assert_eq!(Term::new("john"), Term::Constant("john".to_owned()));
    assert_eq!(Term::new("18"), Term::Constant("18".to_owned()));
    assert_eq!(Term::new("_x"), Term::Constant("_x".to_owned()));
    assert!(Term::none().is_none());
}

#[test]
fn test_parse_recovers_from_malformed_statement() {
    let parsed = parse_program("p(a). q(. r(b).").unwrap();
    assert_eq!(parsed.statements.len(), 2);
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].line, 1);
    assert_eq!(parsed.errors[0].column, 7);
    assert_eq!(parsed.errors[0].text, "q(.");
}

#[test]
fn test_parse_reports_unterminated_statement() {
    let parsed = parse_program("p(a).\np(b)").unwrap();
    assert_eq!(parsed.statements.len(), 1);
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].line, 2);
}

#[test]
fn test_parse_empty_program() {
    let mut session = Session::default();
    assert!(session.load("% nothing here\n").unwrap().is_empty());
    assert!(session.is_empty());
}

#[test]
fn test_display_round_trips_through_parser() {
    let source = "q(X)@C :- p(X)@C, loc(east)@C, X >= 18.";
    let parsed = parse_program(source).unwrap();
    assert_eq!(parsed.statements[0].to_string(), source);
}

// Safety

#[test]
fn test_unsafe_rule_is_dropped() {
    let outcome = run("q(a). p(X) :- q(Y).");
    assert!(outcome.evaluation.idb.get("p").is_none());
    assert!(outcome.program.rules.is_empty());
    match &outcome.program.diagnostics[..] {
        [Diagnostic::Unsafe(violation @ SafetyViolation::UnsafeRule { .. })] => {
            assert_eq!(violation.terms(), &[Term::new("X")]);
        }
        diagnostics => panic!("unexpected diagnostics {:?}", diagnostics),
    }
}

#[test]
fn test_unbound_head_context_is_unsafe() {
    let outcome = run("q(a). p(X)@C :- q(X).");
    assert!(outcome.program.rules.is_empty());
    assert!(matches!(
        &outcome.program.diagnostics[..],
        [Diagnostic::Unsafe(SafetyViolation::UnsafeRule { .. })]
    ));
}

#[test]
fn test_unbound_constraint_variable_is_unsafe() {
    let outcome = run("q(a). p(X) :- q(X), Y > 1.");
    assert!(outcome.program.rules.is_empty());
    assert!(matches!(
        &outcome.program.diagnostics[..],
        [Diagnostic::Unsafe(SafetyViolation::UnboundConstraint { .. })]
    ));
}

#[test]
fn test_non_ground_fact_is_dropped() {
    let outcome = run("p(a). p(X). p(b)@C.");
    let edb = &outcome.program.store.edb;
    assert_eq!(bag(edb.get("p").unwrap()), HashBag::from_iter(vec![vec!["a", "none"]]));
    assert_eq!(outcome.program.diagnostics.len(), 2);
    assert!(outcome.program.diagnostics.iter().all(|diagnostic| matches!(
        diagnostic,
        Diagnostic::Unsafe(SafetyViolation::NonGroundFact { .. })
    )));
}

#[test]
fn test_non_constant_context_drops_whole_declaration() {
    let outcome = run("c1 = {loc : [east], to : [X]}. c2 = {loc : [west]}.");
    let cdb = &outcome.program.store.cdb;
    assert_eq!(bag(cdb.get("loc").unwrap()), HashBag::from_iter(vec![vec!["west", "c2"]]));
    assert!(cdb.get("to").is_none());
    assert!(matches!(
        &outcome.program.diagnostics[..],
        [Diagnostic::Unsafe(SafetyViolation::NonConstantContext { .. })]
    ));
}

// Classification

#[test]
fn test_context_tuples_carry_context_column() {
    let program = program("c1 = {route : [[a, b], [b, c]], loc : [east]}. c2 = {loc : [west]}.");
    let cdb = &program.store.cdb;
    assert_eq!(
        bag(cdb.get("route").unwrap()),
        HashBag::from_iter(vec![vec!["a", "b", "c1"], vec!["b", "c", "c1"]])
    );
    assert_eq!(
        bag(cdb.get("loc").unwrap()),
        HashBag::from_iter(vec![vec!["east", "c1"], vec!["west", "c2"]])
    );
}

#[test]
fn test_relation_schema_follows_defining_predicate() {
    let program = program("p(john, east). r(X, Y)@C :- p(X, Y), s(Y)@C.");
    assert_eq!(program.store.edb.get("p").unwrap().columns(), ["john", "east", "none"]);
    assert_eq!(program.store.idb.get("r").unwrap().columns(), ["X", "Y", "C"]);
    assert_eq!(program.store.idb.get("s").unwrap().columns(), ["Y", "C"]);
    assert!(program.store.idb.get("s").unwrap().is_empty());
}

#[test]
fn test_derivable_relation_moves_out_of_edb() {
    let program = program("p(a). q(b). p(X) :- q(X).");
    assert_eq!(program.relation_kind("p"), Some(RelationKind::Intensional));
    assert_eq!(program.relation_kind("q"), Some(RelationKind::Extensional));
    assert!(program.store.edb.get("p").is_none());
    assert_eq!(
        bag(program.store.idb.get("p").unwrap()),
        HashBag::from_iter(vec![vec!["a", "none"]])
    );

    test_program("p(a). q(b). p(X) :- q(X).", "p", &[&["a", "none"], &["b", "none"]]);
}

#[test]
fn test_facts_about_a_dimension_join_the_dimension() {
    let program = program("c1 = {loc : [east]}. loc(west)@c2.");
    assert!(program.store.edb.is_empty());
    assert_eq!(
        bag(program.store.cdb.get("loc").unwrap()),
        HashBag::from_iter(vec![vec!["east", "c1"], vec!["west", "c2"]])
    );
}

#[test]
fn test_rule_body_reordering() {
    let program = program(
        "c1 = {loc : [a]}.
        e(a). e(b).
        s(Y) :- e(Y).
        r(X, Y) :- e(X), X != Y, s(Y), loc(X)@c1.",
    );
    let rule = &program.rules[1];
    let names = rule
        .body
        .iter()
        .map(|item| match item {
            BodyItem::Atom(atom) => atom.name.as_str(),
            BodyItem::Constraint(_) => "constraint",
        })
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["s", "loc", "e", "constraint"]);
    assert_eq!(rule.atoms().nth(1).unwrap().kind, PredicateKind::Contextual);
    assert_eq!(rule.atoms().nth(2).unwrap().kind, PredicateKind::Plain);

    test_program(
        "c1 = {loc : [a]}.
        e(a). e(b).
        s(Y) :- e(Y).
        r(X, Y) :- e(X), X != Y, s(Y), loc(X)@c1.",
        "r",
        &[&["a", "b", "none"]],
    );
}

#[test]
fn test_statement_order_does_not_matter() {
    test_program(
        "path(X, Z) :- path(X, Y), edge(Y, Z).
        edge(b, c).
        path(X, Y) :- edge(X, Y).
        edge(a, b).",
        "path",
        &[&["a", "b", "none"], &["b", "c", "none"], &["a", "c", "none"]],
    );
}

#[test]
fn test_arity_mismatch_is_reported() {
    let outcome = run("p(a). p(a, b). q(X) :- p(X, Y).");
    assert_eq!(
        bag(outcome.program.store.edb.get("p").unwrap()),
        HashBag::from_iter(vec![vec!["a", "none"]])
    );
    assert!(outcome.program.rules.is_empty());
    assert_eq!(outcome.program.diagnostics.len(), 2);
    assert!(outcome.program.diagnostics.iter().all(|diagnostic| matches!(
        diagnostic,
        Diagnostic::ArityMismatch {
            expected: 2,
            found: 3,
            ..
        }
    )));
}

// Tables

#[test]
fn test_bind_filters_constants_and_none_context() {
    let mut relation = Relation::new(vec!["x".into(), "y".into(), "none".into()]);
    relation.insert(vec!["john".into(), "east".into(), "none".into()]);
    relation.insert(vec!["john".into(), "west".into(), "c1".into()]);
    relation.insert(vec!["rose".into(), "east".into(), "c2".into()]);

    let atom = Predicate::new("p", vec![Term::new("X"), Term::new("east")])
        .with_context(Term::new("C"));
    let bound = Table::bind(&atom, &relation);
    assert_eq!(bound.columns(), ["X", "C"]);
    assert_eq!(table_bag(&bound), HashBag::from_iter(vec![vec!["rose", "c2"]]));

    let plain = Predicate::new("p", vec![Term::new("X"), Term::new("Y")]);
    let bound = Table::bind(&plain, &relation);
    assert_eq!(table_bag(&bound), HashBag::from_iter(vec![vec!["john", "east"]]));
}

#[test]
fn test_bind_repeated_variable() {
    let mut relation = Relation::new(vec!["x".into(), "y".into(), "none".into()]);
    relation.insert(vec!["a".into(), "a".into(), "none".into()]);
    relation.insert(vec!["a".into(), "b".into(), "none".into()]);

    let atom = Predicate::new("p", vec![Term::new("X"), Term::new("X")]);
    let bound = Table::bind(&atom, &relation);
    assert_eq!(bound.columns(), ["X"]);
    assert_eq!(table_bag(&bound), HashBag::from_iter(vec![vec!["a"]]));
}

#[test]
fn test_natural_join_on_shared_columns() {
    let left = table(&["X", "Y"], &[&["a", "b"], &["b", "c"], &["c", "d"]]);
    let right = table(&["Y", "Z"], &[&["b", "x"], &["b", "y"], &["d", "z"]]);
    let joined = left.join(&right);
    assert_eq!(joined.columns(), ["X", "Y", "Z"]);
    assert_eq!(
        table_bag(&joined),
        HashBag::from_iter(vec![
            vec!["a", "b", "x"],
            vec!["a", "b", "y"],
            vec!["c", "d", "z"],
        ])
    );
}

#[test]
fn test_cross_join_without_shared_columns() {
    let left = table(&["X"], &[&["a"], &["b"]]);
    let right = table(&["Y"], &[&["1"], &["2"]]);
    let joined = left.join(&right);
    assert_eq!(joined.columns(), ["X", "Y"]);
    assert_eq!(joined.len(), 4);

    // A table without columns acts as a filter.
    let unit = table(&[], &[&[]]);
    assert_eq!(left.join(&unit).len(), 2);
    let nothing = table(&[], &[]);
    assert!(left.join(&nothing).is_empty());
}

#[test]
fn test_append_matches_columns_by_name() {
    let mut left = table(&["X", "Y"], &[&["a", "b"]]);
    left.append(table(&["Y", "X"], &[&["d", "c"], &["b", "a"]]));
    assert_eq!(
        table_bag(&left),
        HashBag::from_iter(vec![vec!["a", "b"], vec!["c", "d"], vec!["a", "b"]])
    );
}

#[test]
fn test_compare_numbers_and_text() {
    assert!(compare(Theta::Less, "9", "18"));
    assert!(compare(Theta::GreaterEqual, "18", "18"));
    assert!(compare(Theta::Equal, "018", "18"));
    assert!(compare(Theta::Less, "apple", "banana"));
    assert!(compare(Theta::NotEqual, "john", "rose"));
    assert!(!compare(Theta::Greater, "10", "9a"));
}

#[test]
fn test_delta_combinations() {
    assert_eq!(
        delta_combinations(3).collect::<Vec<_>>(),
        vec![
            vec![0],
            vec![1],
            vec![2],
            vec![0, 1],
            vec![0, 2],
            vec![1, 2],
            vec![0, 1, 2],
        ]
    );
    assert_eq!(delta_combinations(0).count(), 0);
}

// Evaluation

#[test]
fn test_natural_join_rule() {
    test_program(
        "p(john, east). r(X, Y) :- p(X, Y).",
        "r",
        &[&["john", "east", "none"]],
    );
}

#[test]
fn test_recursive_path() {
    test_program(
        PATH_PROGRAM,
        "path",
        &[&["a", "b", "none"], &["b", "c", "none"], &["a", "c", "none"]],
    );
}

#[test]
fn test_transitive_closure_with_two_idb_atoms() {
    test_program(
        "e(a, b). e(b, c). e(c, d).
        tc(X, Y) :- e(X, Y).
        tc(X, Z) :- tc(X, Y), tc(Y, Z).",
        "tc",
        &[
            &["a", "b", "none"],
            &["b", "c", "none"],
            &["c", "d", "none"],
            &["a", "c", "none"],
            &["b", "d", "none"],
            &["a", "d", "none"],
        ],
    );
}

#[test]
fn test_every_delta_combination_contributes() {
    // In the third round `p` and `q` both have old and delta facts, and each
    // of the three combinations derives a different `r` fact.
    test_program(
        "ep1(a, b). ep(e, b). eq(b, c). eq(c, d).
        p0(X, Y) :- ep(X, Y).
        p(X, Y) :- p0(X, Y).
        p(X, Y) :- ep1(X, Y).
        q(X, Y) :- eq(X, Y).
        q(X, Z) :- q(X, Y), eq(Y, Z).
        r(X, Z) :- p(X, Y), q(Y, Z).",
        "r",
        &[
            &["a", "c", "none"],
            &["a", "d", "none"],
            &["e", "c", "none"],
            &["e", "d", "none"],
        ],
    );
}

#[test]
fn test_cyclic_graph_terminates() {
    test_program(
        "e(a, b). e(b, a).
        reach(X, Y) :- e(X, Y).
        reach(X, Z) :- reach(X, Y), e(Y, Z).",
        "reach",
        &[
            &["a", "b", "none"],
            &["b", "a", "none"],
            &["a", "a", "none"],
            &["b", "b", "none"],
        ],
    );
}

#[test]
fn test_constraint_with_constant() {
    test_program(
        "age(john, 20). age(rose, 15). age(mark, 9).
        adult(X) :- age(X, A), A >= 18.",
        "adult",
        &[&["john", "none"]],
    );
}

#[test]
fn test_constraint_between_variables() {
    test_program(
        "age(john, 20). age(rose, 15). age(mark, 9).
        older(X, Y) :- age(X, A), age(Y, B), A > B.",
        "older",
        &[
            &["john", "rose", "none"],
            &["john", "mark", "none"],
            &["rose", "mark", "none"],
        ],
    );
}

#[test]
fn test_constant_in_body_and_head() {
    test_program(
        "p(john, east). p(rose, west).
        easterner(X, yes)@census :- p(X, east).",
        "easterner",
        &[&["john", "yes", "census"]],
    );
}

#[test]
fn test_context_propagation() {
    test_program(
        "c1 = {loc : [east]}.
        p(john)@c1.
        q(X)@C :- p(X)@C, loc(east)@C.",
        "q",
        &[&["john", "c1"]],
    );
}

#[test]
fn test_variable_context_never_binds_none() {
    test_program(
        "p(john). p(rose)@c1.
        q(X)@C :- p(X)@C.",
        "q",
        &[&["rose", "c1"]],
    );
}

#[test]
fn test_plain_atom_only_reads_facts_without_context() {
    test_program(
        "p(john). p(rose)@c1.
        q(X) :- p(X).",
        "q",
        &[&["john", "none"]],
    );
}

#[test]
fn test_directions_program() {
    let outcome = run(DIRECTIONS_PROGRAM);
    let idb = &outcome.evaluation.idb;
    assert_eq!(
        bag(idb.get("p").unwrap()),
        HashBag::from_iter(vec![
            vec!["john", "east", "none"],
            vec!["rose", "west", "none"],
            vec!["john", "east", "c1"],
            vec!["rose", "west", "c2"],
        ])
    );
    assert_eq!(
        bag(idb.get("side").unwrap()),
        HashBag::from_iter(vec![vec!["john", "right", "c1"], vec!["rose", "left", "c2"]])
    );
}

#[test]
fn test_undefined_relation_derives_nothing() {
    let outcome = run("q(a). p(X) :- q(X), missing(X).");
    assert!(outcome.evaluation.idb.get("p").unwrap().is_empty());
    assert!(outcome.evaluation.idb.get("missing").unwrap().is_empty());
}

#[test]
fn test_relations_keep_set_semantics() {
    let outcome = run(
        "p(a). p(a). p(b).
        e(a, b). e(a, b). e(b, a).
        q(X) :- p(X).
        q(X) :- e(X, Y).
        q(Y) :- e(X, Y), q(X).",
    );
    let store = &outcome.program.store;
    for (_, relation) in outcome
        .evaluation
        .idb
        .iter()
        .chain(store.edb.iter())
        .chain(store.cdb.iter())
    {
        assert_eq!(relation.iter().unique().count(), relation.len());
    }
    assert_eq!(outcome.evaluation.idb.get("q").unwrap().len(), 2);
}

#[test]
fn test_fixpoint_is_idempotent() {
    let outcome = run(PATH_PROGRAM);
    let mut store = outcome.program.store.clone();
    store.idb = outcome.evaluation.idb.clone();

    let again = evaluate(&store, &outcome.program.rules);
    assert_eq!(again.rounds, 1);
    for (name, relation) in outcome.evaluation.idb.iter() {
        assert_eq!(bag(again.idb.get(name).unwrap()), bag(relation));
    }
}

#[test]
fn test_rounds_follow_derivation_depth() {
    let outcome = run(
        "e(a, b). e(b, c). e(c, d). e(d, f).
        path(X, Y) :- e(X, Y).
        path(X, Z) :- path(X, Y), e(Y, Z).",
    );
    assert_eq!(outcome.evaluation.idb.get("path").unwrap().len(), 10);
    // One round per path length, then one that derives nothing new.
    assert_eq!(outcome.evaluation.rounds, 5);
}

// Queries and reporting

#[test]
fn test_render_tuple() {
    assert_eq!(
        render_tuple("r", &["john".to_owned(), "east".to_owned(), "none".to_owned()]),
        "r(john, east)."
    );
    assert_eq!(render_tuple("q", &["john".to_owned(), "c1".to_owned()]), "q(john)@c1.");
}

#[test]
fn test_all_inferences_are_printed_without_queries() {
    let outcome = run("p(john, east). r(X, Y) :- p(X, Y).");
    assert_eq!(
        outcome.to_string(),
        ">>> All inferences from the program:\n    r(john, east).\n"
    );
}

#[test]
fn test_diagnostics_precede_inferences() {
    let outcome = run("p(a). p(X) :- q(Y). r(X) :- p(X).");
    let output = outcome.to_string();
    assert!(output.starts_with("Unsafe rule found: p(X) :- q(Y)."));
    assert!(output.ends_with(">>> All inferences from the program:\n    r(a).\n"));
}

#[test]
fn test_query_is_answered() {
    let mut code = PATH_PROGRAM.to_owned();
    code.push_str("path(a, Y)?");
    let outcome = run(&code);
    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(
        outcome.to_string(),
        ">>> Query: path(a, Y)?\n    path(a, b).\n    path(a, c).\n"
    );
}

#[test]
fn test_query_with_constraint_over_facts() {
    let outcome = run("age(john, 20). age(rose, 15). age(X, A), A < 18 ?");
    let answer = &outcome.answers[0];
    assert_eq!(answer.instances.len(), 1);
    assert_eq!(answer.instances[0][0].to_string(), "age(rose, 15)");
}

#[test]
fn test_query_without_answers() {
    let outcome = run("p(a). p(b)? q(X)?");
    assert_eq!(
        outcome.to_string(),
        ">>> Query: p(b)?\n    No answers.\n>>> Query: q(X)?\n    No answers.\n"
    );
}

#[test]
fn test_session_asks_queries_after_loading() {
    let mut session = Session::default();
    session.load(PATH_PROGRAM).unwrap();
    let parsed = parse_program("path(X, c)?").unwrap();
    let outcome = session.ask(parsed.statements);
    let instances = outcome.answers[0]
        .instances
        .iter()
        .map(|instance| instance.iter().join(", "))
        .collect::<Vec<_>>();
    assert_eq!(instances, vec!["path(b, c)", "path(a, c)"]);
}

#[test]
fn test_interactive_input_reports_new_diagnostics() {
    let mut session = Session::default();
    assert_eq!(session.execute("p(a). q(X) :- p(X).").unwrap(), "");

    let output = session.execute("p(a, b).").unwrap();
    assert_eq!(
        output,
        "Arity mismatch for \"p\" in p(a, b).: expected 2 columns, found 3\n"
    );

    // Earlier diagnostics are not repeated.
    let output = session.execute("q(X)?").unwrap();
    assert_eq!(output, ">>> Query: q(X)?\n    q(a).\n");

    let output = session.execute("r(X) :- q(X, Y). q(Z)?").unwrap();
    assert_eq!(
        output,
        "Arity mismatch for \"q\" in r(X) :- q(X, Y).: expected 2 columns, found 3\n\
         >>> Query: q(Z)?\n    q(a).\n"
    );
}

#[test]
fn test_interactive_input_reports_syntax_and_safety() {
    let mut session = Session::default();
    let output = session.execute("p(X). q(.").unwrap();
    assert_eq!(
        output,
        "Syntax error at line 1, column 7: \"q(.\"\n\
         Facts must be ground. Variables X found in fact: p(X).\n"
    );
    assert!(session.is_empty());
}
