// Properties of a rewritten function body, checked through the run context

use calltrace_ast::{Callee, Literal, Node, NodeId, SourceUnit, TranslationUnit};
use calltrace_instrument::{
    CompilationRun, Config, FunctionReport, InstrumentError, Outcome, ReturnCapture,
};

fn lower(json: &str) -> TranslationUnit {
    SourceUnit::from_json(json)
        .expect("valid interchange json")
        .lower()
        .expect("lowerable unit")
}

fn selected(names: &[&str]) -> CompilationRun {
    let mut run = CompilationRun::new(Config::default());
    for name in names {
        run.registry_mut().insert(*name);
    }
    run
}

fn body_of(unit: &TranslationUnit, name: &str) -> Vec<NodeId> {
    let body = unit.function(name).expect("function exists").body;
    unit.ast.statements(body).expect("sequence body").to_vec()
}

/// Format text of an injected call, `None` for anything else
fn print_text(unit: &TranslationUnit, id: NodeId) -> Option<String> {
    let Node::Call {
        callee: Callee::Decl(decl),
        args,
    } = &unit.ast[id]
    else {
        return None;
    };
    if unit.decl_name(*decl) != Some("printf") {
        return None;
    }
    match &unit.ast[*args.first()?] {
        Node::Literal(Literal::Str(text)) => Some(text.clone()),
        _ => None,
    }
}

fn value_args(unit: &TranslationUnit, id: NodeId) -> Vec<NodeId> {
    match &unit.ast[id] {
        Node::Call { args, .. } => args[1..].to_vec(),
        other => panic!("expected a call, got {:?}", other),
    }
}

fn green(message: &str) -> String {
    format!("\u{1b}[1;32m{}\u{1b}[0m\n", message)
}

const VOID_LOGGER: &str = r#"{
    "file": "logger.c",
    "items": [
        { "item": "extern", "name": "printf", "return_type": "int", "variadic": true },
        { "item": "function", "name": "log_pair", "return_type": "void",
          "params": [
              { "name": "key", "ty": "char_pointer" },
              { "name": "value", "ty": "real" },
              { "name": "flags", "ty": { "other": "unsigned long" } }
          ],
          "body": { "kind": "sequence", "stmts": [
              { "kind": "opaque", "text": "lock()" },
              { "kind": "opaque", "text": "store(key, value)" },
              { "kind": "opaque", "text": "unlock()" }
          ] } }
    ]
}"#;

#[test]
fn test_void_function_entry_and_tail() {
    let mut unit = lower(VOID_LOGGER);
    let original = body_of(&unit, "log_pair");
    let params = unit.function("log_pair").unwrap().params.len();

    let mut run = selected(&["log_pair"]);
    let report = run.instrument_function(&mut unit, 1).unwrap();
    assert_eq!(
        report,
        FunctionReport {
            entry_calls: params + 1,
            return_sites: 0,
            void_tail: true
        }
    );

    let stmts = body_of(&unit, "log_pair");
    assert_eq!(stmts.len(), original.len() + 1 + params + 1);

    // entry calls first, in declaration order
    assert_eq!(
        print_text(&unit, stmts[0]),
        Some(green("Calling function: log_pair"))
    );
    assert_eq!(print_text(&unit, stmts[1]), Some(green("Param: key; Value: %s")));
    assert_eq!(print_text(&unit, stmts[2]), Some(green("Param: value; Value: %f")));
    assert_eq!(print_text(&unit, stmts[3]), Some(green("Param: flags")));
    assert!(value_args(&unit, stmts[3]).is_empty());

    // then the original statements, untouched and in order
    assert_eq!(&stmts[1 + params..1 + params + original.len()], &original[..]);

    // and the tail last
    assert_eq!(
        print_text(&unit, *stmts.last().unwrap()),
        Some(green("Function returns void type"))
    );
}

#[test]
fn test_void_single_statement_body_is_wrapped() {
    let mut unit = lower(
        r#"{
        "file": "one.c",
        "items": [
            { "item": "extern", "name": "printf", "variadic": true },
            { "item": "function", "name": "ping", "return_type": "void",
              "body": { "kind": "call", "callee": "notify" } }
        ]
    }"#,
    );
    let original = unit.function("ping").unwrap().body;

    let mut run = selected(&["ping"]);
    run.instrument_function(&mut unit, 1).unwrap();

    let stmts = body_of(&unit, "ping");
    assert_eq!(stmts.len(), 3);
    assert_eq!(print_text(&unit, stmts[0]), Some(green("Calling function: ping")));
    assert_eq!(stmts[1], original);
    assert_eq!(
        print_text(&unit, stmts[2]),
        Some(green("Function returns void type"))
    );
}

#[test]
fn test_single_return_shares_its_value() {
    let mut unit = lower(
        r#"{
        "file": "square.c",
        "items": [
            { "item": "extern", "name": "printf", "variadic": true },
            { "item": "function", "name": "square", "return_type": "int",
              "params": [{ "name": "x", "ty": "int" }],
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "return", "value": { "kind": "opaque", "text": "x * x", "pure": true } }
              ] } }
        ]
    }"#,
    );

    let mut run = selected(&["square"]);
    let report = run.instrument_function(&mut unit, 1).unwrap();
    assert_eq!(report.return_sites, 1);
    assert!(!report.void_tail);

    let stmts = body_of(&unit, "square");
    assert_eq!(stmts.len(), 4);
    let ret = stmts[3];
    let Node::Return(Some(value)) = unit.ast[ret] else {
        panic!("expected the return last");
    };
    let print = stmts[2];
    assert_eq!(print_text(&unit, print), Some(green("Result is %d")));
    assert_eq!(value_args(&unit, print), vec![value]);
}

#[test]
fn test_sibling_returns_only_first_instrumented() {
    let mut unit = lower(
        r#"{
        "file": "grade.c",
        "items": [
            { "item": "extern", "name": "printf", "variadic": true },
            { "item": "function", "name": "grade", "return_type": "char",
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "return", "value": { "kind": "literal", "value": { "char": "A" } } },
                  { "kind": "return", "value": { "kind": "literal", "value": { "char": "B" } } }
              ] } }
        ]
    }"#,
    );
    let original = body_of(&unit, "grade");

    let mut run = selected(&["grade"]);
    let report = run.instrument_function(&mut unit, 1).unwrap();
    assert_eq!(report.return_sites, 1);

    let stmts = body_of(&unit, "grade");
    // name call, result call, first return, second return
    assert_eq!(stmts.len(), 4);
    assert_eq!(print_text(&unit, stmts[1]), Some(green("Result is %c")));
    assert_eq!(stmts[2], original[0]);
    assert_eq!(stmts[3], original[1]);
    assert_eq!(print_text(&unit, stmts[3]), None);
}

#[test]
fn test_conditional_branches_each_instrumented() {
    let mut unit = lower(
        r#"{
        "file": "max.c",
        "items": [
            { "item": "extern", "name": "printf", "variadic": true },
            { "item": "function", "name": "max", "return_type": "real",
              "params": [{ "name": "a", "ty": "real" }, { "name": "b", "ty": "real" }],
              "body": { "kind": "scope", "body": { "kind": "sequence", "stmts": [
                  { "kind": "conditional",
                    "scrutinee": { "kind": "opaque", "text": "a > b", "pure": true },
                    "branches": [
                        { "kind": "sequence", "stmts": [
                            { "kind": "return", "value": { "kind": "param", "name": "a" } }
                        ] },
                        { "kind": "sequence", "stmts": [
                            { "kind": "return", "value": { "kind": "param", "name": "b" } }
                        ] }
                    ] }
              ] } } }
        ]
    }"#,
    );

    let mut run = selected(&["max"]);
    let report = run.instrument_function(&mut unit, 1).unwrap();
    assert_eq!(report.return_sites, 2);

    // scope body: wrapped by the entry calls, scope kept intact
    let stmts = body_of(&unit, "max");
    assert_eq!(stmts.len(), 4);
    let Node::Scope(inner) = unit.ast[stmts[3]] else {
        panic!("expected the original scope last");
    };
    let inner = unit.ast.statements(inner).unwrap();
    let Node::Conditional { branches, .. } = &unit.ast[inner[0]] else {
        panic!("expected the conditional");
    };

    for branch in branches {
        let branch = unit.ast.statements(*branch).unwrap();
        assert_eq!(branch.len(), 2);
        assert_eq!(print_text(&unit, branch[0]), Some(green("Result is %f")));
        let Node::Return(Some(value)) = unit.ast[branch[1]] else {
            panic!("expected a return after the result call");
        };
        assert_eq!(value_args(&unit, branch[0]), vec![value]);
    }
}

#[test]
fn test_missing_printf_leaves_function_and_run_intact() {
    let mut unit = lower(
        r#"{
        "file": "late.c",
        "items": [
            { "item": "function", "name": "early", "return_type": "int",
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "return", "value": { "kind": "literal", "value": { "int": 0 } } }
              ] } },
            { "item": "extern", "name": "printf", "variadic": true },
            { "item": "function", "name": "late", "return_type": "void",
              "body": { "kind": "sequence", "stmts": [] } }
        ]
    }"#,
    );
    let before = unit.clone();

    let mut run = selected(&["early", "late"]);
    let err = run.on_function_body(&mut unit, 0).unwrap_err();
    assert_eq!(
        err,
        InstrumentError::MissingDependency {
            name: "printf".to_string(),
            function: "early".to_string()
        }
    );
    assert_eq!(unit, before);
    assert!(run.registry().contains("early"));
    assert_eq!(run.diagnostics().error_count(), 1);

    // later functions that can see printf are still instrumented
    let outcome = run.on_function_body(&mut unit, 2).unwrap();
    assert!(matches!(outcome, Outcome::Instrumented(_)));
    assert_eq!(body_of(&unit, "late").len(), 2);
}

#[test]
fn test_printf_declared_later_stays_invisible_after_it_is_resolved() {
    let mut unit = lower(
        r#"{
        "file": "order.c",
        "items": [
            { "item": "function", "name": "early", "return_type": "int",
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "return", "value": { "kind": "literal", "value": { "int": 0 } } }
              ] } },
            { "item": "extern", "name": "printf", "variadic": true },
            { "item": "function", "name": "late", "return_type": "int",
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "return", "value": { "kind": "literal", "value": { "int": 1 } } }
              ] } }
        ]
    }"#,
    );
    let mut run = selected(&["early", "late"]);

    // the later function resolves printf first
    let report = run.instrument_function(&mut unit, 2).unwrap();
    assert_eq!(report.return_sites, 1);
    let early_before = body_of(&unit, "early");

    let err = run.instrument_function(&mut unit, 0).unwrap_err();
    assert_eq!(
        err,
        InstrumentError::MissingDependency {
            name: "printf".to_string(),
            function: "early".to_string()
        }
    );
    assert_eq!(body_of(&unit, "early"), early_before);
    assert_eq!(run.diagnostics().error_count(), 1);
}

#[test]
fn test_else_if_chain_reports_every_return() {
    let mut unit = lower(
        r#"{
        "file": "sign.c",
        "items": [
            { "item": "extern", "name": "printf", "variadic": true },
            { "item": "function", "name": "sign", "return_type": "int",
              "params": [{ "name": "x", "ty": "int" }],
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "conditional",
                    "scrutinee": { "kind": "opaque", "text": "x > 0", "pure": true },
                    "branches": [
                        { "kind": "return", "value": { "kind": "literal", "value": { "int": 1 } } },
                        { "kind": "conditional",
                          "scrutinee": { "kind": "opaque", "text": "x < 0", "pure": true },
                          "branches": [
                              { "kind": "return", "value": { "kind": "literal", "value": { "int": -1 } } },
                              { "kind": "return", "value": { "kind": "literal", "value": { "int": 0 } } }
                          ] }
                    ] }
              ] } }
        ]
    }"#,
    );

    let mut run = selected(&["sign"]);
    let report = run.instrument_function(&mut unit, 1).unwrap();
    assert_eq!(report.return_sites, 3);
}

#[test]
fn test_instrumenting_twice_doubles_the_calls() {
    let mut unit = lower(VOID_LOGGER);
    let original = body_of(&unit, "log_pair").len();

    let mut run = selected(&["log_pair"]);
    let first = run.instrument_function(&mut unit, 1).unwrap();
    let after_first = body_of(&unit, "log_pair").len();
    let second = run.instrument_function(&mut unit, 1).unwrap();
    let after_second = body_of(&unit, "log_pair").len();

    assert_eq!(first, second);
    let inserted = after_first - original;
    assert_eq!(after_second - original, 2 * inserted);

    let stmts = body_of(&unit, "log_pair");
    let calling = stmts
        .iter()
        .filter(|id| print_text(&unit, **id) == Some(green("Calling function: log_pair")))
        .count();
    assert_eq!(calling, 2);
}

const COUNTER: &str = r#"{
    "file": "counter.c",
    "items": [
        { "item": "extern", "name": "printf", "variadic": true },
        { "item": "function", "name": "next_id", "return_type": "int",
          "body": { "kind": "sequence", "stmts": [
              { "kind": "return", "value": { "kind": "opaque", "text": "counter++" } }
          ] } }
    ]
}"#;

#[test]
fn test_shared_capture_observes_side_effect_twice() {
    let mut unit = lower(COUNTER);
    let mut run = selected(&["next_id"]);
    run.instrument_function(&mut unit, 1).unwrap();

    let stmts = body_of(&unit, "next_id");
    let Node::Return(Some(value)) = unit.ast[stmts[2]] else {
        panic!("expected the return last");
    };
    // the same `counter++` node is evaluated by the print call and the return
    assert_eq!(value_args(&unit, stmts[1]), vec![value]);
    assert!(!unit.ast.is_pure(value));
}

#[test]
fn test_temporary_capture_observes_side_effect_once() {
    let mut unit = lower(COUNTER);
    let mut run = CompilationRun::new(Config {
        return_capture: ReturnCapture::Temporary,
        ..Config::default()
    });
    run.registry_mut().insert("next_id");
    run.instrument_function(&mut unit, 1).unwrap();

    let stmts = body_of(&unit, "next_id");
    assert_eq!(stmts.len(), 4);
    let Node::Bind { name, value } = &unit.ast[stmts[1]] else {
        panic!("expected the binding first");
    };
    assert_eq!(name, "__calltrace_result_0");
    assert!(!unit.ast.is_pure(*value));

    let printed = value_args(&unit, stmts[2]);
    assert!(unit.ast.is_pure(printed[0]));
    let Node::Return(Some(returned)) = unit.ast[stmts[3]] else {
        panic!("expected the return last");
    };
    assert!(unit.ast.is_pure(returned));
}
