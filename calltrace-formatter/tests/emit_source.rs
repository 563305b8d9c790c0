use calltrace_ast::SourceUnit;
use calltrace_formatter::{emit_file, emit_with_defaults, BraceStyle, Config, Emitter};
use calltrace_instrument::{Plugin, BUILT_FOR_HOST};

const ADD: &str = r#"{
    "file": "add.c",
    "items": [
        { "item": "extern", "name": "printf", "return_type": "int", "variadic": true,
          "params": [{ "name": "fmt", "ty": "char_pointer" }] },
        { "item": "function", "name": "add", "return_type": "int",
          "params": [{ "name": "a", "ty": "int" }, { "name": "b", "ty": "int" }],
          "directives": [{ "text": "calltrace debug" }],
          "body": { "kind": "sequence", "stmts": [
              { "kind": "return", "value": { "kind": "opaque", "text": "a + b", "pure": true } }
          ] } }
    ]
}"#;

#[test]
fn test_before_and_after_instrumentation() {
    let mut unit = SourceUnit::from_json(ADD).unwrap().lower().unwrap();

    let before = emit_with_defaults(&unit);
    assert_eq!(
        before,
        r#"int printf(char *fmt, ...);

int add(int a, int b) {
#pragma calltrace debug
    return a + b;
}
"#
    );

    let mut plugin = Plugin::init(BUILT_FOR_HOST, Default::default()).unwrap();
    plugin.run(&mut unit);

    let after = emit_with_defaults(&unit);
    assert_eq!(
        after,
        r#"int printf(char *fmt, ...);

int add(int a, int b) {
#pragma calltrace debug
    printf("\033[1;32mCalling function: add\033[0m\n");
    printf("\033[1;32mParam: a; Value: %d\033[0m\n", a);
    printf("\033[1;32mParam: b; Value: %d\033[0m\n", b);
    printf("\033[1;32mResult is %d\033[0m\n", a + b);
    return a + b;
}
"#
    );
}

#[test]
fn test_next_line_braces_and_if_else() {
    let json = r#"{
        "file": "report.c",
        "items": [
            { "item": "function", "name": "report", "return_type": "void",
              "params": [{ "name": "code", "ty": "int" }],
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "conditional",
                    "scrutinee": { "kind": "param", "name": "code" },
                    "branches": [
                        { "kind": "sequence", "stmts": [
                            { "kind": "call", "callee": "puts",
                              "args": [{ "kind": "literal", "value": { "str": "ok" } }] }
                        ] },
                        { "kind": "scope", "body": { "kind": "sequence", "stmts": [
                            { "kind": "call", "callee": "puts",
                              "args": [{ "kind": "literal", "value": { "str": "fail" } }] }
                        ] } }
                    ] }
              ] } }
        ]
    }"#;
    let config = Config {
        indent_size: 2,
        brace_style: BraceStyle::NextLine,
    };

    let emitted = Emitter::new(config).emit_json(json).unwrap();
    assert_eq!(
        emitted,
        r#"void report(int code)
{
  if (code)
  {
    puts("ok");
  }
  else
  {
    puts("fail");
  }
}
"#
    );
}

#[test]
fn test_temporaries_and_top_level_pragmas() {
    let json = r#"{
        "file": "next.c",
        "items": [
            { "item": "directive", "text": "once" },
            { "item": "extern", "name": "printf", "return_type": "int", "variadic": true },
            { "item": "function", "name": "next_id", "return_type": "int",
              "body": { "kind": "sequence", "stmts": [
                  { "kind": "bind", "name": "id", "value": { "kind": "opaque", "text": "counter++" } },
                  { "kind": "return", "value": { "kind": "local", "name": "id" } }
              ] } }
        ]
    }"#;
    let emitted = Emitter::new(Config::default()).emit_json(json).unwrap();
    assert_eq!(
        emitted,
        r#"#pragma once
int printf(...);

int next_id(void) {
    __auto_type id = counter++;
    return id;
}
"#
    );
}

#[test]
fn test_emit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("add.json");
    std::fs::write(&path, ADD).unwrap();

    let emitted = emit_file(&path, &Config::default()).unwrap();
    assert!(emitted.starts_with("int printf(char *fmt, ...);"));
    assert!(emit_file(dir.path().join("missing.json"), &Config::default()).is_err());
}
