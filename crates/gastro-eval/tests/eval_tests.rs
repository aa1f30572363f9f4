//! Frontmatter interpreter tests: bindings, operators, composite literals,
//! redirects, host packages and request-scoped data.

use gastro_eval::{execute, EvalError, Environment, Redirect, Registry, Request};
use gastro_types::{HostObject, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn run(code: &str) -> Environment {
    let mut env = Environment::new();
    execute(code, &mut env).unwrap_or_else(|e| panic!("execute failed: {e}\n{code}"));
    env
}

fn run_err(code: &str) -> EvalError {
    let mut env = Environment::new();
    execute(code, &mut env).expect_err("expected an evaluation error")
}

fn var(env: &Environment, name: &str) -> Value {
    env.get(name)
        .cloned()
        .unwrap_or_else(|| panic!("variable {name} not bound"))
}

fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| Value::from(*s)).collect())
}

// ══════════════════════════════════════════════════════════════════════════════
// Bindings
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_var_and_short_declarations() {
    let env = run("var title = \"Hi\"\ncount := 3\nratio := 0.5\nok := true\nnone := nil");
    assert_eq!(var(&env, "title"), Value::from("Hi"));
    assert_eq!(var(&env, "count"), Value::Int(3));
    assert_eq!(var(&env, "ratio"), Value::Float(0.5));
    assert_eq!(var(&env, "ok"), Value::Bool(true));
    assert_eq!(var(&env, "none"), Value::Nil);
}

#[test]
fn test_type_annotations_are_ignored() {
    let env = run("var n int = 4\nvar m map[string]int = map[string]int{\"a\": 1}\nvar x interface{} = \"s\"");
    assert_eq!(var(&env, "n"), Value::Int(4));
    assert_eq!(var(&env, "x"), Value::from("s"));
    assert_eq!(var(&env, "m").member("a"), Some(Value::Int(1)));
}

#[test]
fn test_var_without_value_gets_zero_value() {
    let env = run("var n int\nvar s string\nvar items []string");
    assert_eq!(var(&env, "n"), Value::Int(0));
    assert_eq!(var(&env, "s"), Value::from(""));
    assert_eq!(var(&env, "items"), Value::Nil);
}

#[test]
fn test_multi_assignment_and_reassignment() {
    let env = run("a, b := 1, \"two\"\na = a + 10\n_, c := 5, 6");
    assert_eq!(var(&env, "a"), Value::Int(11));
    assert_eq!(var(&env, "b"), Value::from("two"));
    assert_eq!(var(&env, "c"), Value::Int(6));
    assert!(env.get("_").is_none());
}

#[test]
fn test_assignment_count_mismatch() {
    assert_eq!(
        run_err("a, b := 1, 2, 3"),
        EvalError::AssignmentMismatch { names: 2, values: 3 }
    );
}

#[test]
fn test_char_literal_is_code_point() {
    let env = run("c := 'A'");
    assert_eq!(var(&env, "c"), Value::Int(65));
}

#[test]
fn test_semicolons_and_comments() {
    let env = run("a := 1; b := 2 // trailing\n/* block */ c := a + b");
    assert_eq!(var(&env, "c"), Value::Int(3));
}

#[test]
fn test_undefined_variable() {
    assert_eq!(run_err("x := y"), EvalError::UndefinedVariable("y".into()));
}

#[test]
fn test_error_keeps_prior_bindings() {
    let mut env = Environment::new();
    let err = execute("a := 1\nb := a / 0\nc := 3", &mut env).unwrap_err();
    assert_eq!(err, EvalError::DivisionByZero);
    assert_eq!(env.get("a"), Some(&Value::Int(1)));
    assert!(env.get("c").is_none());
}

#[test]
fn test_syntax_error_runs_nothing() {
    let mut env = Environment::new();
    let err = execute("a := 1\nb := (2 +", &mut env).unwrap_err();
    assert!(matches!(err, EvalError::Syntax(ref d) if d.has_errors()));
    assert!(env.get("a").is_none());
}

#[test]
fn test_empty_frontmatter_is_noop() {
    let env = run("  \n ");
    assert!(env.variables().is_empty());
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_arithmetic() {
    let env = run("a := 7 / 2\nb := 7.0 / 2.0\nc := 2 + 3 * 4\nd := \"a\" + \"b\"\ne := -(1 + 2)\nf := 7 % 3");
    assert_eq!(var(&env, "a"), Value::Int(3));
    assert_eq!(var(&env, "b"), Value::Float(3.5));
    assert_eq!(var(&env, "c"), Value::Int(14));
    assert_eq!(var(&env, "d"), Value::from("ab"));
    assert_eq!(var(&env, "e"), Value::Int(-3));
    assert_eq!(var(&env, "f"), Value::Int(1));
}

#[test]
fn test_mixed_operands_are_errors() {
    assert!(matches!(run_err("x := 1 + 1.5"), EvalError::TypeMismatch(_)));
    assert!(matches!(run_err("x := \"a\" - \"b\""), EvalError::TypeMismatch(_)));
    assert!(matches!(run_err("x := -\"a\""), EvalError::TypeMismatch(_)));
    assert!(matches!(run_err("x := !1"), EvalError::TypeMismatch(_)));
}

#[test]
fn test_division_by_zero_both_forms() {
    assert_eq!(run_err("x := 1 / 0"), EvalError::DivisionByZero);
    assert_eq!(run_err("x := 1.0 / 0.0"), EvalError::DivisionByZero);
}

#[test]
fn test_comparisons_and_equality() {
    let env = run(
        "a := 1 < 2\nb := 2.5 >= 3.0\nc := nil == nil\nd := nil == 0\ne := \"x\" != \"y\"\nf := []int{1, 2} == []int{1, 2}",
    );
    assert_eq!(var(&env, "a"), Value::Bool(true));
    assert_eq!(var(&env, "b"), Value::Bool(false));
    assert_eq!(var(&env, "c"), Value::Bool(true));
    assert_eq!(var(&env, "d"), Value::Bool(false));
    assert_eq!(var(&env, "e"), Value::Bool(true));
    assert_eq!(var(&env, "f"), Value::Bool(true));
    assert!(matches!(run_err("x := \"a\" < \"b\""), EvalError::TypeMismatch(_)));
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let env = run("a := true && false\nb := false || true\nc := 1 || true");
    assert_eq!(var(&env, "a"), Value::Bool(false));
    assert_eq!(var(&env, "b"), Value::Bool(true));
    assert_eq!(var(&env, "c"), Value::Bool(false));
    // no short-circuit: the right side still runs and fails
    assert_eq!(run_err("x := false && 1 / 0 == 0"), EvalError::DivisionByZero);
}

// ══════════════════════════════════════════════════════════════════════════════
// Composite literals & selectors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_list_and_map_literals() {
    let env = run(
        "items := []string{\"a\", \"b\", \"c\"}\nuser := map[string]interface{}{\n  \"name\": \"Ada\",\n  \"age\": 36,\n}\nname := user.name\nmissing := user.email",
    );
    assert_eq!(var(&env, "items"), list(&["a", "b", "c"]));
    assert_eq!(var(&env, "name"), Value::from("Ada"));
    assert_eq!(var(&env, "missing"), Value::Nil);
}

#[test]
fn test_elided_nested_literals() {
    let env = run("rows := []map[string]string{{\"k\": \"v\"}, {}}\ngrid := [][]int{{1, 2}, {3}}");
    let rows = var(&env, "rows");
    assert_eq!(rows.len(), Some(2));
    assert_eq!(
        var(&env, "grid"),
        Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(2)]),
            Value::List(vec![Value::Int(3)]),
        ])
    );
}

#[test]
fn test_struct_literal_becomes_map() {
    let env = run("p := Post{Title: \"Hello\", Views: 3}\nt := p.Title");
    assert_eq!(var(&env, "t"), Value::from("Hello"));
    assert_eq!(var(&env, "p").member("Views"), Some(Value::Int(3)));
}

#[test]
fn test_non_string_map_keys_rejected() {
    assert!(matches!(
        run_err("m := map[int]string{1: \"a\"}"),
        EvalError::TypeMismatch(_)
    ));
    assert!(matches!(
        run_err("m := map[string]int{1: 2}"),
        EvalError::TypeMismatch(_)
    ));
}

#[test]
fn test_select_from_scalar_is_error() {
    let err = run_err("n := 1\nx := n.field");
    assert_eq!(
        err.to_string(),
        "type mismatch: cannot select field field from int"
    );
}

#[test]
fn test_len_builtin() {
    let env = run("a := len([]int{1, 2, 3})\nb := len(\"héllo\")\nc := len(map[string]int{\"x\": 1})");
    assert_eq!(var(&env, "a"), Value::Int(3));
    assert_eq!(var(&env, "b"), Value::Int(5));
    assert_eq!(var(&env, "c"), Value::Int(1));
    assert!(matches!(run_err("x := len(5)"), EvalError::TypeMismatch(_)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow & unsupported constructs
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_if_else_chain() {
    let env = run("n := 5\nsize := \"\"\nif n > 10 {\n  size = \"big\"\n} else if n > 3 {\n  size = \"medium\"\n} else {\n  size = \"small\"\n}");
    assert_eq!(var(&env, "size"), Value::from("medium"));
}

#[test]
fn test_if_condition_must_be_boolean() {
    let err = run_err("if 1 {\n  x := 2\n}");
    assert_eq!(
        err,
        EvalError::TypeMismatch("if condition must be boolean, got int".into())
    );
}

#[test]
fn test_unsupported_constructs_are_named() {
    assert_eq!(
        run_err("for i := 0; i < 3; i++ {\n}"),
        EvalError::Unsupported("'for' statement".into())
    );
    assert!(run_err("x := items[0]").to_string().contains("index expression"));
    assert!(matches!(run_err("x := fmt(1)"), EvalError::UnsupportedCall(_)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Redirects
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_redirect_stops_execution() {
    let env = run("a := 1\nredirect(\"/login\", 302)\nb := 2");
    assert_eq!(
        env.redirect(),
        Some(&Redirect {
            url: "/login".into(),
            status: 302
        })
    );
    assert!(env.get("b").is_none());
}

#[test]
fn test_redirect_inside_if_skips_enclosing_statements() {
    let env = run("cond := true\nif cond {\n  Gastro.Redirect(\"/home\", 301)\n  inner := 1\n}\nafter := 2");
    assert_eq!(env.redirect().map(|r| r.status), Some(301));
    assert!(env.get("inner").is_none());
    assert!(env.get("after").is_none());
}

#[test]
fn test_redirect_spellings() {
    for code in [
        "redirect(\"/a\", 302)",
        "Redirect(\"/a\", 302)",
        "Gastro.redirect(\"/a\", 302)",
        "Gastro.Redirect(\"/a\", 302)",
    ] {
        assert_eq!(run(code).redirect().map(|r| r.url.as_str()), Some("/a"), "{code}");
    }
}

#[test]
fn test_malformed_redirect_arguments() {
    assert!(matches!(run_err("redirect(302, \"/a\")"), EvalError::InvalidRedirect(_)));
    assert!(matches!(run_err("redirect(\"/a\")"), EvalError::InvalidRedirect(_)));
    assert!(matches!(run_err("redirect(\"/a\", 9999)"), EvalError::InvalidRedirect(_)));
    assert!(matches!(run_err("x := redirect(\"/a\", 302)"), EvalError::TypeMismatch(_)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Host packages & request scope
// ══════════════════════════════════════════════════════════════════════════════

fn registry() -> Arc<Registry> {
    let registry = Registry::new()
        .with("strings", "ToUpper", |args| match args {
            [Value::String(s)] => Ok(Value::String(s.to_uppercase())),
            _ => Err("ToUpper expects a string".into()),
        })
        .with("example.com/posts", "Find", |args| match args {
            [Value::Int(1)] => Ok(Value::from("first post")),
            _ => Err("post not found".into()),
        });
    Arc::new(registry)
}

#[test]
fn test_package_calls_through_imports() {
    let mut env = Environment::with_registry(registry());
    execute(
        "import (\n  \"strings\"\n  p \"example.com/posts\"\n)\nloud := strings.ToUpper(\"hi\")\npost := p.Find(1)",
        &mut env,
    )
    .unwrap();
    assert_eq!(env.get("loud"), Some(&Value::from("HI")));
    assert_eq!(env.get("post"), Some(&Value::from("first post")));
}

#[test]
fn test_package_error_in_two_name_binding() {
    let mut env = Environment::with_registry(registry());
    execute(
        "import posts \"example.com/posts\"\npost, err := posts.Find(7)\nok, none := posts.Find(1)",
        &mut env,
    )
    .unwrap();
    assert_eq!(env.get("post"), Some(&Value::Nil));
    assert_eq!(env.get("err"), Some(&Value::from("post not found")));
    assert_eq!(env.get("ok"), Some(&Value::from("first post")));
    assert_eq!(env.get("none"), Some(&Value::Nil));
}

#[test]
fn test_package_error_in_single_value_context() {
    let mut env = Environment::with_registry(registry());
    let err = execute("import \"example.com/posts\"\npost := posts.Find(7)", &mut env).unwrap_err();
    assert_eq!(err, EvalError::Host("posts.Find: post not found".into()));
}

#[test]
fn test_unregistered_package_function() {
    let mut env = Environment::with_registry(registry());
    let err = execute("x := strings.ToLower(\"A\")", &mut env).unwrap_err();
    assert_eq!(err, EvalError::UnsupportedCall("strings.ToLower".into()));
}

#[derive(Debug)]
struct Session {
    user: String,
}

#[derive(Debug)]
struct User {
    name: String,
}

impl HostObject for Session {
    fn type_name(&self) -> &str {
        "Session"
    }

    fn call(&self, method: &str, _args: &[Value]) -> Option<Result<Vec<Value>, String>> {
        match method {
            "CurrentUser" => Some(Ok(vec![
                Value::opaque(User {
                    name: self.user.clone(),
                }),
                Value::Nil,
            ])),
            "Fail" => Some(Ok(vec![Value::Nil, Value::from("session expired")])),
            _ => None,
        }
    }
}

impl HostObject for User {
    fn type_name(&self) -> &str {
        "User"
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "Name").then(|| Value::from(self.name.as_str()))
    }

    fn call(&self, method: &str, _args: &[Value]) -> Option<Result<Vec<Value>, String>> {
        (method == "Greeting").then(|| Ok(vec![Value::String(format!("hi {}", self.name))]))
    }
}

#[test]
fn test_host_method_chaining() {
    let mut env = Environment::new();
    env.set(
        "session",
        Value::opaque(Session {
            user: "ada".into(),
        }),
    );
    execute(
        "user, err := session.CurrentUser()\nname := user.Name\ngreeting := session.CurrentUser().Greeting()",
        &mut env,
    )
    .unwrap();
    assert_eq!(env.get("err"), Some(&Value::Nil));
    assert_eq!(env.get("name"), Some(&Value::from("ada")));
    assert_eq!(env.get("greeting"), Some(&Value::from("hi ada")));

    let err = execute("x := session.Fail()", &mut env).unwrap_err();
    assert_eq!(err, EvalError::Host("session expired".into()));
    let err = execute("x := session.Logout()", &mut env).unwrap_err();
    assert_eq!(err, EvalError::UnsupportedCall("Session.Logout".into()));
}

#[test]
fn test_request_locals_and_params() {
    let mut env = Environment::new();
    env.set_request(Request::new("GET", "/posts/hello?draft=1"));
    env.set_locals(BTreeMap::from([("theme".to_string(), Value::from("dark"))]));
    env.set_params(BTreeMap::from([("slug".to_string(), "hello".to_string())]));
    execute(
        "path := Request.Path\nmethod := Request.Method()\ndraft := Request.QueryParam(\"draft\")\ntheme := Gastro.Locals.theme\nsame := Locals.theme == theme\ns := slug + \"!\"",
        &mut env,
    )
    .unwrap();
    assert_eq!(env.get("path"), Some(&Value::from("/posts/hello")));
    assert_eq!(env.get("method"), Some(&Value::from("GET")));
    assert_eq!(env.get("draft"), Some(&Value::from("1")));
    assert_eq!(env.get("theme"), Some(&Value::from("dark")));
    assert_eq!(env.get("same"), Some(&Value::Bool(true)));
    assert_eq!(env.get("s"), Some(&Value::from("hello!")));
}

// ══════════════════════════════════════════════════════════════════════════════
// Properties
// ══════════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn prop_integer_arithmetic_matches_wrapping(a in 0i64..i64::MAX, b in 0i64..i64::MAX) {
        let env = run(&format!("a := {a}\nb := {b}\ns := a + b\nd := a - b\np := a * b"));
        prop_assert_eq!(var(&env, "s"), Value::Int(a.wrapping_add(b)));
        prop_assert_eq!(var(&env, "d"), Value::Int(a.wrapping_sub(b)));
        prop_assert_eq!(var(&env, "p"), Value::Int(a.wrapping_mul(b)));
    }

    #[test]
    fn prop_division_by_zero_never_panics(n in any::<i32>(), float in any::<bool>()) {
        let code = if float {
            format!("x := {}.0 / 0.0", n.unsigned_abs())
        } else {
            format!("x := {} / 0", n.unsigned_abs())
        };
        prop_assert_eq!(run_err(&code), EvalError::DivisionByZero);
    }

    /// Nothing after the redirecting statement is ever bound.
    #[test]
    fn prop_redirect_hides_later_bindings(before in 0usize..5, after in 1usize..5) {
        let mut code = String::new();
        for i in 0..before {
            code.push_str(&format!("b{i} := {i}\n"));
        }
        code.push_str("if true {\n  redirect(\"/x\", 303)\n}\n");
        for i in 0..after {
            code.push_str(&format!("a{i} := {i}\n"));
        }
        let env = run(&code);
        prop_assert!(env.is_redirected());
        for i in 0..before {
            let name = format!("b{i}");
            prop_assert!(env.get(&name).is_some());
        }
        for i in 0..after {
            let name = format!("a{i}");
            prop_assert!(env.get(&name).is_none());
        }
    }
}
