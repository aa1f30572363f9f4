//! Frontmatter parser tests: statements, expressions, composite literals,
//! unsupported shapes and error recovery.

use gastro_parser::parse_frontmatter;
use gastro_types::ast::*;
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse_ok(source: &str) -> Program {
    match parse_frontmatter(source).into_result() {
        Ok(program) => program,
        Err(errors) => panic!("unexpected errors for {source:?}: {errors}"),
    }
}

fn first_stmt(source: &str) -> Stmt {
    parse_ok(source).stmts.remove(0)
}

/// Parse `x := <expr>` and return the expression kind.
fn expr_kind(expr_src: &str) -> ExprKind {
    match first_stmt(&format!("x := {expr_src}")) {
        Stmt::Assign(assign) => assign.values[0].kind.clone(),
        other => panic!("expected assignment, got {other:?}"),
    }
}

fn error_messages(source: &str) -> Vec<String> {
    parse_frontmatter(source)
        .errors
        .errors
        .into_iter()
        .map(|e| e.message)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// Declarations & assignments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_var_decl() {
    let Stmt::Var(decl) = first_stmt("var title = \"Hi\"") else {
        panic!("expected var");
    };
    assert_eq!(decl.names[0].name, "title");
    assert_eq!(decl.type_ann, None);
    assert_eq!(decl.values[0].kind, ExprKind::StringLit("Hi".into()));
}

#[test]
fn test_var_decl_with_type_and_multiple_names() {
    let Stmt::Var(decl) = first_stmt("var a, b int = 1, 2") else {
        panic!("expected var");
    };
    let names: Vec<_> = decl.names.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(decl.type_ann, Some(TypeExpr::Named("int".into())));
    assert_eq!(decl.values.len(), 2);
}

#[test]
fn test_var_without_type_or_value_is_error() {
    let errors = error_messages("var a");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("type or an initial value"));
}

#[test]
fn test_short_and_plain_assignment() {
    let Stmt::Assign(define) = first_stmt("count := 3") else {
        panic!("expected assign");
    };
    assert_eq!(define.op, AssignOp::Define);

    let Stmt::Assign(assign) = first_stmt("count = 4") else {
        panic!("expected assign");
    };
    assert_eq!(assign.op, AssignOp::Assign);
}

#[test]
fn test_multi_name_define_from_call() {
    let Stmt::Assign(assign) = first_stmt("user, err := db.Find(\"id\")") else {
        panic!("expected assign");
    };
    assert_eq!(assign.names.len(), 2);
    assert_eq!(assign.values.len(), 1);
    assert!(matches!(assign.values[0].kind, ExprKind::Call { .. }));
}

#[test]
fn test_define_requires_names() {
    let errors = error_messages("a.b := 1");
    assert_eq!(errors, vec!["non-name on left side of ':='".to_string()]);
}

#[test]
fn test_field_assignment_is_unsupported_stmt() {
    assert!(matches!(
        first_stmt("user.Name = \"x\""),
        Stmt::Unsupported { ref construct, .. } if construct == "assignment to a field or element"
    ));
}

#[test]
fn test_semicolons_separate_statements() {
    let program = parse_ok("a := 1; b := 2;\nc := 3");
    assert_eq!(program.stmts.len(), 3);
}

// ─────────────────────────────────────────────────────────────────────
// if / else
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_if_else_if_else() {
    let src = "if a > 1 {\n  x := 1\n} else if a == 1 {\n  x := 2\n} else {\n  x := 3\n}";
    let Stmt::If(stmt) = first_stmt(src) else {
        panic!("expected if");
    };
    assert_eq!(stmt.then_block.stmts.len(), 1);
    let Some(ElseBranch::ElseIf(nested)) = stmt.else_branch else {
        panic!("expected else if");
    };
    assert!(matches!(nested.else_branch, Some(ElseBranch::Block(_))));
}

#[test]
fn test_if_condition_identifier_before_brace() {
    // `ok {` must not be read as a composite literal of type `ok`.
    let Stmt::If(stmt) = first_stmt("if ok { redirect(\"/login\", 302) }") else {
        panic!("expected if");
    };
    assert_eq!(stmt.condition.kind, ExprKind::Identifier("ok".into()));
    assert!(matches!(stmt.then_block.stmts[0], Stmt::Expr(_)));
}

#[test]
fn test_if_with_init_statement_is_error() {
    let errors = error_messages("if x := f(); x { }");
    assert!(errors[0].contains("init statement"));
}

// ─────────────────────────────────────────────────────────────────────
// Imports
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_import_forms() {
    let program = parse_ok("import \"strings\"\nimport str \"strings\"\nimport Card from \"./Card.gastro\"");
    let specs: Vec<(Option<String>, String)> = program
        .stmts
        .iter()
        .map(|s| match s {
            Stmt::Import(decl) => (
                decl.specs[0].alias.as_ref().map(|a| a.name.clone()),
                decl.specs[0].path.clone(),
            ),
            other => panic!("expected import, got {other:?}"),
        })
        .collect();
    assert_eq!(
        specs,
        vec![
            (None, "strings".to_string()),
            (Some("str".to_string()), "strings".to_string()),
            (Some("Card".to_string()), "./Card.gastro".to_string()),
        ]
    );
}

#[test]
fn test_grouped_import_and_local_names() {
    let Stmt::Import(decl) = first_stmt("import (\n  \"net/http\"\n  u \"example.com/users\"\n)") else {
        panic!("expected import");
    };
    let names: Vec<_> = decl.specs.iter().map(ImportSpec::local_name).collect();
    assert_eq!(names, vec!["http", "u"]);
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_literals() {
    assert_eq!(expr_kind("42"), ExprKind::IntLit(42));
    assert_eq!(expr_kind("2.5"), ExprKind::FloatLit(2.5));
    assert_eq!(expr_kind("'x'"), ExprKind::CharLit('x'));
    assert_eq!(expr_kind("`raw`"), ExprKind::StringLit("raw".into()));
    assert_eq!(expr_kind("true"), ExprKind::BoolLit(true));
    assert_eq!(expr_kind("nil"), ExprKind::NilLit);
}

#[test]
fn test_precedence() {
    // 1 + 2 * 3 == 7 && ok  →  ((1 + (2 * 3)) == 7) && ok
    let ExprKind::Binary { left, op, right } = expr_kind("1 + 2 * 3 == 7 && ok") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinOp::And);
    assert_eq!(right.kind, ExprKind::Identifier("ok".into()));
    let ExprKind::Binary { left: sum, op: eq, .. } = left.kind else {
        panic!("expected comparison");
    };
    assert_eq!(eq, BinOp::Eq);
    let ExprKind::Binary { op: add, right: product, .. } = sum.kind else {
        panic!("expected sum");
    };
    assert_eq!(add, BinOp::Add);
    assert!(matches!(product.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
}

#[test]
fn test_unary_operators() {
    assert!(matches!(expr_kind("-x"), ExprKind::Unary { op: UnaryOp::Neg, .. }));
    assert!(matches!(expr_kind("!ok"), ExprKind::Unary { op: UnaryOp::Not, .. }));
    assert_eq!(expr_kind("+5"), ExprKind::IntLit(5));
}

#[test]
fn test_selector_and_method_chain() {
    let ExprKind::Call { callee, args } = expr_kind("Request.URL.Query()") else {
        panic!("expected call");
    };
    assert!(args.is_empty());
    let ExprKind::Selector { object, field } = callee.kind else {
        panic!("expected selector");
    };
    assert_eq!(field.name, "Query");
    assert!(matches!(object.kind, ExprKind::Selector { .. }));
}

#[test]
fn test_call_args_span_lines() {
    let ExprKind::Call { args, .. } = expr_kind("f(\n  1,\n  2,\n)") else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
}

#[test]
fn test_slice_literal() {
    let ExprKind::Composite { ty, elements } = expr_kind("[]string{\"a\", \"b\", \"c\"}") else {
        panic!("expected composite");
    };
    assert_eq!(ty.unwrap().to_string(), "[]string");
    assert_eq!(elements.len(), 3);
}

#[test]
fn test_map_literal_multiline_with_trailing_comma() {
    let src = "map[string]interface{}{\n  \"name\": \"Ada\",\n  \"age\": 36,\n}";
    let ExprKind::Composite { ty, elements } = expr_kind(src) else {
        panic!("expected composite");
    };
    assert_eq!(ty.unwrap().to_string(), "map[string]interface{}");
    assert!(elements.iter().all(|e| matches!(e, Element::KeyValue { .. })));
    assert_eq!(elements.len(), 2);
}

#[test]
fn test_elided_nested_literals() {
    let ExprKind::Composite { elements, .. } = expr_kind("[]map[string]string{{\"a\": \"1\"}, {\"a\": \"2\"}}") else {
        panic!("expected composite");
    };
    assert_eq!(elements.len(), 2);
    assert!(matches!(
        &elements[0],
        Element::Positional(Expr { kind: ExprKind::Composite { ty: None, .. }, .. })
    ));
}

#[test]
fn test_named_struct_literal() {
    let ExprKind::Composite { ty, elements } = expr_kind("models.User{Name: \"Ada\"}") else {
        panic!("expected composite");
    };
    assert_eq!(ty, Some(TypeExpr::Named("models.User".into())));
    assert_eq!(elements.len(), 1);
}

#[test]
fn test_unsupported_expression_shapes() {
    assert_eq!(expr_kind("items[0]"), ExprKind::Unsupported("index expression".into()));
    assert_eq!(expr_kind("v.(string)"), ExprKind::Unsupported("type assertion".into()));
    assert_eq!(expr_kind("&user"), ExprKind::Unsupported("address-of operator '&'".into()));
    assert_eq!(
        expr_kind("func() int { return 1 }"),
        ExprKind::Unsupported("function literal".into())
    );
}

// ─────────────────────────────────────────────────────────────────────
// Unsupported statements & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unsupported_statements_are_skipped_whole() {
    let src = "for i := 0; i < 3; i++ {\n  x := i\n}\nfunc helper() {\n}\ny := 1\nz++";
    let program = parse_ok(src);
    let constructs: Vec<_> = program
        .stmts
        .iter()
        .map(|s| match s {
            Stmt::Unsupported { construct, .. } => construct.clone(),
            Stmt::Assign(_) => "assign".to_string(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        constructs,
        vec!["'for' statement", "'func' statement", "assign", "increment statement"]
    );
}

#[test]
fn test_error_recovery_continues_with_next_line() {
    let result = parse_frontmatter("a := )\nb := 2\nvar = 3\nd := 4");
    assert_eq!(result.errors.total_errors, 2);
    let program = result.program.unwrap();
    assert!(program
        .stmts
        .iter()
        .any(|s| matches!(s, Stmt::Assign(a) if a.names[0].name == "d")));
}

#[test]
fn test_error_spans_point_at_token() {
    let result = parse_frontmatter("var a = 1\nvar b = )");
    let err = result.errors.first().unwrap();
    assert_eq!(err.span.start_line, 2);
    assert_eq!(err.span.start_col, 9);
    assert_eq!(err.source_line, "var b = )");
    assert_eq!(err.message, "expected expression, got ')'");
}

#[test]
fn test_deep_nesting_is_reported_not_overflowed() {
    let src = format!("x := {}1{}", "(".repeat(200), ")".repeat(200));
    let result = parse_frontmatter(&src);
    assert!(result.errors.has_errors());
}
