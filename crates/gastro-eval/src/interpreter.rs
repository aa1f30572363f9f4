//! Tree-walking interpreter for frontmatter programs.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::registry::PackageFn;
use gastro_types::ast::*;
use gastro_types::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Whether execution continues after a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// A redirect was signalled; skip everything at every enclosing level.
    Redirect,
}

/// How many results the caller of a call expression expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Want {
    /// Expression position.
    One,
    /// `v, err := call()`
    Two,
    /// Expression statement; results are discarded.
    Any,
}

/// Executes frontmatter statements against a borrowed [`Environment`].
pub struct Interpreter<'env> {
    env: &'env mut Environment,
}

impl<'env> Interpreter<'env> {
    pub fn new(env: &'env mut Environment) -> Self {
        Self { env }
    }

    /// Run a parsed program. Stops silently after a redirect.
    pub fn run(&mut self, program: &Program) -> EvalResult<()> {
        if self.env.is_redirected() {
            return Ok(());
        }
        for stmt in &program.stmts {
            if self.exec_stmt(stmt)? == Flow::Redirect {
                break;
            }
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::Var(decl) => self.exec_var(decl),
            Stmt::Assign(assign) => self.exec_binding(&assign.names, &assign.values),
            Stmt::If(if_stmt) => self.exec_if(if_stmt),
            Stmt::Import(decl) => {
                self.exec_import(decl);
                Ok(Flow::Continue)
            }
            Stmt::Expr(stmt) => {
                match &stmt.expr.kind {
                    ExprKind::Call { callee, args } => {
                        self.eval_call(callee, args, Want::Any)?;
                    }
                    _ => {
                        self.eval_expr(&stmt.expr)?;
                    }
                }
                Ok(self.flow())
            }
            Stmt::Unsupported { construct, .. } => Err(EvalError::Unsupported(construct.clone())),
        }
    }

    fn exec_block(&mut self, block: &Block) -> EvalResult<Flow> {
        for stmt in &block.stmts {
            if self.exec_stmt(stmt)? == Flow::Redirect {
                return Ok(Flow::Redirect);
            }
        }
        Ok(Flow::Continue)
    }

    fn flow(&self) -> Flow {
        if self.env.is_redirected() {
            Flow::Redirect
        } else {
            Flow::Continue
        }
    }

    fn exec_var(&mut self, decl: &VarDecl) -> EvalResult<Flow> {
        if decl.values.is_empty() {
            let zero = decl.type_ann.as_ref().map_or(Value::Nil, zero_value);
            for name in decl.names.iter().filter(|n| !n.is_blank()) {
                self.env.set(&name.name, zero.clone());
            }
            return Ok(Flow::Continue);
        }
        self.exec_binding(&decl.names, &decl.values)
    }

    /// Evaluate every right-hand side, then bind pairwise. A single call on
    /// the right of several names spreads its results.
    fn exec_binding(&mut self, names: &[Ident], values: &[Expr]) -> EvalResult<Flow> {
        let results = match values {
            [Expr {
                kind: ExprKind::Call { callee, args },
                ..
            }] if names.len() > 1 => {
                let want = if names.len() == 2 { Want::Two } else { Want::Any };
                self.eval_call(callee, args, want)?
            }
            _ => values
                .iter()
                .map(|value| self.eval_expr(value))
                .collect::<EvalResult<Vec<_>>>()?,
        };
        if self.env.is_redirected() {
            return Ok(Flow::Redirect);
        }
        if results.len() != names.len() {
            return Err(EvalError::AssignmentMismatch {
                names: names.len(),
                values: results.len(),
            });
        }
        for (name, value) in names.iter().zip(results) {
            if !name.is_blank() {
                self.env.set(&name.name, value);
            }
        }
        Ok(Flow::Continue)
    }

    fn exec_if(&mut self, if_stmt: &IfStmt) -> EvalResult<Flow> {
        let taken = match self.eval_expr(&if_stmt.condition)? {
            Value::Bool(b) => b,
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "if condition must be boolean, got {}",
                    other.type_name()
                )))
            }
        };
        if self.env.is_redirected() {
            return Ok(Flow::Redirect);
        }
        if taken {
            return self.exec_block(&if_stmt.then_block);
        }
        match &if_stmt.else_branch {
            Some(ElseBranch::ElseIf(nested)) => self.exec_if(nested),
            Some(ElseBranch::Block(block)) => self.exec_block(block),
            None => Ok(Flow::Continue),
        }
    }

    fn exec_import(&mut self, decl: &ImportDecl) {
        for spec in &decl.specs {
            let local = spec.local_name();
            if local == "_" || local == "." {
                continue;
            }
            trace!(package = local, path = %spec.path, "import recorded");
            self.env.import_package(local, &spec.path);
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::Int(*n)),
            ExprKind::FloatLit(n) => Ok(Value::Float(*n)),
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::CharLit(c) => Ok(Value::Int(i64::from(u32::from(*c)))),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NilLit => Ok(Value::Nil),
            ExprKind::Identifier(name) => self.eval_identifier(name),
            ExprKind::Selector { object, field } => self.eval_selector(object, &field.name),
            ExprKind::Call { callee, args } => {
                let results = self.eval_call(callee, args, Want::One)?;
                single(results, callee)
            }
            ExprKind::Binary { left, op, right } => {
                // both sides are always evaluated, including for && and ||
                let lv = self.eval_expr(left)?;
                let rv = self.eval_expr(right)?;
                eval_binary(*op, lv, rv)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                eval_unary(*op, value)
            }
            ExprKind::Composite { ty, elements } => self.eval_composite(ty.as_ref(), elements),
            ExprKind::Paren(inner) => self.eval_expr(inner),
            ExprKind::Unsupported(construct) => Err(EvalError::Unsupported(construct.clone())),
        }
    }

    // ── Identifiers & Selectors ──────────────────────────────────────────

    fn eval_identifier(&self, name: &str) -> EvalResult<Value> {
        if let Some(value) = self.env.get(name) {
            return Ok(value.clone());
        }
        if name == "Gastro" {
            let mut namespace = BTreeMap::new();
            namespace.insert("Locals".to_string(), Value::Map(self.env.locals().clone()));
            return Ok(Value::Map(namespace));
        }
        Err(EvalError::UndefinedVariable(name.to_string()))
    }

    fn eval_selector(&mut self, object: &Expr, field: &str) -> EvalResult<Value> {
        if let ExprKind::Identifier(package) = &object.kind {
            if self.env.get(package).is_none() && self.package_fn(package, field).is_some() {
                return Err(EvalError::Unsupported(format!(
                    "use of {package}.{field} without calling it"
                )));
            }
        }
        let base = self.eval_expr(object)?;
        select(&base, field)
    }

    // ── Calls ────────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], want: Want) -> EvalResult<Vec<Value>> {
        match &callee.kind {
            ExprKind::Identifier(name) if self.env.get(name).is_none() => match name.as_str() {
                "len" => {
                    let args = self.eval_args(args)?;
                    builtin_len(&args).map(|n| vec![n])
                }
                "redirect" | "Redirect" => self.eval_redirect(args, want),
                _ => Err(EvalError::UnsupportedCall(name.clone())),
            },
            ExprKind::Selector { object, field } => {
                if let ExprKind::Identifier(package) = &object.kind {
                    if self.env.get(package).is_none() {
                        return self.eval_package_call(package, &field.name, args, want);
                    }
                }
                let receiver = self.eval_expr(object)?;
                let args = self.eval_args(args)?;
                call_method(&receiver, &field.name, &args, want)
            }
            ExprKind::Paren(inner) => self.eval_call(inner, args, want),
            _ => Err(EvalError::UnsupportedCall(callee_name(callee))),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }

    /// `pkg.Func(args)` where `pkg` is not a variable: the builtin `Gastro`
    /// namespace or a registered host package.
    fn eval_package_call(
        &mut self,
        package: &str,
        name: &str,
        args: &[Expr],
        want: Want,
    ) -> EvalResult<Vec<Value>> {
        if package == "Gastro" {
            return match name {
                "redirect" | "Redirect" => self.eval_redirect(args, want),
                _ => Err(EvalError::UnsupportedCall(format!("Gastro.{name}"))),
            };
        }
        let func = self
            .package_fn(package, name)
            .ok_or_else(|| EvalError::UnsupportedCall(format!("{package}.{name}")))?;
        let args = self.eval_args(args)?;
        match (func(&args), want) {
            (Ok(value), Want::Two) => Ok(vec![value, Value::Nil]),
            (Ok(value), _) => Ok(vec![value]),
            (Err(message), Want::Two) => Ok(vec![Value::Nil, Value::String(message)]),
            (Err(message), _) => Err(EvalError::Host(format!("{package}.{name}: {message}"))),
        }
    }

    /// Look a package function up by recorded import path, the path's last
    /// segment, then the local name itself.
    fn package_fn(&self, local: &str, name: &str) -> Option<PackageFn> {
        let registry = self.env.registry();
        let mut candidates = Vec::with_capacity(3);
        if let Some(path) = self.env.package_path(local) {
            candidates.push(path);
            if let Some(last) = path.rsplit('/').next() {
                candidates.push(last);
            }
        }
        candidates.push(local);
        candidates
            .into_iter()
            .find_map(|package| registry.get(package, name))
            .cloned()
    }

    fn eval_redirect(&mut self, args: &[Expr], want: Want) -> EvalResult<Vec<Value>> {
        if want != Want::Any {
            return Err(EvalError::TypeMismatch(
                "redirect(...) does not return a value".into(),
            ));
        }
        if args.len() != 2 {
            return Err(EvalError::InvalidRedirect(format!(
                "expected 2 arguments (url, status), got {}",
                args.len()
            )));
        }
        let url = match self.eval_expr(&args[0])? {
            Value::String(url) => url,
            other => {
                return Err(EvalError::InvalidRedirect(format!(
                    "URL must be a string, got {}",
                    other.type_name()
                )))
            }
        };
        let status = match self.eval_expr(&args[1])? {
            Value::Int(n) => u16::try_from(n)
                .ok()
                .filter(|s| (100..=599).contains(s))
                .ok_or_else(|| EvalError::InvalidRedirect(format!("status {n} out of range")))?,
            other => {
                return Err(EvalError::InvalidRedirect(format!(
                    "status must be an int, got {}",
                    other.type_name()
                )))
            }
        };
        debug!(%url, status, "redirect signalled");
        self.env.set_redirect(url, status);
        Ok(Vec::new())
    }

    // ── Composite literals ───────────────────────────────────────────────

    fn eval_composite(&mut self, ty: Option<&TypeExpr>, elements: &[Element]) -> EvalResult<Value> {
        match ty {
            Some(TypeExpr::Slice(elem)) => self.eval_list_literal(elements, Some(&**elem)),
            Some(TypeExpr::Map(key, value)) => {
                if **key != TypeExpr::Named("string".into()) {
                    return Err(EvalError::TypeMismatch(format!(
                        "map keys must be strings, got {key}"
                    )));
                }
                self.eval_map_literal(elements, Some(&**value))
            }
            Some(TypeExpr::Named(_)) => self.eval_struct_literal(elements),
            Some(TypeExpr::Pointer(inner)) => self.eval_composite(Some(&**inner), elements),
            Some(other @ TypeExpr::Interface) => Err(EvalError::Unsupported(format!(
                "composite literal of type {other}"
            ))),
            None => match elements.first() {
                None | Some(Element::KeyValue { .. }) => self.eval_map_literal(elements, None),
                Some(Element::Positional(_)) => self.eval_list_literal(elements, None),
            },
        }
    }

    fn eval_list_literal(&mut self, elements: &[Element], elem: Option<&TypeExpr>) -> EvalResult<Value> {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Positional(expr) => items.push(self.eval_element(expr, elem)?),
                Element::KeyValue { .. } => {
                    return Err(EvalError::Unsupported("indexed list literal".into()))
                }
            }
        }
        Ok(Value::List(items))
    }

    fn eval_map_literal(&mut self, elements: &[Element], elem: Option<&TypeExpr>) -> EvalResult<Value> {
        let mut entries = BTreeMap::new();
        for element in elements {
            let Element::KeyValue { key, value } = element else {
                return Err(EvalError::TypeMismatch(
                    "expected key: value pair in map literal".into(),
                ));
            };
            let key = match self.eval_expr(key)? {
                Value::String(key) => key,
                other => {
                    return Err(EvalError::TypeMismatch(format!(
                        "map keys must be strings, got {}",
                        other.type_name()
                    )))
                }
            };
            let value = self.eval_element(value, elem)?;
            entries.insert(key, value);
        }
        Ok(Value::Map(entries))
    }

    /// `T{Field: v}` becomes a Map keyed by field name.
    fn eval_struct_literal(&mut self, elements: &[Element]) -> EvalResult<Value> {
        let mut fields = BTreeMap::new();
        for element in elements {
            match element {
                Element::KeyValue { key, value } => {
                    let ExprKind::Identifier(name) = &key.kind else {
                        return Err(EvalError::TypeMismatch(
                            "invalid field name in struct literal".into(),
                        ));
                    };
                    let value = self.eval_element(value, None)?;
                    fields.insert(name.clone(), value);
                }
                Element::Positional(_) => {
                    return Err(EvalError::Unsupported("positional struct literal".into()))
                }
            }
        }
        Ok(Value::Map(fields))
    }

    /// Elided `{...}` elements take their type from the enclosing literal.
    fn eval_element(&mut self, expr: &Expr, hint: Option<&TypeExpr>) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Composite { ty: None, elements } => self.eval_composite(hint, elements),
            _ => self.eval_expr(expr),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════

fn eval_binary(op: BinOp, lv: Value, rv: Value) -> EvalResult<Value> {
    use Value::{Bool, Float, Int};
    let value = match (op, &lv, &rv) {
        (BinOp::Eq, _, _) => Bool(lv == rv),
        (BinOp::NotEq, _, _) => Bool(lv != rv),
        // non-bool operands yield false rather than an error
        (BinOp::And, Bool(a), Bool(b)) => Bool(*a && *b),
        (BinOp::Or, Bool(a), Bool(b)) => Bool(*a || *b),
        (BinOp::And | BinOp::Or, _, _) => Bool(false),

        (BinOp::Add, Int(a), Int(b)) => Int(a.wrapping_add(*b)),
        (BinOp::Add, Float(a), Float(b)) => Float(a + b),
        (BinOp::Add, Value::String(a), Value::String(b)) => Value::String(format!("{a}{b}")),
        (BinOp::Sub, Int(a), Int(b)) => Int(a.wrapping_sub(*b)),
        (BinOp::Sub, Float(a), Float(b)) => Float(a - b),
        (BinOp::Mul, Int(a), Int(b)) => Int(a.wrapping_mul(*b)),
        (BinOp::Mul, Float(a), Float(b)) => Float(a * b),
        (BinOp::Div | BinOp::Rem, Int(_), Int(0)) => return Err(EvalError::DivisionByZero),
        (BinOp::Div, Int(a), Int(b)) => Int(a.wrapping_div(*b)),
        (BinOp::Rem, Int(a), Int(b)) => Int(a.wrapping_rem(*b)),
        (BinOp::Div, Float(_), Float(b)) if *b == 0.0 => return Err(EvalError::DivisionByZero),
        (BinOp::Div, Float(a), Float(b)) => Float(a / b),

        (BinOp::Less, Int(a), Int(b)) => Bool(a < b),
        (BinOp::LessEq, Int(a), Int(b)) => Bool(a <= b),
        (BinOp::Greater, Int(a), Int(b)) => Bool(a > b),
        (BinOp::GreaterEq, Int(a), Int(b)) => Bool(a >= b),
        (BinOp::Less, Float(a), Float(b)) => Bool(a < b),
        (BinOp::LessEq, Float(a), Float(b)) => Bool(a <= b),
        (BinOp::Greater, Float(a), Float(b)) => Bool(a > b),
        (BinOp::GreaterEq, Float(a), Float(b)) => Bool(a >= b),

        _ => {
            return Err(EvalError::TypeMismatch(format!(
                "invalid operands for '{op}': {} and {}",
                lv.type_name(),
                rv.type_name()
            )))
        }
    };
    Ok(value)
}

fn eval_unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, other) => Err(EvalError::TypeMismatch(format!(
            "invalid operand for unary '{op}': {}",
            other.type_name()
        ))),
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════

/// `base.name`: map key (missing is nil), host field, or zero-arg host method.
fn select(base: &Value, name: &str) -> EvalResult<Value> {
    match base {
        Value::Map(entries) => Ok(entries.get(name).cloned().unwrap_or(Value::Nil)),
        Value::Opaque(object) => {
            if let Some(value) = object.field(name) {
                return Ok(value);
            }
            match object.call(name, &[]) {
                Some(Ok(mut values)) if values.len() == 1 => Ok(values.remove(0)),
                Some(Err(message)) => Err(EvalError::Host(message)),
                _ => Err(EvalError::TypeMismatch(format!(
                    "{} has no field {name}",
                    object.type_name()
                ))),
            }
        }
        other => Err(EvalError::TypeMismatch(format!(
            "cannot select field {name} from {}",
            other.type_name()
        ))),
    }
}

fn call_method(receiver: &Value, method: &str, args: &[Value], want: Want) -> EvalResult<Vec<Value>> {
    let Value::Opaque(object) = receiver else {
        return Err(EvalError::UnsupportedCall(format!(
            "{}.{method}",
            receiver.type_name()
        )));
    };
    let result = object
        .call(method, args)
        .ok_or_else(|| EvalError::UnsupportedCall(format!("{}.{method}", object.type_name())))?;
    match (result, want) {
        (Err(message), Want::Two) => Ok(vec![Value::Nil, Value::String(message)]),
        (Err(message), _) => Err(EvalError::Host(message)),
        (Ok(mut values), Want::Two) if values.len() == 1 => {
            values.push(Value::Nil);
            Ok(values)
        }
        // (value, error) pair used as a single value
        (Ok(mut values), Want::One) if values.len() == 2 => match values.pop() {
            Some(Value::Nil) | None => Ok(values),
            Some(error) => Err(EvalError::Host(error.to_string())),
        },
        (Ok(values), _) => Ok(values),
    }
}

fn builtin_len(args: &[Value]) -> EvalResult<Value> {
    let [arg] = args else {
        return Err(EvalError::TypeMismatch(format!(
            "len expects 1 argument, got {}",
            args.len()
        )));
    };
    let n = arg.len().ok_or_else(|| {
        EvalError::TypeMismatch(format!("invalid argument for len: {}", arg.type_name()))
    })?;
    Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
}

fn single(mut results: Vec<Value>, callee: &Expr) -> EvalResult<Value> {
    match results.len() {
        1 => Ok(results.remove(0)),
        0 => Err(EvalError::TypeMismatch(format!(
            "{}() does not return a value",
            callee_name(callee)
        ))),
        _ => Err(EvalError::TypeMismatch(format!(
            "multiple-value {}() in single-value context",
            callee_name(callee)
        ))),
    }
}

fn callee_name(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Identifier(name) => name.clone(),
        ExprKind::Selector { object, field } => format!("{}.{}", callee_name(object), field.name),
        ExprKind::Call { callee, .. } => format!("{}()", callee_name(callee)),
        ExprKind::Paren(inner) => callee_name(inner),
        _ => "expression".into(),
    }
}

/// Value of `var x T` with no initializer.
fn zero_value(ty: &TypeExpr) -> Value {
    let TypeExpr::Named(name) = ty else {
        return Value::Nil;
    };
    match name.as_str() {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "byte" | "rune" => Value::Int(0),
        "float32" | "float64" => Value::Float(0.0),
        "string" => Value::String(String::new()),
        "bool" => Value::Bool(false),
        _ => Value::Nil,
    }
}
