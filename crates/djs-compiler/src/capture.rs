//! Upvalue analysis: deciding which of a function's own locals must be
//! stored on its capture-environment object (§4.6) instead of a bare
//! stack slot, because some nested function literal reads or writes
//! them.
//!
//! `spec.md` §4.1 describes closure promotion as happening "on lookup
//! miss" while emitting the inner function, which only works if the
//! *outer* function already agreed, ahead of time, to publish that name
//! through its environment object rather than keep it stack-only. This
//! module computes that agreement as a pre-pass, once per function,
//! before any code for it is emitted.

use std::collections::HashSet;

use djs_ast::{Expr, Stmt};

use crate::hoist::bound_names;

/// Every identifier referenced anywhere inside `body` (including inside
/// nested function literals and declarations, transitively) that is not
/// bound by the function that reads it — i.e. this function's free
/// variables.
pub(crate) fn free_vars_of_function(params: &[String], self_name: Option<&str>, body: &[Stmt]) -> HashSet<String> {
    let bound: HashSet<String> = bound_names(params, self_name, body).into_iter().collect();
    let mut free = HashSet::new();
    walk_stmts(body, &mut free);
    free.retain(|name| !bound.contains(name));
    free
}

/// The subset of this function's own bound names that some nested
/// function (expression or declaration, at any depth) needs from it —
/// these must live on the environment object, not the stack.
pub(crate) fn captured_locals(params: &[String], self_name: Option<&str>, body: &[Stmt]) -> HashSet<String> {
    let bound: HashSet<String> = bound_names(params, self_name, body).into_iter().collect();
    let mut needed_by_children = HashSet::new();
    walk_nested_functions(body, &mut needed_by_children);
    bound.intersection(&needed_by_children).cloned().collect()
}

/// Collects the free variables of every function literal/declaration
/// directly nested in `stmts` (not `stmts`' own free variables).
fn walk_nested_functions(stmts: &[Stmt], out: &mut HashSet<String>) {
    for stmt in stmts {
        if let Stmt::FunctionDecl { name, params, body, .. } = stmt {
            out.extend(free_vars_of_function(params, Some(name), body));
        }
        walk_stmt_exprs(stmt, &mut |expr| collect_nested_from_expr(expr, out));
    }
}

fn collect_nested_from_expr(expr: &Expr, out: &mut HashSet<String>) {
    if let Expr::Function { name, params, body, .. } = expr {
        out.extend(free_vars_of_function(params, name.as_deref(), body));
        return;
    }
    visit_subexprs(expr, &mut |sub| collect_nested_from_expr(sub, out));
}

/// Collects every identifier reference in `stmts`, including those
/// reached through nested function literals/declarations (whose own
/// bound names have already been subtracted by the recursive
/// `free_vars_of_function` call).
fn walk_stmts(stmts: &[Stmt], out: &mut HashSet<String>) {
    for stmt in stmts {
        if let Stmt::FunctionDecl { name, params, body, .. } = stmt {
            out.extend(free_vars_of_function(params, Some(name), body));
            continue;
        }
        walk_stmt_exprs(stmt, &mut |expr| collect_free_in_expr(expr, out));
    }
}

fn collect_free_in_expr(expr: &Expr, out: &mut HashSet<String>) {
    if let Expr::Function { name, params, body, .. } = expr {
        out.extend(free_vars_of_function(params, name.as_deref(), body));
        return;
    }
    if let Expr::Ident(name, _) = expr {
        out.insert(name.clone());
    }
    visit_subexprs(expr, &mut |sub| collect_free_in_expr(sub, out));
}

/// Applies `f` to every immediate child expression of `expr` (not
/// recursing into nested function literals — callers that want that
/// call `f` recursively themselves).
fn visit_subexprs<'a>(expr: &'a Expr, f: &mut dyn FnMut(&'a Expr)) {
    match expr {
        Expr::Number(..)
        | Expr::Str(..)
        | Expr::Bool(..)
        | Expr::Null(_)
        | Expr::Undefined(_)
        | Expr::Ident(..)
        | Expr::This(_)
        | Expr::Function { .. } => {}
        Expr::Object(fields, _) => {
            for field in fields {
                f(&field.value);
            }
        }
        Expr::Array(items, _) => {
            for item in items {
                f(item);
            }
        }
        Expr::Member { object, property, .. } => {
            f(object);
            if let djs_ast::expr::MemberProp::Computed(key) = property {
                f(key);
            }
        }
        Expr::Unary { expr, .. } => f(expr),
        Expr::Update { target, .. } => f(target),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            f(left);
            f(right);
        }
        Expr::Assign { target, value, .. } => {
            f(target);
            f(value);
        }
        Expr::Call { callee, args, .. } | Expr::New { callee, args, .. } => {
            f(callee);
            for a in args {
                f(a);
            }
        }
    }
}

/// Applies `f` to every expression that appears directly in `stmt`
/// (its own conditions/operands), not descending into nested statement
/// blocks belonging to a *different* function.
fn walk_stmt_exprs<'a>(stmt: &'a Stmt, f: &mut dyn FnMut(&'a Expr)) {
    match stmt {
        Stmt::VarDecl { init, .. } => {
            if let Some(e) = init {
                f(e);
            }
        }
        Stmt::FunctionDecl { .. } => {}
        Stmt::Expr(e) => f(e),
        Stmt::Block(stmts, _) => {
            for s in stmts {
                walk_stmt_exprs(s, f);
            }
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            f(cond);
            walk_stmt_exprs(then_branch, f);
            if let Some(e) = else_branch {
                walk_stmt_exprs(e, f);
            }
        }
        Stmt::While { cond, body, .. } => {
            f(cond);
            walk_stmt_exprs(body, f);
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                walk_stmt_exprs(init, f);
            }
            if let Some(cond) = cond {
                f(cond);
            }
            if let Some(update) = update {
                f(update);
            }
            walk_stmt_exprs(body, f);
        }
        Stmt::Break(_) | Stmt::Continue(_) => {}
        Stmt::Return(value, _) => {
            if let Some(v) = value {
                f(v);
            }
        }
        Stmt::Throw(e, _) => f(e),
        Stmt::Try { block, handler, .. } => {
            for s in block {
                walk_stmt_exprs(s, f);
            }
            for s in handler {
                walk_stmt_exprs(s, f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use djs_ast::Span;

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string(), Span::synthetic())
    }

    #[test]
    fn counter_closure_captures_outer_var() {
        // function make() { var n = 0; return function(){ n = n + 1; return n; }; }
        let inner_body = vec![
            Stmt::Expr(Expr::Assign {
                target: Box::new(ident("n")),
                value: Box::new(Expr::Binary {
                    op: djs_ast::BinaryOp::Add,
                    left: Box::new(ident("n")),
                    right: Box::new(Expr::Number(1.0, Span::synthetic())),
                    span: Span::synthetic(),
                }),
                span: Span::synthetic(),
            }),
            Stmt::Return(Some(ident("n")), Span::synthetic()),
        ];
        let outer_body = vec![
            Stmt::VarDecl {
                name: "n".into(),
                init: Some(Expr::Number(0.0, Span::synthetic())),
                span: Span::synthetic(),
            },
            Stmt::Return(
                Some(Expr::Function {
                    name: None,
                    params: vec![],
                    body: inner_body,
                    span: Span::synthetic(),
                }),
                Span::synthetic(),
            ),
        ];
        let captured = captured_locals(&[], None, &outer_body);
        assert!(captured.contains("n"));
    }

    #[test]
    fn unrelated_local_is_not_captured() {
        let body = vec![
            Stmt::VarDecl {
                name: "a".into(),
                init: None,
                span: Span::synthetic(),
            },
            Stmt::VarDecl {
                name: "b".into(),
                init: None,
                span: Span::synthetic(),
            },
            Stmt::Return(
                Some(Expr::Function {
                    name: None,
                    params: vec![],
                    body: vec![Stmt::Return(Some(ident("a")), Span::synthetic())],
                    span: Span::synthetic(),
                }),
                Span::synthetic(),
            ),
        ];
        let captured = captured_locals(&[], None, &body);
        assert!(captured.contains("a"));
        assert!(!captured.contains("b"));
    }

    #[test]
    fn nested_function_declaration_captures_outer_var() {
        // function outer() { var n = 1; function inner() { return n; } return inner; }
        let body = vec![
            Stmt::VarDecl {
                name: "n".into(),
                init: Some(Expr::Number(1.0, Span::synthetic())),
                span: Span::synthetic(),
            },
            Stmt::FunctionDecl {
                name: "inner".into(),
                params: vec![],
                body: vec![Stmt::Return(Some(ident("n")), Span::synthetic())],
                span: Span::synthetic(),
            },
            Stmt::Return(Some(ident("inner")), Span::synthetic()),
        ];
        let captured = captured_locals(&[], None, &body);
        assert!(captured.contains("n"));
    }
}
