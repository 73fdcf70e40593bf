//! Hoisting prepass (§4.1, "Two-pass emission for hoisting"). Collects
//! every `var` name and top-level `function` declaration reachable from
//! a function body *without* descending into nested function literals —
//! exactly the set JavaScript hoists to the top of the enclosing
//! function.

use djs_ast::{Expr, Stmt};

/// One hoisted function declaration: name plus enough of the literal to
/// compile it as an ordinary `Expr::Function`.
pub(crate) struct HoistedFunction<'a> {
    pub name: String,
    pub params: &'a [String],
    pub body: &'a [Stmt],
}

/// The result of walking a function body's hoist-eligible statements.
pub(crate) struct Hoisted<'a> {
    /// `var` names, declaration order, deduplicated.
    pub vars: Vec<String>,
    /// Function declarations, in program order (compiled and bound
    /// eagerly at function entry, ahead of `var`s).
    pub functions: Vec<HoistedFunction<'a>>,
}

/// Every name this function body binds directly (params excluded —
/// callers add those), used by both hoisting emission and free-variable
/// analysis.
pub(crate) fn collect_hoisted(body: &[Stmt]) -> Hoisted<'_> {
    let mut vars = Vec::new();
    let mut functions = Vec::new();
    walk_stmts(body, &mut vars, &mut functions);
    Hoisted { vars, functions }
}

fn walk_stmts<'a>(
    stmts: &'a [Stmt],
    vars: &mut Vec<String>,
    functions: &mut Vec<HoistedFunction<'a>>,
) {
    for stmt in stmts {
        walk_stmt(stmt, vars, functions);
    }
}

fn push_var(vars: &mut Vec<String>, name: &str) {
    if !vars.iter().any(|v| v == name) {
        vars.push(name.to_string());
    }
}

fn walk_stmt<'a>(stmt: &'a Stmt, vars: &mut Vec<String>, functions: &mut Vec<HoistedFunction<'a>>) {
    match stmt {
        Stmt::VarDecl { name, .. } => push_var(vars, name),
        Stmt::FunctionDecl { name, params, body, .. } => {
            functions.push(HoistedFunction {
                name: name.clone(),
                params,
                body,
            });
        }
        Stmt::Block(stmts, _) => walk_stmts(stmts, vars, functions),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk_stmt(then_branch, vars, functions);
            if let Some(e) = else_branch {
                walk_stmt(e, vars, functions);
            }
        }
        Stmt::While { body, .. } => walk_stmt(body, vars, functions),
        Stmt::For { init, body, .. } => {
            if let Some(init) = init {
                walk_stmt(init, vars, functions);
            }
            walk_stmt(body, vars, functions);
        }
        Stmt::Try { block, handler, .. } => {
            walk_stmts(block, vars, functions);
            walk_stmts(handler, vars, functions);
        }
        Stmt::Expr(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Return(..)
        | Stmt::Throw(..) => {}
    }
}

/// Every bound name for a function literal: its parameters, its hoisted
/// `var`/function names, and (for a named function expression) its own
/// name. Does not include names captured from an enclosing scope.
pub(crate) fn bound_names(params: &[String], self_name: Option<&str>, body: &[Stmt]) -> Vec<String> {
    let hoisted = collect_hoisted(body);
    let mut names: Vec<String> = params.to_vec();
    for f in &hoisted.functions {
        if !names.iter().any(|n| n == &f.name) {
            names.push(f.name.clone());
        }
    }
    for v in hoisted.vars {
        if !names.iter().any(|n| n == &v) {
            names.push(v);
        }
    }
    if let Some(n) = self_name {
        if !names.iter().any(|existing| existing == n) {
            names.push(n.to_string());
        }
    }
    names
}

/// Whether an expression is, syntactically, a function literal — used
/// by capture analysis to recurse without re-matching the whole `Expr`
/// shape at every call site.
pub(crate) fn as_function_literal(expr: &Expr) -> Option<(&Option<String>, &[String], &[Stmt])> {
    match expr {
        Expr::Function { name, params, body, .. } => Some((name, params, body)),
        _ => None,
    }
}
