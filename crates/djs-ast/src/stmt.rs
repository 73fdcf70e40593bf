//! Statement nodes, covering exactly the statement kinds §4.1 of
//! `SPEC_FULL.md` gives emission contracts for.

use crate::expr::Expr;
use crate::span::Span;

/// Every statement kind this subset supports.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `var name [= init];`. Hoisted to `undefined` at the top of its
    /// enclosing function by the compiler's prepass (§4.1).
    VarDecl {
        /// The bound name.
        name: String,
        /// The initializer, if any.
        init: Option<Expr>,
        /// Source span.
        span: Span,
    },
    /// `function name(params) { body }` as a statement. Also hoisted by
    /// the prepass, fully initialized (unlike `var`, which hoists to
    /// `undefined`).
    FunctionDecl {
        /// The declared name.
        name: String,
        /// Parameter names.
        params: Vec<String>,
        /// The function body.
        body: Vec<Stmt>,
        /// Source span.
        span: Span,
    },
    /// An expression evaluated for its side effect; the result is
    /// discarded.
    Expr(Expr),
    /// `{ ...stmts }`.
    Block(Vec<Stmt>, Span),
    /// `if (cond) then [else else_]`.
    If {
        /// The condition.
        cond: Expr,
        /// The taken branch.
        then_branch: Box<Stmt>,
        /// The untaken branch, if any.
        else_branch: Option<Box<Stmt>>,
        /// Source span.
        span: Span,
    },
    /// `while (cond) body`.
    While {
        /// The condition.
        cond: Expr,
        /// The loop body.
        body: Box<Stmt>,
        /// Source span.
        span: Span,
    },
    /// `for ([init]; [cond]; [update]) body`. A missing sub-clause is
    /// `None`; the compiler lowers it to a `nop` per the Design Notes
    /// Open Question decision.
    For {
        /// The initializer statement, if present.
        init: Option<Box<Stmt>>,
        /// The loop condition, if present.
        cond: Option<Expr>,
        /// The per-iteration update expression, if present.
        update: Option<Expr>,
        /// The loop body.
        body: Box<Stmt>,
        /// Source span.
        span: Span,
    },
    /// `break;`.
    Break(Span),
    /// `continue;`.
    Continue(Span),
    /// `return [value];`.
    Return(Option<Expr>, Span),
    /// `throw value;`.
    Throw(Expr, Span),
    /// `try { block } catch (param) { handler }`.
    Try {
        /// The guarded block.
        block: Vec<Stmt>,
        /// The bound name of the caught exception.
        catch_param: String,
        /// The handler block.
        handler: Vec<Stmt>,
        /// Source span.
        span: Span,
    },
}

impl Stmt {
    /// The source span covering this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl { span, .. }
            | Stmt::FunctionDecl { span, .. }
            | Stmt::Block(_, span)
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Break(span)
            | Stmt::Continue(span)
            | Stmt::Return(_, span)
            | Stmt::Throw(_, span)
            | Stmt::Try { span, .. } => *span,
            Stmt::Expr(e) => e.span(),
        }
    }
}
