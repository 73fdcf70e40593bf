//! Expression nodes, covering exactly the expression kinds §4.1 of
//! `SPEC_FULL.md` gives emission contracts for.

use crate::span::Span;
use crate::stmt::Stmt;

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Unary `+` (numeric conversion).
    Plus,
    /// Unary `-`.
    Minus,
    /// `!`.
    Not,
    /// `typeof`.
    Typeof,
    /// `void`.
    Void,
}

/// `++`/`--`, distinguished from the binary operators since they act
/// through an lvalue rather than pushing two rvalues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    /// `++`.
    Inc,
    /// `--`.
    Dec,
}

/// Arithmetic/relational/equality binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`.
    Add,
    /// `-`.
    Sub,
    /// `*`.
    Mul,
    /// `/`.
    Div,
    /// `%`.
    Mod,
    /// `===`.
    StrictEq,
    /// `!==`.
    NotEq,
    /// `<`.
    Lt,
    /// `<=`.
    Le,
    /// `>`.
    Gt,
    /// `>=`.
    Ge,
}

/// Short-circuiting logical operators (compiled to jumps, not opcodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`.
    And,
    /// `||`.
    Or,
}

/// One `key: value` entry of an object literal. The key is always a
/// source-level identifier or string/numeric literal — this subset has
/// no computed (`[expr]: value`) object-literal keys.
#[derive(Debug, Clone)]
pub struct ObjectField {
    /// The property name.
    pub key: String,
    /// The value expression.
    pub value: Expr,
}

/// Every expression kind this subset supports.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A numeric literal. The compiler decides `Int` vs `Float` when
    /// interning it (§4.2).
    Number(f64, Span),
    /// A string literal.
    Str(String, Span),
    /// `true`/`false`.
    Bool(bool, Span),
    /// `null`.
    Null(Span),
    /// `undefined`.
    Undefined(Span),
    /// An identifier reference (global, local, or closure-captured —
    /// resolved by the compiler, not the parser).
    Ident(String, Span),
    /// `this`.
    This(Span),
    /// `{ ...fields }`.
    Object(Vec<ObjectField>, Span),
    /// `[ ...items ]`.
    Array(Vec<Expr>, Span),
    /// A function literal. `name` is `Some` for a named function
    /// expression/declaration (enabling self-recursion, §4.1), `None`
    /// for an anonymous function expression.
    Function {
        /// The function's own name, if any.
        name: Option<String>,
        /// Parameter names, in declaration order.
        params: Vec<String>,
        /// The function body.
        body: Vec<Stmt>,
        /// Source span of the whole literal.
        span: Span,
    },
    /// `target.property` or `target[property]`.
    Member {
        /// The object expression.
        object: Box<Expr>,
        /// The property name. For `target[expr]`, this is `Computed`;
        /// for `target.name`, `Static`.
        property: MemberProp,
        /// Source span.
        span: Span,
    },
    /// A prefix unary operator application.
    Unary {
        /// Which operator.
        op: UnaryOp,
        /// The operand.
        expr: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `++x`/`--x`/`x++`/`x--`.
    Update {
        /// Which operator.
        op: UpdateOp,
        /// The lvalue operand.
        target: Box<Expr>,
        /// `true` for `++x`, `false` for `x++`.
        prefix: bool,
        /// Source span.
        span: Span,
    },
    /// A binary arithmetic/relational/equality expression.
    Binary {
        /// Which operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `&&`/`||`.
    Logical {
        /// Which operator.
        op: LogicalOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `lvalue = rvalue`. Compound assignment operators (`+=`, etc.) are
    /// lowered by the parser into `target = target op rvalue`.
    Assign {
        /// The lvalue target (an identifier or member access).
        target: Box<Expr>,
        /// The value being assigned.
        value: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `callee(args...)`.
    Call {
        /// The callee expression (often a `Member`, for method dispatch).
        callee: Box<Expr>,
        /// Argument expressions, in evaluation order.
        args: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// `new callee(args...)`.
    New {
        /// The constructor expression.
        callee: Box<Expr>,
        /// Argument expressions.
        args: Vec<Expr>,
        /// Source span.
        span: Span,
    },
}

/// How a member expression names its property.
#[derive(Debug, Clone)]
pub enum MemberProp {
    /// `target.name` — the key is known at parse time.
    Static(String),
    /// `target[expr]` — the key is computed at runtime.
    Computed(Box<Expr>),
}

impl Expr {
    /// The source span covering this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, s)
            | Expr::Str(_, s)
            | Expr::Bool(_, s)
            | Expr::Null(s)
            | Expr::Undefined(s)
            | Expr::Ident(_, s)
            | Expr::This(s)
            | Expr::Object(_, s)
            | Expr::Array(_, s)
            | Expr::Function { span: s, .. }
            | Expr::Member { span: s, .. }
            | Expr::Unary { span: s, .. }
            | Expr::Update { span: s, .. }
            | Expr::Binary { span: s, .. }
            | Expr::Logical { span: s, .. }
            | Expr::Assign { span: s, .. }
            | Expr::Call { span: s, .. }
            | Expr::New { span: s, .. } => *s,
        }
    }

    /// Whether this expression is syntactically an lvalue (identifier or
    /// member access) — the only shapes `Assign`/`Update`/`new`'s
    /// "lvalue emission" contract in §4.1 accepts.
    pub fn is_lvalue_shape(&self) -> bool {
        matches!(self, Expr::Ident(..) | Expr::Member { .. })
    }
}
