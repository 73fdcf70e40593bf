//! Lowers an `oxc` AST into [`djs_ast`] types, rejecting anything
//! outside this system's ES5 subset.

use oxc_ast::ast::{self as oxc, BindingPatternKind};

use djs_ast::{BinaryOp, Expr, LogicalOp, ObjectField, Span, Stmt, UnaryOp, UpdateOp};

use crate::error::{ParseError, Result};

fn span_of(s: oxc_span::Span) -> Span {
    Span::new(s.start, s.end)
}

fn unsupported(what: impl Into<String>, span: oxc_span::Span) -> ParseError {
    ParseError::UnsupportedConstruct {
        what: what.into(),
        span: span_of(span),
    }
}

/// Lower a whole parsed program into this subset's statement list.
pub fn lower_program(program: &oxc::Program<'_>) -> Result<Vec<Stmt>> {
    program.body.iter().map(lower_statement).collect()
}

fn simple_binding_name(pattern: &oxc::BindingPattern<'_>) -> Result<String> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => Ok(ident.name.to_string()),
        other => Err(unsupported("destructuring binding pattern", binding_span(other))),
    }
}

fn binding_span(kind: &BindingPatternKind<'_>) -> oxc_span::Span {
    match kind {
        BindingPatternKind::BindingIdentifier(i) => i.span,
        BindingPatternKind::ObjectPattern(p) => p.span,
        BindingPatternKind::ArrayPattern(p) => p.span,
        BindingPatternKind::AssignmentPattern(p) => p.span,
    }
}

fn lower_function_params(params: &oxc::FormalParameters<'_>) -> Result<Vec<String>> {
    if params.rest.is_some() {
        return Err(unsupported("rest parameter", params.span));
    }
    params
        .items
        .iter()
        .map(|p| simple_binding_name(&p.pattern))
        .collect()
}

fn lower_function_body(body: &Option<Box<'_, oxc::FunctionBody<'_>>>, span: oxc_span::Span) -> Result<Vec<Stmt>> {
    let Some(body) = body else {
        return Err(unsupported("function without a body", span));
    };
    body.statements.iter().map(lower_statement).collect()
}

fn lower_statement(stmt: &oxc::Statement<'_>) -> Result<Stmt> {
    use oxc::Statement as S;
    match stmt {
        S::VariableDeclaration(decl) => lower_var_declaration(decl),
        S::FunctionDeclaration(func) => lower_function_declaration(func),
        S::ExpressionStatement(e) => Ok(Stmt::Expr(lower_expression(&e.expression)?)),
        S::BlockStatement(b) => Ok(Stmt::Block(
            b.body.iter().map(lower_statement).collect::<Result<_>>()?,
            span_of(b.span),
        )),
        S::IfStatement(i) => Ok(Stmt::If {
            cond: lower_expression(&i.test)?,
            then_branch: Box::new(lower_statement(&i.consequent)?),
            else_branch: i
                .alternate
                .as_ref()
                .map(|a| lower_statement(a).map(Box::new))
                .transpose()?,
            span: span_of(i.span),
        }),
        S::WhileStatement(w) => Ok(Stmt::While {
            cond: lower_expression(&w.test)?,
            body: Box::new(lower_statement(&w.body)?),
            span: span_of(w.span),
        }),
        S::ForStatement(f) => lower_for_statement(f),
        S::BreakStatement(b) => {
            if b.label.is_some() {
                return Err(unsupported("labelled break", b.span));
            }
            Ok(Stmt::Break(span_of(b.span)))
        }
        S::ContinueStatement(c) => {
            if c.label.is_some() {
                return Err(unsupported("labelled continue", c.span));
            }
            Ok(Stmt::Continue(span_of(c.span)))
        }
        S::ReturnStatement(r) => Ok(Stmt::Return(
            r.argument.as_ref().map(lower_expression).transpose()?,
            span_of(r.span),
        )),
        S::ThrowStatement(t) => Ok(Stmt::Throw(lower_expression(&t.argument)?, span_of(t.span))),
        S::TryStatement(t) => lower_try_statement(t),
        S::EmptyStatement(e) => Ok(Stmt::Block(Vec::new(), span_of(e.span))),
        other => Err(unsupported(statement_kind_name(other), other.span())),
    }
}

fn statement_kind_name(stmt: &oxc::Statement<'_>) -> &'static str {
    use oxc::Statement as S;
    match stmt {
        S::SwitchStatement(_) => "switch statement",
        S::DoWhileStatement(_) => "do-while statement",
        S::ForInStatement(_) => "for-in statement",
        S::ForOfStatement(_) => "for-of statement",
        S::LabeledStatement(_) => "labelled statement",
        S::WithStatement(_) => "with statement",
        S::ClassDeclaration(_) => "class declaration",
        S::ImportDeclaration(_) => "import declaration",
        S::ExportNamedDeclaration(_) => "export declaration",
        S::ExportDefaultDeclaration(_) => "export declaration",
        S::ExportAllDeclaration(_) => "export declaration",
        S::DebuggerStatement(_) => "debugger statement",
        _ => "unsupported statement",
    }
}

fn lower_var_declaration(decl: &oxc::VariableDeclaration<'_>) -> Result<Stmt> {
    use oxc::VariableDeclarationKind as K;
    if !matches!(decl.kind, K::Var) {
        return Err(unsupported("let/const declaration (use var)", decl.span));
    }
    // Multiple declarators (`var a = 1, b = 2;`) lower to a block of
    // single-binding declarations; the compiler never sees comma lists.
    let mut decls = Vec::with_capacity(decl.declarations.len());
    for d in &decl.declarations {
        let name = simple_binding_name(&d.id)?;
        let init = d.init.as_ref().map(lower_expression).transpose()?;
        decls.push(Stmt::VarDecl {
            name,
            init,
            span: span_of(d.span),
        });
    }
    if decls.len() == 1 {
        Ok(decls.pop().unwrap())
    } else {
        Ok(Stmt::Block(decls, span_of(decl.span)))
    }
}

fn lower_function_declaration(func: &oxc::Function<'_>) -> Result<Stmt> {
    let Some(id) = &func.id else {
        return Err(unsupported("anonymous function declaration", func.span));
    };
    Ok(Stmt::FunctionDecl {
        name: id.name.to_string(),
        params: lower_function_params(&func.params)?,
        body: lower_function_body(&func.body, func.span)?,
        span: span_of(func.span),
    })
}

fn lower_for_statement(f: &oxc::ForStatement<'_>) -> Result<Stmt> {
    let init = match &f.init {
        None => None,
        Some(oxc::ForStatementInit::VariableDeclaration(decl)) => {
            Some(Box::new(lower_var_declaration(decl)?))
        }
        Some(other) => Some(Box::new(Stmt::Expr(lower_expression(
            other.to_expression(),
        )?))),
    };
    Ok(Stmt::For {
        init,
        cond: f.test.as_ref().map(lower_expression).transpose()?,
        update: f.update.as_ref().map(lower_expression).transpose()?,
        body: Box::new(lower_statement(&f.body)?),
        span: span_of(f.span),
    })
}

fn lower_try_statement(t: &oxc::TryStatement<'_>) -> Result<Stmt> {
    if t.finalizer.is_some() {
        return Err(unsupported("try/finally (catch only)", t.span));
    }
    let Some(handler) = &t.handler else {
        return Err(unsupported("try without catch", t.span));
    };
    let catch_param = match &handler.param {
        Some(p) => simple_binding_name(&p.pattern)?,
        None => return Err(unsupported("catch without a bound parameter", handler.span)),
    };
    Ok(Stmt::Try {
        block: t.block.body.iter().map(lower_statement).collect::<Result<_>>()?,
        catch_param,
        handler: handler.body.body.iter().map(lower_statement).collect::<Result<_>>()?,
        span: span_of(t.span),
    })
}

fn lower_expression(expr: &oxc::Expression<'_>) -> Result<Expr> {
    use oxc::Expression as E;
    match expr {
        E::NumericLiteral(lit) => Ok(Expr::Number(lit.value, span_of(lit.span))),
        E::StringLiteral(lit) => Ok(Expr::Str(lit.value.to_string(), span_of(lit.span))),
        E::BooleanLiteral(lit) => Ok(Expr::Bool(lit.value, span_of(lit.span))),
        E::NullLiteral(lit) => Ok(Expr::Null(span_of(lit.span))),
        E::Identifier(ident) => {
            if ident.name == "undefined" {
                Ok(Expr::Undefined(span_of(ident.span)))
            } else {
                Ok(Expr::Ident(ident.name.to_string(), span_of(ident.span)))
            }
        }
        E::ThisExpression(t) => Ok(Expr::This(span_of(t.span))),
        E::ParenthesizedExpression(p) => lower_expression(&p.expression),
        E::ObjectExpression(obj) => lower_object_expression(obj),
        E::ArrayExpression(arr) => lower_array_expression(arr),
        E::FunctionExpression(func) => Ok(Expr::Function {
            name: func.id.as_ref().map(|i| i.name.to_string()),
            params: lower_function_params(&func.params)?,
            body: lower_function_body(&func.body, func.span)?,
            span: span_of(func.span),
        }),
        E::StaticMemberExpression(m) => Ok(Expr::Member {
            object: Box::new(lower_expression(&m.object)?),
            property: djs_ast::expr::MemberProp::Static(m.property.name.to_string()),
            span: span_of(m.span),
        }),
        E::ComputedMemberExpression(m) => Ok(Expr::Member {
            object: Box::new(lower_expression(&m.object)?),
            property: djs_ast::expr::MemberProp::Computed(Box::new(lower_expression(&m.expression)?)),
            span: span_of(m.span),
        }),
        E::UnaryExpression(u) => lower_unary_expression(u),
        E::UpdateExpression(u) => lower_update_expression(u),
        E::BinaryExpression(b) => lower_binary_expression(b),
        E::LogicalExpression(l) => Ok(Expr::Logical {
            op: lower_logical_op(l.operator, l.span)?,
            left: Box::new(lower_expression(&l.left)?),
            right: Box::new(lower_expression(&l.right)?),
            span: span_of(l.span),
        }),
        E::AssignmentExpression(a) => lower_assignment_expression(a),
        E::CallExpression(c) => lower_call_expression(c),
        E::NewExpression(n) => lower_new_expression(n),
        other => Err(unsupported(expression_kind_name(other), other.span())),
    }
}

fn expression_kind_name(expr: &oxc::Expression<'_>) -> &'static str {
    use oxc::Expression as E;
    match expr {
        E::TemplateLiteral(_) => "template literal",
        E::TaggedTemplateExpression(_) => "tagged template",
        E::RegExpLiteral(_) => "regular expression literal",
        E::BigIntLiteral(_) => "bigint literal",
        E::ArrowFunctionExpression(_) => "arrow function",
        E::ClassExpression(_) => "class expression",
        E::ConditionalExpression(_) => "ternary conditional",
        E::SequenceExpression(_) => "comma expression",
        E::AwaitExpression(_) => "await expression",
        E::YieldExpression(_) => "yield expression",
        E::Super(_) => "super reference",
        E::SpreadElement(_) => "spread",
        E::ChainExpression(_) => "optional chaining",
        _ => "unsupported expression",
    }
}

fn lower_object_expression(obj: &oxc::ObjectExpression<'_>) -> Result<Expr> {
    let mut fields = Vec::with_capacity(obj.properties.len());
    for prop in &obj.properties {
        match prop {
            oxc::ObjectPropertyKind::ObjectProperty(p) => {
                if p.computed {
                    return Err(unsupported("computed object literal key", p.span));
                }
                if !matches!(p.kind, oxc::PropertyKind::Init) {
                    return Err(unsupported("object literal getter/setter", p.span));
                }
                let key = match &p.key {
                    oxc::PropertyKey::StaticIdentifier(i) => i.name.to_string(),
                    oxc::PropertyKey::StringLiteral(s) => s.value.to_string(),
                    oxc::PropertyKey::NumericLiteral(n) => n.value.to_string(),
                    other => return Err(unsupported("dynamic object literal key", other.span())),
                };
                fields.push(ObjectField {
                    key,
                    value: lower_expression(&p.value)?,
                });
            }
            oxc::ObjectPropertyKind::SpreadProperty(s) => {
                return Err(unsupported("object spread", s.span));
            }
        }
    }
    Ok(Expr::Object(fields, span_of(obj.span)))
}

fn lower_array_expression(arr: &oxc::ArrayExpression<'_>) -> Result<Expr> {
    let mut items = Vec::with_capacity(arr.elements.len());
    for elem in &arr.elements {
        match elem {
            oxc::ArrayExpressionElement::SpreadElement(s) => {
                return Err(unsupported("array spread", s.span));
            }
            oxc::ArrayExpressionElement::Elision(e) => {
                return Err(unsupported("array elision", e.span));
            }
            other => items.push(lower_expression(other.to_expression())?),
        }
    }
    Ok(Expr::Array(items, span_of(arr.span)))
}

fn lower_unary_expression(u: &oxc::UnaryExpression<'_>) -> Result<Expr> {
    use oxc::UnaryOperator as U;
    let op = match u.operator {
        U::UnaryPlus => UnaryOp::Plus,
        U::UnaryNegation => UnaryOp::Minus,
        U::LogicalNot => UnaryOp::Not,
        U::Typeof => UnaryOp::Typeof,
        U::Void => UnaryOp::Void,
        _ => return Err(unsupported("bitwise/delete unary operator", u.span)),
    };
    Ok(Expr::Unary {
        op,
        expr: Box::new(lower_expression(&u.argument)?),
        span: span_of(u.span),
    })
}

fn lower_update_expression(u: &oxc::UpdateExpression<'_>) -> Result<Expr> {
    let op = match u.operator {
        oxc::UpdateOperator::Increment => UpdateOp::Inc,
        oxc::UpdateOperator::Decrement => UpdateOp::Dec,
    };
    let target = lower_simple_assignment_target(&u.argument)?;
    if !target.is_lvalue_shape() {
        return Err(unsupported("non-lvalue update target", u.span));
    }
    Ok(Expr::Update {
        op,
        target: Box::new(target),
        prefix: u.prefix,
        span: span_of(u.span),
    })
}

fn lower_binary_expression(b: &oxc::BinaryExpression<'_>) -> Result<Expr> {
    use oxc::BinaryOperator as B;
    let op = match b.operator {
        B::Addition => BinaryOp::Add,
        B::Subtraction => BinaryOp::Sub,
        B::Multiplication => BinaryOp::Mul,
        B::Division => BinaryOp::Div,
        B::Remainder => BinaryOp::Mod,
        B::StrictEquality => BinaryOp::StrictEq,
        B::StrictInequality => BinaryOp::NotEq,
        B::Equality => BinaryOp::StrictEq,
        B::Inequality => BinaryOp::NotEq,
        B::LessThan => BinaryOp::Lt,
        B::LessEqualThan => BinaryOp::Le,
        B::GreaterThan => BinaryOp::Gt,
        B::GreaterEqualThan => BinaryOp::Ge,
        _ => return Err(unsupported("bitwise/instanceof/in operator", b.span)),
    };
    Ok(Expr::Binary {
        op,
        left: Box::new(lower_expression(&b.left)?),
        right: Box::new(lower_expression(&b.right)?),
        span: span_of(b.span),
    })
}

fn lower_logical_op(op: oxc::LogicalOperator, span: oxc_span::Span) -> Result<LogicalOp> {
    match op {
        oxc::LogicalOperator::And => Ok(LogicalOp::And),
        oxc::LogicalOperator::Or => Ok(LogicalOp::Or),
        oxc::LogicalOperator::Coalesce => Err(unsupported("nullish coalescing", span)),
    }
}

/// An `AssignmentTarget` restricted to the identifier/member shapes this
/// subset treats as lvalues (no destructuring patterns).
fn lower_simple_assignment_target(expr: &oxc::Expression<'_>) -> Result<Expr> {
    lower_expression(expr)
}

fn lower_assignment_target(target: &oxc::AssignmentTarget<'_>) -> Result<Expr> {
    use oxc::AssignmentTarget as T;
    match target {
        T::AssignmentTargetIdentifier(i) => Ok(Expr::Ident(i.name.to_string(), span_of(i.span))),
        T::StaticMemberExpression(m) => Ok(Expr::Member {
            object: Box::new(lower_expression(&m.object)?),
            property: djs_ast::expr::MemberProp::Static(m.property.name.to_string()),
            span: span_of(m.span),
        }),
        T::ComputedMemberExpression(m) => Ok(Expr::Member {
            object: Box::new(lower_expression(&m.object)?),
            property: djs_ast::expr::MemberProp::Computed(Box::new(lower_expression(&m.expression)?)),
            span: span_of(m.span),
        }),
        other => Err(unsupported("destructuring assignment target", other.span())),
    }
}

fn lower_assignment_expression(a: &oxc::AssignmentExpression<'_>) -> Result<Expr> {
    let target = lower_assignment_target(&a.left)?;
    use oxc::AssignmentOperator as A;
    let value = lower_expression(&a.right)?;
    let span = span_of(a.span);
    let value = match a.operator {
        A::Assign => value,
        A::Addition => binary_compound(BinaryOp::Add, &target, value, span),
        A::Subtraction => binary_compound(BinaryOp::Sub, &target, value, span),
        A::Multiplication => binary_compound(BinaryOp::Mul, &target, value, span),
        A::Division => binary_compound(BinaryOp::Div, &target, value, span),
        A::Remainder => binary_compound(BinaryOp::Mod, &target, value, span),
        _ => return Err(unsupported("bitwise/logical compound assignment", a.span)),
    };
    Ok(Expr::Assign {
        target: Box::new(target),
        value: Box::new(value),
        span,
    })
}

fn binary_compound(op: BinaryOp, target: &Expr, rhs: Expr, span: Span) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(target.clone()),
        right: Box::new(rhs),
        span,
    }
}

fn lower_call_expression(c: &oxc::CallExpression<'_>) -> Result<Expr> {
    if c.optional {
        return Err(unsupported("optional call", c.span));
    }
    let mut args = Vec::with_capacity(c.arguments.len());
    for arg in &c.arguments {
        match arg {
            oxc::Argument::SpreadElement(s) => return Err(unsupported("call spread", s.span)),
            other => args.push(lower_expression(other.to_expression())?),
        }
    }
    Ok(Expr::Call {
        callee: Box::new(lower_expression(&c.callee)?),
        args,
        span: span_of(c.span),
    })
}

fn lower_new_expression(n: &oxc::NewExpression<'_>) -> Result<Expr> {
    let mut args = Vec::with_capacity(n.arguments.len());
    for arg in &n.arguments {
        match arg {
            oxc::Argument::SpreadElement(s) => return Err(unsupported("new spread", s.span)),
            other => args.push(lower_expression(other.to_expression())?),
        }
    }
    Ok(Expr::New {
        callee: Box::new(lower_expression(&n.callee)?),
        args,
        span: span_of(n.span),
    })
}
