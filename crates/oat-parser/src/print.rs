//! Source printer
//!
//! `Display` for the AST writes valid Oat that parses back to the same
//! tree. Binary expressions are fully parenthesized and unary operands
//! always are, so no precedence knowledge is needed to read the output.

use crate::ast::*;
use std::fmt::{self, Display, Formatter, Write};

const INDENT: &str = "  ";

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_indent(f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

// =========================================
// Types
// =========================================

/// A type in a position where a function type must be parenthesized
struct Wrapped<'a>(&'a Type);

impl Display for Wrapped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Type::Function(..) => write!(f, "({})", self.0),
            ty => write!(f, "{ty}"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
            Type::Str => f.write_str("string"),
            Type::Struct(name) => f.write_str(name),
            Type::Array(elem) => write!(f, "{}[]", Wrapped(elem)),
            Type::Nullable(inner) => write!(f, "{}?", Wrapped(inner)),
            Type::Function(params, ret) => {
                f.write_char('(')?;
                write_list(f, params, ", ")?;
                write!(f, ") -> {ret}")
            }
        }
    }
}

impl Display for RetTy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RetTy::Void => f.write_str("void"),
            RetTy::Value(ty) => write!(f, "{ty}"),
        }
    }
}

// =========================================
// Expressions
// =========================================

impl Display for BinOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for UnOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base of a call, index or field access
struct Postfix<'a>(&'a Expr);

impl Display for Postfix<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            ExprKind::Id(_)
            | ExprKind::Call { .. }
            | ExprKind::Index { .. }
            | ExprKind::Field { .. }
            | ExprKind::Length(_)
            | ExprKind::Binary { .. } => write!(f, "{}", self.0),
            _ => write!(f, "({})", self.0),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Id(name) => f.write_str(name),
            ExprKind::Int(value) => write!(f, "{value}"),
            ExprKind::Str(raw) => write!(f, "\"{raw}\""),
            ExprKind::Bool(value) => write!(f, "{value}"),
            ExprKind::Null(ty) => write!(f, "{ty} null"),
            ExprKind::ArrayLit { ty, elems } => {
                write!(f, "new {}[]{{", Wrapped(ty))?;
                write_list(f, elems, ", ")?;
                f.write_char('}')
            }
            ExprKind::ArrayNew { ty, size } => write!(f, "new {}[{size}]", Wrapped(ty)),
            ExprKind::ArrayGen { ty, size, var, init } => {
                write!(f, "new {}[{size}]{{{var} -> {init}}}", Wrapped(ty))
            }
            ExprKind::StructLit { name, fields } => {
                write!(f, "new {name}{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} = {}", field.name, field.value)?;
                }
                f.write_char('}')
            }
            ExprKind::Length(inner) => write!(f, "length({inner})"),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            ExprKind::Unary { op, operand } => write!(f, "{op}({operand})"),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", Postfix(callee))?;
                write_list(f, args, ", ")?;
                f.write_char(')')
            }
            ExprKind::Index { base, index } => write!(f, "{}[{index}]", Postfix(base)),
            ExprKind::Field { base, name } => write!(f, "{}.{name}", Postfix(base)),
        }
    }
}

// =========================================
// Statements
// =========================================

impl Display for VarDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "var {} = {}", self.name, self.init)
    }
}

fn write_block(f: &mut Formatter<'_>, block: &Block, depth: usize) -> fmt::Result {
    if block.stmts.is_empty() {
        return f.write_str("{ }");
    }
    f.write_str("{\n")?;
    for stmt in &block.stmts {
        write_indent(f, depth + 1)?;
        write_stmt(f, stmt, depth + 1)?;
        f.write_char('\n')?;
    }
    write_indent(f, depth)?;
    f.write_char('}')
}

fn write_else(f: &mut Formatter<'_>, otherwise: &Option<Else>, depth: usize) -> fmt::Result {
    match otherwise {
        None => Ok(()),
        Some(Else::Block(block)) => {
            f.write_str(" else ")?;
            write_block(f, block, depth)
        }
        Some(Else::If(stmt)) => {
            f.write_str(" else ")?;
            write_stmt(f, stmt, depth)
        }
    }
}

/// Writes `stmt` assuming the cursor is already indented to `depth`
fn write_stmt(f: &mut Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match &stmt.kind {
        StmtKind::Assign { lhs, rhs } => write!(f, "{lhs} = {rhs};"),
        StmtKind::Decl(decl) => write!(f, "{decl};"),
        StmtKind::Return(None) => f.write_str("return;"),
        StmtKind::Return(Some(value)) => write!(f, "return {value};"),
        StmtKind::Call(call) => write!(f, "{call};"),
        StmtKind::If {
            cond,
            then,
            otherwise,
        } => {
            write!(f, "if ({cond}) ")?;
            write_block(f, then, depth)?;
            write_else(f, otherwise, depth)
        }
        StmtKind::IfCast {
            ty,
            name,
            scrutinee,
            then,
            otherwise,
        } => {
            write!(f, "if? ({ty} {name} = {scrutinee}) ")?;
            write_block(f, then, depth)?;
            write_else(f, otherwise, depth)
        }
        StmtKind::For {
            inits,
            cond,
            step,
            body,
        } => {
            f.write_str("for (")?;
            write_list(f, inits, ", ")?;
            f.write_str(";")?;
            if let Some(cond) = cond {
                write!(f, " {cond}")?;
            }
            f.write_str(";")?;
            if let Some(step) = step {
                f.write_char(' ')?;
                write_stmt(f, step, depth)?;
            }
            f.write_str(") ")?;
            write_block(f, body, depth)
        }
        StmtKind::While { cond, body } => {
            write!(f, "while ({cond}) ")?;
            write_block(f, body, depth)
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_block(f, self, 0)
    }
}

// =========================================
// Declarations
// =========================================

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

impl Display for Decl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Global(global) => write!(f, "global {} = {};", global.name, global.init),
            Decl::Function(func) => {
                write!(f, "{} {}(", func.ret, func.name)?;
                write_list(f, &func.params, ", ")?;
                f.write_str(") ")?;
                write_block(f, &func.body, 0)
            }
            Decl::Struct(s) => {
                writeln!(f, "struct {} {{", s.name)?;
                for (i, field) in s.fields.iter().enumerate() {
                    write!(f, "{INDENT}{} {}", field.ty, field.name)?;
                    if i + 1 < s.fields.len() {
                        f.write_char(';')?;
                    }
                    f.write_char('\n')?;
                }
                f.write_char('}')
            }
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, decl) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{decl}")?;
        }
        if !self.decls.is_empty() {
            f.write_char('\n')?;
        }
        Ok(())
    }
}
