//! AST - Abstract Syntax Tree for Oat programs
//!
//! Nodes are built once by the parser and never mutated afterwards; every
//! node owns its children. Types carry no spans so they compare by shape.

use oat_error::{Span, Spanned};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete program: declarations in source order
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    pub decls: Vec<Decl>,
}

// =========================================
// Declarations
// =========================================

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Decl {
    /// `global name = gexp;`
    Global(GlobalDecl),
    /// `retty name(params) { ... }`
    Function(FnDecl),
    /// `struct Name { T a; T b }` (v2)
    Struct(StructDecl),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalDecl {
    pub name: String,
    /// Always one of the global-expression forms
    pub init: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FnDecl {
    pub ret: RetTy,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// Function parameter `T name`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Param {
    pub ty: Type,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// Struct field `T name`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDecl {
    pub ty: Type,
    pub name: String,
    pub span: Span,
}

// =========================================
// Types
// =========================================

/// Oat types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    Int,
    Bool,
    /// `string`
    Str,
    /// A struct name: `Point`
    Struct(String),
    /// `T[]`
    Array(Box<Type>),
    /// `(T1, T2) -> R`
    Function(Vec<Type>, Box<RetTy>),
    /// `R?` where `R` is a reference type
    Nullable(Box<Type>),
}

impl Type {
    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn nullable(inner: Type) -> Type {
        Type::Nullable(Box::new(inner))
    }

    pub fn function(params: Vec<Type>, ret: RetTy) -> Type {
        Type::Function(params, Box::new(ret))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Int | Type::Bool)
    }

    /// Reference-category types are the ones that may take a `?` suffix
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Str | Type::Struct(_) | Type::Array(_) | Type::Function(..)
        )
    }
}

/// Function return type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RetTy {
    Void,
    Value(Type),
}

// =========================================
// Expressions
// =========================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExprKind::Call { .. })
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExprKind {
    Id(String),
    Int(i64),
    /// Raw literal contents between the quotes, escapes not yet decoded
    Str(String),
    Bool(bool),
    /// `T null`
    Null(Type),
    /// `[new] T[]{e1, e2}`; `ty` is the element type
    ArrayLit { ty: Type, elems: Vec<Expr> },
    /// `new T[size]`
    ArrayNew { ty: Type, size: Box<Expr> },
    /// `new T[size]{var -> init}` (v2)
    ArrayGen {
        ty: Type,
        size: Box<Expr>,
        var: String,
        init: Box<Expr>,
    },
    /// `[new] Name{f = e; g = e}` (v2)
    StructLit { name: String, fields: Vec<FieldInit> },
    /// `length(e)` (v2)
    Length(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary { op: UnOp, operand: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Index { base: Box<Expr>, index: Box<Expr> },
    Field { base: Box<Expr>, name: String },
}

/// `name = value` inside a struct literal
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinOp {
    Mul,
    Add,
    Sub,
    Shl,
    Shr,
    Sar,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Neq,
    /// `&`
    And,
    /// `|`
    Or,
    /// `[&]`
    IAnd,
    /// `[|]`
    IOr,
}

impl BinOp {
    /// Binding power; higher binds tighter. All levels are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Mul => 100,
            BinOp::Add | BinOp::Sub => 90,
            BinOp::Shl | BinOp::Shr | BinOp::Sar => 80,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 70,
            BinOp::Eq | BinOp::Neq => 60,
            BinOp::And => 50,
            BinOp::Or => 40,
            BinOp::IAnd => 30,
            BinOp::IOr => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Sar => ">>>",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::IAnd => "[&]",
            BinOp::IOr => "[|]",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnOp {
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `~`
    BitNot,
}

impl UnOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
        }
    }
}

// =========================================
// Statements
// =========================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StmtKind {
    /// `lhs = rhs;`
    Assign { lhs: Expr, rhs: Expr },
    /// `var name = init;`
    Decl(VarDecl),
    /// `return [e];`
    Return(Option<Expr>),
    /// `f(args);`
    Call(Expr),
    /// `if (cond) { ... } [else ...]`
    If {
        cond: Expr,
        then: Block,
        otherwise: Option<Else>,
    },
    /// `if? (R name = scrutinee) { ... } [else ...]` (v2)
    IfCast {
        ty: Type,
        name: String,
        scrutinee: Expr,
        then: Block,
        otherwise: Option<Else>,
    },
    /// `for (inits; cond; step) { ... }`
    For {
        inits: Vec<VarDecl>,
        cond: Option<Expr>,
        step: Option<Box<Stmt>>,
        body: Block,
    },
    /// `while (cond) { ... }`
    While { cond: Expr, body: Block },
}

/// `var name = init` (without the `;`)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarDecl {
    pub name: String,
    pub init: Expr,
    pub span: Span,
}

/// Else branch: a block or a chained `if`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Else {
    Block(Block),
    If(Box<Stmt>),
}

/// `{ stmt* }`
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Global(g) => &g.name,
            Decl::Function(f) => &f.name,
            Decl::Struct(s) => &s.name,
        }
    }
}

impl Spanned for Decl {
    fn span(&self) -> Span {
        match self {
            Decl::Global(g) => g.span,
            Decl::Function(f) => f.span,
            Decl::Struct(s) => s.span,
        }
    }
}

// =========================================
// Span erasure (structural comparison)
// =========================================

/// Resets every span in a tree, so two parses of differently laid out
/// sources can be compared by shape.
pub trait ClearSpans {
    fn clear_spans(&mut self);
}

impl Program {
    /// Copy of this program with every span reset
    pub fn without_spans(&self) -> Program {
        let mut program = self.clone();
        program.clear_spans();
        program
    }

    /// Structural equality, ignoring source positions
    pub fn same_shape(&self, other: &Program) -> bool {
        self.without_spans() == other.without_spans()
    }
}

impl ClearSpans for Program {
    fn clear_spans(&mut self) {
        self.decls.iter_mut().for_each(ClearSpans::clear_spans);
    }
}

impl ClearSpans for Decl {
    fn clear_spans(&mut self) {
        match self {
            Decl::Global(g) => {
                g.span = Span::default();
                g.init.clear_spans();
            }
            Decl::Function(f) => {
                f.span = Span::default();
                f.params.iter_mut().for_each(|p| p.span = Span::default());
                f.body.clear_spans();
            }
            Decl::Struct(s) => {
                s.span = Span::default();
                s.fields.iter_mut().for_each(|f| f.span = Span::default());
            }
        }
    }
}

impl ClearSpans for Block {
    fn clear_spans(&mut self) {
        self.span = Span::default();
        self.stmts.iter_mut().for_each(ClearSpans::clear_spans);
    }
}

impl ClearSpans for VarDecl {
    fn clear_spans(&mut self) {
        self.span = Span::default();
        self.init.clear_spans();
    }
}

impl ClearSpans for Else {
    fn clear_spans(&mut self) {
        match self {
            Else::Block(block) => block.clear_spans(),
            Else::If(stmt) => stmt.clear_spans(),
        }
    }
}

impl ClearSpans for Stmt {
    fn clear_spans(&mut self) {
        self.span = Span::default();
        match &mut self.kind {
            StmtKind::Assign { lhs, rhs } => {
                lhs.clear_spans();
                rhs.clear_spans();
            }
            StmtKind::Decl(decl) => decl.clear_spans(),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    value.clear_spans();
                }
            }
            StmtKind::Call(call) => call.clear_spans(),
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                cond.clear_spans();
                then.clear_spans();
                if let Some(otherwise) = otherwise {
                    otherwise.clear_spans();
                }
            }
            StmtKind::IfCast {
                scrutinee,
                then,
                otherwise,
                ..
            } => {
                scrutinee.clear_spans();
                then.clear_spans();
                if let Some(otherwise) = otherwise {
                    otherwise.clear_spans();
                }
            }
            StmtKind::For {
                inits,
                cond,
                step,
                body,
            } => {
                inits.iter_mut().for_each(ClearSpans::clear_spans);
                if let Some(cond) = cond {
                    cond.clear_spans();
                }
                if let Some(step) = step {
                    step.clear_spans();
                }
                body.clear_spans();
            }
            StmtKind::While { cond, body } => {
                cond.clear_spans();
                body.clear_spans();
            }
        }
    }
}

impl ClearSpans for Expr {
    fn clear_spans(&mut self) {
        self.span = Span::default();
        match &mut self.kind {
            ExprKind::Id(_)
            | ExprKind::Int(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)
            | ExprKind::Null(_) => {}
            ExprKind::ArrayLit { elems, .. } => elems.iter_mut().for_each(ClearSpans::clear_spans),
            ExprKind::ArrayNew { size, .. } => size.clear_spans(),
            ExprKind::ArrayGen { size, init, .. } => {
                size.clear_spans();
                init.clear_spans();
            }
            ExprKind::StructLit { fields, .. } => {
                for field in fields {
                    field.span = Span::default();
                    field.value.clear_spans();
                }
            }
            ExprKind::Length(inner) => inner.clear_spans(),
            ExprKind::Binary { lhs, rhs, .. } => {
                lhs.clear_spans();
                rhs.clear_spans();
            }
            ExprKind::Unary { operand, .. } => operand.clear_spans(),
            ExprKind::Call { callee, args } => {
                callee.clear_spans();
                args.iter_mut().for_each(ClearSpans::clear_spans);
            }
            ExprKind::Index { base, index } => {
                base.clear_spans();
                index.clear_spans();
            }
            ExprKind::Field { base, .. } => base.clear_spans(),
        }
    }
}
