//! Abstract Syntax Tree (AST) definitions
//!
//! Expressions and statements are closed sum types; the parser, resolver,
//! printer and interpreter all match on them exhaustively.

use crate::span::Span;
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;
use serde::{Deserialize, Serialize, Serializer};
use std::rc::Rc;

pub use crate::token::Literal;

/// AST schema version
///
/// Included in JSON dumps. Increment when making breaking changes to the
/// AST structure.
pub const AST_VERSION: u32 = 1;

/// Top-level program: the ordered list of declarations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Versioned AST wrapper for JSON serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedProgram {
    /// AST schema version
    pub ast_version: u32,
    /// The actual program AST
    #[serde(flatten)]
    pub program: Program,
}

impl VersionedProgram {
    /// Create a new versioned program wrapper
    pub fn new(program: Program) -> Self {
        Self {
            ast_version: AST_VERSION,
            program,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Program> for VersionedProgram {
    fn from(program: Program) -> Self {
        Self::new(program)
    }
}

/// Identity of a variable-reference or assignment node
///
/// Allocated by the parser, unique within one parser's output. The
/// resolver's side table is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal, Span),
    Grouping(#[serde(serialize_with = "serialize_nested")] Box<Expr>),
    Unary(UnaryExpr),
    /// Arithmetic, comparison, equality and the `,` sequence operator
    Binary(BinaryExpr),
    /// Short-circuiting `and` / `or`
    Logical(BinaryExpr),
    Variable(VariableExpr),
    Assign(AssignExpr),
    Call(CallExpr),
    Function(Rc<FunctionExpr>),
    /// Prefix conditional `ifx cond then else`
    IfExpr(IfExpr),
}

/// Unary expression (`-x`, `!x`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub operator: Token,
    #[serde(serialize_with = "serialize_nested")]
    pub operand: Box<Expr>,
}

/// Binary or logical expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    #[serde(serialize_with = "serialize_nested")]
    pub left: Box<Expr>,
    pub operator: Token,
    #[serde(serialize_with = "serialize_nested")]
    pub right: Box<Expr>,
}

/// Variable reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableExpr {
    pub id: NodeId,
    pub name: Token,
}

/// Assignment to a plain variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignExpr {
    pub id: NodeId,
    pub name: Token,
    #[serde(serialize_with = "serialize_nested")]
    pub value: Box<Expr>,
}

/// Function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    #[serde(serialize_with = "serialize_nested")]
    pub callee: Box<Expr>,
    /// Closing parenthesis, used to locate runtime errors
    pub paren: Token,
    #[serde(serialize_with = "serialize_nested")]
    pub args: Vec<Expr>,
}

/// Function value: parameters plus body
///
/// Named declarations bind one of these to a name; anonymous `fun`
/// literals evaluate straight to a closure over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionExpr {
    /// The `fun` keyword
    pub keyword: Token,
    pub params: Vec<Token>,
    #[serde(serialize_with = "serialize_nested")]
    pub body: Vec<Stmt>,
}

/// `ifx` conditional expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfExpr {
    pub keyword: Token,
    #[serde(serialize_with = "serialize_nested")]
    pub condition: Box<Expr>,
    #[serde(serialize_with = "serialize_nested")]
    pub then_branch: Box<Expr>,
    #[serde(serialize_with = "serialize_nested")]
    pub else_branch: Box<Expr>,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Var(VarDecl),
    Block(Block),
    If(IfStmt),
    While(WhileStmt),
    Function(FunctionDecl),
    Return(ReturnStmt),
    Break(Token),
    Continue(Token),
}

/// Variable declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: Token,
    pub initializer: Option<Expr>,
}

/// Brace-delimited statement list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(serialize_with = "serialize_nested")]
    pub statements: Vec<Stmt>,
    /// Lexically inside a loop body, so `break` is legal here
    pub in_loop: bool,
}

/// `if` statement; both branches are blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Block,
    pub else_branch: Option<Block>,
}

/// `while` loop; `for` loops are desugared into these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
}

/// Named function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: Token,
    pub function: Rc<FunctionExpr>,
}

/// `return` with optional value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub keyword: Token,
    pub value: Option<Expr>,
}

impl Stmt {
    /// Placeholder left where a declaration failed to parse
    pub fn error_sentinel(message: impl Into<String>, span: Span) -> Self {
        Stmt::Expression(Expr::Literal(Literal::Error(message.into()), span))
    }

    /// Whether this is the parse-failure placeholder
    pub fn is_error_sentinel(&self) -> bool {
        matches!(self, Stmt::Expression(Expr::Literal(Literal::Error(_), _)))
    }
}

/// Serialize a child on a stack with room for it
fn serialize_nested<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    ensure_sufficient_stack(|| value.serialize(serializer))
}

/// Move a boxed child out, leaving a leaf behind
fn take_child(slot: &mut Expr) -> Expr {
    std::mem::replace(slot, Expr::Literal(Literal::Nil, Span::dummy()))
}

// Nesting is bounded only by the source, so children are detached and
// released one level at a time instead of through the derived drop glue.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut children = Vec::new();
        match self {
            Expr::Literal(..) | Expr::Variable(_) | Expr::Function(_) => return,
            Expr::Grouping(inner) => children.push(take_child(inner)),
            Expr::Unary(unary) => children.push(take_child(&mut unary.operand)),
            Expr::Binary(binary) | Expr::Logical(binary) => {
                children.push(take_child(&mut binary.left));
                children.push(take_child(&mut binary.right));
            }
            Expr::Assign(assign) => children.push(take_child(&mut assign.value)),
            Expr::Call(call) => {
                children.push(take_child(&mut call.callee));
                children.append(&mut call.args);
            }
            Expr::IfExpr(ifx) => {
                children.push(take_child(&mut ifx.condition));
                children.push(take_child(&mut ifx.then_branch));
                children.push(take_child(&mut ifx.else_branch));
            }
        }
        ensure_sufficient_stack(move || drop(children));
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        let statements = std::mem::take(&mut self.statements);
        ensure_sufficient_stack(move || drop(statements));
    }
}

impl Drop for FunctionExpr {
    fn drop(&mut self) {
        let body = std::mem::take(&mut self.body);
        ensure_sufficient_stack(move || drop(body));
    }
}
