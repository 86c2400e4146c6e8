use crate::literal::Literal;
use crate::token::Token;

/// Identity key for an expression node, distinct from structural equality.
///
/// Two occurrences of the same variable name at different source positions
/// are different `Expr`s even though they'd compare equal structurally; the
/// resolver's side table is keyed on this id rather than on the node's shape.
pub type ExprId = u32;

/// An expression node: a stable identity plus the variant-specific data.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Grouping(Box<Expr>),
    Unary(UnaryData),
    Binary(BinaryData),
    Logical(LogicalData),
    Variable(VariableData),
    Assign(AssignData),
    Call(CallData),
    Get(GetData),
    Set(SetData),
    This(ThisData),
    Super(SuperData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryData {
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableData {
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignData {
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallData {
    pub callee: Box<Expr>,
    pub paren: Token,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetData {
    pub object: Box<Expr>,
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetData {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisData {
    pub keyword: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperData {
    pub keyword: Token,
    pub method: Token,
}
