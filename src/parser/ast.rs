use std::fmt;

use crate::span::{Span, Spanned};

pub type Ident = Spanned<String>;

/// One syntax node. Spans are relative to the start of the statement the node
/// was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn boxed(kind: NodeKind, span: Span) -> Box<Self> {
        Box::new(Self::new(kind, span))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Neq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    /// Name of the operator overload method an object type would declare.
    pub fn method_name(&self) -> Option<&'static str> {
        Some(match self {
            BinOp::Add => "opAdd",
            BinOp::Sub => "opSub",
            BinOp::Mul => "opMul",
            BinOp::Div => "opDiv",
            BinOp::Mod => "opMod",
            BinOp::Pow => "opPow",
            BinOp::BitAnd => "opAnd",
            BinOp::BitOr => "opOr",
            BinOp::BitXor => "opXor",
            BinOp::Shl => "opShl",
            BinOp::Shr => "opShr",
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq
            | BinOp::And | BinOp::Or => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    Handle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Plain,
    In,
    Out,
    InOut,
}

/// A written type: `const TArray<AActor>&in`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    /// Base name, namespace-qualified with `::` when written that way.
    pub name: String,
    pub subtypes: Vec<Node>,
    pub is_const: bool,
    pub is_handle: bool,
    pub reference: Option<RefKind>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), subtypes: Vec::new(), is_const: false, is_handle: false, reference: None }
    }

    pub fn is_auto(&self) -> bool {
        self.name == "auto"
    }

    /// Name without `const`, references or handle markers: `TArray<AActor>`.
    pub fn display_name(&self) -> String {
        let mut out = self.name.clone();
        if !self.subtypes.is_empty() {
            out.push('<');
            for (i, sub) in self.subtypes.iter().enumerate() {
                if i != 0 {
                    out.push_str(", ");
                }
                match &sub.kind {
                    NodeKind::Typename(ty) => out.push_str(&ty.display_name()),
                    _ => out.push('?'),
                }
            }
            out.push('>');
        }
        out
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}", self.display_name())?;
        if self.is_handle {
            write!(f, "@")?;
        }
        match self.reference {
            Some(RefKind::Plain) => write!(f, "&"),
            Some(RefKind::In) => write!(f, "&in"),
            Some(RefKind::Out) => write!(f, "&out"),
            Some(RefKind::InOut) => write!(f, "&inout"),
            None => Ok(()),
        }
    }
}

/// Modifiers that may prefix a member or global declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclPrefix {
    pub macro_: Option<Box<Node>>,
    pub access: Option<Ident>,
    pub is_private: bool,
    pub is_protected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub prefix: DeclPrefix,
    pub typename: Box<Node>,
    pub name: Ident,
    pub init: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub prefix: DeclPrefix,
    pub is_mixin: bool,
    pub return_type: Box<Node>,
    pub name: Ident,
    pub params: Vec<Node>,
    pub is_const: bool,
    pub is_final: bool,
    pub is_override: bool,
    pub is_property: bool,
    /// Ended with `;` rather than being followed by a body.
    pub is_declaration_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub return_type: Box<Node>,
    pub name: Ident,
    pub params: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub typename: Box<Node>,
    pub name: Option<Ident>,
    pub default: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: Ident,
    pub value: Option<Box<Node>>,
    pub macro_: Option<Box<Node>>,
}

/// The closed set of syntax node kinds. The parser is the only producer.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Expressions
    Identifier(String),
    BinaryOperation { op: BinOp, lhs: Box<Node>, rhs: Box<Node> },
    UnaryOperation { op: UnaryOp, operand: Box<Node> },
    PostfixOperation { op: PostfixOp, operand: Box<Node> },
    TernaryOperation { condition: Box<Node>, then_expr: Box<Node>, else_expr: Box<Node> },
    CastOperation { typename: Box<Node>, expr: Option<Box<Node>> },
    Assignment { lhs: Box<Node>, rhs: Box<Node> },
    CompoundAssignment { op: BinOp, lhs: Box<Node>, rhs: Box<Node> },
    MemberAccess { object: Box<Node>, member: Option<Ident> },
    /// `Ns::Member`; `namespace` is `None` for a leading `::`.
    NamespaceAccess { namespace: Option<Box<Node>>, member: Option<Ident> },
    FunctionCall { callee: Box<Node>, args: Box<Node> },
    ConstructorCall { typename: Box<Node>, args: Box<Node> },
    NamedArgument { name: Ident, value: Box<Node> },
    IndexOperator { object: Box<Node>, index: Option<Box<Node>> },
    CommaExpression(Vec<Node>),
    This,

    // Literals, raw source text kept as the value
    ConstInteger(String),
    ConstHexInteger(String),
    ConstFloat(String),
    ConstDouble(String),
    ConstString(String),
    ConstName(String),
    ConstFormatString(String),
    ConstBool(bool),
    ConstNullptr,

    // Statements
    IfStatement { condition: Box<Node>, body: Option<Box<Node>> },
    ElseStatement { body: Option<Box<Node>> },
    ReturnStatement(Option<Box<Node>>),
    /// `import Some.Module;`
    ImportStatement(Ident),
    /// `import void Func() from "Some.Module";`
    ImportFunctionStatement { function: Box<Node>, module: String },
    /// `default Component.Value = 1;` inside a class body.
    DefaultStatement(Box<Node>),
    SwitchStatement(Box<Node>),
    CaseStatement(Box<Node>),
    DefaultCaseStatement,
    ContinueStatement,
    BreakStatement,

    // Type definitions (headers of scopes)
    StructDefinition { macro_: Option<Box<Node>>, name: Ident },
    ClassDefinition { macro_: Option<Box<Node>>, name: Ident, superclass: Option<Ident> },
    EnumDefinition { macro_: Option<Box<Node>>, name: Ident },
    AssetDefinition { name: Ident, typename: Ident },
    NamespaceDefinition { name: Ident },

    // Declarations
    VariableDecl(VariableDecl),
    VariableDeclMulti(Vec<Node>),
    FunctionDecl(FunctionDecl),
    DelegateDecl(FunctionSignature),
    EventDecl(FunctionSignature),
    ConstructorDecl { macro_: Option<Box<Node>>, name: Ident, params: Vec<Node> },
    DestructorDecl { name: Ident },

    // Loops
    ForLoop {
        init: Option<Box<Node>>,
        condition: Option<Box<Node>>,
        step: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    ForEachLoop { typename: Box<Node>, name: Ident, iterable: Box<Node>, body: Option<Box<Node>> },
    WhileLoop { condition: Box<Node>, body: Option<Box<Node>> },

    // Building blocks
    Typename(TypeRef),
    Parameter(Parameter),
    ArgumentList(Vec<Node>),
    Macro { name: Ident, args: Vec<Node> },
    MacroArgument { name: Ident, value: Option<String> },
    EnumValueList(Vec<Node>),
    EnumValue(EnumValue),
    AccessDeclaration { name: Ident, classes: Vec<Node> },
    AccessClass { name: Ident, modifiers: Vec<Ident> },
    IncompleteAccessSpecifier { name: Option<Ident> },
}

/// Fieldless mirror of [`NodeKind`], for cheap comparisons and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeTag {
    Identifier,
    BinaryOperation,
    UnaryOperation,
    PostfixOperation,
    TernaryOperation,
    CastOperation,
    Assignment,
    CompoundAssignment,
    MemberAccess,
    NamespaceAccess,
    FunctionCall,
    ConstructorCall,
    NamedArgument,
    IndexOperator,
    CommaExpression,
    This,
    ConstInteger,
    ConstHexInteger,
    ConstFloat,
    ConstDouble,
    ConstString,
    ConstName,
    ConstFormatString,
    ConstBool,
    ConstNullptr,
    IfStatement,
    ElseStatement,
    ReturnStatement,
    ImportStatement,
    ImportFunctionStatement,
    DefaultStatement,
    SwitchStatement,
    CaseStatement,
    DefaultCaseStatement,
    ContinueStatement,
    BreakStatement,
    StructDefinition,
    ClassDefinition,
    EnumDefinition,
    AssetDefinition,
    NamespaceDefinition,
    VariableDecl,
    VariableDeclMulti,
    FunctionDecl,
    DelegateDecl,
    EventDecl,
    ConstructorDecl,
    DestructorDecl,
    ForLoop,
    ForEachLoop,
    WhileLoop,
    Typename,
    Parameter,
    ArgumentList,
    Macro,
    MacroArgument,
    EnumValueList,
    EnumValue,
    AccessDeclaration,
    AccessClass,
    IncompleteAccessSpecifier,
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Identifier(_) => NodeTag::Identifier,
            NodeKind::BinaryOperation { .. } => NodeTag::BinaryOperation,
            NodeKind::UnaryOperation { .. } => NodeTag::UnaryOperation,
            NodeKind::PostfixOperation { .. } => NodeTag::PostfixOperation,
            NodeKind::TernaryOperation { .. } => NodeTag::TernaryOperation,
            NodeKind::CastOperation { .. } => NodeTag::CastOperation,
            NodeKind::Assignment { .. } => NodeTag::Assignment,
            NodeKind::CompoundAssignment { .. } => NodeTag::CompoundAssignment,
            NodeKind::MemberAccess { .. } => NodeTag::MemberAccess,
            NodeKind::NamespaceAccess { .. } => NodeTag::NamespaceAccess,
            NodeKind::FunctionCall { .. } => NodeTag::FunctionCall,
            NodeKind::ConstructorCall { .. } => NodeTag::ConstructorCall,
            NodeKind::NamedArgument { .. } => NodeTag::NamedArgument,
            NodeKind::IndexOperator { .. } => NodeTag::IndexOperator,
            NodeKind::CommaExpression(_) => NodeTag::CommaExpression,
            NodeKind::This => NodeTag::This,
            NodeKind::ConstInteger(_) => NodeTag::ConstInteger,
            NodeKind::ConstHexInteger(_) => NodeTag::ConstHexInteger,
            NodeKind::ConstFloat(_) => NodeTag::ConstFloat,
            NodeKind::ConstDouble(_) => NodeTag::ConstDouble,
            NodeKind::ConstString(_) => NodeTag::ConstString,
            NodeKind::ConstName(_) => NodeTag::ConstName,
            NodeKind::ConstFormatString(_) => NodeTag::ConstFormatString,
            NodeKind::ConstBool(_) => NodeTag::ConstBool,
            NodeKind::ConstNullptr => NodeTag::ConstNullptr,
            NodeKind::IfStatement { .. } => NodeTag::IfStatement,
            NodeKind::ElseStatement { .. } => NodeTag::ElseStatement,
            NodeKind::ReturnStatement(_) => NodeTag::ReturnStatement,
            NodeKind::ImportStatement(_) => NodeTag::ImportStatement,
            NodeKind::ImportFunctionStatement { .. } => NodeTag::ImportFunctionStatement,
            NodeKind::DefaultStatement(_) => NodeTag::DefaultStatement,
            NodeKind::SwitchStatement(_) => NodeTag::SwitchStatement,
            NodeKind::CaseStatement(_) => NodeTag::CaseStatement,
            NodeKind::DefaultCaseStatement => NodeTag::DefaultCaseStatement,
            NodeKind::ContinueStatement => NodeTag::ContinueStatement,
            NodeKind::BreakStatement => NodeTag::BreakStatement,
            NodeKind::StructDefinition { .. } => NodeTag::StructDefinition,
            NodeKind::ClassDefinition { .. } => NodeTag::ClassDefinition,
            NodeKind::EnumDefinition { .. } => NodeTag::EnumDefinition,
            NodeKind::AssetDefinition { .. } => NodeTag::AssetDefinition,
            NodeKind::NamespaceDefinition { .. } => NodeTag::NamespaceDefinition,
            NodeKind::VariableDecl(_) => NodeTag::VariableDecl,
            NodeKind::VariableDeclMulti(_) => NodeTag::VariableDeclMulti,
            NodeKind::FunctionDecl(_) => NodeTag::FunctionDecl,
            NodeKind::DelegateDecl(_) => NodeTag::DelegateDecl,
            NodeKind::EventDecl(_) => NodeTag::EventDecl,
            NodeKind::ConstructorDecl { .. } => NodeTag::ConstructorDecl,
            NodeKind::DestructorDecl { .. } => NodeTag::DestructorDecl,
            NodeKind::ForLoop { .. } => NodeTag::ForLoop,
            NodeKind::ForEachLoop { .. } => NodeTag::ForEachLoop,
            NodeKind::WhileLoop { .. } => NodeTag::WhileLoop,
            NodeKind::Typename(_) => NodeTag::Typename,
            NodeKind::Parameter(_) => NodeTag::Parameter,
            NodeKind::ArgumentList(_) => NodeTag::ArgumentList,
            NodeKind::Macro { .. } => NodeTag::Macro,
            NodeKind::MacroArgument { .. } => NodeTag::MacroArgument,
            NodeKind::EnumValueList(_) => NodeTag::EnumValueList,
            NodeKind::EnumValue(_) => NodeTag::EnumValue,
            NodeKind::AccessDeclaration { .. } => NodeTag::AccessDeclaration,
            NodeKind::AccessClass { .. } => NodeTag::AccessClass,
            NodeKind::IncompleteAccessSpecifier { .. } => NodeTag::IncompleteAccessSpecifier,
        }
    }
}

impl Node {
    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }

    /// Literal or identifier text carried by the node, if any.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier(s)
            | NodeKind::ConstInteger(s)
            | NodeKind::ConstHexInteger(s)
            | NodeKind::ConstFloat(s)
            | NodeKind::ConstDouble(s)
            | NodeKind::ConstString(s)
            | NodeKind::ConstName(s)
            | NodeKind::ConstFormatString(s) => Some(s),
            NodeKind::ConstBool(true) => Some("true"),
            NodeKind::ConstBool(false) => Some("false"),
            NodeKind::ConstNullptr => Some("nullptr"),
            NodeKind::ImportStatement(path) => Some(&path.node),
            NodeKind::Typename(ty) => Some(&ty.name),
            NodeKind::MacroArgument { value, .. } => value.as_deref(),
            _ => None,
        }
    }

    /// The typename node's type, if this is a `Typename`.
    pub fn as_typename(&self) -> Option<&TypeRef> {
        match &self.kind {
            NodeKind::Typename(ty) => Some(ty),
            _ => None,
        }
    }

    /// Child nodes in source order.
    pub fn children(&self) -> Vec<&Node> {
        fn push_opt<'a>(out: &mut Vec<&'a Node>, node: &'a Option<Box<Node>>) {
            if let Some(node) = node {
                out.push(node);
            }
        }

        let mut out = Vec::new();
        match &self.kind {
            NodeKind::BinaryOperation { lhs, rhs, .. }
            | NodeKind::Assignment { lhs, rhs }
            | NodeKind::CompoundAssignment { lhs, rhs, .. } => {
                out.push(lhs.as_ref());
                out.push(rhs.as_ref());
            }
            NodeKind::UnaryOperation { operand, .. } | NodeKind::PostfixOperation { operand, .. } => {
                out.push(operand.as_ref())
            }
            NodeKind::TernaryOperation { condition, then_expr, else_expr } => {
                out.push(condition.as_ref());
                out.push(then_expr.as_ref());
                out.push(else_expr.as_ref());
            }
            NodeKind::CastOperation { typename, expr } => {
                out.push(typename.as_ref());
                push_opt(&mut out, expr);
            }
            NodeKind::MemberAccess { object, .. } => out.push(object.as_ref()),
            NodeKind::NamespaceAccess { namespace, .. } => push_opt(&mut out, namespace),
            NodeKind::FunctionCall { callee: head, args } | NodeKind::ConstructorCall { typename: head, args } => {
                out.push(head.as_ref());
                out.push(args.as_ref());
            }
            NodeKind::NamedArgument { value, .. } => out.push(value.as_ref()),
            NodeKind::IndexOperator { object, index } => {
                out.push(object.as_ref());
                push_opt(&mut out, index);
            }
            NodeKind::CommaExpression(items)
            | NodeKind::VariableDeclMulti(items)
            | NodeKind::ArgumentList(items)
            | NodeKind::EnumValueList(items) => out.extend(items.iter()),
            NodeKind::IfStatement { condition, body } | NodeKind::WhileLoop { condition, body } => {
                out.push(condition.as_ref());
                push_opt(&mut out, body);
            }
            NodeKind::ElseStatement { body } => push_opt(&mut out, body),
            NodeKind::ReturnStatement(value) => push_opt(&mut out, value),
            NodeKind::ImportFunctionStatement { function, .. } => out.push(function.as_ref()),
            NodeKind::DefaultStatement(inner)
            | NodeKind::SwitchStatement(inner)
            | NodeKind::CaseStatement(inner) => out.push(inner.as_ref()),
            NodeKind::StructDefinition { macro_, .. }
            | NodeKind::ClassDefinition { macro_, .. }
            | NodeKind::EnumDefinition { macro_, .. } => push_opt(&mut out, macro_),
            NodeKind::VariableDecl(decl) => {
                push_opt(&mut out, &decl.prefix.macro_);
                out.push(decl.typename.as_ref());
                push_opt(&mut out, &decl.init);
            }
            NodeKind::FunctionDecl(decl) => {
                push_opt(&mut out, &decl.prefix.macro_);
                out.push(decl.return_type.as_ref());
                out.extend(decl.params.iter());
            }
            NodeKind::DelegateDecl(sig) | NodeKind::EventDecl(sig) => {
                out.push(sig.return_type.as_ref());
                out.extend(sig.params.iter());
            }
            NodeKind::ConstructorDecl { macro_, params, .. } => {
                push_opt(&mut out, macro_);
                out.extend(params.iter());
            }
            NodeKind::ForLoop { init, condition, step, body } => {
                push_opt(&mut out, init);
                push_opt(&mut out, condition);
                push_opt(&mut out, step);
                push_opt(&mut out, body);
            }
            NodeKind::ForEachLoop { typename, iterable, body, .. } => {
                out.push(typename.as_ref());
                out.push(iterable.as_ref());
                push_opt(&mut out, body);
            }
            NodeKind::Typename(ty) => out.extend(ty.subtypes.iter()),
            NodeKind::Parameter(param) => {
                out.push(param.typename.as_ref());
                push_opt(&mut out, &param.default);
            }
            NodeKind::Macro { args, .. } => out.extend(args.iter()),
            NodeKind::EnumValue(value) => {
                push_opt(&mut out, &value.value);
                push_opt(&mut out, &value.macro_);
            }
            NodeKind::AccessDeclaration { classes, .. } => out.extend(classes.iter()),
            NodeKind::Identifier(_)
            | NodeKind::This
            | NodeKind::ConstInteger(_)
            | NodeKind::ConstHexInteger(_)
            | NodeKind::ConstFloat(_)
            | NodeKind::ConstDouble(_)
            | NodeKind::ConstString(_)
            | NodeKind::ConstName(_)
            | NodeKind::ConstFormatString(_)
            | NodeKind::ConstBool(_)
            | NodeKind::ConstNullptr
            | NodeKind::ImportStatement(_)
            | NodeKind::DefaultCaseStatement
            | NodeKind::ContinueStatement
            | NodeKind::BreakStatement
            | NodeKind::AssetDefinition { .. }
            | NodeKind::NamespaceDefinition { .. }
            | NodeKind::DestructorDecl { .. }
            | NodeKind::MacroArgument { .. }
            | NodeKind::AccessClass { .. }
            | NodeKind::IncompleteAccessSpecifier { .. } => {}
        }
        out
    }

    /// Name of the macro attached to a declaration (`UPROPERTY`, `UFUNCTION`, ...).
    pub fn macro_node(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::VariableDecl(decl) => decl.prefix.macro_.as_deref(),
            NodeKind::FunctionDecl(decl) => decl.prefix.macro_.as_deref(),
            NodeKind::StructDefinition { macro_, .. }
            | NodeKind::ClassDefinition { macro_, .. }
            | NodeKind::EnumDefinition { macro_, .. }
            | NodeKind::ConstructorDecl { macro_, .. } => macro_.as_deref(),
            _ => None,
        }
    }

    /// Whether a `Macro` node carries a specifier with the given name.
    pub fn macro_has_specifier(&self, specifier: &str) -> bool {
        match &self.kind {
            NodeKind::Macro { args, .. } => args.iter().any(|arg| match &arg.kind {
                NodeKind::MacroArgument { name, .. } => name.node.eq_ignore_ascii_case(specifier),
                _ => false,
            }),
            _ => false,
        }
    }
}
