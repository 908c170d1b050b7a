//! Static types of expressions, computed from a module's scope tree and the
//! type database.
//!
//! Resolution works on written typenames (`TArray<AActor>`, `const FVector&`)
//! so template arguments survive through chains like `Actors[0].GetName()`;
//! the database lookup happens once at the end.

mod conversion;

use std::sync::Arc;

pub use conversion::{classify_conversion, Conversion};

use crate::module::{Module, ScopeId, VariableSite};
use crate::parser::ast::{BinOp, Node, NodeKind, UnaryOp};
use crate::typedb::{primitive_rank, DBMethod, DBSymbol, DBType, SymbolFilter, TypeDatabase, TypeKind};

/// Nested `auto` initializers followed before giving up.
const MAX_AUTO_DEPTH: usize = 16;

/// Result of resolving an expression. `nullptr` has no type of its own but
/// converts to any object handle, so it is kept apart from a failed lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprType {
    Type(Arc<DBType>),
    Nullptr,
    Unknown,
}

impl ExprType {
    pub fn as_type(&self) -> Option<&Arc<DBType>> {
        match self {
            ExprType::Type(ty) => Some(ty),
            ExprType::Nullptr | ExprType::Unknown => None,
        }
    }

    pub fn into_type(self) -> Option<Arc<DBType>> {
        match self {
            ExprType::Type(ty) => Some(ty),
            ExprType::Nullptr | ExprType::Unknown => None,
        }
    }

    pub fn is_nullptr(&self) -> bool {
        matches!(self, ExprType::Nullptr)
    }
}

/// What a bare name refers to from inside a scope.
#[derive(Debug, Clone)]
pub enum NameTarget<'m> {
    /// Local, parameter, loop variable or a member declared in this module's type body.
    Variable(&'m VariableSite),
    /// Member of the enclosing class or struct, possibly inherited.
    Member(DBSymbol),
    /// Member of an enclosing namespace or the global namespace.
    Global(DBSymbol),
    Type(Arc<DBType>),
    Namespace(Arc<DBType>),
}

/// Resolve `node`, a tree from a statement in `scope`.
pub fn resolve_expression(module: &Module, db: &TypeDatabase, scope: ScopeId, node: &Node) -> ExprType {
    if matches!(node.kind, NodeKind::ConstNullptr) {
        return ExprType::Nullptr;
    }
    match resolve_written_type(module, db, scope, node).and_then(|w| db.resolve_typename(&w)) {
        Some(ty) => ExprType::Type(ty),
        None => ExprType::Unknown,
    }
}

/// The database type of an expression; `None` for unknown expressions and `nullptr`.
pub fn resolve_type_from_expression(
    module: &Module,
    db: &TypeDatabase,
    scope: ScopeId,
    node: &Node,
) -> Option<Arc<DBType>> {
    resolve_expression(module, db, scope, node).into_type()
}

/// The typename an expression has, as it would be written in a declaration.
pub fn resolve_written_type(module: &Module, db: &TypeDatabase, scope: ScopeId, node: &Node) -> Option<String> {
    Resolver { module, db, auto_depth: 0 }.expr(scope, node)
}

/// Class or struct whose body encloses `scope`.
pub fn enclosing_type(module: &Module, db: &TypeDatabase, scope: ScopeId) -> Option<Arc<DBType>> {
    let body = module.parent_type_scope(scope)?;
    db.get_type(module.scope_type_name(body)?)
}

/// Namespaces visible from `scope`, innermost first, ending with the global namespace.
pub fn namespace_chain(module: &Module, db: &TypeDatabase, scope: ScopeId) -> Vec<Arc<DBType>> {
    let mut paths = Vec::new();
    let mut path = module.namespace_path(scope);
    while let Some(current) = path {
        path = current.rsplit_once("::").map(|(outer, _)| outer.to_string());
        paths.push(current);
    }
    paths.push(String::new());
    paths.iter().filter_map(|p| db.namespace(p)).collect()
}

/// Look a bare name up the way the compiler would: variables in the scope
/// chain, members of the enclosing type, namespace members, then type and
/// namespace names.
pub fn lookup_name<'m>(module: &'m Module, db: &TypeDatabase, scope: ScopeId, name: &str) -> Option<NameTarget<'m>> {
    if let Some(site) = module.find_variable(scope, name) {
        return Some(NameTarget::Variable(site));
    }
    if let Some(ty) = enclosing_type(module, db, scope) {
        if let Some(sym) = find_value_symbol(&ty, db, name) {
            return Some(NameTarget::Member(sym));
        }
    }
    for ns in namespace_chain(module, db, scope) {
        if let Some(sym) = find_value_symbol(&ns, db, name) {
            return Some(NameTarget::Global(sym));
        }
    }
    if let Some(ty) = db.get_type(name) {
        return Some(NameTarget::Type(ty));
    }
    db.namespace(name).map(NameTarget::Namespace)
}

/// A member usable as a value: a property, a method, or a `Get<Name>` accessor.
fn find_value_symbol(ty: &Arc<DBType>, db: &TypeDatabase, name: &str) -> Option<DBSymbol> {
    ty.find_first_symbol(db, name, SymbolFilter::Any)
        .or_else(|| ty.find_first_symbol(db, &format!("Get{name}"), SymbolFilter::FunctionOnly))
}

/// First template argument of a written type: `TArray<AActor>` → `AActor`.
pub fn template_argument(written: &str) -> Option<&str> {
    let open = written.find('<')?;
    let close = written.rfind('>')?;
    let inner = written.get(open + 1..close)?;
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(inner[..i].trim()),
            _ => {}
        }
    }
    Some(inner.trim())
}

struct Resolver<'a> {
    module: &'a Module,
    db: &'a TypeDatabase,
    auto_depth: usize,
}

impl Resolver<'_> {
    fn expr(&mut self, scope: ScopeId, node: &Node) -> Option<String> {
        match &node.kind {
            NodeKind::Identifier(name) => self.name_type(scope, name),
            NodeKind::This => enclosing_type(self.module, self.db, scope).map(|t| t.typename.clone()),
            NodeKind::ConstInteger(_) | NodeKind::ConstHexInteger(_) => Some("int".to_string()),
            NodeKind::ConstFloat(_) => Some("float".to_string()),
            NodeKind::ConstDouble(_) => Some("double".to_string()),
            NodeKind::ConstString(_) | NodeKind::ConstFormatString(_) => Some("FString".to_string()),
            NodeKind::ConstName(_) => Some("FName".to_string()),
            NodeKind::ConstBool(_) => Some("bool".to_string()),
            NodeKind::ConstNullptr => None,
            NodeKind::MemberAccess { object, member } => {
                let member = member.as_ref()?;
                let object = self.expr(scope, object)?;
                self.member_type(&object, &member.node)
            }
            NodeKind::NamespaceAccess { namespace, member } => {
                let member = member.as_ref()?;
                self.namespace_member_type(scope, namespace.as_deref(), &member.node)
            }
            NodeKind::FunctionCall { callee, .. } => self.call_type(scope, callee),
            NodeKind::ConstructorCall { typename, .. } | NodeKind::CastOperation { typename, .. } => {
                typename.as_typename().map(|t| t.display_name())
            }
            NodeKind::IndexOperator { object, .. } => {
                let object = self.expr(scope, object)?;
                self.element_type(&object)
            }
            NodeKind::BinaryOperation { op, lhs, rhs } => self.binop_type(scope, *op, lhs, rhs),
            NodeKind::UnaryOperation { op: UnaryOp::Not, .. } => Some("bool".to_string()),
            NodeKind::UnaryOperation { operand, .. } | NodeKind::PostfixOperation { operand, .. } => {
                self.expr(scope, operand)
            }
            NodeKind::TernaryOperation { then_expr, else_expr, .. } => self.ternary_type(scope, then_expr, else_expr),
            NodeKind::Assignment { lhs, .. } | NodeKind::CompoundAssignment { lhs, .. } => self.expr(scope, lhs),
            NodeKind::CommaExpression(items) => self.expr(scope, items.last()?),
            NodeKind::NamedArgument { value, .. } => self.expr(scope, value),
            _ => None,
        }
    }

    fn name_type(&mut self, scope: ScopeId, name: &str) -> Option<String> {
        match lookup_name(self.module, self.db, scope, name)? {
            NameTarget::Variable(site) if site.is_auto => self.auto_type(site),
            NameTarget::Variable(site) => Some(site.typename.display_name()),
            NameTarget::Member(sym) | NameTarget::Global(sym) => symbol_value_type(&sym, name),
            NameTarget::Type(ty) | NameTarget::Namespace(ty) => Some(ty.typename.clone()),
        }
    }

    /// Type of an `auto` variable, taken from what initializes it.
    fn auto_type(&mut self, site: &VariableSite) -> Option<String> {
        if self.auto_depth >= MAX_AUTO_DEPTH {
            log::debug!("gave up resolving auto variable {}", site.name);
            return None;
        }
        self.auto_depth += 1;
        let result = self.initializer_type(site);
        self.auto_depth -= 1;
        result
    }

    fn initializer_type(&mut self, site: &VariableSite) -> Option<String> {
        let stmt = self.module.statement(site.statement);
        let ast = stmt.ast.as_ref()?;
        if let NodeKind::ForEachLoop { iterable, .. } = &ast.kind {
            let container = self.expr(stmt.scope, iterable)?;
            return self.element_type(&container);
        }
        let init = find_initializer(ast, &site.name)?;
        self.expr(stmt.scope, init)
    }

    fn member_type(&self, object: &str, member: &str) -> Option<String> {
        let ty = self.db.resolve_typename(object)?;
        if let Some(prop) = ty.get_property(self.db, member) {
            return Some(prop.typename.clone());
        }
        ty.get_method(self.db, &format!("Get{member}")).map(|m| m.return_type.clone())
    }

    /// Method callable on a value of the written type, mixins included.
    fn method_of(&self, object: &str, name: &str) -> Option<Arc<DBMethod>> {
        let ty = self.db.resolve_typename(object)?;
        ty.get_method(self.db, name).or_else(|| find_mixin(self.db, &ty, name))
    }

    fn element_type(&self, container: &str) -> Option<String> {
        if let Some(arg) = template_argument(container) {
            return Some(arg.to_string());
        }
        self.method_of(container, "opIndex").map(|m| m.return_type.clone())
    }

    /// `A::B::C` as a path string, for identifier and namespace-access chains.
    fn qualifier_path(node: &Node) -> Option<String> {
        match &node.kind {
            NodeKind::Identifier(name) => Some(name.clone()),
            NodeKind::NamespaceAccess { namespace: Some(inner), member: Some(member) } => {
                Some(format!("{}::{}", Self::qualifier_path(inner)?, member.node))
            }
            _ => None,
        }
    }

    fn super_type(&self, scope: ScopeId) -> Option<Arc<DBType>> {
        let ty = enclosing_type(self.module, self.db, scope)?;
        self.db.get_type(ty.supertype.as_deref()?)
    }

    /// The type or namespace a qualifier names.
    fn qualifier_type(&self, scope: ScopeId, qualifier: Option<&Node>) -> Option<Arc<DBType>> {
        let Some(qualifier) = qualifier else {
            return self.db.global_namespace();
        };
        let path = Self::qualifier_path(qualifier)?;
        if path == "Super" {
            return self.super_type(scope);
        }
        self.db.namespace(&path).or_else(|| self.db.resolve_typename(&path))
    }

    fn namespace_member_type(&self, scope: ScopeId, qualifier: Option<&Node>, member: &str) -> Option<String> {
        let owner = self.qualifier_type(scope, qualifier)?;
        if owner.is_enum() {
            return owner.local_property(member).map(|_| owner.typename.clone());
        }
        let sym = find_value_symbol(&owner, self.db, member)?;
        symbol_value_type(&sym, member)
    }

    fn call_type(&mut self, scope: ScopeId, callee: &Node) -> Option<String> {
        let method = match &callee.kind {
            NodeKind::Identifier(name) => {
                if let Some(method) = self.function_named(scope, name) {
                    return Some(method.return_type.clone());
                }
                // Constructor-style call of a type: `FVector(1, 2, 3)`.
                let ty = self.db.resolve_typename(name).filter(|t| !t.is_namespace_or_global())?;
                return Some(ty.typename.clone());
            }
            NodeKind::MemberAccess { object, member } => {
                let member = member.as_ref()?;
                let object = self.expr(scope, object)?;
                self.method_of(&object, &member.node)?
            }
            NodeKind::NamespaceAccess { namespace, member } => {
                let member = member.as_ref()?;
                let owner = self.qualifier_type(scope, namespace.as_deref())?;
                owner.get_method(self.db, &member.node)?
            }
            _ => return None,
        };
        Some(method.return_type.clone())
    }

    /// A function callable by bare name: a method of the enclosing type or a
    /// function of an enclosing namespace.
    fn function_named(&self, scope: ScopeId, name: &str) -> Option<Arc<DBMethod>> {
        if let Some(method) = enclosing_type(self.module, self.db, scope).and_then(|t| t.get_method(self.db, name)) {
            return Some(method);
        }
        namespace_chain(self.module, self.db, scope).into_iter().find_map(|ns| ns.local_method(name).cloned())
    }

    /// Common type of the two branches: a `nullptr` branch takes the other
    /// branch's type, related classes meet at the base, numbers widen.
    fn ternary_type(&mut self, scope: ScopeId, then_expr: &Node, else_expr: &Node) -> Option<String> {
        match (&then_expr.kind, &else_expr.kind) {
            (NodeKind::ConstNullptr, _) => return self.expr(scope, else_expr),
            (_, NodeKind::ConstNullptr) => return self.expr(scope, then_expr),
            _ => {}
        }
        let then_written = self.expr(scope, then_expr)?;
        let else_written = self.expr(scope, else_expr)?;
        if then_written == else_written {
            return Some(then_written);
        }
        let then_type = self.db.resolve_typename(&then_written)?;
        let else_type = self.db.resolve_typename(&else_written)?;
        if then_type.typename == else_type.typename {
            return Some(then_written);
        }
        if then_type.inherits_from(self.db, &else_type.typename) {
            return Some(else_written);
        }
        if else_type.inherits_from(self.db, &then_type.typename) {
            return Some(then_written);
        }
        match (primitive_rank(&then_type.typename), primitive_rank(&else_type.typename)) {
            (Some(t), Some(e)) if e > t => Some(else_written),
            (Some(_), Some(_)) => Some(then_written),
            _ => None,
        }
    }

    fn binop_type(&mut self, scope: ScopeId, op: BinOp, lhs: &Node, rhs: &Node) -> Option<String> {
        if op.is_comparison() || op.is_logical() {
            return Some("bool".to_string());
        }
        let left = self.expr(scope, lhs)?;
        let left_type = self.db.resolve_typename(&left)?;
        if !left_type.is_primitive() {
            let method = op.method_name()?;
            return self.method_of(&left, method).map(|m| m.return_type.clone());
        }
        let right = self.expr(scope, rhs);
        let bitwise = matches!(op, BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr);
        match right {
            Some(right) if !bitwise => {
                let right_name = self.db.resolve_typename(&right).map(|t| t.typename.clone());
                match (primitive_rank(&left_type.typename), right_name.as_deref().and_then(primitive_rank)) {
                    (Some(l), Some(r)) if r > l => right_name,
                    _ => Some(left_type.typename.clone()),
                }
            }
            _ => Some(left_type.typename.clone()),
        }
    }
}

/// Type of a name bound to a database member. Methods only yield a value
/// through a property accessor.
fn symbol_value_type(sym: &DBSymbol, name: &str) -> Option<String> {
    match sym {
        DBSymbol::Property(prop) => Some(prop.typename.clone()),
        DBSymbol::Method(method) if method.is_property || method.name != name => Some(method.return_type.clone()),
        DBSymbol::Method(_) => None,
    }
}

/// A global `mixin` function whose first parameter accepts `ty`.
pub(crate) fn find_mixin(db: &TypeDatabase, ty: &Arc<DBType>, name: &str) -> Option<Arc<DBMethod>> {
    let global = db.global_namespace()?;
    global
        .methods
        .iter()
        .filter(|m| m.is_mixin && m.name == name)
        .find(|m| {
            m.args
                .first()
                .and_then(|arg| db.resolve_typename(&arg.typename))
                .is_some_and(|target| target.kind != TypeKind::Namespace && ty.inherits_from(db, &target.typename))
        })
        .cloned()
}

/// Initializer of the declarator named `name` in a declaration statement.
fn find_initializer<'n>(node: &'n Node, name: &str) -> Option<&'n Node> {
    match &node.kind {
        NodeKind::VariableDecl(decl) if decl.name.node == name => decl.init.as_deref(),
        NodeKind::VariableDeclMulti(decls) => decls.iter().find_map(|d| find_initializer(d, name)),
        NodeKind::ForLoop { init: Some(init), .. } => find_initializer(init, name),
        _ => None,
    }
}
