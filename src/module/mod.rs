//! A parsed script module: the scope/statement tree, its source text and the
//! symbols recorded for it.

mod builder;
pub mod indent;
pub mod line_index;
pub mod symbols;

use std::collections::BTreeMap;

use lsp_types::{Position, Range};
use serde::Serialize;

use crate::diagnostics::ParseError;
use crate::parser::ast::{Node, NodeKind, TypeRef};
use crate::parser::Terminator;
use crate::span::Span;
pub use line_index::LineIndex;
pub use symbols::{Symbol, SymbolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScopeType {
    Global,
    Namespace,
    Class,
    Struct,
    Function,
    Enum,
    Loop,
    Switch,
    Other,
}

impl ScopeType {
    /// Class or struct body.
    pub fn is_type_body(&self) -> bool {
        matches!(self, ScopeType::Class | ScopeType::Struct)
    }

    /// A block whose statements execute: function bodies and everything nested in them.
    pub fn is_code(&self) -> bool {
        matches!(self, ScopeType::Function | ScopeType::Loop | ScopeType::Switch | ScopeType::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId(pub(crate) usize);

/// A child of a scope: statements and nested scopes interleave in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Statement(StatementId),
    Scope(ScopeId),
}

/// Where a variable visible in a scope was declared.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSite {
    pub name: String,
    pub typename: TypeRef,
    /// The statement holding the declaration. For parameters and loop
    /// variables this is the scope's header.
    pub statement: StatementId,
    /// Absolute span of the declared name.
    pub span: Span,
    pub is_auto: bool,
    pub is_parameter: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Absent when the statement failed to parse.
    pub ast: Option<Node>,
    pub error: Option<ParseError>,
    /// Raw source text, leading whitespace and comments included.
    pub content: String,
    /// Absolute span; starts right after the previous delimiter.
    pub span: Span,
    pub terminator: Terminator,
    pub scope: ScopeId,
    pub previous: Option<Element>,
    pub next: Option<Element>,
}

impl Statement {
    /// Turn a statement-relative node span into an absolute one.
    pub fn absolute(&self, span: Span) -> Span {
        span.offset_by(self.span.start)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub scope_type: ScopeType,
    /// From the opening `{` to the closing `}` (or end of text when unclosed).
    pub span: Span,
    pub is_closed: bool,
    pub parent: Option<ScopeId>,
    pub declaration: Option<StatementId>,
    pub children: Vec<Element>,
    pub variables: BTreeMap<String, VariableSite>,
    pub previous: Option<Element>,
    pub next: Option<Element>,
}

impl Scope {
    /// Whether `offset` lies inside the braces.
    pub fn contains(&self, offset: usize) -> bool {
        if self.parent.is_none() {
            return offset <= self.span.end;
        }
        self.span.start < offset && (offset < self.span.end || (!self.is_closed && offset <= self.span.end))
    }

    pub fn statements(&self) -> impl Iterator<Item = StatementId> + '_ {
        self.children.iter().filter_map(|c| match c {
            Element::Statement(id) => Some(*id),
            Element::Scope(_) => None,
        })
    }

    pub fn subscopes(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.children.iter().filter_map(|c| match c {
            Element::Scope(id) => Some(*id),
            Element::Statement(_) => None,
        })
    }
}

/// The built tree; swapped into a module in one assignment.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tree {
    pub scopes: Vec<Scope>,
    pub statements: Vec<Statement>,
    pub comments: Vec<Span>,
    pub imports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    text: String,
    lines: LineIndex,
    tree: Tree,
    symbols: Vec<Symbol>,
}

impl Module {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut module = Self {
            name: name.into(),
            text: String::new(),
            lines: LineIndex::default(),
            tree: Tree::default(),
            symbols: Vec::new(),
        };
        module.update(text);
        module
    }

    /// Replace the whole text and rebuild. Symbols from the previous text are dropped.
    pub fn update(&mut self, text: impl Into<String>) {
        let text = text.into();
        let tree = builder::build(&text);
        let lines = LineIndex::new(&text);
        log::debug!(
            "rebuilt module {}: {} scopes, {} statements",
            self.name,
            tree.scopes.len(),
            tree.statements.len()
        );
        self.text = text;
        self.lines = lines;
        self.tree = tree;
        self.symbols.clear();
    }

    /// Splice an editor range edit into the text and rebuild.
    pub fn apply_change(&mut self, range: Range, new_text: &str) {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end).max(start);
        let mut text = String::with_capacity(self.text.len() + new_text.len());
        text.push_str(&self.text[..start]);
        text.push_str(new_text);
        text.push_str(&self.text[end..]);
        self.update(text);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.tree.scopes[id.0]
    }

    pub fn statement(&self, id: StatementId) -> &Statement {
        &self.tree.statements[id.0]
    }

    pub fn scope_ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.tree.scopes.len()).map(ScopeId)
    }

    pub fn statement_ids(&self) -> impl Iterator<Item = StatementId> {
        (0..self.tree.statements.len()).map(StatementId)
    }

    /// Spans of comments and preprocessor lines.
    pub fn comments(&self) -> &[Span] {
        &self.tree.comments
    }

    pub fn imports(&self) -> &[String] {
        &self.tree.imports
    }

    /// A module always sees its own declarations.
    pub fn is_module_imported(&self, module_name: &str) -> bool {
        module_name == self.name || self.tree.imports.iter().any(|i| i == module_name)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn set_symbols(&mut self, symbols: Vec<Symbol>) {
        self.symbols = symbols;
    }

    /// Symbols whose span touches the inclusive range `[start, end]`.
    pub fn symbols_in_range(&self, start: usize, end: usize) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(move |s| s.overlaps_range(start, end))
    }

    /// Parse errors of every statement, in absolute coordinates.
    pub fn parse_errors(&self) -> Vec<ParseError> {
        self.tree.statements.iter().filter_map(|s| s.error.clone()).collect()
    }

    // ---- positions ----

    pub fn offset_at(&self, pos: Position) -> usize {
        self.lines.position_to_offset(&self.text, pos)
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.lines.offset_to_position(&self.text, offset)
    }

    pub fn range_of(&self, span: Span) -> Range {
        Range { start: self.position_at(span.start), end: self.position_at(span.end) }
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Text of a line without its line break; empty past the end.
    pub fn line_text(&self, line: u32) -> &str {
        match self.lines.line_range(&self.text, line as usize) {
            Some((start, end)) => &self.text[start..end],
            None => "",
        }
    }

    pub fn is_line_empty(&self, line: u32) -> bool {
        self.line_text(line).trim().is_empty()
    }

    // ---- tree queries ----

    /// Innermost scope containing `offset`.
    pub fn scope_at(&self, offset: usize) -> ScopeId {
        let mut current = self.root();
        'descend: loop {
            for child in self.scope(current).subscopes() {
                if self.scope(child).contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Statement containing `offset`, looking in the innermost scope. An
    /// offset at the very end of a statement still belongs to it.
    pub fn statement_at(&self, offset: usize) -> Option<StatementId> {
        let scope = self.scope(self.scope_at(offset));
        let mut touching = None;
        for id in scope.statements() {
            let span = self.statement(id).span;
            if span.contains(offset) {
                return Some(id);
            }
            if span.end == offset {
                touching = Some(id);
            }
        }
        touching
    }

    pub fn element_span(&self, element: Element) -> Span {
        match element {
            Element::Statement(id) => self.statement(id).span,
            Element::Scope(id) => self.scope(id).span,
        }
    }

    pub fn previous_element(&self, element: Element) -> Option<Element> {
        match element {
            Element::Statement(id) => self.statement(id).previous,
            Element::Scope(id) => self.scope(id).previous,
        }
    }

    pub fn next_element(&self, element: Element) -> Option<Element> {
        match element {
            Element::Statement(id) => self.statement(id).next,
            Element::Scope(id) => self.scope(id).next,
        }
    }

    /// Parsed header of a scope (`class A : B`, `void F()`, `for (...)`).
    pub fn scope_declaration(&self, id: ScopeId) -> Option<&Node> {
        let stmt = self.scope(id).declaration?;
        self.statement(stmt).ast.as_ref()
    }

    /// Parent chain starting at `id` itself.
    pub fn scope_chain(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |s| self.scope(*s).parent)
    }

    /// Nearest enclosing class or struct body.
    pub fn parent_type_scope(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope_chain(id).find(|s| self.scope(*s).scope_type.is_type_body())
    }

    /// Nearest enclosing function body.
    pub fn parent_function_scope(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope_chain(id).find(|s| self.scope(*s).scope_type == ScopeType::Function)
    }

    /// Name of the class, struct or enum a scope defines.
    pub fn scope_type_name(&self, id: ScopeId) -> Option<&str> {
        match &self.scope_declaration(id)?.kind {
            NodeKind::ClassDefinition { name, .. }
            | NodeKind::StructDefinition { name, .. }
            | NodeKind::EnumDefinition { name, .. }
            | NodeKind::AssetDefinition { name, .. } => Some(&name.node),
            _ => None,
        }
    }

    /// `::`-joined path of the namespaces enclosing a scope, if any.
    pub fn namespace_path(&self, id: ScopeId) -> Option<String> {
        let mut parts: Vec<&str> = self
            .scope_chain(id)
            .filter_map(|s| match self.scope_declaration(s).map(|n| &n.kind) {
                Some(NodeKind::NamespaceDefinition { name }) => Some(name.node.as_str()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        parts.reverse();
        Some(parts.join("::"))
    }

    /// Variable visible from `scope` by walking outward through enclosing
    /// scopes. Member and global lookups beyond the tree go through the type database.
    pub fn find_variable(&self, scope: ScopeId, name: &str) -> Option<&VariableSite> {
        self.scope_chain(scope).find_map(|s| self.scope(s).variables.get(name))
    }
}
