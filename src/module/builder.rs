//! Splits a module's token stream into statements and nests brace-delimited
//! bodies into scopes.

use std::collections::BTreeMap;

use super::{Element, Scope, ScopeId, ScopeType, Statement, StatementId, Tree, VariableSite};
use crate::lexer::{lex, Token};
use crate::parser::ast::{Node, NodeKind, Parameter, VariableDecl};
use crate::parser::{parse_statement, Terminator};
use crate::span::{Span, Spanned};

struct Builder<'a> {
    text: &'a str,
    tokens: &'a [Spanned<Token>],
    tree: Tree,
    open: Vec<ScopeId>,
    /// First token of the pending statement.
    chunk_start: usize,
    /// Byte offset right after the previous delimiter.
    stmt_start: usize,
    depth: usize,
    /// Braces opened past [`MAX_SCOPE_DEPTH`], which nest no further scopes.
    flattened: usize,
}

/// Scopes nested deeper than this keep their statements in the deepest scope.
pub(crate) const MAX_SCOPE_DEPTH: usize = 256;

pub(crate) fn build(text: &str) -> Tree {
    let lexed = lex(text);
    let mut builder = Builder {
        text,
        tokens: &lexed.tokens,
        tree: Tree { comments: lexed.comments.clone(), ..Tree::default() },
        open: Vec::new(),
        chunk_start: 0,
        stmt_start: 0,
        depth: 0,
        flattened: 0,
    };
    let root = builder.push_scope(ScopeType::Global, Span::new(0, text.len()), None, None);
    builder.tree.scopes[root.0].is_closed = true;
    builder.open.push(root);
    builder.run();
    builder.finish()
}

impl<'a> Builder<'a> {
    fn current(&self) -> ScopeId {
        self.open.last().copied().unwrap_or(ScopeId(0))
    }

    fn run(&mut self) {
        for i in 0..self.tokens.len() {
            let (kind, span) = (self.tokens[i].node, self.tokens[i].span);
            match kind {
                Token::LParen | Token::LBracket => self.depth += 1,
                Token::RParen | Token::RBracket => self.depth = self.depth.saturating_sub(1),
                Token::Semicolon if self.depth == 0 => {
                    self.flush(i, Terminator::Semicolon, span.end);
                    self.advance_past(i);
                }
                Token::Colon if self.depth == 0 && self.at_case_label() => {
                    self.flush(i, Terminator::Colon, span.end);
                    self.advance_past(i);
                }
                Token::LBrace => {
                    let header = self.flush(i, Terminator::Block, span.start);
                    if self.open.len() > MAX_SCOPE_DEPTH {
                        self.flattened += 1;
                    } else {
                        self.open_scope(header, i, span);
                    }
                    self.advance_past(i);
                }
                Token::RBrace => {
                    self.flush(i, Terminator::ScopeEnd, span.start);
                    if self.flattened > 0 {
                        self.flattened -= 1;
                    } else if self.open.len() > 1 {
                        if let Some(id) = self.open.pop() {
                            let scope = &mut self.tree.scopes[id.0];
                            scope.span.end = span.end;
                            scope.is_closed = true;
                        }
                    }
                    self.advance_past(i);
                }
                _ => {}
            }
        }

        let end = self.tokens.last().map(|t| t.span.end).unwrap_or(0);
        self.flush(self.tokens.len(), Terminator::Eof, end);
    }

    fn advance_past(&mut self, i: usize) {
        self.chunk_start = i + 1;
        self.stmt_start = self.tokens[i].span.end;
        self.depth = 0;
    }

    /// `case X:` or `default:` directly inside a switch body.
    fn at_case_label(&self) -> bool {
        let scope = self.tree.scopes[self.current().0].scope_type;
        scope == ScopeType::Switch
            && matches!(self.tokens.get(self.chunk_start).map(|t| t.node), Some(Token::Case | Token::Default))
    }

    /// Parse the pending chunk `tokens[chunk_start..end]` as a statement of the
    /// current scope. Chunks without tokens produce nothing.
    fn flush(&mut self, end: usize, terminator: Terminator, end_offset: usize) -> Option<StatementId> {
        if end <= self.chunk_start {
            return None;
        }
        let scope_id = self.current();
        let scope_type = self.tree.scopes[scope_id.0].scope_type;
        let tokens = &self.tokens[self.chunk_start..end];
        let span = Span::new(self.stmt_start, end_offset.max(self.stmt_start));

        let (ast, error) = match parse_statement(tokens, self.text, span.start, scope_type, terminator) {
            Ok(node) => (Some(node), None),
            Err(err) => {
                log::trace!("statement at {}..{} failed to parse: {err}", span.start, span.end);
                (None, Some(err.offset_by(span.start)))
            }
        };

        let id = StatementId(self.tree.statements.len());
        self.tree.statements.push(Statement {
            ast,
            error,
            content: self.text.get(span.start..span.end).unwrap_or_default().to_string(),
            span,
            terminator,
            scope: scope_id,
            previous: None,
            next: None,
        });
        self.tree.scopes[scope_id.0].children.push(Element::Statement(id));

        // Headers declare into the scope they open, not the one they sit in.
        if terminator != Terminator::Block {
            self.declare_statement_variables(scope_id, id);
            self.record_import(scope_id, id);
        }
        Some(id)
    }

    fn open_scope(&mut self, header: Option<StatementId>, brace_index: usize, brace: Span) {
        let parent = self.current();
        let parent_type = self.tree.scopes[parent.0].scope_type;
        let header_ast = header.and_then(|h| self.tree.statements[h.0].ast.as_ref());
        let scope_type = match header_ast {
            Some(node) => scope_type_for_header(node),
            None => self.fallback_scope_type(brace_index, parent_type, header.is_some()),
        };
        let id = self.push_scope(scope_type, Span::new(brace.start, self.text.len()), Some(parent), header);
        self.tree.scopes[parent.0].children.push(Element::Scope(id));
        if let Some(header) = header {
            self.declare_header_variables(id, header);
        }
        self.open.push(id);
    }

    fn push_scope(
        &mut self,
        scope_type: ScopeType,
        span: Span,
        parent: Option<ScopeId>,
        declaration: Option<StatementId>,
    ) -> ScopeId {
        let id = ScopeId(self.tree.scopes.len());
        self.tree.scopes.push(Scope {
            scope_type,
            span,
            is_closed: false,
            parent,
            declaration,
            children: Vec::new(),
            variables: BTreeMap::new(),
            previous: None,
            next: None,
        });
        id
    }

    /// Classify a scope whose header did not parse by looking at its tokens.
    fn fallback_scope_type(&self, brace_index: usize, parent: ScopeType, has_header: bool) -> ScopeType {
        if parent == ScopeType::Enum || !has_header {
            return ScopeType::Other;
        }
        let header = &self.tokens[self.chunk_start..brace_index];
        for tok in header {
            match tok.node {
                Token::Class => return ScopeType::Class,
                Token::Struct => return ScopeType::Struct,
                Token::Enum => return ScopeType::Enum,
                Token::Namespace => return ScopeType::Namespace,
                Token::For | Token::While => return ScopeType::Loop,
                Token::Switch => return ScopeType::Switch,
                Token::If | Token::Else => return ScopeType::Other,
                _ => {}
            }
        }
        let has_parens = header.iter().any(|t| t.node == Token::LParen);
        if has_parens && matches!(parent, ScopeType::Global | ScopeType::Namespace | ScopeType::Class | ScopeType::Struct) {
            ScopeType::Function
        } else {
            ScopeType::Other
        }
    }

    fn declare(&mut self, scope: ScopeId, site: VariableSite) {
        self.tree.scopes[scope.0].variables.insert(site.name.clone(), site);
    }

    fn declare_statement_variables(&mut self, scope: ScopeId, id: StatementId) {
        let stmt = &self.tree.statements[id.0];
        let Some(ast) = &stmt.ast else { return };
        let mut sites = Vec::new();
        collect_declared(ast, stmt.span.start, id, &mut sites);
        for site in sites {
            self.declare(scope, site);
        }
    }

    fn declare_header_variables(&mut self, scope: ScopeId, header: StatementId) {
        let stmt = &self.tree.statements[header.0];
        let Some(ast) = &stmt.ast else { return };
        let base = stmt.span.start;
        let mut sites = Vec::new();
        match &ast.kind {
            NodeKind::FunctionDecl(decl) => collect_params(&decl.params, base, header, &mut sites),
            NodeKind::ConstructorDecl { params, .. } => collect_params(params, base, header, &mut sites),
            NodeKind::ForLoop { init: Some(init), .. } => collect_declared(init, base, header, &mut sites),
            NodeKind::ForEachLoop { typename, name, .. } => {
                if let Some(ty) = typename.as_typename() {
                    sites.push(VariableSite {
                        name: name.node.clone(),
                        typename: ty.clone(),
                        statement: header,
                        span: name.span.offset_by(base),
                        is_auto: ty.is_auto(),
                        is_parameter: false,
                    });
                }
            }
            _ => {}
        }
        for site in sites {
            self.declare(scope, site);
        }
    }

    fn record_import(&mut self, scope: ScopeId, id: StatementId) {
        if scope != ScopeId(0) {
            return;
        }
        match self.tree.statements[id.0].ast.as_ref().map(|n| &n.kind) {
            Some(NodeKind::ImportStatement(path)) => self.tree.imports.push(path.node.clone()),
            Some(NodeKind::ImportFunctionStatement { module, .. }) => self.tree.imports.push(module.clone()),
            _ => {}
        }
    }

    fn finish(mut self) -> Tree {
        for scope in 0..self.tree.scopes.len() {
            let children = self.tree.scopes[scope].children.clone();
            for (i, child) in children.iter().enumerate() {
                let previous = i.checked_sub(1).map(|p| children[p]);
                let next = children.get(i + 1).copied();
                match *child {
                    Element::Statement(id) => {
                        let stmt = &mut self.tree.statements[id.0];
                        stmt.previous = previous;
                        stmt.next = next;
                    }
                    Element::Scope(id) => {
                        let scope = &mut self.tree.scopes[id.0];
                        scope.previous = previous;
                        scope.next = next;
                    }
                }
            }
        }
        self.tree
    }
}

/// Scope type implied by a parsed header statement.
fn scope_type_for_header(node: &Node) -> ScopeType {
    match &node.kind {
        NodeKind::ClassDefinition { .. } => ScopeType::Class,
        NodeKind::StructDefinition { .. } => ScopeType::Struct,
        NodeKind::EnumDefinition { .. } => ScopeType::Enum,
        NodeKind::NamespaceDefinition { .. } => ScopeType::Namespace,
        NodeKind::FunctionDecl(_) | NodeKind::ConstructorDecl { .. } | NodeKind::DestructorDecl { .. } => {
            ScopeType::Function
        }
        NodeKind::ForLoop { .. } | NodeKind::ForEachLoop { .. } | NodeKind::WhileLoop { .. } => ScopeType::Loop,
        NodeKind::SwitchStatement(_) => ScopeType::Switch,
        NodeKind::ElseStatement { body: Some(inner) } => scope_type_for_header(inner),
        _ => ScopeType::Other,
    }
}

fn variable_site(decl: &VariableDecl, base: usize, statement: StatementId) -> Option<VariableSite> {
    let ty = decl.typename.as_typename()?;
    Some(VariableSite {
        name: decl.name.node.clone(),
        typename: ty.clone(),
        statement,
        span: decl.name.span.offset_by(base),
        is_auto: ty.is_auto(),
        is_parameter: false,
    })
}

fn collect_declared(node: &Node, base: usize, statement: StatementId, out: &mut Vec<VariableSite>) {
    match &node.kind {
        NodeKind::VariableDecl(decl) => out.extend(variable_site(decl, base, statement)),
        NodeKind::VariableDeclMulti(decls) => {
            for decl in decls {
                collect_declared(decl, base, statement, out);
            }
        }
        _ => {}
    }
}

fn collect_params(params: &[Node], base: usize, statement: StatementId, out: &mut Vec<VariableSite>) {
    for param in params {
        let NodeKind::Parameter(Parameter { typename, name: Some(name), .. }) = &param.kind else {
            continue;
        };
        let Some(ty) = typename.as_typename() else { continue };
        out.push(VariableSite {
            name: name.node.clone(),
            typename: ty.clone(),
            statement,
            span: name.span.offset_by(base),
            is_auto: false,
            is_parameter: true,
        });
    }
}
