pub mod ast;
mod expr;

use crate::diagnostics::ParseError;
use crate::lexer::token::{is_keyword, Token};
use crate::module::ScopeType;
use crate::span::{Span, Spanned};
use ast::*;

/// How a statement chunk ended in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminator {
    Semicolon,
    /// `case X:` or `default:` inside a switch body.
    Colon,
    /// Followed by `{`: the statement is the header of a scope.
    Block,
    /// Cut off by the closing `}` of the enclosing scope.
    ScopeEnd,
    Eof,
}

impl Terminator {
    pub fn is_complete(&self) -> bool {
        matches!(self, Terminator::Semicolon | Terminator::Colon | Terminator::Block)
    }
}

const MACRO_NAMES: &[&str] = &["UPROPERTY", "UFUNCTION", "UCLASS", "USTRUCT", "UENUM", "UMETA"];

/// Parse one statement chunk. Token spans are absolute module offsets; the
/// returned node's spans are relative to `base`.
pub fn parse_statement(
    tokens: &[Spanned<Token>],
    source: &str,
    base: usize,
    scope: ScopeType,
    terminator: Terminator,
) -> Result<Node, ParseError> {
    Parser::new(tokens, source, base, scope, terminator).parse()
}

/// Parentheses, unary operators, template arguments and inline bodies deeper
/// than this fail to parse.
pub const MAX_NESTING: usize = 64;

/// Binary operators allowed in one statement.
pub const MAX_OPERATORS: usize = 256;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    base: usize,
    pos: usize,
    scope: ScopeType,
    terminator: Terminator,
    depth: usize,
    /// Binary operators folded so far in this statement.
    operators: usize,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: &'a [Spanned<Token>],
        source: &'a str,
        base: usize,
        scope: ScopeType,
        terminator: Terminator,
    ) -> Self {
        Self { tokens, source, base, pos: 0, scope, terminator, depth: 0, operators: 0 }
    }

    pub fn parse(mut self) -> Result<Node, ParseError> {
        if self.at_end() {
            return Err(self.unexpected("a statement"));
        }
        let node = if self.scope == ScopeType::Enum {
            self.parse_enum_values()?
        } else {
            self.parse_statement()?
        };
        if let Some(tok) = self.peek() {
            return Err(ParseError::syntax(
                format!("unexpected {} after end of statement", tok.node),
                self.rel(tok.span),
            ));
        }
        Ok(node)
    }

    // ---- token cursor ----

    fn peek(&self) -> Option<&'a Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<Token> {
        self.peek().map(|t| t.node)
    }

    fn peek_nth_kind(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).map(|t| t.node)
    }

    fn check(&self, kind: Token) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn nth_is_word(&self, n: usize, word: &str) -> bool {
        matches!(self.tokens.get(self.pos + n), Some(t) if t.node == Token::Ident && self.text(t) == word)
    }

    fn check_word(&self, word: &str) -> bool {
        self.nth_is_word(0, word)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<&'a Spanned<Token>> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn eat(&mut self, kind: Token) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn text(&self, tok: &Spanned<Token>) -> &'a str {
        self.source.get(tok.span.start..tok.span.end).unwrap_or("")
    }

    fn rel(&self, span: Span) -> Span {
        Span::new(span.start.saturating_sub(self.base), span.end.saturating_sub(self.base))
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map(|t| self.rel(t.span).end).unwrap_or(0)
    }

    /// Relative start offset of the next token.
    fn start(&self) -> usize {
        match self.peek() {
            Some(tok) => self.rel(tok.span).start,
            None => self.end_offset(),
        }
    }

    /// Relative span of the next token, or the empty span at the end.
    fn current_span(&self) -> Span {
        match self.peek() {
            Some(tok) => self.rel(tok.span),
            None => Span::new(self.end_offset(), self.end_offset()),
        }
    }

    fn span_from(&self, start: usize) -> Span {
        let end = match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(prev) => self.rel(prev.span).end,
            None => start,
        };
        Span::new(start, end.max(start))
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::syntax(
                format!("expected {expected}, found {}", tok.node),
                self.rel(tok.span),
            ),
            None => {
                let end = self.end_offset();
                ParseError::incomplete(format!("expected {expected}"), Span::new(end, end))
            }
        }
    }

    /// Run `f` one nesting level deeper. Past [`MAX_NESTING`] the statement is
    /// rejected instead of recursing further.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::syntax("expression nested too deeply", self.current_span()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expect(&mut self, kind: Token) -> Result<Span, ParseError> {
        match self.peek() {
            Some(tok) if tok.node == kind => {
                self.pos += 1;
                Ok(self.rel(tok.span))
            }
            _ => Err(self.unexpected(&format!("'{kind}'"))),
        }
    }

    fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        match self.peek() {
            Some(tok) if tok.node == Token::Ident => {
                self.pos += 1;
                Ok(Spanned::new(self.text(tok).to_string(), self.rel(tok.span)))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<Span, ParseError> {
        match self.peek() {
            Some(tok) if tok.node == Token::Ident && self.text(tok) == word => {
                self.pos += 1;
                Ok(self.rel(tok.span))
            }
            _ => Err(self.unexpected(&format!("'{word}'"))),
        }
    }

    fn at_macro(&self) -> bool {
        matches!(self.peek(), Some(t) if t.node == Token::Ident && MACRO_NAMES.contains(&self.text(t)))
            && self.peek_nth_kind(1) == Some(Token::LParen)
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Result<Node, ParseError> {
        let Some(tok) = self.peek() else {
            return Err(self.unexpected("a statement"));
        };
        match tok.node {
            Token::Import => self.parse_import(),
            Token::If => self.parse_if(),
            Token::Else => self.parse_else(),
            Token::For => self.parse_for(),
            Token::While => self.parse_while(),
            Token::Switch => self.parse_switch(),
            Token::Return => self.parse_return(),
            Token::Break => self.parse_keyword_statement(NodeKind::BreakStatement),
            Token::Continue => self.parse_keyword_statement(NodeKind::ContinueStatement),
            Token::Case => self.parse_case(),
            Token::Default => self.parse_default(),
            Token::Delegate | Token::Event => self.parse_signature_decl(),
            Token::Ident if self.check_word("access") && self.scope.is_type_body() => {
                if self.peek_nth_kind(1) == Some(Token::Colon) {
                    self.parse_access_prefixed()
                } else {
                    self.parse_access_declaration()
                }
            }
            Token::Ident
                if self.check_word("asset")
                    && self.peek_nth_kind(1) == Some(Token::Ident)
                    && self.nth_is_word(2, "of") =>
            {
                self.parse_asset()
            }
            _ => self.parse_declaration(),
        }
    }

    fn parse_keyword_statement(&mut self, kind: NodeKind) -> Result<Node, ParseError> {
        let start = self.start();
        self.advance();
        Ok(Node::new(kind, self.span_from(start)))
    }

    fn parse_import(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::Import)?;

        let saved = self.pos;
        if let Ok(path) = self.parse_module_path() {
            if self.at_end() {
                return Ok(Node::new(NodeKind::ImportStatement(path), self.span_from(start)));
            }
        }
        self.pos = saved;

        let fn_start = self.start();
        let return_type = self.parse_typename()?;
        let name = self.expect_ident()?;
        let params = self.parse_parameters()?;
        let function = Node::new(
            NodeKind::FunctionDecl(FunctionDecl {
                prefix: DeclPrefix::default(),
                is_mixin: false,
                return_type: Box::new(return_type),
                name,
                params,
                is_const: false,
                is_final: false,
                is_override: false,
                is_property: false,
                is_declaration_only: true,
            }),
            self.span_from(fn_start),
        );
        self.expect_word("from")?;
        let module = match self.peek() {
            Some(tok) if tok.node == Token::StringLit => {
                self.advance();
                unquote(self.text(tok)).to_string()
            }
            _ => return Err(self.unexpected("module name string")),
        };
        Ok(Node::new(
            NodeKind::ImportFunctionStatement { function: Box::new(function), module },
            self.span_from(start),
        ))
    }

    fn parse_module_path(&mut self) -> Result<Ident, ParseError> {
        let first = self.expect_ident()?;
        let start = first.span.start;
        let mut path = first.node;
        while self.eat(Token::Dot) {
            let part = self.expect_ident()?;
            path.push('.');
            path.push_str(&part.node);
        }
        Ok(Spanned::new(path, self.span_from(start)))
    }

    fn parse_condition(&mut self) -> Result<Box<Node>, ParseError> {
        self.expect(Token::LParen)?;
        let expr = self.parse_expression()?;
        self.expect(Token::RParen)?;
        Ok(Box::new(expr))
    }

    /// Statement written on the same line as a control header, e.g. `if (X) return;`.
    fn parse_inline_body(&mut self) -> Result<Option<Box<Node>>, ParseError> {
        if self.at_end() {
            return Ok(None);
        }
        Ok(Some(Box::new(self.nested(Self::parse_statement)?)))
    }

    fn parse_if(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::If)?;
        let condition = self.parse_condition()?;
        let body = self.parse_inline_body()?;
        Ok(Node::new(NodeKind::IfStatement { condition, body }, self.span_from(start)))
    }

    fn parse_else(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::Else)?;
        let body = self.parse_inline_body()?;
        Ok(Node::new(NodeKind::ElseStatement { body }, self.span_from(start)))
    }

    fn parse_while(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::While)?;
        let condition = self.parse_condition()?;
        let body = self.parse_inline_body()?;
        Ok(Node::new(NodeKind::WhileLoop { condition, body }, self.span_from(start)))
    }

    fn parse_switch(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::Switch)?;
        let subject = self.parse_condition()?;
        Ok(Node::new(NodeKind::SwitchStatement(subject), self.span_from(start)))
    }

    fn parse_for(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::For)?;
        self.expect(Token::LParen)?;
        if let Some(node) = self.try_foreach_rest(start)? {
            return Ok(node);
        }

        let init = if self.check(Token::Semicolon) {
            None
        } else {
            let init_start = self.start();
            Some(Box::new(self.parse_local_statement(init_start)?))
        };
        self.expect(Token::Semicolon)?;
        let condition =
            if self.check(Token::Semicolon) { None } else { Some(Box::new(self.parse_expression()?)) };
        self.expect(Token::Semicolon)?;
        let step = if self.check(Token::RParen) { None } else { Some(Box::new(self.parse_expression()?)) };
        self.expect(Token::RParen)?;
        let body = self.parse_inline_body()?;
        Ok(Node::new(NodeKind::ForLoop { init, condition, step, body }, self.span_from(start)))
    }

    /// `for (Type Name : Iterable)`. Restores the cursor when the head is a classic loop.
    fn try_foreach_rest(&mut self, start: usize) -> Result<Option<Node>, ParseError> {
        let saved = self.pos;
        let typename = match self.parse_typename() {
            Ok(ty) => ty,
            Err(_) => {
                self.pos = saved;
                return Ok(None);
            }
        };
        if !(self.check(Token::Ident) && self.peek_nth_kind(1) == Some(Token::Colon)) {
            self.pos = saved;
            return Ok(None);
        }
        let name = self.expect_ident()?;
        self.expect(Token::Colon)?;
        let iterable = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let body = self.parse_inline_body()?;
        Ok(Some(Node::new(
            NodeKind::ForEachLoop { typename: Box::new(typename), name, iterable: Box::new(iterable), body },
            self.span_from(start),
        )))
    }

    fn parse_return(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::Return)?;
        let value = if self.at_end() { None } else { Some(Box::new(self.parse_expression()?)) };
        Ok(Node::new(NodeKind::ReturnStatement(value), self.span_from(start)))
    }

    fn parse_case(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::Case)?;
        let value = self.parse_expression()?;
        Ok(Node::new(NodeKind::CaseStatement(Box::new(value)), self.span_from(start)))
    }

    /// `default:` in a switch, or `default Expr;` inside a class body.
    fn parse_default(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::Default)?;
        if self.at_end() && (self.scope == ScopeType::Switch || self.terminator == Terminator::Colon) {
            return Ok(Node::new(NodeKind::DefaultCaseStatement, self.span_from(start)));
        }
        let expr = self.parse_expression()?;
        Ok(Node::new(NodeKind::DefaultStatement(Box::new(expr)), self.span_from(start)))
    }

    fn parse_signature_decl(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let is_event = self.eat(Token::Event);
        if !is_event {
            self.expect(Token::Delegate)?;
        }
        let return_type = self.parse_typename()?;
        let name = self.expect_ident()?;
        let params = self.parse_parameters()?;
        let sig = FunctionSignature { return_type: Box::new(return_type), name, params };
        let kind = if is_event { NodeKind::EventDecl(sig) } else { NodeKind::DelegateDecl(sig) };
        Ok(Node::new(kind, self.span_from(start)))
    }

    fn parse_asset(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect_word("asset")?;
        let name = self.expect_ident()?;
        self.expect_word("of")?;
        let typename = self.expect_ident()?;
        Ok(Node::new(NodeKind::AssetDefinition { name, typename }, self.span_from(start)))
    }

    /// `access Name = private, UOther (readonly), * (editdefaults);`
    fn parse_access_declaration(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect_word("access")?;
        if self.at_end() {
            return Ok(Node::new(NodeKind::IncompleteAccessSpecifier { name: None }, self.span_from(start)));
        }
        let name = self.expect_ident()?;
        if self.at_end() {
            return Ok(Node::new(
                NodeKind::IncompleteAccessSpecifier { name: Some(name) },
                self.span_from(start),
            ));
        }
        self.expect(Token::Eq)?;

        let mut classes = Vec::new();
        loop {
            let class_start = self.start();
            let class_name = match self.peek() {
                Some(tok)
                    if matches!(tok.node, Token::Ident | Token::Private | Token::Protected | Token::Star) =>
                {
                    self.advance();
                    Spanned::new(self.text(tok).to_string(), self.rel(tok.span))
                }
                _ => return Err(self.unexpected("access class")),
            };
            let mut modifiers = Vec::new();
            if self.eat(Token::LParen) {
                loop {
                    modifiers.push(self.expect_ident()?);
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RParen)?;
            }
            classes.push(Node::new(
                NodeKind::AccessClass { name: class_name, modifiers },
                self.span_from(class_start),
            ));
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(Node::new(NodeKind::AccessDeclaration { name, classes }, self.span_from(start)))
    }

    /// `access:Name` in front of a member, or a half-typed specifier on its own.
    fn parse_access_prefixed(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let rest = self.tokens.len() - self.pos;
        if rest <= 3 {
            self.advance();
            self.advance();
            let name = if self.at_end() { None } else { Some(self.expect_ident()?) };
            return Ok(Node::new(NodeKind::IncompleteAccessSpecifier { name }, self.span_from(start)));
        }
        self.parse_declaration()
    }

    fn parse_enum_values(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let mut values = Vec::new();
        while !self.at_end() {
            let value_start = self.start();
            let name = self.expect_ident()?;
            let mut macro_ = if self.at_macro() { Some(Box::new(self.parse_macro()?)) } else { None };
            let value = if self.eat(Token::Eq) { Some(Box::new(self.parse_assignment_expr()?)) } else { None };
            if macro_.is_none() && self.at_macro() {
                macro_ = Some(Box::new(self.parse_macro()?));
            }
            values.push(Node::new(
                NodeKind::EnumValue(EnumValue { name, value, macro_ }),
                self.span_from(value_start),
            ));
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(Node::new(NodeKind::EnumValueList(values), self.span_from(start)))
    }

    // ---- declarations ----

    fn parse_declaration(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let prefix = self.parse_decl_prefix()?;
        let is_mixin = self.eat_word("mixin");

        match self.peek_kind() {
            Some(Token::Class) => return self.parse_class(start, prefix.macro_),
            Some(Token::Struct) => return self.parse_struct(start, prefix.macro_),
            Some(Token::Enum) => return self.parse_enum(start, prefix.macro_),
            Some(Token::Namespace) => return self.parse_namespace(start),
            Some(Token::Delegate) | Some(Token::Event) => return self.parse_signature_decl(),
            Some(Token::Tilde) if self.scope.is_type_body() => return self.parse_destructor(start),
            Some(Token::Ident)
                if self.scope.is_type_body() && self.peek_nth_kind(1) == Some(Token::LParen) =>
            {
                return self.parse_constructor(start, prefix.macro_);
            }
            _ => {}
        }

        if self.scope.is_code() && prefix == DeclPrefix::default() && !is_mixin {
            return self.parse_local_statement(start);
        }

        let typename = self.parse_typename()?;
        let name = self.expect_ident()?;
        if self.check(Token::LParen) {
            return self.parse_function_rest(start, prefix, is_mixin, typename, name);
        }
        self.parse_variable_rest(start, prefix, typename, name)
    }

    /// Inside a code block: a declaration when a typename is followed by a
    /// name, an expression statement otherwise.
    fn parse_local_statement(&mut self, start: usize) -> Result<Node, ParseError> {
        let saved = self.pos;
        if let Ok(typename) = self.parse_typename() {
            if self.check(Token::Ident) {
                let name = self.expect_ident()?;
                return self.parse_variable_rest(start, DeclPrefix::default(), typename, name);
            }
        }
        self.pos = saved;
        self.parse_expression()
    }

    fn parse_decl_prefix(&mut self) -> Result<DeclPrefix, ParseError> {
        let mut prefix = DeclPrefix::default();
        loop {
            if self.at_macro() {
                prefix.macro_ = Some(Box::new(self.parse_macro()?));
            } else if self.eat(Token::Private) {
                prefix.is_private = true;
            } else if self.eat(Token::Protected) {
                prefix.is_protected = true;
            } else if self.check_word("access") && self.peek_nth_kind(1) == Some(Token::Colon) {
                self.advance();
                self.advance();
                prefix.access = Some(self.expect_ident()?);
            } else {
                break;
            }
        }
        Ok(prefix)
    }

    fn parse_macro(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        while !self.check(Token::RParen) {
            args.push(self.parse_macro_argument()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(Node::new(NodeKind::Macro { name, args }, self.span_from(start)))
    }

    fn parse_macro_argument(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let name = match self.peek() {
            Some(tok) if tok.node == Token::Ident || is_keyword(self.text(tok)) => {
                self.advance();
                Spanned::new(self.text(tok).to_string(), self.rel(tok.span))
            }
            _ => return Err(self.unexpected("specifier")),
        };

        let value = if self.eat(Token::Eq) {
            let value_start = self.pos;
            let mut depth = 0usize;
            while let Some(tok) = self.peek() {
                match tok.node {
                    Token::LParen => depth += 1,
                    Token::RParen if depth == 0 => break,
                    Token::RParen => depth -= 1,
                    Token::Comma if depth == 0 => break,
                    _ => {}
                }
                self.advance();
            }
            if self.pos == value_start {
                return Err(self.unexpected("specifier value"));
            }
            let first = self.tokens[value_start].span.start;
            let last = self.tokens[self.pos - 1].span.end;
            Some(self.source.get(first..last).unwrap_or_default().to_string())
        } else {
            None
        };

        Ok(Node::new(NodeKind::MacroArgument { name, value }, self.span_from(start)))
    }

    /// `const TArray<AActor>&in`, `Ns::FType`, `UObject@`.
    pub(crate) fn parse_typename(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let is_const = self.eat(Token::Const);
        let mut name = self.expect_ident()?.node;
        while self.check(Token::ColonColon) && self.peek_nth_kind(1) == Some(Token::Ident) {
            self.advance();
            let part = self.expect_ident()?;
            name.push_str("::");
            name.push_str(&part.node);
        }

        let mut subtypes = Vec::new();
        if self.eat(Token::Lt) {
            loop {
                subtypes.push(self.nested(Self::parse_typename)?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::Gt)?;
        }

        let is_handle = self.eat(Token::At);
        let reference = if self.eat(Token::Amp) {
            Some(if self.eat_word("in") {
                RefKind::In
            } else if self.eat_word("out") {
                RefKind::Out
            } else if self.eat_word("inout") {
                RefKind::InOut
            } else {
                RefKind::Plain
            })
        } else {
            None
        };

        Ok(Node::new(
            NodeKind::Typename(TypeRef { name, subtypes, is_const, is_handle, reference }),
            self.span_from(start),
        ))
    }

    fn parse_parameters(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if self.eat(Token::RParen) {
            return Ok(params);
        }
        loop {
            let start = self.start();
            let typename = self.parse_typename()?;
            let name = if self.check(Token::Ident) { Some(self.expect_ident()?) } else { None };
            let default = if self.eat(Token::Eq) { Some(Box::new(self.parse_assignment_expr()?)) } else { None };
            params.push(Node::new(
                NodeKind::Parameter(Parameter { typename: Box::new(typename), name, default }),
                self.span_from(start),
            ));
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(params)
    }

    fn parse_function_rest(
        &mut self,
        start: usize,
        prefix: DeclPrefix,
        is_mixin: bool,
        return_type: Node,
        name: Ident,
    ) -> Result<Node, ParseError> {
        let params = self.parse_parameters()?;
        let (mut is_const, mut is_final, mut is_override, mut is_property) = (false, false, false, false);
        loop {
            if self.eat(Token::Const) {
                is_const = true;
            } else if self.eat_word("final") {
                is_final = true;
            } else if self.eat_word("override") {
                is_override = true;
            } else if self.eat_word("property") {
                is_property = true;
            } else {
                break;
            }
        }
        let decl = FunctionDecl {
            prefix,
            is_mixin,
            return_type: Box::new(return_type),
            name,
            params,
            is_const,
            is_final,
            is_override,
            is_property,
            is_declaration_only: self.terminator != Terminator::Block,
        };
        Ok(Node::new(NodeKind::FunctionDecl(decl), self.span_from(start)))
    }

    fn parse_variable_rest(
        &mut self,
        start: usize,
        prefix: DeclPrefix,
        typename: Node,
        name: Ident,
    ) -> Result<Node, ParseError> {
        let first = self.parse_declarator(&typename, start, prefix.clone(), name)?;
        if !self.check(Token::Comma) {
            return Ok(first);
        }
        let mut decls = vec![first];
        while self.eat(Token::Comma) {
            let decl_start = self.start();
            let name = self.expect_ident()?;
            decls.push(self.parse_declarator(&typename, decl_start, prefix.clone(), name)?);
        }
        Ok(Node::new(NodeKind::VariableDeclMulti(decls), self.span_from(start)))
    }

    fn parse_declarator(
        &mut self,
        typename: &Node,
        start: usize,
        prefix: DeclPrefix,
        name: Ident,
    ) -> Result<Node, ParseError> {
        let init = if self.eat(Token::Eq) {
            Some(Box::new(self.parse_assignment_expr()?))
        } else if self.check(Token::LParen) && self.scope.is_code() {
            let args = self.parse_argument_list()?;
            let span = Span::new(typename.span.start, args.span.end);
            Some(Node::boxed(
                NodeKind::ConstructorCall { typename: Box::new(typename.clone()), args: Box::new(args) },
                span,
            ))
        } else {
            None
        };
        Ok(Node::new(
            NodeKind::VariableDecl(VariableDecl { prefix, typename: Box::new(typename.clone()), name, init }),
            self.span_from(start),
        ))
    }

    fn parse_constructor(&mut self, start: usize, macro_: Option<Box<Node>>) -> Result<Node, ParseError> {
        let name = self.expect_ident()?;
        let params = self.parse_parameters()?;
        Ok(Node::new(NodeKind::ConstructorDecl { macro_, name, params }, self.span_from(start)))
    }

    fn parse_destructor(&mut self, start: usize) -> Result<Node, ParseError> {
        self.expect(Token::Tilde)?;
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        self.expect(Token::RParen)?;
        Ok(Node::new(NodeKind::DestructorDecl { name }, self.span_from(start)))
    }

    fn parse_class(&mut self, start: usize, macro_: Option<Box<Node>>) -> Result<Node, ParseError> {
        self.expect(Token::Class)?;
        let name = self.expect_ident()?;
        let superclass = if self.eat(Token::Colon) { Some(self.expect_ident()?) } else { None };
        Ok(Node::new(NodeKind::ClassDefinition { macro_, name, superclass }, self.span_from(start)))
    }

    fn parse_struct(&mut self, start: usize, macro_: Option<Box<Node>>) -> Result<Node, ParseError> {
        self.expect(Token::Struct)?;
        let name = self.expect_ident()?;
        Ok(Node::new(NodeKind::StructDefinition { macro_, name }, self.span_from(start)))
    }

    fn parse_enum(&mut self, start: usize, macro_: Option<Box<Node>>) -> Result<Node, ParseError> {
        self.expect(Token::Enum)?;
        let name = self.expect_ident()?;
        Ok(Node::new(NodeKind::EnumDefinition { macro_, name }, self.span_from(start)))
    }

    fn parse_namespace(&mut self, start: usize) -> Result<Node, ParseError> {
        self.expect(Token::Namespace)?;
        let first = self.expect_ident()?;
        let mut name = first.node;
        while self.eat(Token::ColonColon) {
            name.push_str("::");
            name.push_str(&self.expect_ident()?.node);
        }
        let name = Spanned::new(name, Span::new(first.span.start, self.span_from(start).end));
        Ok(Node::new(NodeKind::NamespaceDefinition { name }, self.span_from(start)))
    }
}

/// Strip the prefix and quotes from a string, name or format string literal.
pub(crate) fn unquote(text: &str) -> &str {
    let text = text.strip_prefix(['f', 'n']).unwrap_or(text);
    let Some(quote) = text.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return text;
    };
    let inner = &text[1..];
    inner.strip_suffix(quote).unwrap_or(inner)
}
