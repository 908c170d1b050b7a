use super::ast::*;
use super::{unquote, Parser, MAX_OPERATORS};
use crate::diagnostics::ParseError;
use crate::lexer::token::Token;
use crate::typedb::is_primitive_name;

impl<'a> Parser<'a> {
    /// Full expression, including the comma operator.
    pub(crate) fn parse_expression(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let first = self.parse_assignment_expr()?;
        if !self.check(Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(Token::Comma) {
            items.push(self.parse_assignment_expr()?);
        }
        Ok(Node::new(NodeKind::CommaExpression(items), self.span_from(start)))
    }

    /// Assignment level; right associative.
    pub(crate) fn parse_assignment_expr(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::parse_assignment_level)
    }

    fn parse_assignment_level(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let lhs = self.parse_ternary()?;
        let op = match self.peek_kind() {
            Some(Token::Eq) => None,
            Some(tok) => match compound_op(tok) {
                Some(op) => Some(op),
                None => return Ok(lhs),
            },
            None => return Ok(lhs),
        };
        self.advance();
        let lhs = Box::new(lhs);
        let rhs = Box::new(self.parse_assignment_expr()?);
        let kind = match op {
            None => NodeKind::Assignment { lhs, rhs },
            Some(op) => NodeKind::CompoundAssignment { op, lhs, rhs },
        };
        Ok(Node::new(kind, self.span_from(start)))
    }

    fn parse_ternary(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let condition = self.parse_binary(0)?;
        if !self.eat(Token::Question) {
            return Ok(condition);
        }
        let then_expr = self.parse_assignment_expr()?;
        self.expect(Token::Colon)?;
        let else_expr = self.parse_assignment_expr()?;
        Ok(Node::new(
            NodeKind::TernaryOperation {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            self.span_from(start),
        ))
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<Node, ParseError> {
        let start = self.start();
        let mut lhs = self.parse_unary()?;
        while let Some((op, width)) = self.peek_binop() {
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.operators += 1;
            if self.operators > MAX_OPERATORS {
                return Err(ParseError::syntax("expression has too many operators", self.current_span()));
            }
            for _ in 0..width {
                self.advance();
            }
            let rhs = self.nested(|p| p.parse_binary(r_bp))?;
            lhs = Node::new(
                NodeKind::BinaryOperation { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                self.span_from(start),
            );
        }
        Ok(lhs)
    }

    /// Next binary operator and how many tokens it spans. `>>` arrives as two
    /// adjacent `>` so nested template arguments close cleanly.
    fn peek_binop(&self) -> Option<(BinOp, usize)> {
        let op = match self.peek_kind()? {
            Token::PipePipe => BinOp::Or,
            Token::AmpAmp => BinOp::And,
            Token::Pipe => BinOp::BitOr,
            Token::Caret => BinOp::BitXor,
            Token::Amp => BinOp::BitAnd,
            Token::EqEq => BinOp::Eq,
            Token::BangEq => BinOp::Neq,
            Token::Lt => BinOp::Lt,
            Token::LtEq => BinOp::LtEq,
            Token::GtEq => BinOp::GtEq,
            Token::Gt => {
                let adjacent = match (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
                    (Some(first), Some(second)) => {
                        second.node == Token::Gt && first.span.end == second.span.start
                    }
                    _ => false,
                };
                if adjacent {
                    return Some((BinOp::Shr, 2));
                }
                BinOp::Gt
            }
            Token::Shl => BinOp::Shl,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Star => BinOp::Mul,
            Token::Slash => BinOp::Div,
            Token::Percent => BinOp::Mod,
            Token::StarStar => BinOp::Pow,
            _ => return None,
        };
        Some((op, 1))
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let op = match self.peek_kind() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Tilde) => UnaryOp::BitNot,
            Some(Token::PlusPlus) => UnaryOp::PreInc,
            Some(Token::MinusMinus) => UnaryOp::PreDec,
            Some(Token::At) => UnaryOp::Handle,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Node::new(NodeKind::UnaryOperation { op, operand: Box::new(operand) }, self.span_from(start)))
    }

    fn parse_postfix(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                Some(Token::Dot) => {
                    self.advance();
                    // `Obj.` with nothing after it stays a partial member access.
                    let member = if self.check(Token::Ident) { Some(self.expect_ident()?) } else { None };
                    let partial = member.is_none();
                    expr = Node::new(
                        NodeKind::MemberAccess { object: Box::new(expr), member },
                        self.span_from(start),
                    );
                    if partial {
                        break;
                    }
                }
                Some(Token::ColonColon) => {
                    self.advance();
                    let member = if self.check(Token::Ident) { Some(self.expect_ident()?) } else { None };
                    let partial = member.is_none();
                    expr = Node::new(
                        NodeKind::NamespaceAccess { namespace: Some(Box::new(expr)), member },
                        self.span_from(start),
                    );
                    if partial {
                        break;
                    }
                }
                Some(Token::LParen) => {
                    let args = self.parse_argument_list()?;
                    expr = Node::new(
                        NodeKind::FunctionCall { callee: Box::new(expr), args: Box::new(args) },
                        self.span_from(start),
                    );
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let index =
                        if self.check(Token::RBracket) { None } else { Some(Box::new(self.parse_expression()?)) };
                    self.expect(Token::RBracket)?;
                    expr = Node::new(
                        NodeKind::IndexOperator { object: Box::new(expr), index },
                        self.span_from(start),
                    );
                }
                Some(Token::PlusPlus) | Some(Token::MinusMinus) => {
                    let op = if self.check(Token::PlusPlus) { PostfixOp::Inc } else { PostfixOp::Dec };
                    self.advance();
                    expr = Node::new(
                        NodeKind::PostfixOperation { op, operand: Box::new(expr) },
                        self.span_from(start),
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let Some(tok) = self.peek() else {
            return Err(self.unexpected("an expression"));
        };
        let span = self.rel(tok.span);
        let text = self.text(tok);
        let kind = match tok.node {
            Token::IntLit => NodeKind::ConstInteger(text.to_string()),
            Token::HexLit => NodeKind::ConstHexInteger(text.to_string()),
            Token::FloatLit => NodeKind::ConstFloat(text.to_string()),
            Token::DoubleLit => NodeKind::ConstDouble(text.to_string()),
            Token::StringLit => NodeKind::ConstString(unquote(text).to_string()),
            Token::NameLit => NodeKind::ConstName(unquote(text).to_string()),
            Token::FormatStringLit => NodeKind::ConstFormatString(unquote(text).to_string()),
            Token::True => NodeKind::ConstBool(true),
            Token::False => NodeKind::ConstBool(false),
            Token::Nullptr => NodeKind::ConstNullptr,
            Token::This => NodeKind::This,
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::RParen)?;
                return Ok(inner);
            }
            Token::ColonColon => {
                let start = span.start;
                self.advance();
                let member = self.expect_ident()?;
                return Ok(Node::new(
                    NodeKind::NamespaceAccess { namespace: None, member: Some(member) },
                    self.span_from(start),
                ));
            }
            Token::Ident => return self.parse_identifier_expr(),
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(Node::new(kind, span))
    }

    /// Identifier, `Cast<T>(x)`, or a constructor call of a template or primitive type.
    fn parse_identifier_expr(&mut self) -> Result<Node, ParseError> {
        let start = self.start();

        if self.check_word("Cast") && self.peek_nth_kind(1) == Some(Token::Lt) {
            self.advance();
            self.advance();
            let typename = self.parse_typename()?;
            self.expect(Token::Gt)?;
            let expr = if self.eat(Token::LParen) {
                let inner = if self.check(Token::RParen) { None } else { Some(Box::new(self.parse_expression()?)) };
                self.expect(Token::RParen)?;
                inner
            } else {
                None
            };
            return Ok(Node::new(
                NodeKind::CastOperation { typename: Box::new(typename), expr },
                self.span_from(start),
            ));
        }

        if self.peek_nth_kind(1) == Some(Token::Lt) {
            let saved = self.pos;
            if let Ok(typename) = self.parse_typename() {
                if self.check(Token::LParen) {
                    return self.parse_constructor_call(start, typename);
                }
            }
            self.pos = saved;
        }

        let is_primitive = matches!(self.peek(), Some(tok) if is_primitive_name(self.text(tok)));
        if is_primitive && self.peek_nth_kind(1) == Some(Token::LParen) {
            let typename = self.parse_typename()?;
            return self.parse_constructor_call(start, typename);
        }

        let ident = self.expect_ident()?;
        Ok(Node::new(NodeKind::Identifier(ident.node), ident.span))
    }

    fn parse_constructor_call(&mut self, start: usize, typename: Node) -> Result<Node, ParseError> {
        let args = self.parse_argument_list()?;
        Ok(Node::new(
            NodeKind::ConstructorCall { typename: Box::new(typename), args: Box::new(args) },
            self.span_from(start),
        ))
    }

    pub(crate) fn parse_argument_list(&mut self) -> Result<Node, ParseError> {
        let start = self.start();
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.check(Token::RParen) {
            loop {
                args.push(self.parse_argument()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        Ok(Node::new(NodeKind::ArgumentList(args), self.span_from(start)))
    }

    fn parse_argument(&mut self) -> Result<Node, ParseError> {
        if self.check(Token::Ident) && self.peek_nth_kind(1) == Some(Token::Eq) {
            let start = self.start();
            let name = self.expect_ident()?;
            self.expect(Token::Eq)?;
            let value = self.parse_assignment_expr()?;
            return Ok(Node::new(
                NodeKind::NamedArgument { name, value: Box::new(value) },
                self.span_from(start),
            ));
        }
        self.parse_assignment_expr()
    }
}

fn compound_op(tok: Token) -> Option<BinOp> {
    Some(match tok {
        Token::PlusEq => BinOp::Add,
        Token::MinusEq => BinOp::Sub,
        Token::StarEq => BinOp::Mul,
        Token::StarStarEq => BinOp::Pow,
        Token::SlashEq => BinOp::Div,
        Token::PercentEq => BinOp::Mod,
        Token::AmpEq => BinOp::BitAnd,
        Token::PipeEq => BinOp::BitOr,
        Token::CaretEq => BinOp::BitXor,
        Token::ShlEq => BinOp::Shl,
        Token::ShrEq => BinOp::Shr,
        _ => return None,
    })
}

fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Or => (1, 2),
        BinOp::And => (3, 4),
        BinOp::BitOr => (5, 6),
        BinOp::BitXor => (7, 8),
        BinOp::BitAnd => (9, 10),
        BinOp::Eq | BinOp::Neq => (11, 12),
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => (13, 14),
        BinOp::Shl | BinOp::Shr => (15, 16),
        BinOp::Add | BinOp::Sub => (17, 18),
        BinOp::Mul | BinOp::Div | BinOp::Mod => (19, 20),
        BinOp::Pow => (22, 21),
    }
}
