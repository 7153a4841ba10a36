//! Recursive-descent parser.
//!
//! Implements the grammar
//!
//! ```text
//! program        → declaration* EOF
//! declaration    → funDecl | varDecl | statement
//! statement      → exprStmt | forStmt | ifStmt | printStmt
//!                | returnStmt | whileStmt | block
//! expression     → assignment
//! assignment     → IDENTIFIER "=" assignment | logic_or
//! logic_or       → logic_and ( "or" logic_and )*
//! logic_and      → equality ( "and" equality )*
//! equality       → comparison ( ( "!=" | "==" ) comparison )*
//! comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )*
//! term           → factor ( ( "-" | "+" ) factor )*
//! factor         → unary ( ( "/" | "*" ) unary )*
//! unary          → ( "!" | "-" ) unary | call
//! call           → primary ( "(" args? ")" )*
//! ```
//!
//! Control-flow bodies must be brace-delimited blocks. `for` loops are
//! desugared here into an equivalent block-wrapped `while`. The parser bails
//! out on the first error; there is no recovery.
//!
//! TODO: resynchronize at statement boundaries to report several errors per
//! run.

use std::rc::Rc;

use crate::ast::{BinOp, Expr, LiteralValue, Stmt, UnaryOp};
use crate::diag::{FullParseError, ParseError};
use crate::intern::{Context, Symbol};
use crate::token::{Literal, Token, TokenKind};

/// Parse a whole program from an owned token list.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, FullParseError> {
    Parser::new(tokens, Context::new()).parse_program()
}

/// Parse a single expression covering the whole token list.
pub fn parse_expression(tokens: Vec<Token>) -> Result<Expr, FullParseError> {
    Parser::new(tokens, Context::new()).parse_expression()
}

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    ctx: Rc<Context>,
}

impl Parser {
    /// Creates a parser over `tokens`, interning identifiers through `ctx`.
    ///
    /// The token list is expected to end with EOF, as produced by
    /// [`crate::scanner::tokenize`]; a missing sentinel is tolerated.
    pub fn new(mut tokens: Vec<Token>, ctx: Rc<Context>) -> Parser {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::new(TokenKind::Eof, "", line));
        }
        Parser {
            tokens,
            current: 0,
            ctx,
        }
    }

    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, FullParseError> {
        let mut prg = vec![];
        while !self.check(TokenKind::Eof) {
            prg.push(self.declaration()?);
        }
        Ok(prg)
    }

    /// Parse one expression and require that nothing follows it.
    pub fn parse_expression(&mut self) -> Result<Expr, FullParseError> {
        let expr = self.expression()?;
        if !self.check(TokenKind::Eof) {
            return Err(self.error(ParseError::UnexpectedToken(
                self.peek().describe(),
                "end of input".to_string(),
            )));
        }
        Ok(expr)
    }

    fn declaration(&mut self) -> Result<Stmt, FullParseError> {
        match self.peek().kind {
            TokenKind::Var => self.var_decl(),
            TokenKind::Fun => self.fun_decl(),
            _ => self.statement(),
        }
    }

    /// Current token is `var`.
    fn var_decl(&mut self) -> Result<Stmt, FullParseError> {
        self.advance();
        let name = self.identifier()?;
        let init = if self.advance_if(TokenKind::Equal) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, ";")?;
        Ok(Stmt::VarDecl(name, init))
    }

    /// Current token is `fun`.
    fn fun_decl(&mut self) -> Result<Stmt, FullParseError> {
        self.advance();
        let name = self.identifier()?;
        self.consume(TokenKind::LeftParen, "(")?;
        let mut params = vec![];
        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.identifier()?);
                if !self.advance_if(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, ")")?;
        let body = self.block()?;
        Ok(Stmt::FunDecl(name, Rc::new(params), Rc::new(body)))
    }

    fn identifier(&mut self) -> Result<Symbol, FullParseError> {
        if self.check(TokenKind::Identifier) {
            let sym = self.ctx.symbol(&self.peek().lexeme);
            self.advance();
            Ok(sym)
        } else {
            Err(self.error(ParseError::ExpectedIdentifier(self.peek().describe())))
        }
    }

    fn statement(&mut self) -> Result<Stmt, FullParseError> {
        match self.peek().kind {
            TokenKind::Print => {
                self.advance();
                let expr = Box::new(self.expression()?);
                self.consume(TokenKind::Semicolon, ";")?;
                Ok(Stmt::Print(expr))
            }
            TokenKind::LeftBrace => self.block(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.return_stmt(),
            _ => {
                let expr = Box::new(self.expression()?);
                self.consume(TokenKind::Semicolon, ";")?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn block(&mut self) -> Result<Stmt, FullParseError> {
        Ok(Stmt::Block(self.block_stmts()?))
    }

    fn block_stmts(&mut self) -> Result<Vec<Stmt>, FullParseError> {
        self.consume(TokenKind::LeftBrace, "{")?;
        let mut stmts = vec![];
        while !self.check(TokenKind::RightBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.error(ParseError::UnexpectedToken(
                    self.peek().describe(),
                    "}".to_string(),
                )));
            }
            stmts.push(self.declaration()?);
        }
        self.advance();
        Ok(stmts)
    }

    /// Current token is `if`.
    fn if_stmt(&mut self) -> Result<Stmt, FullParseError> {
        self.advance();
        self.consume(TokenKind::LeftParen, "(")?;
        let cond = Box::new(self.expression()?);
        self.consume(TokenKind::RightParen, ")")?;
        let then_branch = Box::new(self.block()?);
        let else_branch = if self.advance_if(TokenKind::Else) {
            Some(Box::new(self.block()?))
        } else {
            None
        };
        Ok(Stmt::If(cond, then_branch, else_branch))
    }

    /// Current token is `while`.
    fn while_stmt(&mut self) -> Result<Stmt, FullParseError> {
        self.advance();
        self.consume(TokenKind::LeftParen, "(")?;
        let cond = Box::new(self.expression()?);
        self.consume(TokenKind::RightParen, ")")?;
        let body = Box::new(self.block()?);
        Ok(Stmt::While(cond, body))
    }

    /// Current token is `for`. Desugars into
    /// `{ <init>; while (<cond>) { <body>; <incr>; } }` so that an
    /// initializer variable stays scoped to the loop.
    fn for_stmt(&mut self) -> Result<Stmt, FullParseError> {
        self.advance();
        self.consume(TokenKind::LeftParen, "(")?;

        let init = if self.advance_if(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Var) {
            Some(self.var_decl()?)
        } else {
            let expr = Box::new(self.expression()?);
            self.consume(TokenKind::Semicolon, ";")?;
            Some(Stmt::Expr(expr))
        };

        let cond = if self.check(TokenKind::Semicolon) {
            Expr::Literal(LiteralValue::Bool(true))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, ";")?;

        let incr = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, ")")?;

        let mut body = self.block_stmts()?;
        if let Some(incr) = incr {
            body.push(Stmt::Expr(Box::new(incr)));
        }

        let while_stmt = Stmt::While(Box::new(cond), Box::new(Stmt::Block(body)));
        let mut outer = vec![];
        if let Some(init) = init {
            outer.push(init);
        }
        outer.push(while_stmt);
        Ok(Stmt::Block(outer))
    }

    /// Current token is `return`.
    fn return_stmt(&mut self) -> Result<Stmt, FullParseError> {
        self.advance();
        let expr = if self.check(TokenKind::Semicolon) {
            Expr::Literal(LiteralValue::Nil)
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, ";")?;
        Ok(Stmt::Return(Box::new(expr)))
    }

    fn expression(&mut self) -> Result<Expr, FullParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, FullParseError> {
        let lhs = self.logic_or()?;
        if self.check(TokenKind::Equal) {
            let line = self.peek().line;
            self.advance();
            let rhs = self.assignment()?;
            return if let Expr::Variable(name) = lhs {
                Ok(Expr::Assign(name, Box::new(rhs)))
            } else {
                Err(FullParseError {
                    pos: line,
                    error: ParseError::InvalidAssignmentTarget,
                })
            };
        }
        Ok(lhs)
    }

    fn logic_or(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.logic_and()?;
        while self.advance_if(TokenKind::Or) {
            let rhs = self.logic_and()?;
            expr = Expr::Binary(BinOp::Or, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.equality()?;
        while self.advance_if(TokenKind::And) {
            let rhs = self.equality()?;
            expr = Expr::Binary(BinOp::And, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqualEqual => BinOp::Equal,
                TokenKind::BangEqual => BinOp::NotEqual,
                _ => break,
            };
            self.advance();
            let rhs = self.comparison()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Greater => BinOp::Greater,
                TokenKind::GreaterEqual => BinOp::GreaterEqual,
                TokenKind::Less => BinOp::Less,
                TokenKind::LessEqual => BinOp::LessEqual,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.factor()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, FullParseError> {
        match self.peek().kind {
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)))
            }
            TokenKind::Bang => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?)))
            }
            _ => self.call(),
        }
    }

    fn call(&mut self) -> Result<Expr, FullParseError> {
        let mut expr = self.primary()?;
        while self.advance_if(TokenKind::LeftParen) {
            let mut args = vec![];
            if !self.check(TokenKind::RightParen) {
                loop {
                    args.push(self.expression()?);
                    if !self.advance_if(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, ")")?;
            expr = Expr::Call(Box::new(expr), args);
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, FullParseError> {
        match self.peek().kind {
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Literal(LiteralValue::Nil))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(LiteralValue::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(LiteralValue::Bool(false)))
            }
            TokenKind::Number => {
                let literal = self.peek().literal.clone();
                if let Some(Literal::Number(n)) = literal {
                    self.advance();
                    Ok(Expr::Literal(LiteralValue::Number(n)))
                } else {
                    Err(self.error(ParseError::ExpectedExpression(self.peek().describe())))
                }
            }
            TokenKind::String => {
                let literal = self.peek().literal.clone();
                if let Some(Literal::Str(s)) = literal {
                    self.advance();
                    Ok(Expr::Literal(LiteralValue::Str(s)))
                } else {
                    Err(self.error(ParseError::ExpectedExpression(self.peek().describe())))
                }
            }
            TokenKind::Identifier => {
                let sym = self.ctx.symbol(&self.peek().lexeme);
                self.advance();
                Ok(Expr::Variable(sym))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, ")")?;
                Ok(Expr::Group(Box::new(expr)))
            }
            _ => Err(self.error(ParseError::ExpectedExpression(self.peek().describe()))),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) {
        if !self.check(TokenKind::Eof) {
            self.current += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<(), FullParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(ParseError::UnexpectedToken(
                self.peek().describe(),
                expected.to_string(),
            )))
        }
    }

    fn error(&self, error: ParseError) -> FullParseError {
        FullParseError {
            pos: self.peek().line,
            error,
        }
    }
}
