//! Abstract syntax tree.
//!
//! Two disjoint node families, expressions and statements. `Display` renders
//! the canonical one-line form used by the `parse` command and the tests.

use std::fmt;
use std::rc::Rc;

use crate::intern::Symbol;
use crate::token::number_literal;

#[derive(Debug, PartialEq, Clone)]
pub enum LiteralValue {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinOp {
    Mul,
    Div,
    Add,
    Sub,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    /// Short-circuiting; the right operand may never be evaluated.
    And,
    Or,
}

impl BinOp {
    /// Source form of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Greater => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::Less => "<",
            BinOp::LessEqual => "<=",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Literal(LiteralValue),
    Group(Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Variable(Symbol),
    Assign(Symbol, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
}

// Function parameters and bodies are shared with the closures created at run
// time, hence the Rc.
#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Expr(Box<Expr>),
    Print(Box<Expr>),
    VarDecl(Symbol, Option<Box<Expr>>),
    Block(Vec<Stmt>),
    If(Box<Expr>, Box<Stmt>, Option<Box<Stmt>>),
    While(Box<Expr>, Box<Stmt>),
    FunDecl(Symbol, Rc<Vec<Symbol>>, Rc<Stmt>),
    Return(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Group(inner) => write!(f, "(group {})", inner),
            Expr::Unary(UnaryOp::Neg, child) => write!(f, "(- {})", child),
            Expr::Unary(UnaryOp::Not, child) => write!(f, "(! {})", child),
            Expr::Binary(op, left, right) => {
                write!(f, "({} {} {})", op.symbol(), left, right)
            }
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Assign(name, rhs) => write!(f, "(= {} {})", name, rhs),
            Expr::Call(callee, args) => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Nil => write!(f, "nil"),
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Number(n) => write!(f, "{}", number_literal(*n)),
            LiteralValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr(e) => write!(f, "(expr {})", e),
            Stmt::Print(e) => write!(f, "print {}", e),
            Stmt::VarDecl(name, None) => write!(f, "var {}", name),
            Stmt::VarDecl(name, Some(init)) => write!(f, "var {} = {}", name, init),
            Stmt::Block(stmts) => {
                write!(f, "(block")?;
                for (i, stmt) in stmts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, " {}", stmt)?;
                }
                write!(f, ")")
            }
            Stmt::If(cond, then_branch, None) => {
                write!(f, "if ({}) then {}", cond, then_branch)
            }
            Stmt::If(cond, then_branch, Some(else_branch)) => {
                write!(f, "if ({}) then {} else {}", cond, then_branch, else_branch)
            }
            Stmt::While(cond, body) => write!(f, "while ({}) then {}", cond, body),
            Stmt::FunDecl(name, params, body) => {
                write!(f, "fun {}(", name)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") {}", body)
            }
            Stmt::Return(e) => write!(f, "return {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    fn num(n: f64) -> Expr {
        Expr::Literal(LiteralValue::Number(n))
    }

    #[test]
    fn literals_render_in_token_literal_form() {
        assert_eq!(num(7.0).to_string(), "7.0");
        assert_eq!(num(2.5).to_string(), "2.5");
        assert_eq!(Expr::Literal(LiteralValue::Nil).to_string(), "nil");
        assert_eq!(Expr::Literal(LiteralValue::Bool(true)).to_string(), "true");
        assert_eq!(
            Expr::Literal(LiteralValue::Str("abc".to_string())).to_string(),
            "abc"
        );
    }

    #[test]
    fn nested_expressions_render_prefix_form() {
        let expr = Expr::Binary(
            BinOp::Add,
            Box::new(num(1.0)),
            Box::new(Expr::Binary(BinOp::Mul, Box::new(num(2.0)), Box::new(num(3.0)))),
        );
        assert_eq!(expr.to_string(), "(+ 1.0 (* 2.0 3.0))");

        let expr = Expr::Unary(
            UnaryOp::Not,
            Box::new(Expr::Group(Box::new(num(4.0)))),
        );
        assert_eq!(expr.to_string(), "(! (group 4.0))");
    }

    #[test]
    fn calls_render_with_argument_list() {
        let mut interner = Interner::new();
        let f = Expr::Variable(interner.symbol("f"));
        let call = Expr::Call(Box::new(f), vec![num(1.0), num(2.0)]);
        assert_eq!(call.to_string(), "f(1.0, 2.0)");

        let chained = Expr::Call(Box::new(call), vec![]);
        assert_eq!(chained.to_string(), "f(1.0, 2.0)()");
    }

    #[test]
    fn statements_render_one_line_forms() {
        let mut interner = Interner::new();
        let x = interner.symbol("x");

        assert_eq!(Stmt::Print(Box::new(num(1.0))).to_string(), "print 1.0");
        assert_eq!(Stmt::VarDecl(x.clone(), None).to_string(), "var x");
        assert_eq!(
            Stmt::VarDecl(x.clone(), Some(Box::new(num(1.0)))).to_string(),
            "var x = 1.0"
        );
        assert_eq!(
            Stmt::Block(vec![
                Stmt::Print(Box::new(num(1.0))),
                Stmt::Expr(Box::new(num(2.0))),
            ])
            .to_string(),
            "(block print 1.0; (expr 2.0))"
        );
        assert_eq!(
            Stmt::Return(Box::new(Expr::Literal(LiteralValue::Nil))).to_string(),
            "return nil"
        );
    }

    #[test]
    fn control_flow_renders_condition_and_body() {
        let cond = Expr::Literal(LiteralValue::Bool(true));
        let body = Stmt::Block(vec![Stmt::Print(Box::new(num(1.0)))]);

        assert_eq!(
            Stmt::While(Box::new(cond.clone()), Box::new(body.clone())).to_string(),
            "while (true) then (block print 1.0)"
        );
        assert_eq!(
            Stmt::If(
                Box::new(cond),
                Box::new(body.clone()),
                Some(Box::new(Stmt::Block(vec![])))
            )
            .to_string(),
            "if (true) then (block print 1.0) else (block)"
        );
    }

    #[test]
    fn fun_decl_renders_signature_and_body() {
        let mut interner = Interner::new();
        let stmt = Stmt::FunDecl(
            interner.symbol("add"),
            Rc::new(vec![interner.symbol("a"), interner.symbol("b")]),
            Rc::new(Stmt::Block(vec![Stmt::Return(Box::new(Expr::Binary(
                BinOp::Add,
                Box::new(Expr::Variable(interner.symbol("a"))),
                Box::new(Expr::Variable(interner.symbol("b"))),
            )))])),
        );
        assert_eq!(stmt.to_string(), "fun add(a, b) (block return (+ a b))");
    }
}
